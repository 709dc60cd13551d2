//! Audio feature extraction
//!
//! Turns mono PCM into the fixed-shape [`FeatureVector`] consumed by the genre
//! classifier. Every sub-computation is independent and runs on the same
//! centred STFT framing (2048-point FFT, 512-sample hop).

pub mod hpss;
pub mod mfcc;
pub mod spectral;
pub mod stft;
pub mod tempo;
pub mod temporal;

use serde::Serialize;
use thiserror::Error;

use self::mfcc::MelFilterbank;
use self::stft::mean;

/// Number of cepstral coefficients kept per frame
pub const MFCC_COUNT: usize = 13;

/// Sample rate the classifier thresholds were authored against
pub const ANALYSIS_SAMPLE_RATE: u32 = 22_050;

/// Feature extraction errors
#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("No samples to analyse")]
    EmptySignal,

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),
}

/// Scalar descriptors of one analysed clip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    /// Dominant tempo (BPM)
    pub tempo: f64,
    /// Mean spectral centroid (Hz)
    pub spectral_centroid_mean: f64,
    /// Mean 85% spectral rolloff (Hz)
    pub spectral_rolloff_mean: f64,
    /// Mean spectral bandwidth (Hz)
    pub spectral_bandwidth_mean: f64,
    /// Per-coefficient MFCC means
    pub mfcc_mean: [f64; MFCC_COUNT],
    /// Mean fraction of sign changes per frame
    pub zero_crossing_rate_mean: f64,
    /// Mean per-frame RMS amplitude
    pub rms_mean: f64,
    /// Harmonic share of the separated magnitude, in `[0, 1]`
    pub harmonic_ratio: f64,
}

/// Frame and filterbank parameters
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor {
    pub n_fft: usize,
    pub hop: usize,
    pub n_mels: usize,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop: 512,
            n_mels: 128,
        }
    }
}

impl FeatureExtractor {
    /// Compute the full feature vector
    ///
    /// # Errors
    /// `EmptySignal` for an empty buffer, `InvalidSampleRate` for a zero rate.
    pub fn extract(&self, samples: &[f32], sample_rate: u32) -> Result<FeatureVector, FeatureError> {
        if samples.is_empty() {
            return Err(FeatureError::EmptySignal);
        }
        if sample_rate == 0 {
            return Err(FeatureError::InvalidSampleRate(sample_rate));
        }

        let spec = stft::stft(samples, sample_rate, self.n_fft, self.hop);

        let spectral = spectral::spectral_frames(&spec);
        let centroids: Vec<f32> = spectral.iter().map(|f| f.centroid).collect();
        let rolloffs: Vec<f32> = spectral.iter().map(|f| f.rolloff).collect();
        let bandwidths: Vec<f32> = spectral.iter().map(|f| f.bandwidth).collect();

        let filterbank = MelFilterbank::new(sample_rate, self.n_fft, self.n_mels);
        let log_mel = mfcc::log_mel_spectrogram(&spec.power(), &filterbank);
        let mfcc_mean = mfcc::mfcc_means::<MFCC_COUNT>(&log_mel).map(|c| c as f64);

        let onset = tempo::onset_strength(&log_mel);
        let frame_rate = sample_rate as f64 / self.hop as f64;
        let bpm = tempo::estimate_tempo(&onset, frame_rate);

        let zcr = temporal::zero_crossing_rate(samples, self.n_fft, self.hop);
        let rms = temporal::rms(samples, self.n_fft, self.hop);

        let harmonic_ratio = hpss::separate(&spec).harmonic_ratio();

        let features = FeatureVector {
            tempo: bpm,
            spectral_centroid_mean: mean(&centroids),
            spectral_rolloff_mean: mean(&rolloffs),
            spectral_bandwidth_mean: mean(&bandwidths),
            mfcc_mean,
            zero_crossing_rate_mean: mean(&zcr),
            rms_mean: mean(&rms),
            harmonic_ratio,
        };

        tracing::debug!(
            tempo = format!("{:.1}", features.tempo),
            centroid = format!("{:.1}", features.spectral_centroid_mean),
            harmonic_ratio = format!("{:.3}", features.harmonic_ratio),
            zcr = format!("{:.4}", features.zero_crossing_rate_mean),
            rms = format!("{:.4}", features.rms_mean),
            frames = spec.frames.len(),
            "Audio features extracted"
        );

        Ok(features)
    }
}

/// Extract features with the default frame parameters
pub fn extract_features(samples: &[f32], sample_rate: u32) -> Result<FeatureVector, FeatureError> {
    FeatureExtractor::default().extract(samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = ANALYSIS_SAMPLE_RATE;

    fn sine(frequency: f32, amplitude: f32, seconds: f32) -> Vec<f32> {
        let n = (seconds * SR as f32) as usize;
        (0..n)
            .map(|i| amplitude * (2.0 * std::f32::consts::PI * frequency * i as f32 / SR as f32).sin())
            .collect()
    }

    /// Deterministic white noise (xorshift)
    fn noise(amplitude: f32, seconds: f32) -> Vec<f32> {
        let mut state = 0x2545_f491_u32;
        (0..(seconds * SR as f32) as usize)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                amplitude * (state as f32 / u32::MAX as f32 * 2.0 - 1.0)
            })
            .collect()
    }

    /// Short noise bursts at a fixed tempo
    fn click_track(bpm: f32, seconds: f32) -> Vec<f32> {
        let period = (60.0 / bpm * SR as f32) as usize;
        let burst = (0.01 * SR as f32) as usize;
        let mut noise_source = noise(0.9, seconds).into_iter();
        (0..(seconds * SR as f32) as usize)
            .map(|i| {
                let n = noise_source.next().unwrap_or(0.0);
                if i % period < burst {
                    n
                } else {
                    0.0
                }
            })
            .collect()
    }

    #[test]
    fn test_empty_samples() {
        assert_eq!(extract_features(&[], SR), Err(FeatureError::EmptySignal));
    }

    #[test]
    fn test_zero_sample_rate() {
        assert_eq!(
            extract_features(&[0.1, 0.2], 0),
            Err(FeatureError::InvalidSampleRate(0))
        );
    }

    #[test]
    fn test_silence_is_well_defined() {
        let features = extract_features(&vec![0.0; SR as usize], SR).unwrap();
        assert_eq!(features.tempo, 0.0);
        assert_eq!(features.spectral_centroid_mean, 0.0);
        assert_eq!(features.zero_crossing_rate_mean, 0.0);
        assert_eq!(features.rms_mean, 0.0);
        assert!(features.harmonic_ratio.is_finite());
        assert!(features.harmonic_ratio.abs() < 1e-6);
        assert!(features.mfcc_mean.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_tone_is_harmonic_and_dark() {
        let features = extract_features(&sine(440.0, 0.5, 2.0), SR).unwrap();
        assert!(features.harmonic_ratio > 0.6, "ratio {}", features.harmonic_ratio);
        assert!(
            (features.spectral_centroid_mean - 440.0).abs() < 150.0,
            "centroid {}",
            features.spectral_centroid_mean
        );
        assert!(features.zero_crossing_rate_mean < 0.08);
    }

    #[test]
    fn test_noise_is_bright_and_noisy() {
        let features = extract_features(&noise(0.5, 2.0), SR).unwrap();
        assert!(features.spectral_centroid_mean > 2500.0);
        assert!(features.zero_crossing_rate_mean > 0.15);
        assert!(features.harmonic_ratio < 0.6, "ratio {}", features.harmonic_ratio);
        assert!(features.spectral_rolloff_mean > features.spectral_centroid_mean);
    }

    #[test]
    fn test_click_track_tempo() {
        let features = extract_features(&click_track(120.0, 6.0), SR).unwrap();
        // lag quantisation at 43 frames/s puts 120 BPM between 117.5 and 123.0
        assert!((features.tempo - 120.0).abs() < 8.0, "tempo {}", features.tempo);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let samples = sine(1000.0, 0.3, 1.0);
        assert_eq!(
            extract_features(&samples, SR).unwrap(),
            extract_features(&samples, SR).unwrap()
        );
    }
}
