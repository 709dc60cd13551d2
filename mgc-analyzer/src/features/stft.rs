//! Short-time Fourier transform and framing helpers

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// How the signal edges are extended before framing a centred analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMode {
    /// Mirror the signal about its first/last sample (excluding the edge sample)
    Reflect,
    /// Repeat the first/last sample
    Edge,
    /// Zeros
    Constant,
}

/// Magnitude spectrogram laid out frame-major: `frames[t][k]`
#[derive(Debug, Clone)]
pub struct Spectrogram {
    pub frames: Vec<Vec<f32>>,
    pub sample_rate: u32,
    pub n_fft: usize,
    pub hop: usize,
}

impl Spectrogram {
    /// Number of frequency bins per frame (`n_fft / 2 + 1`)
    pub fn bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Centre frequency of every bin in Hz
    pub fn bin_frequencies(&self) -> Vec<f32> {
        let bin_hz = self.sample_rate as f32 / self.n_fft as f32;
        (0..self.bins()).map(|k| k as f32 * bin_hz).collect()
    }

    /// Squared magnitudes
    pub fn power(&self) -> Vec<Vec<f32>> {
        self.frames
            .iter()
            .map(|frame| frame.iter().map(|m| m * m).collect())
            .collect()
    }
}

/// Periodic Hann window (the DFT-even variant used for spectral analysis)
pub fn hann_window(length: usize) -> Vec<f32> {
    if length <= 1 {
        return vec![1.0; length];
    }
    (0..length)
        .map(|n| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * n as f32 / length as f32).cos()))
        .collect()
}

/// Pad `pad` samples on both ends
///
/// Reflection needs more than `pad` samples; shorter signals are zero padded.
pub fn pad_signal(samples: &[f32], pad: usize, mode: PadMode) -> Vec<f32> {
    let n = samples.len();
    let mut out = Vec::with_capacity(n + 2 * pad);

    match mode {
        PadMode::Reflect if n > pad => {
            out.extend((1..=pad).rev().map(|i| samples[i]));
            out.extend_from_slice(samples);
            out.extend((n - 1 - pad..n - 1).rev().map(|i| samples[i]));
        }
        PadMode::Edge if n > 0 => {
            out.extend(std::iter::repeat(samples[0]).take(pad));
            out.extend_from_slice(samples);
            out.extend(std::iter::repeat(samples[n - 1]).take(pad));
        }
        _ => {
            out.extend(std::iter::repeat(0.0).take(pad));
            out.extend_from_slice(samples);
            out.extend(std::iter::repeat(0.0).take(pad));
        }
    }

    out
}

/// Split a centred signal into overlapping frames
///
/// The signal is padded by `frame_len / 2` on both sides so frame `t` is
/// centred on sample `t * hop`.
pub fn centered_frames(samples: &[f32], frame_len: usize, hop: usize, mode: PadMode) -> Vec<Vec<f32>> {
    let padded = pad_signal(samples, frame_len / 2, mode);
    if padded.len() < frame_len || hop == 0 {
        return Vec::new();
    }
    let count = 1 + (padded.len() - frame_len) / hop;
    (0..count)
        .map(|t| padded[t * hop..t * hop + frame_len].to_vec())
        .collect()
}

/// Centred magnitude STFT with a periodic Hann window and reflect padding
pub fn stft(samples: &[f32], sample_rate: u32, n_fft: usize, hop: usize) -> Spectrogram {
    let window = hann_window(n_fft);
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n_fft);
    let bins = n_fft / 2 + 1;

    let mut buffer = vec![Complex::new(0.0f32, 0.0); n_fft];
    let mut frames = Vec::new();

    for frame in centered_frames(samples, n_fft, hop, PadMode::Reflect) {
        for ((slot, &sample), &w) in buffer.iter_mut().zip(frame.iter()).zip(window.iter()) {
            *slot = Complex::new(sample * w, 0.0);
        }
        fft.process(&mut buffer);
        frames.push(buffer[..bins].iter().map(|c| c.norm()).collect());
    }

    Spectrogram {
        frames,
        sample_rate,
        n_fft,
        hop,
    }
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}
