//! Per-frame spectral shape descriptors

use super::stft::Spectrogram;

/// Fraction of spectral magnitude below the rolloff frequency
pub const ROLLOFF_PERCENT: f32 = 0.85;

/// Spectral descriptors for a single frame (Hz)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpectralFrame {
    pub centroid: f32,
    pub rolloff: f32,
    pub bandwidth: f32,
}

/// Centroid, rolloff and bandwidth for every frame of a magnitude spectrogram
pub fn spectral_frames(spec: &Spectrogram) -> Vec<SpectralFrame> {
    let freqs = spec.bin_frequencies();
    spec.frames
        .iter()
        .map(|frame| describe_frame(frame, &freqs))
        .collect()
}

fn describe_frame(magnitudes: &[f32], freqs: &[f32]) -> SpectralFrame {
    let total: f64 = magnitudes.iter().map(|&m| m as f64).sum();
    if total <= f64::EPSILON {
        return SpectralFrame::default();
    }

    let centroid = magnitudes
        .iter()
        .zip(freqs)
        .map(|(&m, &f)| m as f64 * f as f64)
        .sum::<f64>()
        / total;

    // Second-order bandwidth about the centroid, weighted by the normalised spectrum
    let bandwidth = magnitudes
        .iter()
        .zip(freqs)
        .map(|(&m, &f)| (m as f64 / total) * (f as f64 - centroid).powi(2))
        .sum::<f64>()
        .sqrt();

    let threshold = ROLLOFF_PERCENT as f64 * total;
    let mut cumulative = 0.0f64;
    let mut rolloff = freqs.last().copied().unwrap_or(0.0);
    for (&m, &f) in magnitudes.iter().zip(freqs) {
        cumulative += m as f64;
        if cumulative >= threshold {
            rolloff = f;
            break;
        }
    }

    SpectralFrame {
        centroid: centroid as f32,
        rolloff,
        bandwidth: bandwidth as f32,
    }
}
