//! Time-domain frame descriptors: zero-crossing rate and RMS energy

use super::stft::{centered_frames, PadMode};

/// Fraction of sign changes in each centred frame
///
/// Zero counts as positive, so a run of silence never registers a crossing.
pub fn zero_crossing_rate(samples: &[f32], frame_len: usize, hop: usize) -> Vec<f32> {
    centered_frames(samples, frame_len, hop, PadMode::Edge)
        .iter()
        .map(|frame| {
            let crossings = frame
                .windows(2)
                .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
                .count();
            crossings as f32 / frame.len() as f32
        })
        .collect()
}

/// Root-mean-square amplitude of each centred frame
pub fn rms(samples: &[f32], frame_len: usize, hop: usize) -> Vec<f32> {
    centered_frames(samples, frame_len, hop, PadMode::Constant)
        .iter()
        .map(|frame| {
            let sum_squares: f64 = frame.iter().map(|&s| (s as f64).powi(2)).sum();
            (sum_squares / frame.len() as f64).sqrt() as f32
        })
        .collect()
}
