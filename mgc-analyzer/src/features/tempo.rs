//! Global tempo estimation
//!
//! 1. Onset strength: mean positive frame-to-frame rise of the log-mel spectrogram
//! 2. Autocorrelation of the onset envelope over lags covering 30 to 300 BPM
//! 3. Each lag scored as `ln(1 + 1e6 · acf) + log-normal prior` centred on 120 BPM
//! 4. Best lag converted back to BPM

/// Tempo search range (BPM)
pub const MIN_BPM: f64 = 30.0;
pub const MAX_BPM: f64 = 300.0;

/// Centre of the tempo prior and its width in octaves
const PRIOR_BPM: f64 = 120.0;
const PRIOR_STD_OCTAVES: f64 = 1.0;

/// Onset strength envelope, one value per frame
///
/// The first frame has no predecessor and is 0.
pub fn onset_strength(log_mel: &[Vec<f32>]) -> Vec<f32> {
    let mut envelope = Vec::with_capacity(log_mel.len());
    if log_mel.is_empty() {
        return envelope;
    }
    envelope.push(0.0);
    for pair in log_mel.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let bands = curr.len().max(1) as f32;
        let rise: f32 = curr
            .iter()
            .zip(prev)
            .map(|(&c, &p)| (c - p).max(0.0))
            .sum();
        envelope.push(rise / bands);
    }
    envelope
}

/// Estimate the dominant tempo in BPM from an onset envelope
///
/// `frame_rate` is onset frames per second (`sample_rate / hop`). Returns 0.0
/// when the envelope carries no onset energy or is too short to hold a beat.
pub fn estimate_tempo(onset: &[f32], frame_rate: f64) -> f64 {
    let n = onset.len();
    let energy: f64 = onset.iter().map(|&v| (v as f64).powi(2)).sum();
    if n < 2 || energy <= f64::EPSILON || frame_rate <= 0.0 {
        return 0.0;
    }

    let min_lag = ((60.0 * frame_rate / MAX_BPM).floor() as usize).max(1);
    let max_lag = ((60.0 * frame_rate / MIN_BPM).ceil() as usize).min(n - 1);
    if max_lag < min_lag {
        return 0.0;
    }

    let mut best_lag = 0usize;
    let mut best_score = f64::NEG_INFINITY;
    for lag in min_lag..=max_lag {
        let acf: f64 = onset[..n - lag]
            .iter()
            .zip(&onset[lag..])
            .map(|(&a, &b)| a as f64 * b as f64)
            .sum::<f64>()
            / energy;
        let bpm = 60.0 * frame_rate / lag as f64;
        let score = (1.0 + 1e6 * acf.max(0.0)).ln() + log_prior(bpm);
        if score > best_score {
            best_score = score;
            best_lag = lag;
        }
    }

    if best_lag == 0 {
        return 0.0;
    }
    60.0 * frame_rate / best_lag as f64
}

fn log_prior(bpm: f64) -> f64 {
    let octaves = (bpm.log2() - PRIOR_BPM.log2()) / PRIOR_STD_OCTAVES;
    -0.5 * octaves * octaves
}
