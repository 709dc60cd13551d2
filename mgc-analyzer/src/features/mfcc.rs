//! Mel filterbank, log-mel spectrogram and MFCCs
//!
//! Slaney mel scale with area-normalised triangles, dB conversion with an 80 dB
//! dynamic range floor, orthonormal DCT-II.

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;
const AMIN: f32 = 1e-10;
const TOP_DB: f32 = 80.0;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Hz to mel (Slaney: linear below 1 kHz, logarithmic above)
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Mel to Hz, inverse of [`hz_to_mel`]
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Triangular mel filters spanning 0 Hz to Nyquist
pub struct MelFilterbank {
    /// `weights[m][k]`: contribution of FFT bin `k` to mel band `m`
    weights: Vec<Vec<f32>>,
}

impl MelFilterbank {
    pub fn new(sample_rate: u32, n_fft: usize, n_mels: usize) -> Self {
        let bins = n_fft / 2 + 1;
        let fft_freqs: Vec<f64> = (0..bins)
            .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
            .collect();

        let mel_max = hz_to_mel(sample_rate as f64 / 2.0);
        let mel_points: Vec<f64> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_max * i as f64 / (n_mels + 1) as f64))
            .collect();

        let weights = (0..n_mels)
            .map(|m| {
                let (left, center, right) = (mel_points[m], mel_points[m + 1], mel_points[m + 2]);
                let enorm = 2.0 / (right - left);
                fft_freqs
                    .iter()
                    .map(|&f| {
                        let lower = (f - left) / (center - left);
                        let upper = (right - f) / (right - center);
                        (lower.min(upper).max(0.0) * enorm) as f32
                    })
                    .collect()
            })
            .collect();

        Self { weights }
    }

    pub fn n_mels(&self) -> usize {
        self.weights.len()
    }

    /// Project one power-spectrum frame onto the mel bands
    pub fn apply(&self, power: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .map(|band| {
                band.iter()
                    .zip(power)
                    .map(|(&w, &p)| w as f64 * p as f64)
                    .sum::<f64>() as f32
            })
            .collect()
    }
}

/// Mel power spectrogram converted to decibels
///
/// Values are floored at `max - 80 dB` across the whole spectrogram.
pub fn log_mel_spectrogram(power_frames: &[Vec<f32>], filterbank: &MelFilterbank) -> Vec<Vec<f32>> {
    let mut db: Vec<Vec<f32>> = power_frames
        .iter()
        .map(|frame| {
            filterbank
                .apply(frame)
                .into_iter()
                .map(|e| 10.0 * e.max(AMIN).log10())
                .collect()
        })
        .collect();

    let peak = db
        .iter()
        .flatten()
        .copied()
        .fold(f32::NEG_INFINITY, f32::max);
    if peak.is_finite() {
        let floor = peak - TOP_DB;
        for value in db.iter_mut().flatten() {
            *value = value.max(floor);
        }
    }

    db
}

/// Orthonormal DCT-II, first `count` coefficients
pub fn dct_ii(values: &[f32], count: usize) -> Vec<f32> {
    let n = values.len();
    if n == 0 {
        return vec![0.0; count];
    }
    let nf = n as f64;
    (0..count)
        .map(|k| {
            let sum: f64 = values
                .iter()
                .enumerate()
                .map(|(i, &x)| {
                    x as f64
                        * (std::f64::consts::PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * nf)).cos()
                })
                .sum();
            let scale = if k == 0 { (1.0 / nf).sqrt() } else { (2.0 / nf).sqrt() };
            (sum * scale) as f32
        })
        .collect()
}

/// Mean of each cepstral coefficient across all frames
pub fn mfcc_means<const N: usize>(log_mel: &[Vec<f32>]) -> [f32; N] {
    let mut sums = [0.0f64; N];
    for frame in log_mel {
        for (sum, c) in sums.iter_mut().zip(dct_ii(frame, N)) {
            *sum += c as f64;
        }
    }
    let count = log_mel.len().max(1) as f64;
    let mut means = [0.0f32; N];
    for (mean, sum) in means.iter_mut().zip(sums) {
        *mean = (sum / count) as f32;
    }
    means
}
