//! Harmonic/percussive separation by median filtering
//!
//! Harmonic energy is smooth along time, percussive energy is smooth along
//! frequency. Median filtering the magnitude spectrogram in each direction
//! gives two estimates which are turned into soft (Wiener) masks.

use super::stft::Spectrogram;

/// Median filter length in frames (harmonic) and bins (percussive)
pub const KERNEL_SIZE: usize = 31;

/// Guard added to the ratio denominator
pub const RATIO_EPSILON: f64 = 1e-8;

const MASK_POWER: i32 = 2;

/// Mean masked magnitudes of the two components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HpssEnergy {
    pub harmonic: f64,
    pub percussive: f64,
}

impl HpssEnergy {
    /// `harmonic / (harmonic + percussive + ε)`, always within `[0, 1]`
    pub fn harmonic_ratio(&self) -> f64 {
        let ratio = self.harmonic / (self.harmonic + self.percussive + RATIO_EPSILON);
        ratio.clamp(0.0, 1.0)
    }
}

/// Separate the spectrogram and return mean component magnitudes
pub fn separate(spec: &Spectrogram) -> HpssEnergy {
    let frames = spec.frames.len();
    if frames == 0 {
        return HpssEnergy {
            harmonic: 0.0,
            percussive: 0.0,
        };
    }
    let bins = spec.frames[0].len();

    // Harmonic estimate: filter each bin's trajectory across time
    let mut harmonic = vec![vec![0.0f32; bins]; frames];
    let mut column = vec![0.0f32; frames];
    for k in 0..bins {
        for (t, frame) in spec.frames.iter().enumerate() {
            column[t] = frame[k];
        }
        for (t, value) in median_filter(&column, KERNEL_SIZE).into_iter().enumerate() {
            harmonic[t][k] = value;
        }
    }

    // Percussive estimate: filter each frame across frequency
    let percussive: Vec<Vec<f32>> = spec
        .frames
        .iter()
        .map(|frame| median_filter(frame, KERNEL_SIZE))
        .collect();

    let mut harmonic_sum = 0.0f64;
    let mut percussive_sum = 0.0f64;
    for t in 0..frames {
        for k in 0..bins {
            let magnitude = spec.frames[t][k] as f64;
            let (mask_h, mask_p) = soft_masks(harmonic[t][k] as f64, percussive[t][k] as f64);
            harmonic_sum += magnitude * mask_h;
            percussive_sum += magnitude * mask_p;
        }
    }

    let cells = (frames * bins) as f64;
    HpssEnergy {
        harmonic: harmonic_sum / cells,
        percussive: percussive_sum / cells,
    }
}

/// Wiener masks; where both estimates vanish neither component claims the cell
fn soft_masks(h: f64, p: f64) -> (f64, f64) {
    let h = h.powi(MASK_POWER);
    let p = p.powi(MASK_POWER);
    let total = h + p;
    if total <= f64::MIN_POSITIVE {
        return (0.0, 0.0);
    }
    (h / total, p / total)
}

/// Centred running median; the window is mirrored at the edges
fn median_filter(values: &[f32], size: usize) -> Vec<f32> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let half = size / 2;
    let mut window = Vec::with_capacity(size);
    (0..n)
        .map(|i| {
            window.clear();
            for offset in 0..size {
                let j = i as isize + offset as isize - half as isize;
                window.push(values[reflect_index(j, n)]);
            }
            let mid = window.len() / 2;
            let (_, median, _) = window.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
            *median
        })
        .collect()
}

/// Half-sample symmetric reflection (`d c b a | a b c d | d c b a`)
fn reflect_index(index: isize, len: usize) -> usize {
    let len = len as isize;
    let period = 2 * len;
    let mut i = index.rem_euclid(period);
    if i >= len {
        i = period - 1 - i;
    }
    i as usize
}
