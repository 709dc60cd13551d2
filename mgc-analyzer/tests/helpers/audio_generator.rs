//! Audio Test Fixture Generator
//!
//! Utilities for generating WAV clips with known characteristics

use std::path::{Path, PathBuf};

/// What the generated clip contains
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    /// Pure sine tone (Hz)
    Tone(f32),
    /// Deterministic white noise
    Noise,
    /// 10 ms noise bursts at a fixed tempo (BPM)
    ClickTrack(f32),
}

/// Configuration for generated audio
#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub amplitude: f32,
    pub signal: Signal,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 3.0,
            sample_rate: 44100,
            channels: 2,
            amplitude: 0.3,
            signal: Signal::Tone(440.0),
        }
    }
}

/// Generate a 16-bit PCM WAV file
///
/// # Returns
/// Generated file path
pub fn generate_test_wav(path: &Path, config: &AudioConfig) -> anyhow::Result<PathBuf> {
    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for value in render(config) {
        let sample = (value * i16::MAX as f32) as i16;
        for _ in 0..config.channels {
            writer.write_sample(sample)?;
        }
    }

    writer.finalize()?;
    Ok(path.to_path_buf())
}

/// Generate the clip in memory, as it would be uploaded
pub fn wav_bytes(config: &AudioConfig) -> anyhow::Result<Vec<u8>> {
    let dir = tempfile::tempdir()?;
    let path = generate_test_wav(&dir.path().join("clip.wav"), config)?;
    Ok(std::fs::read(path)?)
}

fn render(config: &AudioConfig) -> Vec<f32> {
    let rate = config.sample_rate as f32;
    let total = (config.duration_seconds * config.sample_rate as f64) as usize;
    let mut noise = xorshift(0x2545_f491);

    (0..total)
        .map(|i| {
            let value = match config.signal {
                Signal::Tone(freq) => (2.0 * std::f32::consts::PI * freq * i as f32 / rate).sin(),
                Signal::Noise => noise(),
                Signal::ClickTrack(bpm) => {
                    let period = (60.0 / bpm * rate) as usize;
                    let burst = (0.01 * rate) as usize;
                    let n = noise();
                    if i % period < burst {
                        n
                    } else {
                        0.0
                    }
                }
            };
            config.amplitude * value
        })
        .collect()
}

/// Uniform values in [-1, 1)
fn xorshift(seed: u32) -> impl FnMut() -> f32 {
    let mut state = seed;
    move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state as f32 / u32::MAX as f32 * 2.0 - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_simple_wav() {
        let temp_dir = TempDir::new().unwrap();
        let wav_path = temp_dir.path().join("test.wav");

        let result = generate_test_wav(&wav_path, &AudioConfig::default());

        assert!(result.is_ok());
        let metadata = std::fs::metadata(&wav_path).unwrap();
        assert!(metadata.len() > 1000, "WAV file should be non-trivial size");
    }

    #[test]
    fn test_click_track_has_silence_between_bursts() {
        let config = AudioConfig {
            signal: Signal::ClickTrack(120.0),
            ..Default::default()
        };
        let samples = render(&config);
        // 120 BPM at 44.1 kHz: bursts at 0, 22050, ...; 0.1 s in is silent
        assert_eq!(samples[4410], 0.0);
        assert!(samples[..441].iter().any(|&s| s != 0.0));
    }
}
