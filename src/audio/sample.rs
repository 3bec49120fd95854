//! Decoded audio sample type.

use serde::{Deserialize, Serialize};

/// A decoded waveform at its native sample rate
///
/// Samples are stored per channel (`channels[ch][frame]`) as f32 in the
/// range [-1.0, 1.0].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSample {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioSample {
    /// Create a sample from per-channel data
    ///
    /// All channels must have the same length; shorter channels are padded
    /// with silence.
    pub fn new(mut channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        let frames = channels.iter().map(Vec::len).max().unwrap_or(0);
        for channel in &mut channels {
            channel.resize(frames, 0.0);
        }
        Self {
            channels,
            sample_rate,
        }
    }

    /// Native sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    /// True when the sample holds no frames
    pub fn is_empty(&self) -> bool {
        self.num_frames() == 0
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// Samples of one channel
    ///
    /// # Panics
    /// Panics if `ch` is out of range.
    pub fn channel(&self, ch: usize) -> &[f32] {
        &self.channels[ch]
    }

    /// All channels
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Take ownership of the channel data
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Average all channels down to one
    pub fn to_mono(&self) -> AudioSample {
        let count = self.num_channels();
        if count <= 1 {
            return self.clone();
        }

        let mono = (0..self.num_frames())
            .map(|frame| {
                self.channels.iter().map(|ch| ch[frame]).sum::<f32>() / count as f32
            })
            .collect();

        AudioSample::new(vec![mono], self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dimensions() {
        let sample = AudioSample::new(vec![vec![0.0; 4410], vec![0.0; 4410]], 44100);
        assert_eq!(sample.num_channels(), 2);
        assert_eq!(sample.num_frames(), 4410);
        assert_relative_eq!(sample.duration_secs(), 0.1);
    }

    #[test]
    fn test_uneven_channels_are_padded() {
        let sample = AudioSample::new(vec![vec![0.5; 3], vec![0.5; 1]], 8000);
        assert_eq!(sample.channel(1), &[0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_to_mono_averages() {
        let sample = AudioSample::new(vec![vec![1.0, 0.0], vec![0.0, -1.0]], 8000);
        let mono = sample.to_mono();
        assert_eq!(mono.num_channels(), 1);
        assert_relative_eq!(mono.channel(0)[0], 0.5);
        assert_relative_eq!(mono.channel(0)[1], -0.5);
    }

    #[test]
    fn test_empty() {
        let sample = AudioSample::new(Vec::new(), 44100);
        assert!(sample.is_empty());
        assert_eq!(sample.num_frames(), 0);
    }
}
