//! Audio file I/O for tut-sed
//!
//! Decodes WAV files at their native sample rate. Nothing is resampled or
//! cached: every call reads the file from disk.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use serde::{Deserialize, Serialize};

use super::sample::AudioSample;
use crate::error::{Result, TutSedError};

/// Header information of a WAV file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioInfo {
    /// Sample rate in Hz (e.g., 44100)
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Bits per sample (e.g., 16, 24, 32)
    pub bits_per_sample: u16,
    /// Frames per channel
    pub num_frames: u64,
    /// Duration in seconds
    pub duration_secs: f64,
}

/// Decode a WAV file into per-channel f32 samples
///
/// # Errors
/// * `AudioNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a readable WAV file
/// * `UnsupportedFormat` - If the bit depth cannot be converted
pub fn load_audio(path: &Path) -> Result<AudioSample> {
    let reader = open_reader(path)?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(invalid(path, "WAV header declares zero channels".to_string(), None));
    }

    let interleaved = read_samples_as_f32(reader, path, spec.bits_per_sample, spec.sample_format)?;

    Ok(AudioSample::new(
        deinterleave(&interleaved, channels),
        spec.sample_rate,
    ))
}

/// Read only the header of a WAV file
pub fn read_audio_info(path: &Path) -> Result<AudioInfo> {
    let reader = open_reader(path)?;
    let spec = reader.spec();
    let num_frames = reader.duration() as u64;

    Ok(AudioInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs: if spec.sample_rate == 0 {
            0.0
        } else {
            num_frames as f64 / spec.sample_rate as f64
        },
    })
}

/// Write a sample to a WAV file
///
/// `bit_depth` selects 16 or 24-bit integer, or 32-bit float output.
pub fn export_audio(sample: &AudioSample, path: &Path, bit_depth: u16) -> Result<()> {
    if !matches!(bit_depth, 16 | 24 | 32) {
        return Err(TutSedError::UnsupportedFormat {
            format: format!("{}-bit output (only 16, 24, 32 supported)", bit_depth),
        });
    }

    let channels = match u16::try_from(sample.num_channels()) {
        Ok(n) if n > 0 => n,
        _ => {
            return Err(TutSedError::UnsupportedFormat {
                format: format!("{}-channel output", sample.num_channels()),
            })
        }
    };

    let spec = WavSpec {
        channels,
        sample_rate: sample.sample_rate(),
        bits_per_sample: bit_depth,
        sample_format: if bit_depth == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };

    let interleaved = interleave(sample.channels());
    let mut writer = WavWriter::create(path, spec).map_err(|e| write_error(path, e))?;

    match bit_depth {
        16 => {
            for s in interleaved {
                let scaled = (s * 32767.0).clamp(-32768.0, 32767.0) as i16;
                writer.write_sample(scaled).map_err(|e| write_error(path, e))?;
            }
        }
        24 => {
            for s in interleaved {
                // 24-bit stored as i32 in hound
                let scaled = (s * 8388607.0).clamp(-8388608.0, 8388607.0) as i32;
                writer.write_sample(scaled).map_err(|e| write_error(path, e))?;
            }
        }
        _ => {
            for s in interleaved {
                writer.write_sample(s).map_err(|e| write_error(path, e))?;
            }
        }
    }

    writer.finalize().map_err(|e| write_error(path, e))?;
    Ok(())
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn open_reader(path: &Path) -> Result<WavReader<std::io::BufReader<std::fs::File>>> {
    if !path.is_file() {
        return Err(TutSedError::AudioNotFound {
            path: path.to_path_buf(),
            index: None,
        });
    }

    WavReader::open(path).map_err(|e| invalid(path, format!("Failed to open WAV file: {}", e), Some(e)))
}

fn invalid(path: &Path, reason: String, source: Option<hound::Error>) -> TutSedError {
    TutSedError::InvalidAudio {
        path: path.to_path_buf(),
        reason,
        source,
    }
}

fn write_error(path: &Path, e: hound::Error) -> TutSedError {
    match e {
        hound::Error::IoError(io) => TutSedError::Io(io),
        other => invalid(path, format!("Failed to write WAV file: {}", other), Some(other)),
    }
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    path: &Path,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let read_failed = |bits: &str, e: hound::Error| {
        invalid(path, format!("Failed to read {} samples: {}", bits, e), Some(e))
    };

    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| read_failed("float", e)),
        SampleFormat::Int => match bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| v as f32 / 128.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| read_failed("8-bit", e)),
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| read_failed("16-bit", e)),
            // 24-bit stored as i32 in hound
            24 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 8388608.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| read_failed("24-bit", e)),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2147483648.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| read_failed("32-bit int", e)),
            _ => Err(TutSedError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits_per_sample),
            }),
        },
    }
}

/// De-interleave samples from [L,R,L,R,...] to [[L,L,...], [R,R,...]]
fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let frames = samples.len() / channels;
    let mut result = vec![Vec::with_capacity(frames); channels];

    for (i, sample) in samples.iter().enumerate() {
        result[i % channels].push(*sample);
    }

    result
}

/// Interleave channels from [[L,L,...], [R,R,...]] to [L,R,L,R,...]
fn interleave(channels: &[Vec<f32>]) -> Vec<f32> {
    let frames = channels.first().map(Vec::len).unwrap_or(0);
    let mut result = Vec::with_capacity(frames * channels.len());

    for frame in 0..frames {
        for channel in channels {
            result.push(channel[frame]);
        }
    }

    result
}
