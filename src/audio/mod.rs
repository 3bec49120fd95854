//! Audio Module
//!
//! WAV decoding at native sample rate and the decoded sample type.

pub mod io;
pub mod sample;

pub use io::{export_audio, load_audio, read_audio_info, AudioInfo};
pub use sample::AudioSample;
