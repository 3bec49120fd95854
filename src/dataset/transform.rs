//! Signal transforms applied to every fetched waveform.

use crate::audio::AudioSample;
use crate::error::Result;

/// A transform run on each decoded signal before it is returned.
///
/// Closures of the form `Fn(AudioSample) -> Result<AudioSample>` implement
/// this trait directly.
pub trait SignalTransform: Send + Sync {
    /// Transform one signal
    fn apply(&self, signal: AudioSample) -> Result<AudioSample>;
}

impl<F> SignalTransform for F
where
    F: Fn(AudioSample) -> Result<AudioSample> + Send + Sync,
{
    fn apply(&self, signal: AudioSample) -> Result<AudioSample> {
        self(signal)
    }
}

/// Downmix to a single channel by averaging
#[derive(Debug, Clone, Copy, Default)]
pub struct ToMono;

impl SignalTransform for ToMono {
    fn apply(&self, signal: AudioSample) -> Result<AudioSample> {
        Ok(signal.to_mono())
    }
}
