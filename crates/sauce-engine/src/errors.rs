//! Engine-crate error types: device I/O and host setup failures that have
//! no equivalent in `sauce_core::errors` (which only covers the pure data
//! model). The audio callback itself never returns a `Result` (spec §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineIoError {
    #[error("no output device available")]
    NoOutputDevice,

    #[error("output device '{0}' not found")]
    DeviceNotFound(String),

    #[error("cpal device error: {0}")]
    Device(#[from] cpal::DevicesError),

    #[error("cpal default stream config error: {0}")]
    DefaultStreamConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("cpal build stream error: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("cpal play stream error: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("unsupported sample format: {0:?}")]
    UnsupportedSampleFormat(cpal::SampleFormat),
}
