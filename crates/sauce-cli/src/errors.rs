//! CLI-level error taxonomy: wraps the lower crates' errors for the one
//! place in the workspace that's allowed to print and exit (spec §7 — the
//! audio thread never aborts, but a CLI boot failure legitimately does).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read descriptor directory {path}: {source}")]
    DescriptorDirRead { path: String, source: std::io::Error },

    #[error(transparent)]
    Audio(#[from] sauce_engine::EngineIoError),

    #[error(transparent)]
    Control(#[from] sauce_control::ControlIoError),

    #[error("unknown descriptor id '{0}'")]
    UnknownDescriptor(String),

    #[error("descriptor references unresolvable dsp_kind '{0}'")]
    UnknownDspKind(String),
}
