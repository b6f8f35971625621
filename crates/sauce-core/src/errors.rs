//! Error taxonomy (spec §7). The audio thread never aborts: `NonFiniteState`
//! and `OverrunWarning` are recorded as telemetry, not returned as `Result`,
//! since nothing on the real-time path can propagate an `Err` out of a
//! callback. The other variants are returned by control-thread-facing calls
//! (descriptor validation, route registration, message parsing).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("instantiation failure: {0}")]
    InstantiationFailure(String),

    #[error("audio block overrun: took {took_us}us, budget {budget_us}us")]
    OverrunWarning { took_us: u64, budget_us: u64 },

    #[error("non-finite state detected in {component}, reset to defaults")]
    NonFiniteState { component: String },

    #[error("control message backlog, dropped {dropped} non-trigger message(s)")]
    MessageBacklog { dropped: u32 },

    #[error("control peer disconnected after {missed_pings} missed heartbeat(s)")]
    DisconnectedPeer { missed_pings: u32 },
}

pub type EngineResult<T> = Result<T, EngineError>;
