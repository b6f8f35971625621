//! Control-plane error types (spec §7): socket setup and address-parse
//! failures. Malformed individual packets are never fatal — see
//! `address::parse` — these variants cover only setup-time failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlIoError {
    #[error("failed to bind control socket on {addr}: {source}")]
    Bind { addr: String, source: std::io::Error },

    #[error("invalid peer address '{0}'")]
    InvalidPeerAddress(String),
}
