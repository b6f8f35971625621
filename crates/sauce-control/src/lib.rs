//! Control/event plane (spec §4.6, §6.1, component I): OSC-style address
//! parsing and encoding, a UDP transport, and the peer-liveness heartbeat.
//! No audio-thread code lives here — this crate only depends on
//! `sauce-core`'s message types; `sauce-cli` wires it to `sauce-engine`'s
//! command/telemetry queues.

pub mod address;
pub mod errors;
pub mod heartbeat;
pub mod transport;

pub use address::Inbound;
pub use errors::ControlIoError;
pub use heartbeat::{ConnectionStatus, Heartbeat, SharedStatus};

use std::net::SocketAddr;

/// Parses a `host:port` peer/bind address, wrapping the failure as
/// `ControlIoError::InvalidPeerAddress` so callers get the same error
/// taxonomy whether the address came from CLI args or a config file.
pub fn parse_socket_addr(s: &str) -> Result<SocketAddr, ControlIoError> {
    s.parse().map_err(|_| ControlIoError::InvalidPeerAddress(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_socket_addr_rejects_garbage() {
        assert!(parse_socket_addr("not-an-address").is_err());
    }

    #[test]
    fn test_parse_socket_addr_accepts_host_port() {
        assert_eq!(parse_socket_addr("127.0.0.1:7812").unwrap().port(), 7812);
    }
}
