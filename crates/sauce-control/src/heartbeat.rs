//! Peer-liveness heartbeat (spec §4.6, §5, §7 `DisconnectedPeer`): the
//! control thread sends `/engine/ping` every 2s and expects an
//! `/engine/pong` ack; three consecutive misses flips connection status to
//! disconnected. Reconnect is idempotent — once an ack arrives, the miss
//! counter resets and the caller is expected to replay state (spec §8
//! property 10), which `sauce-cli` drives from its own snapshot of `base`
//! values, routes, and slot assignments.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(2);
pub const MAX_MISSED_ACKS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// Shared, lock-free connection status the control thread writes and any
/// other thread (CLI status line, telemetry encoder) may read.
#[derive(Debug, Default)]
pub struct SharedStatus(AtomicU8);

impl SharedStatus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self(AtomicU8::new(0)))
    }

    pub fn get(&self) -> ConnectionStatus {
        match self.0.load(Ordering::Acquire) {
            0 => ConnectionStatus::Connected,
            _ => ConnectionStatus::Disconnected,
        }
    }

    fn set(&self, status: ConnectionStatus) {
        self.0.store(matches!(status, ConnectionStatus::Disconnected) as u8, Ordering::Release);
    }
}

/// Tracks outbound ping cadence and missed-ack count. Not `Send`-shared
/// itself — owned exclusively by the thread that drives the heartbeat;
/// `SharedStatus` is the cross-thread-visible half.
pub struct Heartbeat {
    last_sent: Instant,
    missed: u32,
    status: Arc<SharedStatus>,
}

impl Heartbeat {
    pub fn new(status: Arc<SharedStatus>) -> Self {
        Self { last_sent: Instant::now(), missed: 0, status }
    }

    /// Returns `true` when it's time to send another ping (spec: every
    /// 2s). Also advances the internal clock and, if the *previous* ping
    /// never got an ack, increments the miss counter and may flip status.
    pub fn should_ping(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_sent) < HEARTBEAT_INTERVAL {
            return false;
        }
        self.last_sent = now;
        self.missed += 1;
        if self.missed >= MAX_MISSED_ACKS {
            self.status.set(ConnectionStatus::Disconnected);
        }
        true
    }

    /// Called when an `/engine/pong` arrives from the peer: clears the
    /// miss counter and restores `Connected` status (spec §8 property 10 —
    /// reconnect is idempotent, no special-cased resync logic here beyond
    /// clearing the counter).
    pub fn record_ack(&mut self) {
        self.missed = 0;
        self.status.set(ConnectionStatus::Connected);
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_heartbeat_does_not_ping_immediately() {
        let mut hb = Heartbeat::new(SharedStatus::new());
        assert!(!hb.should_ping(Instant::now()));
    }

    #[test]
    fn test_three_missed_acks_flips_disconnected() {
        let mut hb = Heartbeat::new(SharedStatus::new());
        let mut t = Instant::now();
        for _ in 0..3 {
            t += HEARTBEAT_INTERVAL;
            hb.should_ping(t);
        }
        assert_eq!(hb.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_ack_resets_missed_count_and_reconnects() {
        let mut hb = Heartbeat::new(SharedStatus::new());
        let mut t = Instant::now();
        for _ in 0..3 {
            t += HEARTBEAT_INTERVAL;
            hb.should_ping(t);
        }
        assert_eq!(hb.status(), ConnectionStatus::Disconnected);
        hb.record_ack();
        assert_eq!(hb.status(), ConnectionStatus::Connected);
    }

    #[test]
    fn test_two_missed_acks_stay_connected() {
        let mut hb = Heartbeat::new(SharedStatus::new());
        let mut t = Instant::now();
        for _ in 0..2 {
            t += HEARTBEAT_INTERVAL;
            hb.should_ping(t);
        }
        assert_eq!(hb.status(), ConnectionStatus::Connected);
    }
}
