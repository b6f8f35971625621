//! Real-time orchestration: the audio thread's per-block graph walk, the
//! lock-free command/telemetry queues that connect it to `sauce-control`,
//! and the cpal device I/O that drives it (spec §5).
//!
//! `Engine` itself spawns no threads and owns no device handles — it is the
//! pure per-block computation. `audio::AudioHandle` is the thread-owning
//! half: it opens the cpal stream, spawns the descriptor-swap worker, and
//! drains the command queue into `Engine` once per callback.

pub mod audio;
pub mod command;
pub mod engine;
pub mod errors;
pub mod worker;

pub use engine::Engine;
pub use errors::EngineIoError;
