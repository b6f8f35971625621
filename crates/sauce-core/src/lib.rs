//! Data model and DSP core for the sauce modular synth engine (spec §1–§4).
//!
//! This crate has no I/O and spawns no threads: it is the fixed-topology
//! synthesis graph, the unified parameter grid, the modulator physics
//! cores, and the descriptor/registry types that `sauce-engine` wires into
//! a real-time audio callback and `sauce-control` drives from the network.

pub mod bus;
pub mod clock;
pub mod descriptor;
pub mod dsp;
pub mod errors;
pub mod grid;
pub mod master_chain;
pub mod message;
pub mod midi;
pub mod mixer;
pub mod modulator;
pub mod registry;
pub mod routing;
pub mod slot;
pub mod strip;
pub mod voice;

pub const NUM_SLOTS: usize = 8;
pub const NUM_MOD_SLOTS: usize = 4;
pub const NUM_FX_SLOTS: usize = 4;
