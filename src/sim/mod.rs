//! Simulation harness.
//!
//! The access loop and the ways trace events reach it: the file handoff used
//! with an external instruction-set simulator, batch replay of a trace file,
//! and an in-process channel.

/// In-process producer/consumer channel.
pub mod channel;

/// The access loop.
pub mod engine;

/// Polling file handoff with an external producer.
pub mod handoff;

/// SIGINT/SIGTERM handling.
pub mod interrupt;

/// Batch replay of trace files.
pub mod replay;

/// Trace line format and the source/sink traits.
pub mod trace;

pub use engine::Simulator;
pub use interrupt::Interrupt;
pub use trace::{LatencySink, TraceEvent, TraceRecord, TraceSource};
