//! DRAM Timing Simulator Library.
//!
//! This crate models the access timing of a multi-chip DRAM device driven by
//! the memory trace of an instruction-set simulator. Every access is decoded
//! to device coordinates, classified against the row buffer of its bank and
//! charged a latency from the device timing constants. The latency is
//! reported back to the producer so simulated program time advances.
//!
//! # Architecture
//!
//! * **Geometry**: validated chip count, capacities, rows, banks, columns and timings.
//! * **Codec**: capacity-sized address bits carved into row, chip, bank and column.
//! * **Row buffers**: per-chip open-row state, reset chip-wide or per bank.
//! * **Timing**: page hit, open-bank miss and first access costs plus bus, transfer and write time.
//!
//! # Modules
//!
//! * `common`: Access types and error handling.
//! * `config`: Configuration loading and parsing.
//! * `memory`: Geometry, address codec, chips and the timing controller.
//! * `sim`: Access loop, trace formats and producer handoff.
//! * `stats`: Statistics collection and reporting.

/// Access types and error definitions.
///
/// Provides the read/write classification of trace accesses and the error
/// enums returned by every stage of the simulator.
pub mod common;

/// Configuration system for the DRAM device.
///
/// Loads YAML or TOML documents describing the device and applies
/// command-line overrides before validation.
pub mod config;

/// DRAM device model.
///
/// Implements geometry validation, address decoding, row buffer state and the
/// latency model behind the memory controller.
pub mod memory;

/// Simulation harness and trace plumbing.
///
/// Drives the memory controller from a trace source and reports latencies
/// through a sink, until the producer halts.
pub mod sim;

/// Statistics collection and reporting.
///
/// Tracks accesses, page hits and misses, and the per-access time breakdown.
pub mod stats;
