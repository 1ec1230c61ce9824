//! Common types used throughout the DRAM simulator.
//!
//! This module provides the access classification and the error types shared
//! by the configuration loader, the memory model and the access loop.

/// Memory access type definitions.
pub mod data;

/// Error types for every stage of the simulator.
pub mod error;

pub use data::AccessType;
pub use error::{ConfigError, DecodeError, SimError, StatsError, TimingError, TraceError};
