//! Error types.
//!
//! Each stage of the simulator has its own error enum so callers can tell a
//! bad configuration apart from a trace that does not fit the configured
//! device. `SimError` is the umbrella type returned by the access loop.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading or validating the device configuration.
///
/// All of these are fatal: no engine is created.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration: {0}")]
    Parse(String),
    #[error("unsupported configuration format '{0}' (expected .yml, .yaml or .toml)")]
    UnsupportedFormat(String),
    #[error("configuration document contains no DRAM entry")]
    EmptyDocument,
    #[error("'{field}' must be a positive integer (got {value})")]
    NotPositive { field: &'static str, value: i64 },
    #[error("chips capacity ({chips_mb}MB) not compatible with DRAM capacity ({dram_gb}GB)")]
    CapacityMismatch { chips_mb: u128, dram_gb: u64 },
    #[error(
        "chip capacity ({capacity_mb}MB) not compatible with chip geometry \
         ({rows} rows x {banks} banks x {columns} columns)"
    )]
    ChipGeometryMismatch {
        capacity_mb: u64,
        rows: u64,
        banks: u64,
        columns: u64,
    },
    #[error("a {0}-bit address does not fit in 64 bits")]
    AddressTooWide(u32),
}

/// Failures while routing an address to device coordinates.
///
/// Raised at runtime when a trace does not fit the configured geometry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("address has {available} bits but the geometry needs {required}")]
    TooShort { available: u32, required: u32 },
    #[error("decoded {field} index {index} is outside the device (limit {limit})")]
    OutOfRange {
        field: &'static str,
        index: usize,
        limit: usize,
    },
}

/// An access whose cost does not fit in 64-bit cycle counts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimingError {
    #[error("{quantity} of the access overflows 64-bit cycles")]
    Overflow { quantity: &'static str },
}

/// Failures while parsing a trace line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    #[error("malformed trace line '{line}': {reason}")]
    Malformed { line: String, reason: String },
    #[error("unknown access mode '{0}'")]
    UnknownMode(String),
}

/// Statistics could not be finalized because nothing was recorded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("no accesses recorded")]
    NoAccesses,
    #[error("no page hits or misses recorded")]
    NoPageAccesses,
}

/// Errors surfaced by the access loop.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Timing(#[from] TimingError),
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("trace producer disconnected")]
    Disconnected,
}
