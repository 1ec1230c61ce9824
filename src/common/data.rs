//! Memory Access Types.
//!
//! This module defines the classification of memory accesses arriving from the
//! trace producer. The access mode decides whether the write-recovery penalty
//! is charged and feeds the write counter of the statistics.

use crate::common::error::TraceError;
use std::fmt;
use std::str::FromStr;

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    /// Data read access.
    ///
    /// Encoded as `r` (or `read`) in the trace.
    Read,

    /// Data write access.
    ///
    /// Encoded as `w` (or `write`) in the trace. Charged an extra
    /// write-recovery (`WR`) delay by the timing model.
    Write,
}

impl AccessType {
    /// Returns `true` for write accesses.
    pub fn is_write(self) -> bool {
        self == AccessType::Write
    }
}

impl FromStr for AccessType {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "r" | "read" => Ok(AccessType::Read),
            "w" | "write" => Ok(AccessType::Write),
            _ => Err(TraceError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessType::Read => write!(f, "r"),
            AccessType::Write => write!(f, "w"),
        }
    }
}
