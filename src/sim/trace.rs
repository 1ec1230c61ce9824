//! Trace Records and the Source/Sink Interfaces.
//!
//! A trace line carries `block_size mode address issue_time`, whitespace
//! separated, with the address in decimal. Addresses wider than 64 bits are
//! accepted and keep only their low 64 bits. A line starting with `HALT` ends
//! the run. Sources hand one event at a time to the access loop and sinks
//! receive the total latency of every serviced access.

use crate::common::{AccessType, SimError, TraceError};
use log::warn;
use std::fmt;
use std::str::FromStr;

/// First token of the termination sentinel.
pub const HALT_TOKEN: &str = "HALT";

/// One access as issued by the trace producer, address not yet decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    /// Transfer size in bits.
    pub block_size: u64,
    pub mode: AccessType,
    /// Byte address.
    pub address: u64,
    /// Cycle at which the access is issued.
    pub issue_time: u64,
}

/// Next item delivered by a trace source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    Access(TraceRecord),
    Halt,
}

impl FromStr for TraceEvent {
    type Err = TraceError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| TraceError::Malformed {
            line: line.trim().to_string(),
            reason: reason.to_string(),
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [] => Err(malformed("empty line")),
            [first, ..] if *first == HALT_TOKEN => Ok(TraceEvent::Halt),
            [block_size, mode, address, issue_time] => {
                let block_size: u64 = block_size
                    .parse()
                    .map_err(|_| malformed("block size is not an unsigned integer"))?;
                if block_size == 0 {
                    return Err(malformed("block size must be positive"));
                }
                Ok(TraceEvent::Access(TraceRecord {
                    block_size,
                    mode: mode.parse()?,
                    address: parse_address(address)
                        .ok_or_else(|| malformed("address is not an unsigned decimal integer"))?,
                    issue_time: issue_time
                        .parse()
                        .map_err(|_| malformed("issue time is not an unsigned integer"))?,
                }))
            }
            _ => Err(malformed("expected 'block_size mode address issue_time'")),
        }
    }
}

/// Parses a decimal address of any length, keeping its low 64 bits.
///
/// Addresses are fitted to at most 64 bits before decoding, so digits beyond
/// that only contribute high-order bits that are dropped anyway.
fn parse_address(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.bytes().fold(0u64, |acc, b| {
        acc.wrapping_mul(10).wrapping_add(u64::from(b - b'0'))
    }))
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Access(r) => write!(
                f,
                "{} {} {} {}",
                r.block_size, r.mode, r.address, r.issue_time
            ),
            TraceEvent::Halt => f.write_str(HALT_TOKEN),
        }
    }
}

/// Parses the content of a handoff file.
///
/// A `HALT` line anywhere wins. Otherwise the last record is returned and any
/// earlier ones are dropped with a warning. Returns `None` for blank content.
pub fn parse_handoff(content: &str) -> Result<Option<TraceEvent>, TraceError> {
    let mut last = None;
    let mut records = 0usize;

    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        match line.parse::<TraceEvent>()? {
            TraceEvent::Halt => return Ok(Some(TraceEvent::Halt)),
            event => {
                records += 1;
                last = Some(event);
            }
        }
    }

    if records > 1 {
        warn!("handoff file held {records} records, only the last one is serviced");
    }
    Ok(last)
}

/// Supplies trace events to the access loop, one at a time.
pub trait TraceSource {
    /// Blocks until the next event is available.
    fn next_event(&mut self) -> Result<TraceEvent, SimError>;
}

/// Receives the total latency of each serviced access.
pub trait LatencySink {
    fn emit(&mut self, total: u64) -> Result<(), SimError>;
}
