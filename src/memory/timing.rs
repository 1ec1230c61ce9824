//! DRAM Timing Model.
//!
//! Classifies each access against the row buffer of the addressed bank and
//! converts the classification into cycles:
//!
//! * **Page hit:** the requested row is already open: `CL`.
//! * **Open-bank miss:** another row of the bank is open and must be
//!   precharged first: `RCD + CL + RP`.
//! * **First access:** the bank is closed and only needs activation: `RCD + CL`.
//!
//! The latency is scaled by the clock multiplier and combined with the time
//! spent waiting for the shared bus, the data transfer time and, for writes,
//! the write-recovery penalty.

use crate::common::TimingError;
use crate::memory::chip::Chip;
use crate::memory::controller::AccessRecord;
use crate::memory::geometry::{DeviceGeometry, Timings};
use std::fmt;

/// Bits transferred per bus cycle.
const BITS_PER_TRANSFER: u64 = 8;

/// Row buffer classification of an access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowBufferOutcome {
    /// The requested row was already open.
    Hit,
    /// A different row of the bank was open.
    OpenMiss,
    /// No row of the bank was open.
    FirstAccess,
}

impl RowBufferOutcome {
    /// Classifies an access to `(bank, row)` against the state of `chip`.
    pub fn classify(chip: &Chip, bank: usize, row: usize) -> Self {
        if chip.is_row_open(bank, row) {
            RowBufferOutcome::Hit
        } else if chip.any_open(bank) {
            RowBufferOutcome::OpenMiss
        } else {
            RowBufferOutcome::FirstAccess
        }
    }

    /// Latency in device cycles, before clock scaling.
    ///
    /// Returns `None` if the sum of the timing constants overflows.
    pub fn latency_cycles(self, timing: &Timings) -> Option<u64> {
        match self {
            RowBufferOutcome::Hit => Some(timing.cl),
            RowBufferOutcome::OpenMiss => timing
                .rcd
                .checked_add(timing.cl)
                .and_then(|c| c.checked_add(timing.rp)),
            RowBufferOutcome::FirstAccess => timing.rcd.checked_add(timing.cl),
        }
    }

    pub fn is_hit(self) -> bool {
        self == RowBufferOutcome::Hit
    }
}

impl fmt::Display for RowBufferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RowBufferOutcome::Hit => "page hit",
            RowBufferOutcome::OpenMiss => "open-bank miss",
            RowBufferOutcome::FirstAccess => "first access",
        };
        f.write_str(name)
    }
}

/// Availability of the shared command/data bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusState {
    free_at: u64,
}

impl BusState {
    pub fn new(free_at: u64) -> Self {
        Self { free_at }
    }

    /// Cycle at which the next access may start.
    pub fn free_at(&self) -> u64 {
        self.free_at
    }

    /// Stall an access issued at `issue_time` spends waiting for the bus.
    pub fn wait_for(&self, issue_time: u64) -> u64 {
        self.free_at.saturating_sub(issue_time)
    }

    /// Occupies the bus until `free_at`.
    pub fn reserve(&mut self, free_at: u64) {
        self.free_at = free_at;
    }
}

/// Cost breakdown of one access, in clock-scaled cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessTiming {
    pub outcome: RowBufferOutcome,
    pub wait: u64,
    pub latency: u64,
    pub transfer: u64,
    pub write_penalty: u64,
    /// Value reported back to the trace producer.
    pub total: u64,
}

/// Applies the DRAM timing constants to single accesses.
#[derive(Debug, Clone, Copy)]
pub struct TimingModel {
    timing: Timings,
    clock: u64,
}

impl TimingModel {
    pub fn new(geometry: &DeviceGeometry) -> Self {
        Self {
            timing: geometry.timing(),
            clock: geometry.clock_multiplier(),
        }
    }

    /// Services `access` on `chip`.
    ///
    /// Classifies the access, opens the accessed row, computes the cost and
    /// moves the bus-free time to the end of the access.
    ///
    /// # Errors
    ///
    /// [`TimingError::Overflow`] if any part of the cost, or the end of the
    /// access on the bus, does not fit in 64 bits. `chip` and `bus` are left
    /// untouched in that case.
    pub fn evaluate(
        &self,
        chip: &mut Chip,
        bus: &mut BusState,
        access: &AccessRecord,
    ) -> Result<AccessTiming, TimingError> {
        let (bank, row) = (access.addr.bank, access.addr.row);
        let outcome = RowBufferOutcome::classify(chip, bank, row);

        let wait = bus.wait_for(access.issue_time);
        let latency = outcome
            .latency_cycles(&self.timing)
            .and_then(|cycles| cycles.checked_mul(self.clock))
            .ok_or(overflow("latency"))?;
        let transfer = self.transfer_time(access.block_size)?;
        let write_penalty = if access.mode.is_write() {
            self.timing
                .wr
                .checked_mul(self.clock)
                .ok_or(overflow("write penalty"))?
        } else {
            0
        };
        let total = [latency, transfer, write_penalty]
            .into_iter()
            .try_fold(wait, u64::checked_add)
            .ok_or(overflow("total time"))?;
        let free_at = access
            .issue_time
            .checked_add(total)
            .ok_or(overflow("bus release time"))?;

        chip.open_only(bank, row);
        bus.reserve(free_at);

        Ok(AccessTiming {
            outcome,
            wait,
            latency,
            transfer,
            write_penalty,
            total,
        })
    }

    /// Cycles needed to move `block_size` bits over the bus.
    pub fn transfer_time(&self, block_size: u64) -> Result<u64, TimingError> {
        (block_size / BITS_PER_TRANSFER)
            .checked_mul(self.clock)
            .ok_or(overflow("transfer time"))
    }
}

fn overflow(quantity: &'static str) -> TimingError {
    TimingError::Overflow { quantity }
}
