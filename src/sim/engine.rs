//! Access Loop.
//!
//! Pulls one trace event at a time, decodes and services the access, records
//! its cost and reports the total latency, until the source delivers a halt.

use crate::common::SimError;
use crate::memory::{AccessRecord, AccessTiming, DeviceGeometry, DramController};
use crate::sim::trace::{LatencySink, TraceEvent, TraceRecord, TraceSource};
use crate::stats::{Statistics, StatsReport};
use log::info;

/// A DRAM simulation instance.
///
/// Owns the controller state and the statistics; independent instances do
/// not share anything.
pub struct Simulator {
    controller: DramController,
    stats: Statistics,
}

impl Simulator {
    pub fn new(geometry: DeviceGeometry) -> Self {
        Self {
            controller: DramController::new(geometry),
            stats: Statistics::default(),
        }
    }

    pub fn controller(&self) -> &DramController {
        &self.controller
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Finalizes the statistics gathered so far.
    pub fn report(&self) -> StatsReport {
        self.stats.finalize()
    }

    /// Services a single trace access.
    ///
    /// # Errors
    ///
    /// * [`SimError::Decode`] if the address cannot be routed to the device.
    /// * [`SimError::Timing`] if the cost of the access overflows.
    ///
    /// Device and statistics state are left untouched in either case.
    pub fn step(&mut self, record: &TraceRecord) -> Result<AccessTiming, SimError> {
        let addr = self.controller.codec().decode(record.address)?;
        let access = AccessRecord {
            block_size: record.block_size,
            mode: record.mode,
            addr,
            issue_time: record.issue_time,
        };

        let timing = self.controller.access(&access)?;
        self.stats.record(&timing, access.mode);
        Ok(timing)
    }

    /// Runs until `source` delivers a halt, reporting every latency to `sink`.
    ///
    /// # Returns
    ///
    /// The finalized statistics of the run.
    pub fn run<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<StatsReport, SimError>
    where
        S: TraceSource + ?Sized,
        K: LatencySink + ?Sized,
    {
        loop {
            match source.next_event()? {
                TraceEvent::Access(record) => {
                    let timing = self.step(&record)?;
                    sink.emit(timing.total)?;
                }
                TraceEvent::Halt => {
                    info!("halt after {} accesses", self.stats.num_access);
                    return Ok(self.report());
                }
            }
        }
    }
}
