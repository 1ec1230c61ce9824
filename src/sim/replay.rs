//! Batch Trace Replay.
//!
//! Replays a complete trace file without a live producer. Blank lines are
//! skipped and the end of the input acts as a halt.

use crate::common::SimError;
use crate::sim::interrupt::Interrupt;
use crate::sim::trace::{LatencySink, TraceEvent, TraceSource};
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Write};
use std::path::Path;

/// Reads trace events line by line from any buffered reader.
pub struct ReplaySource<R: BufRead> {
    lines: Lines<R>,
    line_no: usize,
    interrupt: Interrupt,
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R, interrupt: Interrupt) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            interrupt,
        }
    }

    /// Number of lines consumed so far.
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl ReplaySource<BufReader<File>> {
    pub fn open(path: &Path, interrupt: Interrupt) -> Result<Self, SimError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), interrupt))
    }
}

impl<R: BufRead> TraceSource for ReplaySource<R> {
    fn next_event(&mut self) -> Result<TraceEvent, SimError> {
        if self.interrupt.is_requested() {
            info!("interrupted after {} trace lines", self.line_no);
            return Ok(TraceEvent::Halt);
        }

        for line in self.lines.by_ref() {
            let line = line?;
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Ok(line.parse::<TraceEvent>()?);
        }

        debug!("end of trace after {} lines", self.line_no);
        Ok(TraceEvent::Halt)
    }
}

/// Writes one latency per line.
pub struct WriterSink<W: Write> {
    out: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> LatencySink for WriterSink<W> {
    fn emit(&mut self, total: u64) -> Result<(), SimError> {
        writeln!(self.out, "{total}")?;
        Ok(())
    }
}
