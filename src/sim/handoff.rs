//! File Handoff with the Trace Producer.
//!
//! The producer writes one record into the memory file whenever none is
//! pending; the consumer deletes the file as soon as it has read it. After
//! servicing the access the consumer writes the total latency into the signal
//! file, which the producer deletes once read. Both sides wait by polling at a
//! fixed interval, with no timeout. A pending signal is never overwritten, and
//! a source gated on the signal file takes no record until it is consumed.

use crate::common::SimError;
use crate::sim::interrupt::Interrupt;
use crate::sim::trace::{parse_handoff, LatencySink, TraceEvent, TraceSource};
use log::{info, trace, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Default memory file written by the producer.
pub const DEFAULT_MEMORY_FILE: &str = "memory_content.txt";

/// Default signal file written by the consumer.
pub const DEFAULT_SIGNAL_FILE: &str = "signal";

/// Default polling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_micros(1000);

/// Polls a partly written record for at most this many intervals.
const MAX_PARTIAL_POLLS: u32 = 1000;

/// Reads trace records from the producer's memory file.
pub struct MemoryFileSource {
    path: PathBuf,
    poll: Duration,
    interrupt: Interrupt,
    pending_signal: Option<PathBuf>,
    partial_polls: u32,
}

impl MemoryFileSource {
    pub fn new(path: impl Into<PathBuf>, poll: Duration, interrupt: Interrupt) -> Self {
        Self {
            path: path.into(),
            poll,
            interrupt,
            pending_signal: None,
            partial_polls: 0,
        }
    }

    /// Leaves the memory file alone while `signal` still exists.
    ///
    /// A record is then only taken once the producer has consumed the
    /// latency of the previous one.
    pub fn gated_by(mut self, signal: impl Into<PathBuf>) -> Self {
        self.pending_signal = Some(signal.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and removes the memory file if it holds a record.
    ///
    /// Content that does not parse and lacks a trailing newline is assumed
    /// to be still in the middle of a write and is polled again, up to
    /// [`MAX_PARTIAL_POLLS`] times.
    fn try_take(&mut self) -> Result<Option<TraceEvent>, SimError> {
        if let Some(signal) = &self.pending_signal {
            if signal.exists() {
                return Ok(None);
            }
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        // An empty file is still being written.
        if content.trim().is_empty() {
            return Ok(None);
        }

        match parse_handoff(&content) {
            Ok(event) => {
                self.partial_polls = 0;
                fs::remove_file(&self.path)?;
                Ok(event)
            }
            Err(e) if !content.ends_with('\n') && self.partial_polls < MAX_PARTIAL_POLLS => {
                self.partial_polls += 1;
                trace!("{} looks partly written: {}", self.path.display(), e);
                Ok(None)
            }
            Err(e) => {
                self.partial_polls = 0;
                fs::remove_file(&self.path)?;
                Err(e.into())
            }
        }
    }
}

impl TraceSource for MemoryFileSource {
    fn next_event(&mut self) -> Result<TraceEvent, SimError> {
        loop {
            if self.interrupt.is_requested() {
                info!("interrupted while waiting for {}", self.path.display());
                return Ok(TraceEvent::Halt);
            }
            if let Some(event) = self.try_take()? {
                return Ok(event);
            }
            trace!("waiting for {}", self.path.display());
            thread::sleep(self.poll);
        }
    }
}

/// Reports latencies through the signal file.
pub struct SignalFileSink {
    path: PathBuf,
    poll: Duration,
    interrupt: Interrupt,
}

impl SignalFileSink {
    pub fn new(path: impl Into<PathBuf>, poll: Duration, interrupt: Interrupt) -> Self {
        Self {
            path: path.into(),
            poll,
            interrupt,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staged = self.path.clone().into_os_string();
        staged.push(".tmp");
        PathBuf::from(staged)
    }
}

impl LatencySink for SignalFileSink {
    /// Waits for the previous signal to be consumed, then publishes `total`.
    ///
    /// The value is written to a staging file and renamed into place so the
    /// producer never observes a partially written signal. If an interrupt
    /// arrives while the previous signal is still pending, `total` is dropped
    /// and the pending signal is kept.
    fn emit(&mut self, total: u64) -> Result<(), SimError> {
        while self.path.exists() {
            if self.interrupt.is_requested() {
                warn!(
                    "interrupted with {} unconsumed, dropping latency {}",
                    self.path.display(),
                    total
                );
                return Ok(());
            }
            trace!("waiting for {} to be consumed", self.path.display());
            thread::sleep(self.poll);
        }

        let staged = self.staging_path();
        fs::write(&staged, format!("{total}\n"))?;
        fs::rename(&staged, &self.path)?;
        Ok(())
    }
}
