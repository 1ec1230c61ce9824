//! Simulation statistics collection and reporting.
//!
//! Tracks access counts, row buffer hits and misses, and the running sums of
//! the per-access times. At the end of a run the sums are averaged over the
//! number of accesses and the page hit/miss probabilities are derived.

use crate::common::{AccessType, StatsError};
use crate::memory::AccessTiming;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Running counters and time sums over all serviced accesses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub num_access: u64,
    pub page_hits: u64,
    pub page_misses: u64,
    pub writes: u64,

    pub total: u64,
    pub wait: u64,
    pub latency: u64,
    pub transfer: u64,
}

/// Per-access averages of the time sums.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Averages {
    pub total: f64,
    pub wait: f64,
    pub latency: f64,
    pub transfer: f64,
}

/// Open page hit and miss probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageProbabilities {
    pub hit: f64,
    pub miss: f64,
}

impl Statistics {
    /// Accounts one serviced access.
    ///
    /// The time sums saturate at `u64::MAX` instead of wrapping.
    pub fn record(&mut self, timing: &AccessTiming, mode: AccessType) {
        self.num_access += 1;

        self.total = self.total.saturating_add(timing.total);
        self.wait = self.wait.saturating_add(timing.wait);
        self.latency = self.latency.saturating_add(timing.latency);
        self.transfer = self.transfer.saturating_add(timing.transfer);

        if timing.outcome.is_hit() {
            self.page_hits += 1;
        } else {
            self.page_misses += 1;
        }
        if mode.is_write() {
            self.writes += 1;
        }
    }

    /// Returns `true` if any time sum has saturated.
    pub fn is_saturated(&self) -> bool {
        [self.total, self.wait, self.latency, self.transfer].contains(&u64::MAX)
    }

    /// Divides each time sum by the number of accesses.
    ///
    /// # Errors
    ///
    /// [`StatsError::NoAccesses`] if nothing was recorded.
    pub fn averages(&self) -> Result<Averages, StatsError> {
        if self.num_access == 0 {
            return Err(StatsError::NoAccesses);
        }
        let n = self.num_access as f64;
        Ok(Averages {
            total: self.total as f64 / n,
            wait: self.wait as f64 / n,
            latency: self.latency as f64 / n,
            transfer: self.transfer as f64 / n,
        })
    }

    /// `P(hit) = hits / (hits + misses)` and `P(miss) = 1 - P(hit)`.
    ///
    /// # Errors
    ///
    /// [`StatsError::NoPageAccesses`] if no hit or miss was recorded.
    pub fn page_probabilities(&self) -> Result<PageProbabilities, StatsError> {
        let classified = self.page_hits + self.page_misses;
        if classified == 0 {
            return Err(StatsError::NoPageAccesses);
        }
        let hit = self.page_hits as f64 / classified as f64;
        Ok(PageProbabilities {
            hit,
            miss: 1.0 - hit,
        })
    }

    /// Produces the end-of-run report.
    ///
    /// With no accesses recorded the report carries the counters only.
    pub fn finalize(&self) -> StatsReport {
        StatsReport {
            counters: self.clone(),
            averages: self.averages().ok(),
            probabilities: self.page_probabilities().ok(),
        }
    }
}

/// Finalized statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub counters: Statistics,
    pub averages: Option<Averages>,
    pub probabilities: Option<PageProbabilities>,
}

impl StatsReport {
    /// Returns `true` if averages could not be computed.
    pub fn is_empty(&self) -> bool {
        self.averages.is_none()
    }

    /// Writes one `key: value` line per statistic.
    ///
    /// Time statistics are averaged; they are omitted from an empty report,
    /// as are the page probabilities.
    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        let c = &self.counters;
        writeln!(out, "num_access: {}", c.num_access)?;
        if let Some(avg) = &self.averages {
            writeln!(out, "total: {}", avg.total)?;
            writeln!(out, "wait: {}", avg.wait)?;
            writeln!(out, "latency: {}", avg.latency)?;
            writeln!(out, "transfer: {}", avg.transfer)?;
        }
        writeln!(out, "write: {}", c.writes)?;
        writeln!(out, "page_hits: {}", c.page_hits)?;
        writeln!(out, "page_misses: {}", c.page_misses)?;
        if let Some(p) = &self.probabilities {
            writeln!(out, "P(page hit): {}", p.hit)?;
            writeln!(out, "P(page miss): {}", p.miss)?;
        }
        out.flush()
    }

    /// Writes the report to `path`, replacing any previous file.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Prints a formatted summary of the run.
    pub fn print(&self) {
        let c = &self.counters;

        println!("\n==========================================================");
        println!("DRAM SIMULATION STATISTICS");
        println!("==========================================================");
        println!("dram.accesses            {}", c.num_access);
        println!("dram.writes              {}", c.writes);
        println!("----------------------------------------------------------");
        println!("ROW BUFFER");
        println!("  page.hits              {}", c.page_hits);
        println!("  page.misses            {}", c.page_misses);
        match &self.probabilities {
            Some(p) => {
                println!("  page.p_hit             {:.4}", p.hit);
                println!("  page.p_miss            {:.4}", p.miss);
            }
            None => println!("  page.p_hit             n/a"),
        }
        println!("----------------------------------------------------------");
        println!("AVERAGE CYCLES PER ACCESS");
        match &self.averages {
            Some(avg) => {
                println!("  time.total             {:.2}", avg.total);
                println!("  time.wait              {:.2}", avg.wait);
                println!("  time.latency           {:.2}", avg.latency);
                println!("  time.transfer          {:.2}", avg.transfer);
            }
            None => println!("  no accesses recorded"),
        }
        println!("==========================================================");
    }
}
