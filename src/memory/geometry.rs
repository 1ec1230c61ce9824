//! Device Geometry Validation.
//!
//! Turns a raw [`DramConfig`] into an immutable [`DeviceGeometry`]. Every
//! field must be a positive integer, the chips must add up to the DRAM
//! capacity, and each chip's rows, banks and columns must add up to the chip
//! capacity. A geometry that fails any check is never constructed.

use crate::common::ConfigError;
use crate::config::{DramConfig, ResetPolicy};
use crate::memory::codec;

/// Number of MB per GB used when comparing chip and DRAM capacities.
const MB_PER_GB: u128 = 1024;

/// Number of bytes per MB used when comparing chip capacity with its cells.
const BYTES_PER_MB: u128 = 1_000_000;

/// DRAM timing constants in cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Row precharge (closing the open row).
    pub rp: u64,
    /// Row to column delay (activating a row).
    pub rcd: u64,
    /// Column latency.
    pub cl: u64,
    /// Write recovery.
    pub wr: u64,
}

/// Validated, immutable description of a DRAM device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceGeometry {
    total_capacity_gb: u64,
    clock_multiplier: u64,
    chip_count: usize,
    chip_capacity_mb: u64,
    rows: usize,
    banks: usize,
    columns: usize,
    timing: Timings,
    initial_wait: u64,
    reset_policy: ResetPolicy,
    address_bits: u32,
}

impl DeviceGeometry {
    /// Validates a raw configuration.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::NotPositive`] if any size, timing or the clock is zero or negative.
    /// * [`ConfigError::CapacityMismatch`] if `number * capacity / 1024` differs from the DRAM capacity.
    /// * [`ConfigError::ChipGeometryMismatch`] if `rows * banks * columns` differs from the chip capacity.
    /// * [`ConfigError::AddressTooWide`] if the capacity needs more than 64 address bits.
    pub fn from_config(config: &DramConfig) -> Result<Self, ConfigError> {
        let chips = &config.chips;
        let chip_count = positive("chips.number", chips.number)?;
        let chip_capacity_mb = positive("chips.capacity", chips.capacity)?;
        let rows = positive("chips.rows", chips.rows)?;
        let columns = positive("chips.columns", chips.columns)?;
        let banks = positive("chips.banks", chips.banks)?;

        let timing = Timings {
            rp: positive("times.RP", config.times.rp)?,
            rcd: positive("times.RCD", config.times.rcd)?,
            cl: positive("times.CL", config.times.cl)?,
            wr: positive("times.WR", config.times.wr)?,
        };
        let clock_multiplier = positive("clock", config.clock)?;
        let total_capacity_gb = positive("capacity", config.capacity)?;

        let chips_mb = chip_count as u128 * chip_capacity_mb as u128;
        if chips_mb != total_capacity_gb as u128 * MB_PER_GB {
            return Err(ConfigError::CapacityMismatch {
                chips_mb,
                dram_gb: total_capacity_gb,
            });
        }

        let cells = rows as u128 * banks as u128 * columns as u128;
        if cells != chip_capacity_mb as u128 * BYTES_PER_MB {
            return Err(ConfigError::ChipGeometryMismatch {
                capacity_mb: chip_capacity_mb,
                rows,
                banks,
                columns,
            });
        }

        let address_bits = codec::address_width(total_capacity_gb);
        if address_bits > u64::BITS {
            return Err(ConfigError::AddressTooWide(address_bits));
        }

        Ok(Self {
            total_capacity_gb,
            clock_multiplier,
            chip_count: chip_count as usize,
            chip_capacity_mb,
            rows: rows as usize,
            banks: banks as usize,
            columns: columns as usize,
            timing,
            initial_wait: config.wait,
            reset_policy: config.reset_policy,
            address_bits,
        })
    }

    pub fn total_capacity_gb(&self) -> u64 {
        self.total_capacity_gb
    }

    /// Cycles per abstract time unit.
    pub fn clock_multiplier(&self) -> u64 {
        self.clock_multiplier
    }

    pub fn chip_count(&self) -> usize {
        self.chip_count
    }

    pub fn chip_capacity_mb(&self) -> u64 {
        self.chip_capacity_mb
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn banks(&self) -> usize {
        self.banks
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn timing(&self) -> Timings {
        self.timing
    }

    /// Cycle at which the bus is free before the first access.
    pub fn initial_wait(&self) -> u64 {
        self.initial_wait
    }

    pub fn reset_policy(&self) -> ResetPolicy {
        self.reset_policy
    }

    /// Width of an encoded address, derived from the total capacity.
    pub fn address_bits(&self) -> u32 {
        self.address_bits
    }
}

impl TryFrom<&DramConfig> for DeviceGeometry {
    type Error = ConfigError;

    fn try_from(config: &DramConfig) -> Result<Self, Self::Error> {
        DeviceGeometry::from_config(config)
    }
}

fn positive(field: &'static str, value: i64) -> Result<u64, ConfigError> {
    match u64::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ConfigError::NotPositive { field, value }),
    }
}
