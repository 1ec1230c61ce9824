//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use dram_simulator::common::AccessType;
use dram_simulator::config::{ChipsConfig, DramConfig, ResetPolicy, TimesConfig};
use dram_simulator::memory::DeviceGeometry;
use dram_simulator::sim::TraceRecord;

/// Columns per bank giving 2 x 2 x 128 000 000 = 512 000 000 cells per chip.
pub const SCENARIO_COLUMNS: i64 = 128_000_000;

/// Creates a 1 GB, two-chip configuration with two rows and two banks per chip.
///
/// Field widths: row 1, chip 1, bank 1, column 27, filling the 30-bit address.
pub fn scenario_config() -> DramConfig {
    DramConfig {
        capacity: 1,
        clock: 4,
        chips: ChipsConfig {
            number: 2,
            capacity: 512,
            rows: 2,
            columns: SCENARIO_COLUMNS,
            banks: 2,
        },
        times: TimesConfig {
            rp: 1,
            rcd: 1,
            cl: 1,
            wr: 1,
        },
        wait: 0,
        reset_policy: ResetPolicy::Chip,
    }
}

pub fn scenario_geometry() -> DeviceGeometry {
    DeviceGeometry::from_config(&scenario_config()).expect("scenario geometry is valid")
}

pub fn scenario_geometry_with(policy: ResetPolicy) -> DeviceGeometry {
    let mut config = scenario_config();
    config.reset_policy = policy;
    DeviceGeometry::from_config(&config).expect("scenario geometry is valid")
}

/// Byte address of `(row, chip, bank, column)` in the scenario geometry.
pub fn scenario_address(row: u64, chip: u64, bank: u64, column: u64) -> u64 {
    (row << 29) | (chip << 28) | (bank << 27) | column
}

pub fn read(address: u64, issue_time: u64) -> TraceRecord {
    TraceRecord {
        block_size: 64,
        mode: AccessType::Read,
        address,
        issue_time,
    }
}

pub fn write(address: u64, issue_time: u64) -> TraceRecord {
    TraceRecord {
        block_size: 64,
        mode: AccessType::Write,
        address,
        issue_time,
    }
}
