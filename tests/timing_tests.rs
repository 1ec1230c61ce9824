//! Integration tests for row buffer state and the timing model.

mod common;

use common::{
    read, scenario_address, scenario_config, scenario_geometry, scenario_geometry_with, write,
};
use dram_simulator::common::{AccessType, SimError, TimingError};
use dram_simulator::config::ResetPolicy;
use dram_simulator::memory::{
    AccessRecord, BusState, Chip, DeviceGeometry, DramAddr, DramController, RowBufferOutcome,
    Timings,
};
use dram_simulator::sim::{Simulator, TraceRecord};
use proptest::prelude::*;

fn access(addr: DramAddr, mode: AccessType, issue_time: u64) -> AccessRecord {
    AccessRecord {
        block_size: 64,
        mode,
        addr,
        issue_time,
    }
}

/// Tests that a fresh chip has every bank closed.
#[test]
fn test_fresh_chip_closed() {
    let chip = Chip::new(4, 8, ResetPolicy::Chip);

    assert_eq!(chip.banks(), 4);
    assert_eq!(chip.rows(), 8);
    for bank in 0..4 {
        assert!(!chip.any_open(bank));
        assert_eq!(chip.open_row(bank), None);
    }
}

/// Tests that the chip-wide policy keeps a single open row per chip.
#[test]
fn test_chip_policy_single_open_row() {
    let mut chip = Chip::new(4, 8, ResetPolicy::Chip);
    chip.open_only(1, 3);
    chip.open_only(2, 5);

    assert!(!chip.any_open(1));
    assert!(chip.is_row_open(2, 5));
    assert!(!chip.is_row_open(2, 3));
}

/// Tests that the per-bank policy leaves other banks untouched.
#[test]
fn test_bank_policy_keeps_other_banks() {
    let mut chip = Chip::new(4, 8, ResetPolicy::Bank);
    chip.open_only(1, 3);
    chip.open_only(2, 5);
    chip.open_only(2, 6);

    assert!(chip.is_row_open(1, 3));
    assert!(chip.is_row_open(2, 6));
    assert!(!chip.is_row_open(2, 5));

    chip.close_all();
    assert!(!chip.any_open(1));
    assert!(!chip.any_open(2));
}

/// Tests classification of the three row buffer cases.
#[test]
fn test_classify() {
    let mut chip = Chip::new(2, 2, ResetPolicy::Chip);
    assert_eq!(
        RowBufferOutcome::classify(&chip, 0, 1),
        RowBufferOutcome::FirstAccess
    );

    chip.open_only(0, 1);
    assert_eq!(RowBufferOutcome::classify(&chip, 0, 1), RowBufferOutcome::Hit);
    assert_eq!(
        RowBufferOutcome::classify(&chip, 0, 0),
        RowBufferOutcome::OpenMiss
    );
    assert_eq!(
        RowBufferOutcome::classify(&chip, 1, 1),
        RowBufferOutcome::FirstAccess
    );
}

/// Tests the cycle counts of each outcome.
#[test]
fn test_latency_cycles() {
    let timing = Timings {
        rp: 11,
        rcd: 13,
        cl: 17,
        wr: 12,
    };

    assert_eq!(RowBufferOutcome::Hit.latency_cycles(&timing), Some(17));
    assert_eq!(RowBufferOutcome::OpenMiss.latency_cycles(&timing), Some(41));
    assert_eq!(RowBufferOutcome::FirstAccess.latency_cycles(&timing), Some(30));
    assert!(RowBufferOutcome::Hit.is_hit());
    assert!(!RowBufferOutcome::FirstAccess.is_hit());
}

/// Tests bus waiting and reservation.
#[test]
fn test_bus_state() {
    let mut bus = BusState::new(40);

    assert_eq!(bus.wait_for(5), 35);
    assert_eq!(bus.wait_for(40), 0);
    assert_eq!(bus.wait_for(100), 0);

    bus.reserve(76);
    assert_eq!(bus.free_at(), 76);
}

/// Tests the two-access scenario: a first access followed by a page hit.
#[test]
fn test_first_access_then_hit() {
    let mut controller = DramController::new(scenario_geometry());
    let addr = DramAddr::new(0, 0, 0, 0);

    let first = controller.access(&access(addr, AccessType::Read, 0)).unwrap();
    assert_eq!(first.outcome, RowBufferOutcome::FirstAccess);
    assert_eq!(first.wait, 0);
    assert_eq!(first.latency, 8);
    assert_eq!(first.transfer, 32);
    assert_eq!(first.write_penalty, 0);
    assert_eq!(first.total, 40);
    assert_eq!(controller.bus().free_at(), 40);

    let second = controller.access(&access(addr, AccessType::Read, 5)).unwrap();
    assert_eq!(second.outcome, RowBufferOutcome::Hit);
    assert_eq!(second.wait, 35);
    assert_eq!(second.latency, 4);
    assert_eq!(second.transfer, 32);
    assert_eq!(second.total, 71);
    assert_eq!(controller.bus().free_at(), 76);
}

/// Tests an open-bank miss on a write.
#[test]
fn test_open_miss_write() {
    let mut controller = DramController::new(scenario_geometry());
    let open = DramAddr::new(0, 0, 0, 0);
    controller.access(&access(open, AccessType::Read, 0)).unwrap();
    controller.access(&access(open, AccessType::Read, 5)).unwrap();

    let third = controller
        .access(&access(DramAddr::new(1, 0, 0, 0), AccessType::Write, 100))
        .unwrap();
    assert_eq!(third.outcome, RowBufferOutcome::OpenMiss);
    assert_eq!(third.wait, 0);
    assert_eq!(third.latency, 12);
    assert_eq!(third.transfer, 32);
    assert_eq!(third.write_penalty, 4);
    assert_eq!(third.total, 48);
    assert_eq!(controller.bus().free_at(), 148);
}

/// Tests that the chip-wide reset turns a return to the first bank into a first access.
#[test]
fn test_chip_reset_between_banks() {
    let mut controller = DramController::new(scenario_geometry_with(ResetPolicy::Chip));
    let bank0 = DramAddr::new(0, 0, 0, 0);
    let bank1 = DramAddr::new(0, 0, 1, 0);

    controller.access(&access(bank0, AccessType::Read, 0)).unwrap();
    let other = controller.access(&access(bank1, AccessType::Read, 1000)).unwrap();
    assert_eq!(other.outcome, RowBufferOutcome::FirstAccess);

    let back = controller.access(&access(bank0, AccessType::Read, 2000)).unwrap();
    assert_eq!(back.outcome, RowBufferOutcome::FirstAccess);
}

/// Tests that the per-bank policy keeps the first bank's row buffered.
#[test]
fn test_bank_reset_between_banks() {
    let mut controller = DramController::new(scenario_geometry_with(ResetPolicy::Bank));
    let bank0 = DramAddr::new(0, 0, 0, 0);
    let bank1 = DramAddr::new(0, 0, 1, 0);

    controller.access(&access(bank0, AccessType::Read, 0)).unwrap();
    controller.access(&access(bank1, AccessType::Read, 1000)).unwrap();
    let back = controller.access(&access(bank0, AccessType::Read, 2000)).unwrap();
    assert_eq!(back.outcome, RowBufferOutcome::Hit);
}

/// Tests that chips keep independent row buffers.
#[test]
fn test_chips_independent() {
    let mut controller = DramController::new(scenario_geometry());

    let chip0 = DramAddr::new(1, 0, 0, 0);
    controller.access(&access(chip0, AccessType::Read, 0)).unwrap();
    let other_chip = controller
        .access(&access(DramAddr::new(0, 1, 0, 0), AccessType::Read, 100))
        .unwrap();
    assert_eq!(other_chip.outcome, RowBufferOutcome::FirstAccess);

    assert_eq!(controller.chip(0).unwrap().open_row(0), Some(1));
    assert_eq!(controller.chip(1).unwrap().open_row(0), Some(0));
    assert!(controller.chip(2).is_none());
}

/// Tests that the configured initial wait delays the first access.
#[test]
fn test_initial_wait() {
    let mut config = scenario_config();
    config.wait = 10;
    let geometry = DeviceGeometry::from_config(&config).unwrap();
    let mut sim = Simulator::new(geometry);

    let timing = sim.step(&read(scenario_address(0, 0, 0, 0), 4)).unwrap();
    assert_eq!(timing.wait, 6);
    assert_eq!(timing.total, 46);
}

/// Tests that the write penalty scales with the clock multiplier.
#[test]
fn test_write_penalty_scaled() {
    let mut sim = Simulator::new(scenario_geometry());
    let timing = sim.step(&write(scenario_address(0, 0, 0, 0), 0)).unwrap();

    assert_eq!(timing.write_penalty, 4);
    assert_eq!(timing.total, 44);
}

/// Tests that an out-of-range bank is rejected like an out-of-range row.
#[test]
#[should_panic(expected = "bank 4 outside chip with 4 banks")]
fn test_open_only_bank_out_of_range() {
    let mut chip = Chip::new(4, 8, ResetPolicy::Bank);
    chip.open_only(4, 0);
}

/// Tests that timing constants whose sum overflows yield no latency.
#[test]
fn test_latency_cycles_overflow() {
    let timing = Timings {
        rp: u64::MAX,
        rcd: u64::MAX,
        cl: 1,
        wr: 1,
    };

    assert_eq!(RowBufferOutcome::Hit.latency_cycles(&timing), Some(1));
    assert_eq!(RowBufferOutcome::FirstAccess.latency_cycles(&timing), None);
    assert_eq!(RowBufferOutcome::OpenMiss.latency_cycles(&timing), None);
}

/// Tests that an oversized block is an error and leaves the device untouched.
#[test]
fn test_transfer_overflow() {
    let mut config = scenario_config();
    config.clock = 16;
    let mut sim = Simulator::new(DeviceGeometry::from_config(&config).unwrap());
    let record = TraceRecord {
        block_size: u64::MAX,
        ..read(scenario_address(0, 0, 0, 0), 0)
    };

    match sim.step(&record) {
        Err(SimError::Timing(TimingError::Overflow { quantity })) => {
            assert_eq!(quantity, "transfer time")
        }
        other => panic!("expected transfer overflow, got {:?}", other),
    }
    assert_eq!(sim.stats().num_access, 0);
    assert_eq!(sim.controller().bus().free_at(), 0);
    assert!(!sim.controller().chip(0).unwrap().any_open(0));
}

/// Tests large blocks: statistics saturate, then the bus clock overflows cleanly.
#[test]
fn test_large_blocks_saturate_then_overflow() {
    let mut sim = Simulator::new(scenario_geometry());
    let address = scenario_address(0, 0, 0, 0);
    let block_size = u64::MAX / 4 - 100;

    for i in 0..4 {
        let record = TraceRecord {
            block_size,
            ..read(address, 5 * i)
        };
        sim.step(&record).unwrap();
    }
    assert_eq!(sim.stats().num_access, 4);
    assert_eq!(sim.stats().total, u64::MAX);
    assert!(sim.stats().is_saturated());

    let overflowed = (4..16).find_map(|i| {
        let record = TraceRecord {
            block_size,
            ..read(address, 5 * i)
        };
        sim.step(&record).err()
    });
    assert!(matches!(overflowed, Some(SimError::Timing(_))));
}

proptest! {
    /// Tests that the bus wait never underflows and matches its definition.
    #[test]
    fn prop_bus_wait(free_at in any::<u64>(), issue in any::<u64>()) {
        let bus = BusState::new(free_at);
        let expected = if free_at > issue { free_at - issue } else { 0 };
        prop_assert_eq!(bus.wait_for(issue), expected);
    }

    /// Tests that total is the sum of its parts and the bus ends at issue plus total.
    #[test]
    fn prop_total_is_sum(
        accesses in prop::collection::vec(
            (0u64..2, 0u64..2, 0u64..2, any::<bool>(), 0u64..200),
            1..32,
        )
    ) {
        let mut sim = Simulator::new(scenario_geometry());
        let mut issue = 0;
        for (row, chip, bank, is_write, gap) in accesses {
            issue += gap;
            let address = scenario_address(row, chip, bank, 0);
            let record = if is_write { write(address, issue) } else { read(address, issue) };
            let timing = sim.step(&record).unwrap();

            prop_assert_eq!(
                timing.total,
                timing.wait + timing.latency + timing.transfer + timing.write_penalty
            );
            prop_assert_eq!(sim.controller().bus().free_at(), issue + timing.total);
        }
    }
}
