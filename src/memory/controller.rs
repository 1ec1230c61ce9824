//! Memory Timing Controller.
//!
//! The `DramController` owns everything that changes while a trace is
//! replayed: the row buffer state of every chip and the bus-free clock. Each
//! call to [`DramController::access`] services exactly one access.

use crate::common::{AccessType, TimingError};
use crate::memory::chip::Chip;
use crate::memory::codec::{AddressCodec, DramAddr};
use crate::memory::geometry::DeviceGeometry;
use crate::memory::timing::{AccessTiming, BusState, TimingModel};
use log::debug;

/// A trace access whose address has been decoded to device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRecord {
    /// Transfer size in bits.
    pub block_size: u64,
    pub mode: AccessType,
    pub addr: DramAddr,
    /// Cycle at which the producer issued the access.
    pub issue_time: u64,
}

/// A DRAM-aware memory controller for a multi-chip device.
///
/// Tracks the open rows of every bank of every chip to tell row buffer hits
/// from misses, and serializes accesses on a single shared bus.
#[derive(Debug, Clone)]
pub struct DramController {
    geometry: DeviceGeometry,
    codec: AddressCodec,
    timing: TimingModel,
    chips: Vec<Chip>,
    bus: BusState,
}

impl DramController {
    /// Creates a controller with every bank closed.
    ///
    /// The bus starts free at the geometry's initial wait.
    pub fn new(geometry: DeviceGeometry) -> Self {
        let chips = (0..geometry.chip_count())
            .map(|_| Chip::new(geometry.banks(), geometry.rows(), geometry.reset_policy()))
            .collect();

        Self {
            codec: AddressCodec::new(&geometry),
            timing: TimingModel::new(&geometry),
            bus: BusState::new(geometry.initial_wait()),
            chips,
            geometry,
        }
    }

    pub fn geometry(&self) -> &DeviceGeometry {
        &self.geometry
    }

    pub fn codec(&self) -> &AddressCodec {
        &self.codec
    }

    pub fn bus(&self) -> &BusState {
        &self.bus
    }

    pub fn chip(&self, index: usize) -> Option<&Chip> {
        self.chips.get(index)
    }

    /// Services one access and returns its cost.
    ///
    /// # Errors
    ///
    /// [`TimingError::Overflow`] if the cost does not fit in 64 bits. The
    /// device state is unchanged in that case.
    ///
    /// # Panics
    ///
    /// Panics if `access.addr` lies outside the device. Addresses produced by
    /// [`AddressCodec::decode`] never do.
    pub fn access(&mut self, access: &AccessRecord) -> Result<AccessTiming, TimingError> {
        let chip = &mut self.chips[access.addr.chip];
        let timing = self.timing.evaluate(chip, &mut self.bus, access)?;

        debug!(
            "{} {} bits @ {} issued {}: {} (wait {}, latency {}, transfer {}, write {}) total {}",
            access.mode,
            access.block_size,
            access.addr,
            access.issue_time,
            timing.outcome,
            timing.wait,
            timing.latency,
            timing.transfer,
            timing.write_penalty,
            timing.total
        );
        Ok(timing)
    }
}
