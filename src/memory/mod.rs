//! DRAM memory model.
//!
//! Geometry validation, address decoding, per-chip row buffer state and the
//! timing model, tied together by the [`DramController`].

/// Row buffer state of a single chip.
pub mod chip;

/// Address to device coordinate conversion.
pub mod codec;

/// Controller owning all mutable device state.
pub mod controller;

/// Validated device description.
pub mod geometry;

/// Access classification and latency computation.
pub mod timing;

pub use chip::Chip;
pub use codec::{AddressBits, AddressCodec, DramAddr, FieldWidths};
pub use controller::{AccessRecord, DramController};
pub use geometry::{DeviceGeometry, Timings};
pub use timing::{AccessTiming, BusState, RowBufferOutcome, TimingModel};
