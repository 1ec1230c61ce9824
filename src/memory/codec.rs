//! Address Codec.
//!
//! Converts a byte address coming from the trace into device coordinates.
//! The address is first fitted to a fixed width derived from the DRAM
//! capacity, then carved, starting at the most significant bit, into the row,
//! chip, bank and column fields. The field order mirrors the way a physical
//! address drives the device-select, bank-select, row and column lines and
//! must not change: trace producers rely on it.

use crate::common::DecodeError;
use crate::memory::DeviceGeometry;
use std::fmt;

/// Extra bits on top of `log2(capacity in MB)` to address individual bytes.
pub const CAPACITY_MARGIN_BITS: u32 = 20;

/// Number of bits needed to address `capacity_gb` gigabytes.
///
/// `floor(log2(capacity_gb * 1024)) + 20`, e.g. 30 bits for 1 GB.
///
/// # Panics
///
/// Panics if `capacity_gb` is zero. Validated geometries never are.
pub fn address_width(capacity_gb: u64) -> u32 {
    (capacity_gb as u128 * 1024).ilog2() + CAPACITY_MARGIN_BITS
}

/// Number of bits needed to index `count` items: `ceil(log2(count))`.
pub fn field_width(count: usize) -> u32 {
    if count <= 1 {
        0
    } else {
        (count - 1).ilog2() + 1
    }
}

fn mask(width: u32) -> u64 {
    if width >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// A fixed-width bit pattern holding an encoded address.
///
/// Bits above `width` are always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressBits {
    value: u64,
    width: u32,
}

impl AddressBits {
    /// Keeps the `width` least significant bits of `value`.
    pub fn new(value: u64, width: u32) -> Self {
        Self {
            value: value & mask(width),
            width: width.min(u64::BITS),
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Extracts `len` bits whose least significant bit sits `shift` bits above bit 0.
    fn slice(&self, shift: u32, len: u32) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.value >> shift) & mask(len)) as usize
    }
}

impl fmt::Display for AddressBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.value, width = self.width as usize)
    }
}

/// Bit widths of the address fields, in decoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldWidths {
    pub row: u32,
    pub chip: u32,
    pub bank: u32,
    pub column: u32,
}

impl FieldWidths {
    /// Sum of all field widths.
    pub fn total(&self) -> u32 {
        self.row + self.chip + self.bank + self.column
    }
}

/// Device coordinates of an access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DramAddr {
    pub row: usize,
    pub chip: usize,
    pub bank: usize,
    pub column: usize,
}

impl DramAddr {
    pub fn new(row: usize, chip: usize, bank: usize, column: usize) -> Self {
        Self {
            row,
            chip,
            bank,
            column,
        }
    }
}

impl fmt::Display for DramAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(row {}, chip {}, bank {}, column {})",
            self.row, self.chip, self.bank, self.column
        )
    }
}

/// Stateless address decoder parameterized by a device geometry.
#[derive(Debug, Clone)]
pub struct AddressCodec {
    address_bits: u32,
    widths: FieldWidths,
    rows: usize,
    chips: usize,
    banks: usize,
    columns: usize,
}

impl AddressCodec {
    /// Derives the address width and the field widths from `geometry`.
    pub fn new(geometry: &DeviceGeometry) -> Self {
        Self {
            address_bits: geometry.address_bits(),
            widths: FieldWidths {
                row: field_width(geometry.rows()),
                chip: field_width(geometry.chip_count()),
                bank: field_width(geometry.banks()),
                column: field_width(geometry.columns()),
            },
            rows: geometry.rows(),
            chips: geometry.chip_count(),
            banks: geometry.banks(),
            columns: geometry.columns(),
        }
    }

    pub fn address_bits(&self) -> u32 {
        self.address_bits
    }

    pub fn widths(&self) -> FieldWidths {
        self.widths
    }

    /// Fits `address` to the device address width.
    ///
    /// Shorter addresses are zero-extended; longer ones lose their high-order
    /// bits, which lie beyond the device capacity.
    pub fn encode_bits(&self, address: u64) -> AddressBits {
        AddressBits::new(address, self.address_bits)
    }

    /// Splits `bits` into row, chip, bank and column, most significant first.
    ///
    /// Bits below the column field are ignored.
    ///
    /// # Errors
    ///
    /// * [`DecodeError::TooShort`] if `bits` is narrower than all fields together.
    /// * [`DecodeError::OutOfRange`] if a field indexes past the configured count,
    ///   which happens when a count is not a power of two.
    pub fn decode_fields(&self, bits: AddressBits) -> Result<DramAddr, DecodeError> {
        let required = self.widths.total();
        if bits.width() < required {
            return Err(DecodeError::TooShort {
                available: bits.width(),
                required,
            });
        }

        let mut cursor = bits.width();
        let mut next = |len: u32| {
            cursor -= len;
            bits.slice(cursor, len)
        };

        let addr = DramAddr {
            row: next(self.widths.row),
            chip: next(self.widths.chip),
            bank: next(self.widths.bank),
            column: next(self.widths.column),
        };

        check_range("row", addr.row, self.rows)?;
        check_range("chip", addr.chip, self.chips)?;
        check_range("bank", addr.bank, self.banks)?;
        check_range("column", addr.column, self.columns)?;
        Ok(addr)
    }

    /// Encodes and decodes a trace address in one step.
    pub fn decode(&self, address: u64) -> Result<DramAddr, DecodeError> {
        self.decode_fields(self.encode_bits(address))
    }

    /// Builds the encoded address that decodes to `addr`.
    ///
    /// Bits below the column field are left zero.
    pub fn compose(&self, addr: &DramAddr) -> Result<AddressBits, DecodeError> {
        let required = self.widths.total();
        if self.address_bits < required {
            return Err(DecodeError::TooShort {
                available: self.address_bits,
                required,
            });
        }

        let mut value = 0u64;
        let mut cursor = self.address_bits;
        for (index, len) in [
            (addr.row, self.widths.row),
            (addr.chip, self.widths.chip),
            (addr.bank, self.widths.bank),
            (addr.column, self.widths.column),
        ] {
            cursor -= len;
            if len > 0 {
                value |= (index as u64 & mask(len)) << cursor;
            }
        }
        Ok(AddressBits::new(value, self.address_bits))
    }
}

fn check_range(field: &'static str, index: usize, limit: usize) -> Result<(), DecodeError> {
    if index < limit {
        Ok(())
    } else {
        Err(DecodeError::OutOfRange {
            field,
            index,
            limit,
        })
    }
}
