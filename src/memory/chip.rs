//! Chip Row Buffer State.
//!
//! Each chip tracks, per bank, which row currently sits in the row buffer.
//! Under the default [`ResetPolicy::Chip`] opening a row closes every bank of
//! the chip first, so at most one row of the whole chip is open at any time.
//! [`ResetPolicy::Bank`] models independent per-bank row buffers instead.

use crate::config::ResetPolicy;

/// Open-row state of a single DRAM chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    /// The open row of each bank, if any.
    open_rows: Vec<Option<usize>>,
    rows: usize,
    policy: ResetPolicy,
}

impl Chip {
    /// Creates a chip with every bank closed.
    ///
    /// # Arguments
    ///
    /// * `banks` - Number of banks.
    /// * `rows` - Number of rows per bank.
    /// * `policy` - What an update closes before opening the new row.
    pub fn new(banks: usize, rows: usize, policy: ResetPolicy) -> Self {
        Self {
            open_rows: vec![None; banks],
            rows,
            policy,
        }
    }

    pub fn banks(&self) -> usize {
        self.open_rows.len()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns `true` if `row` is the buffered row of `bank`.
    pub fn is_row_open(&self, bank: usize, row: usize) -> bool {
        self.open_row(bank) == Some(row)
    }

    /// Returns `true` if any row of `bank` is buffered.
    pub fn any_open(&self, bank: usize) -> bool {
        self.open_row(bank).is_some()
    }

    /// The buffered row of `bank`, if any.
    pub fn open_row(&self, bank: usize) -> Option<usize> {
        self.open_rows.get(bank).copied().flatten()
    }

    /// Makes `(bank, row)` the open row.
    ///
    /// With [`ResetPolicy::Chip`] all banks are closed first; with
    /// [`ResetPolicy::Bank`] only `bank` changes.
    ///
    /// # Panics
    ///
    /// Panics if `bank` or `row` is outside the chip. Decoded addresses are
    /// range-checked before they reach this point.
    pub fn open_only(&mut self, bank: usize, row: usize) {
        assert!(
            bank < self.banks(),
            "bank {bank} outside chip with {} banks",
            self.banks()
        );
        assert!(
            row < self.rows,
            "row {row} outside chip with {} rows",
            self.rows
        );
        if self.policy == ResetPolicy::Chip {
            self.close_all();
        }
        self.open_rows[bank] = Some(row);
    }

    /// Closes every bank.
    pub fn close_all(&mut self) {
        self.open_rows.iter_mut().for_each(|r| *r = None);
    }
}
