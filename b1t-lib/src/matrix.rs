pub const NUM_ROWS: u8 = 5;
pub const ONBOARD_COLS: u8 = 7;
pub const EXPANDER_COLS: u8 = 8;
pub const NUM_COLS: u8 = ONBOARD_COLS + EXPANDER_COLS;
pub const NUM_KEYS: usize = NUM_ROWS as usize * NUM_COLS as usize;

/// One bit per column, 1 = pressed.
/// Expander columns sit above the on-board ones.
pub type RowWord = u16;

const _ROW_WORD_FITS: () = assert!(
    RowWord::BITS >= NUM_COLS as u32,
    "Row word can't hold every column"
);

#[repr(transparent)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RowIndex(u8);

impl RowIndex {
    /// # Panics
    /// If `ind` is not below [`NUM_ROWS`].
    #[must_use]
    pub const fn from_value(ind: u8) -> Self {
        assert!(
            ind < NUM_ROWS,
            "Tried to construct row index from a bad value"
        );
        Self(ind)
    }

    #[inline]
    pub fn all() -> impl Iterator<Item = Self> {
        (0..NUM_ROWS).map(Self)
    }

    #[inline]
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[repr(transparent)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ColIndex(u8);

impl ColIndex {
    /// # Panics
    /// If `ind` is not below [`NUM_COLS`].
    #[must_use]
    pub const fn from_value(ind: u8) -> Self {
        assert!(
            ind < NUM_COLS,
            "Tried to construct col index from a bad value"
        );
        Self(ind)
    }

    #[inline]
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

#[repr(transparent)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MatrixIndex(u8);

impl MatrixIndex {
    #[inline]
    #[must_use]
    pub const fn from_row_col(row_index: RowIndex, col_index: ColIndex) -> Self {
        Self(row_index.0 * NUM_COLS + col_index.0)
    }

    #[inline]
    #[must_use]
    pub const fn row(self) -> RowIndex {
        RowIndex(self.0 / NUM_COLS)
    }

    #[inline]
    #[must_use]
    pub const fn col(self) -> ColIndex {
        ColIndex(self.0 % NUM_COLS)
    }

    #[must_use]
    #[inline(always)]
    pub const fn byte(self) -> u8 {
        self.0
    }

    #[must_use]
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyChange {
    pub index: MatrixIndex,
    pub pressed: bool,
}

/// Joins both halves of a row, expander bits shifted above the on-board ones.
#[inline]
#[must_use]
pub const fn merge_row(expander: RowWord, onboard: RowWord) -> RowWord {
    (expander << ONBOARD_COLS) | onboard
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct MatrixSnapshot {
    rows: [RowWord; NUM_ROWS as usize],
}

impl MatrixSnapshot {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: [0; NUM_ROWS as usize],
        }
    }

    #[inline]
    #[must_use]
    pub const fn row(&self, row: RowIndex) -> RowWord {
        self.rows[row.index()]
    }

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> &[RowWord; NUM_ROWS as usize] {
        &self.rows
    }

    #[inline]
    #[must_use]
    pub const fn is_pressed(&self, index: MatrixIndex) -> bool {
        self.rows[index.row().index()] & (1 << index.col().0) != 0
    }

    /// Stores `word` for `row`, returns whether it differed from what was there.
    #[inline]
    pub fn store(&mut self, row: RowIndex, word: RowWord) -> bool {
        let slot = &mut self.rows[row.index()];
        if *slot == word {
            return false;
        }
        *slot = word;
        true
    }

    /// Every key whose state differs from `previous`, in row-major order.
    #[must_use]
    pub fn changes_since(&self, previous: &Self) -> heapless::Vec<KeyChange, NUM_KEYS> {
        let mut changes = heapless::Vec::new();
        for row in RowIndex::all() {
            let diff = self.row(row) ^ previous.row(row);
            if diff == 0 {
                continue;
            }
            for col in 0..NUM_COLS {
                if diff & (1 << col) == 0 {
                    continue;
                }
                let index = MatrixIndex::from_row_col(row, ColIndex(col));
                // Capacity covers every key
                let _ = changes.push(KeyChange {
                    index,
                    pressed: self.is_pressed(index),
                });
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_from_row_col() {
        const R1: RowIndex = RowIndex::from_value(1);
        const C1: ColIndex = ColIndex::from_value(4);
        const M1: MatrixIndex = MatrixIndex::from_row_col(R1, C1);
        assert_eq!(19, M1.byte());
        assert_eq!(R1, M1.row());
        assert_eq!(C1, M1.col());
    }

    #[test]
    #[should_panic(expected = "bad value")]
    fn row_out_of_range() {
        let _ = RowIndex::from_value(NUM_ROWS);
    }

    #[test]
    fn merge_places_expander_above_onboard() {
        let onboard: RowWord = 0b010_0000;
        let expander: RowWord = 0b0000_0001;
        let merged = merge_row(expander, onboard);
        assert_eq!((expander << 7) | onboard, merged, "{merged:b}");
        assert_eq!(0b1010_0000, merged, "{merged:b}");
        let all = merge_row(0xFF, 0x7F);
        assert_eq!(0b0111_1111_1111_1111, all, "{all:b}");
    }

    #[test]
    fn store_reports_change() {
        let mut snap = MatrixSnapshot::new();
        let row = RowIndex::from_value(3);
        assert!(!snap.store(row, 0));
        assert!(snap.store(row, 0b100));
        assert!(!snap.store(row, 0b100));
        assert_eq!(0b100, snap.row(row));
        assert_eq!(&[0u16, 0, 0, 0b100, 0], snap.rows());
    }

    #[test]
    fn changes_in_row_major_order() {
        let mut prev = MatrixSnapshot::new();
        prev.store(RowIndex::from_value(0), 0b1);
        let mut next = MatrixSnapshot::new();
        next.store(RowIndex::from_value(2), 1 << 14);
        next.store(RowIndex::from_value(4), 0b10);
        let changes = next.changes_since(&prev);
        assert_eq!(3, changes.len());
        assert_eq!(
            KeyChange {
                index: MatrixIndex::from_row_col(RowIndex::from_value(0), ColIndex::from_value(0)),
                pressed: false,
            },
            changes[0]
        );
        assert_eq!(
            KeyChange {
                index: MatrixIndex::from_row_col(RowIndex::from_value(2), ColIndex::from_value(14)),
                pressed: true,
            },
            changes[1]
        );
        assert_eq!(4 * NUM_COLS + 1, changes[2].index.byte());
        assert!(changes[2].pressed);
        assert!(next.changes_since(&next).is_empty());
    }
}
