use crate::matrix::{RowIndex, RowWord, NUM_ROWS, ONBOARD_COLS};
use embedded_hal::digital::{InputPin, OutputPin};

/// The left half, wired straight to the controller.
///
/// Rows must behave open-drain: low when selected, released (high-impedance)
/// on `set_high`. Columns are pull-up inputs, handed over in logical column
/// order so the board's wiring table is the only remap there is.
pub struct LocalMatrix<Row, Col> {
    rows: [Row; NUM_ROWS as usize],
    cols: [Col; ONBOARD_COLS as usize],
}

impl<Row, Col> LocalMatrix<Row, Col>
where
    Row: OutputPin,
    Col: InputPin,
{
    pub fn new(rows: [Row; NUM_ROWS as usize], cols: [Col; ONBOARD_COLS as usize]) -> Self {
        Self { rows, cols }
    }

    pub fn init(&mut self) {
        self.unselect_rows();
    }

    #[inline]
    pub fn select_row(&mut self, row: RowIndex) {
        let _ = self.rows[row.index()].set_low();
    }

    #[inline]
    pub fn unselect_rows(&mut self) {
        for row in &mut self.rows {
            let _ = row.set_high();
        }
    }

    /// A pressed key pulls its column low, reported as a set bit.
    pub fn read_columns(&mut self) -> RowWord {
        self.cols
            .iter_mut()
            .enumerate()
            .fold(0, |word, (col, pin)| {
                if matches!(pin.is_low(), Ok(true)) {
                    word | (1 << col)
                } else {
                    word
                }
            })
    }
}
