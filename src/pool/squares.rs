use serde::{Deserialize, Serialize};

use super::digits::AXIS_LEN;

/// A cell in the 10x10 grid. `row` indexes the row axis, `col` the column axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

/// Which cells of the grid belong to the player.
///
/// Immutable value: `toggle` and `with_cell` return a new grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareGrid([[bool; AXIS_LEN]; AXIS_LEN]);

impl SquareGrid {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_owned(&self, cell: Cell) -> bool {
        self.0
            .get(cell.row)
            .and_then(|row| row.get(cell.col))
            .copied()
            .unwrap_or(false)
    }

    pub fn with_cell(&self, cell: Cell, owned: bool) -> Self {
        let mut cells = self.0;
        if cell.row < AXIS_LEN && cell.col < AXIS_LEN {
            cells[cell.row][cell.col] = owned;
        }
        Self(cells)
    }

    pub fn toggle(&self, cell: Cell) -> Self {
        self.with_cell(cell, !self.is_owned(cell))
    }

    pub fn owned_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.0.iter().enumerate().flat_map(|(row, cols)| {
            cols.iter()
                .enumerate()
                .filter(|(_, owned)| **owned)
                .map(move |(col, _)| Cell { row, col })
        })
    }

    pub fn owned_count(&self) -> usize {
        self.owned_cells().count()
    }
}
