//! The dense rectangular grid produced from a raw table.

use serde::{Deserialize, Serialize};

/// A rectangular reconstruction of a table after span resolution.
///
/// Every row has exactly `column_count` cells; cells covered by a
/// merged region all hold the origin cell's text, so downstream code
/// can read any cell of a merged region interchangeably.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    columns: usize,
    cells: Vec<LogicalCell>,
}

impl Grid {
    /// Build a grid from row-major cells. The cell count must be a
    /// multiple of `columns`; the grid builder guarantees this by
    /// padding short rows.
    pub(crate) fn from_cells(columns: usize, cells: Vec<LogicalCell>) -> Self {
        debug_assert!(columns == 0 || cells.len() % columns == 0);
        Self { columns, cells }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        if self.columns == 0 {
            0
        } else {
            self.cells.len() / self.columns
        }
    }

    /// Number of columns, identical for every row.
    pub fn column_count(&self) -> usize {
        self.columns
    }

    /// Check if the grid holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Get the cell at (row, col), if in range.
    pub fn cell(&self, row: usize, col: usize) -> Option<&LogicalCell> {
        if col >= self.columns {
            return None;
        }
        self.cells.get(row * self.columns + col)
    }

    /// Get the text at (row, col), empty string when out of range.
    pub fn text(&self, row: usize, col: usize) -> &str {
        self.cell(row, col).map(|c| c.text.as_str()).unwrap_or("")
    }

    /// Overwrite the text at (row, col). No-op when out of range.
    pub(crate) fn set_text(&mut self, row: usize, col: usize, text: &str) {
        if col < self.columns {
            if let Some(cell) = self.cells.get_mut(row * self.columns + col) {
                cell.text = text.to_string();
            }
        }
    }

    /// Rewrite (row, col) as a covered copy of the given origin.
    pub(crate) fn set_covered(
        &mut self,
        row: usize,
        col: usize,
        text: &str,
        origin_row: usize,
        origin_col: usize,
    ) {
        if col < self.columns {
            if let Some(cell) = self.cells.get_mut(row * self.columns + col) {
                cell.text = text.to_string();
                cell.origin_row = origin_row;
                cell.origin_col = origin_col;
            }
        }
    }

    /// Iterate rows as cell slices.
    pub fn rows(&self) -> impl Iterator<Item = &[LogicalCell]> {
        self.cells.chunks(self.columns.max(1))
    }

    /// Iterate all cells in row-major order with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &LogicalCell)> {
        let columns = self.columns.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (i / columns, i % columns, cell))
    }
}

/// A resolved cell of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalCell {
    /// Resolved text content
    pub text: String,

    /// Row of the span origin this cell belongs to
    pub origin_row: usize,

    /// Column of the span origin this cell belongs to
    pub origin_col: usize,
}

impl LogicalCell {
    /// Create a cell that is its own span origin.
    pub fn new(text: impl Into<String>, row: usize, col: usize) -> Self {
        Self {
            text: text.into(),
            origin_row: row,
            origin_col: col,
        }
    }

    /// Check if this cell is covered by a span originating elsewhere.
    pub fn is_covered(&self, row: usize, col: usize) -> bool {
        self.origin_row != row || self.origin_col != col
    }

    /// Check if the cell text is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        let cells = vec![
            LogicalCell::new("姓名", 0, 0),
            LogicalCell::new("张三", 0, 1),
            LogicalCell::new("性别", 1, 0),
            LogicalCell::new("男", 1, 1),
        ];
        Grid::from_cells(2, cells)
    }

    #[test]
    fn test_grid_shape() {
        let grid = sample();
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.column_count(), 2);
        assert!(!grid.is_empty());
    }

    #[test]
    fn test_grid_access() {
        let grid = sample();
        assert_eq!(grid.text(0, 1), "张三");
        assert_eq!(grid.text(5, 5), "");
        assert!(grid.cell(0, 2).is_none());
    }

    #[test]
    fn test_iter_coordinates() {
        let grid = sample();
        let coords: Vec<(usize, usize)> = grid.iter().map(|(r, c, _)| (r, c)).collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_covered_cell() {
        let covered = LogicalCell {
            text: "班级".to_string(),
            origin_row: 0,
            origin_col: 0,
        };
        assert!(covered.is_covered(1, 0));
        assert!(!covered.is_covered(0, 0));
    }
}
