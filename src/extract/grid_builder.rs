//! Rectangular grid construction from raw tables.
//!
//! Raw tables declare merges three ways: a horizontal `col_span`, an
//! explicit `row_span` count, and vMerge-style continuation
//! placeholders. The builder resolves all of them into a dense grid
//! where the span origin and every covered cell hold identical text,
//! so downstream code can read any cell of a merged region
//! interchangeably. Building never fails; short rows are padded and
//! ambiguous merges are repaired best-effort and logged.

use std::collections::HashMap;

use crate::extract::keywords::{normalize_matching, KeywordIndex};
use crate::model::{Grid, LogicalCell, Table};

/// Builds dense grids from raw tables.
pub struct GridBuilder<'a> {
    keywords: &'a KeywordIndex,
    min_label_chars: usize,
}

impl<'a> GridBuilder<'a> {
    /// Create a builder over the configured keyword index.
    pub fn new(keywords: &'a KeywordIndex, min_label_chars: usize) -> Self {
        Self {
            keywords,
            min_label_chars,
        }
    }

    /// Build the grid for one table. `source_id` and `table_idx` only
    /// feed diagnostics.
    pub fn build(&self, table: &Table, source_id: &str, table_idx: usize) -> Grid {
        let columns = table
            .rows
            .iter()
            .map(|row| row.cells.iter().map(|c| c.col_span.max(1)).sum::<usize>())
            .max()
            .unwrap_or(0);
        if columns == 0 {
            return Grid::from_cells(0, Vec::new());
        }

        let row_count = table.rows.len();
        let mut cells: Vec<Vec<Option<LogicalCell>>> = vec![vec![None; columns]; row_count];
        // Per-column origin of the vertical span still extending down
        let mut v_origin: HashMap<usize, (String, usize, usize)> = HashMap::new();

        for (r, row) in table.rows.iter().enumerate() {
            let mut col = 0;
            for cell in &row.cells {
                // Skip columns already claimed by an explicit row span
                // from an earlier row
                while col < columns && cells[r][col].is_some() {
                    col += 1;
                }
                if col >= columns {
                    log::warn!(
                        "{source_id}: table {table_idx} row {r} has more cells than \
                         the grid has columns, dropping the extras"
                    );
                    break;
                }

                let span = cell.col_span.max(1).min(columns - col);
                let (text, origin_row, origin_col) = if cell.continuation {
                    match v_origin.get(&col) {
                        Some((text, orow, ocol)) => (text.clone(), *orow, *ocol),
                        // Stray continuation with no origin above
                        None => (String::new(), r, col),
                    }
                } else {
                    (cell.text.clone(), r, col)
                };

                for offset in 0..span {
                    let c = col + offset;
                    cells[r][c] = Some(LogicalCell {
                        text: text.clone(),
                        origin_row,
                        origin_col,
                    });
                    v_origin.insert(c, (text.clone(), origin_row, origin_col));

                    // Explicit row spans claim the covered rows now;
                    // continuation-style tables claim nothing here and
                    // resolve through v_origin instead.
                    for k in 1..cell.row_span.max(1) {
                        if let Some(below) = cells.get_mut(r + k) {
                            below[c] = Some(LogicalCell {
                                text: text.clone(),
                                origin_row,
                                origin_col,
                            });
                        }
                    }
                }
                col += span;
            }
        }

        let mut flat = Vec::with_capacity(row_count * columns);
        for (r, row) in cells.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                // Rows shorter than the grid pad with empty cells
                flat.push(cell.unwrap_or_else(|| LogicalCell::new("", r, c)));
            }
        }

        let mut grid = Grid::from_cells(columns, flat);
        self.repair_split_labels(&mut grid, source_id, table_idx);
        grid
    }

    /// Decide whether two adjacent fragments are one label broken in
    /// two by an inconsistent merge.
    ///
    /// Fires when the left fragment is short, neither fragment matches
    /// a keyword on its own, and their concatenation does. The last
    /// condition is a guard the length threshold alone cannot give:
    /// without it, any short value next to another cell would qualify.
    pub fn is_split_label(&self, left: &str, right: &str) -> bool {
        let left_norm = normalize_matching(left);
        if left_norm.is_empty() || left_norm.chars().count() >= self.min_label_chars {
            return false;
        }
        if right.trim().is_empty() {
            return false;
        }
        if self.keywords.matches(left) || self.keywords.matches(right) {
            return false;
        }
        self.keywords.matches(&format!("{left_norm}{}", normalize_matching(right)))
    }

    /// Scan each row for split labels and rewrite both cells with the
    /// concatenated text. Best-effort; repairs are logged, never errors.
    fn repair_split_labels(&self, grid: &mut Grid, source_id: &str, table_idx: usize) {
        let mut repairs: Vec<(usize, usize, String)> = Vec::new();

        for (r, c, cell) in grid.iter() {
            if c + 1 >= grid.column_count() {
                continue;
            }
            let right = grid.text(r, c + 1);
            // Replicated copies of the same span never need repair
            if grid
                .cell(r, c + 1)
                .is_some_and(|n| n.origin_row == cell.origin_row && n.origin_col == cell.origin_col)
            {
                continue;
            }
            if self.is_split_label(&cell.text, right) {
                let joined = format!("{}{}", cell.text.trim(), right.trim());
                repairs.push((r, c, joined));
            }
        }

        for (r, c, joined) in repairs {
            log::debug!(
                "{source_id}: table {table_idx} repaired split label at \
                 row {r}, cols {c}-{}: {joined:?}",
                c + 1
            );
            grid.set_text(r, c, &joined);
            grid.set_covered(r, c + 1, &joined, r, c);
        }
    }
}
