/** Steps for the four line directions: horizontal, vertical and both diagonals. */
pub const LINE_DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Debug)]
pub struct DirectionIterator {
    row: isize,
    col: isize,
    step: (isize, isize),
    rows: usize,
    cols: usize,
}

impl Iterator for DirectionIterator {
    type Item = (usize, usize);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.row += self.step.0;
        self.col += self.step.1;
        if is_valid_coord(self.row, self.col, self.rows, self.cols) {
            Some((self.row as usize, self.col as usize))
        } else {
            None
        }
    }
}

/// Cells after (`row`, `col`) walking along `step`, until the board edge.
pub fn in_direction(
    row: usize,
    col: usize,
    step: (isize, isize),
    rows: usize,
    cols: usize,
) -> DirectionIterator {
    DirectionIterator {
        row: row as isize,
        col: col as isize,
        step,
        rows,
        cols,
    }
}

#[inline]
pub fn is_valid_coord(row: isize, col: isize, rows: usize, cols: usize) -> bool {
    row >= 0 && col >= 0 && (row as usize) < rows && (col as usize) < cols
}

/// Column the heuristic treats as the center. For even widths this is the
/// column just right of the middle.
#[inline]
pub fn center_column(cols: usize) -> usize {
    cols / 2
}

/// Columns sorted by distance from the center, left one first on ties.
pub fn center_order(cols: usize) -> Vec<usize> {
    let center = center_column(cols);
    let mut order: Vec<usize> = (0..cols).collect();
    // stable sort keeps the lower index first among equal distances
    order.sort_by_key(|&col| col.abs_diff(center));
    order
}

pub fn mirror_column(cols: usize, col: usize) -> usize {
    cols - 1 - col
}
