use std::fmt::Display;
use std::str::FromStr;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::core::utils::{in_direction, LINE_DIRECTIONS};

/// Number of aligned tokens that wins the game.
pub const CONNECT_N: usize = 4;
pub const MIN_SIZE: usize = 4;
pub const MAX_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("board size {rows}x{cols} is outside [{}, {}]", MIN_SIZE, MAX_SIZE)]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("column {column} is out of range (board has {cols} columns)")]
    ColumnOutOfRange { column: usize, cols: usize },
    #[error("column {0} is full")]
    ColumnFull(usize),
    #[error("move #{index} (column {column}) can't be replayed")]
    InvalidReplay { index: usize, column: usize },
}

#[derive(PartialEq, Eq, Hash, Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub enum Token {
    #[default]
    Red,
    Yellow,
}

impl Token {
    pub fn opposite(self) -> Token {
        match self {
            Token::Red => Token::Yellow,
            Token::Yellow => Token::Red,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Token::Red => 'R',
            Token::Yellow => 'Y',
        }
    }

    /// Token that plays move `index` when `starting` opens and nobody skips.
    #[inline]
    pub fn for_index(starting: Token, index: usize) -> Token {
        if index % 2 == 0 {
            starting
        } else {
            starting.opposite()
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Token::Red => "R",
            Token::Yellow => "Y",
        })
    }
}

impl FromStr for Token {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "R" | "r" | "Red" | "red" => Ok(Token::Red),
            "Y" | "y" | "Yellow" | "yellow" => Ok(Token::Yellow),
            other => Err(format!("unknown token '{other}'")),
        }
    }
}

#[derive(PartialEq, Eq, Hash, Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Token),
}

impl Cell {
    #[inline]
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    #[inline]
    pub fn token(self) -> Option<Token> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(token) => Some(token),
        }
    }
}

impl From<Token> for Cell {
    fn from(value: Token) -> Self {
        Cell::Occupied(value)
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Outcome {
    Winner(Token),
    Draw,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(token) => write!(f, "{token}"),
            Outcome::Draw => f.pad("D"),
        }
    }
}

/** Gravity board. Row 0 is the top row, `rows - 1` the bottom one. */
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(rows: usize, cols: usize) -> Result<Board, BoardError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&rows) || !(MIN_SIZE..=MAX_SIZE).contains(&cols) {
            return Err(BoardError::InvalidDimensions { rows, cols });
        }
        Ok(Board {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        })
    }

    /// Replays `moves` from an empty board, alternating tokens from `starting`.
    pub fn rebuild(
        rows: usize,
        cols: usize,
        moves: &[usize],
        starting: Token,
    ) -> Result<Board, BoardError> {
        let mut board = Board::new(rows, cols)?;
        for (index, &column) in moves.iter().enumerate() {
            board
                .apply_move(column, Token::for_index(starting, index))
                .map_err(|_| BoardError::InvalidReplay { index, column })?;
        }
        Ok(board)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    #[inline]
    fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row * self.cols + col] = cell;
    }

    pub fn is_column_full(&self, col: usize) -> bool {
        col >= self.cols || !self.get(0, col).is_empty()
    }

    pub fn is_full(&self) -> bool {
        (0..self.cols).all(|col| self.is_column_full(col))
    }

    pub fn valid_columns(&self) -> Vec<usize> {
        (0..self.cols).filter(|&col| !self.is_column_full(col)).collect()
    }

    /// Number of tokens stacked in `col`.
    pub fn height(&self, col: usize) -> usize {
        (0..self.rows)
            .rev()
            .take_while(|&row| !self.get(row, col).is_empty())
            .count()
    }

    /// Total number of placed tokens.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    /** Drops `token` into `column`, returns the row it landed on. */
    pub fn apply_move(&mut self, column: usize, token: Token) -> Result<usize, BoardError> {
        if column >= self.cols {
            return Err(BoardError::ColumnOutOfRange {
                column,
                cols: self.cols,
            });
        }
        if self.is_column_full(column) {
            return Err(BoardError::ColumnFull(column));
        }
        let row = self.rows - 1 - self.height(column);
        self.set(row, column, token.into());
        trace!("{} dropped in column {} at row {}", token, column, row);
        Ok(row)
    }

    /** Removes the topmost token of `column`. Only valid right after a matching `apply_move`. */
    pub(crate) fn undo(&mut self, column: usize) {
        let height = self.height(column);
        debug_assert!(height > 0, "Undo on empty column {column}!");
        if height > 0 {
            self.set(self.rows - height, column, Cell::Empty);
        }
    }

    /// Full-board scan: a line of four anywhere, else a draw when the top row is full.
    pub fn check_winner(&self) -> Option<Outcome> {
        if let Some([(row, col), ..]) = self.find_line() {
            return self.get(row, col).token().map(Outcome::Winner);
        }
        if self.is_full() {
            Some(Outcome::Draw)
        } else {
            None
        }
    }

    /// First line of four found scanning from the top-left corner, wherever it is.
    pub fn find_line(&self) -> Option<[(usize, usize); CONNECT_N]> {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let cell = self.get(row, col);
                if cell.is_empty() {
                    continue;
                }
                for &direction in LINE_DIRECTIONS.iter() {
                    let mut line = [(row, col); CONNECT_N];
                    let mut len = 1;
                    for (r, c) in in_direction(row, col, direction, self.rows, self.cols)
                        .take(CONNECT_N - 1)
                        .take_while(|&(r, c)| self.get(r, c) == cell)
                    {
                        line[len] = (r, c);
                        len += 1;
                    }
                    if len == CONNECT_N {
                        return Some(line);
                    }
                }
            }
        }
        None
    }

    /// Line of four through (`row`, `col`), ordered from one end to the other.
    ///
    /// A move can only complete a line through the cell it filled, so checking the
    /// last placed cell is enough for positions reached by legal play.
    pub fn winning_line(&self, row: usize, col: usize) -> Option<[(usize, usize); CONNECT_N]> {
        let token = self.get(row, col);
        if token.is_empty() {
            return None;
        }
        for &(dr, dc) in LINE_DIRECTIONS.iter() {
            let backward: Vec<_> = in_direction(row, col, (-dr, -dc), self.rows, self.cols)
                .take_while(|&(r, c)| self.get(r, c) == token)
                .collect();
            let forward = in_direction(row, col, (dr, dc), self.rows, self.cols)
                .take_while(|&(r, c)| self.get(r, c) == token);
            let line: Vec<_> = backward
                .into_iter()
                .rev()
                .chain(std::iter::once((row, col)))
                .chain(forward)
                .collect();
            if line.len() >= CONNECT_N {
                let mut cells = [(0, 0); CONNECT_N];
                cells.copy_from_slice(&line[..CONNECT_N]);
                return Some(cells);
            }
        }
        None
    }

    /// Outcome after a move landed on (`row`, `col`): the windowed variant of
    /// `check_winner` for positions reached by legal play.
    pub fn outcome_after(&self, row: usize, col: usize) -> Option<Outcome> {
        if let Some(token) = self.winning_line(row, col).and(self.get(row, col).token()) {
            Some(Outcome::Winner(token))
        } else if self.is_full() {
            Some(Outcome::Draw)
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..self.rows {
            let line: String = self
                .row(row)
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => '.',
                    Cell::Occupied(token) => token.as_char(),
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
