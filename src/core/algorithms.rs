use log::debug;
use rand::seq::IteratorRandom;

use crate::core::engine::{Board, Cell, Outcome, Token, CONNECT_N};
use crate::core::utils::{
    center_column, center_order, in_direction, is_valid_coord, LINE_DIRECTIONS,
};

/// Terminal score of a won position. Larger than any heuristic sum a legal
/// non-terminal board can reach.
pub const WIN_SCORE: i64 = 1_000_000;
const INFINITY: i64 = 1_000_000_000_000_000_000;

pub const CENTER_BONUS: i64 = 6;
const FOUR_SCORE: i64 = 100_000;

pub type EvaluationFunc = dyn Fn(&Board, Token) -> i64 + Send + Sync;

/// Column choice for the side to move. Implemented by the bots front ends use.
pub trait Algorithm {
    fn solve(&self, board: &Board, player: Token) -> Option<usize>;

    fn name(&self) -> &str;
}

fn score_window(own: usize, opp: usize, empty: usize) -> i64 {
    if own == 4 {
        return FOUR_SCORE;
    }
    if opp == 4 {
        return -FOUR_SCORE;
    }
    let mut score = 0;
    if own == 3 && empty == 1 {
        score += 50;
    } else if own == 2 && empty == 2 {
        score += 10;
    }
    if opp == 3 && empty == 1 {
        score -= 80;
    } else if opp == 2 && empty == 2 {
        score -= 10;
    }
    score
}

/// Static evaluation of `board` from `player`'s point of view.
pub fn heuristic(board: &Board, player: Token) -> i64 {
    let own_cell = Cell::Occupied(player);
    let opp_cell = Cell::Occupied(player.opposite());
    let (rows, cols) = (board.rows(), board.cols());

    let center = center_column(cols);
    let mut score = (0..rows)
        .filter(|&row| board.get(row, center) == own_cell)
        .count() as i64
        * CENTER_BONUS;

    for row in 0..rows {
        for col in 0..cols {
            for &step in LINE_DIRECTIONS.iter() {
                let last = (
                    row as isize + step.0 * (CONNECT_N as isize - 1),
                    col as isize + step.1 * (CONNECT_N as isize - 1),
                );
                if !is_valid_coord(last.0, last.1, rows, cols) {
                    continue;
                }
                let (mut own, mut opp, mut empty) = (0, 0, 0);
                let window = std::iter::once((row, col))
                    .chain(in_direction(row, col, step, rows, cols))
                    .take(CONNECT_N);
                for (r, c) in window {
                    match board.get(r, c) {
                        cell if cell == own_cell => own += 1,
                        cell if cell == opp_cell => opp += 1,
                        _ => empty += 1,
                    }
                }
                score += score_window(own, opp, empty);
            }
        }
    }
    score
}

fn terminal_score(outcome: Outcome, player: Token) -> i64 {
    match outcome {
        Outcome::Winner(token) if token == player => WIN_SCORE,
        Outcome::Winner(_) => -WIN_SCORE,
        Outcome::Draw => 0,
    }
}

struct SearchContext<'a> {
    order: Vec<usize>,
    evaluate_fn: &'a EvaluationFunc,
}

fn search(
    board: &mut Board,
    player: Token,
    depth: u32,
    mut alpha: i64,
    mut beta: i64,
    maximizing: bool,
    ctx: &SearchContext,
) -> i64 {
    if let Some(outcome) = board.check_winner() {
        return terminal_score(outcome, player);
    }
    if depth == 0 {
        return (ctx.evaluate_fn)(board, player);
    }
    let mover = if maximizing { player } else { player.opposite() };
    let mut best = if maximizing { -INFINITY } else { INFINITY };
    for &col in ctx.order.iter() {
        if board.apply_move(col, mover).is_err() {
            continue;
        }
        let value = search(board, player, depth - 1, alpha, beta, !maximizing, ctx);
        board.undo(col);
        if maximizing {
            best = best.max(value);
            alpha = alpha.max(best);
        } else {
            best = best.min(value);
            beta = beta.min(best);
        }
        if alpha >= beta {
            break;
        }
    }
    best
}

/// Minimax with alpha-beta pruning.
///
/// The board is borrowed mutably for push/undo and is identical to the input
/// when the call returns.
pub fn evaluate(
    board: &mut Board,
    player: Token,
    depth: u32,
    alpha: i64,
    beta: i64,
    maximizing: bool,
) -> i64 {
    let ctx = SearchContext {
        order: center_order(board.cols()),
        evaluate_fn: &heuristic,
    };
    search(board, player, depth, alpha, beta, maximizing, &ctx)
}

fn score_with(
    board: &mut Board,
    player: Token,
    depth: u32,
    column: usize,
    ctx: &SearchContext,
) -> Option<i64> {
    board.apply_move(column, player).ok()?;
    let value = search(
        board,
        player,
        depth.saturating_sub(1),
        -INFINITY,
        INFINITY,
        false,
        ctx,
    );
    board.undo(column);
    Some(value)
}

/// Highest score among playable columns, the first in center-first order on ties.
pub fn best_of(scores: &[Option<i64>]) -> Option<(usize, i64)> {
    let mut best: Option<(usize, i64)> = None;
    for col in center_order(scores.len()) {
        let Some(value) = scores[col] else {
            continue;
        };
        if best.map_or(true, |(_, best_value)| value > best_value) {
            best = Some((col, value));
        }
    }
    best
}

fn scores_with(
    board: &Board,
    player: Token,
    depth: u32,
    ctx: &SearchContext,
) -> Vec<Option<i64>> {
    let mut scratch = board.clone();
    (0..board.cols())
        .map(|col| score_with(&mut scratch, player, depth, col, ctx))
        .collect()
}

fn best_with(
    board: &Board,
    player: Token,
    depth: u32,
    ctx: &SearchContext,
) -> Option<(usize, i64)> {
    let best = best_of(&scores_with(board, player, depth, ctx));
    debug!(
        "Best move for {} at depth {}: {:?} (board has {} tokens)",
        player,
        depth,
        best,
        board.count()
    );
    best
}

/// Score of dropping `player` into `column` and searching `depth - 1` more plies.
/// `None` when the column can't be played.
pub fn score_column(board: &Board, player: Token, depth: u32, column: usize) -> Option<i64> {
    let ctx = SearchContext {
        order: center_order(board.cols()),
        evaluate_fn: &heuristic,
    };
    score_with(&mut board.clone(), player, depth, column, &ctx)
}

pub fn column_scores(board: &Board, player: Token, depth: u32) -> Vec<Option<i64>> {
    let ctx = SearchContext {
        order: center_order(board.cols()),
        evaluate_fn: &heuristic,
    };
    scores_with(board, player, depth, &ctx)
}

/// Same as [`column_scores`], one rayon task per root column.
#[cfg(feature = "rayon")]
pub fn column_scores_parallel(board: &Board, player: Token, depth: u32) -> Vec<Option<i64>> {
    use rayon::prelude::*;

    (0..board.cols())
        .into_par_iter()
        .map(|col| score_column(board, player, depth, col))
        .collect()
}

/// Highest scoring column, see [`best_of`] for ties.
pub fn best_move(board: &Board, player: Token, depth: u32) -> Option<(usize, i64)> {
    let ctx = SearchContext {
        order: center_order(board.cols()),
        evaluate_fn: &heuristic,
    };
    best_with(board, player, depth, &ctx)
}

pub struct MinMaxBot {
    max_depth: u32,
    evaluate_fn: &'static EvaluationFunc,
}

impl MinMaxBot {
    pub fn new(max_depth: u32) -> Self {
        MinMaxBot::with_evaluator(max_depth, &heuristic)
    }

    pub fn with_evaluator(max_depth: u32, evaluate_fn: &'static EvaluationFunc) -> Self {
        MinMaxBot {
            max_depth,
            evaluate_fn,
        }
    }

    pub fn depth(&self) -> u32 {
        self.max_depth
    }
}

impl Algorithm for MinMaxBot {
    fn solve(&self, board: &Board, player: Token) -> Option<usize> {
        let ctx = SearchContext {
            order: center_order(board.cols()),
            evaluate_fn: self.evaluate_fn,
        };
        best_with(board, player, self.max_depth, &ctx).map(|(col, _)| col)
    }

    fn name(&self) -> &str {
        "minimax"
    }
}

/// Uniform choice among playable columns.
#[derive(Debug, Default)]
pub struct RandomBot;

impl Algorithm for RandomBot {
    fn solve(&self, board: &Board, _player: Token) -> Option<usize> {
        board
            .valid_columns()
            .into_iter()
            .choose(&mut rand::thread_rng())
    }

    fn name(&self) -> &str {
        "random"
    }
}
