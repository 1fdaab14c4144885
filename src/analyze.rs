use std::env;

use anyhow::{bail, Context};
use connect_core::config::{clamp_depth, GameConfig};
use connect_core::core::algorithms::best_of;
use connect_core::{column_scores, Game, GameState};

/// analyze <moves> [depth] [rows] [cols] [starting]
///
/// `moves` is a comma separated list of columns, e.g. `3,3,4`.
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: {} <moves> [depth] [rows] [cols] [starting]", args[0]);
    }
    let defaults = GameConfig::default();
    let moves = args[1]
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .context("moves must be column indices")?;
    let depth = match args.get(2) {
        Some(depth) => clamp_depth(depth.parse().context("depth must be a number")?),
        None => defaults.search_depth,
    };
    let rows = match args.get(3) {
        Some(rows) => rows.parse().context("rows must be a number")?,
        None => defaults.rows,
    };
    let cols = match args.get(4) {
        Some(cols) => cols.parse().context("cols must be a number")?,
        None => defaults.cols,
    };
    let starting = match args.get(5) {
        Some(token) => token.parse().map_err(anyhow::Error::msg)?,
        None => defaults.starting_color,
    };

    let game = Game::from_moves(rows, cols, starting, &moves).context("replaying moves")?;
    print!("{}", game.board());
    match game.state() {
        GameState::Finished(outcome) => println!("Game over: {}", outcome),
        GameState::Turn(player) => {
            let scores = column_scores(game.board(), player, depth);
            for (col, score) in scores.iter().enumerate() {
                match score {
                    Some(score) => println!("column {col}: {score}"),
                    None => println!("column {col}: N/A"),
                }
            }
            match best_of(&scores) {
                Some((col, score)) => println!("{player} to move, best column {col} ({score})"),
                None => println!("{player} to move, no playable column"),
            }
        }
    }
    Ok(())
}
