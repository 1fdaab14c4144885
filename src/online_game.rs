//! Authoritative arbiter for games played by two remote participants.
//!
//! `logic` holds the session state machine and the registry, `handlers` the
//! optional warp adapter that exposes it over HTTP.

pub mod definitions;
#[cfg(feature = "network")]
pub mod handlers;
pub mod logic;

pub use definitions::{
    ArbiterError, GameSession, JoinTicket, MoveOutcome, Seat, Secret, SessionView,
};
pub use logic::Arbiter;
