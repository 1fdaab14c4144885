use std::convert::Infallible;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use warp::http::StatusCode;
use warp::{reject::Rejection, reply::Reply, Filter};

use crate::config::{clamp_depth, GameConfig};
use crate::core::algorithms::{best_of, column_scores};
use crate::core::definitions::GameStatus;
use crate::core::engine::{BoardError, Token, MAX_SIZE, MIN_SIZE};
use crate::online_game::definitions::*;
use crate::online_game::logic::Arbiter;

const MAX_NAME_LEN: usize = 40;

pub struct ServerState {
    pub arbiter: Arbiter,
    pub defaults: GameConfig,
}

pub type Shared = Arc<ServerState>;

#[derive(Debug)]
pub enum ApiError {
    Arbiter(ArbiterError),
    BadRequest(String),
    Internal(String),
}

impl warp::reject::Reject for ApiError {}

impl From<ArbiterError> for Rejection {
    fn from(value: ArbiterError) -> Self {
        warp::reject::custom(ApiError::Arbiter(value))
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub player_name: String,
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub starting_color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub code: String,
    pub player_name: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub player_secret: String,
    pub col: usize,
}

#[derive(Debug, Deserialize)]
pub struct ScoresQuery {
    pub depth: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub code: SessionId,
    pub rows: usize,
    pub cols: usize,
    pub starting_color: Token,
    pub your_seat: Seat,
    pub player_secret: Secret,
    pub status: GameStatus,
    pub share_url: String,
}

impl From<JoinTicket> for TicketResponse {
    fn from(ticket: JoinTicket) -> Self {
        TicketResponse {
            share_url: format!("/?join={}", ticket.session_id),
            code: ticket.session_id,
            rows: ticket.rows,
            cols: ticket.cols,
            starting_color: ticket.starting,
            your_seat: ticket.seat,
            player_secret: ticket.secret,
            status: ticket.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScoresResponse {
    pub current_turn: Token,
    pub depth: u32,
    pub scores: Vec<Option<i64>>,
    pub best: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn check_name(name: &str) -> Result<&str, Rejection> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(warp::reject::custom(ApiError::BadRequest(format!(
            "player name must have 1 to {MAX_NAME_LEN} characters"
        ))));
    }
    Ok(name)
}

#[derive(Debug, Serialize)]
struct Health {
    ok: bool,
    sessions: usize,
}

pub async fn health_handler(state: Shared) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&Health {
        ok: true,
        sessions: state.arbiter.session_count(),
    }))
}

pub async fn create_handler(req: CreateRequest, state: Shared) -> Result<impl Reply, Rejection> {
    let name = check_name(&req.player_name)?;
    let rows = req.rows.unwrap_or(state.defaults.rows).clamp(MIN_SIZE, MAX_SIZE);
    let cols = req.cols.unwrap_or(state.defaults.cols).clamp(MIN_SIZE, MAX_SIZE);
    let starting = match req.starting_color {
        Some(color) => color.parse::<Token>().map_err(|err| {
            warp::reject::custom(ApiError::BadRequest(format!("starting_color: {err}")))
        })?,
        None => state.defaults.starting_color,
    };

    let id = state.arbiter.create_session(rows, cols, starting)?;
    let ticket = state.arbiter.seat_player(&id, name, Some(starting))?;
    Ok(warp::reply::with_status(
        warp::reply::json(&TicketResponse::from(ticket)),
        StatusCode::CREATED,
    ))
}

pub async fn join_handler(req: JoinRequest, state: Shared) -> Result<impl Reply, Rejection> {
    let name = check_name(&req.player_name)?;
    let ticket = state.arbiter.seat_player(&req.code, name, None)?;
    Ok(warp::reply::json(&TicketResponse::from(ticket)))
}

pub async fn state_handler(code: String, state: Shared) -> Result<impl Reply, Rejection> {
    let view = state.arbiter.get_state(&code)?;
    Ok(warp::reply::json(&view))
}

pub async fn move_handler(
    code: String,
    req: MoveRequest,
    state: Shared,
) -> Result<impl Reply, Rejection> {
    let secret = Secret::from(req.player_secret);
    let outcome = state.arbiter.submit_move(&code, &secret, req.col)?;
    Ok(warp::reply::json(&outcome))
}

pub async fn scores_handler(
    code: String,
    query: ScoresQuery,
    state: Shared,
) -> Result<impl Reply, Rejection> {
    let depth = clamp_depth(query.depth.unwrap_or(state.defaults.search_depth));
    let (board, current_turn, outcome) = state.arbiter.snapshot(&code)?;
    if outcome.is_some() {
        return Ok(warp::reply::json(&ScoresResponse {
            current_turn,
            depth,
            scores: vec![None; board.cols()],
            best: None,
        }));
    }
    // searching can take a while at high depth, keep it off the reactor
    let scores = tokio::task::spawn_blocking(move || column_scores(&board, current_turn, depth))
        .await
        .map_err(|err| warp::reject::custom(ApiError::Internal(err.to_string())))?;
    let best = best_of(&scores).map(|(col, _)| col);
    Ok(warp::reply::json(&ScoresResponse {
        current_turn,
        depth,
        scores,
        best,
    }))
}

fn status_of(err: &ArbiterError) -> StatusCode {
    match err {
        ArbiterError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        ArbiterError::UnknownIdentity => StatusCode::UNAUTHORIZED,
        ArbiterError::NotSpectatorAllowed => StatusCode::FORBIDDEN,
        ArbiterError::OutOfTurn | ArbiterError::SessionFinished => StatusCode::CONFLICT,
        ArbiterError::Board(BoardError::ColumnFull(_) | BoardError::ColumnOutOfRange { .. }) => {
            StatusCode::CONFLICT
        }
        ArbiterError::Board(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(api_error) = err.find::<ApiError>() {
        match api_error {
            ApiError::Arbiter(err) => (status_of(err), err.to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Internal(message) => {
                error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        }
    } else if let Some(err) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, err.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
    } else {
        warn!("Unhandled rejection: {:?}", err);
        (StatusCode::BAD_REQUEST, "bad request".to_string())
    };
    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorResponse { error: message }),
        code,
    ))
}

pub fn routes(state: Shared) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let health = warp::path!("api" / "health")
        .and(warp::get())
        .and(with(state.clone()))
        .and_then(health_handler);

    let create = warp::path!("api" / "online" / "create")
        .and(warp::post())
        .and(warp::body::json())
        .and(with(state.clone()))
        .and_then(create_handler);

    let join = warp::path!("api" / "online" / "join")
        .and(warp::post())
        .and(warp::body::json())
        .and(with(state.clone()))
        .and_then(join_handler);

    let game_state = warp::path!("api" / "online" / String / "state")
        .and(warp::get())
        .and(with(state.clone()))
        .and_then(state_handler);

    let make_move = warp::path!("api" / "online" / String / "move")
        .and(warp::post())
        .and(warp::body::json())
        .and(with(state.clone()))
        .and_then(move_handler);

    let scores = warp::path!("api" / "online" / String / "scores")
        .and(warp::get())
        .and(warp::query::<ScoresQuery>())
        .and(with(state))
        .and_then(scores_handler);

    health
        .or(create)
        .or(join)
        .or(game_state)
        .or(make_move)
        .or(scores)
        .recover(handle_rejection)
}

fn with<T>(value: T) -> impl Filter<Extract = (T,), Error = Infallible> + Clone
where
    T: Clone + Send,
{
    warp::any().map(move || value.clone())
}
