//! Game-related HTTP routes.

use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::phase::{EndReason, Phase};
use crate::error::AppError;
use crate::services::game_flow::TurnOutcome;
use crate::state::app_state::AppState;

#[derive(Deserialize)]
struct SubmitTurnRequest {
    player_id: Uuid,
    message: String,
}

#[derive(Serialize)]
struct SubmitTurnResponse {
    turn: SubmittedTurn,
    new_count: u32,
    is_transition: bool,
    is_game_complete: bool,
}

#[derive(Serialize)]
struct SubmittedTurn {
    id: Uuid,
    phase: Phase,
    turn_number: u32,
    player_message: String,
    ai_response: String,
}

impl From<TurnOutcome> for SubmitTurnResponse {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            turn: SubmittedTurn {
                id: outcome.turn.id,
                phase: outcome.turn.phase,
                turn_number: outcome.turn.turn_number,
                player_message: outcome.turn.player_message,
                ai_response: outcome.turn.ai_response,
            },
            new_count: outcome.new_count,
            is_transition: outcome.is_transition,
            is_game_complete: outcome.is_game_complete,
        }
    }
}

/// POST /api/games/{session_id}/turns
///
/// Submit one turn. Precondition failures come back as problem+json with the
/// failure kind as the code; a success carries the persisted exchange plus
/// the transition/completion flags the submission triggered.
async fn submit_turn(
    path: web::Path<Uuid>,
    body: web::Json<SubmitTurnRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    let request = body.into_inner();

    let outcome = app_state
        .flow
        .submit_turn(session_id, request.player_id, &request.message)
        .await?;

    Ok(HttpResponse::Ok().json(SubmitTurnResponse::from(outcome)))
}

#[derive(Deserialize)]
struct StateQuery {
    player_id: Uuid,
}

/// GET /api/games/{session_id}?player_id=
///
/// Full state read for reconciliation. Participants get the snapshot;
/// anyone else gets the spectating indicator with nothing leaked.
async fn get_state(
    path: web::Path<Uuid>,
    query: web::Query<StateQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let view = app_state
        .flow
        .read_state(path.into_inner(), query.player_id)
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

#[derive(Deserialize)]
struct ForfeitRequest {
    player_id: Uuid,
}

#[derive(Serialize)]
struct ForfeitResponse {
    winner_id: Uuid,
    end_reason: EndReason,
}

/// POST /api/games/{session_id}/forfeit
async fn forfeit(
    path: web::Path<Uuid>,
    body: web::Json<ForfeitRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state
        .flow
        .forfeit(path.into_inner(), body.player_id)
        .await?;

    // complete() always sets both; fall back to an internal error rather
    // than panicking if the store ever hands back a half-written outcome.
    let (winner_id, end_reason) = session
        .winner_id
        .zip(session.end_reason)
        .ok_or_else(|| AppError::internal("completed session missing outcome"))?;

    Ok(HttpResponse::Ok().json(ForfeitResponse {
        winner_id,
        end_reason,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{session_id}/turns").route(web::post().to(submit_turn)));
    cfg.service(web::resource("/{session_id}/forfeit").route(web::post().to(forfeit)));
    cfg.service(web::resource("/{session_id}").route(web::get().to(get_state)));
}
