use crate::errors::AppError;
use crate::models::{
    AddAssistsRequest, Envelope, HealthResponse, LedgerEntry, Player, PlayerMutationResponse,
    RecentQuery, ReduceAssistsRequest, SetAssistsRequest, UndoData,
};
use crate::state::AppState;
use crate::stats::{LedgerSummary, Standing};
use crate::ui::render_index;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::Html,
    Json,
};
use tracing::warn;

const DEFAULT_RECENT: usize = 10;
const MAX_RECENT: usize = 100;

// Extractor failures go through `AppError` so they get the JSON envelope.
type IdPath = Result<Path<u64>, PathRejection>;
type Body<T> = Result<Json<T>, JsonRejection>;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let ledger = state.ledger.read().await;
    Html(render_index(&ledger.list_ranking()))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let ledger = state.ledger.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        players: ledger.player_count(),
        entries: ledger.summary().total_entries,
    })
}

pub async fn list_players(State(state): State<AppState>) -> Json<Envelope<Vec<Player>>> {
    let ledger = state.ledger.read().await;
    Json(Envelope::list(ledger.list_ranking()))
}

pub async fn get_player(
    State(state): State<AppState>,
    id: IdPath,
) -> Result<Json<Envelope<Player>>, AppError> {
    let Path(id) = id?;
    let ledger = state.ledger.read().await;
    Ok(Json(Envelope::ok(ledger.player(id)?)))
}

pub async fn player_assists(
    State(state): State<AppState>,
    id: IdPath,
) -> Result<Json<Envelope<Vec<LedgerEntry>>>, AppError> {
    let Path(id) = id?;
    let ledger = state.ledger.read().await;
    Ok(Json(Envelope::list(ledger.player_entries(id)?)))
}

pub async fn add_assists(
    State(state): State<AppState>,
    id: IdPath,
    payload: Body<AddAssistsRequest>,
) -> Result<Json<PlayerMutationResponse>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    if payload.assists_to_add <= 0 {
        return Err(AppError::bad_request("assists_to_add must be a positive integer"));
    }

    let mut ledger = state.ledger.write().await;
    let entry = ledger
        .apply_delta(id, payload.assists_to_add, payload.game_date, payload.notes)
        .await
        .inspect_err(|err| warn!(player_id = id, "add-assists failed: {err}"))?;

    Ok(Json(PlayerMutationResponse {
        success: true,
        data: ledger.player(id)?,
        assist_log_id: Some(entry.id),
    }))
}

pub async fn reduce_assists(
    State(state): State<AppState>,
    id: IdPath,
    payload: Body<ReduceAssistsRequest>,
) -> Result<Json<PlayerMutationResponse>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    if payload.assists_to_remove <= 0 {
        return Err(AppError::bad_request("assists_to_remove must be a positive integer"));
    }

    let mut ledger = state.ledger.write().await;
    let entry = ledger
        .apply_delta(id, -payload.assists_to_remove, payload.game_date, payload.notes)
        .await
        .inspect_err(|err| warn!(player_id = id, "reduce-assists failed: {err}"))?;

    Ok(Json(PlayerMutationResponse {
        success: true,
        data: ledger.player(id)?,
        assist_log_id: Some(entry.id),
    }))
}

pub async fn set_assists(
    State(state): State<AppState>,
    id: IdPath,
    payload: Body<SetAssistsRequest>,
) -> Result<Json<PlayerMutationResponse>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let mut ledger = state.ledger.write().await;
    let entry = ledger.set_assists(id, payload.assists).await?;

    Ok(Json(PlayerMutationResponse {
        success: true,
        data: ledger.player(id)?,
        assist_log_id: entry.map(|entry| entry.id),
    }))
}

pub async fn undo_assists(
    State(state): State<AppState>,
    entry_id: IdPath,
) -> Result<Json<Envelope<UndoData>>, AppError> {
    let Path(entry_id) = entry_id?;
    let mut ledger = state.ledger.write().await;
    let outcome = ledger
        .undo_last(entry_id)
        .await
        .inspect_err(|err| warn!(entry_id, "undo failed: {err}"))?;

    Ok(Json(Envelope::ok(UndoData {
        deleted_log_id: outcome.deleted_entry_id,
        assists_subtracted: outcome.delta_subtracted,
        player_id: outcome.player_id,
    })))
}

pub async fn list_assists(State(state): State<AppState>) -> Json<Envelope<Vec<LedgerEntry>>> {
    let ledger = state.ledger.read().await;
    Json(Envelope::list(ledger.entries()))
}

/// `limit` defaults to 10 and is capped at 100; zero is rejected.
pub async fn recent_assists(
    State(state): State<AppState>,
    query: Result<Query<RecentQuery>, QueryRejection>,
) -> Result<Json<Envelope<Vec<LedgerEntry>>>, AppError> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(DEFAULT_RECENT);
    if limit == 0 {
        return Err(AppError::bad_request("limit must be at least 1"));
    }

    let ledger = state.ledger.read().await;
    Ok(Json(Envelope::list(ledger.recent(limit.min(MAX_RECENT)))))
}

pub async fn assist_summary(State(state): State<AppState>) -> Json<Envelope<LedgerSummary>> {
    let ledger = state.ledger.read().await;
    Json(Envelope::ok(ledger.summary()))
}

pub async fn leaderboard(State(state): State<AppState>) -> Result<Json<Envelope<Standing>>, AppError> {
    let ledger = state.ledger.read().await;
    let standing = ledger
        .standing()
        .ok_or_else(|| AppError::not_found("no tracked player"))?;
    Ok(Json(Envelope::ok(standing)))
}
