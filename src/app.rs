use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/leaderboard", get(handlers::leaderboard))
        .route("/players", get(handlers::list_players))
        .route("/players/:id", get(handlers::get_player).put(handlers::set_assists))
        .route("/players/:id/assists", get(handlers::player_assists))
        .route("/players/:id/add-assists", post(handlers::add_assists))
        .route("/players/:id/reduce-assists", post(handlers::reduce_assists))
        .route("/assists", get(handlers::list_assists))
        .route("/assists/recent", get(handlers::recent_assists))
        .route("/assists/stats/summary", get(handlers::assist_summary))
        .route("/assists/:id", delete(handlers::undo_assists))
        .with_state(state)
}
