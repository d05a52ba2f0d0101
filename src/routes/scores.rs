use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::Result,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use super::AppState;
use crate::error::AppError;
use crate::leaderboard::{self, RankingQuery, ScoreSubmission, Submitted};

async fn submit_score(
    State(state): State<AppState>,
    payload: Result<Json<ScoreSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(submission) = payload?;
    let (status, message, record) =
        match leaderboard::submit_score(state.scores.as_ref(), submission).await? {
            Submitted::Created(record) => (StatusCode::CREATED, "Score registered", record),
            Submitted::Updated(record) => (StatusCode::OK, "Score updated", record),
        };
    Ok((status, Json(json!({ "message": message, "record": record }))))
}

async fn top_rankings(
    State(state): State<AppState>,
    query: Result<Query<RankingQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(query) = query?;
    let rankings =
        leaderboard::top_rankings(state.scores.as_ref(), state.users.as_ref(), query).await?;
    Ok(Json(json!({
        "message": "Rankings retrieved",
        "rankings": rankings,
    })))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/registrar-pontuacao", post(submit_score))
        .route("/scores", post(submit_score))
        .route("/maiores-pontuacoes", get(top_rankings))
        .route("/rankings", get(top_rankings))
        .with_state(state)
}
