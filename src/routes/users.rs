use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::Result,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

use super::AppState;
use crate::error::AppError;
use crate::models::User;
use crate::users::{self, Credentials, PasswordReset, ProfileForm, Registration};

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(form) = payload?;
    let user = users::register(state.users.as_ref(), form).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered", "user": user })),
    ))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(credentials) = payload?;
    let user = users::login(state.users.as_ref(), credentials).await?;
    Ok(Json(json!({
        "message": "Login successful",
        "controlId": user.control_id,
        "user": user,
    })))
}

async fn reset_password(
    State(state): State<AppState>,
    payload: Result<Json<PasswordReset>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(form) = payload?;
    users::reset_password(state.users.as_ref(), form).await?;
    Ok(Json(json!({ "message": "Password reset" })))
}

async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<User>, AppError> {
    let Path(id) = id?;
    Ok(Json(users::get_user(state.users.as_ref(), id).await?))
}

async fn update_profile(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProfileForm>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    let Json(form) = payload?;
    let user = users::update_profile(state.users.as_ref(), id, form).await?;
    Ok(Json(json!({
        "message": "Profile updated",
        "controlId": user.control_id,
        "user": user,
    })))
}

async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    users::delete_user(state.users.as_ref(), id).await?;
    Ok(Json(json!({ "message": "User and scores deleted" })))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/registrar", post(register))
        .route("/login", post(login))
        .route("/redefinir-senha", post(reset_password))
        .route("/usuario/:id", get(get_user))
        .route("/atualizar-dados/:id", put(update_profile))
        .route("/deletar-usuario/:id", delete(delete_user))
        .with_state(state)
}
