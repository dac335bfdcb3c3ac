use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use std::sync::Arc;

use super::CurrentActor;
use crate::db;
use crate::error::AppError;
use crate::state::AppState;
use crate::workflow::required_field;

#[derive(Deserialize)]
pub struct RegisterForm {
    username: String,
}

/// Called by the identity collaborator right after it creates a user.
pub async fn register_actor(
    State(state): State<Arc<AppState>>,
    Json(form): Json<RegisterForm>,
) -> Result<impl IntoResponse, AppError> {
    let username = required_field(&form.username)?;
    let actor = db::register_actor(state.pool.as_ref(), username).await?;
    Ok((StatusCode::CREATED, Json(actor)))
}

pub async fn whoami(CurrentActor(actor): CurrentActor) -> impl IntoResponse {
    Json(actor)
}
