use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use std::sync::Arc;

use super::CurrentActor;
use crate::db;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NewSection {
    name: String,
}

pub async fn create_section(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Json(form): Json<NewSection>,
) -> Result<impl IntoResponse, AppError> {
    let section = db::create_section(state.pool.as_ref(), &form.name).await?;
    tracing::info!("{} created section {}", actor.username, section.name);
    Ok((StatusCode::CREATED, Json(section)))
}

pub async fn list_sections(
    State(state): State<Arc<AppState>>,
    CurrentActor(_): CurrentActor,
) -> Result<impl IntoResponse, AppError> {
    let sections = db::list_sections(state.pool.as_ref()).await?;
    Ok(Json(sections))
}
