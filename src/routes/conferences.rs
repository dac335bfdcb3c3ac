use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::CurrentActor;
use crate::db;
use crate::error::AppError;
use crate::state::AppState;
use crate::workflow::{ConferenceDraft, Postponement, Proposal};

#[derive(Deserialize)]
pub struct EnrollForm {
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
pub struct SectionForm {
    section: String,
}

#[derive(Deserialize)]
pub struct SessionChairForm {
    member: String,
}

pub async fn list_conferences(
    State(state): State<Arc<AppState>>,
    CurrentActor(_): CurrentActor,
) -> Result<impl IntoResponse, AppError> {
    let conferences = db::list_conferences(state.pool.as_ref()).await?;
    Ok(Json(conferences))
}

pub async fn create_conference(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Json(draft): Json<ConferenceDraft>,
) -> Result<impl IntoResponse, AppError> {
    let book = db::create_conference(state.pool.as_ref(), &actor, draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "conference": book.conference(),
            "members": book.members(),
        })),
    ))
}

pub async fn conference_detail(
    State(state): State<Arc<AppState>>,
    CurrentActor(_): CurrentActor,
    Path(conference_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let book = db::load_conference(state.pool.as_ref(), conference_id).await?;
    Ok(Json(serde_json::json!({
        "conference": book.conference(),
        "members": book.members(),
        "sessions": book.sessions(),
        "submission_count": book.submissions().len(),
    })))
}

pub async fn postpone_deadlines(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(conference_id): Path<Uuid>,
    Json(postponement): Json<Postponement>,
) -> Result<impl IntoResponse, AppError> {
    let conference = db::update_conference(state.pool.as_ref(), conference_id, |book| {
        book.postpone_deadlines(&actor, postponement).cloned()
    })
    .await?;
    Ok(Json(conference))
}

pub async fn finalize_evaluation(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(conference_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let results = db::update_conference(state.pool.as_ref(), conference_id, |book| {
        book.finalize_evaluation(&actor)
    })
    .await?;
    tracing::info!(
        "Conference {} evaluated: {} of {} submissions accepted",
        conference_id,
        results.iter().filter(|r| r.accepted).count(),
        results.len()
    );
    Ok(Json(serde_json::json!({
        "evaluated": true,
        "results": results,
    })))
}

pub async fn results(
    State(state): State<Arc<AppState>>,
    CurrentActor(_): CurrentActor,
    Path(conference_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let book = db::load_conference(state.pool.as_ref(), conference_id).await?;
    let results = book.results()?.to_vec();
    Ok(Json(results))
}

pub async fn enroll(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(conference_id): Path<Uuid>,
    Json(form): Json<EnrollForm>,
) -> Result<impl IntoResponse, AppError> {
    let member = db::update_conference(state.pool.as_ref(), conference_id, |book| {
        book.enroll(&actor, &form.description).cloned()
    })
    .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn submit_proposal(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(conference_id): Path<Uuid>,
    Json(proposal): Json<Proposal>,
) -> Result<impl IntoResponse, AppError> {
    let today = state.today();
    let submission = db::update_conference(state.pool.as_ref(), conference_id, |book| {
        book.submit_proposal(&actor, proposal, today).cloned()
    })
    .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    CurrentActor(_): CurrentActor,
    Path(conference_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let book = db::load_conference(state.pool.as_ref(), conference_id).await?;
    Ok(Json(book.submissions().to_vec()))
}

pub async fn attach_section(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(conference_id): Path<Uuid>,
    Json(form): Json<SectionForm>,
) -> Result<impl IntoResponse, AppError> {
    let section = db::find_section(state.pool.as_ref(), &form.section).await?;
    let session = db::update_conference(state.pool.as_ref(), conference_id, |book| {
        book.attach_section(&actor, section.as_ref()).cloned()
    })
    .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn assign_session_chair(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path((conference_id, section)): Path<(Uuid, String)>,
    Json(form): Json<SessionChairForm>,
) -> Result<impl IntoResponse, AppError> {
    let target = db::find_actor_by_username(state.pool.as_ref(), &form.member).await?;
    let session = db::update_conference(state.pool.as_ref(), conference_id, |book| {
        book.assign_session_chair(&actor, &section, target.as_ref())
            .cloned()
    })
    .await?;
    Ok(Json(session))
}
