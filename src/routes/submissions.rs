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
use crate::db::{self, Interest};
use crate::error::AppError;
use crate::state::AppState;
use crate::workflow::Proposal;

#[derive(Deserialize)]
pub struct BidForm {
    interest: Interest,
}

#[derive(Deserialize)]
pub struct RemarkForm {
    text: String,
}

#[derive(Deserialize)]
pub struct SectionForm {
    section: String,
}

pub async fn update_submission(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(submission_id): Path<Uuid>,
    Json(proposal): Json<Proposal>,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool.as_ref();
    let today = state.today();
    let conference_id = db::conference_of_submission(pool, submission_id).await?;
    let submission = db::update_conference(pool, conference_id, |book| {
        book.update_submission(&actor, submission_id, proposal, today)
            .cloned()
    })
    .await?;
    Ok(Json(submission))
}

pub async fn submit_bid(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(submission_id): Path<Uuid>,
    Json(form): Json<BidForm>,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool.as_ref();
    let today = state.today();
    let conference_id = db::conference_of_submission(pool, submission_id).await?;
    let bid = db::update_conference(pool, conference_id, |book| {
        book.submit_bid(&actor, submission_id, form.interest, today)
            .cloned()
    })
    .await?;
    Ok((StatusCode::CREATED, Json(bid)))
}

pub async fn assign_reviewer(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path((submission_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool.as_ref();
    let conference_id = db::conference_of_submission(pool, submission_id).await?;
    let target = db::find_member(pool, member_id).await?;
    let assignment = db::update_conference(pool, conference_id, |book| {
        book.assign_reviewer(&actor, submission_id, target.as_ref())
            .cloned()
    })
    .await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// An index that is not an integer is passed on as 0, which the grade guard
/// rejects as out of range in its usual position.
fn parse_grade_index(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

pub async fn grade_submission(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path((submission_id, raw_index)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, AppError> {
    let grade_index = parse_grade_index(&raw_index);
    let pool = state.pool.as_ref();
    let conference_id = db::conference_of_submission(pool, submission_id).await?;
    let change = db::update_conference(pool, conference_id, |book| {
        book.grade_submission(&actor, submission_id, grade_index)
    })
    .await?;
    tracing::info!(
        "{} graded submission {}: {} -> {}",
        actor.username,
        submission_id,
        change.previous,
        change.current
    );
    Ok(Json(change))
}

pub async fn comment(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(submission_id): Path<Uuid>,
    Json(form): Json<RemarkForm>,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool.as_ref();
    let conference_id = db::conference_of_submission(pool, submission_id).await?;
    let remark = db::update_conference(pool, conference_id, |book| {
        book.comment(&actor, submission_id, &form.text).cloned()
    })
    .await?;
    Ok((StatusCode::CREATED, Json(remark)))
}

pub async fn list_remarks(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(submission_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool.as_ref();
    let conference_id = db::conference_of_submission(pool, submission_id).await?;
    let book = db::load_conference(pool, conference_id).await?;
    let remarks: Vec<db::Remark> = book
        .remarks(&actor, submission_id)?
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(remarks))
}

pub async fn assign_section(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(submission_id): Path<Uuid>,
    Json(form): Json<SectionForm>,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool.as_ref();
    let conference_id = db::conference_of_submission(pool, submission_id).await?;
    let submission = db::update_conference(pool, conference_id, |book| {
        book.section_submission(&actor, submission_id, &form.section)
            .cloned()
    })
    .await?;
    Ok(Json(submission))
}

pub async fn join_paper(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(submission_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool.as_ref();
    let conference_id = db::conference_of_submission(pool, submission_id).await?;
    let participant = db::update_conference(pool, conference_id, |book| {
        book.join_paper(&actor, submission_id).cloned()
    })
    .await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

pub async fn download_certificate(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(submission_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool.as_ref();
    let conference_id = db::conference_of_submission(pool, submission_id).await?;
    let book = db::load_conference(pool, conference_id).await?;
    let (conference, submission) = book.certificate_for(&actor, submission_id)?;

    let content = crate::pdf::render_certificate(
        &conference.name,
        &submission.title,
        state.config.certificate_font_dir.as_deref(),
    )
    .map_err(AppError::Certificate)?;

    let safe_title: String = submission
        .title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let download_name = format!("{}_Certificate.pdf", safe_title);
    Ok((
        [
            (axum::http::header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                axum::http::header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download_name),
            ),
        ],
        content,
    ))
}
