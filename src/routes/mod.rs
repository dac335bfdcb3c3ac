mod actors;
mod conferences;
mod sections;
mod submissions;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::{self, Actor};
use crate::error::AppError;
use crate::state::AppState;
use crate::workflow::WorkflowError;

/// Header carrying the username authenticated by the upstream proxy.
pub const REMOTE_USER_HEADER: &str = "x-remote-user";

/// The actor behind the current request.
pub struct CurrentActor(pub Actor);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let username = parts
            .headers
            .get(REMOTE_USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|username| !username.is_empty())
            .ok_or(WorkflowError::Unauthenticated)?;

        let actor = db::find_actor_by_username(state.pool.as_ref(), username)
            .await?
            .ok_or(WorkflowError::Unauthenticated)?;
        Ok(CurrentActor(actor))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/actors", post(actors::register_actor))
        .route("/actors/me", get(actors::whoami))
        .route("/sections", get(sections::list_sections).post(sections::create_section))
        .route(
            "/conferences",
            get(conferences::list_conferences).post(conferences::create_conference),
        )
        .route("/conferences/:conference_id", get(conferences::conference_detail))
        .route("/conferences/:conference_id/postpone", post(conferences::postpone_deadlines))
        .route("/conferences/:conference_id/finalize", post(conferences::finalize_evaluation))
        .route("/conferences/:conference_id/results", get(conferences::results))
        .route("/conferences/:conference_id/enroll", post(conferences::enroll))
        .route(
            "/conferences/:conference_id/submissions",
            get(conferences::list_submissions).post(conferences::submit_proposal),
        )
        .route("/conferences/:conference_id/sections", post(conferences::attach_section))
        .route(
            "/conferences/:conference_id/sections/:section/chair",
            post(conferences::assign_session_chair),
        )
        .route("/submissions/:submission_id", axum::routing::put(submissions::update_submission))
        .route("/submissions/:submission_id/bids", post(submissions::submit_bid))
        .route(
            "/submissions/:submission_id/assignments/:member_id",
            post(submissions::assign_reviewer),
        )
        .route(
            "/submissions/:submission_id/grade/:grade_index",
            post(submissions::grade_submission),
        )
        .route(
            "/submissions/:submission_id/remarks",
            get(submissions::list_remarks).post(submissions::comment),
        )
        .route("/submissions/:submission_id/section", post(submissions::assign_section))
        .route("/submissions/:submission_id/participants", post(submissions::join_paper))
        .route("/submissions/:submission_id/certificate", get(submissions::download_certificate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
