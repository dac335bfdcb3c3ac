mod changes;
mod models;

pub use models::*;

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::workflow::{required_field, ConferenceBook, ConferenceDraft, WorkflowError};

pub type DbPool = Arc<PgPool>;

const CONFERENCE_COLUMNS: &str = "id, name, website, info, start_date, abstract_deadline, \
     submission_deadline, bidding_deadline, presentation_date, end_date, chair_id, evaluated";

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Creates the actor for a newly created identity.
pub async fn register_actor(pool: &PgPool, username: &str) -> Result<Actor, AppError> {
    let actor = Actor {
        id: Uuid::new_v4(),
        username: username.to_string(),
    };
    sqlx::query("INSERT INTO actors (id, username) VALUES ($1, $2)")
        .bind(actor.id)
        .bind(&actor.username)
        .execute(pool)
        .await
        .map_err(AppError::from_write)?;
    tracing::info!("Registered actor {} ({})", actor.username, actor.id);
    Ok(actor)
}

pub async fn find_actor_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<Actor>, sqlx::Error> {
    sqlx::query_as::<_, Actor>("SELECT id, username FROM actors WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn create_section(pool: &PgPool, name: &str) -> Result<Section, AppError> {
    let name = required_field(name)?;
    let inserted = sqlx::query("INSERT INTO sections (name) VALUES ($1) ON CONFLICT DO NOTHING")
        .bind(name)
        .execute(pool)
        .await?;
    if inserted.rows_affected() == 0 {
        return Err(WorkflowError::AlreadyExists.into());
    }
    Ok(Section {
        name: name.to_string(),
    })
}

pub async fn find_section(pool: &PgPool, name: &str) -> Result<Option<Section>, sqlx::Error> {
    sqlx::query_as::<_, Section>("SELECT name FROM sections WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub async fn list_sections(pool: &PgPool) -> Result<Vec<Section>, sqlx::Error> {
    sqlx::query_as::<_, Section>("SELECT name FROM sections ORDER BY name")
        .fetch_all(pool)
        .await
}

pub async fn list_conferences(pool: &PgPool) -> Result<Vec<Conference>, sqlx::Error> {
    sqlx::query_as::<_, Conference>(&format!(
        "SELECT {CONFERENCE_COLUMNS} FROM conferences ORDER BY start_date, name"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_member(pool: &PgPool, member_id: Uuid) -> Result<Option<PcMember>, sqlx::Error> {
    sqlx::query_as::<_, PcMember>(
        "SELECT id, conference_id, actor_id, description FROM pc_members WHERE id = $1",
    )
    .bind(member_id)
    .fetch_optional(pool)
    .await
}

/// Resolves the conference owning a submission.
pub async fn conference_of_submission(pool: &PgPool, submission_id: Uuid) -> Result<Uuid, AppError> {
    let conference_id: Option<Uuid> =
        sqlx::query_scalar("SELECT conference_id FROM submissions WHERE id = $1")
            .bind(submission_id)
            .fetch_optional(pool)
            .await?;
    conference_id.ok_or_else(|| WorkflowError::NotFound.into())
}

/// Creates a conference together with the chair's PC enrollment.
pub async fn create_conference(
    pool: &PgPool,
    chair: &Actor,
    draft: ConferenceDraft,
) -> Result<ConferenceBook, AppError> {
    let name = draft.name.clone();
    let website = draft.website.clone();
    let mut book = ConferenceBook::create(chair, draft)?;

    let mut tx = pool.begin().await?;
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM conferences WHERE name = $1 OR website = $2)",
    )
    .bind(&name)
    .bind(&website)
    .fetch_one(&mut *tx)
    .await?;
    if taken {
        return Err(WorkflowError::AlreadyExists.into());
    }
    let changes = book.take_changes();
    changes::apply(&mut *tx, book.id(), &changes).await?;
    tx.commit().await?;

    tracing::info!("Created conference {} ({}) chaired by {}", name, book.id(), chair.username);
    Ok(book)
}

/// Loads a conference for reading. Nothing is locked.
pub async fn load_conference(pool: &PgPool, conference_id: Uuid) -> Result<ConferenceBook, AppError> {
    let mut conn = pool.acquire().await?;
    load_book(&mut *conn, conference_id, false).await
}

/// Runs one guarded operation against a conference.
///
/// The conference row stays locked from load until commit, so concurrent
/// operations on the same conference are serialized and every guard sees the
/// state it is about to change.
pub async fn update_conference<T, F>(
    pool: &PgPool,
    conference_id: Uuid,
    operation: F,
) -> Result<T, AppError>
where
    F: FnOnce(&mut ConferenceBook) -> Result<T, WorkflowError>,
{
    let mut tx = pool.begin().await?;
    let mut book = load_book(&mut *tx, conference_id, true).await?;

    // dropping the transaction on a guard failure rolls it back
    let outcome = operation(&mut book)?;

    let changes = book.take_changes();
    changes::apply(&mut *tx, conference_id, &changes).await?;
    tx.commit().await?;

    tracing::info!(
        "Committed {} change(s) to conference {}",
        changes.len(),
        conference_id
    );
    Ok(outcome)
}

async fn load_book(
    conn: &mut PgConnection,
    conference_id: Uuid,
    for_update: bool,
) -> Result<ConferenceBook, AppError> {
    let lock = if for_update { " FOR UPDATE" } else { "" };
    let conference = sqlx::query_as::<_, Conference>(&format!(
        "SELECT {CONFERENCE_COLUMNS} FROM conferences WHERE id = $1{lock}"
    ))
    .bind(conference_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(WorkflowError::NotFound)?;

    let mut book = ConferenceBook::new(conference);

    book.members = sqlx::query_as::<_, PcMember>(
        "SELECT id, conference_id, actor_id, description FROM pc_members
         WHERE conference_id = $1 ORDER BY created_at",
    )
    .bind(conference_id)
    .fetch_all(&mut *conn)
    .await?;

    book.submissions = sqlx::query_as::<_, Submission>(
        "SELECT id, conference_id, submitter_id, title, abstract_text, full_paper, meta_info, section
         FROM submissions WHERE conference_id = $1 ORDER BY created_at",
    )
    .bind(conference_id)
    .fetch_all(&mut *conn)
    .await?;

    book.bids = sqlx::query_as::<_, Bid>(
        "SELECT b.id, b.submission_id, b.member_id, b.interest FROM bids b
         JOIN submissions s ON s.id = b.submission_id WHERE s.conference_id = $1",
    )
    .bind(conference_id)
    .fetch_all(&mut *conn)
    .await?;

    book.assignments = sqlx::query_as::<_, ReviewAssignment>(
        "SELECT a.id, a.submission_id, a.member_id, a.grade FROM review_assignments a
         JOIN submissions s ON s.id = a.submission_id WHERE s.conference_id = $1",
    )
    .bind(conference_id)
    .fetch_all(&mut *conn)
    .await?;

    book.remarks = sqlx::query_as::<_, Remark>(
        "SELECT r.id, r.submission_id, r.member_id, r.body FROM remarks r
         JOIN submissions s ON s.id = r.submission_id WHERE s.conference_id = $1",
    )
    .bind(conference_id)
    .fetch_all(&mut *conn)
    .await?;

    book.results = sqlx::query_as::<_, EvaluationResult>(
        "SELECT e.id, e.submission_id, e.grade, e.accepted FROM evaluation_results e
         JOIN submissions s ON s.id = e.submission_id WHERE s.conference_id = $1",
    )
    .bind(conference_id)
    .fetch_all(&mut *conn)
    .await?;

    book.sessions = sqlx::query_as::<_, Session>(
        "SELECT id, conference_id, section, chair_member_id FROM sessions
         WHERE conference_id = $1 ORDER BY section",
    )
    .bind(conference_id)
    .fetch_all(&mut *conn)
    .await?;

    book.participants = sqlx::query_as::<_, Participant>(
        "SELECT p.id, p.submission_id, p.actor_id FROM participants p
         JOIN submissions s ON s.id = p.submission_id WHERE s.conference_id = $1",
    )
    .bind(conference_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(book)
}
