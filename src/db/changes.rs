use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::AppError;
use crate::workflow::Change;

/// Writes the recorded changes of one operation, in order.
pub(super) async fn apply(
    conn: &mut PgConnection,
    conference_id: Uuid,
    changes: &[Change],
) -> Result<(), AppError> {
    for change in changes {
        apply_one(conn, conference_id, change)
            .await
            .map_err(AppError::from_write)?;
    }
    Ok(())
}

async fn apply_one(
    conn: &mut PgConnection,
    conference_id: Uuid,
    change: &Change,
) -> Result<(), sqlx::Error> {
    match change {
        Change::ConferenceCreated(c) => {
            sqlx::query(
                r#"
                INSERT INTO conferences (id, name, website, info, start_date, abstract_deadline,
                    submission_deadline, bidding_deadline, presentation_date, end_date, chair_id, evaluated)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(c.id)
            .bind(&c.name)
            .bind(&c.website)
            .bind(&c.info)
            .bind(c.start_date)
            .bind(c.abstract_deadline)
            .bind(c.submission_deadline)
            .bind(c.bidding_deadline)
            .bind(c.presentation_date)
            .bind(c.end_date)
            .bind(c.chair_id)
            .bind(c.evaluated)
            .execute(&mut *conn)
            .await?;
        }
        Change::DatesPostponed(c) => {
            sqlx::query(
                r#"
                UPDATE conferences
                SET abstract_deadline = $2, submission_deadline = $3, bidding_deadline = $4,
                    presentation_date = $5, end_date = $6
                WHERE id = $1
                "#,
            )
            .bind(c.id)
            .bind(c.abstract_deadline)
            .bind(c.submission_deadline)
            .bind(c.bidding_deadline)
            .bind(c.presentation_date)
            .bind(c.end_date)
            .execute(&mut *conn)
            .await?;
        }
        Change::Evaluated => {
            sqlx::query("UPDATE conferences SET evaluated = TRUE WHERE id = $1")
                .bind(conference_id)
                .execute(&mut *conn)
                .await?;
        }
        Change::MemberEnrolled(m) => {
            sqlx::query(
                "INSERT INTO pc_members (id, conference_id, actor_id, description) VALUES ($1, $2, $3, $4)",
            )
            .bind(m.id)
            .bind(m.conference_id)
            .bind(m.actor_id)
            .bind(&m.description)
            .execute(&mut *conn)
            .await?;
        }
        Change::SubmissionCreated(s) => {
            sqlx::query(
                r#"
                INSERT INTO submissions (id, conference_id, submitter_id, title, abstract_text, full_paper, meta_info)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(s.id)
            .bind(s.conference_id)
            .bind(s.submitter_id)
            .bind(&s.title)
            .bind(&s.abstract_text)
            .bind(&s.full_paper)
            .bind(&s.meta_info)
            .execute(&mut *conn)
            .await?;
        }
        Change::SubmissionUpdated(s) => {
            sqlx::query(
                r#"
                UPDATE submissions
                SET title = $2, abstract_text = $3, full_paper = $4, meta_info = $5
                WHERE id = $1
                "#,
            )
            .bind(s.id)
            .bind(&s.title)
            .bind(&s.abstract_text)
            .bind(&s.full_paper)
            .bind(&s.meta_info)
            .execute(&mut *conn)
            .await?;
        }
        Change::BidPlaced(b) => {
            sqlx::query(
                "INSERT INTO bids (id, submission_id, member_id, interest) VALUES ($1, $2, $3, $4)",
            )
            .bind(b.id)
            .bind(b.submission_id)
            .bind(b.member_id)
            .bind(b.interest)
            .execute(&mut *conn)
            .await?;
        }
        Change::ReviewerAssigned(a) => {
            sqlx::query(
                "INSERT INTO review_assignments (id, submission_id, member_id, grade) VALUES ($1, $2, $3, $4)",
            )
            .bind(a.id)
            .bind(a.submission_id)
            .bind(a.member_id)
            .bind(a.grade)
            .execute(&mut *conn)
            .await?;
        }
        Change::Graded {
            assignment_id,
            grade,
        } => {
            sqlx::query("UPDATE review_assignments SET grade = $2 WHERE id = $1")
                .bind(assignment_id)
                .bind(grade)
                .execute(&mut *conn)
                .await?;
        }
        Change::RemarkAdded(r) => {
            sqlx::query(
                "INSERT INTO remarks (id, submission_id, member_id, body) VALUES ($1, $2, $3, $4)",
            )
            .bind(r.id)
            .bind(r.submission_id)
            .bind(r.member_id)
            .bind(&r.body)
            .execute(&mut *conn)
            .await?;
        }
        Change::ResultRecorded(e) => {
            sqlx::query(
                "INSERT INTO evaluation_results (id, submission_id, grade, accepted) VALUES ($1, $2, $3, $4)",
            )
            .bind(e.id)
            .bind(e.submission_id)
            .bind(e.grade)
            .bind(e.accepted)
            .execute(&mut *conn)
            .await?;
        }
        Change::SessionOpened(s) => {
            sqlx::query(
                "INSERT INTO sessions (id, conference_id, section, chair_member_id) VALUES ($1, $2, $3, $4)",
            )
            .bind(s.id)
            .bind(s.conference_id)
            .bind(&s.section)
            .bind(s.chair_member_id)
            .execute(&mut *conn)
            .await?;
        }
        Change::SessionChairAssigned {
            session_id,
            member_id,
        } => {
            sqlx::query("UPDATE sessions SET chair_member_id = $2 WHERE id = $1")
                .bind(session_id)
                .bind(member_id)
                .execute(&mut *conn)
                .await?;
        }
        Change::SectionAssigned {
            submission_id,
            section,
        } => {
            sqlx::query("UPDATE submissions SET section = $2 WHERE id = $1")
                .bind(submission_id)
                .bind(section)
                .execute(&mut *conn)
                .await?;
        }
        Change::ParticipantJoined(p) => {
            sqlx::query(
                "INSERT INTO participants (id, submission_id, actor_id) VALUES ($1, $2, $3)",
            )
            .bind(p.id)
            .bind(p.submission_id)
            .bind(p.actor_id)
            .execute(&mut *conn)
            .await?;
        }
    }
    Ok(())
}
