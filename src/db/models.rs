use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Conference {
    pub id: Uuid,
    pub name: String,
    pub website: String,
    pub info: String,
    pub start_date: NaiveDate,
    pub abstract_deadline: NaiveDate,
    pub submission_deadline: NaiveDate,
    pub bidding_deadline: Option<NaiveDate>,
    pub presentation_date: NaiveDate,
    pub end_date: NaiveDate,
    pub chair_id: Uuid,
    pub evaluated: bool,
}

/// Program committee enrollment of one actor in one conference.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PcMember {
    pub id: Uuid,
    pub conference_id: Uuid,
    pub actor_id: Uuid,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub conference_id: Uuid,
    pub submitter_id: Uuid,
    pub title: String,
    pub abstract_text: String,
    pub full_paper: Option<String>,
    pub meta_info: Option<String>,
    pub section: Option<String>,
}

/// How much a PC member wants to review a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[repr(i16)]
#[serde(rename_all = "snake_case")]
pub enum Interest {
    WantToEvaluate = 0,
    Neutral = 1,
    RefuseToEvaluate = 2,
}

impl std::fmt::Display for Interest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interest::WantToEvaluate => write!(f, "want_to_evaluate"),
            Interest::Neutral => write!(f, "neutral"),
            Interest::RefuseToEvaluate => write!(f, "refuse_to_evaluate"),
        }
    }
}

/// Review grade. The discriminant is the rank used for aggregation:
/// lower is better, `NotGraded` never takes part in an average.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type,
)]
#[repr(i16)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    #[default]
    NotGraded = 0,
    StrongAccept = 1,
    Accept = 2,
    WeakAccept = 3,
    Borderline = 4,
    WeakReject = 5,
    Reject = 6,
    StrongReject = 7,
}

impl Grade {
    pub const GRADED: [Grade; 7] = [
        Grade::StrongAccept,
        Grade::Accept,
        Grade::WeakAccept,
        Grade::Borderline,
        Grade::WeakReject,
        Grade::Reject,
        Grade::StrongReject,
    ];

    /// Looks up a grade by its rank, refusing the ungraded default.
    pub fn from_index(index: i64) -> Option<Self> {
        Self::GRADED.into_iter().find(|g| i64::from(g.rank()) == index)
    }

    pub fn rank(self) -> i16 {
        self as i16
    }

    pub fn is_graded(self) -> bool {
        self != Grade::NotGraded
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Grade::NotGraded => "not graded",
            Grade::StrongAccept => "strong accept",
            Grade::Accept => "accept",
            Grade::WeakAccept => "weak accept",
            Grade::Borderline => "borderline",
            Grade::WeakReject => "weak reject",
            Grade::Reject => "reject",
            Grade::StrongReject => "strong reject",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Bid {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub member_id: Uuid,
    pub interest: Interest,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ReviewAssignment {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub member_id: Uuid,
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Remark {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub member_id: Uuid,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub id: Uuid,
    pub submission_id: Uuid,
    /// Mean rank of the graded reviews; `None` when nobody reviewed the paper.
    pub grade: Option<f64>,
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
}

/// A section attached to a conference, optionally chaired by a PC member.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub conference_id: Uuid,
    pub section: String,
    pub chair_member_id: Option<Uuid>,
}

/// Attendance registration of an actor for a paper presentation.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub actor_id: Uuid,
}
