//! Conference workflow state machine.
//!
//! A [`ConferenceBook`] is the aggregate of one conference and everything it
//! owns. Each guarded operation is a method on the book: it evaluates its
//! guards in a fixed order, mutates the book only when all of them pass, and
//! records a [`Change`] that the persistence layer replays inside the same
//! transaction that loaded the book.

mod committee;
mod error;
mod guard;
mod lifecycle;
mod sessions;
mod submissions;

pub use committee::GradeChange;
pub use error::WorkflowError;
pub use guard::{field_fits, required_field, GuardChain};
pub use lifecycle::{website_is_valid, ConferenceDraft, MilestoneDates, Postponement, PC_CHAIR_DESCRIPTION};
pub use submissions::Proposal;

use uuid::Uuid;

use crate::db::{
    Actor, Bid, Conference, EvaluationResult, Grade, Participant, PcMember, Remark,
    ReviewAssignment, Session, Submission,
};

/// A single persisted effect of a successful operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    ConferenceCreated(Conference),
    DatesPostponed(Conference),
    Evaluated,
    MemberEnrolled(PcMember),
    SubmissionCreated(Submission),
    SubmissionUpdated(Submission),
    BidPlaced(Bid),
    ReviewerAssigned(ReviewAssignment),
    Graded { assignment_id: Uuid, grade: Grade },
    RemarkAdded(Remark),
    ResultRecorded(EvaluationResult),
    SessionOpened(Session),
    SessionChairAssigned { session_id: Uuid, member_id: Uuid },
    SectionAssigned { submission_id: Uuid, section: String },
    ParticipantJoined(Participant),
}

#[derive(Debug, Clone)]
pub struct ConferenceBook {
    pub(crate) conference: Conference,
    pub(crate) members: Vec<PcMember>,
    pub(crate) submissions: Vec<Submission>,
    pub(crate) bids: Vec<Bid>,
    pub(crate) assignments: Vec<ReviewAssignment>,
    pub(crate) remarks: Vec<Remark>,
    pub(crate) results: Vec<EvaluationResult>,
    pub(crate) sessions: Vec<Session>,
    pub(crate) participants: Vec<Participant>,
    pending: Vec<Change>,
}

impl ConferenceBook {
    /// Wraps a stored conference; the owned collections start empty and are
    /// filled by the loader.
    pub(crate) fn new(conference: Conference) -> Self {
        Self {
            conference,
            members: Vec::new(),
            submissions: Vec::new(),
            bids: Vec::new(),
            assignments: Vec::new(),
            remarks: Vec::new(),
            results: Vec::new(),
            sessions: Vec::new(),
            participants: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.conference.id
    }

    pub fn conference(&self) -> &Conference {
        &self.conference
    }

    pub fn members(&self) -> &[PcMember] {
        &self.members
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn assignments(&self) -> &[ReviewAssignment] {
        &self.assignments
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    /// Drains the changes recorded since the book was loaded.
    pub fn take_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn record(&mut self, change: Change) {
        self.pending.push(change);
    }

    pub(crate) fn is_chair(&self, actor: &Actor) -> bool {
        self.conference.chair_id == actor.id
    }

    pub(crate) fn member_of(&self, actor_id: Uuid) -> Option<&PcMember> {
        self.members.iter().find(|m| m.actor_id == actor_id)
    }

    pub(crate) fn submission(&self, submission_id: Uuid) -> Result<&Submission, WorkflowError> {
        self.submissions
            .iter()
            .find(|s| s.id == submission_id)
            .ok_or(WorkflowError::NotFound)
    }

    pub(crate) fn submission_mut(
        &mut self,
        submission_id: Uuid,
    ) -> Result<&mut Submission, WorkflowError> {
        self.submissions
            .iter_mut()
            .find(|s| s.id == submission_id)
            .ok_or(WorkflowError::NotFound)
    }
}
