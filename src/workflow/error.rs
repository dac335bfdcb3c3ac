use serde::Serialize;

/// Every way a guarded operation can refuse a request.
///
/// All variants are user-correctable: they name the rule that blocked the
/// operation, and no state was touched when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum WorkflowError {
    #[error("The requested record does not exist.")]
    NotFound,
    #[error("Only the conference chair can do this.")]
    NotChair,
    #[error("You already chair this conference.")]
    AlreadyChair,
    #[error("You are already a PC member of this conference.")]
    AlreadyMember,
    #[error("The chair cannot submit to their own conference.")]
    ChairCannotSubmit,
    #[error("The deadline has passed.")]
    DeadlinePassed,
    #[error("The conference dates are not in a valid order.")]
    InvalidDates,
    #[error("Every new date must be later than the current one.")]
    DateNotAdvanced,
    #[error("The website is not a valid URL.")]
    InvalidWebsite,
    #[error("You are not a PC member of this conference.")]
    NotPcMember,
    #[error("Authors cannot bid on their own submission.")]
    AuthorCannotBid,
    #[error("You already bid on this submission.")]
    AlreadyBid,
    #[error("The chair cannot be assigned as a reviewer.")]
    CannotAssignChair,
    #[error("The PC member belongs to a different conference.")]
    WrongConference,
    #[error("Authors cannot review their own submission.")]
    AuthorCannotReview,
    #[error("This PC member is already assigned to the submission.")]
    AlreadyAssigned,
    #[error("This PC member refused to evaluate the submission.")]
    RefusedToEvaluate,
    #[error("The grade is out of range.")]
    InvalidGrade,
    #[error("You are not assigned to review this submission.")]
    NotAssigned,
    #[error("The conference has already been evaluated.")]
    AlreadyEvaluated,
    #[error("Some review assignments are not graded yet.")]
    NotAllGraded,
    #[error("The submission already has a section.")]
    HasSection,
    #[error("A record with this name already exists.")]
    AlreadyExists,
    #[error("You are already registered for this paper.")]
    AlreadyRegistered,
    #[error("You must be logged in.")]
    Unauthenticated,
    #[error("Only the author of the submission can do this.")]
    NotAuthor,
    #[error("The chair cannot grade submissions.")]
    ChairCannotGrade,
    #[error("Authors cannot comment on their own submission.")]
    AuthorCannotComment,
    #[error("Authors cannot register for their own paper.")]
    AuthorCannotJoin,
    #[error("The session chair cannot register for a paper of their session.")]
    SessionChairCannotJoin,
    #[error("The conference has not been evaluated yet.")]
    NotEvaluated,
    #[error("The submission was not accepted.")]
    NotAccepted,
    #[error("A required field is empty or too long.")]
    InvalidField,
}

impl WorkflowError {
    /// Stable machine-readable name of the failure.
    pub fn code(self) -> &'static str {
        match self {
            WorkflowError::NotFound => "NotFound",
            WorkflowError::NotChair => "NotChair",
            WorkflowError::AlreadyChair => "AlreadyChair",
            WorkflowError::AlreadyMember => "AlreadyMember",
            WorkflowError::ChairCannotSubmit => "ChairCannotSubmit",
            WorkflowError::DeadlinePassed => "DeadlinePassed",
            WorkflowError::InvalidDates => "InvalidDates",
            WorkflowError::DateNotAdvanced => "DateNotAdvanced",
            WorkflowError::InvalidWebsite => "InvalidWebsite",
            WorkflowError::NotPcMember => "NotPcMember",
            WorkflowError::AuthorCannotBid => "AuthorCannotBid",
            WorkflowError::AlreadyBid => "AlreadyBid",
            WorkflowError::CannotAssignChair => "CannotAssignChair",
            WorkflowError::WrongConference => "WrongConference",
            WorkflowError::AuthorCannotReview => "AuthorCannotReview",
            WorkflowError::AlreadyAssigned => "AlreadyAssigned",
            WorkflowError::RefusedToEvaluate => "RefusedToEvaluate",
            WorkflowError::InvalidGrade => "InvalidGrade",
            WorkflowError::NotAssigned => "NotAssigned",
            WorkflowError::AlreadyEvaluated => "AlreadyEvaluated",
            WorkflowError::NotAllGraded => "NotAllGraded",
            WorkflowError::HasSection => "HasSection",
            WorkflowError::AlreadyExists => "AlreadyExists",
            WorkflowError::AlreadyRegistered => "AlreadyRegistered",
            WorkflowError::Unauthenticated => "Unauthenticated",
            WorkflowError::NotAuthor => "NotAuthor",
            WorkflowError::ChairCannotGrade => "ChairCannotGrade",
            WorkflowError::AuthorCannotComment => "AuthorCannotComment",
            WorkflowError::AuthorCannotJoin => "AuthorCannotJoin",
            WorkflowError::SessionChairCannotJoin => "SessionChairCannotJoin",
            WorkflowError::NotEvaluated => "NotEvaluated",
            WorkflowError::NotAccepted => "NotAccepted",
            WorkflowError::InvalidField => "InvalidField",
        }
    }
}
