use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::{Change, ConferenceBook, GuardChain, WorkflowError};
use crate::db::{Actor, Bid, Grade, Interest, PcMember, Remark, ReviewAssignment};

/// Outcome of grading: regrading is allowed and reports the old value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradeChange {
    pub assignment_id: Uuid,
    pub submission_id: Uuid,
    pub previous: Grade,
    pub current: Grade,
}

impl ConferenceBook {
    pub fn enroll(&mut self, actor: &Actor, description: &str) -> Result<&PcMember, WorkflowError> {
        GuardChain::new()
            .require(|| !self.is_chair(actor), WorkflowError::AlreadyChair)
            .require(|| self.member_of(actor.id).is_none(), WorkflowError::AlreadyMember)
            .evaluate()?;

        let member = PcMember {
            id: Uuid::new_v4(),
            conference_id: self.conference.id,
            actor_id: actor.id,
            description: description.to_string(),
        };
        self.record(Change::MemberEnrolled(member.clone()));
        self.members.push(member);
        Ok(&self.members[self.members.len() - 1])
    }

    pub fn submit_bid(
        &mut self,
        actor: &Actor,
        submission_id: Uuid,
        interest: Interest,
        today: NaiveDate,
    ) -> Result<&Bid, WorkflowError> {
        let submitter_id = self.submission(submission_id)?.submitter_id;
        let member_id = self.member_of(actor.id).map(|m| m.id);
        let bidding_deadline = self.conference.bidding_deadline;

        GuardChain::new()
            .require(|| member_id.is_some(), WorkflowError::NotPcMember)
            .require(|| submitter_id != actor.id, WorkflowError::AuthorCannotBid)
            .require(
                || {
                    !self
                        .bids
                        .iter()
                        .any(|b| b.submission_id == submission_id && Some(b.member_id) == member_id)
                },
                WorkflowError::AlreadyBid,
            )
            .require(|| !self.conference.evaluated, WorkflowError::AlreadyEvaluated)
            .require_if(
                bidding_deadline.is_some(),
                || bidding_deadline.is_some_and(|deadline| today < deadline),
                WorkflowError::DeadlinePassed,
            )
            .evaluate()?;

        let member_id = member_id.ok_or(WorkflowError::NotPcMember)?;
        let bid = Bid {
            id: Uuid::new_v4(),
            submission_id,
            member_id,
            interest,
        };
        self.record(Change::BidPlaced(bid.clone()));
        self.bids.push(bid);
        Ok(&self.bids[self.bids.len() - 1])
    }

    /// `target` is the PC member as found by id anywhere in the store, so that
    /// a member of another conference is reported as such.
    pub fn assign_reviewer(
        &mut self,
        actor: &Actor,
        submission_id: Uuid,
        target: Option<&PcMember>,
    ) -> Result<&ReviewAssignment, WorkflowError> {
        let submitter_id = self.submission(submission_id)?.submitter_id;
        let target = target.ok_or(WorkflowError::NotFound)?;

        GuardChain::new()
            .require(|| self.is_chair(actor), WorkflowError::NotChair)
            .require(|| !self.conference.evaluated, WorkflowError::AlreadyEvaluated)
            .require(
                || target.actor_id != self.conference.chair_id,
                WorkflowError::CannotAssignChair,
            )
            .require(
                || target.conference_id == self.conference.id,
                WorkflowError::WrongConference,
            )
            .require(|| target.actor_id != submitter_id, WorkflowError::AuthorCannotReview)
            .require(
                || {
                    !self
                        .assignments
                        .iter()
                        .any(|a| a.submission_id == submission_id && a.member_id == target.id)
                },
                WorkflowError::AlreadyAssigned,
            )
            .require(
                || {
                    !self.bids.iter().any(|b| {
                        b.submission_id == submission_id
                            && b.member_id == target.id
                            && b.interest == Interest::RefuseToEvaluate
                    })
                },
                WorkflowError::RefusedToEvaluate,
            )
            .evaluate()?;

        let assignment = ReviewAssignment {
            id: Uuid::new_v4(),
            submission_id,
            member_id: target.id,
            grade: Grade::NotGraded,
        };
        self.record(Change::ReviewerAssigned(assignment.clone()));
        self.assignments.push(assignment);
        Ok(&self.assignments[self.assignments.len() - 1])
    }

    pub fn grade_submission(
        &mut self,
        actor: &Actor,
        submission_id: Uuid,
        grade_index: i64,
    ) -> Result<GradeChange, WorkflowError> {
        let submitter_id = self.submission(submission_id)?.submitter_id;
        let grade = Grade::from_index(grade_index);
        let assignment = self.member_of(actor.id).and_then(|member| {
            self.assignments
                .iter()
                .position(|a| a.submission_id == submission_id && a.member_id == member.id)
        });

        GuardChain::new()
            .require(|| grade.is_some(), WorkflowError::InvalidGrade)
            .require(|| assignment.is_some(), WorkflowError::NotAssigned)
            .require(|| !self.is_chair(actor), WorkflowError::ChairCannotGrade)
            .require(|| submitter_id != actor.id, WorkflowError::AuthorCannotReview)
            .require(|| !self.conference.evaluated, WorkflowError::AlreadyEvaluated)
            .evaluate()?;

        let (Some(grade), Some(index)) = (grade, assignment) else {
            return Err(WorkflowError::NotAssigned);
        };
        let assignment = &mut self.assignments[index];
        let change = GradeChange {
            assignment_id: assignment.id,
            submission_id,
            previous: assignment.grade,
            current: grade,
        };
        assignment.grade = grade;
        self.record(Change::Graded {
            assignment_id: change.assignment_id,
            grade,
        });
        Ok(change)
    }

    pub fn comment(
        &mut self,
        actor: &Actor,
        submission_id: Uuid,
        text: &str,
    ) -> Result<&Remark, WorkflowError> {
        let member_id = self.remark_access(actor, submission_id)?;
        let remark = Remark {
            id: Uuid::new_v4(),
            submission_id,
            member_id,
            body: text.to_string(),
        };
        self.record(Change::RemarkAdded(remark.clone()));
        self.remarks.push(remark);
        Ok(&self.remarks[self.remarks.len() - 1])
    }

    /// Remarks are visible to the program committee, never to the author.
    pub fn remarks(&self, actor: &Actor, submission_id: Uuid) -> Result<Vec<&Remark>, WorkflowError> {
        self.remark_access(actor, submission_id)?;
        Ok(self
            .remarks
            .iter()
            .filter(|r| r.submission_id == submission_id)
            .collect())
    }

    fn remark_access(&self, actor: &Actor, submission_id: Uuid) -> Result<Uuid, WorkflowError> {
        let submitter_id = self.submission(submission_id)?.submitter_id;
        let member_id = self.member_of(actor.id).map(|m| m.id);
        GuardChain::new()
            .require(|| submitter_id != actor.id, WorkflowError::AuthorCannotComment)
            .require(|| member_id.is_some(), WorkflowError::NotPcMember)
            .evaluate()?;
        member_id.ok_or(WorkflowError::NotPcMember)
    }
}
