use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::{Change, ConferenceBook, GuardChain, WorkflowError};
use crate::db::{Actor, Conference, Submission};

#[derive(Debug, Clone, Deserialize)]
pub struct Proposal {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub full_paper: Option<String>,
    #[serde(default)]
    pub meta_info: Option<String>,
}

impl ConferenceBook {
    /// Proposals are accepted strictly before the abstract deadline.
    pub fn submit_proposal(
        &mut self,
        actor: &Actor,
        proposal: Proposal,
        today: NaiveDate,
    ) -> Result<&Submission, WorkflowError> {
        GuardChain::new()
            .require(|| !self.is_chair(actor), WorkflowError::ChairCannotSubmit)
            .require(
                || today < self.conference.abstract_deadline,
                WorkflowError::DeadlinePassed,
            )
            .require(|| !self.conference.evaluated, WorkflowError::AlreadyEvaluated)
            .evaluate()?;

        let submission = Submission {
            id: Uuid::new_v4(),
            conference_id: self.conference.id,
            submitter_id: actor.id,
            title: proposal.title,
            abstract_text: proposal.abstract_text,
            full_paper: proposal.full_paper,
            meta_info: proposal.meta_info,
            section: None,
        };
        self.record(Change::SubmissionCreated(submission.clone()));
        self.submissions.push(submission);
        Ok(&self.submissions[self.submissions.len() - 1])
    }

    /// The author may rewrite a submission until the submission deadline.
    pub fn update_submission(
        &mut self,
        actor: &Actor,
        submission_id: Uuid,
        proposal: Proposal,
        today: NaiveDate,
    ) -> Result<&Submission, WorkflowError> {
        let submitter_id = self.submission(submission_id)?.submitter_id;
        GuardChain::new()
            .require(|| !self.is_chair(actor), WorkflowError::ChairCannotSubmit)
            .require(|| submitter_id == actor.id, WorkflowError::NotAuthor)
            .require(
                || today < self.conference.submission_deadline,
                WorkflowError::DeadlinePassed,
            )
            .evaluate()?;

        let submission = self.submission_mut(submission_id)?;
        submission.title = proposal.title;
        submission.abstract_text = proposal.abstract_text;
        submission.full_paper = proposal.full_paper;
        submission.meta_info = proposal.meta_info;
        let updated = submission.clone();
        self.record(Change::SubmissionUpdated(updated));
        self.submission(submission_id)
    }

    /// Checks that `actor` may download the acceptance certificate of a paper.
    pub fn certificate_for(
        &self,
        actor: &Actor,
        submission_id: Uuid,
    ) -> Result<(&Conference, &Submission), WorkflowError> {
        let submission = self.submission(submission_id)?;
        GuardChain::new()
            .require(|| submission.submitter_id == actor.id, WorkflowError::NotAuthor)
            .evaluate()?;
        let accepted = self
            .results()?
            .iter()
            .any(|r| r.submission_id == submission_id && r.accepted);
        if !accepted {
            return Err(WorkflowError::NotAccepted);
        }
        Ok((&self.conference, submission))
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    #[test]
    fn proposal_before_the_abstract_deadline_is_accepted() {
        let chair = actor("chair");
        let author = actor("x");
        let mut book = book(&chair);

        let submission = book
            .submit_proposal(&author, proposal("Ownership"), day(9))
            .unwrap()
            .clone();
        assert_eq!(submission.submitter_id, author.id);
        assert_eq!(submission.conference_id, book.id());
        assert_eq!(
            book.take_changes(),
            vec![Change::SubmissionCreated(submission)]
        );
    }

    #[test]
    fn proposal_on_or_after_the_abstract_deadline_is_refused() {
        let chair = actor("chair");
        let author = actor("x");
        let mut book = book(&chair);
        book.submit_proposal(&author, proposal("First"), day(1))
            .unwrap();

        for late in [day(10), day(11)] {
            assert_eq!(
                book.submit_proposal(&author, proposal("Again"), late)
                    .unwrap_err(),
                WorkflowError::DeadlinePassed
            );
        }
        assert_eq!(book.submissions().len(), 1);
    }

    #[test]
    fn chair_cannot_submit_even_late() {
        let chair = actor("chair");
        let mut book = book(&chair);
        assert_eq!(
            book.submit_proposal(&chair, proposal("Mine"), day(30))
                .unwrap_err(),
            WorkflowError::ChairCannotSubmit
        );
    }

    #[test]
    fn author_updates_until_the_submission_deadline() {
        let mut s = scene();
        let mut revised = proposal("Borrowing, revised");
        revised.full_paper = Some("papers/borrowing.pdf".into());

        let updated = s
            .book
            .update_submission(&s.author, s.submission_id, revised.clone(), day(19))
            .unwrap();
        assert_eq!(updated.title, "Borrowing, revised");
        assert_eq!(updated.full_paper.as_deref(), Some("papers/borrowing.pdf"));

        assert_eq!(
            s.book
                .update_submission(&s.author, s.submission_id, revised, day(20))
                .unwrap_err(),
            WorkflowError::DeadlinePassed
        );
    }

    #[test]
    fn update_guards_run_in_order() {
        let mut s = scene();
        assert_eq!(
            s.book
                .update_submission(&s.author, Uuid::new_v4(), proposal("?"), today())
                .unwrap_err(),
            WorkflowError::NotFound
        );
        assert_eq!(
            s.book
                .update_submission(&s.chair, s.submission_id, proposal("?"), day(99))
                .unwrap_err(),
            WorkflowError::ChairCannotSubmit
        );
        assert_eq!(
            s.book
                .update_submission(&s.reviewer, s.submission_id, proposal("?"), today())
                .unwrap_err(),
            WorkflowError::NotAuthor
        );
        assert_eq!(s.book.submission(s.submission_id).unwrap().title, "Borrowing");
    }

    #[test]
    fn certificate_only_for_accepted_authors() {
        let mut s = scene();
        let member = s.member(&s.reviewer);
        s.book
            .assign_reviewer(&s.chair, s.submission_id, Some(&member))
            .unwrap();
        s.book.grade_submission(&s.reviewer, s.submission_id, 2).unwrap();

        assert_eq!(
            s.book
                .certificate_for(&s.author, s.submission_id)
                .unwrap_err(),
            WorkflowError::NotEvaluated
        );
        s.book.finalize_evaluation(&s.chair).unwrap();

        assert_eq!(
            s.book
                .certificate_for(&s.reviewer, s.submission_id)
                .unwrap_err(),
            WorkflowError::NotAuthor
        );
        let (conference, submission) = s.book.certificate_for(&s.author, s.submission_id).unwrap();
        assert_eq!(conference.name, "RustConf");
        assert_eq!(submission.title, "Borrowing");
    }

    #[test]
    fn rejected_paper_has_no_certificate() {
        let mut s = scene();
        s.book.finalize_evaluation(&s.chair).unwrap();
        assert_eq!(
            s.book
                .certificate_for(&s.author, s.submission_id)
                .unwrap_err(),
            WorkflowError::NotAccepted
        );
    }
}
