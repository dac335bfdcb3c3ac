use uuid::Uuid;

use super::{Change, ConferenceBook, GuardChain, WorkflowError};
use crate::db::{Actor, Participant, Section, Session, Submission};

impl ConferenceBook {
    fn session_index(&self, section: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.section == section)
    }

    /// Opens a session of the conference for an existing section.
    pub fn attach_section(
        &mut self,
        actor: &Actor,
        section: Option<&Section>,
    ) -> Result<&Session, WorkflowError> {
        GuardChain::new()
            .require(|| self.is_chair(actor), WorkflowError::NotChair)
            .require(|| section.is_some(), WorkflowError::NotFound)
            .require(
                || section.map_or(true, |s| self.session_index(&s.name).is_none()),
                WorkflowError::AlreadyExists,
            )
            .evaluate()?;

        let section = section.ok_or(WorkflowError::NotFound)?;
        let session = Session {
            id: Uuid::new_v4(),
            conference_id: self.conference.id,
            section: section.name.clone(),
            chair_member_id: None,
        };
        self.record(Change::SessionOpened(session.clone()));
        self.sessions.push(session);
        Ok(&self.sessions[self.sessions.len() - 1])
    }

    pub fn section_submission(
        &mut self,
        actor: &Actor,
        submission_id: Uuid,
        section: &str,
    ) -> Result<&Submission, WorkflowError> {
        let has_section = self.submission(submission_id)?.section.is_some();
        GuardChain::new()
            .require(|| self.is_chair(actor), WorkflowError::NotChair)
            .require(|| self.session_index(section).is_some(), WorkflowError::NotFound)
            .require(|| !has_section, WorkflowError::HasSection)
            .evaluate()?;

        self.submission_mut(submission_id)?.section = Some(section.to_string());
        self.record(Change::SectionAssigned {
            submission_id,
            section: section.to_string(),
        });
        self.submission(submission_id)
    }

    /// `target` is the actor named as session chair; they must sit on the
    /// program committee. A previous session chair is replaced.
    pub fn assign_session_chair(
        &mut self,
        actor: &Actor,
        section: &str,
        target: Option<&Actor>,
    ) -> Result<&Session, WorkflowError> {
        let index = self.session_index(section);
        let member_id = target.and_then(|t| self.member_of(t.id)).map(|m| m.id);
        GuardChain::new()
            .require(|| self.is_chair(actor), WorkflowError::NotChair)
            .require(|| index.is_some(), WorkflowError::NotFound)
            .require(|| member_id.is_some(), WorkflowError::NotFound)
            .evaluate()?;

        let (Some(index), Some(member_id)) = (index, member_id) else {
            return Err(WorkflowError::NotFound);
        };
        let session = &mut self.sessions[index];
        session.chair_member_id = Some(member_id);
        let session_id = session.id;
        self.record(Change::SessionChairAssigned {
            session_id,
            member_id,
        });
        Ok(&self.sessions[index])
    }

    /// Registers attendance for the presentation of a paper.
    pub fn join_paper(
        &mut self,
        actor: &Actor,
        submission_id: Uuid,
    ) -> Result<&Participant, WorkflowError> {
        let submission = self.submission(submission_id)?;
        let session_chair = submission
            .section
            .as_deref()
            .and_then(|section| self.session_index(section))
            .and_then(|index| self.sessions[index].chair_member_id);
        let actor_member = self.member_of(actor.id).map(|m| m.id);

        GuardChain::new()
            .require(|| submission.submitter_id != actor.id, WorkflowError::AuthorCannotJoin)
            .require(
                || session_chair.is_none() || session_chair != actor_member,
                WorkflowError::SessionChairCannotJoin,
            )
            .require(
                || {
                    !self
                        .participants
                        .iter()
                        .any(|p| p.submission_id == submission_id && p.actor_id == actor.id)
                },
                WorkflowError::AlreadyRegistered,
            )
            .evaluate()?;

        let participant = Participant {
            id: Uuid::new_v4(),
            submission_id,
            actor_id: actor.id,
        };
        self.record(Change::ParticipantJoined(participant.clone()));
        self.participants.push(participant);
        Ok(&self.participants[self.participants.len() - 1])
    }
}
