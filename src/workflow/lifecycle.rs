use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use uuid::Uuid;

use super::{field_fits, Change, ConferenceBook, GuardChain, WorkflowError};
use crate::db::{Actor, Conference, EvaluationResult, Grade, PcMember};

/// Column limits of the conferences table.
pub const NAME_MAX_CHARS: usize = 255;
pub const WEBSITE_MAX_CHARS: usize = 255;
pub const INFO_MAX_CHARS: usize = 4096;

/// Motivation recorded for the chair's automatic PC enrollment.
pub const PC_CHAIR_DESCRIPTION: &str = "Created the conference.";

// scheme://host[:port][/path], host being a domain name, localhost or IPv4
const WEBSITE_PATTERN: &str = r"^(?i)(?:https?|ftp)://(?:localhost|(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}|\d{1,3}(?:\.\d{1,3}){3})(?::\d{1,5})?(?:[/?#]\S*)?$";

static WEBSITE: OnceLock<Regex> = OnceLock::new();

pub fn website_is_valid(website: &str) -> bool {
    website.chars().count() <= WEBSITE_MAX_CHARS
        && WEBSITE
            .get_or_init(|| Regex::new(WEBSITE_PATTERN).expect("website pattern compiles"))
            .is_match(website)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MilestoneDates {
    pub start_date: NaiveDate,
    pub abstract_deadline: NaiveDate,
    pub submission_deadline: NaiveDate,
    #[serde(default)]
    pub bidding_deadline: Option<NaiveDate>,
    pub presentation_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl MilestoneDates {
    pub fn is_ordered(&self) -> bool {
        let bidding_ok = self
            .bidding_deadline
            .map_or(true, |b| self.submission_deadline <= b && b <= self.end_date);
        self.start_date <= self.end_date
            && self.abstract_deadline <= self.submission_deadline
            && self.start_date <= self.presentation_date
            && self.presentation_date <= self.end_date
            && bidding_ok
    }

    fn of(conference: &Conference) -> Self {
        Self {
            start_date: conference.start_date,
            abstract_deadline: conference.abstract_deadline,
            submission_deadline: conference.submission_deadline,
            bidding_deadline: conference.bidding_deadline,
            presentation_date: conference.presentation_date,
            end_date: conference.end_date,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConferenceDraft {
    pub name: String,
    pub website: String,
    pub info: String,
    #[serde(flatten)]
    pub dates: MilestoneDates,
}

/// New values for the movable milestones. The start date never moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Postponement {
    pub abstract_deadline: NaiveDate,
    pub submission_deadline: NaiveDate,
    pub presentation_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub bidding_deadline: Option<NaiveDate>,
}

impl Postponement {
    fn advances(&self, current: &MilestoneDates) -> bool {
        let bidding_ok = match (self.bidding_deadline, current.bidding_deadline) {
            (Some(new), Some(old)) => new > old,
            _ => true,
        };
        self.abstract_deadline > current.abstract_deadline
            && self.submission_deadline > current.submission_deadline
            && self.presentation_date > current.presentation_date
            && self.end_date > current.end_date
            && bidding_ok
    }

    fn apply_to(&self, current: &MilestoneDates) -> MilestoneDates {
        MilestoneDates {
            start_date: current.start_date,
            abstract_deadline: self.abstract_deadline,
            submission_deadline: self.submission_deadline,
            bidding_deadline: self.bidding_deadline.or(current.bidding_deadline),
            presentation_date: self.presentation_date,
            end_date: self.end_date,
        }
    }
}

/// Mean rank of the graded entries, ignoring `NotGraded`.
pub(crate) fn aggregate_grade(grades: impl Iterator<Item = Grade>) -> Option<f64> {
    let (sum, count) = grades
        .filter(|g| g.is_graded())
        .fold((0i64, 0i64), |(sum, count), g| (sum + i64::from(g.rank()), count + 1));
    (count > 0).then(|| sum as f64 / count as f64)
}

pub(crate) fn is_accepted(aggregate: Option<f64>) -> bool {
    aggregate.is_some_and(|grade| grade <= f64::from(Grade::Borderline.rank()))
}

impl ConferenceBook {
    /// Opens a conference chaired by `chair` and enrolls the chair in its
    /// program committee.
    pub fn create(chair: &Actor, draft: ConferenceDraft) -> Result<Self, WorkflowError> {
        GuardChain::new()
            .require(|| draft.dates.is_ordered(), WorkflowError::InvalidDates)
            .require(|| website_is_valid(&draft.website), WorkflowError::InvalidWebsite)
            .require(|| field_fits(&draft.name, NAME_MAX_CHARS), WorkflowError::InvalidField)
            .require(|| field_fits(&draft.info, INFO_MAX_CHARS), WorkflowError::InvalidField)
            .evaluate()?;

        let dates = draft.dates;
        let conference = Conference {
            id: Uuid::new_v4(),
            name: draft.name,
            website: draft.website,
            info: draft.info,
            start_date: dates.start_date,
            abstract_deadline: dates.abstract_deadline,
            submission_deadline: dates.submission_deadline,
            bidding_deadline: dates.bidding_deadline,
            presentation_date: dates.presentation_date,
            end_date: dates.end_date,
            chair_id: chair.id,
            evaluated: false,
        };
        let chair_member = PcMember {
            id: Uuid::new_v4(),
            conference_id: conference.id,
            actor_id: chair.id,
            description: PC_CHAIR_DESCRIPTION.to_string(),
        };

        let mut book = Self::new(conference.clone());
        book.members.push(chair_member.clone());
        book.record(Change::ConferenceCreated(conference));
        book.record(Change::MemberEnrolled(chair_member));
        Ok(book)
    }

    /// Moves the deadlines later. Either every date moves or none does.
    pub fn postpone_deadlines(
        &mut self,
        actor: &Actor,
        postponement: Postponement,
    ) -> Result<&Conference, WorkflowError> {
        let current = MilestoneDates::of(&self.conference);
        let next = postponement.apply_to(&current);

        GuardChain::new()
            .require(|| self.is_chair(actor), WorkflowError::NotChair)
            .require(|| !self.conference.evaluated, WorkflowError::AlreadyEvaluated)
            .require(|| postponement.advances(&current), WorkflowError::DateNotAdvanced)
            .require(|| next.is_ordered(), WorkflowError::InvalidDates)
            .evaluate()?;

        self.conference.abstract_deadline = next.abstract_deadline;
        self.conference.submission_deadline = next.submission_deadline;
        self.conference.bidding_deadline = next.bidding_deadline;
        self.conference.presentation_date = next.presentation_date;
        self.conference.end_date = next.end_date;
        self.record(Change::DatesPostponed(self.conference.clone()));
        Ok(&self.conference)
    }

    /// Locks in the evaluation: one result per submission, then the
    /// conference becomes read-only for reviewing. Irreversible.
    pub fn finalize_evaluation(
        &mut self,
        actor: &Actor,
    ) -> Result<Vec<EvaluationResult>, WorkflowError> {
        GuardChain::new()
            .require(|| self.is_chair(actor), WorkflowError::NotChair)
            .require(|| !self.conference.evaluated, WorkflowError::AlreadyEvaluated)
            .require(
                || self.assignments.iter().all(|a| a.grade.is_graded()),
                WorkflowError::NotAllGraded,
            )
            .evaluate()?;

        let results: Vec<EvaluationResult> = self
            .submissions
            .iter()
            .map(|submission| {
                let grade = aggregate_grade(
                    self.assignments
                        .iter()
                        .filter(|a| a.submission_id == submission.id)
                        .map(|a| a.grade),
                );
                EvaluationResult {
                    id: Uuid::new_v4(),
                    submission_id: submission.id,
                    grade,
                    accepted: is_accepted(grade),
                }
            })
            .collect();

        self.conference.evaluated = true;
        self.record(Change::Evaluated);
        for result in &results {
            self.record(Change::ResultRecorded(result.clone()));
        }
        self.results = results.clone();
        Ok(results)
    }

    /// Published results; hidden until the conference is evaluated.
    pub fn results(&self) -> Result<&[EvaluationResult], WorkflowError> {
        if !self.conference.evaluated {
            return Err(WorkflowError::NotEvaluated);
        }
        Ok(&self.results)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    fn postponement(offset: i64) -> Postponement {
        Postponement {
            abstract_deadline: day(10 + offset),
            submission_deadline: day(20 + offset),
            presentation_date: day(40 + offset),
            end_date: day(45 + offset),
            bidding_deadline: None,
        }
    }

    #[test]
    fn create_enrolls_the_chair_exactly_once() {
        let chair = actor("chair");
        let mut book = ConferenceBook::create(&chair, draft("RustConf")).unwrap();

        assert!(!book.conference().evaluated);
        assert_eq!(book.members().len(), 1);
        assert_eq!(book.members()[0].actor_id, chair.id);
        assert_eq!(book.members()[0].description, "Created the conference.");

        let changes = book.take_changes();
        assert!(matches!(changes[0], Change::ConferenceCreated(_)));
        assert!(matches!(&changes[1], Change::MemberEnrolled(m) if m.actor_id == chair.id));
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn create_rejects_misordered_dates() {
        let chair = actor("chair");

        let mut ends_before_start = draft("A");
        ends_before_start.dates.end_date = day(-1);
        let mut submission_before_abstract = draft("B");
        submission_before_abstract.dates.submission_deadline = day(5);
        let mut presentation_after_end = draft("C");
        presentation_after_end.dates.presentation_date = day(50);
        let mut presentation_before_start = draft("D");
        presentation_before_start.dates.presentation_date = day(-3);

        for bad in [
            ends_before_start,
            submission_before_abstract,
            presentation_after_end,
            presentation_before_start,
        ] {
            assert_eq!(
                ConferenceBook::create(&chair, bad).unwrap_err(),
                WorkflowError::InvalidDates
            );
        }
    }

    #[test]
    fn create_checks_dates_before_website() {
        let chair = actor("chair");
        let mut bad = draft("A");
        bad.dates.end_date = day(-1);
        bad.website = "not a url".into();
        assert_eq!(
            ConferenceBook::create(&chair, bad).unwrap_err(),
            WorkflowError::InvalidDates
        );
    }

    #[test]
    fn create_rejects_malformed_website() {
        let chair = actor("chair");
        let mut bad = draft("A");
        bad.website = "conf.example.org".into();
        assert_eq!(
            ConferenceBook::create(&chair, bad).unwrap_err(),
            WorkflowError::InvalidWebsite
        );
    }

    #[test]
    fn create_rejects_fields_longer_than_their_columns() {
        let chair = actor("chair");

        let mut long_name = draft("A");
        long_name.name = "N".repeat(NAME_MAX_CHARS + 1);
        let mut blank_name = draft("A");
        blank_name.name = "  ".into();
        let mut long_info = draft("A");
        long_info.info = "i".repeat(INFO_MAX_CHARS + 1);
        for bad in [long_name, blank_name, long_info] {
            assert_eq!(
                ConferenceBook::create(&chair, bad).unwrap_err(),
                WorkflowError::InvalidField
            );
        }

        let mut long_website = draft("A");
        long_website.website = format!("https://conf.example.org/{}", "p".repeat(WEBSITE_MAX_CHARS));
        assert_eq!(
            ConferenceBook::create(&chair, long_website).unwrap_err(),
            WorkflowError::InvalidWebsite
        );

        let mut widest = draft("A");
        widest.name = "N".repeat(NAME_MAX_CHARS);
        assert!(ConferenceBook::create(&chair, widest).is_ok());
    }

    #[test]
    fn create_keeps_the_bidding_deadline_between_submission_and_end() {
        let chair = actor("chair");

        let mut before_submission = draft("A");
        before_submission.dates.bidding_deadline = Some(day(19));
        let mut after_end = draft("B");
        after_end.dates.bidding_deadline = Some(day(46));
        for bad in [before_submission, after_end] {
            assert_eq!(
                ConferenceBook::create(&chair, bad).unwrap_err(),
                WorkflowError::InvalidDates
            );
        }

        let mut on_the_edges = draft("C");
        on_the_edges.dates.bidding_deadline = Some(day(20));
        assert!(ConferenceBook::create(&chair, on_the_edges).is_ok());
        let mut at_end = draft("D");
        at_end.dates.bidding_deadline = Some(day(45));
        assert!(ConferenceBook::create(&chair, at_end).is_ok());
    }

    #[test]
    fn website_shapes() {
        assert!(website_is_valid("http://example.com"));
        assert!(website_is_valid("https://conf.example.org:8443/2026/cfp"));
        assert!(website_is_valid("http://localhost:5001"));
        assert!(website_is_valid("http://192.168.0.1/"));
        assert!(!website_is_valid("example.com"));
        assert!(!website_is_valid("https://"));
        assert!(!website_is_valid("mailto:chair@example.com"));
        assert!(!website_is_valid("https://exa mple.com"));
    }

    #[test]
    fn postpone_moves_every_deadline() {
        let chair = actor("chair");
        let mut book = book(&chair);

        let conference = book.postpone_deadlines(&chair, postponement(3)).unwrap();
        assert_eq!(conference.abstract_deadline, day(13));
        assert_eq!(conference.submission_deadline, day(23));
        assert_eq!(conference.presentation_date, day(43));
        assert_eq!(conference.end_date, day(48));
        assert_eq!(conference.start_date, day(0));
        assert!(matches!(book.take_changes()[..], [Change::DatesPostponed(_)]));
    }

    #[test]
    fn postpone_with_one_earlier_date_changes_nothing() {
        let chair = actor("chair");
        let mut book = book(&chair);
        let before = book.conference().clone();

        let mut dates = postponement(3);
        dates.submission_deadline = day(19);
        assert_eq!(
            book.postpone_deadlines(&chair, dates).unwrap_err(),
            WorkflowError::DateNotAdvanced
        );

        let mut same = postponement(3);
        same.end_date = day(45);
        assert_eq!(
            book.postpone_deadlines(&chair, same).unwrap_err(),
            WorkflowError::DateNotAdvanced
        );

        assert_eq!(book.conference(), &before);
        assert!(book.take_changes().is_empty());
    }

    #[test]
    fn postpone_requires_the_chair() {
        let chair = actor("chair");
        let mut book = book(&chair);
        assert_eq!(
            book.postpone_deadlines(&actor("other"), postponement(3))
                .unwrap_err(),
            WorkflowError::NotChair
        );
    }

    #[test]
    fn postpone_keeps_dates_ordered() {
        let chair = actor("chair");
        let mut book = book(&chair);
        let mut dates = postponement(3);
        dates.presentation_date = day(60);
        assert_eq!(
            book.postpone_deadlines(&chair, dates).unwrap_err(),
            WorkflowError::InvalidDates
        );
    }

    #[test]
    fn postpone_must_move_the_bidding_deadline_later() {
        let chair = actor("chair");
        let mut with_bidding = draft("RustConf");
        with_bidding.dates.bidding_deadline = Some(day(30));
        let mut book = ConferenceBook::create(&chair, with_bidding).unwrap();
        book.take_changes();
        let before = book.conference().clone();

        let mut earlier = postponement(3);
        earlier.bidding_deadline = Some(day(29));
        assert_eq!(
            book.postpone_deadlines(&chair, earlier).unwrap_err(),
            WorkflowError::DateNotAdvanced
        );
        assert_eq!(book.conference(), &before);
        assert!(book.take_changes().is_empty());

        let mut later = postponement(3);
        later.bidding_deadline = Some(day(31));
        let conference = book.postpone_deadlines(&chair, later).unwrap();
        assert_eq!(conference.bidding_deadline, Some(day(31)));

        // omitting the bidding deadline keeps the current one
        let conference = book.postpone_deadlines(&chair, postponement(6)).unwrap();
        assert_eq!(conference.bidding_deadline, Some(day(31)));
    }

    #[test]
    fn postpone_can_introduce_a_bidding_deadline() {
        let chair = actor("chair");
        let mut book = book(&chair);
        assert_eq!(book.conference().bidding_deadline, None);

        let mut dates = postponement(3);
        dates.bidding_deadline = Some(day(30));
        let conference = book.postpone_deadlines(&chair, dates).unwrap();
        assert_eq!(conference.bidding_deadline, Some(day(30)));

        let mut outside = postponement(6);
        outside.bidding_deadline = Some(day(60));
        assert_eq!(
            book.postpone_deadlines(&chair, outside).unwrap_err(),
            WorkflowError::InvalidDates
        );
    }

    #[test]
    fn finalize_averages_grades_and_applies_the_borderline_threshold() {
        let mut s = scene();
        let second = actor("second");
        s.book.enroll(&second, "Compilers").unwrap();
        let rejected_id = s
            .book
            .submit_proposal(&actor("other-author"), proposal("Lifetimes"), today())
            .unwrap()
            .id;

        let first_member = s.member(&s.reviewer);
        let second_member = s.member(&second);
        for submission_id in [s.submission_id, rejected_id] {
            s.book
                .assign_reviewer(&s.chair, submission_id, Some(&first_member))
                .unwrap();
            s.book
                .assign_reviewer(&s.chair, submission_id, Some(&second_member))
                .unwrap();
        }
        // (1 + 6) / 2 = 3.5 is accepted, (5 + 6) / 2 = 5.5 is not
        s.book.grade_submission(&s.reviewer, s.submission_id, 1).unwrap();
        s.book.grade_submission(&second, s.submission_id, 6).unwrap();
        s.book.grade_submission(&s.reviewer, rejected_id, 5).unwrap();
        s.book.grade_submission(&second, rejected_id, 6).unwrap();
        s.book.take_changes();

        let results = s.book.finalize_evaluation(&s.chair).unwrap();
        assert!(s.book.conference().evaluated);
        assert_eq!(results.len(), 2);

        let accepted = results
            .iter()
            .find(|r| r.submission_id == s.submission_id)
            .unwrap();
        assert_eq!(accepted.grade, Some(3.5));
        assert!(accepted.accepted);

        let rejected = results
            .iter()
            .find(|r| r.submission_id == rejected_id)
            .unwrap();
        assert_eq!(rejected.grade, Some(5.5));
        assert!(!rejected.accepted);

        let changes = s.book.take_changes();
        assert_eq!(changes[0], Change::Evaluated);
        assert_eq!(changes.len(), 3);

        assert_eq!(
            s.book.finalize_evaluation(&s.chair).unwrap_err(),
            WorkflowError::AlreadyEvaluated
        );
        assert!(s.book.take_changes().is_empty());
    }

    #[test]
    fn finalize_waits_for_every_grade() {
        let mut s = scene();
        let member = s.member(&s.reviewer);
        s.book
            .assign_reviewer(&s.chair, s.submission_id, Some(&member))
            .unwrap();

        assert_eq!(
            s.book.finalize_evaluation(&s.chair).unwrap_err(),
            WorkflowError::NotAllGraded
        );
        assert!(!s.book.conference().evaluated);
    }

    #[test]
    fn finalize_requires_the_chair() {
        let mut s = scene();
        assert_eq!(
            s.book.finalize_evaluation(&s.reviewer).unwrap_err(),
            WorkflowError::NotChair
        );
    }

    #[test]
    fn unreviewed_submission_gets_an_empty_rejected_result() {
        let mut s = scene();
        let results = s.book.finalize_evaluation(&s.chair).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].grade, None);
        assert!(!results[0].accepted);
    }

    #[test]
    fn evaluated_conference_is_terminal() {
        let mut s = scene();
        s.book.finalize_evaluation(&s.chair).unwrap();
        let member = s.member(&s.reviewer);

        assert_eq!(
            s.book
                .postpone_deadlines(&s.chair, postponement(3))
                .unwrap_err(),
            WorkflowError::AlreadyEvaluated
        );
        assert_eq!(
            s.book
                .assign_reviewer(&s.chair, s.submission_id, Some(&member))
                .unwrap_err(),
            WorkflowError::AlreadyEvaluated
        );
    }

    #[test]
    fn results_are_published_only_after_evaluation() {
        let mut s = scene();
        assert_eq!(s.book.results().unwrap_err(), WorkflowError::NotEvaluated);
        s.book.finalize_evaluation(&s.chair).unwrap();
        assert_eq!(s.book.results().unwrap().len(), 1);
    }

    #[test]
    fn aggregate_ignores_ungraded_entries() {
        let grades = [Grade::Accept, Grade::NotGraded, Grade::Reject];
        assert_eq!(aggregate_grade(grades.into_iter()), Some(4.0));
        assert_eq!(aggregate_grade([Grade::NotGraded].into_iter()), None);
        assert!(is_accepted(Some(4.0)));
        assert!(!is_accepted(Some(4.01)));
        assert!(!is_accepted(None));
    }
}
