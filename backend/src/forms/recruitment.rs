//! Forms driving the recruitment workflow.

use serde::{Deserialize, Serialize};

use super::errors::{FormErrors, INVALID_CHOICE, REQUIRED};
use crate::api::{
    Event, InstructorRecruitment, Person, PersonId, SignupInterest, SignupState, TaskWithEvent,
};

pub const RECRUITMENT_CLOSED: &str = "This recruitment process is closed.";

/// Rejects an assignee that is not an administrator.
///
/// `assignee` is the looked-up person for `assigned_to`; `None` means the id
/// did not resolve to anyone.
fn clean_assignee(
    assigned_to: Option<PersonId>,
    assignee: Option<&Person>,
    errors: &mut FormErrors,
) -> Option<PersonId> {
    let id = assigned_to?;
    match assignee {
        Some(person) if person.id == id && person.is_administrator() => Some(id),
        _ => {
            errors.add("assigned_to", INVALID_CHOICE);
            None
        }
    }
}

/// A person volunteering to teach at a recruitment's event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupForRecruitmentForm {
    #[serde(default)]
    pub interest: SignupInterest,
    #[serde(default)]
    pub user_notes: String,
}

/// Validated signup values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedSignup {
    pub interest: SignupInterest,
    pub user_notes: String,
}

impl SignupForRecruitmentForm {
    /// Validate against the recruitment and the person's overlapping
    /// instructor tasks.
    ///
    /// `conflicts` must only hold tasks on events overlapping `event`; it is
    /// ignored when `event` has an open start or end.
    pub fn clean(
        &self,
        recruitment: &InstructorRecruitment,
        event: &Event,
        conflicts: &[TaskWithEvent],
    ) -> Result<CleanedSignup, FormErrors> {
        let mut errors = FormErrors::new();

        if !recruitment.is_open() {
            errors.add_non_field(RECRUITMENT_CLOSED);
        }

        if event.date_range().is_some() && !conflicts.is_empty() {
            let slugs: Vec<&str> = conflicts.iter().map(|t| t.event.slug.as_str()).collect();
            errors.add_non_field(format!(
                "Selected event dates conflict with events: {}",
                slugs.join(", ")
            ));
        }

        errors.into_result(CleanedSignup {
            interest: self.interest,
            user_notes: self.user_notes.trim().to_string(),
        })
    }
}

/// Starting a recruitment process for an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstructorRecruitmentCreateForm {
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub assigned_to: Option<PersonId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedRecruitment {
    pub notes: String,
    pub assigned_to: Option<PersonId>,
}

impl InstructorRecruitmentCreateForm {
    pub fn clean(&self, assignee: Option<&Person>) -> Result<CleanedRecruitment, FormErrors> {
        let mut errors = FormErrors::new();
        let assigned_to = clean_assignee(self.assigned_to, assignee, &mut errors);
        errors.into_result(CleanedRecruitment {
            notes: self.notes.clone(),
            assigned_to,
        })
    }
}

/// (Re)assigning a recruitment to an administrator. Empty clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentForm {
    #[serde(default)]
    pub assigned_to: Option<PersonId>,
}

impl AssignmentForm {
    pub fn clean(&self, assignee: Option<&Person>) -> Result<Option<PersonId>, FormErrors> {
        let mut errors = FormErrors::new();
        let assigned_to = clean_assignee(self.assigned_to, assignee, &mut errors);
        errors.into_result(assigned_to)
    }
}

/// What an administrator decided about a signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignupAction {
    Confirm,
    Decline,
}

impl SignupAction {
    pub fn target_state(self) -> SignupState {
        match self {
            SignupAction::Confirm => SignupState::Confirmed,
            SignupAction::Decline => SignupState::Declined,
        }
    }
}

/// Form-encoded body of the change-state endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstructorRecruitmentSignupChangeStateForm {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

impl InstructorRecruitmentSignupChangeStateForm {
    pub fn clean(&self) -> Result<SignupAction, FormErrors> {
        match self.action.as_deref().map(str::trim) {
            None | Some("") => Err(FormErrors::field("action", REQUIRED)),
            Some("confirm") => Ok(SignupAction::Confirm),
            Some("decline") => Ok(SignupAction::Decline),
            Some(other) => Err(FormErrors::field(
                "action",
                format!(
                    "Select a valid choice. {} is not one of the available choices.",
                    other
                ),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        EventId, NewPerson, OrganizationId, RecruitmentId, RecruitmentStatus, RoleId, Task, TaskId,
    };
    use chrono::{NaiveDate, Utc};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn event(id: i64, slug: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Event {
        Event {
            id: EventId::new(id),
            slug: slug.to_string(),
            host_id: OrganizationId::new(1),
            administrator_id: None,
            start,
            end,
            tags: vec![],
        }
    }

    fn recruitment(status: RecruitmentStatus) -> InstructorRecruitment {
        InstructorRecruitment {
            id: RecruitmentId::new(1),
            event_id: EventId::new(1),
            assigned_to: None,
            status,
            notes: String::new(),
            created_at: Utc::now(),
            last_updated_at: Utc::now(),
        }
    }

    fn conflict(event: Event) -> TaskWithEvent {
        TaskWithEvent {
            task: Task {
                id: TaskId::new(10 + event.id.value()),
                event_id: event.id,
                person_id: PersonId::new(5),
                role_id: RoleId::new(1),
            },
            event,
        }
    }

    #[test]
    fn test_signup_conflict_names_events() {
        let target = event(1, "target", Some(d(2022, 2, 1)), Some(d(2022, 2, 3)));
        let conflicts = vec![
            conflict(event(2, "first-clash", Some(d(2022, 2, 3)), Some(d(2022, 2, 4)))),
            conflict(event(3, "second-clash", Some(d(2022, 1, 30)), Some(d(2022, 2, 1)))),
        ];
        let errors = SignupForRecruitmentForm::default()
            .clean(&recruitment(RecruitmentStatus::Open), &target, &conflicts)
            .unwrap_err();
        assert_eq!(
            errors.non_field_errors(),
            ["Selected event dates conflict with events: first-clash, second-clash"]
        );
    }

    #[test]
    fn test_signup_open_dates_skip_conflicts() {
        let target = event(1, "target", Some(d(2022, 2, 1)), None);
        let conflicts = vec![conflict(event(2, "x", Some(d(2022, 2, 1)), Some(d(2022, 2, 1))))];
        let cleaned = SignupForRecruitmentForm {
            interest: SignupInterest::Full,
            user_notes: " hi ".to_string(),
        }
        .clean(&recruitment(RecruitmentStatus::Open), &target, &conflicts)
        .unwrap();
        assert_eq!(cleaned.interest, SignupInterest::Full);
        assert_eq!(cleaned.user_notes, "hi");
    }

    #[test]
    fn test_signup_closed_recruitment() {
        let target = event(1, "target", None, None);
        let errors = SignupForRecruitmentForm::default()
            .clean(&recruitment(RecruitmentStatus::Closed), &target, &[])
            .unwrap_err();
        assert_eq!(errors.non_field_errors(), [RECRUITMENT_CLOSED]);
    }

    #[test]
    fn test_assignment_requires_administrator() {
        let mut person = NewPerson::new("admin", "A", "B").into_person(PersonId::new(3));
        let form = AssignmentForm {
            assigned_to: Some(PersonId::new(3)),
        };
        assert_eq!(
            form.clean(Some(&person)).unwrap_err().get("assigned_to"),
            [INVALID_CHOICE]
        );
        assert!(form.clean(None).is_err());

        person.groups.push("administrators".to_string());
        assert_eq!(form.clean(Some(&person)).unwrap(), Some(PersonId::new(3)));

        assert_eq!(AssignmentForm::default().clean(None).unwrap(), None);
    }

    #[test]
    fn test_change_state_actions() {
        let form = |action: Option<&str>| InstructorRecruitmentSignupChangeStateForm {
            action: action.map(str::to_string),
            next: None,
        };
        assert_eq!(form(Some("confirm")).clean().unwrap(), SignupAction::Confirm);
        assert_eq!(
            form(Some("decline")).clean().unwrap().target_state(),
            SignupState::Declined
        );
        assert_eq!(form(None).clean().unwrap_err().get("action"), [REQUIRED]);
        assert!(form(Some("approve")).clean().is_err());
    }
}
