//! Instructor recruitment processes and signups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{EventId, PersonId, RecruitmentId, SignupId};

crate::define_code_enum!(
    /// Whether a recruitment process still accepts signups.
    RecruitmentStatus {
        Open => "o",
        Closed => "c",
    }
);

crate::define_code_enum!(
    /// Approval state of a signup.
    SignupState {
        Pending => "p",
        Confirmed => "a",
        Declined => "d",
    }
);

crate::define_code_enum!(
    /// What the person wants to teach.
    SignupInterest {
        Session => "session",
        Full => "full",
    }
);

impl Default for RecruitmentStatus {
    fn default() -> Self {
        RecruitmentStatus::Open
    }
}

impl Default for SignupState {
    fn default() -> Self {
        SignupState::Pending
    }
}

impl Default for SignupInterest {
    fn default() -> Self {
        SignupInterest::Session
    }
}

/// Search for instructors for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorRecruitment {
    pub id: RecruitmentId,
    pub event_id: EventId,
    pub assigned_to: Option<PersonId>,
    pub status: RecruitmentStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl InstructorRecruitment {
    pub fn is_open(&self) -> bool {
        self.status == RecruitmentStatus::Open
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecruitment {
    pub event_id: EventId,
    #[serde(default)]
    pub assigned_to: Option<PersonId>,
    #[serde(default)]
    pub status: RecruitmentStatus,
    #[serde(default)]
    pub notes: String,
}

impl NewRecruitment {
    pub fn new(event_id: EventId) -> Self {
        Self {
            event_id,
            assigned_to: None,
            status: RecruitmentStatus::Open,
            notes: String::new(),
        }
    }
}

/// A person's interest in teaching at a recruitment's event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorRecruitmentSignup {
    pub id: SignupId,
    pub recruitment_id: RecruitmentId,
    pub person_id: PersonId,
    pub interest: SignupInterest,
    pub user_notes: String,
    pub notes: String,
    pub state: SignupState,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSignup {
    pub recruitment_id: RecruitmentId,
    pub person_id: PersonId,
    #[serde(default)]
    pub interest: SignupInterest,
    #[serde(default)]
    pub user_notes: String,
    #[serde(default)]
    pub notes: String,
}

impl NewSignup {
    pub fn new(recruitment_id: RecruitmentId, person_id: PersonId) -> Self {
        Self {
            recruitment_id,
            person_id,
            interest: SignupInterest::Session,
            user_notes: String::new(),
            notes: String::new(),
        }
    }
}

/// Filter for listing recruitment processes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruitmentFilter {
    #[serde(default)]
    pub assigned_to: Option<PersonId>,
    #[serde(default)]
    pub status: Option<RecruitmentStatus>,
}

impl RecruitmentFilter {
    pub fn matches(&self, recruitment: &InstructorRecruitment) -> bool {
        self.assigned_to
            .map_or(true, |p| recruitment.assigned_to == Some(p))
            && self.status.map_or(true, |s| recruitment.status == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_stored_values() {
        assert_eq!(SignupState::Confirmed.as_code(), "a");
        assert_eq!(SignupState::Declined.as_code(), "d");
        assert_eq!(RecruitmentStatus::default().as_code(), "o");
        assert_eq!(
            serde_json::from_str::<SignupInterest>("\"full\"").unwrap(),
            SignupInterest::Full
        );
    }

    #[test]
    fn test_filter_matches() {
        let now = Utc::now();
        let recruitment = InstructorRecruitment {
            id: RecruitmentId::new(1),
            event_id: EventId::new(1),
            assigned_to: Some(PersonId::new(7)),
            status: RecruitmentStatus::Open,
            notes: String::new(),
            created_at: now,
            last_updated_at: now,
        };

        assert!(RecruitmentFilter::default().matches(&recruitment));
        assert!(RecruitmentFilter {
            assigned_to: Some(PersonId::new(7)),
            status: Some(RecruitmentStatus::Open),
        }
        .matches(&recruitment));
        assert!(!RecruitmentFilter {
            assigned_to: Some(PersonId::new(8)),
            status: None,
        }
        .matches(&recruitment));
        assert!(!RecruitmentFilter {
            assigned_to: None,
            status: Some(RecruitmentStatus::Closed),
        }
        .matches(&recruitment));
    }
}
