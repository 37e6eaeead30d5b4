//! Data Transfer Objects for the HTTP API.
//!
//! Service results already derive Serialize and are returned as-is; the types
//! here cover request shapes that do not map onto a form directly.

use serde::{Deserialize, Serialize};

use crate::api::{
    InstructorRecruitment, PersonId, RecruitmentFilter, RecruitmentStatus, SignupInterest,
};
use crate::forms::SignupForRecruitmentForm;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Query parameters of the recruitment list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecruitmentListQuery {
    pub assigned_to: Option<PersonId>,
    pub status: Option<RecruitmentStatus>,
}

impl From<RecruitmentListQuery> for RecruitmentFilter {
    fn from(query: RecruitmentListQuery) -> Self {
        RecruitmentFilter {
            assigned_to: query.assigned_to,
            status: query.status,
        }
    }
}

/// Response after opening a recruitment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecruitmentResponse {
    pub recruitment: InstructorRecruitment,
    /// Details page of the new recruitment.
    pub redirect_to: String,
}

/// A person signing up for a recruitment.
///
/// The service has no session, so the person is named in the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub person_id: PersonId,
    #[serde(default)]
    pub interest: SignupInterest,
    #[serde(default)]
    pub user_notes: String,
}

impl SignupRequest {
    pub fn form(&self) -> SignupForRecruitmentForm {
        SignupForRecruitmentForm {
            interest: self.interest,
            user_notes: self.user_notes.clone(),
        }
    }
}
