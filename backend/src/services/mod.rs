//! Service layer for business logic and orchestration.
//!
//! Services sit between the HTTP handlers and the repository. Each operation
//! looks up the rows it needs, runs the matching form, mutates, and returns
//! plain data; nothing here knows about HTTP.

pub mod people;
pub mod recruitment;
pub mod redirect;

use crate::db::repository::RepositoryError;
use crate::forms::FormErrors;
use crate::scheduler::SchedulerError;

pub use people::{create_person, profile_form, update_profile};
pub use recruitment::{
    add_instructor_task, assign_recruitment, change_signup_state, create_recruitment,
    list_recruitments, list_scheduled_jobs, new_recruitment_context, recruitment_details,
    remove_instructor_task, signup_for_recruitment, task_jobs, ChangeStateOutcome,
    NewRecruitmentContext, RecruitmentDetails, RecruitmentList, RecruitmentSummary,
    SignupDetails,
};
pub use redirect::{is_safe_redirect, success_redirect};

/// Error type for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// Submitted data failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] FormErrors),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        match self {
            ServiceError::Repository(e) => e.is_not_found(),
            ServiceError::Scheduler(SchedulerError::Repository(e)) => e.is_not_found(),
            _ => false,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
