//! Repository trait for recruitment processes and signups.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::*;

#[async_trait]
pub trait RecruitmentRepository: Send + Sync {
    /// Insert a recruitment process.
    ///
    /// # Returns
    /// * `Err(RepositoryError::Conflict)` - If the event already has one
    async fn create_recruitment(
        &self,
        recruitment: &NewRecruitment,
    ) -> RepositoryResult<InstructorRecruitment>;

    async fn get_recruitment(
        &self,
        recruitment_id: RecruitmentId,
    ) -> RepositoryResult<InstructorRecruitment>;

    async fn recruitment_for_event(
        &self,
        event_id: EventId,
    ) -> RepositoryResult<Option<InstructorRecruitment>>;

    /// Persist `assigned_to`, `status` and `notes`; bumps `last_updated_at`.
    async fn update_recruitment(
        &self,
        recruitment: &InstructorRecruitment,
    ) -> RepositoryResult<InstructorRecruitment>;

    /// Recruitments matching the filter, ordered by id.
    async fn list_recruitments(
        &self,
        filter: &RecruitmentFilter,
    ) -> RepositoryResult<Vec<InstructorRecruitment>>;

    async fn create_signup(&self, signup: &NewSignup)
        -> RepositoryResult<InstructorRecruitmentSignup>;

    async fn get_signup(&self, signup_id: SignupId)
        -> RepositoryResult<InstructorRecruitmentSignup>;

    /// Persist `interest`, `user_notes`, `notes` and `state`; bumps `last_updated_at`.
    async fn update_signup(
        &self,
        signup: &InstructorRecruitmentSignup,
    ) -> RepositoryResult<InstructorRecruitmentSignup>;

    /// Signups of one recruitment, ordered by id.
    async fn list_signups(
        &self,
        recruitment_id: RecruitmentId,
    ) -> RepositoryResult<Vec<InstructorRecruitmentSignup>>;

    /// Distinct people holding a signup in any open recruitment, ordered by id.
    async fn persons_with_open_signups(&self) -> RepositoryResult<Vec<Person>>;
}
