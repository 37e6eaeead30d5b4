//! Repository trait for rows owned by the wider application.
//!
//! People, organizations, events, tags, roles and workshop requests are not
//! managed by the recruitment workflow, but it needs to read them and, for
//! fixtures and the profile form, write them.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::*;

#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the database connection is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Organizations ====================

    async fn create_organization(
        &self,
        domain: &str,
        fullname: &str,
    ) -> RepositoryResult<Organization>;

    // ==================== People ====================

    /// Insert a person. Usernames are unique.
    async fn create_person(&self, person: &NewPerson) -> RepositoryResult<Person>;

    /// Retrieve a person by ID.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the person doesn't exist
    async fn get_person(&self, person_id: PersonId) -> RepositoryResult<Person>;

    /// Overwrite all stored fields of an existing person.
    async fn update_person(&self, person: &Person) -> RepositoryResult<Person>;

    /// Fetch several people at once; unknown ids are skipped.
    async fn list_persons(&self, person_ids: &[PersonId]) -> RepositoryResult<Vec<Person>>;

    // ==================== Events ====================

    async fn create_event(&self, event: &NewEvent) -> RepositoryResult<Event>;

    /// Retrieve an event with its tag names.
    async fn get_event(&self, event_id: EventId) -> RepositoryResult<Event>;

    async fn create_tag(&self, name: &str, priority: i32) -> RepositoryResult<Tag>;

    /// Attach an existing tag (by name) to an event. Attaching twice is a no-op.
    async fn tag_event(&self, event_id: EventId, tag_name: &str) -> RepositoryResult<()>;

    // ==================== Roles ====================

    async fn create_role(&self, name: &str, verbose_name: &str) -> RepositoryResult<Role>;

    async fn get_role_by_name(&self, name: &str) -> RepositoryResult<Option<Role>>;

    // ==================== Workshop requests ====================

    async fn create_workshop_request(
        &self,
        request: &NewWorkshopRequest,
    ) -> RepositoryResult<WorkshopRequest>;

    /// The workshop request an event was created from, if any.
    async fn workshop_request_for_event(
        &self,
        event_id: EventId,
    ) -> RepositoryResult<Option<WorkshopRequest>>;
}
