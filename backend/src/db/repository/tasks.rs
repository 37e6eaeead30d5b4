//! Repository trait for tasks and the automated-email bookkeeping hanging off them.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::*;

#[async_trait]
pub trait TaskRepository: Send + Sync {
    // ==================== Tasks ====================

    /// Return the task for `(person, event, role)`, creating it if missing.
    ///
    /// # Returns
    /// * `Ok((task, true))` - A new row was inserted
    /// * `Ok((task, false))` - The row already existed
    async fn get_or_create_task(
        &self,
        person_id: PersonId,
        event_id: EventId,
        role_id: RoleId,
    ) -> RepositoryResult<(Task, bool)>;

    async fn get_task(&self, task_id: TaskId) -> RepositoryResult<Task>;

    async fn find_tasks(
        &self,
        person_id: PersonId,
        event_id: EventId,
        role_id: RoleId,
    ) -> RepositoryResult<Vec<Task>>;

    /// Delete a task together with its scheduled job records.
    async fn delete_task(&self, task_id: TaskId) -> RepositoryResult<()>;

    /// Instructor tasks of a person on events overlapping `range`.
    ///
    /// Events without both a start and an end date never overlap.
    async fn instructor_tasks_overlapping(
        &self,
        person_id: PersonId,
        range: DateRange,
    ) -> RepositoryResult<Vec<TaskWithEvent>>;

    // ==================== Email triggers ====================

    async fn create_trigger(&self, trigger: &NewEmailTrigger) -> RepositoryResult<EmailTrigger>;

    async fn active_triggers(&self, action: TriggerAction) -> RepositoryResult<Vec<EmailTrigger>>;

    // ==================== Scheduled jobs ====================

    async fn record_scheduled_job(
        &self,
        record: &NewScheduledJobRecord,
    ) -> RepositoryResult<ScheduledJobRecord>;

    async fn scheduled_jobs_for_task(
        &self,
        task_id: TaskId,
    ) -> RepositoryResult<Vec<ScheduledJobRecord>>;

    async fn list_scheduled_jobs(&self) -> RepositoryResult<Vec<ScheduledJobRecord>>;

    async fn delete_scheduled_job(&self, record_id: ScheduledJobRecordId)
        -> RepositoryResult<()>;
}
