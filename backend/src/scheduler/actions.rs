//! Automated email actions.
//!
//! An action decides whether a change in the data deserves an email, and if so
//! enqueues a job for it and records the job against the task so removing the
//! task can cancel it.

use chrono::NaiveDate;
use log::{debug, info, warn};
use std::time::Duration;

use super::{JobRequest, JobScheduler, SchedulerResult};
use crate::api::{
    Event, NewScheduledJobRecord, Role, ScheduledJobRecord, Task, TaskId, TriggerAction,
};
use crate::config::AppSettings;
use crate::db::repository::FullRepository;
use crate::models::events::{AUTOMATED_EMAIL_TAG, INSTRUCTOR_ROLE};

/// Event tags that suppress automated emails.
pub const SUPPRESSING_TAGS: [&str; 3] = ["cancelled", "unresponsive", "stalled"];

/// Email sent to a person who was just confirmed as an event's instructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewInstructorAction {
    launch_at: Duration,
}

impl Default for NewInstructorAction {
    fn default() -> Self {
        Self::from_settings(&AppSettings::default())
    }
}

impl NewInstructorAction {
    pub fn new(launch_at: Duration) -> Self {
        Self { launch_at }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(settings.new_instructor_delay())
    }

    /// Delay between enqueueing and running the job.
    pub fn launch_at(&self) -> Duration {
        self.launch_at
    }

    /// Whether `task` qualifies for the email on `today`.
    ///
    /// The task must be an instructor task, the event tagged for automated
    /// email and not cancelled or stalled, and the event must not have
    /// started yet. An event without a start date qualifies.
    pub fn check(task: &Task, role: &Role, event: &Event, today: NaiveDate) -> bool {
        task.role_id == role.id
            && task.event_id == event.id
            && role.name == INSTRUCTOR_ROLE
            && event.has_tag(AUTOMATED_EMAIL_TAG)
            && !SUPPRESSING_TAGS.iter().any(|tag| event.has_tag(tag))
            && event.start.map_or(true, |start| start >= today)
    }

    /// Enqueue one email per active trigger for `task` and record each job.
    ///
    /// Returns no records when no trigger is active for the action. The caller
    /// is expected to have run [`check`](Self::check).
    pub async fn schedule<R, S>(
        &self,
        repo: &R,
        scheduler: &S,
        task: &Task,
    ) -> SchedulerResult<Vec<ScheduledJobRecord>>
    where
        R: FullRepository + ?Sized,
        S: JobScheduler + ?Sized,
    {
        let triggers = repo.active_triggers(TriggerAction::NewInstructor).await?;
        if triggers.is_empty() {
            info!(
                "No active '{}' trigger; not scheduling email for task {}",
                TriggerAction::NewInstructor,
                task.id
            );
        }

        let mut records = Vec::with_capacity(triggers.len());
        for trigger in triggers {
            let job = scheduler
                .enqueue_in(
                    self.launch_at,
                    JobRequest {
                        action: trigger.action,
                        trigger_id: trigger.id,
                        task_id: task.id,
                        template_slug: trigger.template_slug.clone(),
                    },
                )
                .await?;

            let record = repo
                .record_scheduled_job(&NewScheduledJobRecord {
                    job_id: job.job_id.clone(),
                    trigger_id: trigger.id,
                    task_id: task.id,
                    scheduled_execution: job.scheduled_for,
                })
                .await?;
            info!(
                "Scheduled job {} ({}) for task {}",
                record.job_id, trigger.template_slug, task.id
            );
            records.push(record);
        }
        Ok(records)
    }
}

/// Cancel every job recorded against a task and drop the records.
///
/// Returns the number of records removed. Jobs the queue no longer knows
/// about are still unrecorded.
pub async fn cancel_task_jobs<R, S>(
    repo: &R,
    scheduler: &S,
    task_id: TaskId,
) -> SchedulerResult<usize>
where
    R: FullRepository + ?Sized,
    S: JobScheduler + ?Sized,
{
    let records = repo.scheduled_jobs_for_task(task_id).await?;
    for record in &records {
        if !scheduler.cancel(&record.job_id).await? {
            warn!("Job {} was already gone from the queue", record.job_id);
        }
        repo.delete_scheduled_job(record.id).await?;
        debug!("Cancelled job {} for task {}", record.job_id, task_id);
    }
    Ok(records.len())
}
