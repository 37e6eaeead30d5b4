//! Deferred jobs on the external queue.
//!
//! The queue itself lives outside this service. [`JobScheduler`] is the seam
//! the recruitment workflow enqueues and cancels through; [`InMemoryScheduler`]
//! implements it for development and tests.
//!
//! # Module Organization
//!
//! - [`memory`]: in-process scheduler
//! - [`actions`]: automated email actions deciding when to enqueue

pub mod actions;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::api::{TaskId, TriggerAction, TriggerId};
use crate::db::repository::RepositoryError;

pub use actions::{cancel_task_jobs, NewInstructorAction};
pub use memory::InMemoryScheduler;

/// Identifier the queue assigns to an enqueued job.
pub type JobId = String;

/// Error type for job queue operations
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The queue could not be reached.
    #[error("Job queue unavailable: {0}")]
    Unavailable(String),

    /// The delay does not fit in a timestamp.
    #[error("Job delay out of range: {0:?}")]
    InvalidDelay(Duration),

    /// Bookkeeping of a job in the repository failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// What an enqueued job should do when it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    pub action: TriggerAction,
    pub trigger_id: TriggerId,
    pub task_id: TaskId,
    pub template_slug: String,
}

/// A job waiting in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub job_id: JobId,
    pub request: JobRequest,
    pub enqueued_at: DateTime<Utc>,
    pub scheduled_for: DateTime<Utc>,
}

/// A delayed job queue.
#[async_trait]
pub trait JobScheduler: Send + Sync {
    /// Enqueue `request` to run after `delay`.
    async fn enqueue_in(&self, delay: Duration, request: JobRequest)
        -> SchedulerResult<ScheduledJob>;

    /// Remove a job. Returns `false` when the queue did not know it.
    async fn cancel(&self, job_id: &str) -> SchedulerResult<bool>;

    /// Number of jobs waiting.
    async fn count(&self) -> SchedulerResult<usize>;

    /// Waiting jobs, earliest first.
    async fn jobs(&self) -> SchedulerResult<Vec<ScheduledJob>>;
}
