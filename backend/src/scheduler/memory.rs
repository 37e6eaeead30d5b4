//! In-memory job queue.
//!
//! Jobs are only stored, never executed; whatever consumes the real queue is
//! out of scope for this service.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::{JobRequest, JobScheduler, ScheduledJob, SchedulerError, SchedulerResult};

/// In-memory scheduler.
#[derive(Clone)]
pub struct InMemoryScheduler {
    jobs: Arc<RwLock<HashMap<String, ScheduledJob>>>,
    available: Arc<AtomicBool>,
}

impl InMemoryScheduler {
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulate the queue going away (for testing).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Get a job by ID.
    pub fn get_job(&self, job_id: &str) -> Option<ScheduledJob> {
        self.jobs.read().get(job_id).cloned()
    }

    fn ensure_available(&self) -> SchedulerResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SchedulerError::Unavailable(
                "in-memory scheduler marked unavailable".to_string(),
            ))
        }
    }
}

impl Default for InMemoryScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobScheduler for InMemoryScheduler {
    async fn enqueue_in(
        &self,
        delay: Duration,
        request: JobRequest,
    ) -> SchedulerResult<ScheduledJob> {
        self.ensure_available()?;
        let now = chrono::Utc::now();
        let scheduled_for = chrono::Duration::from_std(delay)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .ok_or(SchedulerError::InvalidDelay(delay))?;
        let job = ScheduledJob {
            job_id: Uuid::new_v4().to_string(),
            request,
            enqueued_at: now,
            scheduled_for,
        };
        log::debug!(
            "Enqueued job {} for task {} at {}",
            job.job_id,
            job.request.task_id,
            job.scheduled_for
        );
        self.jobs.write().insert(job.job_id.clone(), job.clone());
        Ok(job)
    }

    async fn cancel(&self, job_id: &str) -> SchedulerResult<bool> {
        self.ensure_available()?;
        Ok(self.jobs.write().remove(job_id).is_some())
    }

    async fn count(&self) -> SchedulerResult<usize> {
        self.ensure_available()?;
        Ok(self.jobs.read().len())
    }

    async fn jobs(&self) -> SchedulerResult<Vec<ScheduledJob>> {
        self.ensure_available()?;
        let mut jobs: Vec<ScheduledJob> = self.jobs.read().values().cloned().collect();
        jobs.sort_by(|a, b| {
            a.scheduled_for
                .cmp(&b.scheduled_for)
                .then_with(|| a.job_id.cmp(&b.job_id))
        });
        Ok(jobs)
    }
}
