//! Records tying automated emails to the job queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ScheduledJobRecordId, TaskId, TriggerId};

crate::define_code_enum!(
    /// Application events that may trigger an automated email.
    TriggerAction {
        NewInstructor => "new-instructor",
    }
);

/// Binds a trigger action to an email template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTrigger {
    pub id: TriggerId,
    pub action: TriggerAction,
    pub template_slug: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmailTrigger {
    pub action: TriggerAction,
    pub template_slug: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// A job enqueued on the external queue, recorded so it can be cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJobRecord {
    pub id: ScheduledJobRecordId,
    /// Identifier returned by the job queue.
    pub job_id: String,
    pub trigger_id: TriggerId,
    pub task_id: TaskId,
    pub scheduled_execution: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScheduledJobRecord {
    pub job_id: String,
    pub trigger_id: TriggerId,
    pub task_id: TaskId,
    pub scheduled_execution: DateTime<Utc>,
}
