//! Events, roles, tags and tasks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::{EventId, OrganizationId, PersonId, RoleId, TagId, TaskId, WorkshopRequestId};
use crate::models::dates::DateRange;

/// Role name held by instructors.
pub const INSTRUCTOR_ROLE: &str = "instructor";

/// Tag gating the new-instructor notification.
pub const AUTOMATED_EMAIL_TAG: &str = "automated-email";

/// A workshop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub slug: String,
    pub host_id: OrganizationId,
    #[serde(default)]
    pub administrator_id: Option<OrganizationId>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    /// Tag names attached to the event.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Event {
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t == name)
    }

    /// The event's date range when both ends are known.
    pub fn date_range(&self) -> Option<DateRange> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => None,
        }
    }
}

/// Data for inserting an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub slug: String,
    pub host_id: OrganizationId,
    #[serde(default)]
    pub administrator_id: Option<OrganizationId>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl NewEvent {
    pub fn new(slug: impl Into<String>, host_id: OrganizationId) -> Self {
        Self {
            slug: slug.into(),
            host_id,
            administrator_id: None,
            start: None,
            end: None,
        }
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_administrator(mut self, administrator_id: OrganizationId) -> Self {
        self.administrator_id = Some(administrator_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub verbose_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub priority: i32,
}

/// A person holding a role on an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub event_id: EventId,
    pub person_id: PersonId,
    pub role_id: RoleId,
}

/// An instructor task together with the event it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskWithEvent {
    pub task: Task,
    pub event: Event,
}

/// Request for a workshop, used to pre-fill recruitment notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkshopRequest {
    pub id: WorkshopRequestId,
    #[serde(default)]
    pub event_id: Option<EventId>,
    pub personal: String,
    pub family: String,
    pub email: String,
    #[serde(default)]
    pub institution_other_name: String,
    #[serde(default)]
    pub audience_description: String,
    #[serde(default)]
    pub user_notes: String,
}

/// Data for inserting a workshop request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorkshopRequest {
    #[serde(default)]
    pub event_id: Option<EventId>,
    pub personal: String,
    pub family: String,
    pub email: String,
    #[serde(default)]
    pub institution_other_name: String,
    #[serde(default)]
    pub audience_description: String,
    #[serde(default)]
    pub user_notes: String,
}

impl NewWorkshopRequest {
    pub fn into_request(self, id: WorkshopRequestId) -> WorkshopRequest {
        WorkshopRequest {
            id,
            event_id: self.event_id,
            personal: self.personal,
            family: self.family,
            email: self.email,
            institution_other_name: self.institution_other_name,
            audience_description: self.audience_description,
            user_notes: self.user_notes,
        }
    }
}
