use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use super::schema::{
    email_triggers, events, instructor_recruitment_signups, instructor_recruitments,
    organizations, persons, roles, scheduled_jobs, tags, tasks, workshop_requests,
};
use crate::api::*;
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};

/// Decode a short code column into its enum, reporting the offending row.
fn decode<T>(
    column: &str,
    code: &str,
    parse: fn(&str) -> Option<T>,
) -> RepositoryResult<T> {
    parse(code).ok_or_else(|| {
        RepositoryError::internal_with_context(
            format!("unknown code `{}` in column {}", code, column),
            ErrorContext::new("decode_row").with_details(column.to_string()),
        )
    })
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = organizations)]
pub struct OrganizationRow {
    pub id: i64,
    pub domain: String,
    pub fullname: String,
}

impl From<OrganizationRow> for Organization {
    fn from(row: OrganizationRow) -> Self {
        Organization {
            id: OrganizationId(row.id),
            domain: row.domain,
            fullname: row.fullname,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = organizations)]
pub struct NewOrganizationRow {
    pub domain: String,
    pub fullname: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = persons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PersonRow {
    pub id: i64,
    pub username: String,
    pub personal: String,
    pub middle: String,
    pub family: String,
    pub email: Option<String>,
    pub secondary_email: String,
    pub gender: String,
    pub gender_other: String,
    pub country: String,
    pub airport: Option<String>,
    pub github: Option<String>,
    pub twitter: Option<String>,
    pub url: String,
    pub affiliation: String,
    pub occupation: String,
    pub orcid: String,
    pub is_superuser: bool,
    pub groups: Vec<String>,
}

impl TryFrom<PersonRow> for Person {
    type Error = RepositoryError;

    fn try_from(row: PersonRow) -> RepositoryResult<Self> {
        Ok(Person {
            id: PersonId(row.id),
            username: row.username,
            personal: row.personal,
            middle: row.middle,
            family: row.family,
            email: row.email,
            secondary_email: row.secondary_email,
            gender: decode("persons.gender", &row.gender, Gender::from_code)?,
            gender_other: row.gender_other,
            country: row.country,
            airport: row.airport,
            github: row.github,
            twitter: row.twitter,
            url: row.url,
            affiliation: row.affiliation,
            occupation: row.occupation,
            orcid: row.orcid,
            is_superuser: row.is_superuser,
            groups: row.groups,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = persons)]
pub struct NewPersonRow {
    pub username: String,
    pub personal: String,
    pub middle: String,
    pub family: String,
    pub email: Option<String>,
    pub gender: String,
    pub gender_other: String,
    pub github: Option<String>,
    pub is_superuser: bool,
    pub groups: Vec<String>,
}

impl From<&NewPerson> for NewPersonRow {
    fn from(p: &NewPerson) -> Self {
        NewPersonRow {
            username: p.username.clone(),
            personal: p.personal.clone(),
            middle: p.middle.clone(),
            family: p.family.clone(),
            email: p.email.clone(),
            gender: p.gender.as_code().to_string(),
            gender_other: p.gender_other.clone(),
            github: p.github.clone(),
            is_superuser: p.is_superuser,
            groups: p.groups.clone(),
        }
    }
}

/// Every mutable person column, used for full-row updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = persons)]
#[diesel(treat_none_as_null = true)]
pub struct PersonChangeset {
    pub username: String,
    pub personal: String,
    pub middle: String,
    pub family: String,
    pub email: Option<String>,
    pub secondary_email: String,
    pub gender: String,
    pub gender_other: String,
    pub country: String,
    pub airport: Option<String>,
    pub github: Option<String>,
    pub twitter: Option<String>,
    pub url: String,
    pub affiliation: String,
    pub occupation: String,
    pub orcid: String,
    pub is_superuser: bool,
    pub groups: Vec<String>,
}

impl From<&Person> for PersonChangeset {
    fn from(p: &Person) -> Self {
        PersonChangeset {
            username: p.username.clone(),
            personal: p.personal.clone(),
            middle: p.middle.clone(),
            family: p.family.clone(),
            email: p.email.clone(),
            secondary_email: p.secondary_email.clone(),
            gender: p.gender.as_code().to_string(),
            gender_other: p.gender_other.clone(),
            country: p.country.clone(),
            airport: p.airport.clone(),
            github: p.github.clone(),
            twitter: p.twitter.clone(),
            url: p.url.clone(),
            affiliation: p.affiliation.clone(),
            occupation: p.occupation.clone(),
            orcid: p.orcid.clone(),
            is_superuser: p.is_superuser,
            groups: p.groups.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
pub struct EventRow {
    pub id: i64,
    pub slug: String,
    pub host_id: i64,
    pub administrator_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl EventRow {
    pub fn into_event(self, tags: Vec<String>) -> Event {
        Event {
            id: EventId(self.id),
            slug: self.slug,
            host_id: OrganizationId(self.host_id),
            administrator_id: self.administrator_id.map(OrganizationId),
            start: self.start_date,
            end: self.end_date,
            tags,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub struct NewEventRow {
    pub slug: String,
    pub host_id: i64,
    pub administrator_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<&NewEvent> for NewEventRow {
    fn from(e: &NewEvent) -> Self {
        NewEventRow {
            slug: e.slug.clone(),
            host_id: e.host_id.0,
            administrator_id: e.administrator_id.map(|id| id.0),
            start_date: e.start,
            end_date: e.end,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tags)]
pub struct TagRow {
    pub id: i64,
    pub name: String,
    pub priority: i32,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Tag {
            id: TagId(row.id),
            name: row.name,
            priority: row.priority,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = roles)]
pub struct RoleRow {
    pub id: i64,
    pub name: String,
    pub verbose_name: String,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Role {
            id: RoleId(row.id),
            name: row.name,
            verbose_name: row.verbose_name,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
pub struct TaskRow {
    pub id: i64,
    pub event_id: i64,
    pub person_id: i64,
    pub role_id: i64,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: TaskId(row.id),
            event_id: EventId(row.event_id),
            person_id: PersonId(row.person_id),
            role_id: RoleId(row.role_id),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = workshop_requests)]
pub struct WorkshopRequestRow {
    pub id: i64,
    pub event_id: Option<i64>,
    pub personal: String,
    pub family: String,
    pub email: String,
    pub institution_other_name: String,
    pub audience_description: String,
    pub user_notes: String,
}

impl From<WorkshopRequestRow> for WorkshopRequest {
    fn from(row: WorkshopRequestRow) -> Self {
        WorkshopRequest {
            id: WorkshopRequestId(row.id),
            event_id: row.event_id.map(EventId),
            personal: row.personal,
            family: row.family,
            email: row.email,
            institution_other_name: row.institution_other_name,
            audience_description: row.audience_description,
            user_notes: row.user_notes,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = workshop_requests)]
pub struct NewWorkshopRequestRow {
    pub event_id: Option<i64>,
    pub personal: String,
    pub family: String,
    pub email: String,
    pub institution_other_name: String,
    pub audience_description: String,
    pub user_notes: String,
}

impl From<&NewWorkshopRequest> for NewWorkshopRequestRow {
    fn from(r: &NewWorkshopRequest) -> Self {
        NewWorkshopRequestRow {
            event_id: r.event_id.map(|id| id.0),
            personal: r.personal.clone(),
            family: r.family.clone(),
            email: r.email.clone(),
            institution_other_name: r.institution_other_name.clone(),
            audience_description: r.audience_description.clone(),
            user_notes: r.user_notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = instructor_recruitments)]
pub struct RecruitmentRow {
    pub id: i64,
    pub event_id: i64,
    pub assigned_to: Option<i64>,
    pub status: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl TryFrom<RecruitmentRow> for InstructorRecruitment {
    type Error = RepositoryError;

    fn try_from(row: RecruitmentRow) -> RepositoryResult<Self> {
        Ok(InstructorRecruitment {
            id: RecruitmentId(row.id),
            event_id: EventId(row.event_id),
            assigned_to: row.assigned_to.map(PersonId),
            status: decode(
                "instructor_recruitments.status",
                &row.status,
                RecruitmentStatus::from_code,
            )?,
            notes: row.notes,
            created_at: row.created_at,
            last_updated_at: row.last_updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = instructor_recruitments)]
pub struct NewRecruitmentRow {
    pub event_id: i64,
    pub assigned_to: Option<i64>,
    pub status: String,
    pub notes: String,
}

impl From<&NewRecruitment> for NewRecruitmentRow {
    fn from(r: &NewRecruitment) -> Self {
        NewRecruitmentRow {
            event_id: r.event_id.0,
            assigned_to: r.assigned_to.map(|id| id.0),
            status: r.status.as_code().to_string(),
            notes: r.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = instructor_recruitments)]
#[diesel(treat_none_as_null = true)]
pub struct RecruitmentChangeset {
    pub assigned_to: Option<i64>,
    pub status: String,
    pub notes: String,
    pub last_updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = instructor_recruitment_signups)]
pub struct SignupRow {
    pub id: i64,
    pub recruitment_id: i64,
    pub person_id: i64,
    pub interest: String,
    pub user_notes: String,
    pub notes: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl TryFrom<SignupRow> for InstructorRecruitmentSignup {
    type Error = RepositoryError;

    fn try_from(row: SignupRow) -> RepositoryResult<Self> {
        Ok(InstructorRecruitmentSignup {
            id: SignupId(row.id),
            recruitment_id: RecruitmentId(row.recruitment_id),
            person_id: PersonId(row.person_id),
            interest: decode(
                "instructor_recruitment_signups.interest",
                &row.interest,
                SignupInterest::from_code,
            )?,
            user_notes: row.user_notes,
            notes: row.notes,
            state: decode(
                "instructor_recruitment_signups.state",
                &row.state,
                SignupState::from_code,
            )?,
            created_at: row.created_at,
            last_updated_at: row.last_updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = instructor_recruitment_signups)]
pub struct NewSignupRow {
    pub recruitment_id: i64,
    pub person_id: i64,
    pub interest: String,
    pub user_notes: String,
    pub notes: String,
    pub state: String,
}

impl From<&NewSignup> for NewSignupRow {
    fn from(s: &NewSignup) -> Self {
        NewSignupRow {
            recruitment_id: s.recruitment_id.0,
            person_id: s.person_id.0,
            interest: s.interest.as_code().to_string(),
            user_notes: s.user_notes.clone(),
            notes: s.notes.clone(),
            state: SignupState::Pending.as_code().to_string(),
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = instructor_recruitment_signups)]
pub struct SignupChangeset {
    pub interest: String,
    pub user_notes: String,
    pub notes: String,
    pub state: String,
    pub last_updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = email_triggers)]
pub struct EmailTriggerRow {
    pub id: i64,
    pub action: String,
    pub template_slug: String,
    pub active: bool,
}

impl TryFrom<EmailTriggerRow> for EmailTrigger {
    type Error = RepositoryError;

    fn try_from(row: EmailTriggerRow) -> RepositoryResult<Self> {
        Ok(EmailTrigger {
            id: TriggerId(row.id),
            action: decode("email_triggers.action", &row.action, TriggerAction::from_code)?,
            template_slug: row.template_slug,
            active: row.active,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = email_triggers)]
pub struct NewEmailTriggerRow {
    pub action: String,
    pub template_slug: String,
    pub active: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = scheduled_jobs)]
pub struct ScheduledJobRow {
    pub id: i64,
    pub job_id: String,
    pub trigger_id: i64,
    pub task_id: i64,
    pub scheduled_execution: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<ScheduledJobRow> for ScheduledJobRecord {
    fn from(row: ScheduledJobRow) -> Self {
        ScheduledJobRecord {
            id: ScheduledJobRecordId(row.id),
            job_id: row.job_id,
            trigger_id: TriggerId(row.trigger_id),
            task_id: TaskId(row.task_id),
            scheduled_execution: row.scheduled_execution,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = scheduled_jobs)]
pub struct NewScheduledJobRow {
    pub job_id: String,
    pub trigger_id: i64,
    pub task_id: i64,
    pub scheduled_execution: DateTime<Utc>,
}
