//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using `BTreeMap`s keyed by id, providing fast, deterministic, and
//! isolated execution.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::api::*;
use crate::db::repository::*;
use crate::models::events::INSTRUCTOR_ROLE;

/// In-memory local repository.
///
/// # Example
/// ```
/// use amy_recruitment::api::NewPerson;
/// use amy_recruitment::db::repositories::LocalRepository;
/// use amy_recruitment::db::repository::DirectoryRepository;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let repo = LocalRepository::new();
///     let person = repo
///         .create_person(&NewPerson::new("hp", "Harry", "Potter"))
///         .await
///         .unwrap();
///     assert_eq!(repo.get_person(person.id).await.unwrap().username, "hp");
/// });
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    organizations: BTreeMap<OrganizationId, Organization>,
    persons: BTreeMap<PersonId, Person>,
    events: BTreeMap<EventId, Event>,
    tags: BTreeMap<TagId, Tag>,
    roles: BTreeMap<RoleId, Role>,
    workshop_requests: BTreeMap<WorkshopRequestId, WorkshopRequest>,
    recruitments: BTreeMap<RecruitmentId, InstructorRecruitment>,
    signups: BTreeMap<SignupId, InstructorRecruitmentSignup>,
    tasks: BTreeMap<TaskId, Task>,
    triggers: BTreeMap<TriggerId, EmailTrigger>,
    scheduled_jobs: BTreeMap<ScheduledJobRecordId, ScheduledJobRecord>,

    // Shared id counter; ids are unique across tables.
    next_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            organizations: BTreeMap::new(),
            persons: BTreeMap::new(),
            events: BTreeMap::new(),
            tags: BTreeMap::new(),
            roles: BTreeMap::new(),
            workshop_requests: BTreeMap::new(),
            recruitments: BTreeMap::new(),
            signups: BTreeMap::new(),
            tasks: BTreeMap::new(),
            triggers: BTreeMap::new(),
            scheduled_jobs: BTreeMap::new(),
            next_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalData {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn event(&self, event_id: EventId) -> RepositoryResult<&Event> {
        self.events
            .get(&event_id)
            .ok_or_else(|| RepositoryError::row_not_found("event", event_id))
    }

    fn instructor_role_ids(&self) -> BTreeSet<RoleId> {
        self.roles
            .values()
            .filter(|r| r.name == INSTRUCTOR_ROLE)
            .map(|r| r.id)
            .collect()
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Number of stored tasks.
    pub fn task_count(&self) -> usize {
        self.data.read().tasks.len()
    }

    /// Number of stored scheduled job records.
    pub fn scheduled_job_count(&self) -> usize {
        self.data.read().scheduled_jobs.len()
    }

    fn check_health(&self) -> RepositoryResult<()> {
        if self.data.read().is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection_with_context(
                "local repository marked unhealthy",
                ErrorContext::new("check_health"),
            ))
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectoryRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn create_organization(
        &self,
        domain: &str,
        fullname: &str,
    ) -> RepositoryResult<Organization> {
        self.check_health()?;
        let mut data = self.data.write();
        let id = OrganizationId(data.allocate_id());
        let org = Organization {
            id,
            domain: domain.to_string(),
            fullname: fullname.to_string(),
        };
        data.organizations.insert(id, org.clone());
        Ok(org)
    }

    async fn create_person(&self, person: &NewPerson) -> RepositoryResult<Person> {
        self.check_health()?;
        let mut data = self.data.write();
        if data.persons.values().any(|p| p.username == person.username) {
            return Err(RepositoryError::conflict_with_context(
                format!("username {} is taken", person.username),
                ErrorContext::new("create_person").with_entity("person"),
            ));
        }
        let id = PersonId(data.allocate_id());
        let stored = person.clone().into_person(id);
        data.persons.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_person(&self, person_id: PersonId) -> RepositoryResult<Person> {
        self.check_health()?;
        self.data
            .read()
            .persons
            .get(&person_id)
            .cloned()
            .ok_or_else(|| RepositoryError::row_not_found("person", person_id))
    }

    async fn update_person(&self, person: &Person) -> RepositoryResult<Person> {
        self.check_health()?;
        let mut data = self.data.write();
        match data.persons.get_mut(&person.id) {
            Some(stored) => {
                *stored = person.clone();
                Ok(stored.clone())
            }
            None => Err(RepositoryError::row_not_found("person", person.id)
                .with_operation("update_person")),
        }
    }

    async fn list_persons(&self, person_ids: &[PersonId]) -> RepositoryResult<Vec<Person>> {
        self.check_health()?;
        let data = self.data.read();
        let wanted: BTreeSet<PersonId> = person_ids.iter().copied().collect();
        Ok(wanted
            .into_iter()
            .filter_map(|id| data.persons.get(&id).cloned())
            .collect())
    }

    async fn create_event(&self, event: &NewEvent) -> RepositoryResult<Event> {
        self.check_health()?;
        let mut data = self.data.write();
        if data.events.values().any(|e| e.slug == event.slug) {
            return Err(RepositoryError::conflict_with_context(
                format!("event slug {} is taken", event.slug),
                ErrorContext::new("create_event").with_entity("event"),
            ));
        }
        let id = EventId(data.allocate_id());
        let stored = Event {
            id,
            slug: event.slug.clone(),
            host_id: event.host_id,
            administrator_id: event.administrator_id,
            start: event.start,
            end: event.end,
            tags: vec![],
        };
        data.events.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_event(&self, event_id: EventId) -> RepositoryResult<Event> {
        self.check_health()?;
        self.data.read().event(event_id).cloned()
    }

    async fn create_tag(&self, name: &str, priority: i32) -> RepositoryResult<Tag> {
        self.check_health()?;
        let mut data = self.data.write();
        if let Some(existing) = data.tags.values().find(|t| t.name == name) {
            return Ok(existing.clone());
        }
        let id = TagId(data.allocate_id());
        let tag = Tag {
            id,
            name: name.to_string(),
            priority,
        };
        data.tags.insert(id, tag.clone());
        Ok(tag)
    }

    async fn tag_event(&self, event_id: EventId, tag_name: &str) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        if !data.tags.values().any(|t| t.name == tag_name) {
            return Err(RepositoryError::row_not_found("tag", tag_name));
        }
        let event = data
            .events
            .get_mut(&event_id)
            .ok_or_else(|| RepositoryError::row_not_found("event", event_id))?;
        if !event.has_tag(tag_name) {
            event.tags.push(tag_name.to_string());
        }
        Ok(())
    }

    async fn create_role(&self, name: &str, verbose_name: &str) -> RepositoryResult<Role> {
        self.check_health()?;
        let mut data = self.data.write();
        if let Some(existing) = data.roles.values().find(|r| r.name == name) {
            return Ok(existing.clone());
        }
        let id = RoleId(data.allocate_id());
        let role = Role {
            id,
            name: name.to_string(),
            verbose_name: verbose_name.to_string(),
        };
        data.roles.insert(id, role.clone());
        Ok(role)
    }

    async fn get_role_by_name(&self, name: &str) -> RepositoryResult<Option<Role>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .roles
            .values()
            .find(|r| r.name == name)
            .cloned())
    }

    async fn create_workshop_request(
        &self,
        request: &NewWorkshopRequest,
    ) -> RepositoryResult<WorkshopRequest> {
        self.check_health()?;
        let mut data = self.data.write();
        let id = WorkshopRequestId(data.allocate_id());
        let stored = request.clone().into_request(id);
        data.workshop_requests.insert(id, stored.clone());
        Ok(stored)
    }

    async fn workshop_request_for_event(
        &self,
        event_id: EventId,
    ) -> RepositoryResult<Option<WorkshopRequest>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .workshop_requests
            .values()
            .find(|r| r.event_id == Some(event_id))
            .cloned())
    }
}

#[async_trait]
impl RecruitmentRepository for LocalRepository {
    async fn create_recruitment(
        &self,
        recruitment: &NewRecruitment,
    ) -> RepositoryResult<InstructorRecruitment> {
        self.check_health()?;
        let mut data = self.data.write();
        data.event(recruitment.event_id)?;
        if data
            .recruitments
            .values()
            .any(|r| r.event_id == recruitment.event_id)
        {
            return Err(RepositoryError::conflict_with_context(
                "recruitment process already exists for this event",
                ErrorContext::new("create_recruitment")
                    .with_entity("event")
                    .with_entity_id(recruitment.event_id),
            ));
        }
        let now = Utc::now();
        let id = RecruitmentId(data.allocate_id());
        let stored = InstructorRecruitment {
            id,
            event_id: recruitment.event_id,
            assigned_to: recruitment.assigned_to,
            status: recruitment.status,
            notes: recruitment.notes.clone(),
            created_at: now,
            last_updated_at: now,
        };
        data.recruitments.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_recruitment(
        &self,
        recruitment_id: RecruitmentId,
    ) -> RepositoryResult<InstructorRecruitment> {
        self.check_health()?;
        self.data
            .read()
            .recruitments
            .get(&recruitment_id)
            .cloned()
            .ok_or_else(|| RepositoryError::row_not_found("recruitment", recruitment_id))
    }

    async fn recruitment_for_event(
        &self,
        event_id: EventId,
    ) -> RepositoryResult<Option<InstructorRecruitment>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .recruitments
            .values()
            .find(|r| r.event_id == event_id)
            .cloned())
    }

    async fn update_recruitment(
        &self,
        recruitment: &InstructorRecruitment,
    ) -> RepositoryResult<InstructorRecruitment> {
        self.check_health()?;
        let mut data = self.data.write();
        let stored = data
            .recruitments
            .get_mut(&recruitment.id)
            .ok_or_else(|| RepositoryError::row_not_found("recruitment", recruitment.id))?;
        stored.assigned_to = recruitment.assigned_to;
        stored.status = recruitment.status;
        stored.notes = recruitment.notes.clone();
        stored.last_updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn list_recruitments(
        &self,
        filter: &RecruitmentFilter,
    ) -> RepositoryResult<Vec<InstructorRecruitment>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .recruitments
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn create_signup(
        &self,
        signup: &NewSignup,
    ) -> RepositoryResult<InstructorRecruitmentSignup> {
        self.check_health()?;
        let mut data = self.data.write();
        if !data.recruitments.contains_key(&signup.recruitment_id) {
            return Err(RepositoryError::row_not_found(
                "recruitment",
                signup.recruitment_id,
            ));
        }
        if !data.persons.contains_key(&signup.person_id) {
            return Err(RepositoryError::row_not_found("person", signup.person_id));
        }
        let now = Utc::now();
        let id = SignupId(data.allocate_id());
        let stored = InstructorRecruitmentSignup {
            id,
            recruitment_id: signup.recruitment_id,
            person_id: signup.person_id,
            interest: signup.interest,
            user_notes: signup.user_notes.clone(),
            notes: signup.notes.clone(),
            state: SignupState::Pending,
            created_at: now,
            last_updated_at: now,
        };
        data.signups.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_signup(
        &self,
        signup_id: SignupId,
    ) -> RepositoryResult<InstructorRecruitmentSignup> {
        self.check_health()?;
        self.data
            .read()
            .signups
            .get(&signup_id)
            .cloned()
            .ok_or_else(|| RepositoryError::row_not_found("signup", signup_id))
    }

    async fn update_signup(
        &self,
        signup: &InstructorRecruitmentSignup,
    ) -> RepositoryResult<InstructorRecruitmentSignup> {
        self.check_health()?;
        let mut data = self.data.write();
        let stored = data
            .signups
            .get_mut(&signup.id)
            .ok_or_else(|| RepositoryError::row_not_found("signup", signup.id))?;
        stored.interest = signup.interest;
        stored.user_notes = signup.user_notes.clone();
        stored.notes = signup.notes.clone();
        stored.state = signup.state;
        stored.last_updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn list_signups(
        &self,
        recruitment_id: RecruitmentId,
    ) -> RepositoryResult<Vec<InstructorRecruitmentSignup>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .signups
            .values()
            .filter(|s| s.recruitment_id == recruitment_id)
            .cloned()
            .collect())
    }

    async fn persons_with_open_signups(&self) -> RepositoryResult<Vec<Person>> {
        self.check_health()?;
        let data = self.data.read();
        let person_ids: BTreeSet<PersonId> = data
            .signups
            .values()
            .filter(|s| {
                data.recruitments
                    .get(&s.recruitment_id)
                    .is_some_and(|r| r.is_open())
            })
            .map(|s| s.person_id)
            .collect();
        Ok(person_ids
            .into_iter()
            .filter_map(|id| data.persons.get(&id).cloned())
            .collect())
    }
}

#[async_trait]
impl TaskRepository for LocalRepository {
    async fn get_or_create_task(
        &self,
        person_id: PersonId,
        event_id: EventId,
        role_id: RoleId,
    ) -> RepositoryResult<(Task, bool)> {
        self.check_health()?;
        let mut data = self.data.write();
        if let Some(existing) = data
            .tasks
            .values()
            .find(|t| t.person_id == person_id && t.event_id == event_id && t.role_id == role_id)
        {
            return Ok((existing.clone(), false));
        }
        data.event(event_id)?;
        if !data.persons.contains_key(&person_id) {
            return Err(RepositoryError::row_not_found("person", person_id));
        }
        if !data.roles.contains_key(&role_id) {
            return Err(RepositoryError::row_not_found("role", role_id));
        }
        let id = TaskId(data.allocate_id());
        let task = Task {
            id,
            event_id,
            person_id,
            role_id,
        };
        data.tasks.insert(id, task.clone());
        Ok((task, true))
    }

    async fn get_task(&self, task_id: TaskId) -> RepositoryResult<Task> {
        self.check_health()?;
        self.data
            .read()
            .tasks
            .get(&task_id)
            .cloned()
            .ok_or_else(|| RepositoryError::row_not_found("task", task_id))
    }

    async fn find_tasks(
        &self,
        person_id: PersonId,
        event_id: EventId,
        role_id: RoleId,
    ) -> RepositoryResult<Vec<Task>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .tasks
            .values()
            .filter(|t| t.person_id == person_id && t.event_id == event_id && t.role_id == role_id)
            .cloned()
            .collect())
    }

    async fn delete_task(&self, task_id: TaskId) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        if data.tasks.remove(&task_id).is_none() {
            return Err(
                RepositoryError::row_not_found("task", task_id).with_operation("delete_task"),
            );
        }
        data.scheduled_jobs.retain(|_, job| job.task_id != task_id);
        Ok(())
    }

    async fn instructor_tasks_overlapping(
        &self,
        person_id: PersonId,
        range: DateRange,
    ) -> RepositoryResult<Vec<TaskWithEvent>> {
        self.check_health()?;
        let data = self.data.read();
        let instructor_roles = data.instructor_role_ids();
        let mut found = Vec::new();
        for task in data.tasks.values() {
            if task.person_id != person_id || !instructor_roles.contains(&task.role_id) {
                continue;
            }
            let event = data.event(task.event_id)?;
            if event.date_range().is_some_and(|r| r.overlaps(&range)) {
                found.push(TaskWithEvent {
                    task: task.clone(),
                    event: event.clone(),
                });
            }
        }
        Ok(found)
    }

    async fn create_trigger(&self, trigger: &NewEmailTrigger) -> RepositoryResult<EmailTrigger> {
        self.check_health()?;
        let mut data = self.data.write();
        let id = TriggerId(data.allocate_id());
        let stored = EmailTrigger {
            id,
            action: trigger.action,
            template_slug: trigger.template_slug.clone(),
            active: trigger.active,
        };
        data.triggers.insert(id, stored.clone());
        Ok(stored)
    }

    async fn active_triggers(&self, action: TriggerAction) -> RepositoryResult<Vec<EmailTrigger>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .triggers
            .values()
            .filter(|t| t.active && t.action == action)
            .cloned()
            .collect())
    }

    async fn record_scheduled_job(
        &self,
        record: &NewScheduledJobRecord,
    ) -> RepositoryResult<ScheduledJobRecord> {
        self.check_health()?;
        let mut data = self.data.write();
        if !data.tasks.contains_key(&record.task_id) {
            return Err(RepositoryError::row_not_found("task", record.task_id));
        }
        let id = ScheduledJobRecordId(data.allocate_id());
        let stored = ScheduledJobRecord {
            id,
            job_id: record.job_id.clone(),
            trigger_id: record.trigger_id,
            task_id: record.task_id,
            scheduled_execution: record.scheduled_execution,
            created_at: Utc::now(),
        };
        data.scheduled_jobs.insert(id, stored.clone());
        Ok(stored)
    }

    async fn scheduled_jobs_for_task(
        &self,
        task_id: TaskId,
    ) -> RepositoryResult<Vec<ScheduledJobRecord>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .scheduled_jobs
            .values()
            .filter(|j| j.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn list_scheduled_jobs(&self) -> RepositoryResult<Vec<ScheduledJobRecord>> {
        self.check_health()?;
        Ok(self.data.read().scheduled_jobs.values().cloned().collect())
    }

    async fn delete_scheduled_job(
        &self,
        record_id: ScheduledJobRecordId,
    ) -> RepositoryResult<()> {
        self.check_health()?;
        self.data
            .write()
            .scheduled_jobs
            .remove(&record_id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::row_not_found("scheduled job", record_id))
    }
}
