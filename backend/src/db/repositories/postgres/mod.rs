//! Postgres repository implementation using Diesel.
//!
//! This module implements the repository traits against a Postgres database
//! using the schema created by the embedded migrations.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::api::*;
use crate::db::repository::{
    DirectoryRepository, ErrorContext, RecruitmentRepository, RepositoryError, RepositoryResult,
    TaskRepository,
};
use crate::models::events::INSTRUCTOR_ROLE;

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// See the module docs for the variables read and their defaults.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool, config })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// This method will retry the operation up to `max_retries` times if a
    /// retryable error occurs (connection errors, timeouts, serialization failures).
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    log::warn!("Retrying database operation (attempt {})", attempt + 1);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2; // Exponential backoff
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

fn event_tag_names(conn: &mut PgConnection, event_id: i64) -> RepositoryResult<Vec<String>> {
    event_tags::table
        .inner_join(tags::table)
        .filter(event_tags::event_id.eq(event_id))
        .order(tags::priority.desc())
        .select(tags::name)
        .load::<String>(conn)
        .map_err(map_diesel_error)
}

fn load_event(conn: &mut PgConnection, event_id: EventId) -> RepositoryResult<Event> {
    let row = events::table
        .find(event_id.0)
        .select(EventRow::as_select())
        .first::<EventRow>(conn)
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| RepositoryError::row_not_found("event", event_id))?;
    let tags = event_tag_names(conn, row.id)?;
    Ok(row.into_event(tags))
}

fn load_person(conn: &mut PgConnection, person_id: PersonId) -> RepositoryResult<Person> {
    persons::table
        .find(person_id.0)
        .select(PersonRow::as_select())
        .first::<PersonRow>(conn)
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| RepositoryError::row_not_found("person", person_id))?
        .try_into()
}

fn load_persons(conn: &mut PgConnection, ids: Vec<i64>) -> RepositoryResult<Vec<Person>> {
    persons::table
        .filter(persons::id.eq_any(ids))
        .order(persons::id.asc())
        .select(PersonRow::as_select())
        .load::<PersonRow>(conn)
        .map_err(map_diesel_error)?
        .into_iter()
        .map(Person::try_from)
        .collect()
}

#[async_trait]
impl DirectoryRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_organization(
        &self,
        domain: &str,
        fullname: &str,
    ) -> RepositoryResult<Organization> {
        let row = NewOrganizationRow {
            domain: domain.to_string(),
            fullname: fullname.to_string(),
        };
        self.with_conn(move |conn| {
            diesel::insert_into(organizations::table)
                .values(&row)
                .returning(OrganizationRow::as_returning())
                .get_result::<OrganizationRow>(conn)
                .map(Organization::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_person(&self, person: &NewPerson) -> RepositoryResult<Person> {
        let row = NewPersonRow::from(person);
        self.with_conn(move |conn| {
            diesel::insert_into(persons::table)
                .values(&row)
                .returning(PersonRow::as_returning())
                .get_result::<PersonRow>(conn)
                .map_err(|e| map_diesel_error(e).with_operation("create_person"))?
                .try_into()
        })
        .await
    }

    async fn get_person(&self, person_id: PersonId) -> RepositoryResult<Person> {
        self.with_conn(move |conn| load_person(conn, person_id)).await
    }

    async fn update_person(&self, person: &Person) -> RepositoryResult<Person> {
        let person_id = person.id;
        let changes = PersonChangeset::from(person);
        self.with_conn(move |conn| {
            diesel::update(persons::table.find(person_id.0))
                .set(&changes)
                .returning(PersonRow::as_returning())
                .get_result::<PersonRow>(conn)
                .optional()
                .map_err(|e| map_diesel_error(e).with_operation("update_person"))?
                .ok_or_else(|| RepositoryError::row_not_found("person", person_id))?
                .try_into()
        })
        .await
    }

    async fn list_persons(&self, person_ids: &[PersonId]) -> RepositoryResult<Vec<Person>> {
        let ids: Vec<i64> = person_ids.iter().map(|id| id.0).collect();
        self.with_conn(move |conn| load_persons(conn, ids)).await
    }

    async fn create_event(&self, event: &NewEvent) -> RepositoryResult<Event> {
        let row = NewEventRow::from(event);
        self.with_conn(move |conn| {
            diesel::insert_into(events::table)
                .values(&row)
                .returning(EventRow::as_returning())
                .get_result::<EventRow>(conn)
                .map(|r| r.into_event(vec![]))
                .map_err(|e| map_diesel_error(e).with_operation("create_event"))
        })
        .await
    }

    async fn get_event(&self, event_id: EventId) -> RepositoryResult<Event> {
        self.with_conn(move |conn| load_event(conn, event_id)).await
    }

    async fn create_tag(&self, name: &str, priority: i32) -> RepositoryResult<Tag> {
        let name = name.to_string();
        self.with_conn(move |conn| {
            diesel::insert_into(tags::table)
                .values((tags::name.eq(&name), tags::priority.eq(priority)))
                .on_conflict(tags::name)
                .do_nothing()
                .execute(conn)
                .map_err(map_diesel_error)?;
            tags::table
                .filter(tags::name.eq(&name))
                .select(TagRow::as_select())
                .first::<TagRow>(conn)
                .map(Tag::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn tag_event(&self, event_id: EventId, tag_name: &str) -> RepositoryResult<()> {
        let tag_name = tag_name.to_string();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let tag_id = tags::table
                    .filter(tags::name.eq(&tag_name))
                    .select(tags::id)
                    .first::<i64>(tx)
                    .optional()
                    .map_err(map_diesel_error)?
                    .ok_or_else(|| RepositoryError::row_not_found("tag", &tag_name))?;
                let event_exists = diesel::select(exists(events::table.find(event_id.0)))
                    .get_result::<bool>(tx)
                    .map_err(map_diesel_error)?;
                if !event_exists {
                    return Err(RepositoryError::row_not_found("event", event_id));
                }
                diesel::insert_into(event_tags::table)
                    .values((
                        event_tags::event_id.eq(event_id.0),
                        event_tags::tag_id.eq(tag_id),
                    ))
                    .on_conflict_do_nothing()
                    .execute(tx)
                    .map_err(map_diesel_error)?;
                Ok(())
            })
        })
        .await
    }

    async fn create_role(&self, name: &str, verbose_name: &str) -> RepositoryResult<Role> {
        let name = name.to_string();
        let verbose_name = verbose_name.to_string();
        self.with_conn(move |conn| {
            diesel::insert_into(roles::table)
                .values((roles::name.eq(&name), roles::verbose_name.eq(&verbose_name)))
                .on_conflict(roles::name)
                .do_nothing()
                .execute(conn)
                .map_err(map_diesel_error)?;
            roles::table
                .filter(roles::name.eq(&name))
                .select(RoleRow::as_select())
                .first::<RoleRow>(conn)
                .map(Role::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_role_by_name(&self, name: &str) -> RepositoryResult<Option<Role>> {
        let name = name.to_string();
        self.with_conn(move |conn| {
            roles::table
                .filter(roles::name.eq(&name))
                .select(RoleRow::as_select())
                .first::<RoleRow>(conn)
                .optional()
                .map(|row| row.map(Role::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_workshop_request(
        &self,
        request: &NewWorkshopRequest,
    ) -> RepositoryResult<WorkshopRequest> {
        let row = NewWorkshopRequestRow::from(request);
        self.with_conn(move |conn| {
            diesel::insert_into(workshop_requests::table)
                .values(&row)
                .returning(WorkshopRequestRow::as_returning())
                .get_result::<WorkshopRequestRow>(conn)
                .map(WorkshopRequest::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn workshop_request_for_event(
        &self,
        event_id: EventId,
    ) -> RepositoryResult<Option<WorkshopRequest>> {
        self.with_conn(move |conn| {
            workshop_requests::table
                .filter(workshop_requests::event_id.eq(event_id.0))
                .order(workshop_requests::id.asc())
                .select(WorkshopRequestRow::as_select())
                .first::<WorkshopRequestRow>(conn)
                .optional()
                .map(|row| row.map(WorkshopRequest::from))
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl RecruitmentRepository for PostgresRepository {
    async fn create_recruitment(
        &self,
        recruitment: &NewRecruitment,
    ) -> RepositoryResult<InstructorRecruitment> {
        let row = NewRecruitmentRow::from(recruitment);
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                load_event(tx, EventId(row.event_id))?;
                let taken = diesel::select(exists(
                    instructor_recruitments::table
                        .filter(instructor_recruitments::event_id.eq(row.event_id)),
                ))
                .get_result::<bool>(tx)
                .map_err(map_diesel_error)?;
                if taken {
                    return Err(RepositoryError::conflict_with_context(
                        "recruitment process already exists for this event",
                        ErrorContext::new("create_recruitment")
                            .with_entity("event")
                            .with_entity_id(row.event_id),
                    ));
                }
                diesel::insert_into(instructor_recruitments::table)
                    .values(&row)
                    .returning(RecruitmentRow::as_returning())
                    .get_result::<RecruitmentRow>(tx)
                    .map_err(map_diesel_error)?
                    .try_into()
            })
        })
        .await
    }

    async fn get_recruitment(
        &self,
        recruitment_id: RecruitmentId,
    ) -> RepositoryResult<InstructorRecruitment> {
        self.with_conn(move |conn| {
            instructor_recruitments::table
                .find(recruitment_id.0)
                .select(RecruitmentRow::as_select())
                .first::<RecruitmentRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| RepositoryError::row_not_found("recruitment", recruitment_id))?
                .try_into()
        })
        .await
    }

    async fn recruitment_for_event(
        &self,
        event_id: EventId,
    ) -> RepositoryResult<Option<InstructorRecruitment>> {
        self.with_conn(move |conn| {
            instructor_recruitments::table
                .filter(instructor_recruitments::event_id.eq(event_id.0))
                .select(RecruitmentRow::as_select())
                .first::<RecruitmentRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(InstructorRecruitment::try_from)
                .transpose()
        })
        .await
    }

    async fn update_recruitment(
        &self,
        recruitment: &InstructorRecruitment,
    ) -> RepositoryResult<InstructorRecruitment> {
        let recruitment_id = recruitment.id;
        let changes = RecruitmentChangeset {
            assigned_to: recruitment.assigned_to.map(|id| id.0),
            status: recruitment.status.as_code().to_string(),
            notes: recruitment.notes.clone(),
            last_updated_at: Utc::now(),
        };
        self.with_conn(move |conn| {
            diesel::update(instructor_recruitments::table.find(recruitment_id.0))
                .set(&changes)
                .returning(RecruitmentRow::as_returning())
                .get_result::<RecruitmentRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| RepositoryError::row_not_found("recruitment", recruitment_id))?
                .try_into()
        })
        .await
    }

    async fn list_recruitments(
        &self,
        filter: &RecruitmentFilter,
    ) -> RepositoryResult<Vec<InstructorRecruitment>> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut query = instructor_recruitments::table
                .select(RecruitmentRow::as_select())
                .order(instructor_recruitments::id.asc())
                .into_boxed();
            if let Some(assignee) = filter.assigned_to {
                query = query.filter(instructor_recruitments::assigned_to.eq(assignee.0));
            }
            if let Some(status) = filter.status {
                query = query.filter(instructor_recruitments::status.eq(status.as_code()));
            }
            query
                .load::<RecruitmentRow>(conn)
                .map_err(map_diesel_error)?
                .into_iter()
                .map(InstructorRecruitment::try_from)
                .collect()
        })
        .await
    }

    async fn create_signup(
        &self,
        signup: &NewSignup,
    ) -> RepositoryResult<InstructorRecruitmentSignup> {
        let row = NewSignupRow::from(signup);
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let recruitment_exists = diesel::select(exists(
                    instructor_recruitments::table.find(row.recruitment_id),
                ))
                .get_result::<bool>(tx)
                .map_err(map_diesel_error)?;
                if !recruitment_exists {
                    return Err(RepositoryError::row_not_found(
                        "recruitment",
                        row.recruitment_id,
                    ));
                }
                load_person(tx, PersonId(row.person_id))?;
                diesel::insert_into(instructor_recruitment_signups::table)
                    .values(&row)
                    .returning(SignupRow::as_returning())
                    .get_result::<SignupRow>(tx)
                    .map_err(map_diesel_error)?
                    .try_into()
            })
        })
        .await
    }

    async fn get_signup(
        &self,
        signup_id: SignupId,
    ) -> RepositoryResult<InstructorRecruitmentSignup> {
        self.with_conn(move |conn| {
            instructor_recruitment_signups::table
                .find(signup_id.0)
                .select(SignupRow::as_select())
                .first::<SignupRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| RepositoryError::row_not_found("signup", signup_id))?
                .try_into()
        })
        .await
    }

    async fn update_signup(
        &self,
        signup: &InstructorRecruitmentSignup,
    ) -> RepositoryResult<InstructorRecruitmentSignup> {
        let signup_id = signup.id;
        let changes = SignupChangeset {
            interest: signup.interest.as_code().to_string(),
            user_notes: signup.user_notes.clone(),
            notes: signup.notes.clone(),
            state: signup.state.as_code().to_string(),
            last_updated_at: Utc::now(),
        };
        self.with_conn(move |conn| {
            diesel::update(instructor_recruitment_signups::table.find(signup_id.0))
                .set(&changes)
                .returning(SignupRow::as_returning())
                .get_result::<SignupRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| RepositoryError::row_not_found("signup", signup_id))?
                .try_into()
        })
        .await
    }

    async fn list_signups(
        &self,
        recruitment_id: RecruitmentId,
    ) -> RepositoryResult<Vec<InstructorRecruitmentSignup>> {
        self.with_conn(move |conn| {
            instructor_recruitment_signups::table
                .filter(instructor_recruitment_signups::recruitment_id.eq(recruitment_id.0))
                .order(instructor_recruitment_signups::id.asc())
                .select(SignupRow::as_select())
                .load::<SignupRow>(conn)
                .map_err(map_diesel_error)?
                .into_iter()
                .map(InstructorRecruitmentSignup::try_from)
                .collect()
        })
        .await
    }

    async fn persons_with_open_signups(&self) -> RepositoryResult<Vec<Person>> {
        self.with_conn(|conn| {
            let ids = instructor_recruitment_signups::table
                .inner_join(instructor_recruitments::table)
                .filter(instructor_recruitments::status.eq(RecruitmentStatus::Open.as_code()))
                .select(instructor_recruitment_signups::person_id)
                .distinct()
                .load::<i64>(conn)
                .map_err(map_diesel_error)?;
            load_persons(conn, ids)
        })
        .await
    }
}

#[async_trait]
impl TaskRepository for PostgresRepository {
    async fn get_or_create_task(
        &self,
        person_id: PersonId,
        event_id: EventId,
        role_id: RoleId,
    ) -> RepositoryResult<(Task, bool)> {
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let existing = tasks::table
                    .filter(tasks::person_id.eq(person_id.0))
                    .filter(tasks::event_id.eq(event_id.0))
                    .filter(tasks::role_id.eq(role_id.0))
                    .select(TaskRow::as_select())
                    .first::<TaskRow>(tx)
                    .optional()
                    .map_err(map_diesel_error)?;
                if let Some(row) = existing {
                    return Ok((Task::from(row), false));
                }

                load_event(tx, event_id)?;
                load_person(tx, person_id)?;
                let role_exists = diesel::select(exists(roles::table.find(role_id.0)))
                    .get_result::<bool>(tx)
                    .map_err(map_diesel_error)?;
                if !role_exists {
                    return Err(RepositoryError::row_not_found("role", role_id));
                }

                let row = diesel::insert_into(tasks::table)
                    .values((
                        tasks::person_id.eq(person_id.0),
                        tasks::event_id.eq(event_id.0),
                        tasks::role_id.eq(role_id.0),
                    ))
                    .returning(TaskRow::as_returning())
                    .get_result::<TaskRow>(tx)
                    .map_err(map_diesel_error)?;
                Ok((Task::from(row), true))
            })
        })
        .await
    }

    async fn get_task(&self, task_id: TaskId) -> RepositoryResult<Task> {
        self.with_conn(move |conn| {
            tasks::table
                .find(task_id.0)
                .select(TaskRow::as_select())
                .first::<TaskRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Task::from)
                .ok_or_else(|| RepositoryError::row_not_found("task", task_id))
        })
        .await
    }

    async fn find_tasks(
        &self,
        person_id: PersonId,
        event_id: EventId,
        role_id: RoleId,
    ) -> RepositoryResult<Vec<Task>> {
        self.with_conn(move |conn| {
            tasks::table
                .filter(tasks::person_id.eq(person_id.0))
                .filter(tasks::event_id.eq(event_id.0))
                .filter(tasks::role_id.eq(role_id.0))
                .order(tasks::id.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(conn)
                .map(|rows| rows.into_iter().map(Task::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn delete_task(&self, task_id: TaskId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                diesel::delete(scheduled_jobs::table.filter(scheduled_jobs::task_id.eq(task_id.0)))
                    .execute(tx)
                    .map_err(map_diesel_error)?;
                let deleted = diesel::delete(tasks::table.find(task_id.0))
                    .execute(tx)
                    .map_err(map_diesel_error)?;
                if deleted == 0 {
                    return Err(RepositoryError::row_not_found("task", task_id)
                        .with_operation("delete_task"));
                }
                Ok(())
            })
        })
        .await
    }

    async fn instructor_tasks_overlapping(
        &self,
        person_id: PersonId,
        range: DateRange,
    ) -> RepositoryResult<Vec<TaskWithEvent>> {
        self.with_conn(move |conn| {
            // NULL dates never satisfy the comparisons, so undated events drop out.
            let rows = tasks::table
                .inner_join(events::table)
                .inner_join(roles::table)
                .filter(tasks::person_id.eq(person_id.0))
                .filter(roles::name.eq(INSTRUCTOR_ROLE))
                .filter(events::start_date.le(range.end))
                .filter(events::end_date.ge(range.start))
                .order(events::start_date.asc())
                .select((TaskRow::as_select(), EventRow::as_select()))
                .load::<(TaskRow, EventRow)>(conn)
                .map_err(map_diesel_error)?;

            let mut found = Vec::with_capacity(rows.len());
            for (task_row, event_row) in rows {
                let tags = event_tag_names(conn, event_row.id)?;
                found.push(TaskWithEvent {
                    task: Task::from(task_row),
                    event: event_row.into_event(tags),
                });
            }
            Ok(found)
        })
        .await
    }

    async fn create_trigger(&self, trigger: &NewEmailTrigger) -> RepositoryResult<EmailTrigger> {
        let row = NewEmailTriggerRow {
            action: trigger.action.as_code().to_string(),
            template_slug: trigger.template_slug.clone(),
            active: trigger.active,
        };
        self.with_conn(move |conn| {
            diesel::insert_into(email_triggers::table)
                .values(&row)
                .returning(EmailTriggerRow::as_returning())
                .get_result::<EmailTriggerRow>(conn)
                .map_err(map_diesel_error)?
                .try_into()
        })
        .await
    }

    async fn active_triggers(&self, action: TriggerAction) -> RepositoryResult<Vec<EmailTrigger>> {
        self.with_conn(move |conn| {
            email_triggers::table
                .filter(email_triggers::action.eq(action.as_code()))
                .filter(email_triggers::active.eq(true))
                .order(email_triggers::id.asc())
                .select(EmailTriggerRow::as_select())
                .load::<EmailTriggerRow>(conn)
                .map_err(map_diesel_error)?
                .into_iter()
                .map(EmailTrigger::try_from)
                .collect()
        })
        .await
    }

    async fn record_scheduled_job(
        &self,
        record: &NewScheduledJobRecord,
    ) -> RepositoryResult<ScheduledJobRecord> {
        let row = NewScheduledJobRow {
            job_id: record.job_id.clone(),
            trigger_id: record.trigger_id.0,
            task_id: record.task_id.0,
            scheduled_execution: record.scheduled_execution,
        };
        self.with_conn(move |conn| {
            let task_exists = diesel::select(exists(tasks::table.find(row.task_id)))
                .get_result::<bool>(conn)
                .map_err(map_diesel_error)?;
            if !task_exists {
                return Err(RepositoryError::row_not_found("task", row.task_id));
            }
            diesel::insert_into(scheduled_jobs::table)
                .values(&row)
                .returning(ScheduledJobRow::as_returning())
                .get_result::<ScheduledJobRow>(conn)
                .map(ScheduledJobRecord::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn scheduled_jobs_for_task(
        &self,
        task_id: TaskId,
    ) -> RepositoryResult<Vec<ScheduledJobRecord>> {
        self.with_conn(move |conn| {
            scheduled_jobs::table
                .filter(scheduled_jobs::task_id.eq(task_id.0))
                .order(scheduled_jobs::id.asc())
                .select(ScheduledJobRow::as_select())
                .load::<ScheduledJobRow>(conn)
                .map(|rows| rows.into_iter().map(ScheduledJobRecord::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_scheduled_jobs(&self) -> RepositoryResult<Vec<ScheduledJobRecord>> {
        self.with_conn(|conn| {
            scheduled_jobs::table
                .order(scheduled_jobs::id.asc())
                .select(ScheduledJobRow::as_select())
                .load::<ScheduledJobRow>(conn)
                .map(|rows| rows.into_iter().map(ScheduledJobRecord::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn delete_scheduled_job(
        &self,
        record_id: ScheduledJobRecordId,
    ) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(scheduled_jobs::table.find(record_id.0))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(RepositoryError::row_not_found("scheduled job", record_id));
            }
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_with_url_keeps_pool_defaults() {
        let config = PostgresConfig::with_url("postgres://localhost/amy");
        assert_eq!(config.database_url, "postgres://localhost/amy");
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_ms, 100);
    }
}
