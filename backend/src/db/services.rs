//! Repository-agnostic lookups shared by the recruitment services.
//!
//! Every function here is generic over [`FullRepository`] so it works with the
//! local store, Postgres, or a `dyn` repository held in the HTTP state.

use log::{debug, warn};

use crate::api::{Event, Person, PersonId, Role, TaskWithEvent};
use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::models::events::INSTRUCTOR_ROLE;

/// Check database connection health.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// The `instructor` role.
///
/// The role is part of the reference data every deployment carries; a missing
/// row is reported as not-found rather than created on the fly.
pub async fn instructor_role<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Role> {
    repo.get_role_by_name(INSTRUCTOR_ROLE).await?.ok_or_else(|| {
        warn!("Role '{}' is missing", INSTRUCTOR_ROLE);
        RepositoryError::row_not_found("role", INSTRUCTOR_ROLE)
    })
}

/// Instructor tasks of `person` on events overlapping `event`.
///
/// Returns nothing when `event` lacks a start or an end date.
pub async fn conflicting_instructor_tasks<R: FullRepository + ?Sized>(
    repo: &R,
    person_id: PersonId,
    event: &Event,
) -> RepositoryResult<Vec<TaskWithEvent>> {
    let Some(range) = event.date_range() else {
        debug!("Event {} has open dates; skipping conflict lookup", event.slug);
        return Ok(vec![]);
    };
    let mut tasks = repo.instructor_tasks_overlapping(person_id, range).await?;
    tasks.sort_by(|a, b| a.event.start.cmp(&b.event.start).then(a.event.id.cmp(&b.event.id)));
    Ok(tasks)
}

/// The person a recruitment may be assigned to, if any.
///
/// Returns `Ok(None)` when the id is unknown so form validation can report it
/// as an invalid choice.
pub async fn find_person<R: FullRepository + ?Sized>(
    repo: &R,
    person_id: PersonId,
) -> RepositoryResult<Option<Person>> {
    match repo.get_person(person_id).await {
        Ok(person) => Ok(Some(person)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{NewEvent, NewPerson};
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::DirectoryRepository;
    use crate::db::repository::TaskRepository;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_instructor_role_missing_is_not_found() {
        let repo = LocalRepository::new();
        assert!(instructor_role(&repo).await.unwrap_err().is_not_found());

        repo.create_role(INSTRUCTOR_ROLE, "Instructor").await.unwrap();
        assert_eq!(instructor_role(&repo).await.unwrap().name, INSTRUCTOR_ROLE);
    }

    #[tokio::test]
    async fn test_conflicts_skip_open_ended_event() {
        let repo = LocalRepository::new();
        let org = repo.create_organization("a.edu", "A").await.unwrap();
        let person = repo
            .create_person(&NewPerson::new("p", "P", "Q"))
            .await
            .unwrap();
        let role = repo.create_role(INSTRUCTOR_ROLE, "Instructor").await.unwrap();
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let booked = repo
            .create_event(&NewEvent::new("booked", org.id).with_dates(Some(start), Some(start)))
            .await
            .unwrap();
        repo.get_or_create_task(person.id, booked.id, role.id)
            .await
            .unwrap();

        let open_ended = repo
            .create_event(&NewEvent::new("open", org.id).with_dates(Some(start), None))
            .await
            .unwrap();
        let found = conflicting_instructor_tasks(&repo, person.id, &open_ended)
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_find_person_unknown_is_none() {
        let repo = LocalRepository::new();
        assert!(find_person(&repo, PersonId::new(99)).await.unwrap().is_none());
    }
}
