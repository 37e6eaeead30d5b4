//! Instructor recruitment workflow.
//!
//! Administrators open a recruitment process for an event, people sign up,
//! and administrators confirm or decline each signup. Confirming makes the
//! person an instructor of the event (a [`Task`]) and may schedule the
//! new-instructor email; declining undoes both.

use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::redirect::success_redirect;
use super::ServiceResult;
use crate::api::{
    Event, EventId, InstructorRecruitment, InstructorRecruitmentSignup, NewRecruitment,
    NewSignup, Person, PersonId, RecruitmentFilter, RecruitmentId, RecruitmentStatus,
    ScheduledJobRecord, SignupId, Task, TaskId,
};
use crate::config::AppSettings;
use crate::db::repository::FullRepository;
use crate::db::services::{conflicting_instructor_tasks, find_person, instructor_role};
use crate::forms::{
    AssignmentForm, FormErrors, InstructorRecruitmentCreateForm,
    InstructorRecruitmentSignupChangeStateForm, SignupAction, SignupForRecruitmentForm,
};
use crate::models::dates::human_daterange;
use crate::scheduler::{cancel_task_jobs, JobScheduler, NewInstructorAction};

/// A recruitment with its event and signups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecruitmentSummary {
    pub recruitment: InstructorRecruitment,
    pub event: Event,
    pub signups: Vec<InstructorRecruitmentSignup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecruitmentList {
    pub recruitments: Vec<RecruitmentSummary>,
    /// People signed up for any open recruitment, for cross-checking.
    pub personal_conflicts: Vec<Person>,
}

/// Data pre-filling the "begin recruitment" form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecruitmentContext {
    pub title: String,
    pub event: Event,
    pub event_dates: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupDetails {
    pub signup: InstructorRecruitmentSignup,
    pub person: Person,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecruitmentDetails {
    pub title: String,
    pub recruitment: InstructorRecruitment,
    pub event: Event,
    pub assignee: Option<Person>,
    pub signups: Vec<SignupDetails>,
}

/// Result of a change-state submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStateOutcome {
    /// The updated signup, or `None` when the submission was invalid.
    pub signup: Option<InstructorRecruitmentSignup>,
    pub redirect_to: String,
}

/// Display title of a recruitment process.
pub fn recruitment_title(event: &Event) -> String {
    format!("Instructor Recruitment Process for {}", event.slug)
}

/// Details page of a recruitment.
pub fn details_url(recruitment_id: RecruitmentId) -> String {
    format!("/recruitment/processes/{}/", recruitment_id)
}

pub async fn list_recruitments<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &RecruitmentFilter,
) -> ServiceResult<RecruitmentList> {
    let recruitments = repo.list_recruitments(filter).await?;
    let mut summaries = Vec::with_capacity(recruitments.len());
    for recruitment in recruitments {
        let event = repo.get_event(recruitment.event_id).await?;
        let signups = repo.list_signups(recruitment.id).await?;
        summaries.push(RecruitmentSummary {
            recruitment,
            event,
            signups,
        });
    }

    Ok(RecruitmentList {
        recruitments: summaries,
        personal_conflicts: repo.persons_with_open_signups().await?,
    })
}

pub async fn new_recruitment_context<R: FullRepository + ?Sized>(
    repo: &R,
    event_id: EventId,
) -> ServiceResult<NewRecruitmentContext> {
    let event = repo.get_event(event_id).await?;
    if repo.recruitment_for_event(event_id).await?.is_some() {
        return Err(already_recruiting(&event).into());
    }

    let notes = repo
        .workshop_request_for_event(event_id)
        .await?
        .map(|request| format!("{}\n\n{}", request.audience_description, request.user_notes))
        .unwrap_or_default();

    Ok(NewRecruitmentContext {
        title: format!("Begin Instructor Selection Process for {}", event.slug),
        event_dates: human_daterange(event.start, event.end, "-"),
        event,
        notes,
    })
}

fn already_recruiting(event: &Event) -> FormErrors {
    FormErrors::non_field(format!(
        "Event {} already has an instructor recruitment process.",
        event.slug
    ))
}

/// Look up the person an assignment form refers to.
async fn assignee_for<R: FullRepository + ?Sized>(
    repo: &R,
    assigned_to: Option<PersonId>,
) -> ServiceResult<Option<Person>> {
    match assigned_to {
        Some(id) => Ok(find_person(repo, id).await?),
        None => Ok(None),
    }
}

pub async fn create_recruitment<R: FullRepository + ?Sized>(
    repo: &R,
    event_id: EventId,
    form: &InstructorRecruitmentCreateForm,
) -> ServiceResult<InstructorRecruitment> {
    let event = repo.get_event(event_id).await?;
    let assignee = assignee_for(repo, form.assigned_to).await?;
    let cleaned = form.clean(assignee.as_ref())?;

    if repo.recruitment_for_event(event_id).await?.is_some() {
        return Err(already_recruiting(&event).into());
    }

    let new = NewRecruitment {
        event_id,
        assigned_to: cleaned.assigned_to,
        status: RecruitmentStatus::Open,
        notes: cleaned.notes,
    };
    match repo.create_recruitment(&new).await {
        Ok(recruitment) => {
            info!(
                "Opened recruitment {} for event {}",
                recruitment.id, event.slug
            );
            Ok(recruitment)
        }
        Err(e) if e.is_conflict() => Err(already_recruiting(&event).into()),
        Err(e) => Err(e.into()),
    }
}

pub async fn recruitment_details<R: FullRepository + ?Sized>(
    repo: &R,
    recruitment_id: RecruitmentId,
) -> ServiceResult<RecruitmentDetails> {
    let recruitment = repo.get_recruitment(recruitment_id).await?;
    let event = repo.get_event(recruitment.event_id).await?;
    let assignee = assignee_for(repo, recruitment.assigned_to).await?;

    let signups = repo.list_signups(recruitment.id).await?;
    let person_ids: Vec<PersonId> = signups.iter().map(|s| s.person_id).collect();
    let persons = repo.list_persons(&person_ids).await?;
    let signups = signups
        .into_iter()
        .filter_map(|signup| {
            let person = persons.iter().find(|p| p.id == signup.person_id)?.clone();
            Some(SignupDetails { signup, person })
        })
        .collect();

    Ok(RecruitmentDetails {
        title: recruitment_title(&event),
        recruitment,
        event,
        assignee,
        signups,
    })
}

pub async fn assign_recruitment<R: FullRepository + ?Sized>(
    repo: &R,
    recruitment_id: RecruitmentId,
    form: &AssignmentForm,
) -> ServiceResult<InstructorRecruitment> {
    let mut recruitment = repo.get_recruitment(recruitment_id).await?;
    let assignee = assignee_for(repo, form.assigned_to).await?;
    recruitment.assigned_to = form.clean(assignee.as_ref())?;
    let recruitment = repo.update_recruitment(&recruitment).await?;
    debug!(
        "Recruitment {} assigned to {:?}",
        recruitment.id, recruitment.assigned_to
    );
    Ok(recruitment)
}

pub async fn signup_for_recruitment<R: FullRepository + ?Sized>(
    repo: &R,
    recruitment_id: RecruitmentId,
    person_id: PersonId,
    form: &SignupForRecruitmentForm,
) -> ServiceResult<InstructorRecruitmentSignup> {
    let recruitment = repo.get_recruitment(recruitment_id).await?;
    let event = repo.get_event(recruitment.event_id).await?;
    let person = repo.get_person(person_id).await?;

    let mut conflicts = conflicting_instructor_tasks(repo, person.id, &event).await?;
    conflicts.retain(|t| t.event.id != event.id);
    let cleaned = form.clean(&recruitment, &event, &conflicts)?;

    let signup = repo
        .create_signup(&NewSignup {
            recruitment_id,
            person_id,
            interest: cleaned.interest,
            user_notes: cleaned.user_notes,
            notes: String::new(),
        })
        .await?;
    info!(
        "{} signed up for recruitment {} ({})",
        person.username, recruitment.id, event.slug
    );
    Ok(signup)
}

/// Confirm or decline a signup.
///
/// An invalid form changes nothing. A valid one updates the signup, then adds
/// or removes the instructor task. Either way the redirect goes to `next` when
/// it is safe, otherwise to the configured success URL.
pub async fn change_signup_state<R, S>(
    repo: &R,
    scheduler: &S,
    settings: &AppSettings,
    signup_id: SignupId,
    form: &InstructorRecruitmentSignupChangeStateForm,
) -> ServiceResult<ChangeStateOutcome>
where
    R: FullRepository + ?Sized,
    S: JobScheduler + ?Sized,
{
    let mut signup = repo.get_signup(signup_id).await?;

    let action = match form.clean() {
        Ok(action) => action,
        Err(errors) => {
            warn!("Invalid state change for signup {}: {}", signup_id, errors);
            return Ok(ChangeStateOutcome {
                signup: None,
                redirect_to: success_redirect(form.next.as_deref(), settings),
            });
        }
    };

    let recruitment = repo.get_recruitment(signup.recruitment_id).await?;
    signup.state = action.target_state();
    let signup = repo.update_signup(&signup).await?;

    match action {
        SignupAction::Confirm => {
            let action = NewInstructorAction::from_settings(settings);
            add_instructor_task(repo, scheduler, &action, signup.person_id, recruitment.event_id)
                .await?;
        }
        SignupAction::Decline => {
            remove_instructor_task(repo, scheduler, signup.person_id, recruitment.event_id)
                .await?;
        }
    }
    debug!("Signup {} is now {}", signup.id, signup.state);

    Ok(ChangeStateOutcome {
        redirect_to: success_redirect(form.next.as_deref(), settings),
        signup: Some(signup),
    })
}

/// Make `person_id` an instructor of `event_id`.
///
/// The task is created at most once. The new-instructor email is scheduled
/// when the action's check passes and the task has no job recorded yet.
pub async fn add_instructor_task<R, S>(
    repo: &R,
    scheduler: &S,
    action: &NewInstructorAction,
    person_id: PersonId,
    event_id: EventId,
) -> ServiceResult<Task>
where
    R: FullRepository + ?Sized,
    S: JobScheduler + ?Sized,
{
    let role = instructor_role(repo).await?;
    let event = repo.get_event(event_id).await?;
    let (task, created) = repo.get_or_create_task(person_id, event_id, role.id).await?;
    if created {
        info!("Person {} is now instructor at {}", person_id, event.slug);
    }

    let today = Utc::now().date_naive();
    if NewInstructorAction::check(&task, &role, &event, today) {
        if repo.scheduled_jobs_for_task(task.id).await?.is_empty() {
            action.schedule(repo, scheduler, &task).await?;
        } else {
            debug!("Task {} already has a scheduled job", task.id);
        }
    }
    Ok(task)
}

/// Remove every instructor task of `person_id` at `event_id`, cancelling
/// their scheduled jobs. Returns the number of tasks removed.
pub async fn remove_instructor_task<R, S>(
    repo: &R,
    scheduler: &S,
    person_id: PersonId,
    event_id: EventId,
) -> ServiceResult<usize>
where
    R: FullRepository + ?Sized,
    S: JobScheduler + ?Sized,
{
    let role = instructor_role(repo).await?;
    let tasks = repo.find_tasks(person_id, event_id, role.id).await?;
    for task in &tasks {
        cancel_task_jobs(repo, scheduler, task.id).await?;
        repo.delete_task(task.id).await?;
        info!("Removed instructor task {} of person {}", task.id, person_id);
    }
    Ok(tasks.len())
}

pub async fn list_scheduled_jobs<R: FullRepository + ?Sized>(
    repo: &R,
) -> ServiceResult<Vec<ScheduledJobRecord>> {
    Ok(repo.list_scheduled_jobs().await?)
}

/// Job records of one task; not-found when the task is unknown.
pub async fn task_jobs<R: FullRepository + ?Sized>(
    repo: &R,
    task_id: TaskId,
) -> ServiceResult<Vec<ScheduledJobRecord>> {
    let task = repo.get_task(task_id).await?;
    Ok(repo.scheduled_jobs_for_task(task.id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{NewEvent, NewPerson, NewWorkshopRequest, SignupState};
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::DirectoryRepository;
    use crate::services::ServiceError;
    use chrono::NaiveDate;

    async fn event_with_dates(
        repo: &LocalRepository,
        slug: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Event {
        let org = repo.create_organization("example.org", "Example").await.unwrap();
        repo.create_event(&NewEvent::new(slug, org.id).with_dates(start, end))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_new_recruitment_context() {
        let repo = LocalRepository::new();
        let event = event_with_dates(
            &repo,
            "2021-12-29-ttt",
            NaiveDate::from_ymd_opt(2021, 12, 29),
            None,
        )
        .await;
        repo.create_workshop_request(&NewWorkshopRequest {
            event_id: Some(event.id),
            personal: "Minerva".to_string(),
            family: "McGonagall".to_string(),
            email: "mm@hogwarts.edu".to_string(),
            audience_description: "Students".to_string(),
            user_notes: "Bring laptops".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

        let context = new_recruitment_context(&repo, event.id).await.unwrap();
        assert_eq!(
            context.title,
            "Begin Instructor Selection Process for 2021-12-29-ttt"
        );
        assert_eq!(context.event_dates, "Dec 29, 2021-???");
        assert_eq!(context.notes, "Students\n\nBring laptops");
    }

    #[tokio::test]
    async fn test_second_recruitment_is_rejected() {
        let repo = LocalRepository::new();
        let event = event_with_dates(&repo, "e", None, None).await;
        let form = InstructorRecruitmentCreateForm {
            notes: "Test notes".to_string(),
            assigned_to: None,
        };
        let created = create_recruitment(&repo, event.id, &form).await.unwrap();
        assert_eq!(created.status, RecruitmentStatus::Open);
        assert_eq!(created.notes, "Test notes");

        let err = create_recruitment(&repo, event.id, &form).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(matches!(
            new_recruitment_context(&repo, event.id).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_assign_requires_administrator() {
        let repo = LocalRepository::new();
        let event = event_with_dates(&repo, "e", None, None).await;
        let recruitment = create_recruitment(&repo, event.id, &Default::default())
            .await
            .unwrap();
        let mut new_admin = NewPerson::new("admin", "Albus", "Dumbledore");
        new_admin.is_superuser = true;
        let admin = repo.create_person(&new_admin).await.unwrap();
        let student = repo
            .create_person(&NewPerson::new("student", "Neville", "Longbottom"))
            .await
            .unwrap();

        let err = assign_recruitment(
            &repo,
            recruitment.id,
            &AssignmentForm {
                assigned_to: Some(student.id),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let assigned = assign_recruitment(
            &repo,
            recruitment.id,
            &AssignmentForm {
                assigned_to: Some(admin.id),
            },
        )
        .await
        .unwrap();
        assert_eq!(assigned.assigned_to, Some(admin.id));

        let details = recruitment_details(&repo, recruitment.id).await.unwrap();
        assert_eq!(details.title, "Instructor Recruitment Process for e");
        assert_eq!(details.assignee.map(|p| p.id), Some(admin.id));
    }

    #[tokio::test]
    async fn test_signup_listed_in_personal_conflicts() {
        let repo = LocalRepository::new();
        let event = event_with_dates(&repo, "e", None, None).await;
        let recruitment = create_recruitment(&repo, event.id, &Default::default())
            .await
            .unwrap();
        let person = repo
            .create_person(&NewPerson::new("p", "Padma", "Patil"))
            .await
            .unwrap();
        signup_for_recruitment(&repo, recruitment.id, person.id, &Default::default())
            .await
            .unwrap();

        let list = list_recruitments(&repo, &RecruitmentFilter::default())
            .await
            .unwrap();
        assert_eq!(list.recruitments.len(), 1);
        assert_eq!(list.recruitments[0].signups.len(), 1);
        assert_eq!(list.recruitments[0].signups[0].state, SignupState::Pending);
        assert_eq!(list.personal_conflicts, vec![person]);
    }

    #[tokio::test]
    async fn test_task_jobs_unknown_task() {
        let repo = LocalRepository::new();
        assert!(task_jobs(&repo, TaskId::new(1)).await.unwrap_err().is_not_found());
        assert!(list_scheduled_jobs(&repo).await.unwrap().is_empty());
    }
}
