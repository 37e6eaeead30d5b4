//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};

use super::dto::{CreateRecruitmentResponse, HealthResponse, RecruitmentListQuery, SignupRequest};
use super::error::AppError;
use super::state::AppState;
use crate::api::{
    EventId, InstructorRecruitment, InstructorRecruitmentSignup, Person, PersonId, RecruitmentId,
    ScheduledJobRecord, SignupId, TaskId,
};
use crate::db::services as db_services;
use crate::forms::{
    AssignmentForm, AutoUpdateProfileForm, InstructorRecruitmentCreateForm,
    InstructorRecruitmentSignupChangeStateForm, PersonCreateForm,
};
use crate::services::{self, recruitment::details_url};
use crate::services::{NewRecruitmentContext, RecruitmentDetails, RecruitmentList};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Recruitment processes
// =============================================================================

/// GET /v1/recruitments
pub async fn list_recruitments(
    State(state): State<AppState>,
    query: Result<Query<RecruitmentListQuery>, QueryRejection>,
) -> HandlerResult<RecruitmentList> {
    let Query(query) = query?;
    let list = services::list_recruitments(state.repository.as_ref(), &query.into()).await?;
    Ok(Json(list))
}

/// GET /v1/events/{event_id}/recruitments/new
pub async fn new_recruitment(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> HandlerResult<NewRecruitmentContext> {
    let context = services::new_recruitment_context(state.repository.as_ref(), event_id).await?;
    Ok(Json(context))
}

/// POST /v1/events/{event_id}/recruitments
pub async fn create_recruitment(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
    Json(form): Json<InstructorRecruitmentCreateForm>,
) -> Result<(StatusCode, Json<CreateRecruitmentResponse>), AppError> {
    let recruitment =
        services::create_recruitment(state.repository.as_ref(), event_id, &form).await?;
    let redirect_to = details_url(recruitment.id);
    Ok((
        StatusCode::CREATED,
        Json(CreateRecruitmentResponse {
            recruitment,
            redirect_to,
        }),
    ))
}

/// GET /v1/recruitments/{id}
pub async fn recruitment_details(
    State(state): State<AppState>,
    Path(recruitment_id): Path<RecruitmentId>,
) -> HandlerResult<RecruitmentDetails> {
    let details = services::recruitment_details(state.repository.as_ref(), recruitment_id).await?;
    Ok(Json(details))
}

/// POST /v1/recruitments/{id}/assign
pub async fn assign_recruitment(
    State(state): State<AppState>,
    Path(recruitment_id): Path<RecruitmentId>,
    Json(form): Json<AssignmentForm>,
) -> HandlerResult<InstructorRecruitment> {
    let recruitment =
        services::assign_recruitment(state.repository.as_ref(), recruitment_id, &form).await?;
    Ok(Json(recruitment))
}

/// POST /v1/recruitments/{id}/signups
pub async fn signup_for_recruitment(
    State(state): State<AppState>,
    Path(recruitment_id): Path<RecruitmentId>,
    request: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<InstructorRecruitmentSignup>), AppError> {
    let Json(request) = request?;
    let signup = services::signup_for_recruitment(
        state.repository.as_ref(),
        recruitment_id,
        request.person_id,
        &request.form(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(signup)))
}

/// POST /v1/signups/{id}/change-state
///
/// Form-encoded `action` and `next`; always answers with a redirect once the
/// signup exists.
pub async fn change_signup_state(
    State(state): State<AppState>,
    Path(signup_id): Path<SignupId>,
    Form(form): Form<InstructorRecruitmentSignupChangeStateForm>,
) -> Result<Response, AppError> {
    let outcome = services::change_signup_state(
        state.repository.as_ref(),
        state.scheduler.as_ref(),
        &state.settings,
        signup_id,
        &form,
    )
    .await?;
    Ok((StatusCode::FOUND, [(header::LOCATION, outcome.redirect_to)]).into_response())
}

// =============================================================================
// People
// =============================================================================

/// POST /v1/persons
pub async fn create_person(
    State(state): State<AppState>,
    Json(form): Json<PersonCreateForm>,
) -> Result<(StatusCode, Json<Person>), AppError> {
    let person = services::create_person(state.repository.as_ref(), &form).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// GET /v1/persons/{id}/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Path(person_id): Path<PersonId>,
) -> HandlerResult<AutoUpdateProfileForm> {
    let form = services::profile_form(state.repository.as_ref(), person_id).await?;
    Ok(Json(form))
}

/// PUT /v1/persons/{id}/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Path(person_id): Path<PersonId>,
    Json(form): Json<AutoUpdateProfileForm>,
) -> HandlerResult<Person> {
    let person = services::update_profile(state.repository.as_ref(), person_id, &form).await?;
    Ok(Json(person))
}

// =============================================================================
// Scheduled jobs
// =============================================================================

/// GET /v1/jobs
pub async fn list_jobs(State(state): State<AppState>) -> HandlerResult<Vec<ScheduledJobRecord>> {
    let jobs = services::list_scheduled_jobs(state.repository.as_ref()).await?;
    Ok(Json(jobs))
}

/// GET /v1/tasks/{id}/jobs
pub async fn task_jobs(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
) -> HandlerResult<Vec<ScheduledJobRecord>> {
    let jobs = services::task_jobs(state.repository.as_ref(), task_id).await?;
    Ok(Json(jobs))
}
