//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use amy_recruitment::api::{NewEmailTrigger, NewEvent, NewPerson, SignupState, TriggerAction};
use amy_recruitment::config::{AppSettings, DEFAULT_SUCCESS_URL};
use amy_recruitment::db::repositories::LocalRepository;
use amy_recruitment::db::repository::{DirectoryRepository, RecruitmentRepository, TaskRepository};
use amy_recruitment::http::{create_router, AppState};
use amy_recruitment::models::events::{AUTOMATED_EMAIL_TAG, INSTRUCTOR_ROLE};
use amy_recruitment::scheduler::{InMemoryScheduler, JobScheduler};

struct TestApp {
    repo: Arc<LocalRepository>,
    scheduler: Arc<InMemoryScheduler>,
    router: Router,
}

fn app() -> TestApp {
    let repo = Arc::new(LocalRepository::new());
    let scheduler = Arc::new(InMemoryScheduler::new());
    let state = AppState::new(repo.clone(), scheduler.clone(), AppSettings::default());
    TestApp {
        repo,
        scheduler,
        router: create_router(state),
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_create_recruitment_then_details() {
    let app = app();
    let org = app.repo.create_organization("a.edu", "A").await.unwrap();
    let event = app
        .repo
        .create_event(&NewEvent::new("2030-01-10-ttt", org.id))
        .await
        .unwrap();

    let (status, body) = send(
        &app.router,
        post_json(
            &format!("/v1/events/{}/recruitments", event.id),
            json!({"notes": "Test notes"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["recruitment"]["status"], "o");
    assert_eq!(body["recruitment"]["notes"], "Test notes");
    let id = body["recruitment"]["id"].as_i64().unwrap();
    assert_eq!(body["redirect_to"], format!("/recruitment/processes/{}/", id));

    let (status, body) = send(&app.router, get(&format!("/v1/recruitments/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Instructor Recruitment Process for 2030-01-10-ttt");

    // A second process for the same event is a validation error.
    let (status, body) = send(
        &app.router,
        post_json(&format!("/v1/events/{}/recruitments", event.id), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["errors"]["__all__"].is_array());
}

#[tokio::test]
async fn test_unknown_recruitment_is_404() {
    let app = app();
    let (status, body) = send(&app.router, get("/v1/recruitments/12345")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let app = app();
    let org = app.repo.create_organization("a.edu", "A").await.unwrap();
    let event = app
        .repo
        .create_event(&NewEvent::new("e", org.id))
        .await
        .unwrap();
    send(
        &app.router,
        post_json(&format!("/v1/events/{}/recruitments", event.id), json!({})),
    )
    .await;

    let (status, body) = send(&app.router, get("/v1/recruitments?status=o")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recruitments"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app.router, get("/v1/recruitments?status=c")).await;
    assert!(body["recruitments"].as_array().unwrap().is_empty());

    let (status, body) = send(&app.router, get("/v1/recruitments?status=x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_change_state_confirm_redirects_and_schedules() {
    let app = app();
    let role = app
        .repo
        .create_role(INSTRUCTOR_ROLE, "Instructor")
        .await
        .unwrap();
    app.repo.create_tag(AUTOMATED_EMAIL_TAG, 0).await.unwrap();
    app.repo
        .create_trigger(&NewEmailTrigger {
            action: TriggerAction::NewInstructor,
            template_slug: "confirm-instructor".to_string(),
            active: true,
        })
        .await
        .unwrap();
    let org = app.repo.create_organization("a.edu", "A").await.unwrap();
    let event = app
        .repo
        .create_event(&NewEvent::new("no-dates-yet", org.id))
        .await
        .unwrap();
    app.repo.tag_event(event.id, AUTOMATED_EMAIL_TAG).await.unwrap();
    let person = app
        .repo
        .create_person(&NewPerson::new("ron", "Ron", "Weasley"))
        .await
        .unwrap();

    let (_, body) = send(
        &app.router,
        post_json(&format!("/v1/events/{}/recruitments", event.id), json!({})),
    )
    .await;
    let recruitment_id = body["recruitment"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app.router,
        post_json(
            &format!("/v1/recruitments/{}/signups", recruitment_id),
            json!({"person_id": person.id, "interest": "full"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["state"], "p");
    let signup_id = body["id"].as_i64().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(post_form(
            &format!("/v1/signups/{}/change-state", signup_id),
            "action=confirm&next=%2Fdashboard%2F",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard/");

    let signup = app
        .repo
        .get_signup(amy_recruitment::api::SignupId::new(signup_id))
        .await
        .unwrap();
    assert_eq!(signup.state, SignupState::Confirmed);
    let tasks = app
        .repo
        .find_tasks(person.id, event.id, role.id)
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(app.scheduler.count().await.unwrap(), 1);

    let (status, body) = send(&app.router, get(&format!("/v1/tasks/{}/jobs", tasks[0].id))).await;
    assert_eq!(status, StatusCode::OK);
    let job = app.scheduler.jobs().await.unwrap().remove(0);
    assert_eq!(body[0]["job_id"], job.job_id);
}

#[tokio::test]
async fn test_change_state_invalid_form_and_unsafe_next() {
    let app = app();
    app.repo
        .create_role(INSTRUCTOR_ROLE, "Instructor")
        .await
        .unwrap();
    let org = app.repo.create_organization("a.edu", "A").await.unwrap();
    let event = app
        .repo
        .create_event(&NewEvent::new("e", org.id))
        .await
        .unwrap();
    let person = app
        .repo
        .create_person(&NewPerson::new("ron", "Ron", "Weasley"))
        .await
        .unwrap();
    let recruitment = app
        .repo
        .create_recruitment(&amy_recruitment::api::NewRecruitment::new(event.id))
        .await
        .unwrap();
    let signup = app
        .repo
        .create_signup(&amy_recruitment::api::NewSignup::new(recruitment.id, person.id))
        .await
        .unwrap();
    let uri = format!("/v1/signups/{}/change-state", signup.id);

    let response = app
        .router
        .clone()
        .oneshot(post_form(&uri, "action=maybe&next=%2Fdashboard%2F"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard/");

    let response = app
        .router
        .clone()
        .oneshot(post_form(&uri, "action=maybe"))
        .await
        .unwrap();
    assert_eq!(response.headers()[header::LOCATION], DEFAULT_SUCCESS_URL);
    assert_eq!(
        app.repo.get_signup(signup.id).await.unwrap().state,
        SignupState::Pending
    );

    let response = app
        .router
        .clone()
        .oneshot(post_form(
            &uri,
            "action=decline&next=https%3A%2F%2Fevil.example.com%2F",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], DEFAULT_SUCCESS_URL);
    assert_eq!(
        app.repo.get_signup(signup.id).await.unwrap().state,
        SignupState::Declined
    );
}

#[tokio::test]
async fn test_profile_gender_rules() {
    let app = app();
    let (status, body) = send(
        &app.router,
        post_json(
            "/v1/persons",
            json!({"username": "ginny", "personal": "Ginny", "family": "Weasley"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/v1/persons/{}/profile", body["id"]);

    let put = |body: Value| {
        Request::put(uri.as_str())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let (status, body) = send(
        &app.router,
        put(json!({"personal": "Ginny", "gender": "O", "gender_other": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["gender"][0], "This field is required.");

    let (status, body) = send(
        &app.router,
        put(json!({"personal": "Ginny", "gender": "F", "gender_other": "Witch"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["gender"][0],
        "If you entered data in \"Other\" field, please select that option."
    );

    let (status, body) = send(
        &app.router,
        put(json!({"personal": "Ginevra", "gender": "O", "gender_other": "Witch"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["personal"], "Ginevra");
    assert_eq!(body["username"], "ginny");
}

#[tokio::test]
async fn test_create_person_rejects_bad_github() {
    let app = app();
    let (status, body) = send(
        &app.router,
        post_json(
            "/v1/persons",
            json!({"username": "x", "personal": "X", "github": "-bad-"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["github"][0], "This is not a valid GitHub username.");
}

#[tokio::test]
async fn test_malformed_signup_body_is_bad_request() {
    let app = app();
    let (status, body) = send(
        &app.router,
        post_json("/v1/recruitments/1/signups", json!({"interest": "full"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}
