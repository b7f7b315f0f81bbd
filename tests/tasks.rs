#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;
use taskhub::auth::AuthResponse;
use taskhub::models::{Task, TaskPriority, TaskStatus};

#[actix_rt::test]
async fn test_create_task_unauthorized() {
    let server = common::spawn_server(common::unreachable_database().await);
    let client = reqwest::Client::new();
    let task_payload = json!({
        "title": "Unauthorized Task",
        "status": TaskStatus::Todo
    });

    let resp = client
        .post(server.url("/api/tasks"))
        .json(&task_payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(
        resp.status(),
        reqwest::StatusCode::UNAUTHORIZED,
        "Expected 401 Unauthorized, got {}",
        resp.status()
    );

    // A token signed with another secret is rejected too.
    let foreign = taskhub::auth::TokenService::new("some-other-secret", 1)
        .generate("65f1c0ffee00000000000001")
        .unwrap();
    let resp = client
        .get(server.url("/api/tasks"))
        .bearer_auth(foreign)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    server.stop().await;
}

#[actix_rt::test]
async fn test_task_validation_happens_before_database() {
    let app = init_app!(common::unreachable_database().await).await;
    let token = common::tokens().generate("65f1c0ffee00000000000001").unwrap();

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({ "title": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({ "title": "ok", "status": "someday" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/tasks/not-an-object-id")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::patch()
        .uri("/api/tasks/65f1c0ffee00000000000009")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_invalid_query_filter_returns_json_error() {
    let app = init_app!(common::unreachable_database().await).await;
    let token = common::tokens().generate("65f1c0ffee00000000000001").unwrap();

    let req = test::TestRequest::get()
        .uri("/api/tasks?status=bogus")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string(), "Unexpected body: {}", body);
}

#[actix_rt::test]
async fn test_database_outage_surfaces_as_server_error() {
    let app = init_app!(common::unreachable_database().await).await;
    let token = common::tokens().generate("65f1c0ffee00000000000001").unwrap();

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Database error");
}

struct TestUser {
    token: String,
}

async fn register_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    username: &str,
) -> TestUser {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&json!({
            "username": username,
            "email": email,
            "password": "Password123!"
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED, "Failed to register {}", email);
    let auth: AuthResponse = test::read_body_json(resp).await;
    TestUser { token: auth.token }
}

async fn cleanup_user(database: &mongodb::Database, email: &str) {
    use mongodb::bson::doc;

    if let Ok(Some(user)) = taskhub::db::users(database)
        .find_one(doc! { "email": email })
        .await
    {
        if let Some(id) = user.id {
            let _ = taskhub::db::tasks(database)
                .delete_many(doc! { "user_id": id })
                .await;
        }
    }
    let _ = taskhub::db::users(database)
        .delete_many(doc! { "email": email })
        .await;
}

#[ignore = "requires a MongoDB instance (MONGODB_URI)"]
#[actix_rt::test]
async fn test_task_crud_flow() {
    let database = common::live_database().await;
    cleanup_user(&database, "crud@example.com").await;
    let app = init_app!(database.clone()).await;
    let user = register_user(&app, "crud@example.com", "crud_user").await;
    let bearer = format!("Bearer {}", user.token);

    // Create
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(("Authorization", bearer.as_str()))
        .set_json(&json!({
            "title": "Write quarterly report",
            "description": "Numbers for Q3",
            "priority": TaskPriority::High
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Task = test::read_body_json(resp).await;
    assert_eq!(created.status, TaskStatus::Todo);
    assert_eq!(created.priority, Some(TaskPriority::High));

    // Second task, to check ordering and search. Timestamps have millisecond resolution.
    actix_rt::time::sleep(std::time::Duration::from_millis(20)).await;
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(("Authorization", bearer.as_str()))
        .set_json(&json!({ "title": "Book flights", "status": "in_progress" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // List: newest first
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header(("Authorization", bearer.as_str()))
        .to_request();
    let tasks: Vec<Task> = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Book flights");

    // Filter and search
    let req = test::TestRequest::get()
        .uri("/api/tasks?status=in_progress")
        .append_header(("Authorization", bearer.as_str()))
        .to_request();
    let tasks: Vec<Task> = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(tasks.len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/tasks?search=QUARTERLY")
        .append_header(("Authorization", bearer.as_str()))
        .to_request();
    let tasks: Vec<Task> = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, created.id);

    // Get
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", created.id))
        .append_header(("Authorization", bearer.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Replace
    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", created.id))
        .append_header(("Authorization", bearer.as_str()))
        .set_json(&json!({ "title": "Write annual report", "status": "review" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let replaced: Task = test::read_body_json(resp).await;
    assert_eq!(replaced.title, "Write annual report");
    assert_eq!(replaced.status, TaskStatus::Review);
    assert_eq!(replaced.priority, None);
    assert!(replaced.updated_at >= created.updated_at);

    // Patch
    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}", created.id))
        .append_header(("Authorization", bearer.as_str()))
        .set_json(&json!({ "status": "done" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let patched: Task = test::read_body_json(resp).await;
    assert_eq!(patched.status, TaskStatus::Done);
    assert_eq!(patched.title, "Write annual report");

    // Delete, then it is gone
    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", created.id))
        .append_header(("Authorization", bearer.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", created.id))
        .append_header(("Authorization", bearer.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    cleanup_user(&database, "crud@example.com").await;
}

#[ignore = "requires a MongoDB instance (MONGODB_URI)"]
#[actix_rt::test]
async fn test_task_ownership_and_authorization() {
    let database = common::live_database().await;
    cleanup_user(&database, "owner@example.com").await;
    cleanup_user(&database, "intruder@example.com").await;
    let app = init_app!(database.clone()).await;

    let owner = register_user(&app, "owner@example.com", "owner_user").await;
    let intruder = register_user(&app, "intruder@example.com", "intruder_user").await;

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(("Authorization", format!("Bearer {}", owner.token)))
        .set_json(&json!({ "title": "Private task" }))
        .to_request();
    let task: Task = test::read_body_json(test::call_service(&app, req).await).await;
    let path = format!("/api/tasks/{}", task.id);
    let intruder_bearer = format!("Bearer {}", intruder.token);

    let req = test::TestRequest::get()
        .uri(&path)
        .append_header(("Authorization", intruder_bearer.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri(&path)
        .append_header(("Authorization", intruder_bearer.as_str()))
        .set_json(&json!({ "title": "Hijacked" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&path)
        .append_header(("Authorization", intruder_bearer.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header(("Authorization", intruder_bearer.as_str()))
        .to_request();
    let visible: Vec<Task> = test::read_body_json(test::call_service(&app, req).await).await;
    assert!(visible.is_empty());

    cleanup_user(&database, "owner@example.com").await;
    cleanup_user(&database, "intruder@example.com").await;
}
