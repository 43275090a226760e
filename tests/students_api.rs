mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{delete, get, post, put, test_app};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn create_applies_defaults() {
    let app = test_app();
    let (status, body) = post(&app, "/api/v1/students", json!({"name": "Ann", "email": "ann@x.com", "major": "CS"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["gpa"], json!(0.0));
    assert_eq!(body["is_active"], json!(true));
    assert_eq!(body["name"], "Ann");
    assert!(body["id"].is_i64());
    assert!(body["created_at"].is_string());
    assert!(body["updated_at"].is_string());
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let app = test_app();
    let payload = json!({"name": "Ann", "email": "ann@x.com", "major": "CS"});
    assert_eq!(post(&app, "/api/v1/students", payload.clone()).await.0, StatusCode::CREATED);
    let (status, body) = post(&app, "/api/v1/students", payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");
    assert_eq!(body["message"], "Email already exists");
}

#[tokio::test]
async fn missing_required_field_is_bad_request() {
    let app = test_app();
    let (status, body) = post(&app, "/api/v1/students", json!({"name": "Ann", "major": "CS"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required fields");
}

#[tokio::test]
async fn invalid_email_or_gpa_is_bad_request() {
    let app = test_app();
    let (status, _) = post(&app, "/api/v1/students", json!({"name": "A", "email": "a@b", "major": "CS"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = post(&app, "/api/v1/students", json!({"name": "A", "email": "a@b.co", "major": "CS", "gpa": 4.01})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_or_overlong_text_is_bad_request() {
    let app = test_app();
    let long_name = "n".repeat(101);
    let (status, body) = post(&app, "/api/v1/students", json!({"name": long_name, "email": "a@b.co", "major": "CS"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name must be at most 100 characters");

    let long_email = format!("{}@example.com", "u".repeat(125));
    let (status, body) = post(&app, "/api/v1/students", json!({"name": "A", "email": long_email, "major": "CS"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "email must be at most 120 characters");

    let (status, body) = post(&app, "/api/v1/students", json!({"name": "A", "email": "a@b.co", "major": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "major must not be empty");

    let (status, created) = post(&app, "/api/v1/students", json!({"name": "A", "email": "a@b.co", "major": "CS"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/v1/students/{}", created["id"]);
    let (status, _) = put(&app, &uri, json!({"major": "m".repeat(101)})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(get(&app, &uri).await.1["major"], "CS");
}

#[tokio::test]
async fn non_json_body_is_bad_request() {
    let app = test_app();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/students")
        .header("content-type", "text/plain")
        .body(Body::from("name=Ann"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Request must be JSON");
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let app = test_app();
    let (status, body) = get(&app, "/api/v1/students/999999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Student not found");
    assert_eq!(get(&app, "/api/v1/students/abc").await.0, StatusCode::NOT_FOUND);
    assert_eq!(put(&app, "/api/v1/students/999999", json!({"gpa": 1.0})).await.0, StatusCode::NOT_FOUND);
    assert_eq!(delete(&app, "/api/v1/students/999999").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn partial_update_changes_only_given_fields() {
    let app = test_app();
    let (_, created) = post(&app, "/api/v1/students", json!({"name": "Ann", "email": "ann@x.com", "major": "CS", "gpa": 3.0})).await;
    let id = created["id"].as_i64().unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let (status, updated) = put(&app, &format!("/api/v1/students/{}", id), json!({"gpa": 3.9})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["gpa"], json!(3.9));
    for key in ["id", "name", "email", "major", "is_active", "created_at"] {
        assert_eq!(updated[key], created[key], "{} changed", key);
    }
    assert_ne!(updated["updated_at"], created["updated_at"]);

    let (_, fetched) = get(&app, &format!("/api/v1/students/{}", id)).await;
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_email_collision_is_conflict() {
    let app = test_app();
    let (_, ann) = post(&app, "/api/v1/students", json!({"name": "Ann", "email": "ann@x.com", "major": "CS"})).await;
    post(&app, "/api/v1/students", json!({"name": "Bob", "email": "bob@x.com", "major": "CS"})).await;
    let uri = format!("/api/v1/students/{}", ann["id"]);

    let (status, _) = put(&app, &uri, json!({"email": "bob@x.com"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, same) = put(&app, &uri, json!({"email": "ann@x.com", "major": "Math"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(same["major"], "Math");
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = test_app();
    let (_, created) = post(&app, "/api/v1/students", json!({"name": "Ann", "email": "ann@x.com", "major": "CS"})).await;
    let uri = format!("/api/v1/students/{}", created["id"]);
    let (status, body) = delete(&app, &uri).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
    assert_eq!(get(&app, &uri).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_and_filters() {
    let app = test_app();
    for (name, email, major, gpa, active) in [
        ("Ann", "ann@x.com", "CS", 3.8, true),
        ("Bob", "bob@x.com", "Math", 2.1, true),
        ("Cyd", "cyd@x.com", "CS", 3.1, false),
    ] {
        let (status, _) = post(
            &app,
            "/api/v1/students",
            json!({"name": name, "email": email, "major": major, "gpa": gpa, "is_active": active}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, all) = get(&app, "/api/v1/students").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, cs) = get(&app, "/api/v1/students/major/CS").await;
    let names: Vec<_> = cs.as_array().unwrap().iter().map(|s| s["name"].clone()).collect();
    assert_eq!(names, vec![json!("Ann"), json!("Cyd")]);

    let (_, none) = get(&app, "/api/v1/students/major/Art").await;
    assert_eq!(none, json!([]));

    let (_, active) = get(&app, "/api/v1/students/filter/active").await;
    assert_eq!(active.as_array().unwrap().len(), 2);

    let (_, range) = get(&app, "/api/v1/students/filter/gpa-range?min_gpa=3.0&max_gpa=3.8").await;
    assert_eq!(range.as_array().unwrap().len(), 2);
    assert_eq!(get(&app, "/api/v1/students/filter/gpa-range?min_gpa=x").await.0, StatusCode::BAD_REQUEST);
    assert_eq!(get(&app, "/api/v1/students/filter/gpa-range?min_gpa=3&max_gpa=2").await.0, StatusCode::BAD_REQUEST);

    let (_, found) = get(&app, "/api/v1/students/search?q=BOB").await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(get(&app, "/api/v1/students/search").await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_fallback() {
    let app = test_app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());

    let (status, body) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "memory");

    let (status, body) = get(&app, "/api/v1/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["message"], "The requested resource does not exist");
}
