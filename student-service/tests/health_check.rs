mod common;

use axum::http::StatusCode;
use common::TestApp;
use service_core::middleware::REQUEST_ID_HEADER;
use student_service::config::StudentConfig;
use student_service::services::init_metrics;
use student_service::Application;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn();

    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "student-service");
}

#[tokio::test]
async fn readiness_check_works() {
    let app = TestApp::spawn();

    let response = app.get("/ready").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "ready");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::spawn();

    let response = app.get("/students").await;

    assert!(response.headers.contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn metrics_endpoint_returns_prometheus_format() {
    init_metrics().expect("Failed to install metrics recorder");
    let app = TestApp::spawn();
    let id = app.create_student("Alice", 22, "US", "NYC").await;
    app.patch_json(&format!("/students/{}", id), &serde_json::json!({ "age": 23 }))
        .await;

    let response = app.get("/metrics").await;

    assert_eq!(response.status, StatusCode::OK);
    let content_type = response.headers["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));

    let body = String::from_utf8(response.body).unwrap();
    assert!(body.contains("students_created_total"), "Unexpected metrics output: {}", body);
    assert!(body.contains("students_updated_total"), "Unexpected metrics output: {}", body);
}

#[tokio::test]
async fn served_application_handles_crud_over_http() {
    let app = Application::build(StudentConfig::in_memory(0))
        .await
        .expect("Failed to build application");
    let address = format!("http://127.0.0.1:{}", app.port());

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    let client = reqwest::Client::new();
    for _ in 0..50 {
        if client.get(format!("{}/health", address)).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }

    let created = client
        .post(format!("{}/students", address))
        .json(&serde_json::json!({
            "name": "Alice",
            "age": 22,
            "address": { "country": "US", "city": "NYC" }
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(created.status().as_u16(), 201);
    let id = created.json::<serde_json::Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let fetched: serde_json::Value = client
        .get(format!("{}/students/{}", address, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["name"], "Alice");
    assert_eq!(fetched["address"]["city"], "NYC");

    let deleted = client
        .delete(format!("{}/students/{}", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 200);
}
