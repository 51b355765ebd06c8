#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use student_service::services::InMemoryStudentStore;
use student_service::{build_router, AppState};
use tower::util::ServiceExt;

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: InMemoryStudentStore,
}

impl TestApp {
    pub fn spawn() -> Self {
        let store = InMemoryStudentStore::new();
        let router = build_router(AppState::new(Arc::new(store.clone())));
        TestApp { router, store }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: Body,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header("Content-Type", content_type);
        }

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, Body::empty()).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None, Body::empty()).await
    }

    pub async fn post_json(&self, uri: &str, payload: &Value) -> TestResponse {
        self.send(
            Method::POST,
            uri,
            Some("application/json"),
            Body::from(payload.to_string()),
        )
        .await
    }

    pub async fn patch_json(&self, uri: &str, payload: &Value) -> TestResponse {
        self.send(
            Method::PATCH,
            uri,
            Some("application/json"),
            Body::from(payload.to_string()),
        )
        .await
    }

    /// Creates a student and returns its id.
    pub async fn create_student(&self, name: &str, age: i64, country: &str, city: &str) -> String {
        let response = self
            .post_json("/students", &student_payload(name, age, country, city))
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.json()["id"]
            .as_str()
            .expect("id is not a string")
            .to_string()
    }
}

pub fn student_payload(name: &str, age: i64, country: &str, city: &str) -> Value {
    json!({
        "name": name,
        "age": age,
        "address": { "country": country, "city": city }
    })
}

pub fn is_object_id_hex(id: &str) -> bool {
    id.len() == 24 && id.chars().all(|c| c.is_ascii_hexdigit())
}

/// A well-formed id that no test ever inserts.
pub const ABSENT_ID: &str = "000000000000000000000000";
