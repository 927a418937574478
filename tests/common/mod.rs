// Shared helpers for driving the router without a running server.
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use meal_recipes_api::{
    auth::{Passwords, TokenIssuer},
    memory::InMemoryStore,
    routes::create_router,
    AppState,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub fn test_app() -> Router {
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(
        store.clone(),
        store,
        Passwords::new(4),
        TokenIssuer::new("integration-test-secret", 30),
    );
    create_router(Arc::new(state))
}

pub struct TestRequest {
    method: Method,
    uri: String,
    bearer: Option<String>,
    body: Option<String>,
}

impl TestRequest {
    fn new(method: Method, uri: &str) -> Self {
        Self { method, uri: uri.to_owned(), bearer: None, body: None }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    pub fn put(uri: &str) -> Self {
        Self::new(Method::PUT, uri)
    }

    pub fn delete(uri: &str) -> Self {
        Self::new(Method::DELETE, uri)
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_owned());
        self
    }

    pub fn json<T: Serialize>(mut self, data: &T) -> Self {
        self.body = Some(serde_json::to_string(data).expect("Failed to serialize JSON"));
        self
    }

    /// Sends the given text as a JSON body without checking that it parses.
    pub fn raw_json(mut self, body: &str) -> Self {
        self.body = Some(body.to_owned());
        self
    }

    pub async fn send(self, app: &Router) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        if let Some(token) = self.bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if self.body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(Body::from(self.body.unwrap_or_default()))
            .expect("Failed to build request");

        let response = app.clone().oneshot(request).await.expect("Failed to execute request");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body")
            .to_vec();
        TestResponse { status, body }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Failed to deserialize JSON response")
    }
}

/// Registers a user and logs in, returning `(user_id, token)`.
pub async fn register_and_login(app: &Router, email: &str) -> (String, String) {
    let credentials = json!({ "email": email, "password": "correct horse" });
    let registered = TestRequest::post("/user/register").json(&credentials).send(app).await;
    assert_eq!(registered.status, StatusCode::CREATED);
    let user_id = registered.json()["id"].as_str().unwrap().to_owned();

    let login = TestRequest::post("/user/token").json(&credentials).send(app).await;
    assert_eq!(login.status, StatusCode::OK);
    let token = login.json()["user_token"].as_str().unwrap().to_owned();
    (user_id, token)
}

pub fn meal_body(name: &str) -> Value {
    json!({
        "strMeal": name,
        "strCategory": "Soup",
        "strArea": "British",
        "strInstructions": "Simmer gently.",
        "strMealThumb": null,
        "strTags": null,
        "strYoutube": null,
        "ingredients": ["Water", "Salt"],
        "measures": ["1 l", "1 tsp"],
    })
}

/// Creates a meal as the token's owner and returns its id.
pub async fn create_meal(app: &Router, token: &str, name: &str) -> i64 {
    let created = TestRequest::post("/meal/create").bearer(token).json(&meal_body(name)).send(app).await;
    assert_eq!(created.status, StatusCode::CREATED);
    created.json()["id"].as_i64().unwrap()
}
