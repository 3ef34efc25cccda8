//! Shared helpers for the API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use netcrm_api::auth::jwt::{generate_access_token, JwtConfig};
use netcrm_api::config::ServerConfig;
use netcrm_api::router::build_app_router;
use netcrm_api::state::AppState;
use netcrm_core::status::{BillingCycle, LeadStatus, ProductType};
use netcrm_db::models::lead::{CreateLead, Lead};
use netcrm_db::models::product::{CreateProduct, Product};
use netcrm_db::models::user::{CreateUser, User};
use netcrm_db::repositories::{LeadRepo, ProductRepo, UserRepo};
use netcrm_events::EventBus;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        database_url: String::new(),
        database_max_connections: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            access_token_expiry_mins: 60,
        },
        notify_max_attempts: 1,
        bootstrap_admin: None,
    }
}

/// Build the application router and keep a handle on its state, so tests can
/// subscribe to the event bus.
pub fn build_test_app_with_state(pool: PgPool) -> (Router, AppState) {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
    };
    (build_app_router(state.clone(), &config), state)
}

/// Build the full application router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_state(pool).0
}

/// Insert a user with an unusable password hash. Authenticate with [`token_for`].
pub async fn create_user(pool: &PgPool, name: &str, role: &str) -> User {
    insert_user(pool, name, role, "not-a-real-hash".to_string()).await
}

pub async fn insert_user(pool: &PgPool, name: &str, role: &str, password_hash: String) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{}@netcrm.test", name.to_lowercase().replace(' ', ".")),
            password_hash,
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

/// A valid bearer token for `user`.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &user.role, &test_config().jwt)
        .expect("token generation should succeed")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn get(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn get_anonymous(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_json_anonymous(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), None).await
}

pub async fn patch_json(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn lead(pool: &PgPool, name: &str) -> Lead {
    let input = CreateLead {
        name: name.to_string(),
        company: Some(format!("{name} Ltd")),
        ..Default::default()
    };
    LeadRepo::create(pool, &input, LeadStatus::New)
        .await
        .expect("lead creation should succeed")
}

pub async fn product(pool: &PgPool, name: &str, price: &str) -> Product {
    let input = CreateProduct {
        name: name.to_string(),
        product_type: "internet".to_string(),
        price: Some(price.parse().unwrap()),
        speed_mbps: Some(100),
        ..Default::default()
    };
    ProductRepo::create(pool, &input, ProductType::Internet, BillingCycle::Monthly)
        .await
        .expect("product creation should succeed")
}
