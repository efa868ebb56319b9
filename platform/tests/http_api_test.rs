//! The HTTP surface: envelopes, error bodies and caller extraction.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use axum_test::TestServer;
use common::Harness;
use http::header::AUTHORIZATION;
use http::{HeaderValue, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use webnovel_platform::identity::{Claims, StaticIdentityProvider};
use webnovel_platform::server::{AppState, build_router};

fn bearer(token: &'static str) -> HeaderValue {
    HeaderValue::from_static(token)
}

fn server(h: &Harness) -> TestServer {
    let identity = StaticIdentityProvider::new()
        .with_token("reader-token", StaticIdentityProvider::verified("reader"))
        .with_token(
            "fresh-token",
            Claims {
                subject: "fresh".into(),
                expires_at: None,
                identity_verified: false,
                email: None,
            },
        )
        .with_refresh("refresh-1");
    let state = AppState::new(h.platform.clone(), Arc::new(identity));
    TestServer::new(build_router(state, Duration::from_secs(5))).unwrap()
}

#[tokio::test]
async fn health_checks_answer_without_a_caller() {
    let h = Harness::new();
    let server = server(&h);

    server.get("/health").await.assert_status_ok();
    server.get("/ready").await.assert_status_ok();
}

#[tokio::test]
async fn missing_token_is_rejected_with_the_platform_code() {
    let h = Harness::new();
    let server = server(&h);

    let response = server.get("/api/cash").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "E4011");

    let unknown = server
        .get("/api/cash")
        .add_header(AUTHORIZATION, bearer("Bearer nobody"))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn balance_comes_wrapped_in_a_data_envelope() {
    let h = Harness::new();
    let reader = h.reader("reader").await;
    h.credit(&reader, 250).await;
    let server = server(&h);

    let response = server
        .get("/api/cash")
        .add_header(AUTHORIZATION, bearer("Bearer reader-token"))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["balance"], 250);
    assert_eq!(body["data"]["userId"], reader.user.id.get());
}

#[tokio::test]
async fn unverified_callers_cannot_buy() {
    let h = Harness::new();
    let work = h.work("author", 0, 1).await;
    let server = server(&h);

    let response = server
        .post(&format!("/api/episodes/{}/purchase", work.episodes[0].id))
        .add_header(AUTHORIZATION, bearer("Bearer fresh-token"))
        .json(&json!({ "profile_id": 1, "own_type": "own" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "E4012");
}

#[tokio::test]
async fn contract_offer_rates_are_validated() {
    let h = Harness::new();
    let work = h.work("author", 0, 1).await;
    let server = server(&h);
    let path = format!("/api/products/{}/contract-offer", work.product.id);

    let rejected = server
        .post(&path)
        .add_header(AUTHORIZATION, bearer("Bearer reader-token"))
        .json(&json!({
            "advance_payment_range": "50~100",
            "cp_profit_rate": 40,
            "author_profit_rate": 70,
            "message": "hi",
        }))
        .await;
    assert_eq!(rejected.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = rejected.json();
    assert_eq!(body["code"], "INVALID_CONTRACT_OFFER_PROFIT_RATE");

    let created = server
        .post(&path)
        .add_header(AUTHORIZATION, bearer("Bearer reader-token"))
        .json(&json!({
            "advance_payment_range": "50~100",
            "cp_profit_rate": 30,
            "author_profit_rate": 70,
            "message": "hi",
        }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn product_pages_are_public() {
    let h = Harness::new();
    let work = h.work("author", 1, 1).await;
    let server = server(&h);

    let response = server
        .get(&format!("/api/products/{}", work.product.id))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["title"], "The Returner");

    let missing = server.get("/api/products/9999").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    let body: Value = missing.json();
    assert_eq!(body["code"], "E4044");
}

#[tokio::test]
async fn refresh_exchanges_known_tokens() {
    let h = Harness::new();
    let server = server(&h);

    let response = server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": "refresh-1" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["accessToken"], "refresh-1-access");

    let unknown = server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": "stale" }))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::UNAUTHORIZED);
}
