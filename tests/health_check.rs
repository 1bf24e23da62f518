//! Integration tests for the public, unauthenticated endpoints

mod helpers;

use helpers::spawn_app;
use serde_json::Value;

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;

    let response = app.get("/health_check", None).await;

    assert!(response.status().is_success());
    assert_eq!("", response.text().await.unwrap());
}

#[tokio::test]
async fn api_returns_welcome_message() {
    let app = spawn_app().await;

    let response = app.get("/api", None).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Welcome to the movie review API");
}

#[tokio::test]
async fn every_response_carries_a_request_id() {
    let app = spawn_app().await;

    let first = app.get("/health_check", None).await;
    let second = app.get("/health_check", None).await;

    let a = first.headers().get("x-request-id").expect("missing request id").clone();
    let b = second.headers().get("x-request-id").expect("missing request id").clone();
    assert_ne!(a, b);
}

#[tokio::test]
async fn rejected_protected_requests_still_carry_a_request_id() {
    let app = spawn_app().await;

    let missing = app.get("/genres", None).await;
    let invalid = app.get("/genres", Some("garbage")).await;

    for response in [missing, invalid] {
        assert_eq!(401, response.status().as_u16());
        let id = response
            .headers()
            .get("x-request-id")
            .expect("missing request id")
            .to_str()
            .unwrap()
            .to_string();
        assert!(uuid::Uuid::parse_str(&id).is_ok());

        let body: Value = response.json().await.unwrap();
        assert!(body["code"].as_str().is_some());
    }
}
