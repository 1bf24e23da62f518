#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use movie_review::auth::{CredentialHasher, TokenCodec};
use movie_review::configuration::JwtSettings;
use movie_review::startup::{run, AppState};
use movie_review::store::{CatalogStore, InMemoryStore};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::{json, Value};

pub const PASSWORD: &str = "SecurePass123";
pub const ACCESS_TTL: i64 = 3600;

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub tokens: TokenCodec,
    pub client: reqwest::Client,
}

pub fn test_jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: "integration-test-secret-key-0123456789".to_string(),
        access_token_expiry: ACCESS_TTL,
        refresh_token_expiry: 360000,
    }
}

pub async fn spawn_app() -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    spawn_app_with(store.clone(), store, Duration::from_secs(5)).await
}

/// Serve `served` while the returned `TestApp` keeps a handle on `store`,
/// the in-memory state behind it
pub async fn spawn_app_with(
    store: Arc<InMemoryStore>,
    served: Arc<dyn CatalogStore>,
    store_timeout: Duration,
) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let tokens = TokenCodec::new(&test_jwt_settings());
    let state = AppState {
        store: served,
        tokens: tokens.clone(),
        // Minimum bcrypt cost keeps the suite fast
        hasher: CredentialHasher::new(4),
        store_timeout,
    };

    let server = run(listener, state).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        tokens,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.address, path));
        match token {
            Some(token) => builder.header("Authorization", token),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Response {
        self.request(Method::GET, path, token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post(&self, path: &str, body: &Value, token: Option<&str>) -> Response {
        self.request(Method::POST, path, token)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn put(&self, path: &str, body: &Value, token: Option<&str>) -> Response {
        self.request(Method::PUT, path, token)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Response {
        self.request(Method::DELETE, path, token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Register `username` with a derived email; returns the new user id
    pub async fn signup(&self, username: &str, user_type: &str) -> String {
        let body = json!({
            "name": format!("{} Person", username),
            "username": username,
            "email": format!("{}@example.com", username),
            "password": PASSWORD,
            "user_type": user_type,
        });
        let response = self.post("/users/signup", &body, None).await;
        assert_eq!(201, response.status().as_u16(), "signup of {} failed", username);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["user_id"].as_str().expect("user_id missing").to_string()
    }

    pub async fn login(&self, username: &str) -> Value {
        let body = json!({
            "email": format!("{}@example.com", username),
            "password": PASSWORD,
        });
        let response = self.post("/users/login", &body, None).await;
        assert_eq!(200, response.status().as_u16(), "login of {} failed", username);
        response.json().await.expect("Failed to parse response")
    }

    /// Register and log in; returns (user id, access token)
    pub async fn signup_and_login(&self, username: &str, user_type: &str) -> (String, String) {
        let user_id = self.signup(username, user_type).await;
        let body = self.login(username).await;
        let token = body["token"].as_str().expect("token missing").to_string();
        (user_id, token)
    }
}

pub async fn error_code(response: Response) -> (u16, String, String) {
    let status = response.status().as_u16();
    let body: Value = response.json().await.expect("Error body is not JSON");
    (
        status,
        body["code"].as_str().unwrap_or_default().to_string(),
        body["message"].as_str().unwrap_or_default().to_string(),
    )
}
