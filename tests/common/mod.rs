#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use entreprise_api::config::AppConfig;
use entreprise_api::database::MemoryStore;
use entreprise_api::state::AppState;

pub const ADMIN_PASSWORD: &str = "integration-admin-password";
pub const ENTREPRISE_PASSWORD: &str = "entreprise-password";

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

/// Start the app in-process on a free port, backed by a fresh memory store.
pub async fn spawn_server() -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let mut config = AppConfig::development();
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.security.admin_password = Some(ADMIN_PASSWORD.to_string());
    config.api.enable_request_logging = false;

    let state = AppState::new(config, Arc::new(MemoryStore::new()));
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, entreprise_api::app(state)).await;
    });

    let server = TestServer {
        base_url,
        client: reqwest::Client::new(),
    };
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

impl TestServer {
    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return the status with the parsed body
    /// (`Value::Null` for empty bodies).
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut req = self.client.request(method, self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).with_context(|| format!("non-JSON body: {}", text))?
        };
        Ok((status, value))
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::DELETE, path, Some(token), None).await
    }

    pub async fn admin_token(&self) -> Result<String> {
        let (status, body) = self
            .call(Method::POST, "/auth/login", None, Some(json!({ "password": ADMIN_PASSWORD })))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "admin login failed: {} {}", status, body);
        token_of(&body)
    }

    /// Create an entreprise through the admin API and log in as it.
    pub async fn entreprise_token(&self, slug: &str) -> Result<String> {
        let admin = self.admin_token().await?;
        let (status, body) = self
            .post(
                "/api/admin/entreprises",
                &admin,
                json!({
                    "slug": slug,
                    "name": format!("Entreprise {}", slug),
                    "email": format!("contact@{}.example.fr", slug),
                    "password": ENTREPRISE_PASSWORD,
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create entreprise failed: {} {}", status, body);
        self.login(slug, ENTREPRISE_PASSWORD).await
    }

    pub async fn login(&self, slug: &str, password: &str) -> Result<String> {
        let (status, body) = self
            .call(
                Method::POST,
                &format!("/auth/login/{}", slug),
                None,
                Some(json!({ "password": password })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {} {}", status, body);
        token_of(&body)
    }
}

fn token_of(body: &Value) -> Result<String> {
    body["data"]["token"]
        .as_str()
        .map(str::to_string)
        .context("response has no data.token")
}

/// Assert the standard error envelope and return its code.
pub fn error_code(body: &Value) -> &str {
    assert_eq!(body["success"], false, "expected error envelope: {}", body);
    assert!(body["error"].is_string(), "missing error message: {}", body);
    body["code"].as_str().unwrap_or_default()
}
