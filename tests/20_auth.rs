mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn admin_login_checks_environment_secret() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, body) = server
        .call(Method::POST, "/auth/login", None, Some(json!({ "password": "wrong" })))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(common::error_code(&body), "UNAUTHORIZED");

    let (status, body) = server
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "password": common::ADMIN_PASSWORD })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert!(body["data"]["expires_in"].as_i64().unwrap() > 0);
    Ok(())
}

#[tokio::test]
async fn login_requires_a_json_body() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, body) = server.call(Method::POST, "/auth/login", None, None).await?;
    assert!(status.is_client_error(), "unexpected status {}", status);
    assert_eq!(common::error_code(&body), "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn entreprise_login_and_whoami() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.entreprise_token("acme").await?;

    let (status, body) = server.get("/api/auth/whoami", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "owner");
    assert_eq!(body["data"]["slug"], "acme");

    // wrong password and unknown slug look the same
    let (status, wrong_pw) = server
        .call(Method::POST, "/auth/login/acme", None, Some(json!({ "password": "nope-nope" })))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, unknown) = server
        .call(Method::POST, "/auth/login/ghost", None, Some(json!({ "password": "nope-nope" })))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, unknown);
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, body) = server.call(Method::GET, "/api/contacts", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(common::error_code(&body), "UNAUTHORIZED");

    let (status, _) = server.get("/api/contacts", "not.a.token").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .get(server.url("/api/contacts"))
        .header("Authorization", "Basic YWRtaW46YWRtaW4=")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admin_token_cannot_use_tenant_endpoints() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.admin_token().await?;

    let (status, body) = server.get("/api/contacts", &admin).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(common::error_code(&body), "FORBIDDEN");
    Ok(())
}
