mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn admin_manages_entreprises() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.admin_token().await?;

    let (status, body) = server
        .post(
            "/api/admin/entreprises",
            &admin,
            json!({ "name": "Café Dupont & Fils", "password": "dupont-password" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["slug"], "cafe-dupont-fils");

    let (status, body) = server
        .post(
            "/api/admin/entreprises",
            &admin,
            json!({ "slug": "cafe-dupont-fils", "name": "Other", "password": "other-password" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(common::error_code(&body), "CONFLICT");

    let (status, body) = server
        .post(
            "/api/admin/entreprises",
            &admin,
            json!({ "slug": "Bad Slug", "name": "Other", "password": "other-password" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["slug"].is_string());

    let (status, body) = server.get("/api/admin/entreprises", &admin).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // the new tenant can log in, then disappears with its data
    let token = server.login("cafe-dupont-fils", "dupont-password").await?;
    let (status, _) = server.post("/api/contacts", &token, json!({ "name": "Client" })).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = server.delete("/api/admin/entreprises/cafe-dupont-fils", &admin).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = server.delete("/api/admin/entreprises/cafe-dupont-fils", &admin).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.get("/api/entreprise", &token).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn tokens_of_deleted_entreprise_stop_working() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.admin_token().await?;
    let token = server.entreprise_token("alpha").await?;

    let (status, _) = server.delete("/api/admin/entreprises/alpha", &admin).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = server.post("/api/contacts", &token, json!({ "name": "Orphan" })).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(common::error_code(&body), "UNAUTHORIZED");

    let (status, _) = server.get("/api/contacts", &token).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // a new entreprise reusing the slug starts empty
    let token = server.entreprise_token("alpha").await?;
    let (status, body) = server.get("/api/contacts", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn owners_cannot_use_admin_routes() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.entreprise_token("alpha").await?;

    let (status, body) = server.get("/api/admin/entreprises", &token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(common::error_code(&body), "FORBIDDEN");

    let (status, _) = server
        .post("/api/admin/entreprises", &token, json!({ "name": "Sneaky", "password": "sneaky-pass" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}
