mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn entreprises_cannot_see_each_others_rows() -> Result<()> {
    let server = common::spawn_server().await?;
    let alpha = server.entreprise_token("alpha").await?;
    let beta = server.entreprise_token("beta").await?;

    let (_, contact) = server.post("/api/contacts", &alpha, json!({ "name": "Secret client" })).await?;
    let contact_id = contact["data"]["id"].as_str().unwrap().to_string();
    let (_, mission) = server.post("/api/missions", &alpha, json!({ "title": "Secret mission" })).await?;
    let mission_id = mission["data"]["id"].as_str().unwrap().to_string();

    let (_, list) = server.get("/api/contacts", &beta).await?;
    assert!(list["data"].as_array().unwrap().is_empty());

    let (status, _) = server.get(&format!("/api/contacts/{}", contact_id), &beta).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = server
        .put(&format!("/api/contacts/{}", contact_id), &beta, json!({ "name": "pwned" }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = server.delete(&format!("/api/contacts/{}", contact_id), &beta).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // cannot point own rows at another tenant's rows
    let (status, body) = server
        .post("/api/missions", &beta, json!({ "title": "Mine", "client_id": contact_id }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["client_id"].is_string());
    let (status, _) = server
        .post("/api/factures", &beta, json!({ "mission_id": mission_id, "amount_ht": "1" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server.get(&format!("/api/contacts/{}", contact_id), &alpha).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Secret client");
    Ok(())
}

#[tokio::test]
async fn own_entreprise_can_be_updated() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.entreprise_token("alpha").await?;

    let (status, body) = server
        .put("/api/entreprise", &token, json!({ "name": "Alpha Conseil", "siret": "732 829 320 00074" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Alpha Conseil");
    assert_eq!(body["data"]["siret"], "73282932000074");
    assert_eq!(body["data"]["slug"], "alpha");
    assert!(body["data"].get("password_hash").is_none());
    Ok(())
}
