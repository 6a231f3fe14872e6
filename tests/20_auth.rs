mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn protected_routes_reject_missing_token() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    for path in ["/api/auth/session", "/api/dashboard", "/api/companies", "/api/admin/profiles"] {
        let resp = client.get(server.url(path)).send().await?;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{path}");

        let body: Value = resp.json().await?;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn rejects_non_bearer_and_forged_tokens() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let resp = client
        .get(server.url("/api/auth/session"))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Signed with a different secret than the server's
    let mut identity = legality360::config::AppConfig::development().identity;
    identity.jwt_secret = "some-other-secret".to_string();
    let forged = legality360::auth::issue_token(&identity, uuid::Uuid::new_v4(), "x@example.com", None)?;

    let resp = client
        .get(server.url("/api/auth/session"))
        .bearer_auth(forged)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await?;
    assert_eq!(body["error"], "Invalid or expired session");
    Ok(())
}

#[tokio::test]
async fn valid_token_reaches_profile_lookup() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    // The token verifies; the profile store is unreachable.
    let resp = client
        .get(server.url("/api/auth/session"))
        .bearer_auth(common::token_for("nueva@example.com"))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    Ok(())
}

#[tokio::test]
async fn guard_answers_for_signed_out_callers() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let resp = client
        .get(server.url("/auth/guard"))
        .query(&[("path", "/dashboard/abogado")])
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["data"]["authenticated"], false);
    assert_eq!(body["data"]["decision"]["action"], "redirect");
    assert_eq!(body["data"]["decision"]["target"], "/login");

    let resp = client
        .get(server.url("/auth/guard"))
        .query(&[("path", "/register")])
        .send()
        .await?;
    let body: Value = resp.json().await?;
    assert_eq!(body["data"]["decision"]["action"], "allow");
    Ok(())
}
