//! In-process app wired to the database named by `DATABASE_URL`.
//!
//! Tests that need real SQL call [`connect`] and return early when it yields
//! `None`, so the suite still passes on machines without Postgres. Every
//! fixture uses fresh ids and emails; tests share one database and run in
//! parallel.

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use legality360::app::app;
use legality360::auth::{issue_token, Role};
use legality360::config::AppConfig;
use legality360::database::models::{Case, Company, NewCase, NewCompany, NewProfile, Profile, ProfileUpdate};
use legality360::database::Database;
use legality360::state::AppState;

pub struct LiveApp {
    pub state: AppState,
    pub router: Router,
}

pub async fn connect() -> Result<Option<LiveApp>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database-backed test");
        return Ok(None);
    };

    let mut config = AppConfig::development();
    config.database.url = url;
    config.database.max_connections = 5;
    config.database.connection_timeout = 5;
    config.bootstrap.retry_delay_ms = 10;

    let db = Database::connect_lazy(&config.database)?;
    db.migrate().await.context("failed to migrate test database")?;

    let state = AppState::new(config, db);
    Ok(Some(LiveApp {
        router: app(state.clone()),
        state,
    }))
}

impl LiveApp {
    pub fn token(&self, user_id: Uuid, email: &str) -> Result<String> {
        Ok(issue_token(&self.state.config.identity, user_id, email, None)?)
    }

    /// A profile with `role` and a token that resolves to it.
    pub async fn user(&self, role: Role) -> Result<(Profile, String)> {
        let id = Uuid::new_v4();
        let email = format!("{}@test.legality360.com", id.simple());
        let profile = self
            .state
            .profiles()
            .insert_if_absent(&NewProfile {
                id,
                email: email.clone(),
                full_name: Some(format!("Test {}", role)),
            })
            .await?
            .context("fresh profile collided")?;

        let profile = if role == Role::Pending {
            profile
        } else {
            self.state
                .profiles()
                .update(
                    profile.id,
                    &ProfileUpdate {
                        role: Some(role),
                        ..Default::default()
                    },
                )
                .await?
        };

        let token = self.token(profile.id, &email)?;
        Ok((profile, token))
    }

    pub async fn company(&self, client_id: Option<Uuid>) -> Result<Company> {
        Ok(self
            .state
            .companies()
            .insert(&NewCompany {
                name: format!("Empresa {}", Uuid::new_v4().simple()),
                tax_id: None,
                contact_email: None,
                client_id,
            })
            .await?)
    }

    pub async fn case(&self, company_id: Uuid, analyst_id: Option<Uuid>, lawyer_id: Option<Uuid>) -> Result<Case> {
        Ok(self
            .state
            .cases()
            .insert(&NewCase {
                company_id,
                title: "Revisión societaria".to_string(),
                description: None,
                analyst_id,
                lawyer_id,
            })
            .await?)
    }

    pub async fn send(&self, method: Method, uri: &str, token: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {token}"));
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Ok((status, body))
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, token, None).await
    }
}

/// The `id` of every object in `body["data"]`.
pub fn ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
