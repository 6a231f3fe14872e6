use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{require_admin_middleware, require_assigned_middleware, session_middleware};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        // Public
        .merge(public_routes())
        // Any signed-in user, including pending ones
        .merge(session_routes(state.clone()))
        // Assigned roles
        .merge(workspace_routes(state.clone()))
        // Administrators
        .merge(admin_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security));

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/guard", get(public::guard_get))
}

fn session_routes(state: AppState) -> Router<AppState> {
    use protected::{dashboard, session};

    Router::new()
        .route("/api/auth/session", get(session::session_get))
        .route("/api/auth/profile", patch(session::profile_patch))
        .route("/api/dashboard", get(dashboard::dashboard_get))
        .route_layer(from_fn_with_state(state, session_middleware))
}

fn workspace_routes(state: AppState) -> Router<AppState> {
    use protected::{cases, chat, companies, tasks};

    Router::new()
        // Companies and their BMC risk matrix
        .route("/api/companies", get(companies::list))
        .route("/api/companies/:id", get(companies::get))
        .route("/api/companies/:id/risks", get(companies::risks_get))
        .route("/api/companies/:id/risks/:block", put(companies::risk_put))
        // Cases
        .route("/api/cases", get(cases::list).post(cases::create))
        .route(
            "/api/cases/:id",
            get(cases::get).patch(cases::update).delete(cases::delete),
        )
        .route("/api/cases/:id/board", get(cases::board))
        .route("/api/cases/:id/tasks", get(tasks::list).post(tasks::create))
        .route("/api/cases/:id/messages", get(chat::list).post(chat::post))
        // Tasks
        .route("/api/tasks/:id", patch(tasks::update).delete(tasks::delete))
        .route_layer(from_fn(require_assigned_middleware))
        .route_layer(from_fn_with_state(state, session_middleware))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    use elevated::{companies, profiles};

    Router::new()
        .route("/api/admin/profiles", get(profiles::list))
        .route(
            "/api/admin/profiles/:id",
            get(profiles::get).patch(profiles::update).delete(profiles::delete),
        )
        .route("/api/admin/companies", post(companies::create))
        .route(
            "/api/admin/companies/:id",
            patch(companies::update).delete(companies::delete),
        )
        .route_layer(from_fn(require_admin_middleware))
        .route_layer(from_fn_with_state(state, session_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::offline_state;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app(offline_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn root_describes_service() {
        let (status, body) = send(get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "Legality360 API");
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        for uri in ["/api/auth/session", "/api/dashboard", "/api/cases", "/api/admin/profiles"] {
            let (status, body) = send(get(uri)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["success"], false);
            assert_eq!(body["code"], "UNAUTHORIZED");
        }
    }

    #[tokio::test]
    async fn invalid_token_is_rejected_before_database() {
        let request = Request::builder()
            .uri("/api/companies")
            .header("authorization", "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid or expired session");
    }

    #[tokio::test]
    async fn guard_redirects_signed_out_callers() {
        let (status, body) = send(get("/auth/guard?path=/dashboard/admin")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["authenticated"], false);
        assert_eq!(body["data"]["decision"]["action"], "redirect");
        assert_eq!(body["data"]["decision"]["target"], "/login");
    }

    #[tokio::test]
    async fn guard_treats_bad_token_as_signed_out() {
        let request = Request::builder()
            .uri("/auth/guard?path=/login")
            .header("authorization", "Bearer garbage")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["decision"]["action"], "allow");
    }

    #[tokio::test]
    async fn health_reports_unreachable_database() {
        let (status, body) = send(get("/health")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["data"]["status"], "degraded");
    }

    #[tokio::test]
    async fn valid_token_without_database_is_unavailable() {
        let state = offline_state();
        let token = crate::auth::issue_token(
            &state.config.identity,
            uuid::Uuid::new_v4(),
            "nuevo@example.com",
            None,
        )
        .unwrap();
        let request = Request::builder()
            .uri("/api/auth/session")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    async fn allowed_origin(state: AppState, origin: &str) -> Option<String> {
        let request = Request::builder()
            .uri("/")
            .header("origin", origin)
            .body(Body::empty())
            .unwrap();
        let response = app(state).oneshot(request).await.unwrap();
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn cors_allows_only_configured_origins() {
        let mut state = offline_state();
        let mut config = (*state.config).clone();
        config.security.enable_cors = true;
        config.security.cors_origins = vec!["https://portal.legality360.com".to_string()];
        state.config = std::sync::Arc::new(config);

        assert_eq!(
            allowed_origin(state.clone(), "https://portal.legality360.com").await.as_deref(),
            Some("https://portal.legality360.com")
        );
        assert_eq!(allowed_origin(state, "https://evil.example").await, None);
    }

    #[tokio::test]
    async fn cors_wildcard_and_disabled() {
        let mut state = offline_state();
        let mut config = (*state.config).clone();
        config.security.enable_cors = true;
        config.security.cors_origins = vec!["*".to_string()];
        state.config = std::sync::Arc::new(config.clone());
        assert_eq!(allowed_origin(state.clone(), "https://any.example").await.as_deref(), Some("*"));

        config.security.enable_cors = false;
        state.config = std::sync::Arc::new(config);
        assert_eq!(allowed_origin(state, "https://any.example").await, None);
    }
}
