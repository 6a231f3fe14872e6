pub mod auth;
pub mod response;

pub use auth::{
    bearer_token, require_admin_middleware, require_assigned_middleware, require_roles, resolve_session,
    session_middleware,
};
pub use response::{ApiResponse, ApiResult};
