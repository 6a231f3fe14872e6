use serde::Serialize;

use super::board::TaskBoard;
use crate::auth::{Role, Session};
use crate::database::models::{Case, CaseStatus, Company, Profile};
use crate::database::repository::CaseFilter;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: CaseStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleCount {
    pub role: Role,
    pub count: i64,
}

/// Landing screen content, one variant per role family.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Dashboard {
    Pending {
        email: String,
        message: &'static str,
    },
    Client {
        companies: Vec<Company>,
        cases: Vec<Case>,
        open_tasks: i64,
    },
    Staff {
        role: Role,
        cases: Vec<Case>,
        cases_by_status: Vec<StatusCount>,
        my_tasks: TaskBoard,
    },
    Admin {
        profiles_by_role: Vec<RoleCount>,
        pending_profiles: Vec<Profile>,
        cases_by_status: Vec<StatusCount>,
        companies: i64,
    },
}

pub const PENDING_MESSAGE: &str = "Your account has been created and is waiting for an administrator to assign a role.";

pub async fn build_dashboard(state: &AppState, session: &Session) -> Result<Dashboard, ApiError> {
    let scope = session.scope();
    let limit = state.config.api.max_page_size;

    let dashboard = match session.role {
        Role::Pending => Dashboard::Pending {
            email: session.profile.email.clone(),
            message: PENDING_MESSAGE,
        },
        Role::Client => Dashboard::Client {
            companies: state.companies().list(scope, limit, 0).await?,
            cases: state.cases().list(scope, &CaseFilter::default(), limit, 0).await?,
            open_tasks: state.tasks().count_open(scope).await?,
        },
        Role::Analyst | Role::Lawyer => Dashboard::Staff {
            role: session.role,
            cases: state.cases().list(scope, &CaseFilter::default(), limit, 0).await?,
            cases_by_status: status_counts(state.cases().count_by_status(scope).await?),
            my_tasks: TaskBoard::build(state.tasks().list_for_assignee(session.user_id()).await?),
        },
        Role::Admin => Dashboard::Admin {
            profiles_by_role: state
                .profiles()
                .count_by_role()
                .await?
                .into_iter()
                .map(|(role, count)| RoleCount { role, count })
                .collect(),
            pending_profiles: state.profiles().list(Some(Role::Pending), limit, 0).await?,
            cases_by_status: status_counts(state.cases().count_by_status(scope).await?),
            companies: state.companies().count().await?,
        },
    };

    Ok(dashboard)
}

fn status_counts(rows: Vec<(CaseStatus, i64)>) -> Vec<StatusCount> {
    rows.into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect()
}
