use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "case_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Abierto,
    EnProgreso,
    EnRevision,
    Cerrado,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 4] = [
        CaseStatus::Abierto,
        CaseStatus::EnProgreso,
        CaseStatus::EnRevision,
        CaseStatus::Cerrado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Abierto => "abierto",
            CaseStatus::EnProgreso => "en_progreso",
            CaseStatus::EnRevision => "en_revision",
            CaseStatus::Cerrado => "cerrado",
        }
    }

    /// Whether moving from `self` to `next` follows the case lifecycle.
    ///
    /// Forward moves go one step at a time. A case under review can be sent
    /// back to work, and a closed case can be reopened; reopening is further
    /// restricted to administrators by the caller.
    pub fn can_transition_to(&self, next: CaseStatus) -> bool {
        use CaseStatus::*;
        matches!(
            (self, next),
            (Abierto, Abierto)
                | (EnProgreso, EnProgreso)
                | (EnRevision, EnRevision)
                | (Cerrado, Cerrado)
                | (Abierto, EnProgreso)
                | (EnProgreso, EnRevision)
                | (EnRevision, Cerrado)
                | (EnRevision, EnProgreso)
                | (Cerrado, Abierto)
        )
    }

    pub fn is_reopen(&self, next: CaseStatus) -> bool {
        matches!((self, next), (CaseStatus::Cerrado, CaseStatus::Abierto))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Case {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: CaseStatus,
    pub analyst_id: Option<Uuid>,
    pub lawyer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Case {
    pub fn is_assigned_to(&self, user_id: Uuid) -> bool {
        self.analyst_id == Some(user_id) || self.lawyer_id == Some(user_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCase {
    pub company_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub analyst_id: Option<Uuid>,
    pub lawyer_id: Option<Uuid>,
}

/// PATCH payload. For the nullable columns an explicit `null` clears the
/// value and an absent field leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseUpdate {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::database::models::double_option")]
    pub description: Option<Option<String>>,
    pub status: Option<CaseStatus>,
    #[serde(default, deserialize_with = "crate::database::models::double_option")]
    pub analyst_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "crate::database::models::double_option")]
    pub lawyer_id: Option<Option<Uuid>>,
}

impl CaseUpdate {
    pub fn changes_assignment(&self) -> bool {
        self.analyst_id.is_some() || self.lawyer_id.is_some()
    }
}
