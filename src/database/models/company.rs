use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A client organisation. `client_id` is the portal user who owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub tax_id: Option<String>,
    pub contact_email: Option<String>,
    pub client_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCompany {
    pub name: String,
    pub tax_id: Option<String>,
    pub contact_email: Option<String>,
    pub client_id: Option<Uuid>,
}

/// PATCH payload; `null` clears the optional fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::database::models::double_option")]
    pub tax_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::database::models::double_option")]
    pub contact_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::database::models::double_option")]
    pub client_id: Option<Option<Uuid>>,
}
