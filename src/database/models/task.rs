use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pendiente,
    EnProgreso,
    Completada,
}

impl TaskStatus {
    /// Kanban column order.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pendiente, TaskStatus::EnProgreso, TaskStatus::Completada];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Baja,
    #[default]
    Media,
    Alta,
    Urgente,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub case_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
    #[serde(default)]
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
}

/// PATCH payload; `null` clears description, assignee or due date.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::database::models::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::database::models::double_option")]
    pub assignee_id: Option<Option<Uuid>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "crate::database::models::double_option")]
    pub due_date: Option<Option<NaiveDate>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_by_urgency() {
        assert!(TaskPriority::Urgente > TaskPriority::Alta);
        assert!(TaskPriority::Alta > TaskPriority::Media);
        assert!(TaskPriority::Media > TaskPriority::Baja);
    }

    #[test]
    fn new_task_defaults_to_medium_priority() {
        let task: NewTask = serde_json::from_value(serde_json::json!({ "title": "Revisar contrato" })).unwrap();
        assert_eq!(task.priority, TaskPriority::Media);
        assert!(task.due_date.is_none());
    }

    #[test]
    fn update_can_clear_due_date() {
        let update: TaskUpdate = serde_json::from_value(serde_json::json!({ "due_date": null })).unwrap();
        assert_eq!(update.due_date, Some(None));
        assert_eq!(update.assignee_id, None);

        let update: TaskUpdate = serde_json::from_value(serde_json::json!({ "due_date": "2026-03-01" })).unwrap();
        assert_eq!(update.due_date, Some(NaiveDate::from_ymd_opt(2026, 3, 1)));
    }
}
