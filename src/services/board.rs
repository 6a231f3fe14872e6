use serde::Serialize;
use std::cmp::Reverse;

use crate::database::models::{Task, TaskStatus};

#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub count: usize,
    pub tasks: Vec<Task>,
}

/// Kanban view of a set of tasks: one column per status in workflow order.
#[derive(Debug, Clone, Serialize)]
pub struct TaskBoard {
    pub columns: Vec<BoardColumn>,
    pub total: usize,
}

impl TaskBoard {
    /// Within a column: most urgent first, then earliest due date (undated
    /// last), then oldest.
    pub fn build(tasks: Vec<Task>) -> Self {
        let total = tasks.len();
        let mut columns: Vec<BoardColumn> = TaskStatus::ALL
            .iter()
            .map(|status| BoardColumn {
                status: *status,
                count: 0,
                tasks: Vec::new(),
            })
            .collect();

        for task in tasks {
            if let Some(column) = columns.iter_mut().find(|c| c.status == task.status) {
                column.tasks.push(task);
            }
        }

        for column in &mut columns {
            column.tasks.sort_by_key(|t| {
                (
                    Reverse(t.priority),
                    t.due_date.is_none(),
                    t.due_date,
                    t.created_at,
                )
            });
            column.count = column.tasks.len();
        }

        Self { columns, total }
    }

    pub fn column(&self, status: TaskStatus) -> Option<&BoardColumn> {
        self.columns.iter().find(|c| c.status == status)
    }
}
