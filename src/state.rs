use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::repository::{
    CaseRepository, ChatRepository, CompanyRepository, ProfileRepository, RiskRepository, TaskRepository,
};
use crate::database::Database;

/// Shared handler state: configuration plus the database handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Database,
}

impl AppState {
    pub fn new(config: AppConfig, db: Database) -> Self {
        Self {
            config: Arc::new(config),
            db,
        }
    }

    pub fn profiles(&self) -> ProfileRepository {
        ProfileRepository::new(self.db.pool().clone())
    }

    pub fn companies(&self) -> CompanyRepository {
        CompanyRepository::new(self.db.pool().clone())
    }

    pub fn cases(&self) -> CaseRepository {
        CaseRepository::new(self.db.pool().clone())
    }

    pub fn tasks(&self) -> TaskRepository {
        TaskRepository::new(self.db.pool().clone())
    }

    pub fn chat(&self) -> ChatRepository {
        ChatRepository::new(self.db.pool().clone())
    }

    pub fn risks(&self) -> RiskRepository {
        RiskRepository::new(self.db.pool().clone())
    }
}
