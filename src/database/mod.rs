pub mod manager;
pub mod models;
pub mod repository;
pub mod scope;

pub use manager::{Database, DatabaseError};
pub use scope::Scope;
