pub mod access;
pub mod board;
pub mod dashboard;
pub mod risk_matrix;

pub use board::TaskBoard;
pub use dashboard::{build_dashboard, Dashboard};
pub use risk_matrix::RiskMatrix;
