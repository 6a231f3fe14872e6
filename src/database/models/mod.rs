pub mod case;
pub mod chat;
pub mod company;
pub mod profile;
pub mod risk;
pub mod task;

pub use case::{Case, CaseStatus, CaseUpdate, NewCase};
pub use chat::{ChatMessage, NewChatMessage};
pub use company::{Company, CompanyUpdate, NewCompany};
pub use profile::{NewProfile, Profile, ProfileUpdate};
pub use risk::{BmcBlock, RiskAssessment, RiskInput, RiskLevel};
pub use task::{NewTask, Task, TaskPriority, TaskStatus, TaskUpdate};

use serde::{Deserialize, Deserializer};

/// Distinguish an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in PATCH payloads, so nullable columns can be cleared.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
