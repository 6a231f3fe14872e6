//! Fetch-or-create of the caller's profile.
//!
//! Every authenticated request resolves the identity's profile here. A first
//! sign-in inserts a `pending` profile; when two requests race on that
//! insert, the loser re-reads the row the winner created. An email already
//! held by a profile with a different id is reported, never re-keyed.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{Identity, Role};
use crate::config::BootstrapConfig;
use crate::database::models::{NewProfile, Profile};
use crate::database::{DatabaseError, Scope};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, DatabaseError>;

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, DatabaseError>;

    /// Insert a pending profile. Returns `None` if the id or the email is
    /// already taken.
    async fn create_profile(&self, new: &NewProfile) -> Result<Option<Profile>, DatabaseError>;
}

/// The resolved caller for one request.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub profile: Profile,
    pub role: Role,
    pub dashboard: &'static str,
    /// True when this request created the profile.
    pub created: bool,
}

impl Session {
    pub fn new(profile: Profile, created: bool) -> Self {
        let role = profile.role;
        Self {
            profile,
            role,
            dashboard: role.dashboard_path(),
            created,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.profile.id
    }

    pub fn scope(&self) -> Scope {
        Scope::for_profile(&self.profile)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("identity token carries no email address")]
    MissingEmail,

    #[error("email {email} already belongs to profile {existing}")]
    EmailTaken { email: String, existing: Uuid },

    #[error("profile for user {user_id} not available after {attempts} attempts")]
    Exhausted { user_id: Uuid, attempts: u32 },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub async fn bootstrap_profile<S>(
    store: &S,
    identity: &Identity,
    policy: &BootstrapConfig,
) -> Result<Session, BootstrapError>
where
    S: ProfileStore + ?Sized,
{
    let attempts = policy.max_attempts.max(1);

    for attempt in 1..=attempts {
        if let Some(profile) = store.find_profile(identity.user_id).await? {
            debug!("Resolved profile {} with role {}", profile.id, profile.role);
            return Ok(Session::new(profile, false));
        }

        let email = identity.email.clone().ok_or(BootstrapError::MissingEmail)?;
        let new_profile = NewProfile {
            id: identity.user_id,
            email,
            full_name: identity.full_name.clone(),
        };

        if let Some(profile) = store.create_profile(&new_profile).await? {
            info!("Created pending profile for {} ({})", profile.email, profile.id);
            return Ok(Session::new(profile, true));
        }

        if let Some(holder) = store.find_profile_by_email(&new_profile.email).await? {
            if holder.id != identity.user_id {
                warn!(
                    "Identity {} signed in with {}, which belongs to profile {}",
                    identity.user_id, holder.email, holder.id
                );
                return Err(BootstrapError::EmailTaken {
                    email: new_profile.email,
                    existing: holder.id,
                });
            }
        }

        warn!(
            "Profile insert for {} lost a race (attempt {}/{})",
            identity.user_id, attempt, attempts
        );
        if attempt < attempts && policy.retry_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(policy.retry_delay_ms)).await;
        }
    }

    Err(BootstrapError::Exhausted {
        user_id: identity.user_id,
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<HashMap<Uuid, Profile>>,
        /// Simulate a concurrent request winning the first insert.
        steal_first_insert: bool,
        /// Never expose any row, so every insert looks like a lost race.
        always_conflict: bool,
        inserts: AtomicU32,
    }

    fn to_profile(new: &NewProfile) -> Profile {
        Profile {
            id: new.id,
            email: new.email.clone(),
            full_name: new.full_name.clone(),
            role: Role::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[async_trait]
    impl ProfileStore for MemoryStore {
        async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, DatabaseError> {
            if self.always_conflict {
                return Ok(None);
            }
            Ok(self.rows.lock().await.get(&id).cloned())
        }

        async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, DatabaseError> {
            Ok(self.rows.lock().await.values().find(|p| p.email == email).cloned())
        }

        async fn create_profile(&self, new: &NewProfile) -> Result<Option<Profile>, DatabaseError> {
            let n = self.inserts.fetch_add(1, Ordering::SeqCst);
            if self.always_conflict {
                return Ok(None);
            }
            let mut rows = self.rows.lock().await;
            if self.steal_first_insert && n == 0 {
                rows.insert(new.id, to_profile(new));
                return Ok(None);
            }
            if rows.contains_key(&new.id) || rows.values().any(|p| p.email == new.email) {
                return Ok(None);
            }
            let profile = to_profile(new);
            rows.insert(new.id, profile.clone());
            Ok(Some(profile))
        }
    }

    fn identity(email: Option<&str>) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            email: email.map(str::to_string),
            full_name: Some("Marta Gil".to_string()),
        }
    }

    fn policy() -> BootstrapConfig {
        BootstrapConfig {
            max_attempts: 3,
            retry_delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn first_sign_in_creates_pending_profile() {
        let store = MemoryStore::default();
        let who = identity(Some("marta@example.com"));

        let session = bootstrap_profile(&store, &who, &policy()).await.unwrap();
        assert!(session.created);
        assert_eq!(session.role, Role::Pending);
        assert_eq!(session.dashboard, "/pending");
        assert_eq!(session.profile.email, "marta@example.com");
        assert_eq!(session.profile.full_name.as_deref(), Some("Marta Gil"));
    }

    #[tokio::test]
    async fn existing_profile_keeps_its_role() {
        let store = MemoryStore::default();
        let who = identity(Some("marta@example.com"));
        let mut existing = to_profile(&NewProfile {
            id: who.user_id,
            email: "marta@example.com".to_string(),
            full_name: None,
        });
        existing.role = Role::Lawyer;
        store.rows.lock().await.insert(who.user_id, existing);

        let session = bootstrap_profile(&store, &who, &policy()).await.unwrap();
        assert!(!session.created);
        assert_eq!(session.role, Role::Lawyer);
        assert_eq!(session.dashboard, "/dashboard/abogado");
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn lost_race_rereads_winner_row() {
        let store = MemoryStore {
            steal_first_insert: true,
            ..Default::default()
        };
        let who = identity(Some("marta@example.com"));

        let session = bootstrap_profile(&store, &who, &policy()).await.unwrap();
        assert!(!session.created);
        assert_eq!(session.user_id(), who.user_id);
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let store = MemoryStore {
            always_conflict: true,
            ..Default::default()
        };
        let who = identity(Some("marta@example.com"));

        let err = bootstrap_profile(&store, &who, &policy()).await.unwrap_err();
        assert!(matches!(err, BootstrapError::Exhausted { attempts: 3, .. }));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn email_held_by_another_identity_is_reported() {
        let store = MemoryStore::default();
        let original = identity(Some("marta@example.com"));
        bootstrap_profile(&store, &original, &policy()).await.unwrap();

        // Same person, new account at the identity provider.
        let reregistered = identity(Some("marta@example.com"));
        let err = bootstrap_profile(&store, &reregistered, &policy()).await.unwrap_err();
        match err {
            BootstrapError::EmailTaken { email, existing } => {
                assert_eq!(email, "marta@example.com");
                assert_eq!(existing, original.user_id);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // The original profile is left untouched and no retries were spent.
        assert_eq!(store.inserts.load(Ordering::SeqCst), 2);
        assert_eq!(store.rows.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn new_identity_without_email_cannot_bootstrap() {
        let store = MemoryStore::default();
        let err = bootstrap_profile(&store, &identity(None), &policy()).await.unwrap_err();
        assert!(matches!(err, BootstrapError::MissingEmail));
    }
}
