use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::auth::Role;
use crate::database::models::Profile;

/// Row visibility for one caller, applied in SQL.
///
/// Admins see everything, clients see cases of the companies they own,
/// analysts and lawyers see the cases they are assigned to. Pending users
/// see nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Client(Uuid),
    Staff(Uuid),
    Nothing,
}

impl Scope {
    pub fn for_profile(profile: &Profile) -> Self {
        match profile.role {
            Role::Admin => Scope::All,
            Role::Client => Scope::Client(profile.id),
            Role::Analyst | Role::Lawyer => Scope::Staff(profile.id),
            Role::Pending => Scope::Nothing,
        }
    }

    /// Push a boolean condition over `cases` aliased as `c`.
    pub fn push_case_filter(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match *self {
            Scope::All => {
                qb.push("TRUE");
            }
            Scope::Client(user_id) => {
                qb.push("EXISTS (SELECT 1 FROM companies sc WHERE sc.id = c.company_id AND sc.client_id = ");
                qb.push_bind(user_id);
                qb.push(")");
            }
            Scope::Staff(user_id) => {
                qb.push("(c.analyst_id = ");
                qb.push_bind(user_id);
                qb.push(" OR c.lawyer_id = ");
                qb.push_bind(user_id);
                qb.push(")");
            }
            Scope::Nothing => {
                qb.push("FALSE");
            }
        }
    }

    /// Push a boolean condition over `companies` aliased as `co`.
    pub fn push_company_filter(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match *self {
            Scope::All => {
                qb.push("TRUE");
            }
            Scope::Client(user_id) => {
                qb.push("co.client_id = ");
                qb.push_bind(user_id);
            }
            Scope::Staff(user_id) => {
                qb.push("EXISTS (SELECT 1 FROM cases sc WHERE sc.company_id = co.id AND (sc.analyst_id = ");
                qb.push_bind(user_id);
                qb.push(" OR sc.lawyer_id = ");
                qb.push_bind(user_id);
                qb.push("))");
            }
            Scope::Nothing => {
                qb.push("FALSE");
            }
        }
    }
}
