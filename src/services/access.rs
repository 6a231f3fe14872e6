//! Write permissions. Read visibility is handled by [`Scope`] in SQL; these
//! checks run after the row has been loaded through that scope.
//!
//! [`Scope`]: crate::database::Scope

use crate::auth::{Role, Session};
use crate::database::models::{Case, CaseStatus, CaseUpdate, Profile};
use crate::error::ApiError;

pub fn can_create_case(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Lawyer)
}

/// Admins, or the analyst / lawyer assigned to the case.
pub fn can_work_case(session: &Session, case: &Case) -> bool {
    session.role.is_admin() || (session.role.is_staff() && case.is_assigned_to(session.user_id()))
}

pub fn ensure_can_work_case(session: &Session, case: &Case) -> Result<(), ApiError> {
    if can_work_case(session, case) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Only the assigned team or an administrator may modify this case"))
    }
}

/// Validate a case update against the caller and the status lifecycle.
pub fn check_case_update(session: &Session, case: &Case, update: &CaseUpdate) -> Result<(), ApiError> {
    ensure_can_work_case(session, case)?;

    if update.changes_assignment() && !session.role.is_admin() {
        return Err(ApiError::forbidden("Only administrators may reassign a case"));
    }

    if let Some(next) = update.status {
        check_transition(session.role, case.status, next)?;
    }

    if let Some(title) = &update.title {
        if title.trim().is_empty() {
            return Err(ApiError::field_error("title", "Title cannot be empty"));
        }
    }

    Ok(())
}

pub fn check_transition(role: Role, current: CaseStatus, next: CaseStatus) -> Result<(), ApiError> {
    if !current.can_transition_to(next) {
        return Err(ApiError::field_error(
            "status",
            format!("Cannot move a case from '{}' to '{}'", current.as_str(), next.as_str()),
        ));
    }
    if current.is_reopen(next) && !role.is_admin() {
        return Err(ApiError::forbidden("Only administrators may reopen a closed case"));
    }
    Ok(())
}

/// Risk assessments may be written by admins and by staff working any case
/// of the company.
pub fn can_assess_risk(role: Role, assigned_to_company: bool) -> bool {
    role.is_admin() || (role.is_staff() && assigned_to_company)
}

/// The role a profile must hold to fill an assignment field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Analyst,
    Lawyer,
    /// Task assignees: analysts, lawyers or administrators.
    Team,
    /// Company owners.
    Client,
}

impl Assignment {
    pub fn accepts(&self, role: Role) -> bool {
        match self {
            Assignment::Analyst => role.is_analyst(),
            Assignment::Lawyer => role.is_lawyer(),
            Assignment::Team => role.is_staff() || role.is_admin(),
            Assignment::Client => role.is_client(),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Assignment::Analyst => "an analyst",
            Assignment::Lawyer => "a lawyer",
            Assignment::Team => "an analyst, lawyer or administrator",
            Assignment::Client => "a client",
        }
    }
}

/// `profile` is the row `field` points at, `None` when it does not exist.
pub fn check_assignment(field: &str, profile: Option<&Profile>, kind: Assignment) -> Result<(), ApiError> {
    match profile {
        Some(profile) if kind.accepts(profile.role) => Ok(()),
        Some(profile) => Err(ApiError::field_error(
            field,
            format!("Profile {} is '{}', expected {}", profile.id, profile.role, kind.describe()),
        )),
        None => Err(ApiError::field_error(field, "Referenced profile does not exist")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Profile;
    use chrono::Utc;
    use uuid::Uuid;

    fn session(role: Role) -> Session {
        Session::new(
            Profile {
                id: Uuid::new_v4(),
                email: "s@example.com".to_string(),
                full_name: None,
                role,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            false,
        )
    }

    fn case(status: CaseStatus, analyst: Option<Uuid>, lawyer: Option<Uuid>) -> Case {
        Case {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            title: "Due diligence".to_string(),
            description: None,
            status,
            analyst_id: analyst,
            lawyer_id: lawyer,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn assigned_staff_can_work_case() {
        let analyst = session(Role::Analyst);
        let mine = case(CaseStatus::Abierto, Some(analyst.user_id()), None);
        let theirs = case(CaseStatus::Abierto, Some(Uuid::new_v4()), None);
        assert!(can_work_case(&analyst, &mine));
        assert!(!can_work_case(&analyst, &theirs));
        assert!(can_work_case(&session(Role::Admin), &theirs));
    }

    #[test]
    fn clients_never_work_cases() {
        let client = session(Role::Client);
        let c = case(CaseStatus::Abierto, Some(client.user_id()), Some(client.user_id()));
        assert!(!can_work_case(&client, &c));
    }

    #[test]
    fn status_changes_follow_lifecycle() {
        let lawyer = session(Role::Lawyer);
        let c = case(CaseStatus::Abierto, None, Some(lawyer.user_id()));

        let skip = CaseUpdate {
            status: Some(CaseStatus::Cerrado),
            ..Default::default()
        };
        assert!(matches!(
            check_case_update(&lawyer, &c, &skip),
            Err(ApiError::ValidationError { .. })
        ));

        let step = CaseUpdate {
            status: Some(CaseStatus::EnProgreso),
            ..Default::default()
        };
        assert!(check_case_update(&lawyer, &c, &step).is_ok());
    }

    #[test]
    fn only_admins_reopen_or_reassign() {
        let lawyer = session(Role::Lawyer);
        let closed = case(CaseStatus::Cerrado, None, Some(lawyer.user_id()));
        let reopen = CaseUpdate {
            status: Some(CaseStatus::Abierto),
            ..Default::default()
        };
        assert!(matches!(
            check_case_update(&lawyer, &closed, &reopen),
            Err(ApiError::Forbidden(_))
        ));
        assert!(check_case_update(&session(Role::Admin), &closed, &reopen).is_ok());

        let reassign = CaseUpdate {
            analyst_id: Some(Some(Uuid::new_v4())),
            ..Default::default()
        };
        assert!(check_case_update(&lawyer, &closed, &reassign).is_err());
    }

    #[test]
    fn creating_cases_and_assessing_risk() {
        assert!(can_create_case(Role::Admin));
        assert!(can_create_case(Role::Lawyer));
        assert!(!can_create_case(Role::Analyst));
        assert!(can_assess_risk(Role::Analyst, true));
        assert!(!can_assess_risk(Role::Analyst, false));
        assert!(!can_assess_risk(Role::Client, true));
    }

    #[test]
    fn assignments_require_matching_role() {
        let analyst = session(Role::Analyst).profile;
        let client = session(Role::Client).profile;
        let pending = session(Role::Pending).profile;
        let admin = session(Role::Admin).profile;

        assert!(check_assignment("analyst_id", Some(&analyst), Assignment::Analyst).is_ok());
        assert!(check_assignment("lawyer_id", Some(&analyst), Assignment::Lawyer).is_err());
        assert!(check_assignment("assignee_id", Some(&admin), Assignment::Team).is_ok());
        assert!(check_assignment("assignee_id", Some(&client), Assignment::Team).is_err());
        assert!(check_assignment("assignee_id", Some(&pending), Assignment::Team).is_err());
        assert!(check_assignment("client_id", Some(&client), Assignment::Client).is_ok());

        let missing = check_assignment("analyst_id", None, Assignment::Analyst);
        assert!(matches!(missing, Err(ApiError::ValidationError { .. })));
    }
}
