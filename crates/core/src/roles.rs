//! Helpdesk roles and the permissions each one grants.
//!
//! Role names are stored as lower-case text in `users.role` and
//! `authorized_emails.allowed_role`; the string forms below must match the
//! `CHECK` constraints in the initial migration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_USER: &str = "user";
pub const ROLE_TECHNICIAN: &str = "technician";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_AUDITOR: &str = "auditor";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_USER, ROLE_TECHNICIAN, ROLE_ADMIN, ROLE_AUDITOR];

/// A helpdesk role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Technician,
    Admin,
    Auditor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Technician => ROLE_TECHNICIAN,
            Role::Admin => ROLE_ADMIN,
            Role::Auditor => ROLE_AUDITOR,
        }
    }

    /// Admins and technicians work tickets; everyone else only files them.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Technician)
    }

    pub fn permissions(self) -> Permissions {
        Permissions::for_role(self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            ROLE_USER => Ok(Role::User),
            ROLE_TECHNICIAN => Ok(Role::Technician),
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_AUDITOR => Ok(Role::Auditor),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {VALID_ROLES:?}"
            ))),
        }
    }
}

/// Capabilities derived from a [`Role`].
///
/// Returned verbatim by `GET /auth/me` so the client can hide actions the
/// server would reject anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub is_staff: bool,
    pub can_view_all_tickets: bool,
    pub can_edit_tickets: bool,
    pub can_delete_tickets: bool,
    pub can_change_priority: bool,
    pub can_change_status: bool,
    pub can_assign_tickets: bool,
    pub can_see_internal_messages: bool,
    pub can_upload_files: bool,
    pub can_view_reports: bool,
    pub can_manage_authorized_emails: bool,
}

impl Permissions {
    pub fn for_role(role: Role) -> Self {
        let staff = role.is_staff();
        let admin = role == Role::Admin;
        Self {
            is_staff: staff,
            can_view_all_tickets: staff || role == Role::Auditor,
            can_edit_tickets: staff,
            can_delete_tickets: admin,
            can_change_priority: staff,
            can_change_status: staff,
            can_assign_tickets: staff,
            can_see_internal_messages: staff,
            can_upload_files: true,
            can_view_reports: admin || role == Role::Auditor,
            can_manage_authorized_emails: admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_round_trip_through_from_str() {
        for name in VALID_ROLES {
            let role: Role = name.parse().unwrap();
            assert_eq!(role.as_str(), *name);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("superuser".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn technician_counts_as_staff() {
        assert!(Role::Technician.is_staff());
        assert!(Role::Admin.is_staff());
        assert!(!Role::Auditor.is_staff());
        assert!(!Role::User.is_staff());
    }

    #[test]
    fn auditor_sees_everything_but_edits_nothing() {
        let p = Role::Auditor.permissions();
        assert!(p.can_view_all_tickets);
        assert!(p.can_view_reports);
        assert!(!p.can_edit_tickets);
        assert!(!p.can_change_status);
        assert!(!p.can_see_internal_messages);
    }

    #[test]
    fn only_admin_deletes_and_manages_emails() {
        for role in [Role::User, Role::Technician, Role::Auditor] {
            assert!(!role.permissions().can_delete_tickets, "{role}");
            assert!(!role.permissions().can_manage_authorized_emails, "{role}");
        }
        assert!(Role::Admin.permissions().can_delete_tickets);
        assert!(Role::Admin.permissions().can_manage_authorized_emails);
    }

    #[test]
    fn plain_user_only_uploads() {
        let p = Role::User.permissions();
        assert!(p.can_upload_files);
        assert!(!p.can_view_all_tickets);
        assert!(!p.can_view_reports);
    }
}
