//! Well-known role name constants.
//!
//! These must match the `chk_users_role` constraint in the users migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_SALES: &str = "sales";
pub const ROLE_CUSTOMER: &str = "customer";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_MANAGER, ROLE_SALES, ROLE_CUSTOMER];

/// Roles allowed to approve or reject projects.
pub fn can_approve(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_MANAGER
}

/// Roles that work in the back office (everyone except portal customers).
pub fn is_staff(role: &str) -> bool {
    matches!(role, ROLE_ADMIN | ROLE_MANAGER | ROLE_SALES)
}
