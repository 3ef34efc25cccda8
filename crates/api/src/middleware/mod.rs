//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireManager`] -- Requires `manager` or `admin`.
//! - [`rbac::RequireStaff`] -- Requires any back-office role.
//! - [`rbac::RequireCustomer`] -- Requires the `customer` role (portal).

pub mod auth;
pub mod rbac;
