//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated user from a Bearer JWT.
//! - [`rbac::RequireAdmin`] / [`rbac::RequireHr`] -- role-gated wrappers.
//! - [`rbac::require_role`] -- inline check for handlers shared by several roles.

pub mod auth;
pub mod rbac;
