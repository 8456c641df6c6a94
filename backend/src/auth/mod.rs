//! Authentication and authorization gates.
//!
//! `tokens` covers the credential itself (issue and verify); `middleware`
//! covers the per-request pipeline: extract the bearer credential, resolve
//! it to a live user, then apply role and ownership checks on the already
//! resolved identity.

pub mod middleware;
pub mod tokens;

pub use middleware::{ensure_owner, require_role, AuthUser, MaybeAuthUser};
