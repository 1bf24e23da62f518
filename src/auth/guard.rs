/// Authorization checks layered on the verified identity.
///
/// Pure predicates; handlers call them before touching any store.

use crate::auth::context::IdentityContext;
use crate::domain::Role;
use crate::error::AuthError;

pub fn has_role(context: &IdentityContext, role: Role) -> bool {
    context.user_type == role
}

pub fn is_self_or_admin(context: &IdentityContext, target_user_id: &str) -> bool {
    context.uid == target_user_id || context.user_type == Role::Admin
}

/// Require the caller's role to equal `role`
///
/// # Errors
/// `AuthError::Forbidden` (403) otherwise
pub fn require_role(context: &IdentityContext, role: Role) -> Result<(), AuthError> {
    if has_role(context, role) {
        Ok(())
    } else {
        tracing::warn!(uid = %context.uid, required = %role, actual = %context.user_type, "Role check failed");
        Err(AuthError::Forbidden)
    }
}

/// Require the caller to be `target_user_id` or an admin
///
/// # Errors
/// `AuthError::Unauthorized` (401) otherwise
pub fn require_self_or_admin(context: &IdentityContext, target_user_id: &str) -> Result<(), AuthError> {
    if is_self_or_admin(context, target_user_id) {
        Ok(())
    } else {
        tracing::warn!(uid = %context.uid, target = %target_user_id, "Ownership check failed");
        Err(AuthError::Unauthorized)
    }
}
