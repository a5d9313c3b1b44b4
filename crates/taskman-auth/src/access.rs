//! Role-based access decisions with an ownership fallback.
//!
//! [`authorize`] is a pure function of its arguments: no I/O and no
//! state, so every call site can be tested without a store.

use taskman_core::models::account::Role;
use taskman_core::repository::OwnerScope;
use uuid::Uuid;

use crate::error::AuthError;
use crate::token::SessionClaims;

/// Access policy declared by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Roles that satisfy the policy outright. Empty means any
    /// authenticated subject.
    pub required_roles: &'static [Role],
    /// Let a caller without a required role act on a resource they own.
    pub ownership_fallback: bool,
}

impl Policy {
    pub const fn new(required_roles: &'static [Role], ownership_fallback: bool) -> Self {
        Self {
            required_roles,
            ownership_fallback,
        }
    }
}

/// Any authenticated subject.
pub const AUTHENTICATED: Policy = Policy::new(&[], false);

/// Administrators only.
pub const ADMIN_ONLY: Policy = Policy::new(&[Role::Admin], false);

/// Administrators, or the owner of the resource.
pub const ADMIN_OR_OWNER: Policy = Policy::new(&[Role::Admin], true);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), AuthError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::Unauthenticated) => Err(AuthError::Unauthenticated),
            Decision::Deny(DenyReason::Forbidden) => Err(AuthError::Forbidden),
        }
    }
}

/// Decide whether `claim` may perform an operation guarded by `policy`.
///
/// Role membership is checked before ownership, so an account holding a
/// required role is never blocked by an owner mismatch. `resource_owner`
/// is only consulted on the ownership-fallback path; when it is `None`
/// the fallback cannot succeed.
pub fn authorize(
    claim: Option<&SessionClaims>,
    policy: &Policy,
    resource_owner: Option<Uuid>,
) -> Decision {
    let Some(claim) = claim else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    if policy.required_roles.is_empty() || policy.required_roles.contains(&claim.role) {
        return Decision::Allow;
    }

    if policy.ownership_fallback && is_owner(claim, resource_owner) {
        return Decision::Allow;
    }

    Decision::Deny(DenyReason::Forbidden)
}

fn is_owner(claim: &SessionClaims, resource_owner: Option<Uuid>) -> bool {
    match (claim.subject_id(), resource_owner) {
        (Ok(subject), Some(owner)) => subject == owner,
        _ => false,
    }
}

/// Store scope for list-style reads: administrators see every row,
/// everyone else only their own.
pub fn list_scope(claim: &SessionClaims) -> Result<OwnerScope, AuthError> {
    match claim.role {
        Role::Admin => Ok(OwnerScope::All),
        Role::Member => Ok(OwnerScope::Owner(claim.subject_id()?)),
    }
}
