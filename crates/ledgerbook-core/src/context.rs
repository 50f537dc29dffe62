// crates/ledgerbook-core/src/context.rs
// ============================================================================
// Module: Tenant Context
// Description: Explicit active-tenant context with scoped override guards.
// Purpose: Resolve which profile owns tenant-scoped operations and restore
//          the prior tenant deterministically after scoped work.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The context is a single mutable slot holding the active profile
//! identifier, threaded through the storage API as an explicit value rather
//! than ambient global state. Cross-tenant aggregation (full-application
//! export, dashboards) repeatedly "becomes" each tenant via [`ContextScope`]
//! guards; a guard restores the immediately prior value on every exit path,
//! including panics, so nesting and error returns are safe. The slot is a
//! mutex only to satisfy `Sync`; the caller model is a single logical actor.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Mutex;
use std::sync::PoisonError;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Identifier of the distinguished brand-wide profile.
pub const GLOBAL_PROFILE_ID: &str = "global-profile";

/// Profile (tenant) identifier.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this
///   type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    /// Creates a new profile identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProfileId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProfileId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Active-tenant slot consulted by the storage router.
///
/// # Invariants
/// - Holds at most one active profile at a time.
/// - Scoped overrides restore the prior value in LIFO order.
#[derive(Debug, Default)]
pub struct TenantContext {
    /// The active profile, if any.
    slot: Mutex<Option<ProfileId>>,
}

impl TenantContext {
    /// Creates a context with no active tenant.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active profile, if any.
    #[must_use]
    pub fn current(&self) -> Option<ProfileId> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the active profile.
    pub fn set(&self, tenant: Option<ProfileId>) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = tenant;
    }

    /// Activates `tenant` until the returned guard drops, then restores the
    /// prior value.
    #[must_use]
    pub fn scoped(&self, tenant: Option<ProfileId>) -> ContextScope<'_> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let prior = slot.take();
        *slot = tenant;
        drop(slot);
        ContextScope {
            context: self,
            prior: Some(prior),
        }
    }

    /// Runs `operation` with `tenant` active, restoring the prior tenant
    /// afterwards on every exit path.
    pub fn with_tenant<T>(&self, tenant: ProfileId, operation: impl FnOnce() -> T) -> T {
        let _scope = self.scoped(Some(tenant));
        operation()
    }
}

/// Guard restoring the previously active tenant when dropped.
#[must_use = "dropping the scope restores the prior tenant"]
pub struct ContextScope<'a> {
    /// The context whose slot is overridden.
    context: &'a TenantContext,
    /// The value to restore; `Some` until the guard fires.
    prior: Option<Option<ProfileId>>,
}

impl Drop for ContextScope<'_> {
    fn drop(&mut self) {
        if let Some(prior) = self.prior.take() {
            self.context.set(prior);
        }
    }
}

impl fmt::Debug for ContextScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextScope").finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions and helpers are permitted."
)]
mod tests {
    use super::ProfileId;
    use super::TenantContext;

    #[test]
    fn scoped_override_restores_prior() {
        let context = TenantContext::new();
        context.set(Some(ProfileId::from("shop-a")));
        {
            let _scope = context.scoped(Some(ProfileId::from("shop-b")));
            assert_eq!(context.current(), Some(ProfileId::from("shop-b")));
            {
                let _inner = context.scoped(None);
                assert_eq!(context.current(), None);
            }
            assert_eq!(context.current(), Some(ProfileId::from("shop-b")));
        }
        assert_eq!(context.current(), Some(ProfileId::from("shop-a")));
    }

    #[test]
    fn scoped_override_restores_on_panic() {
        let context = TenantContext::new();
        context.set(Some(ProfileId::from("shop-a")));
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            context.with_tenant(ProfileId::from("shop-b"), || panic!("boom"));
        }));
        assert!(result.is_err());
        assert_eq!(context.current(), Some(ProfileId::from("shop-a")));
    }

    #[test]
    fn with_tenant_returns_operation_result() {
        let context = TenantContext::new();
        let seen = context.with_tenant(ProfileId::from("shop-a"), || {
            context.current().map(|id| id.as_str().to_string())
        });
        assert_eq!(seen.as_deref(), Some("shop-a"));
        assert_eq!(context.current(), None);
    }
}
