//! # Route Guards
//!
//! Access checks performed before a view mounts. A denial is not an
//! error: it is a silent redirect to another entry point. Checks are
//! synchronous against the current [`SessionStore`] state; because the
//! store rehydrates from storage inside `open`, there is no window in
//! which a guard could observe a half-loaded session.

use crate::session::SessionStore;

/// Navigation targets used when a guard denies access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The login entry point.
    Login,
    /// The non-privileged catalog entry point.
    Catalog,
}

/// The two guard variants the application uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Requires any authenticated session.
    SessionRequired,
    /// Requires an authenticated session holding the admin role.
    AdminRequired,
}

/// Result of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Permit,
    Redirect(Route),
}

impl Guard {
    pub fn check(&self, store: &SessionStore) -> GuardOutcome {
        match self {
            Guard::SessionRequired => {
                if store.is_authenticated() {
                    GuardOutcome::Permit
                } else {
                    GuardOutcome::Redirect(Route::Login)
                }
            }
            Guard::AdminRequired => {
                if store.is_authenticated() && store.is_admin() {
                    GuardOutcome::Permit
                } else {
                    GuardOutcome::Redirect(Route::Catalog)
                }
            }
        }
    }
}

/// A view wrapped in a guard. The view value is handed out only when the
/// check permits mounting; otherwise the caller gets the redirect target.
pub struct Guarded<V> {
    guard: Guard,
    view: V,
}

impl<V> Guarded<V> {
    pub fn new(guard: Guard, view: V) -> Self {
        Self { guard, view }
    }

    /// Checks the guard against current session state and yields the
    /// wrapped view on success.
    pub fn mount(&self, store: &SessionStore) -> Result<&V, Route> {
        match self.guard.check(store) {
            GuardOutcome::Permit => Ok(&self.view),
            GuardOutcome::Redirect(route) => Err(route),
        }
    }

    /// Consuming variant of [`Guarded::mount`].
    pub fn into_view(self, store: &SessionStore) -> Result<V, Route> {
        match self.guard.check(store) {
            GuardOutcome::Permit => Ok(self.view),
            GuardOutcome::Redirect(route) => Err(route),
        }
    }
}
