//! Private-route guard rule.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected view applies the same redirect decision: wait while the
//! session probe is in flight, send anonymous users to the login route.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::store::SessionState;

pub const LOGIN_PATH: &str = "/login";

/// Whether a protected view should redirect to [`LOGIN_PATH`].
#[must_use]
pub fn should_redirect_unauth(state: &SessionState) -> bool {
    !state.loading && !state.is_authenticated
}

/// Redirect target for a protected view, if any.
#[must_use]
pub fn redirect_target(state: &SessionState) -> Option<&'static str> {
    should_redirect_unauth(state).then_some(LOGIN_PATH)
}
