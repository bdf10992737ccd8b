//! Authentication session state machine.
//!
//! Two states: anonymous, or authenticated with the current token. All
//! transitions happen on discrete events: login completion, explicit
//! logout, the auto-expiry timer, or the transport's unauthorized signal.
//! Queries never mutate state, so they are safe to call from render paths.

use std::cell::RefCell;
use std::rc::Rc;

use portal_auth::{AuthError, SessionToken, User};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::ports::AuthBackend;
use crate::signal::UnauthorizedSignal;
use crate::store::TokenStore;
use crate::timer::{TimerId, TimerScheduler};

/// Owner of the authenticated session.
///
/// Constructed once per process with an injected clock and timer scheduler
/// and passed by reference, never an ambient global. If the token store was
/// hydrated from persistence, the auto-logout timer is armed immediately so
/// a restored session still expires on time.
pub struct SessionController {
    store: TokenStore,
    clock: Rc<dyn Clock>,
    timers: Rc<dyn TimerScheduler>,
    expiry_timer: Option<TimerId>,
}

impl SessionController {
    pub fn new(store: TokenStore, clock: Rc<dyn Clock>, timers: Rc<dyn TimerScheduler>) -> Self {
        let mut controller = Self {
            store,
            clock,
            timers,
            expiry_timer: None,
        };

        if controller.store.get().is_some() {
            controller.arm_expiry_timer();
        }

        controller
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Authenticate against the backend and install the returned credential.
    ///
    /// On any failure the controller stays anonymous: a rejected login maps
    /// to [`AuthError::AuthenticationRejected`] carrying the backend's
    /// message, and an undecodable credential fails token construction
    /// before anything is stored.
    pub async fn login(
        &mut self,
        backend: &dyn AuthBackend,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let raw = backend
            .login(email, password)
            .await
            .map_err(|err| AuthError::AuthenticationRejected(err.message))?;

        let token = SessionToken::from_raw(raw)?;
        let user = token.to_user();

        info!(username = %user.username, "login succeeded");
        self.install(token);

        Ok(user)
    }

    /// Drop the session. Idempotent; cancels the auto-logout timer.
    pub fn logout(&mut self) {
        if let Some(id) = self.expiry_timer.take() {
            self.timers.cancel(id);
        }
        self.store.clear();
    }

    /// Forced logout on an externally observed authentication rejection.
    pub fn force_logout(&mut self) {
        warn!("unauthorized response observed; forcing logout");
        self.logout();
    }

    /// Auto-expiry timer fired.
    ///
    /// Only the timer armed for the *current* token may log out; a fire from
    /// a superseded timer is discarded.
    pub fn on_timer(&mut self, id: TimerId) {
        if self.expiry_timer == Some(id) {
            debug!("session credential reached expiry; logging out");
            self.logout();
        } else {
            debug!(?id, "ignoring stale expiry timer");
        }
    }

    /// Startup bootstrap: clear a persisted token that is already expired.
    ///
    /// This is the one place where an expiry check mutates state, so the
    /// query methods below can stay pure. Returns whether a purge happened.
    pub fn purge_expired(&mut self) -> bool {
        let expired = self
            .store
            .get()
            .is_some_and(|token| token.is_expired(self.clock.now()));

        if expired {
            info!("persisted session already expired; clearing");
            self.logout();
        }

        expired
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries (never mutate state)
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_authenticated(&self) -> bool {
        self.store
            .get()
            .is_some_and(|token| !token.is_expired(self.clock.now()))
    }

    /// False when anonymous or when the stored token has expired.
    pub fn has_permission(&self, name: &str) -> bool {
        self.store
            .get()
            .is_some_and(|token| !token.is_expired(self.clock.now()) && token.to_user().has_permission(name))
    }

    /// False when anonymous.
    pub fn has_role(&self, name: &str) -> bool {
        self.store
            .get()
            .is_some_and(|token| token.to_user().has_role(name))
    }

    /// Identity view for the UI; `None` when anonymous or expired.
    pub fn current_user(&self) -> Option<User> {
        let token = self.store.get()?;
        if token.is_expired(self.clock.now()) {
            return None;
        }
        Some(token.to_user())
    }

    /// The active credential, e.g. for the transport to attach as a bearer
    /// header.
    pub fn current_token(&self) -> Option<&SessionToken> {
        self.store.get()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn install(&mut self, token: SessionToken) {
        self.store.set(token);
        self.arm_expiry_timer();
    }

    /// (Re)arm the one-shot auto-logout timer for the current token.
    ///
    /// The previous timer is always cancelled first so at most one timer is
    /// ever live, and an already-expired token fires immediately
    /// (`max(expiry - now, 0)` semantics).
    fn arm_expiry_timer(&mut self) {
        if let Some(id) = self.expiry_timer.take() {
            self.timers.cancel(id);
        }

        if let Some(token) = self.store.get() {
            let fire_at = token.expires_at().max(self.clock.now());
            self.expiry_timer = Some(self.timers.schedule(fire_at));
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(id) = self.expiry_timer.take() {
            self.timers.cancel(id);
        }
    }
}

/// Wire the transport's unauthorized signal to forced logout.
///
/// Holds only a weak reference: a raise after the controller is gone is a
/// no-op instead of keeping the controller alive.
pub fn bind_unauthorized_logout(
    signal: &UnauthorizedSignal,
    controller: &Rc<RefCell<SessionController>>,
) {
    let weak = Rc::downgrade(controller);
    signal.register(move || {
        if let Some(controller) = weak.upgrade() {
            controller.borrow_mut().force_logout();
        }
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
