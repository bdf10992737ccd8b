//! End-to-end scenarios over the public session API: login through timer
//! expiry, persistence hydration across restarts, and the link validation
//! staleness guard.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use base64ct::{Base64UrlUnpadded, Encoding};
use portal_session::{
    AuthBackend, BackendError, Clock, LinkGrant, LinkKind, LinkParams, LinkValidationController,
    LinkValidationState, ManualClock, ManualTimers, MemoryCredentialStorage, SessionController,
    TimerScheduler, TokenStore, UnauthorizedSignal, bind_unauthorized_logout,
};

fn mint(username: &str, exp_secs: i64, permissions: &[&str]) -> String {
    let perms = permissions
        .iter()
        .map(|p| format!("\"{p}\""))
        .collect::<Vec<_>>()
        .join(",");
    let payload = Base64UrlUnpadded::encode_string(
        format!(
            r#"{{"username":"{username}","email":"{username}@example.com","roles":["operator"],"permissions":[{perms}],"exp":{exp_secs},"iat":0}}"#
        )
        .as_bytes(),
    );
    format!("h.{payload}.s")
}

struct ScriptedBackend {
    login_response: Result<String, BackendError>,
    link_response: RefCell<Vec<Result<LinkGrant, BackendError>>>,
}

impl ScriptedBackend {
    fn logging_in_as(raw: String) -> Self {
        Self {
            login_response: Ok(raw),
            link_response: RefCell::new(Vec::new()),
        }
    }
}

#[async_trait(?Send)]
impl AuthBackend for ScriptedBackend {
    async fn login(&self, _email: &str, _password: &str) -> Result<String, BackendError> {
        self.login_response.clone()
    }

    async fn pre_signup(&self, _: &str, _: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn validate_link(
        &self,
        _: LinkKind,
        _: &str,
        _: &str,
    ) -> Result<LinkGrant, BackendError> {
        self.link_response
            .borrow_mut()
            .pop()
            .unwrap_or_else(|| Err(BackendError::new("Erro 410")))
    }

    async fn complete_signup(&self, _: &str, _: &str, _: &str, _: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn complete_password_change(&self, _: &str, _: &str, _: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn complete_password_reset(&self, _: &str, _: &str, _: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn request_password_reset(&self, _: &str) -> Result<(), BackendError> {
        Ok(())
    }
}

#[tokio::test]
async fn login_expiry_and_unauthorized_lifecycle() {
    portal_observability::init();

    let clock = Rc::new(ManualClock::new(0));
    let timers = Rc::new(ManualTimers::new());
    let controller = Rc::new(RefCell::new(SessionController::new(
        TokenStore::in_memory(),
        Rc::clone(&clock) as Rc<dyn Clock>,
        Rc::clone(&timers) as Rc<dyn TimerScheduler>,
    )));

    let signal = UnauthorizedSignal::new();
    bind_unauthorized_logout(&signal, &controller);

    // Token expires at t=30s.
    let backend = ScriptedBackend::logging_in_as(mint("alice", 30, &["user:read"]));
    let user = controller
        .borrow_mut()
        .login(&backend, "alice@example.com", "pw")
        .await
        .unwrap();
    assert_eq!(user.username, "alice");
    assert!(controller.borrow().is_authenticated());

    // The wall clock reaches the expiry instant and the timer is delivered.
    clock.advance_millis(30_000);
    for id in timers.fire_due(clock.now()) {
        controller.borrow_mut().on_timer(id);
    }
    assert!(!controller.borrow().is_authenticated());
    assert!(controller.borrow().current_token().is_none());

    // Log back in, then simulate a 401 observed by the transport.
    controller
        .borrow_mut()
        .login(&backend, "alice@example.com", "pw")
        .await
        .unwrap();
    assert!(controller.borrow().is_authenticated());

    signal.raise();
    assert!(!controller.borrow().is_authenticated());
}

#[test]
fn session_survives_restart_through_persistence() {
    let raw = mint("alice", 3_600, &["user:read"]);
    let persisted = Rc::new(MemoryCredentialStorage::seeded(raw));

    // Shared handle so both "process runs" see the same persisted state.
    struct Shared(Rc<MemoryCredentialStorage>);
    impl portal_session::CredentialStorage for Shared {
        fn load(&self) -> Option<String> {
            self.0.load()
        }
        fn store(&self, raw: &str) {
            self.0.store(raw);
        }
        fn remove(&self) {
            self.0.remove();
        }
    }

    let clock = Rc::new(ManualClock::new(0));
    let timers = Rc::new(ManualTimers::new());

    let mut controller = SessionController::new(
        TokenStore::with_storage(Box::new(Shared(Rc::clone(&persisted)))),
        Rc::clone(&clock) as Rc<dyn Clock>,
        Rc::clone(&timers) as Rc<dyn TimerScheduler>,
    );

    // Hydrated session is live, with the auto-logout timer armed.
    assert!(!controller.purge_expired());
    assert!(controller.is_authenticated());
    assert_eq!(timers.pending_count(), 1);

    // Logout clears the persisted credential, so a second start is anonymous.
    controller.logout();
    drop(controller);

    let second = SessionController::new(
        TokenStore::with_storage(Box::new(Shared(persisted))),
        Rc::new(ManualClock::new(0)) as Rc<dyn Clock>,
        Rc::new(ManualTimers::new()) as Rc<dyn TimerScheduler>,
    );
    assert!(!second.is_authenticated());
}

#[tokio::test]
async fn link_validation_latest_navigation_wins() {
    let clock = Rc::new(ManualClock::new(0));
    let timers = Rc::new(ManualTimers::new());
    let mut controller = LinkValidationController::new(
        LinkKind::PreSignup,
        Rc::clone(&clock) as Rc<dyn Clock>,
        Rc::clone(&timers) as Rc<dyn TimerScheduler>,
    );

    // First navigation starts a validation that will complete late.
    let old_key = controller
        .apply_params(&LinkParams::new("id-old", "tok-old"))
        .unwrap();

    // User navigates to a second link before the first call returns.
    let new_key = controller
        .apply_params(&LinkParams::new("id-new", "tok-new"))
        .unwrap();

    // The fresh link is rejected by the backend.
    controller.complete(&new_key, Err(BackendError::new("Erro 410")));
    assert!(matches!(
        controller.state(),
        LinkValidationState::Invalid { .. }
    ));

    // The late success for the superseded link must not resurrect it.
    let payload = Base64UrlUnpadded::encode_string(b"{}");
    controller.complete(
        &old_key,
        Ok(LinkGrant {
            id: "id-old".to_string(),
            token: format!("h.{payload}.s"),
        }),
    );
    assert!(matches!(
        controller.state(),
        LinkValidationState::Invalid { .. }
    ));
}

#[tokio::test]
async fn run_validation_drives_the_backend() {
    let clock = Rc::new(ManualClock::new(0));
    let timers = Rc::new(ManualTimers::new());
    let mut controller = LinkValidationController::new(
        LinkKind::PasswordReset,
        Rc::clone(&clock) as Rc<dyn Clock>,
        Rc::clone(&timers) as Rc<dyn TimerScheduler>,
    );

    let payload = Base64UrlUnpadded::encode_string(b"{}");
    let backend = ScriptedBackend {
        login_response: Err(BackendError::new("unused")),
        link_response: RefCell::new(vec![Ok(LinkGrant {
            id: "id-1".to_string(),
            token: format!("h.{payload}.s"),
        })]),
    };

    controller
        .run_validation(&backend, &LinkParams::new("id-1", "tok-1"))
        .await;
    assert!(matches!(
        controller.state(),
        LinkValidationState::Valid { id, .. } if id == "id-1"
    ));
}
