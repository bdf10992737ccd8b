//! `portal-session`: application layer of the admin console client core.
//!
//! Owns the mutable pieces the UI reacts to: the token store, the
//! authentication session state machine, route guards, and one-time link
//! validation. Everything here follows the single-threaded, event-driven
//! model: state changes only on discrete events (user input, timer fire,
//! async completion), and every asynchronous continuation re-validates its
//! triggering context before applying a result.
//!
//! Transport is out of scope; backends are consumed through the traits in
//! [`ports`], and timers/clocks are injected so controllers are fully
//! deterministic under test.

pub mod admin;
pub mod clock;
pub mod controller;
pub mod flows;
pub mod guard;
pub mod link;
pub mod ports;
pub mod signal;
pub mod storage;
pub mod store;
pub mod timer;

pub use admin::{admin_module_visible, resolve_admin_visibility, visible_admin_sections};
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{SessionController, bind_unauthorized_logout};
pub use flows::AccountFlows;
pub use guard::{LOGIN_PATH, RouteDecision, UNAUTHORIZED_PATH, guard_admin_route, guard_route};
pub use link::{
    INVALID_LINK_MESSAGE, LinkKey, LinkParams, LinkValidationController, LinkValidationState,
    parse_link_params, pre_signup_redirect,
};
pub use ports::{AuthBackend, BackendError, LinkGrant, LinkKind, Profile, ProfileBackend};
pub use signal::UnauthorizedSignal;
pub use storage::{CredentialStorage, FileCredentialStorage, MemoryCredentialStorage, STORAGE_KEY};
pub use store::TokenStore;
pub use timer::{ManualTimers, TimerId, TimerScheduler};
