//! Unauthorized signal: transport-to-session backchannel.
//!
//! The transport adapter raises this signal whenever any authenticated
//! request comes back with an authentication rejection (401). The session
//! layer registers exactly one handler, which performs forced logout.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

type Handler = Box<dyn FnMut()>;

/// Single-handler signal slot, cheaply cloneable.
///
/// Clones share the same slot, so the transport can hold one end while the
/// session layer holds the other. Registering a handler replaces any
/// previous one; there is never more than one active handler.
#[derive(Clone, Default)]
pub struct UnauthorizedSignal {
    slot: Rc<RefCell<Option<Handler>>>,
}

impl UnauthorizedSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler`, replacing any previously registered one.
    pub fn register(&self, handler: impl FnMut() + 'static) {
        *self.slot.borrow_mut() = Some(Box::new(handler));
    }

    /// Remove the active handler (teardown).
    pub fn clear(&self) {
        *self.slot.borrow_mut() = None;
    }

    /// Invoke the active handler, if any.
    ///
    /// The handler is taken out of the slot for the duration of the call so
    /// a re-entrant `raise` cannot double-borrow; it is restored afterwards
    /// unless the handler itself registered a replacement.
    pub fn raise(&self) {
        let taken = self.slot.borrow_mut().take();
        match taken {
            Some(mut handler) => {
                handler();
                let mut slot = self.slot.borrow_mut();
                if slot.is_none() {
                    *slot = Some(handler);
                }
            }
            None => debug!("unauthorized signal raised with no handler registered"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
