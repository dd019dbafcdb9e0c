// ── Change handlers ──
//
// Ordered observer lists, one per change channel. Handlers run
// synchronously on the caller's thread after the status mutation has been
// committed. A failing or panicking handler is logged and skipped; it never
// undoes the mutation and never stops later handlers. Panics are only
// contained where they unwind: under `panic = "abort"` they still end the
// process.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use strum::Display;
use tracing::{debug, warn};

/// Error type handlers may return.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A change handler. Receives the new value's name (empty when cleared).
pub type ChangeHandler = Arc<dyn Fn(&str) -> Result<(), HandlerError> + Send + Sync>;

/// Notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ChangeKind {
    Mode,
    Launch,
    Map,
    Vehicle,
}

/// Registered handlers for every channel, in registration order.
#[derive(Default)]
pub struct HandlerRegistry {
    mode: RwLock<Vec<ChangeHandler>>,
    launch: RwLock<Vec<ChangeHandler>>,
    map: RwLock<Vec<ChangeHandler>>,
    vehicle: RwLock<Vec<ChangeHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to `kind`'s list.
    pub fn register<F>(&self, kind: ChangeKind, handler: F)
    where
        F: Fn(&str) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.list(kind)
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(handler));
    }

    pub fn len(&self, kind: ChangeKind) -> usize {
        self.list(kind)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self, kind: ChangeKind) -> bool {
        self.len(kind) == 0
    }

    /// Invoke every handler of `kind` with `value`, in order. Returns the
    /// number of handlers that failed or panicked.
    ///
    /// The list is copied before any handler runs, so a handler may
    /// register further handlers; those take effect from the next change.
    pub fn notify(&self, kind: ChangeKind, value: &str) -> usize {
        let handlers: Vec<ChangeHandler> = self
            .list(kind)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        debug!(%kind, value, handlers = handlers.len(), "notifying handlers");
        let mut failures = 0;
        for (index, handler) in handlers.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(value))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    warn!(%kind, value, index, error = %e, "change handler failed");
                }
                Err(payload) => {
                    failures += 1;
                    warn!(%kind, value, index, panic = panic_message(&*payload), "change handler panicked");
                }
            }
        }
        failures
    }

    fn list(&self, kind: ChangeKind) -> &RwLock<Vec<ChangeHandler>> {
        match kind {
            ChangeKind::Mode => &self.mode,
            ChangeKind::Launch => &self.launch,
            ChangeKind::Map => &self.map,
            ChangeKind::Vehicle => &self.vehicle,
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
