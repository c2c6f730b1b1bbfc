//! Named-event bus
//!
//! Every repository operation raises a named event before it touches storage
//! (and, for writes, another one after). Handlers registered for that name
//! receive the event's payload mutably and may:
//! - replace or extend the payload (a different source, query or record)
//! - rename the event (turn an add into an update, a delete into an update)
//! - mark a write as handled so the repository skips the storage call
//!
//! ## How It Works
//!
//! 1. Extension code registers handlers at startup with [`EventHub::register`]
//! 2. The repository calls [`EventHub::process`] with a payload
//! 3. Handlers for the dispatched name run in registration order
//! 4. The repository acts on the returned [`Dispatch`]
//!
//! With no handlers registered the payload passes through unchanged. A
//! handler error stops the dispatch and propagates to the caller.
//!
//! ```ignore
//! use vessel_engine::{EventHub, EventName};
//!
//! let hub = EventHub::new();
//! hub.register(EventName::SetAdd, |dispatch| {
//!     dispatch.name = EventName::SetUpdate;
//!     Ok(())
//! });
//! ```

mod name;
mod payload;

pub use name::{EventName, WriteAction};
pub use payload::{EventPayload, QueryEventData, RepositoryEventData, WriteOptions};

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use vessel_core::Result;

/// One event in flight
#[derive(Debug)]
pub struct Dispatch {
    /// Component that raised the event
    pub source: &'static str,
    /// Event name; handlers may rename it
    pub name: EventName,
    /// Event payload; handlers may mutate or replace it
    pub payload: EventPayload,
}

/// Event handler
///
/// Handlers must be `Send + Sync`; the hub is shared across threads.
pub type Handler = Arc<dyn Fn(&mut Dispatch) -> Result<()> + Send + Sync>;

/// Registration token returned by [`EventHub::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

struct Registration {
    id: HandlerId,
    name: EventName,
    handler: Handler,
}

/// Registry of event handlers
///
/// # Thread Safety
///
/// Registration takes a write lock; dispatch snapshots the matching handlers
/// under a read lock and runs them unlocked, so handlers may register or
/// unregister handlers while running.
pub struct EventHub {
    registrations: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
}

impl EventHub {
    /// Create a hub with no handlers
    pub fn new() -> Self {
        Self {
            registrations: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a handler for an event name
    pub fn register<F>(&self, name: EventName, handler: F) -> HandlerId
    where
        F: Fn(&mut Dispatch) -> Result<()> + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut registrations = self.registrations.write();
        registrations.push(Registration {
            id,
            name,
            handler: Arc::new(handler),
        });
        info!(event = %name, handler = id.0, "Registered event handler");
        id
    }

    /// Remove a handler; returns false if it was not registered
    pub fn unregister(&self, id: HandlerId) -> bool {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        let removed = registrations.len() != before;
        if removed {
            info!(handler = id.0, "Unregistered event handler");
        }
        removed
    }

    /// Number of handlers registered for a name
    pub fn handler_count(&self, name: EventName) -> usize {
        self.registrations
            .read()
            .iter()
            .filter(|r| r.name == name)
            .count()
    }

    /// Run the handlers for `name` over a payload
    ///
    /// # Errors
    ///
    /// Returns the first handler error. Handlers after a failing one are not
    /// called.
    pub fn process(
        &self,
        source: &'static str,
        name: EventName,
        payload: EventPayload,
    ) -> Result<Dispatch> {
        let handlers: Vec<Handler> = self
            .registrations
            .read()
            .iter()
            .filter(|r| r.name == name)
            .map(|r| Arc::clone(&r.handler))
            .collect();

        let mut dispatch = Dispatch {
            source,
            name,
            payload,
        };
        if handlers.is_empty() {
            return Ok(dispatch);
        }

        debug!(event = %name, handlers = handlers.len(), "Dispatching event");
        for handler in handlers {
            handler(&mut dispatch)?;
        }
        if dispatch.name != name {
            debug!(from = %name, to = %dispatch.name, "Event renamed by handler");
        }
        Ok(dispatch)
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("handlers", &self.registrations.read().len())
            .finish()
    }
}
