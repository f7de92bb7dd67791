//! A small synchronous event bus.
//!
//! Listeners are registered per event kind, either persistently with
//! [`EventBus::subscribe`] or for a single delivery with [`EventBus::once`].
//! A one-shot listener is removed from the bus before it is invoked, so it
//! never observes a second emission even if its handler emits the same event.
//! Handlers run outside the internal lock and may freely subscribe, emit or
//! unsubscribe.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::id::SubscriptionId;

/// Global events dispatched by a lifecycle runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunnerEvent {
    /// A reroute finished without mounting or unmounting anything
    NoAppChange,
    /// A reroute mounted or unmounted at least one app
    AppChange,
    /// The first app was mounted
    FirstMount,
}

enum Handler<E> {
    Every(Arc<dyn Fn(&E) + Send + Sync>),
    Once(Box<dyn FnOnce(&E) + Send>),
}

struct Listener<E> {
    id: SubscriptionId,
    handler: Handler<E>,
}

/// Event bus keyed by event value.
pub struct EventBus<E> {
    listeners: Mutex<HashMap<E, Vec<Listener<E>>>>,
}

impl<E> EventBus<E>
where
    E: Eq + Hash + Clone + std::fmt::Debug,
{
    /// Create an empty event bus
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Invoke `handler` on every emission of `event` until unsubscribed.
    pub fn subscribe<F>(&self, event: E, handler: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.add(event, Handler::Every(Arc::new(handler)))
    }

    /// Invoke `handler` on the next emission of `event` only.
    pub fn once<F>(&self, event: E, handler: F) -> SubscriptionId
    where
        F: FnOnce(&E) + Send + 'static,
    {
        self.add(event, Handler::Once(Box::new(handler)))
    }

    fn add(&self, event: E, handler: Handler<E>) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.listeners
            .lock()
            .entry(event)
            .or_default()
            .push(Listener { id, handler });
        id
    }

    /// Remove a listener. Returns false if it was not registered (or a
    /// one-shot listener already fired).
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock();
        for registered in listeners.values_mut() {
            if let Some(pos) = registered.iter().position(|l| l.id == id) {
                registered.remove(pos);
                return true;
            }
        }
        false
    }

    /// Deliver `event` to its listeners in registration order. Returns the
    /// number of handlers invoked.
    pub fn emit(&self, event: &E) -> usize {
        let fired: Vec<Handler<E>> = {
            let mut listeners = self.listeners.lock();
            let Some(registered) = listeners.get_mut(event) else {
                return 0;
            };

            let mut fired = Vec::with_capacity(registered.len());
            let mut kept = Vec::with_capacity(registered.len());
            for listener in registered.drain(..) {
                match listener.handler {
                    Handler::Every(handler) => {
                        fired.push(Handler::Every(handler.clone()));
                        kept.push(Listener {
                            id: listener.id,
                            handler: Handler::Every(handler),
                        });
                    }
                    once @ Handler::Once(_) => fired.push(once),
                }
            }
            *registered = kept;
            fired
        };

        trace!("Emitting {:?} to {} listeners", event, fired.len());

        let count = fired.len();
        for handler in fired {
            match handler {
                Handler::Every(handler) => handler(event),
                Handler::Once(handler) => handler(event),
            }
        }
        count
    }

    /// Number of listeners currently registered for `event`.
    pub fn listener_count(&self, event: &E) -> usize {
        self.listeners.lock().get(event).map_or(0, Vec::len)
    }
}

impl<E> Default for EventBus<E>
where
    E: Eq + Hash + Clone + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
