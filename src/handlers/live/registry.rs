//! Process-wide registry of connected clients.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::OutboundRoute;
use crate::core::live::SessionHandle;

/// Lifecycle of one client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Transport accepted, backend session not yet bound
    #[default]
    Connecting,
    /// Backend session bound, relay tasks running
    Active,
    /// Teardown started, tasks winding down
    Closing,
    /// Session released
    Closed,
}

/// Live handle to one connected client.
#[derive(Clone)]
pub struct ClientHandle {
    /// Sender side of the client's outbound dispatcher.
    pub outbound: mpsc::Sender<OutboundRoute>,
    /// Most recent resumption handle received for this client's session.
    pub resumption: Arc<Mutex<Option<SessionHandle>>>,
    lifecycle: Arc<Mutex<LifecycleState>>,
}

impl ClientHandle {
    pub fn new(outbound: mpsc::Sender<OutboundRoute>) -> Self {
        Self {
            outbound,
            resumption: Arc::new(Mutex::new(None)),
            lifecycle: Arc::new(Mutex::new(LifecycleState::Connecting)),
        }
    }

    pub fn lifecycle(&self) -> LifecycleState {
        *self.lifecycle.lock()
    }

    pub fn set_lifecycle(&self, state: LifecycleState) {
        *self.lifecycle.lock() = state;
    }
}

/// Mapping from client-session identifier to its live handle.
///
/// At most one entry exists per identifier, and removal is idempotent:
/// whichever teardown path runs second observes `false` and does nothing.
#[derive(Default)]
pub struct ClientRegistry {
    clients: DashMap<Uuid, ClientHandle>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client. Returns `false` if the identifier is already
    /// present (the existing entry is left untouched).
    pub fn register(&self, id: Uuid, handle: ClientHandle) -> bool {
        match self.clients.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(handle);
                true
            }
        }
    }

    /// Remove a client. Returns `true` only for the call that actually
    /// removed the entry.
    pub fn unregister(&self, id: Uuid) -> bool {
        self.clients.remove(&id).is_some()
    }

    /// Look up a client's handle.
    pub fn lookup(&self, id: Uuid) -> Option<ClientHandle> {
        self.clients.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> ClientHandle {
        let (tx, _rx) = mpsc::channel(1);
        ClientHandle::new(tx)
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ClientRegistry::new();
        let id = Uuid::new_v4();

        assert!(registry.lookup(id).is_none());
        assert!(registry.register(id, handle()));
        assert!(registry.lookup(id).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_rejects_duplicate() {
        let registry = ClientRegistry::new();
        let id = Uuid::new_v4();

        assert!(registry.register(id, handle()));
        assert!(!registry.register(id, handle()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let registry = ClientRegistry::new();
        let id = Uuid::new_v4();
        registry.register(id, handle());

        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lifecycle_transitions() {
        let handle = handle();
        assert_eq!(handle.lifecycle(), LifecycleState::Connecting);

        handle.set_lifecycle(LifecycleState::Active);
        assert_eq!(handle.lifecycle(), LifecycleState::Active);

        // Clones observe the same state
        let clone = handle.clone();
        handle.set_lifecycle(LifecycleState::Closed);
        assert_eq!(clone.lifecycle(), LifecycleState::Closed);
    }

    #[test]
    fn test_resumption_shared_through_lookup() {
        let registry = ClientRegistry::new();
        let id = Uuid::new_v4();
        registry.register(id, handle());

        let looked_up = registry.lookup(id).unwrap();
        *looked_up.resumption.lock() = Some(SessionHandle::new("h-9"));

        let again = registry.lookup(id).unwrap();
        assert_eq!(
            again.resumption.lock().as_ref().map(|h| h.as_str().to_string()),
            Some("h-9".to_string())
        );
    }
}
