use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use tracing::trace;

use crate::connection::ConnectionId;
use crate::protocol::{Request, Response};

/// The message pair one connection is assembling and answering.
#[derive(Debug, Default)]
pub struct ConnectionState {
    pub request: Request,
    pub response: Response,
}

impl ConnectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_head_bytes(max_head_bytes: usize) -> Self {
        Self { request: Request::with_max_head_bytes(max_head_bytes), response: Response::new() }
    }

    /// Prepares both messages for the next exchange, keeping their buffers.
    pub fn reset(&mut self) {
        self.request.init();
        self.response.init();
    }
}

/// Shared handle to the state of one connection.
///
/// Cloning the handle out of the registry releases the map, so a long exchange on
/// one connection never blocks lookups of another.
#[derive(Debug, Clone, Default)]
pub struct ConnectionSlot {
    state: Arc<Mutex<ConnectionState>>,
}

impl ConnectionSlot {
    fn new(state: ConnectionState) -> Self {
        Self { state: Arc::new(Mutex::new(state)) }
    }

    /// Locks the state, recovering it from a handler that panicked mid-exchange.
    pub fn lock(&self) -> MutexGuard<'_, ConnectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Concurrent map of the live connections' state.
///
/// Events of different connections may arrive from different worker threads; events
/// of one connection must be delivered in order by a single caller at a time.
#[derive(Debug)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, ConnectionSlot>,
    max_head_bytes: usize,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(crate::codec::MAX_HEAD_BYTES)
    }
}

impl ConnectionRegistry {
    pub fn new(max_head_bytes: usize) -> Self {
        Self { connections: DashMap::new(), max_head_bytes }
    }

    /// Returns the state of `id`, creating it on first use.
    ///
    /// The map's shard is only locked for the lookup itself.
    pub fn get_or_create(&self, id: ConnectionId) -> ConnectionSlot {
        let entry = self.connections.entry(id).or_insert_with(|| {
            trace!(%id, "create connection state");
            ConnectionSlot::new(ConnectionState::with_max_head_bytes(self.max_head_bytes))
        });
        entry.value().clone()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Drops the state of `id`, including any partially assembled message.
    pub fn remove(&self, id: ConnectionId) -> Option<ConnectionSlot> {
        self.connections.remove(&id).map(|(_, slot)| slot)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
