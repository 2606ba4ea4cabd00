//! Gateway shared state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mural_canvas::CanvasStore;
use mural_core::Config;

/// Shared server state, one per process, handed to every session.
pub struct GatewayState {
    pub config: Arc<Config>,
    pub store: Arc<CanvasStore>,
    connections: AtomicUsize,
}

impl GatewayState {
    pub fn new(config: Arc<Config>, store: Arc<CanvasStore>) -> Self {
        Self {
            config,
            store,
            connections: AtomicUsize::new(0),
        }
    }

    /// Returns the number of open connections including the new one.
    pub(crate) fn connection_opened(&self) -> usize {
        self.connections.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns the number of connections remaining open.
    pub(crate) fn connection_closed(&self) -> usize {
        self.connections.fetch_sub(1, Ordering::SeqCst) - 1
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}
