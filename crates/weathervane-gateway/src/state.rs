//! Shared application state for the gateway.

use std::sync::Arc;

use weathervane_core::service::WorldService;

use crate::registry::ConnectionRegistry;

/// State shared by every handler.
///
/// The registry is also the world service's transport, so both must be
/// built from the same [`ConnectionRegistry`].
#[derive(Debug, Clone)]
pub struct AppState {
    /// The authoritative world service.
    pub service: Arc<WorldService>,
    /// Live client connections.
    pub registry: Arc<ConnectionRegistry>,
}

impl AppState {
    /// Bundle a service with the registry it delivers through.
    pub const fn new(service: Arc<WorldService>, registry: Arc<ConnectionRegistry>) -> Self {
        Self { service, registry }
    }
}
