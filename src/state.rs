//! Application state for Axum web framework.

use std::sync::Arc;

use crate::config::JwtConfig;
use crate::repositories::Store;
use crate::services::Services;

/// Shared services plus the store they were built from.
///
/// Cloning is cheap; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Used directly by the health check
    pub store: Arc<dyn Store>,
}

impl AppState {
    /// Wires every service to one store.
    ///
    /// # Example
    /// ```ignore
    /// let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
    /// let state = AppState::new(store, settings.jwt.clone());
    /// ```
    pub fn new(store: Arc<dyn Store>, jwt: JwtConfig) -> Self {
        let services = Services::new(store.clone(), jwt);
        Self { services, store }
    }
}
