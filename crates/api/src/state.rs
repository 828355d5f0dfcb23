use std::sync::Arc;

use signoff_notify::TransportSelector;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via Axum's `State` extractor.
///
/// Wrapped in `Clone`-friendly types so Axum can share it across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: signoff_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Outbound mail: owns the single active SMTP transport.
    pub mailer: Arc<TransportSelector>,
}
