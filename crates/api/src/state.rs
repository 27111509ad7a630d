use std::sync::Arc;

use crate::cache::CacheCoordinator;
use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: faultline_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Centralized event bus feeding the notification pusher.
    pub event_bus: Arc<faultline_events::EventBus>,
    /// Cache-aside coordinator for derived read views.
    pub cache: CacheCoordinator,
}
