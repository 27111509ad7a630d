//! WebSocket infrastructure: connection broker, upgrade handler, and
//! heartbeat.
//!
//! The rest of the application only talks to [`WsManager`] (join a
//! user's push group at upgrade time, send to a group, send to all), so
//! the notification subsystem never reasons about transport details.

pub mod handler;
pub mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
