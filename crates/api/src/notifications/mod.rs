//! Real-time notification fan-out.
//!
//! Write handlers commit the notification row, then publish a
//! `notification.created` event carrying the toast payload; the
//! [`NotificationPusher`] task forwards it to connected WebSocket
//! clients. Delivery is best-effort -- a disconnected recipient simply
//! discovers the notification on their next poll.

pub mod pusher;

pub use pusher::{publish_notification, NotificationPusher, PushEnvelope, ToastPayload};

/// Event type published when a notification row has been committed.
pub const NOTIFICATION_CREATED: &str = "notification.created";
