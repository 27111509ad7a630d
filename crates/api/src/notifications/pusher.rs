//! Event-to-WebSocket push task.
//!
//! [`NotificationPusher`] subscribes to the event bus and forwards each
//! `notification.created` event to the right scope: global notifications
//! go to every connected session, targeted ones to the target user's
//! connection group. Push failures never block the write path that
//! produced the notification -- the row is already durably committed.

use std::sync::Arc;

use axum::extract::ws::Message;
use faultline_core::types::{DbId, Timestamp};
use faultline_db::models::notification::Notification;
use faultline_events::{DomainEvent, EventBus};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::notifications::NOTIFICATION_CREATED;
use crate::ws::WsManager;

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// The notification fields an inline toast needs.
///
/// Carries nothing the server cannot reconstruct from the notification
/// store; a missed push loses only the live update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToastPayload {
    pub id: DbId,
    pub notification_type: String,
    pub priority: String,
    pub ticket_id: DbId,
    pub ticket_code: String,
    pub title: String,
    pub message: String,
    pub action_url: Option<String>,
    pub created_at: Timestamp,
}

impl ToastPayload {
    /// Build the toast from a stored notification plus the ticket code
    /// (which lives on the ticket row, not the notification).
    pub fn from_notification(notification: &Notification, ticket_code: &str) -> Self {
        Self {
            id: notification.id,
            notification_type: notification.notification_type.clone(),
            priority: notification.priority.clone(),
            ticket_id: notification.ticket_id,
            ticket_code: ticket_code.to_string(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            action_url: notification.action_url.clone(),
            created_at: notification.created_at,
        }
    }
}

/// Bus payload for `notification.created`: the toast plus routing scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub is_global: bool,
    pub target_user_id: Option<DbId>,
    pub notification: ToastPayload,
}

/// Publish a committed notification onto the event bus for live push.
///
/// Call only after the notification row is durably stored; the pusher
/// is fire-and-forget from here on.
pub fn publish_notification(event_bus: &EventBus, notification: &Notification, ticket_code: &str) {
    let envelope = PushEnvelope {
        is_global: notification.is_global,
        target_user_id: notification.target_user_id,
        notification: ToastPayload::from_notification(notification, ticket_code),
    };

    match serde_json::to_value(&envelope) {
        Ok(payload) => {
            event_bus.publish(
                DomainEvent::new(NOTIFICATION_CREATED)
                    .with_ticket(notification.ticket_id)
                    .with_actor(notification.created_by_user_id)
                    .with_payload(payload),
            );
        }
        Err(error) => {
            tracing::warn!(
                notification_id = notification.id,
                %error,
                "Failed to encode push envelope, live update skipped"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// NotificationPusher
// ---------------------------------------------------------------------------

/// Forwards `notification.created` events to WebSocket clients.
pub struct NotificationPusher {
    ws_manager: Arc<WsManager>,
}

impl NotificationPusher {
    /// Create a new pusher delivering through the given manager.
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the push loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each
    /// event. The loop exits when the channel is closed (i.e. the
    /// [`EventBus`] is dropped during shutdown).
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) if event.event_type == NOTIFICATION_CREATED => {
                    self.push(&event).await;
                }
                // Other event types have no live delivery today.
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification pusher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification pusher shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver one event to its scope. Malformed payloads and absent
    /// recipients are logged, never escalated.
    async fn push(&self, event: &DomainEvent) {
        let envelope: PushEnvelope = match serde_json::from_value(event.payload.clone()) {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::warn!(%error, "Undecodable notification push payload, skipped");
                return;
            }
        };

        let msg = serde_json::json!({
            "type": "notification",
            "data": envelope.notification,
        });
        let ws_msg = Message::Text(msg.to_string().into());

        if envelope.is_global {
            self.ws_manager.broadcast(ws_msg).await;
        } else if let Some(user_id) = envelope.target_user_id {
            let delivered = self.ws_manager.send_to_user(user_id, ws_msg).await;
            tracing::debug!(
                user_id,
                delivered,
                notification_id = envelope.notification.id,
                "Pushed targeted notification"
            );
        }
    }
}
