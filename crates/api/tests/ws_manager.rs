//! Unit tests for `WsManager`.
//!
//! These tests exercise the connection broker directly, without
//! performing any HTTP upgrades. They verify add/remove semantics,
//! broadcast delivery, per-user group targeting, and graceful shutdown
//! behaviour.

use assert_matches::assert_matches;
use axum::extract::ws::Message;
use faultline_api::ws::WsManager;

// ---------------------------------------------------------------------------
// Test: new manager starts with zero connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();

    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: add() and remove() track the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string(), None).await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: remove() with unknown ID is a no-op
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_unknown_id_is_noop() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string(), None).await;
    manager.remove("nonexistent").await;

    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: broadcast() reaches every connection, authenticated or not
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_sends_to_all_connections() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string(), Some(1)).await;
    let mut rx2 = manager.add("conn-2".to_string(), Some(2)).await;
    let mut rx3 = manager.add("conn-3".to_string(), None).await;

    let payload = Message::Text("hello everyone".into());
    manager.broadcast(payload).await;

    for rx in [&mut rx1, &mut rx2, &mut rx3] {
        let msg = rx.recv().await.expect("should receive broadcast");
        assert!(matches!(&msg, Message::Text(t) if *t == "hello everyone"));
    }
}

// ---------------------------------------------------------------------------
// Test: send_to_user() only reaches the target's group
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_user_targets_only_that_users_group() {
    let manager = WsManager::new();

    // User 5 has two connections; user 9 and an anonymous client are
    // also online.
    let mut rx_a = manager.add("conn-a".to_string(), Some(5)).await;
    let mut rx_b = manager.add("conn-b".to_string(), Some(5)).await;
    let mut rx_other = manager.add("conn-c".to_string(), Some(9)).await;
    let mut rx_anon = manager.add("conn-d".to_string(), None).await;

    let delivered = manager
        .send_to_user(5, Message::Text("for user five".into()))
        .await;
    assert_eq!(delivered, 2);

    for rx in [&mut rx_a, &mut rx_b] {
        let msg = rx.recv().await.expect("group member should receive");
        assert!(matches!(&msg, Message::Text(t) if *t == "for user five"));
    }

    // Neither the other user nor the anonymous connection got anything.
    assert!(rx_other.try_recv().is_err());
    assert!(rx_anon.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: send_to_user() to a disconnected user delivers nowhere
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_absent_user_delivers_to_zero_connections() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string(), Some(1)).await;

    let delivered = manager
        .send_to_user(42, Message::Text("anyone home?".into()))
        .await;
    assert_eq!(delivered, 0);
}

// ---------------------------------------------------------------------------
// Test: get_by_user() lists exactly the group's connection ids
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_by_user_returns_group_connection_ids() {
    let manager = WsManager::new();

    let _rx1 = manager.add("conn-1".to_string(), Some(7)).await;
    let _rx2 = manager.add("conn-2".to_string(), Some(7)).await;
    let _rx3 = manager.add("conn-3".to_string(), Some(8)).await;

    let mut ids = manager.get_by_user(7).await;
    ids.sort();
    assert_eq!(ids, vec!["conn-1".to_string(), "conn-2".to_string()]);
}

// ---------------------------------------------------------------------------
// Test: broadcast() skips closed channels without panicking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_skips_closed_channels() {
    let manager = WsManager::new();

    let rx1 = manager.add("conn-1".to_string(), None).await;
    let mut rx2 = manager.add("conn-2".to_string(), None).await;

    // Drop rx1 to close its channel.
    drop(rx1);

    // Broadcast should not panic even though conn-1's channel is closed.
    let payload = Message::Text("still alive".into());
    manager.broadcast(payload).await;

    // conn-2 should still receive the message.
    let msg = rx2.recv().await.expect("rx2 should receive broadcast");
    assert!(matches!(&msg, Message::Text(t) if *t == "still alive"));
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears all connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string(), Some(1)).await;
    let mut rx2 = manager.add("conn-2".to_string(), None).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.shutdown_all().await;

    // Connection count should be zero after shutdown.
    assert_eq!(manager.connection_count().await, 0);

    // Both receivers should have received a Close message.
    for rx in [&mut rx1, &mut rx2] {
        let msg = rx.recv().await.expect("should receive Close");
        assert_matches!(msg, Message::Close(None));
    }

    // After Close, the channel should be closed (no more messages).
    assert!(
        rx1.recv().await.is_none(),
        "Channel should be closed after shutdown"
    );
}

// ---------------------------------------------------------------------------
// Test: adding with duplicate ID replaces the previous connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_id_replaces_previous_connection() {
    let manager = WsManager::new();

    let _rx_old = manager.add("conn-1".to_string(), None).await;
    assert_eq!(manager.connection_count().await, 1);

    // Re-add with the same ID -- should replace, not duplicate.
    let mut rx_new = manager.add("conn-1".to_string(), None).await;
    assert_eq!(manager.connection_count().await, 1);

    // Broadcast to verify the new receiver gets the message.
    manager.broadcast(Message::Text("replaced".into())).await;
    let msg = rx_new.recv().await.expect("New rx should receive message");
    assert!(matches!(&msg, Message::Text(t) if *t == "replaced"));
}
