//! End-to-end cart page flows: optimistic edits, rollback, and the undo
//! window for removals.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use vitrine_client::{CartPage, ClientConfig, MutableLine, MutationOutcome};
use vitrine_core::LineKey;
use vitrine_integration_tests::{RecordingNotifier, ScriptedRemote};

type TestCart = CartPage<Arc<ScriptedRemote>, Arc<RecordingNotifier>>;

fn cart_with_lines(lines: &[(&str, u32)]) -> (TestCart, Arc<ScriptedRemote>, Arc<RecordingNotifier>) {
    let config = ClientConfig::for_base_url("https://shop.example").unwrap();
    let remote = Arc::new(ScriptedRemote::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let mut page = CartPage::new(Arc::clone(&remote), Arc::clone(&notifier), &config);
    for (key, quantity) in lines {
        page.push_line(MutableLine::new(
            LineKey::new(*key),
            config.endpoints.cart_update.fill(key),
            config.endpoints.cart_remove.fill(key),
            *quantity,
        ));
    }
    (page, remote, notifier)
}

#[tokio::test]
async fn a_session_of_edits_converges_on_server_state() {
    let (mut cart, remote, notifier) = cart_with_lines(&[("1", 1), ("2", 2)]);

    // Increment line 1: confirmed with fresh totals.
    remote.push_ok(json!({
        "item": { "quantity": 2, "line_total_display": "$20.00" },
        "totals": {
            "subtotal_display": "$40.00",
            "shipping_display": "$5.00",
            "total_display": "$45.00"
        }
    }));
    assert!(cart
        .step_quantity(&LineKey::new("1"), 1)
        .await
        .is_committed());

    // Decrement line 2: the server rejects, the quantity snaps back.
    remote.push_status(500);
    assert_eq!(
        cart.step_quantity(&LineKey::new("2"), -1).await,
        MutationOutcome::RolledBack
    );

    assert_eq!(cart.line(&LineKey::new("1")).unwrap().quantity, 2);
    assert_eq!(cart.line(&LineKey::new("2")).unwrap().quantity, 2);
    assert_eq!(cart.totals().unwrap().total_display, "$45.00");
    // Exactly one failure notice for the rejected edit.
    assert_eq!(notifier.notices().len(), 1);
}

#[tokio::test]
async fn remove_then_undo_round_trip() {
    let (mut cart, remote, notifier) = cart_with_lines(&[("1", 1), ("2", 2)]);

    remote.push_ok(json!({
        "totals": {
            "subtotal_display": "$20.00",
            "shipping_display": "$5.00",
            "total_display": "$25.00"
        },
        "undo_token": "tok-9"
    }));
    assert!(cart.remove_line(&LineKey::new("1")).await.is_committed());
    assert!(cart.line(&LineKey::new("1")).is_none());

    // The removal notice offers the undo action keyed by the line.
    let notice = notifier.notices().into_iter().next().unwrap();
    assert_eq!(notice.action.unwrap().key, "1");

    remote.push_ok(json!({ "success": true }));
    assert!(cart.undo_remove(&LineKey::new("1")).await);
    assert!(cart.reload_required());

    // The undo endpoint received the server's token back.
    let calls = remote.calls();
    assert_eq!(calls.last().unwrap().1, json!({ "token": "tok-9" }));
}

#[tokio::test(start_paused = true)]
async fn an_expired_undo_window_makes_the_removal_final() {
    let (mut cart, remote, _notifier) = cart_with_lines(&[("1", 1)]);

    remote.push_ok(json!({ "undo_token": "tok-9" }));
    cart.remove_line(&LineKey::new("1")).await;

    tokio::time::sleep(Duration::from_secs(8)).await;
    tokio::task::yield_now().await;

    assert!(!cart.undo_remove(&LineKey::new("1")).await);
    assert!(!cart.reload_required());
    assert_eq!(remote.call_count(), 1);
}

#[tokio::test]
async fn a_removal_without_a_token_is_immediately_final() {
    let (mut cart, remote, _notifier) = cart_with_lines(&[("1", 1)]);

    remote.push_ok(json!({
        "totals": {
            "subtotal_display": "$0.00",
            "shipping_display": "Free",
            "total_display": "$0.00"
        }
    }));
    assert!(cart.remove_line(&LineKey::new("1")).await.is_committed());

    // No token, no undo: the attempt does not even reach the remote.
    assert!(!cart.undo_remove(&LineKey::new("1")).await);
    assert_eq!(remote.call_count(), 1);
}

#[tokio::test]
async fn a_rejected_removal_leaves_the_cart_intact() {
    let (mut cart, remote, notifier) = cart_with_lines(&[("1", 1), ("2", 2)]);

    remote.push_status(502);
    assert_eq!(
        cart.remove_line(&LineKey::new("1")).await,
        MutationOutcome::RolledBack
    );

    let keys: Vec<_> = cart.lines().iter().map(|l| l.key.as_str()).collect();
    assert_eq!(keys, ["1", "2"]);
    assert_eq!(notifier.notices().len(), 1);
}
