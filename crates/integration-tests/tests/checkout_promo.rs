//! Checkout summary flows: the promo code lifecycle and final removals.

use std::sync::Arc;

use serde_json::json;
use vitrine_client::{CheckoutPage, ClientConfig, MutableLine, MutationOutcome};
use vitrine_core::{LineKey, PromoPresentation};
use vitrine_integration_tests::{RecordingNotifier, ScriptedRemote};

type TestCheckout = CheckoutPage<Arc<ScriptedRemote>, Arc<RecordingNotifier>>;

fn checkout() -> (TestCheckout, Arc<ScriptedRemote>, Arc<RecordingNotifier>) {
    let config = ClientConfig::for_base_url("https://shop.example").unwrap();
    let remote = Arc::new(ScriptedRemote::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let mut page = CheckoutPage::new(Arc::clone(&remote), Arc::clone(&notifier), &config);
    for (key, quantity) in [("1", 2), ("2", 1)] {
        page.push_line(MutableLine::new(
            LineKey::new(key),
            config.endpoints.cart_update.fill(key),
            config.endpoints.cart_remove.fill(key),
            quantity,
        ));
    }
    (page, remote, notifier)
}

#[tokio::test]
async fn the_promo_lifecycle_mirrors_server_state() {
    let (mut checkout, remote, _notifier) = checkout();

    // Stored below minimum: pending styling, input mirrors the code.
    remote.push_ok(json!({
        "promo": {
            "code": "SPRING",
            "is_applied": false,
            "min_total_display": "$80.00"
        }
    }));
    assert!(checkout.apply_promo("spring").await.is_committed());
    assert_eq!(checkout.promo_input(), "SPRING");
    assert!(matches!(
        checkout.promo().unwrap().presentation(),
        PromoPresentation::StoredPending(_)
    ));

    // The order grows past the minimum; reapplying activates the code.
    remote.push_ok(json!({
        "totals": {
            "subtotal_display": "$90.00",
            "discount_display": "-$9.00",
            "shipping_display": "Free",
            "total_display": "$81.00"
        },
        "promo": {
            "code": "SPRING",
            "is_applied": true,
            "discount_display": "10%"
        }
    }));
    assert!(checkout.apply_promo("SPRING").await.is_committed());
    assert!(checkout.totals().unwrap().has_discount());
    assert!(matches!(
        checkout.promo().unwrap().presentation(),
        PromoPresentation::Applied(_)
    ));

    // Clearing resets the panel and empties the input.
    remote.push_ok(json!({
        "totals": {
            "subtotal_display": "$90.00",
            "shipping_display": "Free",
            "total_display": "$90.00"
        },
        "promo": { "is_applied": false }
    }));
    assert!(checkout.clear_promo().await.is_committed());
    assert_eq!(checkout.promo_input(), "");
    assert!(matches!(
        checkout.promo().unwrap().presentation(),
        PromoPresentation::Hidden
    ));
}

#[tokio::test]
async fn an_invalid_code_surfaces_the_server_message() {
    let (mut checkout, remote, notifier) = checkout();

    remote.push_ok(json!({
        "promo": {
            "message": "This code has expired.",
            "recoverable": false
        },
        "message": "This code has expired."
    }));
    checkout.apply_promo("OLDCODE").await;

    assert_eq!(
        checkout.promo().unwrap().presentation(),
        PromoPresentation::Error("This code has expired.".to_owned())
    );
    assert_eq!(
        notifier.messages(),
        vec!["This code has expired.".to_owned()]
    );
}

#[tokio::test]
async fn a_blank_code_never_reaches_the_remote() {
    let (mut checkout, remote, notifier) = checkout();

    assert_eq!(
        checkout.apply_promo("   ").await,
        MutationOutcome::Ignored
    );
    assert_eq!(remote.call_count(), 0);
    assert_eq!(notifier.notices().len(), 1);
}

#[tokio::test]
async fn checkout_removals_update_the_item_count() {
    let (mut checkout, remote, _notifier) = checkout();
    assert_eq!(checkout.item_count(), 3);

    remote.push_ok(json!({
        "totals": {
            "subtotal_display": "$10.00",
            "shipping_display": "Free",
            "total_display": "$10.00"
        }
    }));
    assert!(checkout.remove_line(&LineKey::new("1")).await.is_committed());

    assert_eq!(checkout.item_count(), 1);
    assert!(!checkout.is_empty());
}
