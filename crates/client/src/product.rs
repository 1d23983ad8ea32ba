//! Product detail controller.
//!
//! Owns the attribute selection, the resolved variant, and the in-place
//! quantity panel that replaces the add-to-cart button once the variant is
//! in the cart. Changing any selector re-resolves the variant; when the
//! resolved variant changes, the panel resets because it referred to a
//! cart line of the previous variant.

use tracing::instrument;
use vitrine_core::{
    AddToCartResponse, AttributeKey, LineKey, LocationKey, Variant, VariantKey,
};

use crate::catalog::{Selection, VariantIndex};
use crate::config::ClientConfig;
use crate::mutation::MutationOutcome;
use crate::notify::{Notice, Notifier};
use crate::remote::{Endpoint, EndpointTemplate, RemoteClient};

const ADD_FAILED: &str = "Could not add the item to the cart.";
const UPDATE_FAILED: &str = "Could not update the cart. Please try again.";
const ADDED_TO_CART: &str = "Added to cart";

/// The in-place quantity stepper shown once the variant is in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityPanel {
    /// Cart line holding this variant, once the server has named it.
    pub line_key: Option<LineKey>,
    /// Displayed quantity.
    pub quantity: u32,
}

/// Controller for the product detail view.
pub struct ProductDetail<R, N> {
    remote: R,
    notifier: N,
    index: VariantIndex,
    selection: Selection,
    current: Option<VariantKey>,
    panel: Option<QuantityPanel>,
    cart_endpoint: Endpoint,
    update_template: EndpointTemplate,
    pending: bool,
}

impl<R: RemoteClient, N: Notifier> ProductDetail<R, N> {
    /// Create a controller over a variant index.
    ///
    /// The initial variant is `initial` when the index holds it, otherwise
    /// the first variant in snapshot order; an empty index leaves every
    /// surface disabled.
    pub fn new(
        remote: R,
        notifier: N,
        config: &ClientConfig,
        index: VariantIndex,
        initial: Option<&VariantKey>,
    ) -> Self {
        let current = initial
            .and_then(|key| index.get(key))
            .or_else(|| index.variants().first());
        let selection = current.map(Selection::of_variant).unwrap_or_default();
        let current = current.map(|v| v.key.clone());
        Self {
            remote,
            notifier,
            index,
            selection,
            current,
            panel: None,
            cart_endpoint: config.endpoints.cart_add.clone(),
            update_template: config.endpoints.cart_update.clone(),
            pending: false,
        }
    }

    /// Whether purchasing surfaces are enabled at all.
    #[must_use]
    pub fn enabled(&self) -> bool {
        !self.index.is_empty()
    }

    /// The current selection.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The currently resolved variant.
    #[must_use]
    pub fn current_variant(&self) -> Option<&Variant> {
        self.current.as_ref().and_then(|key| self.index.get(key))
    }

    /// The quantity panel, present while the variant sits in the cart.
    #[must_use]
    pub const fn panel(&self) -> Option<&QuantityPanel> {
        self.panel.as_ref()
    }

    /// Sizes selectable under the current color choice.
    #[must_use]
    pub fn available_sizes(&self) -> std::collections::BTreeSet<AttributeKey> {
        self.index.available_sizes(&self.selection)
    }

    /// Colors selectable under the current size choice.
    #[must_use]
    pub fn available_colors(&self) -> std::collections::BTreeSet<AttributeKey> {
        self.index.available_colors(&self.selection)
    }

    /// Locations carrying the current color and size combination.
    #[must_use]
    pub fn available_locations(&self) -> std::collections::BTreeSet<LocationKey> {
        self.index.available_locations(&self.selection)
    }

    /// Choose a color and re-resolve the variant.
    pub fn select_color(&mut self, color: Option<AttributeKey>) {
        self.selection.color = color;
        self.reresolve();
    }

    /// Choose a size and re-resolve the variant.
    pub fn select_size(&mut self, size: Option<AttributeKey>) {
        self.selection.size = size;
        self.reresolve();
    }

    /// Choose a fulfillment location and re-resolve the variant.
    pub fn select_location(&mut self, location: Option<LocationKey>) {
        self.selection.location = location;
        self.reresolve();
    }

    fn reresolve(&mut self) {
        let resolved = self.index.resolve(&self.selection).map(|v| v.key.clone());
        if resolved != self.current {
            // The panel tracked a cart line of the previous variant.
            self.panel = None;
            self.current = resolved;
        }
    }

    /// Add the resolved variant to the cart.
    ///
    /// On confirmation the button gives way to the quantity panel seeded
    /// with the server-confirmed line and quantity.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&mut self, quantity: u32) -> MutationOutcome {
        if self.pending {
            tracing::debug!("add ignored, already pending");
            return MutationOutcome::Ignored;
        }
        let Some(variant) = self.current.clone() else {
            return MutationOutcome::Ignored;
        };
        let quantity = quantity.max(1);
        self.pending = true;

        let payload = serde_json::json!({
            "product_variant_id": variant.as_str(),
            "quantity": quantity,
        });
        let result = self.remote.call(&self.cart_endpoint, payload).await;
        self.pending = false;

        match result {
            Ok(value) => {
                let response: AddToCartResponse =
                    serde_json::from_value(value).unwrap_or_default();
                self.panel = Some(QuantityPanel {
                    line_key: response.id,
                    quantity: response.quantity.unwrap_or(quantity),
                });
                self.notifier.show(Notice::text(ADDED_TO_CART));
                MutationOutcome::Committed
            }
            Err(e) => {
                tracing::warn!(error = %e, variant = %variant, "add to cart rejected");
                self.notifier.show(Notice::text(ADD_FAILED));
                MutationOutcome::RolledBack
            }
        }
    }

    /// Step the panel quantity by `delta`.
    ///
    /// Stepping down to zero removes the line and closes the panel on
    /// confirmation; any rejected step restores the prior quantity and
    /// keeps the panel open.
    #[instrument(skip(self))]
    pub async fn step_quantity(&mut self, delta: i32) -> MutationOutcome {
        if self.pending {
            tracing::debug!("step ignored, already pending");
            return MutationOutcome::Ignored;
        }
        let Some(panel) = &self.panel else {
            return MutationOutcome::Ignored;
        };
        let Some(line_key) = panel.line_key.clone() else {
            tracing::debug!("step ignored, line not yet confirmed");
            return MutationOutcome::Ignored;
        };
        let prior = panel.quantity;
        let next = u32::try_from((i64::from(prior) + i64::from(delta)).max(0))
            .unwrap_or(u32::MAX);
        if next == prior {
            return MutationOutcome::Ignored;
        }

        // Optimistic; zero keeps the panel up until the server confirms.
        if let Some(panel) = &mut self.panel {
            panel.quantity = next;
        }
        self.pending = true;

        let endpoint = self.update_template.fill(line_key.as_str());
        let result = self
            .remote
            .call(&endpoint, serde_json::json!({ "quantity": next }))
            .await;
        self.pending = false;

        match result {
            Ok(_) => {
                if next == 0 {
                    // The line is gone; the button comes back.
                    self.panel = None;
                }
                MutationOutcome::Committed
            }
            Err(e) => {
                tracing::warn!(error = %e, line = %line_key, "quantity step rejected");
                if let Some(panel) = &mut self.panel {
                    panel.quantity = prior;
                }
                self.notifier.show(Notice::text(UPDATE_FAILED));
                MutationOutcome::RolledBack
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingNotifier, ScriptedRemote};
    use serde_json::json;
    use std::sync::Arc;
    use vitrine_core::RawVariantRecord;

    fn record(id: &str, color: &str, size: &str) -> RawVariantRecord {
        serde_json::from_value(json!({
            "id": id,
            "color_id": color,
            "size_id": size,
            "is_available": true,
        }))
        .unwrap()
    }

    fn detail(
        initial: Option<&VariantKey>,
    ) -> ProductDetail<Arc<ScriptedRemote>, Arc<RecordingNotifier>> {
        let config = ClientConfig::for_base_url("https://shop.example").unwrap();
        let index = VariantIndex::from_records(vec![
            record("v1", "red", "s"),
            record("v2", "red", "m"),
            record("v3", "blue", "s"),
        ]);
        ProductDetail::new(
            Arc::new(ScriptedRemote::new()),
            Arc::new(RecordingNotifier::new()),
            &config,
            index,
            initial,
        )
    }

    #[tokio::test]
    async fn initial_variant_pins_the_selection() {
        let detail = detail(Some(&VariantKey::new("v2")));
        let variant = detail.current_variant().unwrap();
        assert_eq!(variant.key, VariantKey::new("v2"));
        assert_eq!(detail.selection().color, Some(AttributeKey::new("red")));
        assert_eq!(detail.selection().size, Some(AttributeKey::new("m")));
    }

    #[tokio::test]
    async fn unknown_initial_falls_back_to_the_first_variant() {
        let detail = detail(Some(&VariantKey::new("missing")));
        assert_eq!(detail.current_variant().unwrap().key, VariantKey::new("v1"));
    }

    #[tokio::test]
    async fn add_to_cart_opens_the_panel_with_server_fields() {
        let mut detail = detail(None);
        detail.remote.push_ok(json!({ "id": 7, "quantity": 2 }));

        let outcome = detail.add_to_cart(2).await;

        assert_eq!(outcome, MutationOutcome::Committed);
        let panel = detail.panel().unwrap();
        assert_eq!(panel.line_key, Some(LineKey::new("7")));
        assert_eq!(panel.quantity, 2);
        assert_eq!(
            detail.remote.calls()[0].1,
            json!({ "product_variant_id": "v1", "quantity": 2 })
        );
    }

    #[tokio::test]
    async fn rejected_add_keeps_the_button() {
        let mut detail = detail(None);
        detail.remote.push_status(500);

        let outcome = detail.add_to_cart(1).await;

        assert_eq!(outcome, MutationOutcome::RolledBack);
        assert!(detail.panel().is_none());
        assert_eq!(detail.notifier.messages(), vec![ADD_FAILED.to_owned()]);
    }

    #[tokio::test]
    async fn changing_the_variant_resets_the_panel() {
        let mut detail = detail(None);
        detail.remote.push_ok(json!({ "id": 7, "quantity": 1 }));
        detail.add_to_cart(1).await;
        assert!(detail.panel().is_some());

        detail.select_size(Some(AttributeKey::new("m")));

        assert_eq!(detail.current_variant().unwrap().key, VariantKey::new("v2"));
        assert!(detail.panel().is_none());
    }

    #[tokio::test]
    async fn reselecting_the_same_variant_keeps_the_panel() {
        let mut detail = detail(None);
        detail.remote.push_ok(json!({ "id": 7, "quantity": 1 }));
        detail.add_to_cart(1).await;

        // Same color, same resolved variant.
        detail.select_color(Some(AttributeKey::new("red")));

        assert!(detail.panel().is_some());
    }

    #[tokio::test]
    async fn stepping_to_zero_closes_the_panel_on_confirmation() {
        let mut detail = detail(None);
        detail.remote.push_ok(json!({ "id": 7, "quantity": 1 }));
        detail.add_to_cart(1).await;

        detail.remote.push_ok(json!({ "removed": true }));
        let outcome = detail.step_quantity(-1).await;

        assert_eq!(outcome, MutationOutcome::Committed);
        assert!(detail.panel().is_none());
        assert_eq!(
            detail.remote.calls()[1].1,
            json!({ "quantity": 0 })
        );
    }

    #[tokio::test]
    async fn rejected_step_restores_quantity_and_keeps_the_panel() {
        let mut detail = detail(None);
        detail.remote.push_ok(json!({ "id": 7, "quantity": 2 }));
        detail.add_to_cart(2).await;

        detail.remote.push_status(502);
        let outcome = detail.step_quantity(-1).await;

        assert_eq!(outcome, MutationOutcome::RolledBack);
        let panel = detail.panel().unwrap();
        assert_eq!(panel.quantity, 2);
        assert_eq!(
            detail.notifier.messages().last().map(String::as_str),
            Some(UPDATE_FAILED)
        );
    }

    #[tokio::test]
    async fn empty_index_disables_everything() {
        let config = ClientConfig::for_base_url("https://shop.example").unwrap();
        let mut detail = ProductDetail::new(
            Arc::new(ScriptedRemote::new()),
            Arc::new(RecordingNotifier::new()),
            &config,
            VariantIndex::default(),
            None,
        );
        assert!(!detail.enabled());
        assert!(detail.current_variant().is_none());
        assert_eq!(detail.add_to_cart(1).await, MutationOutcome::Ignored);
        assert_eq!(detail.remote.call_count(), 0);
    }
}
