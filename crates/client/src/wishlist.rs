//! Wishlist controller with positional undo.
//!
//! Removing a card is optimistic and reversible: the card's position and
//! its successor are captured before the remote toggle, and an undo within
//! the window re-toggles server-side and reinserts the card in its original
//! slot. Moving cards to the cart removes them quietly - the cart endpoint
//! already detached them server-side, so no second toggle is issued.
//!
//! Every confirmed change emits a cross-view pulse so sibling views (the
//! header badge, another tab) reload their counts.

use tracing::instrument;
use vitrine_core::{BulkAddResponse, ProductKey, VariantKey};

use crate::broadcast::{CrossViewBroadcaster, PulseSubscription};
use crate::config::ClientConfig;
use crate::mutation::{MutationOutcome, UndoRegistry};
use crate::notify::{Notice, Notifier};
use crate::remote::{Endpoint, RemoteClient};

const REMOVE_FAILED: &str = "Could not update the wishlist. Please try again.";
const UNDO_FAILED: &str = "Could not restore the item.";
const MOVE_FAILED: &str = "Could not add the item to the cart.";
const MOVED_TO_CART: &str = "Added to cart";

/// One wishlist card.
#[derive(Debug, Clone)]
pub struct WishlistCard {
    /// Product key identifying the card.
    pub key: ProductKey,
    /// Preselected variant, when the card has one.
    pub variant: Option<VariantKey>,
    /// Remote endpoint toggling this product's wishlist membership.
    pub favorite_endpoint: Endpoint,
    pending: bool,
}

impl WishlistCard {
    /// Create a card.
    #[must_use]
    pub fn new(key: ProductKey, favorite_endpoint: Endpoint) -> Self {
        Self {
            key,
            variant: None,
            favorite_endpoint,
            pending: false,
        }
    }

    /// Attach a preselected variant.
    #[must_use]
    pub fn with_variant(mut self, variant: VariantKey) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Whether a mutation for this card is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Snapshot of a removed card and where it sat.
#[derive(Debug, Clone)]
struct RemovedCard {
    card: WishlistCard,
    index: usize,
    successor: Option<ProductKey>,
}

/// Controller for the wishlist page.
pub struct WishlistPage<R, N> {
    remote: R,
    notifier: N,
    cards: Vec<WishlistCard>,
    count: u32,
    cart_endpoint: Endpoint,
    bulk_endpoint: Endpoint,
    removed: UndoRegistry<RemovedCard>,
    broadcaster: CrossViewBroadcaster,
    siblings: PulseSubscription,
    reload_required: bool,
    bulk_pending: bool,
}

impl<R: RemoteClient, N: Notifier> WishlistPage<R, N> {
    /// Create an empty wishlist page.
    pub fn new(
        remote: R,
        notifier: N,
        config: &ClientConfig,
        broadcaster: CrossViewBroadcaster,
    ) -> Self {
        Self {
            remote,
            notifier,
            cards: Vec::new(),
            count: 0,
            cart_endpoint: config.endpoints.cart_add.clone(),
            bulk_endpoint: config.endpoints.wishlist_bulk.clone(),
            removed: UndoRegistry::new(config.undo_window),
            siblings: broadcaster.subscribe(),
            broadcaster,
            reload_required: false,
            bulk_pending: false,
        }
    }

    /// Add a rendered card to the page.
    pub fn push_card(&mut self, card: WishlistCard) {
        self.cards.push(card);
        self.count += 1;
    }

    /// The page's cards, in display order.
    #[must_use]
    pub fn cards(&self) -> &[WishlistCard] {
        &self.cards
    }

    /// Look up one card by product key.
    #[must_use]
    pub fn card(&self, key: &ProductKey) -> Option<&WishlistCard> {
        self.cards.iter().find(|card| &card.key == key)
    }

    /// The wishlist count shown in the header badge.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Whether no cards remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Poll for changes made by sibling views.
    ///
    /// Any sibling pulse flags a full reload; pulses never carry enough
    /// state to patch the page in place, and this view's own pulses are
    /// filtered out by the subscription.
    pub fn observe_siblings(&mut self) -> bool {
        if self.siblings.pulse_observed() {
            self.reload_required = true;
        }
        self.reload_required
    }

    /// Whether a sibling change left this view stale.
    #[must_use]
    pub const fn reload_required(&self) -> bool {
        self.reload_required
    }

    /// Remove a card, opening an undo window on confirmation.
    #[instrument(skip(self), fields(product = %key))]
    pub async fn remove_card(&mut self, key: &ProductKey) -> MutationOutcome {
        let Some(index) = self.cards.iter().position(|card| &card.key == key) else {
            return MutationOutcome::Ignored;
        };
        if self.cards[index].pending {
            tracing::debug!(product = %key, "removal ignored, card already pending");
            return MutationOutcome::Ignored;
        }

        // Capture the slot before the card leaves it.
        let successor = self.cards.get(index + 1).map(|card| card.key.clone());
        let card = self.cards.remove(index);
        let endpoint = card.favorite_endpoint.clone();

        match self.remote.call(&endpoint, serde_json::json!({})).await {
            Ok(_) => {
                self.count = self.count.saturating_sub(1);
                self.removed.insert(
                    key.as_str(),
                    RemovedCard {
                        card,
                        index,
                        successor,
                    },
                );
                self.notifier.show(Notice::with_action(
                    "Removed from wishlist",
                    "Undo",
                    key.as_str(),
                ));
                self.broadcaster.pulse();
                MutationOutcome::Committed
            }
            Err(e) => {
                tracing::warn!(error = %e, product = %key, "wishlist removal rejected");
                self.cards.insert(index.min(self.cards.len()), card);
                self.notifier.show(Notice::text(REMOVE_FAILED));
                MutationOutcome::RolledBack
            }
        }
    }

    /// Reverse a removal within its undo window.
    ///
    /// The card returns to its captured slot: before its old successor when
    /// that card is still present, at the captured index otherwise, at the
    /// end when the list has shrunk past it. Returns `false` when the
    /// window expired or the server refused the re-add.
    #[instrument(skip(self), fields(product = %key))]
    pub async fn undo_remove(&mut self, key: &ProductKey) -> bool {
        let Some(entry) = self.removed.take(key.as_str()) else {
            tracing::debug!(product = %key, "undo window closed, removal stands");
            return false;
        };

        let endpoint = entry.card.favorite_endpoint.clone();
        match self.remote.call(&endpoint, serde_json::json!({})).await {
            Ok(_) => {
                let index = entry
                    .successor
                    .as_ref()
                    .and_then(|succ| self.cards.iter().position(|card| &card.key == succ))
                    .unwrap_or_else(|| entry.index.min(self.cards.len()));
                self.cards.insert(index, entry.card);
                self.count += 1;
                self.broadcaster.pulse();
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, product = %key, "wishlist undo rejected");
                self.notifier.show(Notice::text(UNDO_FAILED));
                false
            }
        }
    }

    /// Move one card into the cart.
    ///
    /// Two remote calls: the cart add, then the wishlist toggle that
    /// detaches the entry server-side - the cart endpoint does not touch
    /// the wishlist. The removal is quiet (no undo window, no undo
    /// notice); a rejected toggle restores the card so the view keeps
    /// matching the server wishlist.
    #[instrument(skip(self), fields(product = %key))]
    pub async fn move_to_cart(&mut self, key: &ProductKey) -> MutationOutcome {
        let Some(index) = self.cards.iter().position(|card| &card.key == key) else {
            return MutationOutcome::Ignored;
        };
        if self.cards[index].pending {
            return MutationOutcome::Ignored;
        }
        let Some(variant) = self.cards[index].variant.clone() else {
            tracing::debug!(product = %key, "card has no variant to add");
            return MutationOutcome::Ignored;
        };
        self.cards[index].pending = true;

        let payload = serde_json::json!({
            "product_variant_id": variant.as_str(),
            "quantity": 1,
        });
        if let Err(e) = self.remote.call(&self.cart_endpoint, payload).await {
            tracing::warn!(error = %e, product = %key, "move to cart rejected");
            if let Some(card) = self.cards.iter_mut().find(|card| &card.key == key) {
                card.pending = false;
            }
            self.notifier.show(Notice::text(MOVE_FAILED));
            return MutationOutcome::RolledBack;
        }
        self.notifier.show(Notice::text(MOVED_TO_CART));

        // Position may have shifted while awaiting.
        let Some(index) = self.cards.iter().position(|card| &card.key == key) else {
            return MutationOutcome::Committed;
        };
        let mut card = self.cards.remove(index);
        let endpoint = card.favorite_endpoint.clone();

        match self.remote.call(&endpoint, serde_json::json!({})).await {
            Ok(_) => {
                self.count = self.count.saturating_sub(1);
                self.broadcaster.pulse();
                MutationOutcome::Committed
            }
            Err(e) => {
                tracing::warn!(error = %e, product = %key, "wishlist detach rejected");
                card.pending = false;
                self.cards.insert(index.min(self.cards.len()), card);
                self.notifier.show(Notice::text(REMOVE_FAILED));
                MutationOutcome::RolledBack
            }
        }
    }

    /// Move every card into the cart in one remote call.
    ///
    /// On confirmation the page empties, pending undo windows close, and
    /// the notice reports how many of the attempted items were added.
    #[instrument(skip(self))]
    pub async fn move_all_to_cart(&mut self) -> MutationOutcome {
        if self.bulk_pending {
            tracing::debug!("bulk move ignored, already pending");
            return MutationOutcome::Ignored;
        }
        if self.cards.is_empty() {
            return MutationOutcome::Ignored;
        }
        self.bulk_pending = true;

        let result = self
            .remote
            .call(&self.bulk_endpoint, serde_json::json!({}))
            .await;
        self.bulk_pending = false;

        match result {
            Ok(value) => {
                let response: BulkAddResponse =
                    serde_json::from_value(value).unwrap_or_default();
                self.cards.clear();
                self.count = 0;
                self.removed.clear();
                self.notifier.show(Notice::text(format!(
                    "Added {} of {} items to the cart",
                    response.added, response.total
                )));
                self.broadcaster.pulse();
                MutationOutcome::Committed
            }
            Err(e) => {
                tracing::warn!(error = %e, "bulk move rejected");
                self.notifier.show(Notice::text(MOVE_FAILED));
                MutationOutcome::RolledBack
            }
        }
    }
}
