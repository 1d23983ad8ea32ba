//! Cart page controller.
//!
//! Quantity steps and removals apply optimistically per line, then confirm
//! remotely; the server response carries authoritative totals and promo
//! state which replace the local values wholesale. A confirmed removal
//! opens a time-boxed undo window keyed by the line; reversing it succeeds
//! server-side first, after which the whole view must reload rather than
//! patch itself.

use tracing::instrument;
use vitrine_core::{LineKey, PromoState, Totals};

use crate::config::ClientConfig;
use crate::mutation::{
    remove_line_remote, stepped_quantity, sync_line_quantity, MutableLine, MutationOutcome,
    UndoRegistry,
};
use crate::notify::{Notice, Notifier};
use crate::remote::{Endpoint, RemoteClient};

const UPDATE_FAILED: &str = "Could not update the cart. Please try again.";
const REMOVE_FAILED: &str = "Could not remove the item. Please try again.";
const UNDO_FAILED: &str = "Could not restore the item.";

/// Controller for the cart page.
pub struct CartPage<R, N> {
    remote: R,
    notifier: N,
    lines: Vec<MutableLine>,
    totals: Option<Totals>,
    promo: Option<PromoState>,
    undo_endpoint: Endpoint,
    undo_tokens: UndoRegistry<String>,
    reload_required: bool,
}

impl<R: RemoteClient, N: Notifier> CartPage<R, N> {
    /// Create an empty cart page bound to a remote and a notifier.
    pub fn new(remote: R, notifier: N, config: &ClientConfig) -> Self {
        Self {
            remote,
            notifier,
            lines: Vec::new(),
            totals: None,
            promo: None,
            undo_endpoint: config.endpoints.cart_undo.clone(),
            undo_tokens: UndoRegistry::new(config.undo_window),
            reload_required: false,
        }
    }

    /// Add a rendered line to the page.
    pub fn push_line(&mut self, line: MutableLine) {
        self.lines.push(line);
    }

    /// The page's lines, in display order.
    #[must_use]
    pub fn lines(&self) -> &[MutableLine] {
        &self.lines
    }

    /// Look up one line by key.
    #[must_use]
    pub fn line(&self, key: &LineKey) -> Option<&MutableLine> {
        self.lines.iter().find(|line| &line.key == key)
    }

    /// Current authoritative totals, if the server has sent any.
    #[must_use]
    pub const fn totals(&self) -> Option<&Totals> {
        self.totals.as_ref()
    }

    /// Current promo state, if the server has sent any.
    #[must_use]
    pub const fn promo(&self) -> Option<&PromoState> {
        self.promo.as_ref()
    }

    /// Whether a confirmed undo left the view stale.
    ///
    /// After a successful undo the server-side cart differs from the local
    /// lines in ways the response does not describe; the host must reload
    /// the page instead of patching it.
    #[must_use]
    pub const fn reload_required(&self) -> bool {
        self.reload_required
    }

    /// Step a line's quantity by `delta`, clamped to a minimum of 1.
    ///
    /// A step that clamps to the current value is a no-op and issues no
    /// remote call.
    #[instrument(skip(self), fields(line = %key))]
    pub async fn step_quantity(&mut self, key: &LineKey, delta: i32) -> MutationOutcome {
        let Some(line) = self.line(key) else {
            return MutationOutcome::Ignored;
        };
        let next = stepped_quantity(line.quantity, delta);
        self.set_quantity(key, next).await
    }

    /// Set a line's quantity directly; values below 1 are clamped to 1.
    #[instrument(skip(self), fields(line = %key))]
    pub async fn set_quantity(&mut self, key: &LineKey, quantity: u32) -> MutationOutcome {
        let sync = sync_line_quantity(
            &mut self.lines,
            &self.remote,
            &self.notifier,
            key,
            quantity.max(1),
            UPDATE_FAILED,
        )
        .await;
        self.absorb(sync.totals, sync.promo);
        sync.outcome
    }

    /// Remove a line, opening an undo window when the server grants one.
    #[instrument(skip(self), fields(line = %key))]
    pub async fn remove_line(&mut self, key: &LineKey) -> MutationOutcome {
        let (outcome, response) = remove_line_remote(
            &mut self.lines,
            &self.remote,
            &self.notifier,
            key,
            REMOVE_FAILED,
        )
        .await;

        if let Some(response) = response {
            self.absorb(response.totals, response.promo);
            // Only a token-bearing removal gets a notice; without one
            // there is nothing to offer and the row vanishing says enough.
            if let Some(token) = response.undo_token {
                self.undo_tokens.insert(key.as_str(), token);
                self.notifier
                    .show(Notice::with_action("Item removed", "Undo", key.as_str()));
            }
        }
        outcome
    }

    /// Reverse a confirmed removal within its undo window.
    ///
    /// Returns `false` when the window has already expired or no removal is
    /// registered for `key`; the removal then stands as final. A successful
    /// undo consumes the token and flags the view for a full reload.
    #[instrument(skip(self), fields(line = %key))]
    pub async fn undo_remove(&mut self, key: &LineKey) -> bool {
        let Some(token) = self.undo_tokens.take(key.as_str()) else {
            tracing::debug!(line = %key, "undo window closed, removal stands");
            return false;
        };

        let result = self
            .remote
            .call(&self.undo_endpoint, serde_json::json!({ "token": token }))
            .await;

        match result {
            Ok(_) => {
                // The response does not carry the restored line; only a
                // reload shows the cart the server now holds.
                self.reload_required = true;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, line = %key, "undo rejected");
                self.notifier.show(Notice::text(UNDO_FAILED));
                false
            }
        }
    }

    fn absorb(&mut self, totals: Option<Totals>, promo: Option<PromoState>) {
        if let Some(totals) = totals {
            self.totals = Some(totals);
        }
        if let Some(promo) = promo {
            self.promo = Some(promo);
        }
    }
}
