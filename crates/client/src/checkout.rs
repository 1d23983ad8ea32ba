//! Checkout summary controller.
//!
//! The summary shares the cart's optimistic line engine but removals here
//! are final - checkout offers no undo window. It additionally owns the
//! promo code form: applying and clearing a code are remote-confirmed
//! mutations guarded by their own pending gate, and the input field always
//! mirrors the server-confirmed code.

use tracing::instrument;
use vitrine_core::{LineKey, PromoResponse, PromoState, Totals};

use crate::config::ClientConfig;
use crate::mutation::{
    remove_line_remote, stepped_quantity, sync_line_quantity, MutableLine, MutationOutcome,
};
use crate::notify::{Notice, Notifier};
use crate::remote::{Endpoint, RemoteClient};

const UPDATE_FAILED: &str = "Could not update the order. Please try again.";
const REMOVE_FAILED: &str = "Could not remove the item. Please try again.";
const PROMO_FAILED: &str = "Could not apply the promo code. Please try again.";
const PROMO_EMPTY: &str = "Enter a promo code first.";
const PROMO_APPLIED: &str = "Promo code applied.";

/// Controller for the checkout summary.
pub struct CheckoutPage<R, N> {
    remote: R,
    notifier: N,
    lines: Vec<MutableLine>,
    totals: Option<Totals>,
    promo: Option<PromoState>,
    promo_endpoint: Endpoint,
    promo_pending: bool,
    promo_input: String,
}

impl<R: RemoteClient, N: Notifier> CheckoutPage<R, N> {
    /// Create an empty checkout summary bound to a remote and a notifier.
    pub fn new(remote: R, notifier: N, config: &ClientConfig) -> Self {
        Self {
            remote,
            notifier,
            lines: Vec::new(),
            totals: None,
            promo: None,
            promo_endpoint: config.endpoints.promo.clone(),
            promo_pending: false,
            promo_input: String::new(),
        }
    }

    /// Add a rendered line to the summary.
    pub fn push_line(&mut self, line: MutableLine) {
        self.lines.push(line);
    }

    /// The summary's lines, in display order.
    #[must_use]
    pub fn lines(&self) -> &[MutableLine] {
        &self.lines
    }

    /// Look up one line by key.
    #[must_use]
    pub fn line(&self, key: &LineKey) -> Option<&MutableLine> {
        self.lines.iter().find(|line| &line.key == key)
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Whether no lines remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
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

    /// Current content of the promo input field.
    #[must_use]
    pub fn promo_input(&self) -> &str {
        &self.promo_input
    }

    /// Step a line's quantity by `delta`, clamped to a minimum of 1.
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

    /// Remove a line from the order. Checkout removals are final.
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
        }
        outcome
    }

    /// Apply a promo code to the order.
    ///
    /// A whitespace-only code is rejected locally with a notice and no
    /// remote call. On confirmation the input mirrors the server-confirmed
    /// code; a rejection that still carries promo state (an invalid or
    /// below-minimum code the server remembers) updates the panel too.
    #[instrument(skip(self, code))]
    pub async fn apply_promo(&mut self, code: &str) -> MutationOutcome {
        let code = code.trim();
        if code.is_empty() {
            self.notifier.show(Notice::text(PROMO_EMPTY));
            return MutationOutcome::Ignored;
        }
        self.submit_promo(
            serde_json::json!({
                "intent": "apply",
                "next": "checkout",
                "promo": code,
            }),
            Some(PROMO_APPLIED),
        )
        .await
    }

    /// Clear the applied promo code.
    #[instrument(skip(self))]
    pub async fn clear_promo(&mut self) -> MutationOutcome {
        self.submit_promo(
            serde_json::json!({
                "intent": "clear",
                "next": "checkout",
            }),
            None,
        )
        .await
    }

    async fn submit_promo(
        &mut self,
        payload: serde_json::Value,
        default_message: Option<&str>,
    ) -> MutationOutcome {
        if self.promo_pending {
            tracing::debug!("promo submission ignored, already pending");
            return MutationOutcome::Ignored;
        }
        self.promo_pending = true;

        let result = self.remote.call(&self.promo_endpoint, payload).await;
        self.promo_pending = false;

        let response = match result {
            Ok(value) => match serde_json::from_value::<PromoResponse>(value) {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(error = %e, "malformed promo response");
                    self.notifier.show(Notice::text(PROMO_FAILED));
                    return MutationOutcome::RolledBack;
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "promo submission rejected");
                self.notifier.show(Notice::text(PROMO_FAILED));
                return MutationOutcome::RolledBack;
            }
        };

        // The server's own message wins over the default confirmation.
        if let Some(message) = &response.message {
            self.notifier.show(Notice::text(message.clone()));
        } else if let Some(message) = default_message {
            self.notifier.show(Notice::text(message));
        }
        self.absorb(response.totals, response.promo);
        // The input always tracks what the server currently holds.
        self.promo_input = self
            .promo
            .as_ref()
            .and_then(|p| p.code.clone())
            .unwrap_or_default();
        MutationOutcome::Committed
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
