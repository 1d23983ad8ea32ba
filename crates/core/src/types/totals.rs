//! Server-computed checkout totals.

use serde::{Deserialize, Serialize};

/// Aggregate totals as rendered by the server.
///
/// Always replaced wholesale from a mutation response; the client never
/// recomputes any of these locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Subtotal before discount and shipping.
    pub subtotal_display: String,
    /// Discount amount, absent when no discount applies.
    #[serde(default)]
    pub discount_display: Option<String>,
    /// Shipping cost.
    pub shipping_display: String,
    /// Grand total.
    pub total_display: String,
}

impl Totals {
    /// Whether a discount row should be shown at all.
    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.discount_display.is_some()
    }
}
