//! Remote mutation response shapes.
//!
//! Every optional field here is a defined no-op branch for the consumer,
//! never probed dynamically. A response missing `totals` simply leaves the
//! displayed totals untouched.

use serde::Deserialize;

use super::key::LineKey;
use super::promo::PromoState;
use super::totals::Totals;

/// Server-confirmed fields for a single updated line.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatedLine {
    /// Authoritative quantity after the update.
    pub quantity: u32,
    /// Authoritative line total.
    #[serde(default)]
    pub line_total_display: Option<String>,
}

/// Response to a cart or checkout line quantity update.
#[derive(Debug, Clone, Deserialize)]
pub struct LineUpdateResponse {
    /// The updated line, absent when the update removed it.
    #[serde(default)]
    pub item: Option<UpdatedLine>,
    /// Replacement totals.
    #[serde(default)]
    pub totals: Option<Totals>,
    /// Replacement promo state.
    #[serde(default)]
    pub promo: Option<PromoState>,
}

/// Response to a cart line or wishlist card removal.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveResponse {
    /// Replacement totals.
    #[serde(default)]
    pub totals: Option<Totals>,
    /// Replacement promo state.
    #[serde(default)]
    pub promo: Option<PromoState>,
    /// Present when the removal is reversible via the undo endpoint.
    #[serde(default)]
    pub undo_token: Option<String>,
}

/// Response to a bulk wishlist-to-cart move.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BulkAddResponse {
    /// How many items were actually added.
    #[serde(default)]
    pub added: u32,
    /// How many items were attempted.
    #[serde(default)]
    pub total: u32,
}

/// Response to a promo apply or clear intent.
#[derive(Debug, Clone, Deserialize)]
pub struct PromoResponse {
    /// Replacement totals.
    #[serde(default)]
    pub totals: Option<Totals>,
    /// Replacement promo state.
    #[serde(default)]
    pub promo: Option<PromoState>,
    /// Transient human message for the round trip.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response to adding a variant to the cart.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddToCartResponse {
    /// The cart line the variant landed in.
    #[serde(default)]
    pub id: Option<LineKey>,
    /// Server-confirmed quantity for that line.
    #[serde(default)]
    pub quantity: Option<u32>,
}
