//! Purchasable variant records and the page-load snapshot they arrive in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::key::{AttributeKey, LocationKey, VariantKey};

/// Error parsing the server-embedded variant snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The embedded JSON could not be parsed.
    #[error("invalid variant snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parse the variant snapshot embedded once per page load.
///
/// An empty or whitespace-only document yields an empty list, matching the
/// "all dependent UI disabled" degradation for products without variants.
///
/// # Errors
///
/// Returns [`SnapshotError::Parse`] when the document is present but not
/// valid JSON for a list of variant records.
pub fn parse_snapshot(raw: &str) -> Result<Vec<RawVariantRecord>, SnapshotError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// One image in a variant gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantImage {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    #[serde(default)]
    pub alt: Option<String>,
}

/// A variant record exactly as embedded by the server.
///
/// Identifier fields tolerate both numeric and string JSON shapes; the
/// location arrives in one of three shapes (explicit key, raw id, or a
/// store name). [`Variant::from_record`] normalizes all of it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawVariantRecord {
    /// Variant identifier. Records without one are dropped.
    #[serde(default)]
    pub id: Option<VariantKey>,
    /// Color attribute id.
    #[serde(default)]
    pub color_id: Option<AttributeKey>,
    /// Size attribute id.
    #[serde(default)]
    pub size_id: Option<AttributeKey>,
    /// Explicit fulfillment-location key.
    #[serde(default)]
    pub store_key: Option<LocationKey>,
    /// Fulfillment-location id, used when no explicit key is present.
    #[serde(default)]
    pub store_id: Option<LocationKey>,
    /// Human-readable store name, the last-resort location shape.
    #[serde(default)]
    pub store: Option<String>,
    /// Display price string. The client never does arithmetic on this.
    #[serde(default)]
    pub price: Option<String>,
    /// Whether the variant is available for sale.
    #[serde(default)]
    pub is_available: bool,
    /// Gallery images.
    #[serde(default)]
    pub images: Vec<VariantImage>,
    /// Structure/material description.
    #[serde(default)]
    pub structure: Option<String>,
    /// Size display label.
    #[serde(default)]
    pub size_label: Option<String>,
    /// Color display name.
    #[serde(default)]
    pub color_name: Option<String>,
}

/// One purchasable SKU, normalized and immutable after index construction.
///
/// Two variants are never equal by identity but may share any subset of
/// color/size/location; attribute-equivalent records are all retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    /// Normalized variant key.
    pub key: VariantKey,
    /// Color attribute key, when the variant has one.
    pub color: Option<AttributeKey>,
    /// Size attribute key, when the variant has one.
    pub size: Option<AttributeKey>,
    /// Derived fulfillment-location key.
    pub location: Option<LocationKey>,
    /// Display price string.
    pub price_display: Option<String>,
    /// Whether the variant is available for sale.
    pub is_available: bool,
    /// Gallery images.
    pub images: Vec<VariantImage>,
    /// Structure/material description.
    pub structure: Option<String>,
    /// Size display label.
    pub size_label: Option<String>,
    /// Color display name.
    pub color_name: Option<String>,
    /// Store display name.
    pub store_name: Option<String>,
}

impl Variant {
    /// Normalize a raw record into a variant.
    ///
    /// Returns `None` when the record carries no identifier. The location
    /// key follows the precedence: explicit key, else stringified id, else
    /// a `name:`-prefixed normalized store name, else absent.
    #[must_use]
    pub fn from_record(record: RawVariantRecord) -> Option<Self> {
        let key = record.id?;
        let location = record
            .store_key
            .or(record.store_id)
            .or_else(|| record.store.as_deref().and_then(LocationKey::from_name));

        Some(Self {
            key,
            color: record.color_id,
            size: record.size_id,
            location,
            price_display: record.price,
            is_available: record.is_available,
            images: record.images,
            structure: record.structure,
            size_label: record.size_label,
            color_name: record.color_name,
            store_name: record.store,
        })
    }
}
