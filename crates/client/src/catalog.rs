//! Variant index and selection resolution.
//!
//! Pure functions over `(index, selection)` - no I/O, no side effects. The
//! view layer re-derives selector enabled/disabled state and the displayed
//! variant after every selection change.

use std::collections::BTreeSet;

use vitrine_core::{AttributeKey, LocationKey, RawVariantRecord, Variant, VariantKey};

/// The user's current, possibly partial, attribute choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Chosen color attribute.
    pub color: Option<AttributeKey>,
    /// Chosen size attribute.
    pub size: Option<AttributeKey>,
    /// Chosen fulfillment location.
    pub location: Option<LocationKey>,
}

impl Selection {
    /// A selection pinned to every attribute of a variant.
    #[must_use]
    pub fn of_variant(variant: &Variant) -> Self {
        Self {
            color: variant.color.clone(),
            size: variant.size.clone(),
            location: variant.location.clone(),
        }
    }
}

/// Immutable, normalized table of purchasable variants.
///
/// Built once from the server-embedded snapshot; no two variants are
/// merged or deduplicated, even when attribute-equivalent. An empty index
/// disables every dependent surface.
#[derive(Debug, Clone, Default)]
pub struct VariantIndex {
    variants: Vec<Variant>,
}

impl VariantIndex {
    /// Build an index from raw snapshot records.
    ///
    /// Records without an identifier are dropped; everything else is
    /// retained in snapshot order.
    #[must_use]
    pub fn from_records(records: Vec<RawVariantRecord>) -> Self {
        Self {
            variants: records
                .into_iter()
                .filter_map(Variant::from_record)
                .collect(),
        }
    }

    /// Whether the index holds no variants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Number of variants in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// All variants in snapshot order.
    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Look up a variant by key.
    #[must_use]
    pub fn get(&self, key: &VariantKey) -> Option<&Variant> {
        self.variants.iter().find(|v| &v.key == key)
    }

    /// Resolve a selection to the best-matching variant.
    ///
    /// Deterministic tie-break order:
    /// 1. exact match on every non-null field of the selection;
    /// 2. color and size both set: match on color+size ignoring location;
    /// 3. location set: first variant with that location;
    /// 4. color set: first variant with that color;
    /// 5. size set: first variant with that size;
    /// 6. the first variant in index order.
    ///
    /// Returns `None` only when the index is empty.
    #[must_use]
    pub fn resolve(&self, selection: &Selection) -> Option<&Variant> {
        let exact = self.variants.iter().find(|v| {
            selection
                .color
                .as_ref()
                .is_none_or(|c| v.color.as_ref() == Some(c))
                && selection
                    .size
                    .as_ref()
                    .is_none_or(|s| v.size.as_ref() == Some(s))
                && selection
                    .location
                    .as_ref()
                    .is_none_or(|l| v.location.as_ref() == Some(l))
        });
        if exact.is_some() {
            return exact;
        }

        if let (Some(color), Some(size)) = (&selection.color, &selection.size)
            && let Some(found) = self
                .variants
                .iter()
                .find(|v| v.color.as_ref() == Some(color) && v.size.as_ref() == Some(size))
        {
            return Some(found);
        }

        if let Some(location) = &selection.location
            && let Some(found) = self
                .variants
                .iter()
                .find(|v| v.location.as_ref() == Some(location))
        {
            return Some(found);
        }

        if let Some(color) = &selection.color
            && let Some(found) = self
                .variants
                .iter()
                .find(|v| v.color.as_ref() == Some(color))
        {
            return Some(found);
        }

        if let Some(size) = &selection.size
            && let Some(found) = self.variants.iter().find(|v| v.size.as_ref() == Some(size))
        {
            return Some(found);
        }

        self.variants.first()
    }

    /// Sizes present among variants matching the current color, or among
    /// all variants when no color is chosen.
    #[must_use]
    pub fn available_sizes(&self, selection: &Selection) -> BTreeSet<AttributeKey> {
        self.variants
            .iter()
            .filter(|v| {
                selection
                    .color
                    .as_ref()
                    .is_none_or(|c| v.color.as_ref() == Some(c))
            })
            .filter_map(|v| v.size.clone())
            .collect()
    }

    /// Colors present among variants matching the current size, or among
    /// all variants when no size is chosen.
    #[must_use]
    pub fn available_colors(&self, selection: &Selection) -> BTreeSet<AttributeKey> {
        self.variants
            .iter()
            .filter(|v| {
                selection
                    .size
                    .as_ref()
                    .is_none_or(|s| v.size.as_ref() == Some(s))
            })
            .filter_map(|v| v.color.clone())
            .collect()
    }

    /// Locations among variants matching both current color and size.
    ///
    /// When no variant matches the combination at all, every location in
    /// the index is considered available - an over-constrained combination
    /// must not lock the location selector out entirely. Matching variants
    /// that carry no location keys yield an empty set instead: the
    /// combination is purchasable but not tied to any selectable location.
    #[must_use]
    pub fn available_locations(&self, selection: &Selection) -> BTreeSet<LocationKey> {
        let candidates: Vec<&Variant> = self
            .variants
            .iter()
            .filter(|v| {
                selection
                    .color
                    .as_ref()
                    .is_none_or(|c| v.color.as_ref() == Some(c))
                    && selection
                        .size
                        .as_ref()
                        .is_none_or(|s| v.size.as_ref() == Some(s))
            })
            .collect();

        if candidates.is_empty() {
            self.variants
                .iter()
                .filter_map(|v| v.location.clone())
                .collect()
        } else {
            candidates
                .into_iter()
                .filter_map(|v| v.location.clone())
                .collect()
        }
    }
}
