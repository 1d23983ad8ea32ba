//! Domain types for the storefront client.

mod key;
mod promo;
mod response;
mod totals;
mod variant;

pub use key::{AttributeKey, LineKey, LocationKey, ProductKey, VariantKey};
pub use promo::{PromoPresentation, PromoState};
pub use response::{
    AddToCartResponse, BulkAddResponse, LineUpdateResponse, PromoResponse, RemoveResponse,
    UpdatedLine,
};
pub use totals::Totals;
pub use variant::{RawVariantRecord, SnapshotError, Variant, VariantImage, parse_snapshot};
