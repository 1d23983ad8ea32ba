//! Promo-code state as confirmed by the server.

use serde::{Deserialize, Serialize};

/// Server-confirmed promo state.
///
/// The displayed code must always mirror `code` after any round trip,
/// even on failure paths that still return a valid state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoState {
    /// The stored code, absent when no code is set.
    #[serde(default)]
    pub code: Option<String>,
    /// Whether the code currently affects totals.
    #[serde(default)]
    pub is_applied: bool,
    /// Discount amount attributable to the code.
    #[serde(default)]
    pub discount_display: Option<String>,
    /// Minimum order total before the code activates.
    #[serde(default)]
    pub min_total_display: Option<String>,
    /// Human description of the code.
    #[serde(default)]
    pub description: Option<String>,
    /// Explicit server message overriding the derived presentation.
    #[serde(default)]
    pub message: Option<String>,
    /// Whether an explicit message is a warning rather than a hard error.
    #[serde(default)]
    pub recoverable: bool,
}

/// The single presentation a promo state resolves to.
///
/// Mutual exclusion between applied/stored/error styling is guaranteed by
/// construction: a state maps to exactly one arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromoPresentation {
    /// No message rendered.
    Hidden,
    /// The code is active; success styling.
    Applied(String),
    /// A code is stored but does not yet satisfy its conditions.
    StoredPending(String),
    /// Explicit recoverable server message; warning styling.
    Warning(String),
    /// Explicit hard failure; error styling.
    Error(String),
}

impl PromoState {
    /// Resolve this state to its one presentation.
    ///
    /// An explicit server message always wins, with its `recoverable` flag
    /// deciding warning-vs-error styling. Otherwise an applied code renders
    /// success, a merely stored code renders the pending hint, and the
    /// absence of a code renders nothing.
    #[must_use]
    pub fn presentation(&self) -> PromoPresentation {
        if let Some(message) = &self.message {
            return if self.recoverable {
                PromoPresentation::Warning(message.clone())
            } else {
                PromoPresentation::Error(message.clone())
            };
        }
        match (&self.code, self.is_applied) {
            (Some(code), true) => {
                let text = self.discount_display.as_ref().map_or_else(
                    || format!("Promo code {code} applied"),
                    |discount| format!("Discount {discount} active"),
                );
                PromoPresentation::Applied(text)
            }
            (Some(_), false) => {
                let text = self.min_total_display.as_ref().map_or_else(
                    || "Promo code saved".to_owned(),
                    |min| format!("Promo code saved, applies from {min}"),
                );
                PromoPresentation::StoredPending(text)
            }
            (None, _) => PromoPresentation::Hidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applied_state_renders_success() {
        let promo = PromoState {
            code: Some("SPRING".into()),
            is_applied: true,
            discount_display: Some("500 ₽".into()),
            ..PromoState::default()
        };
        assert_eq!(
            promo.presentation(),
            PromoPresentation::Applied("Discount 500 ₽ active".into())
        );
    }

    #[test]
    fn stored_code_renders_pending_not_error() {
        let promo = PromoState {
            code: Some("SPRING".into()),
            is_applied: false,
            min_total_display: Some("3000 ₽".into()),
            ..PromoState::default()
        };
        assert_eq!(
            promo.presentation(),
            PromoPresentation::StoredPending("Promo code saved, applies from 3000 ₽".into())
        );
    }

    #[test]
    fn explicit_message_recoverable_flag_picks_styling() {
        let warning = PromoState {
            code: Some("SPRING".into()),
            message: Some("Add 500 ₽ more".into()),
            recoverable: true,
            ..PromoState::default()
        };
        assert_eq!(
            warning.presentation(),
            PromoPresentation::Warning("Add 500 ₽ more".into())
        );

        let error = PromoState {
            message: Some("Code expired".into()),
            recoverable: false,
            ..PromoState::default()
        };
        assert_eq!(
            error.presentation(),
            PromoPresentation::Error("Code expired".into())
        );
    }

    #[test]
    fn no_code_renders_nothing() {
        assert_eq!(PromoState::default().presentation(), PromoPresentation::Hidden);
    }

    #[test]
    fn presentation_is_exclusive_by_construction() {
        // Even a state setting every field resolves to exactly one arm.
        let promo = PromoState {
            code: Some("SPRING".into()),
            is_applied: true,
            discount_display: Some("500 ₽".into()),
            min_total_display: Some("3000 ₽".into()),
            description: Some("Spring sale".into()),
            message: Some("Conditions changed".into()),
            recoverable: false,
        };
        assert_eq!(
            promo.presentation(),
            PromoPresentation::Error("Conditions changed".into())
        );
    }
}
