//! The transient-notice capability.
//!
//! Every recoverable failure and every undoable delete surfaces as a short
//! transient notice, never a blocking dialog. A notice carries at most one
//! action; when the host invokes it, it calls back into the owning
//! controller with the action key (an undo token or entity key).

use std::sync::Arc;

/// A single reversible action offered on a notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeAction {
    /// Button label.
    pub label: String,
    /// Key the host passes back to the controller when invoked.
    pub key: String,
}

/// A transient user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Message text.
    pub message: String,
    /// Optional single reversal action.
    pub action: Option<NoticeAction>,
}

impl Notice {
    /// A plain text notice.
    #[must_use]
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            action: None,
        }
    }

    /// A notice carrying one reversal action.
    #[must_use]
    pub fn with_action(
        message: impl Into<String>,
        label: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            action: Some(NoticeAction {
                label: label.into(),
                key: key.into(),
            }),
        }
    }
}

/// Injected capability surfacing transient notices.
pub trait Notifier: Send + Sync {
    /// Show a notice.
    fn show(&self, notice: Notice);
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn show(&self, notice: Notice) {
        (**self).show(notice);
    }
}

/// Fallback notifier that logs notices through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show(&self, notice: Notice) {
        match &notice.action {
            Some(action) => tracing::info!(
                message = %notice.message,
                action = %action.label,
                "notice"
            ),
            None => tracing::info!(message = %notice.message, "notice"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_with_action_carries_its_key() {
        let notice = Notice::with_action("Removed from wishlist", "Undo", "product-9");
        let action = notice.action.unwrap();
        assert_eq!(action.label, "Undo");
        assert_eq!(action.key, "product-9");
    }
}
