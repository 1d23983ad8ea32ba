//! Shared building blocks of the optimistic mutation engine.
//!
//! Every mutable entity moves through `Idle -> Pending -> {Committed |
//! RolledBack}` and back to `Idle`. Controllers own the per-entity pending
//! gates and snapshots; this module owns the outcome type, the quantity
//! clamp, and the single-slot undo registry with its cancellable expiry
//! timers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use vitrine_core::{LineKey, LineUpdateResponse, PromoState, RemoveResponse, Totals};

use crate::notify::{Notice, Notifier};
use crate::remote::{Endpoint, RemoteClient};

/// How a mutation request resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The remote confirmed the optimistic change.
    Committed,
    /// The remote rejected it; the local state was restored exactly.
    RolledBack,
    /// Nothing happened: the entity was already pending, the change was a
    /// no-op after clamping, or the target no longer exists.
    Ignored,
}

impl MutationOutcome {
    /// Whether the remote confirmed the change.
    #[must_use]
    pub const fn is_committed(self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Apply a quantity delta, clamped to a minimum of 1.
///
/// A decrement that would go below 1 returns the current value unchanged;
/// callers treat that as a no-op and issue no remote call.
#[must_use]
pub fn stepped_quantity(current: u32, delta: i32) -> u32 {
    let next = i64::from(current) + i64::from(delta);
    u32::try_from(next.max(1)).unwrap_or(u32::MAX)
}

/// A cart or checkout line bound to a view fragment.
///
/// The pending flag blocks duplicate submissions for this line only;
/// other lines stay interactive.
#[derive(Debug, Clone)]
pub struct MutableLine {
    /// Line key.
    pub key: LineKey,
    /// Remote endpoint updating this line's quantity.
    pub update_endpoint: Endpoint,
    /// Remote endpoint removing this line.
    pub remove_endpoint: Endpoint,
    /// Displayed quantity, never below 1.
    pub quantity: u32,
    /// Displayed line total.
    pub line_total_display: Option<String>,
    pub(crate) pending: bool,
}

impl MutableLine {
    /// Create a line; the quantity is clamped to at least 1.
    #[must_use]
    pub fn new(
        key: LineKey,
        update_endpoint: Endpoint,
        remove_endpoint: Endpoint,
        quantity: u32,
    ) -> Self {
        Self {
            key,
            update_endpoint,
            remove_endpoint,
            quantity: quantity.max(1),
            line_total_display: None,
            pending: false,
        }
    }

    /// Attach a displayed line total.
    #[must_use]
    pub fn with_line_total(mut self, total: impl Into<String>) -> Self {
        self.line_total_display = Some(total.into());
        self
    }

    /// Whether a mutation for this line is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Result of a confirmed-or-rolled-back line sync.
pub(crate) struct LineSync {
    pub outcome: MutationOutcome,
    pub totals: Option<Totals>,
    pub promo: Option<PromoState>,
}

impl LineSync {
    const fn ignored() -> Self {
        Self {
            outcome: MutationOutcome::Ignored,
            totals: None,
            promo: None,
        }
    }
}

fn find_line<'a>(lines: &'a mut [MutableLine], key: &LineKey) -> Option<&'a mut MutableLine> {
    lines.iter_mut().find(|line| &line.key == key)
}

/// Optimistically set a line's quantity and confirm it remotely.
///
/// Server-confirmed fields replace the optimistic guess wholesale; on any
/// failure the prior quantity is restored exactly and a notice is shown.
pub(crate) async fn sync_line_quantity<R: RemoteClient, N: Notifier>(
    lines: &mut [MutableLine],
    remote: &R,
    notifier: &N,
    key: &LineKey,
    next: u32,
    failure_message: &str,
) -> LineSync {
    let (endpoint, prior) = {
        let Some(line) = find_line(lines, key) else {
            return LineSync::ignored();
        };
        if line.pending {
            tracing::debug!(line = %key, "mutation ignored, line already pending");
            return LineSync::ignored();
        }
        if next == line.quantity {
            return LineSync::ignored();
        }
        line.pending = true;
        let prior = line.quantity;
        line.quantity = next;
        (line.update_endpoint.clone(), prior)
    };

    let result = remote
        .call(&endpoint, serde_json::json!({ "quantity": next }))
        .await;

    let response = match result {
        Ok(value) => serde_json::from_value::<LineUpdateResponse>(value)
            .map_err(|e| tracing::warn!(error = %e, "malformed line update response")),
        Err(e) => {
            tracing::warn!(error = %e, line = %key, "line update rejected");
            Err(())
        }
    };

    match response {
        Ok(update) => {
            if let Some(line) = find_line(lines, key) {
                if let Some(item) = &update.item {
                    line.quantity = item.quantity;
                    if let Some(total) = &item.line_total_display {
                        line.line_total_display = Some(total.clone());
                    }
                }
                line.pending = false;
            }
            LineSync {
                outcome: MutationOutcome::Committed,
                totals: update.totals,
                promo: update.promo,
            }
        }
        Err(()) => {
            // Restore the pre-mutation value exactly, once.
            if let Some(line) = find_line(lines, key) {
                line.quantity = prior;
                line.pending = false;
            }
            notifier.show(Notice::text(failure_message));
            LineSync {
                outcome: MutationOutcome::RolledBack,
                totals: None,
                promo: None,
            }
        }
    }
}

/// Optimistically remove a line and confirm it remotely.
///
/// On failure the line is reinserted at its captured position and a notice
/// is shown. On success the parsed response is handed back so the caller
/// can apply totals and register an undo window where appropriate.
pub(crate) async fn remove_line_remote<R: RemoteClient, N: Notifier>(
    lines: &mut Vec<MutableLine>,
    remote: &R,
    notifier: &N,
    key: &LineKey,
    failure_message: &str,
) -> (MutationOutcome, Option<RemoveResponse>) {
    let Some(index) = lines.iter().position(|line| &line.key == key) else {
        return (MutationOutcome::Ignored, None);
    };
    if lines.get(index).is_some_and(|line| line.pending) {
        tracing::debug!(line = %key, "removal ignored, line already pending");
        return (MutationOutcome::Ignored, None);
    }

    let mut removed = lines.remove(index);
    removed.pending = true;
    let endpoint = removed.remove_endpoint.clone();

    match remote.call(&endpoint, serde_json::json!({})).await {
        Ok(value) => match serde_json::from_value::<RemoveResponse>(value) {
            Ok(response) => (MutationOutcome::Committed, Some(response)),
            Err(e) => {
                tracing::warn!(error = %e, line = %key, "malformed remove response");
                restore_line(lines, removed, index);
                notifier.show(Notice::text(failure_message));
                (MutationOutcome::RolledBack, None)
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, line = %key, "removal rejected");
            restore_line(lines, removed, index);
            notifier.show(Notice::text(failure_message));
            (MutationOutcome::RolledBack, None)
        }
    }
}

fn restore_line(lines: &mut Vec<MutableLine>, mut line: MutableLine, index: usize) {
    line.pending = false;
    lines.insert(index.min(lines.len()), line);
}

struct UndoSlot<T> {
    value: T,
    generation: u64,
    timer: JoinHandle<()>,
}

/// Single-slot-per-key registry of reversible removals.
///
/// At most one live entry exists per entity key; inserting for a key that
/// already holds an entry replaces it and cancels the old expiry timer. An
/// entry disappears on expiry, on [`take`](Self::take), or on
/// [`clear`](Self::clear) - after that the server-confirmed removal stands
/// as final.
#[derive(Debug)]
pub struct UndoRegistry<T: Send + 'static> {
    entries: Arc<Mutex<HashMap<String, UndoSlot<T>>>>,
    window: Duration,
    generation: Arc<Mutex<u64>>,
}

impl<T: Send + 'static> std::fmt::Debug for UndoSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoSlot")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> UndoRegistry<T> {
    /// Create a registry whose entries expire after `window`.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            window,
            generation: Arc::new(Mutex::new(0)),
        }
    }

    /// Register a reversible removal, replacing any live entry for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock was poisoned by a panicking task.
    #[allow(clippy::unwrap_used)]
    pub fn insert(&self, key: impl Into<String>, value: T) {
        let key = key.into();
        let generation = {
            let mut counter = self.generation.lock().unwrap();
            *counter += 1;
            *counter
        };

        let entries = Arc::clone(&self.entries);
        let timer_key = key.clone();
        let window = self.window;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let mut map = entries.lock().unwrap();
            // Only purge our own entry; a superseding insert owns the slot now.
            if map.get(&timer_key).is_some_and(|slot| slot.generation == generation) {
                map.remove(&timer_key);
                tracing::debug!(key = %timer_key, "undo window expired");
            }
        });

        let mut map = self.entries.lock().unwrap();
        if let Some(previous) = map.insert(
            key,
            UndoSlot {
                value,
                generation,
                timer,
            },
        ) {
            previous.timer.abort();
        }
    }

    /// Take the live entry for `key`, cancelling its expiry timer.
    ///
    /// Returns `None` when the entry has expired or never existed.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock was poisoned by a panicking task.
    #[allow(clippy::unwrap_used)]
    pub fn take(&self, key: &str) -> Option<T> {
        let slot = self.entries.lock().unwrap().remove(key)?;
        slot.timer.abort();
        Some(slot.value)
    }

    /// Whether a live entry exists for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock was poisoned by a panicking task.
    #[allow(clippy::unwrap_used)]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    /// Drop every entry and cancel all timers.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock was poisoned by a panicking task.
    #[allow(clippy::unwrap_used)]
    pub fn clear(&self) {
        let mut map = self.entries.lock().unwrap();
        for (_, slot) in map.drain() {
            slot.timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrement_below_one_is_clamped() {
        assert_eq!(stepped_quantity(1, -1), 1);
        assert_eq!(stepped_quantity(2, -1), 1);
        assert_eq!(stepped_quantity(2, -5), 1);
        assert_eq!(stepped_quantity(3, 1), 4);
    }

    #[tokio::test]
    async fn take_before_expiry_returns_the_entry() {
        let registry = UndoRegistry::new(Duration::from_secs(7));
        registry.insert("p1", 41_u32);
        assert!(registry.contains("p1"));
        assert_eq!(registry.take("p1"), Some(41));
        assert!(!registry.contains("p1"));
        assert_eq!(registry.take("p1"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_the_window() {
        let registry = UndoRegistry::new(Duration::from_secs(7));
        registry.insert("p1", "snapshot");
        tokio::time::sleep(Duration::from_secs(8)).await;
        tokio::task::yield_now().await;
        assert_eq!(registry.take("p1"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn a_superseding_removal_replaces_the_entry() {
        let registry = UndoRegistry::new(Duration::from_secs(7));
        registry.insert("p1", 1_u32);
        tokio::time::sleep(Duration::from_secs(5)).await;

        // Second removal of the same entity: the slot is replaced and the
        // old timer must not purge the new entry two seconds later.
        registry.insert("p1", 2_u32);
        tokio::time::sleep(Duration::from_secs(4)).await;
        tokio::task::yield_now().await;
        assert_eq!(registry.take("p1"), Some(2));
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let registry = UndoRegistry::new(Duration::from_secs(7));
        registry.insert("p1", 1_u32);
        registry.insert("p2", 2_u32);
        registry.clear();
        assert!(!registry.contains("p1"));
        assert!(!registry.contains("p2"));
    }
}
