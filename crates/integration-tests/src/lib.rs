//! Integration tests for Vitrine.
//!
//! The suites under `tests/` drive the controllers end to end against a
//! scripted remote, covering the flows a single page session exercises:
//! optimistic quantity edits with rollback, reversible removals and their
//! undo windows, promo round trips, and cross-view invalidation pulses.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrine-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
// Test doubles panic on poisoned locks instead of propagating errors.
#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;
use vitrine_client::{Endpoint, Notice, Notifier, RemoteClient, RemoteError};

/// Remote double replaying scripted responses in call order.
///
/// Records every call so suites can assert on payloads; an exhausted
/// script answers with status 500, which exercises the rollback path.
#[derive(Debug, Default)]
pub struct ScriptedRemote {
    responses: Mutex<VecDeque<Result<Value, RemoteError>>>,
    calls: Mutex<Vec<(Endpoint, Value)>>,
}

impl ScriptedRemote {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful JSON response.
    ///
    /// # Panics
    ///
    /// Panics if the script lock was poisoned by a panicking test.
    pub fn push_ok(&self, value: Value) {
        self.responses.lock().unwrap().push_back(Ok(value));
    }

    /// Queue a failing status response.
    ///
    /// # Panics
    ///
    /// Panics if the script lock was poisoned by a panicking test.
    pub fn push_status(&self, status: u16) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(RemoteError::Status(status)));
    }

    /// Every call made so far, with its endpoint and payload.
    ///
    /// # Panics
    ///
    /// Panics if the call lock was poisoned by a panicking test.
    #[must_use]
    pub fn calls(&self) -> Vec<(Endpoint, Value)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made so far.
    ///
    /// # Panics
    ///
    /// Panics if the call lock was poisoned by a panicking test.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl RemoteClient for ScriptedRemote {
    async fn call(&self, endpoint: &Endpoint, payload: Value) -> Result<Value, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.clone(), payload));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RemoteError::Status(500)))
    }
}

/// Notifier double collecting every notice shown.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notice shown so far.
    ///
    /// # Panics
    ///
    /// Panics if the notice lock was poisoned by a panicking test.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    /// The message text of every notice shown so far.
    ///
    /// # Panics
    ///
    /// Panics if the notice lock was poisoned by a panicking test.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
