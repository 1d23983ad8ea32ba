//! Scripted doubles for controller tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use crate::notify::{Notice, Notifier};
use crate::remote::{Endpoint, RemoteClient, RemoteError};

/// Install a subscriber writing to the test output capture.
///
/// Safe to call from every test; only the first call installs.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Remote double replaying a queue of scripted responses in order.
///
/// Every call is recorded with its endpoint and payload so tests can assert
/// exactly what went over the wire.
#[derive(Debug, Default)]
pub(crate) struct ScriptedRemote {
    responses: Mutex<VecDeque<Result<Value, RemoteError>>>,
    calls: Mutex<Vec<(Endpoint, Value)>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, value: Value) {
        self.responses.lock().unwrap().push_back(Ok(value));
    }

    pub fn push_status(&self, status: u16) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(RemoteError::Status(status)));
    }

    pub fn calls(&self) -> Vec<(Endpoint, Value)> {
        self.calls.lock().unwrap().clone()
    }

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
pub(crate) struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

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
