//! Start gate.
//!
//! Bootstrap adapters of registered apps wait here until the host is started.
//! The gate opens exactly once and never closes again; waiters that arrive
//! after it opened pass straight through.

use tokio::sync::watch;
use tracing::debug;

/// State of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Pending,
    Resolved,
}

/// One-shot asynchronous signal.
pub struct StartGate {
    open: watch::Sender<bool>,
}

impl StartGate {
    /// Create a pending gate
    pub fn new() -> Self {
        let (open, _) = watch::channel(false);
        Self { open }
    }

    pub fn state(&self) -> GateState {
        if *self.open.borrow() {
            GateState::Resolved
        } else {
            GateState::Pending
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.state() == GateState::Resolved
    }

    /// Open the gate. Returns false if it was already open.
    pub fn resolve(&self) -> bool {
        let opened = self.open.send_if_modified(|open| {
            if *open {
                false
            } else {
                *open = true;
                true
            }
        });

        if opened {
            debug!("Start gate resolved");
        }
        opened
    }

    /// Wait until the gate is open.
    pub async fn wait(&self) {
        let mut rx = self.open.subscribe();
        // The sender lives as long as `self`, so this only returns once open.
        let _ = rx.wait_for(|open| *open).await;
    }
}

impl Default for StartGate {
    fn default() -> Self {
        Self::new()
    }
}
