//! Pipeline notification and cancellation primitives
//!
//! Analysis stages publish human-readable status strings to an injected
//! sink so callers (CLI, UI, service layer) can surface progress without
//! the engine knowing anything about their threading model.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Injected status-message channel; cheap to clone and share
pub type StatusSink = Arc<dyn Fn(&str) + Send + Sync>;

/// A sink that drops every message
pub fn null_status_sink() -> StatusSink {
    Arc::new(|_msg: &str| {})
}

/// Cooperative cancellation flag, checked between coarse pipeline stages
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
