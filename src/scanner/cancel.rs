//! Cooperative cancellation for a scan (spec §4.1 "Threading", §5
//! "Cancellation semantics"): checked between sources and between entries
//! within a source, never mid-mutation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Returned instead of a snapshot when a scan is cancelled (spec §5: "the
/// caller observes a cancellation signal, not a `StartupInventorySnapshot`").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanCancelled;
