//! Error sinks for failures the engine recovers from locally

use crate::Error;

/// Receives errors that are recovered locally instead of being returned,
/// such as a column whose type has no domain.
pub trait ErrorSink: Send + Sync {
    fn report(&self, error: &Error);
}

/// Reports through `tracing` at warn level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn report(&self, error: &Error) {
        tracing::warn!("{}", error);
    }
}

/// Collects reported errors as strings (for testing)
#[derive(Debug, Default)]
pub struct CollectingSink {
    reports: std::sync::Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl ErrorSink for CollectingSink {
    fn report(&self, error: &Error) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(error.to_string());
        }
    }
}

impl<S: ErrorSink + ?Sized> ErrorSink for std::sync::Arc<S> {
    fn report(&self, error: &Error) {
        (**self).report(error)
    }
}
