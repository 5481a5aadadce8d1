//! Registry of providers with a broadcast run in progress.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
pub(crate) struct InFlightRuns {
    providers: Mutex<HashSet<String>>,
}

impl InFlightRuns {
    /// Marks `provider` as running, or returns `None` if it already is.
    pub(crate) fn try_acquire(&self, provider: &str) -> Option<InFlightGuard<'_>> {
        let mut providers = self.providers.lock().unwrap_or_else(PoisonError::into_inner);
        if !providers.insert(provider.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            runs: self,
            provider: provider.to_string(),
        })
    }

    pub(crate) fn is_running(&self, provider: &str) -> bool {
        self.providers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(provider)
    }
}

/// Clears the in-flight mark when the run ends.
pub(crate) struct InFlightGuard<'a> {
    runs: &'a InFlightRuns,
    provider: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.runs
            .providers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.provider);
    }
}
