//! Broadcast configuration

use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::Duration;

use super::error::ValidationError;

/// Batch size used when nothing else is configured.
pub const DEFAULT_MAX_OBJECTS_PER_EVENT: usize = 10;

const FALLBACK_MAX_OBJECTS: NonZeroUsize = match NonZeroUsize::new(DEFAULT_MAX_OBJECTS_PER_EVENT) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Broadcast configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    /// Max objects per event for providers without an override
    #[serde(default = "default_max_objects_per_event")]
    pub default_max_objects_per_event: usize,

    /// Per-provider max objects per event, keyed by provider name
    #[serde(default)]
    pub provider_overrides: HashMap<String, usize>,

    /// Upper bound on a single transport send, in seconds
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
}

impl BroadcastConfig {
    /// Max objects per event for `provider`.
    ///
    /// Provider names are matched case-insensitively since environment
    /// variable keys arrive lowercased.
    pub fn max_objects_for(&self, provider: &str) -> NonZeroUsize {
        let configured = self
            .provider_overrides
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(provider))
            .map(|(_, size)| *size)
            .unwrap_or(self.default_max_objects_per_event);

        NonZeroUsize::new(configured)
            .or_else(|| NonZeroUsize::new(self.default_max_objects_per_event))
            .unwrap_or(FALLBACK_MAX_OBJECTS)
    }

    /// Send timeout as a Duration
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    /// Validate broadcast configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_max_objects_per_event == 0 {
            return Err(ValidationError::InvalidDefaultBatchSize);
        }
        if let Some((name, _)) = self.provider_overrides.iter().find(|(_, size)| **size == 0) {
            return Err(ValidationError::InvalidProviderBatchSize(name.clone()));
        }
        if self.send_timeout_secs == 0 || self.send_timeout_secs > 300 {
            return Err(ValidationError::InvalidSendTimeout);
        }
        Ok(())
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            default_max_objects_per_event: default_max_objects_per_event(),
            provider_overrides: HashMap::new(),
            send_timeout_secs: default_send_timeout(),
        }
    }
}

fn default_max_objects_per_event() -> usize {
    DEFAULT_MAX_OBJECTS_PER_EVENT
}

fn default_send_timeout() -> u64 {
    30
}
