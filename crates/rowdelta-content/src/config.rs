use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for [`crate::DeltaContent`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Minimum time between two deliveries. Results that become ready sooner
    /// are deferred, never dropped.
    pub min_update_interval: Duration,
    /// Detect and log items sharing an identity. Costs an extra pass per
    /// diff, so it is off by default.
    pub find_duplicates: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            min_update_interval: Duration::from_millis(200),
            find_duplicates: false,
        }
    }
}

impl ContentConfig {
    /// Default throttling with duplicate detection enabled.
    pub fn diagnostic() -> Self {
        Self {
            find_duplicates: true,
            ..Default::default()
        }
    }

    /// Replace the minimum delivery interval.
    pub fn with_min_update_interval(mut self, interval: Duration) -> Self {
        self.min_update_interval = interval;
        self
    }
}
