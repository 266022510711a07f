use std::time::Duration;

use serde::{Deserialize, Serialize};

use packtrace_timeline::MergeConfig;

/// Configuration for the verification engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Timeline page size when the caller does not request one.
    pub page_limit: u32,
    /// Budget for one remote log read before degrading to local data.
    pub remote_timeout: Duration,
    /// Budget for one local store read before the scan errors out.
    pub store_timeout: Duration,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            page_limit: 25,
            remote_timeout: Duration::from_secs(2),
            store_timeout: Duration::from_secs(2),
        }
    }
}

impl VerifyConfig {
    /// The merger policy derived from this configuration.
    pub fn merge_config(&self) -> MergeConfig {
        MergeConfig {
            page_limit: self.page_limit,
            remote_timeout: self.remote_timeout,
        }
    }
}
