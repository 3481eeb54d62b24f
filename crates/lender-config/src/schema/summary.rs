//! Summary orchestration timing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Quiet period after a reply settles before the summary is
    /// regenerated, in milliseconds (valid range: 0-5000).
    pub settle_delay_ms: u32,
    /// Regenerate automatically after each plain reply. Manual refresh
    /// works either way.
    pub auto_generate: bool,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 400,
            auto_generate: true,
        }
    }
}
