//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod logging;
mod service;
mod session;
mod summary;

pub use logging::*;
pub use service::*;
pub use session::*;
pub use summary::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LenderConfig {
    pub service: ServiceConfig,
    pub summary: SummaryConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}
