use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

const SESSION_PREFIX: &str = "chat_";
const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Last millisecond value handed out by [`SessionId::generate`].
static LAST_MILLIS: AtomicU64 = AtomicU64::new(0);

pub fn new_correlation_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    format!(
        "{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3]
    )
}

/// A session id is addressable when it has any non-whitespace content.
///
/// Ids arriving from shared links are accepted as-is; their provenance
/// is not checked.
pub fn is_addressable(id: &str) -> bool {
    !id.trim().is_empty()
}

/// Wall-clock milliseconds, bumped so that no two calls in this process
/// ever return the same value.
fn next_millis() -> u64 {
    let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
    let mut last = LAST_MILLIS.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(last + 1);
        match LAST_MILLIS.compare_exchange_weak(
            last,
            candidate,
            Ordering::AcqRel,
            Ordering::Relaxed,
        ) {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Identifier of one logical conversation.
///
/// Stable for the lifetime of the session and never reused for another
/// conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh id of the form `chat_{millis}_{suffix}`.
    pub fn generate() -> Self {
        Self(format!(
            "{SESSION_PREFIX}{}_{}",
            next_millis(),
            random_suffix()
        ))
    }

    /// Accept an externally supplied id (e.g. from a shared link).
    pub fn parse(raw: &str) -> Option<Self> {
        is_addressable(raw).then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
