pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ConfigError, LenderError};
pub use events::{EventBus, ReplySettled, SessionEvent};
pub use id::{is_addressable, new_correlation_id, SessionId};
pub use types::{Message, Sender, SessionSnapshot, SummaryPayload};

pub type Result<T> = std::result::Result<T, LenderError>;
