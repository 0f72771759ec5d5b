//! Shared value types passed between the router, services and callers

pub mod enums;
pub mod logger;
pub mod params;

pub use enums::{EnumFormatter, MessageItem, MessageLevel, MESSAGE_LEVELS};
pub use logger::{DiscardLogger, StdLogger, TracingLogger};
pub use params::{Params, MESSAGE_KEY, TITLE_KEY};
