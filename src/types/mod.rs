pub mod constants;
pub mod error;
pub mod message;

pub use constants::*;
pub use error::{LiveChannelError, Result};
pub use message::{InboundEvent, NotificationEvent, NotificationLevel, SseFrame};
