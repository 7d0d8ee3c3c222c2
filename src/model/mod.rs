//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod identifiers;
pub mod key_action;
pub mod message;
pub mod usage;

pub use error::{AppError, HistoryError};
pub use identifiers::{InvalidMessageId, MessageId};
pub use key_action::KeyAction;
pub use message::{Message, Role};
pub use usage::TokenUsage;
