//! Message identity newtype with a smart constructor.
//!
//! Identity (not position) is the key for everything the list remembers about a
//! row, so the constructor refuses empty strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a message within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageId(String);

impl MessageId {
    /// Smart constructor: validates a non-empty id.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidMessageId> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(InvalidMessageId::Empty);
        }
        Ok(Self(raw))
    }

    /// Fresh random id for a message created in this session.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MessageId {
    type Error = InvalidMessageId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MessageId> for String {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

/// Rejected message id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMessageId {
    /// Id was empty or whitespace only.
    #[error("Message ID cannot be empty")]
    Empty,
}
