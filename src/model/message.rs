//! Chat message types.
//!
//! A message is immutable once appended to the displayed conversation.

use crate::model::{MessageId, TokenUsage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ===== Role =====

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the user.
    User,
    /// Reply from the model.
    Assistant,
    /// Instruction or notice injected by the client.
    System,
    /// A failed exchange, shown inline in the conversation.
    Error,
}

impl Role {
    /// Header label used when rendering the row.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Assistant",
            Role::System => "System",
            Role::Error => "Error",
        }
    }

    /// Whether messages of this role are sent back to the API as context.
    pub fn is_conversational(self) -> bool {
        matches!(self, Role::User | Role::Assistant)
    }
}

// ===== Message =====

/// One entry of the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    usage: Option<TokenUsage>,
}

impl Message {
    /// Build a message with an explicit id and timestamp.
    pub fn new(
        id: MessageId,
        role: Role,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            created_at,
            usage: None,
        }
    }

    /// Build a message stamped now with a freshly generated id.
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self::new(MessageId::generate(), role, content, Utc::now())
    }

    /// Attach usage statistics.
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Message identity.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Author role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Text content (may contain fenced code blocks).
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Usage statistics, if the API reported them.
    pub fn usage(&self) -> Option<TokenUsage> {
        self.usage
    }
}
