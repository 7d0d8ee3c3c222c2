//! Conversation history persistence.
//!
//! The history is the message array itself, one JSON object per line:
//!
//! ```text
//! {"id":"7c1e…","role":"user","content":"hi","created_at":"2025-12-25T10:00:00Z"}
//! {"id":"a93f…","role":"assistant","content":"Hello!","created_at":"…","usage":{…}}
//! ```
//!
//! - `NoteFileStore`: JSON Lines note file, written atomically
//! - `InMemoryStore`: process-local store for tests and `--no-history`

use crate::model::{HistoryError, Message};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Load and save the message array against the host's storage.
pub trait HistoryStore {
    /// Load every stored message in conversation order.
    ///
    /// # Errors
    /// Fails only when the storage itself cannot be read.
    fn load_messages(&self) -> Result<Vec<Message>, HistoryError>;

    /// Replace the stored history with `messages`.
    ///
    /// # Errors
    /// Fails when a message cannot be encoded or the storage cannot be written.
    fn save_messages(&mut self, messages: &[Message]) -> Result<(), HistoryError>;
}

/// History kept in a JSON Lines note file.
///
/// A missing file is an empty history. Lines that fail to parse, and repeats
/// of an id already loaded, are skipped with a warning so one bad line never
/// hides the rest of the conversation.
#[derive(Debug, Clone)]
pub struct NoteFileStore {
    path: PathBuf,
}

impl NoteFileStore {
    /// Store backed by `path`. Nothing is touched until the first load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Note file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the next save is written to before the rename.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_error(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

/// Parse note file contents, skipping malformed and duplicate lines.
pub fn parse_lines(contents: &str) -> Vec<Message> {
    let mut seen = HashSet::new();
    let mut messages = Vec::new();

    for (line_number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Message>(line) {
            Ok(message) => {
                if seen.insert(message.id().clone()) {
                    messages.push(message);
                } else {
                    warn!(
                        "Skipping history line {}: duplicate message id {}",
                        line_number + 1,
                        message.id()
                    );
                }
            }
            Err(e) => warn!("Skipping malformed history line {}: {}", line_number + 1, e),
        }
    }

    messages
}

/// Encode messages as JSON Lines, newline-terminated.
pub fn encode_lines(messages: &[Message]) -> Result<String, HistoryError> {
    let mut out = String::new();
    for message in messages {
        let line = serde_json::to_string(message).map_err(|source| HistoryError::Encode {
            id: message.id().to_string(),
            source,
        })?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

impl HistoryStore for NoteFileStore {
    fn load_messages(&self) -> Result<Vec<Message>, HistoryError> {
        if !self.path.exists() {
            debug!("No history at {:?}, starting empty", self.path);
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|source| HistoryError::Read {
            path: self.path.clone(),
            source,
        })?;

        let messages = parse_lines(&contents);
        debug!("Loaded {} messages from {:?}", messages.len(), self.path);
        Ok(messages)
    }

    fn save_messages(&mut self, messages: &[Message]) -> Result<(), HistoryError> {
        let encoded = encode_lines(messages)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        // Readers never observe a half-written note: write beside it, then rename over it.
        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path).map_err(|e| self.write_error(e))?;
        file.write_all(encoded.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| self.write_error(e))?;
        drop(file);
        fs::rename(&temp_path, &self.path).map_err(|e| self.write_error(e))?;

        debug!("Saved {} messages to {:?}", messages.len(), self.path);
        Ok(())
    }
}

/// History held in memory for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    messages: Vec<Message>,
    saves: usize,
}

impl InMemoryStore {
    /// Store preloaded with `messages`.
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self { messages, saves: 0 }
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// Messages as last saved.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

impl HistoryStore for InMemoryStore {
    fn load_messages(&self) -> Result<Vec<Message>, HistoryError> {
        Ok(self.messages.clone())
    }

    fn save_messages(&mut self, messages: &[Message]) -> Result<(), HistoryError> {
        self.messages = messages.to_vec();
        self.saves += 1;
        Ok(())
    }
}
