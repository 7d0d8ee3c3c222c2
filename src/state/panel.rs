//! Chat panel state.
//!
//! The panel owns the message array, the loading flag and the input line, and
//! keeps the [`MessageList`] in sync with the array after every change. The
//! HTTP exchange runs on a worker thread; its result comes back over a
//! channel drained by [`ChatPanel::poll_reply`] on the UI thread, so the list
//! is only ever mutated from one thread.

use crate::client::{AssistantReply, ChatBackend, ClientError, SendOptions};
use crate::config::ResolvedConfig;
use crate::history::HistoryStore;
use crate::list::MessageList;
use crate::model::{Message, Role};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

type ReplyResult = Result<AssistantReply, ClientError>;

/// Settings for each exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    /// Model name sent with every request.
    pub model: String,
    /// API key; `None` makes every send fail with a missing-key error.
    pub api_key: Option<String>,
    /// Messages endpoint URL.
    pub api_url: String,
    /// Reply token limit.
    pub max_tokens: u32,
    /// Sampling temperature; `None` leaves the API default.
    pub temperature: Option<f64>,
    /// Optional system prompt.
    pub system_prompt: Option<String>,
}

impl From<&ResolvedConfig> for ChatSettings {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
        }
    }
}

/// Host panel around one message list.
pub struct ChatPanel {
    settings: ChatSettings,
    messages: Vec<Message>,
    list: MessageList,
    loading: bool,
    input: String,
    backend: Arc<dyn ChatBackend>,
    store: Box<dyn HistoryStore>,
    pending: Option<Receiver<ReplyResult>>,
}

impl ChatPanel {
    /// Load the stored conversation and lay it out in `list`.
    ///
    /// A history that fails to load starts the session empty with a warning.
    pub fn new(
        settings: ChatSettings,
        list: MessageList,
        backend: Arc<dyn ChatBackend>,
        store: Box<dyn HistoryStore>,
    ) -> Self {
        let messages = store.load_messages().unwrap_or_else(|e| {
            warn!("Starting with empty history: {}", e);
            Vec::new()
        });
        info!("Loaded {} messages", messages.len());

        let mut panel = Self {
            settings,
            messages,
            list,
            loading: false,
            input: String::new(),
            backend,
            store,
            pending: None,
        };
        panel.list.sync(&panel.messages);
        panel.list.scroll_to_bottom();
        panel
    }

    /// Conversation in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The message list engine.
    pub fn list(&self) -> &MessageList {
        &self.list
    }

    /// Mutable access for the binding layer.
    pub fn list_mut(&mut self) -> &mut MessageList {
        &mut self.list
    }

    /// The list together with the messages it lays out, for the binding's
    /// measurement pass.
    pub fn list_and_messages(&mut self) -> (&mut MessageList, &[Message]) {
        (&mut self.list, &self.messages)
    }

    /// Whether a reply is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Current input line.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Exchange settings.
    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Backing history store.
    pub fn history(&self) -> &dyn HistoryStore {
        self.store.as_ref()
    }

    /// Append a character to the input line.
    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    /// Remove the last character of the input line.
    pub fn delete_char(&mut self) {
        self.input.pop();
    }

    /// Send the input line as a user turn.
    ///
    /// Returns `false` without side effects when the line is blank or a reply
    /// is already outstanding.
    pub fn submit(&mut self) -> bool {
        let content = self.input.trim().to_string();
        if content.is_empty() || self.loading {
            return false;
        }
        self.input.clear();

        let options = SendOptions {
            history: self.messages.clone(),
            system_prompt: self.settings.system_prompt.clone(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            api_url: self.settings.api_url.clone(),
        };

        self.append(Message::now(Role::User, content.clone()));
        self.loading = true;

        let (tx, rx) = mpsc::channel();
        let backend = Arc::clone(&self.backend);
        let model = self.settings.model.clone();
        let api_key = self.settings.api_key.clone().unwrap_or_default();
        thread::spawn(move || {
            let result = backend.send_message(&content, &model, &api_key, &options);
            // The receiver is gone if the conversation was cleared meanwhile.
            let _ = tx.send(result);
        });
        self.pending = Some(rx);

        debug!("Submitted user turn, {} messages", self.messages.len());
        true
    }

    /// Apply the reply if it has arrived. Returns whether one was applied.
    pub fn poll_reply(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        match rx.try_recv() {
            Ok(result) => self.finish(result),
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => self.worker_lost(),
        }
        true
    }

    /// Block up to `timeout` for the reply. Returns whether one was applied.
    pub fn wait_reply(&mut self, timeout: Duration) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        match rx.recv_timeout(timeout) {
            Ok(result) => self.finish(result),
            Err(RecvTimeoutError::Timeout) => return false,
            Err(RecvTimeoutError::Disconnected) => self.worker_lost(),
        }
        true
    }

    /// Drop the conversation and any outstanding reply, then save the empty
    /// history.
    pub fn clear_history(&mut self) {
        self.pending = None;
        self.loading = false;
        self.messages.clear();
        self.list.sync(&self.messages);
        self.persist();
        info!("Conversation cleared");
    }

    fn finish(&mut self, result: ReplyResult) {
        self.pending = None;
        self.loading = false;
        let message = match result {
            Ok(reply) => {
                let message = Message::now(Role::Assistant, reply.text);
                match reply.usage {
                    Some(usage) => message.with_usage(usage),
                    None => message,
                }
            }
            Err(e) => {
                warn!("Send failed: {}", e);
                Message::now(Role::Error, e.to_string())
            }
        };
        self.append(message);
    }

    fn worker_lost(&mut self) {
        warn!("Chat worker exited without a reply");
        self.finish(Err(ClientError::Decode(
            "worker exited without a reply".to_string(),
        )));
    }

    fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.list.sync(&self.messages);
        self.persist();
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save_messages(&self.messages) {
            warn!("Failed to save history: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "panel_tests.rs"]
mod tests;
