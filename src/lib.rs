//! chatlist
//!
//! Terminal chat client for hosted LLM APIs, built around a virtualized
//! message list.
//!
//! The [`list`] module is the headless core: height estimation, the
//! measurement cache, the height index, scroll tracking and the resize
//! observer bridge, all owned by [`list::MessageList`]. Everything else is
//! the shell around it: the chat panel, the HTTP client, the history note
//! file and the terminal binding.

pub mod client;
pub mod config;
pub mod history;
pub mod list;
pub mod logging;
pub mod model;
pub mod state;
pub mod view;
