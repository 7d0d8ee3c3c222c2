//! chatlist - Entry Point

use chatlist::client::AnthropicClient;
use chatlist::history::{HistoryStore, InMemoryStore, NoteFileStore};
use chatlist::list::MessageList;
use chatlist::state::{ChatPanel, ChatSettings};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// chatlist - terminal chat client with a virtualized message list
#[derive(Parser, Debug)]
#[command(name = "chatlist")]
#[command(version)]
#[command(about = "Chat with a hosted LLM from the terminal")]
pub struct Args {
    /// Conversation note file (JSON Lines); defaults to the data directory
    pub history_file: Option<PathBuf>,

    /// Model to request replies from
    #[arg(short, long)]
    pub model: Option<String>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Keep the conversation in memory only
    #[arg(long, conflicts_with = "history_file")]
    pub no_history: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = chatlist::config::load_config_with_precedence(args.config.clone())?;
        let merged = chatlist::config::merge_config(config_file)?;
        let with_env = chatlist::config::apply_env_overrides(merged);
        chatlist::config::apply_cli_overrides(
            with_env,
            args.model.clone(),
            args.history_file.clone(),
        )
    };

    chatlist::logging::init(&config.log_file_path)?;

    info!(
        model = %config.model,
        history = ?config.history_file,
        api_key_set = config.api_key.is_some(),
        "Configuration loaded and resolved"
    );

    let store: Box<dyn HistoryStore> = if args.no_history {
        Box::new(InMemoryStore::default())
    } else {
        Box::new(NoteFileStore::new(config.history_file.clone()))
    };

    let panel = ChatPanel::new(
        ChatSettings::from(&config),
        MessageList::new(config.tuning),
        Arc::new(AnthropicClient::new()?),
        store,
    );

    chatlist::view::run(panel)?;

    info!("Exiting");
    Ok(())
}
