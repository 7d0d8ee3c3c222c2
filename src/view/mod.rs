//! TUI rendering and terminal management (impure shell)

pub mod chat_list;
pub mod constants;
pub mod styles;

pub use chat_list::{draw_rows, layout_frame, measure_window, render_message, RenderedRows};
pub use styles::{ColorConfig, MessageStyles};

use crate::config::keybindings::KeyBindings;
use crate::list::{ListHandle, Viewport};
use crate::model::KeyAction;
use crate::state::ChatPanel;
use constants::{
    IDLE_POLL, INPUT_HEIGHT, LINE_SCROLL, LOADING_TEXT, STATUS_BAR_HEIGHT, WHEEL_SCROLL,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Terminal,
};
use std::io::{self, Stdout};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),
}

/// Screen areas of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameAreas {
    /// Message list.
    pub list: Rect,
    /// Bordered input box.
    pub input: Rect,
    /// Status line.
    pub status: Rect,
}

impl FrameAreas {
    /// Split the terminal area top to bottom.
    pub fn split(area: Rect) -> Self {
        let [list, input, status] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .areas(area);
        Self {
            list,
            input,
            status,
        }
    }
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    terminal: Terminal<B>,
    panel: ChatPanel,
    key_bindings: KeyBindings,
    styles: MessageStyles,
    /// List area of the last frame, for paging.
    last_list_area: Rect,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen
    pub fn new(panel: ChatPanel) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(crossterm::event::EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self::with_terminal(
            terminal,
            panel,
            KeyBindings::default(),
            MessageStyles::new(),
        ))
    }

    /// Run the main event loop
    ///
    /// Returns when the user quits. Sleeps until input, the next debounce
    /// deadline, or the idle poll that picks up replies.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            let timeout = self
                .panel
                .list()
                .next_deadline()
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .map_or(IDLE_POLL, |until| until.min(IDLE_POLL));

            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(width, height) => {
                        debug!("Terminal resized to {}x{}", width, height);
                    }
                    _ => continue,
                }
            }

            self.panel.poll_reply();
            self.draw()?;
        }
    }
}

impl<B> TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    /// Wrap an initialized terminal.
    pub fn with_terminal(
        terminal: Terminal<B>,
        panel: ChatPanel,
        key_bindings: KeyBindings,
        styles: MessageStyles,
    ) -> Self {
        Self {
            terminal,
            panel,
            key_bindings,
            styles,
            last_list_area: Rect::default(),
        }
    }

    /// The chat panel.
    pub fn panel(&self) -> &ChatPanel {
        &self.panel
    }

    /// Mutable access to the chat panel.
    pub fn panel_mut(&mut self) -> &mut ChatPanel {
        &mut self.panel
    }

    /// The terminal, for inspecting a test backend.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let Some(action) = self.key_bindings.get(key) else {
            if let KeyCode::Char(c) = key.code {
                if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
                    self.panel.push_char(c);
                }
            }
            return false;
        };

        let page = usize::from(self.last_list_area.height.max(1));
        match action {
            KeyAction::ScrollUp => self.scroll_up(LINE_SCROLL),
            KeyAction::ScrollDown => self.scroll_down(LINE_SCROLL),
            KeyAction::PageUp => self.scroll_up(page),
            KeyAction::PageDown => self.scroll_down(page),
            KeyAction::ScrollToTop => self.panel.list_mut().scroll_to_top(),
            KeyAction::ScrollToBottom => self.panel.list_mut().scroll_to_bottom(),
            KeyAction::Send => {
                self.panel.submit();
            }
            KeyAction::DeleteChar => self.panel.delete_char(),
            KeyAction::ClearHistory => self.panel.clear_history(),
            KeyAction::ForceRelayout => ListHandle::force_update(self.panel.list_mut()),
            KeyAction::Quit => {
                info!("Quit requested");
                return true;
            }
        }
        false
    }

    /// Handle a mouse event; only the wheel scrolls.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll_up(WHEEL_SCROLL),
            MouseEventKind::ScrollDown => self.scroll_down(WHEEL_SCROLL),
            _ => {}
        }
    }

    fn scroll_up(&mut self, amount: usize) {
        let list = self.panel.list_mut();
        let offset = list.scroll_offset().saturating_sub(amount);
        list.on_scroll(offset);
    }

    fn scroll_down(&mut self, amount: usize) {
        let list = self.panel.list_mut();
        let offset = list.scroll_offset().saturating_add(amount);
        list.on_scroll(offset);
    }

    /// Render the current frame
    ///
    /// Resizes the engine to the list area, commits due measurements, lays
    /// out the window, then paints.
    pub fn draw(&mut self) -> Result<(), TuiError> {
        self.draw_at(Instant::now())
    }

    /// [`Self::draw`] at an explicit time, for debounce tests.
    pub fn draw_at(&mut self, now: Instant) -> Result<(), TuiError> {
        let size = self.terminal.size()?;
        let areas = FrameAreas::split(Rect::new(0, 0, size.width, size.height));
        self.last_list_area = areas.list;

        let width = areas.list.width.max(1);
        let list = self.panel.list_mut();
        list.set_chars_per_line(u32::from(width));
        let outcome = list.resize(Viewport::new(u32::from(width), u32::from(areas.list.height)));
        if outcome.width_changed {
            debug!("Remeasuring {} mounted rows", outcome.remeasure.len());
        }
        list.tick(now);

        let (list, messages) = self.panel.list_and_messages();
        let (rendered, relayout) = layout_frame(list, messages, width, &self.styles, now);
        if let Some(relayout) = relayout {
            debug!(
                "Relayout from row {}, total height {}",
                relayout.from.get(),
                relayout.total_height
            );
        }
        let commands = self.panel.list_mut().take_scroll_commands();
        if !commands.is_empty() {
            debug!("Applied {} scroll commands", commands.len());
        }

        let Self {
            terminal,
            panel,
            styles,
            ..
        } = self;
        terminal.draw(|frame| {
            let buf = frame.buffer_mut();
            draw_rows(buf, areas.list, panel.list(), &rendered);
            if panel.is_loading() {
                render_loading(frame, areas.list, styles);
            }
            render_input(frame, areas.input, panel);
            render_status(frame, areas.status, panel);
        })?;
        Ok(())
    }
}

fn render_loading(frame: &mut ratatui::Frame<'_>, list: Rect, styles: &MessageStyles) {
    let width = (LOADING_TEXT.chars().count() as u16).min(list.width);
    let area = Rect::new(
        list.x + (list.width - width) / 2,
        list.y + list.height.saturating_sub(1),
        width,
        list.height.min(1),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(Span::styled(LOADING_TEXT, styles.meta().add_modifier(Modifier::REVERSED))),
        area,
    );
}

fn render_input(frame: &mut ratatui::Frame<'_>, area: Rect, panel: &ChatPanel) {
    let block = Block::default().borders(Borders::ALL).title(" Message ");
    // Keep the tail of a long line visible.
    let inner_width = usize::from(area.width.saturating_sub(3));
    let input = panel.input();
    let skip = input.chars().count().saturating_sub(inner_width);
    let visible: String = input.chars().skip(skip).collect();
    frame.render_widget(Paragraph::new(format!("{visible}▏")).block(block), area);
}

fn render_status(frame: &mut ratatui::Frame<'_>, area: Rect, panel: &ChatPanel) {
    let list = panel.list();
    let position = if list.is_pinned() { "bottom" } else { "scrolled" };
    let text = format!(
        " {} │ {} messages │ {} │ Enter send · Ctrl+L clear · Ctrl+R relayout · Esc quit",
        panel.settings().model,
        panel.messages().len(),
        position
    );
    frame.render_widget(
        Paragraph::new(Line::from(text)).style(Style::default().add_modifier(Modifier::DIM)),
        area,
    );
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
pub fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(crossterm::event::DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Run the application until the user quits, restoring the terminal on exit.
pub fn run(panel: ChatPanel) -> Result<(), TuiError> {
    let mut app = TuiApp::new(panel)?;
    let result = app.run();
    restore_terminal()?;
    result
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
