//! Domain-level keyboard actions independent of key bindings.

/// Domain-level actions that can be mapped to key bindings.
///
/// These represent user intent, not specific keys. Printable characters that
/// are not bound go to the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Scrolling
    /// Scroll the message list up by one line. Default: ↑
    ScrollUp,
    /// Scroll the message list down by one line. Default: ↓
    ScrollDown,
    /// Scroll up by one page height. Default: Page Up
    PageUp,
    /// Scroll down by one page height. Default: Page Down
    PageDown,
    /// Jump to the first message. Default: Home
    ScrollToTop,
    /// Jump to the newest message and pin. Default: End
    ScrollToBottom,

    // Input line
    /// Send the input line. Default: Enter
    Send,
    /// Delete the character before the cursor. Default: Backspace
    DeleteChar,

    // Conversation
    /// Clear the conversation and its history file. Default: Ctrl+L
    ClearHistory,
    /// Drop every measured height and lay out again. Default: Ctrl+R
    ForceRelayout,

    // Application controls
    /// Exit the application. Default: Esc / Ctrl+C
    Quit,
}
