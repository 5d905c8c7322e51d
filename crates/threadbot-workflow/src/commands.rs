//! Keyword commands, intercepted before the generic question prompt.
//!
//! A command is recognised only when the whole normalised intent equals the
//! keyword (case-insensitive). Anything else is a free-form question.

/// Static reply to `help` / `?`; never reaches the model.
pub const HELP_TEXT: &str = "*Available Commands:*\n\
    • `help` - Show this message\n\
    • `summarize` - Get a summary of this thread\n\
    • `action-items` - Extract action items from the thread\n\
    • `key-points` - List key discussion points\n\n\
    Or ask me any question about this thread!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Summarize,
    ActionItems,
    KeyPoints,
    /// Free-form question about the thread.
    Ask,
}

impl Command {
    pub fn parse(intent: &str) -> Self {
        let trimmed = intent.trim();
        let is = |kw: &str| trimmed.eq_ignore_ascii_case(kw);

        if is("help") || is("?") {
            Command::Help
        } else if is("summarize") {
            Command::Summarize
        } else if is("action-items") {
            Command::ActionItems
        } else if is("key-points") {
            Command::KeyPoints
        } else {
            Command::Ask
        }
    }

    /// Whether answering needs the language model.
    pub fn needs_model(&self) -> bool {
        !matches!(self, Command::Help)
    }
}
