//! Prompt input for fiander.
//!
//! Holds the `:` command line buffer and the `y/N` confirmation used before a purge, and
//! parses a submitted line into a [PromptCommand].

/// What an open prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Command,
    ConfirmPurge { count: usize },
}

impl PromptKind {
    pub fn label(&self) -> String {
        match self {
            PromptKind::Command => ":".into(),
            PromptKind::ConfirmPurge { count } => {
                format!("Delete {count} staged item(s)? [y/N] ")
            }
        }
    }
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptCommand {
    /// Export the current directory.
    Catlsr,
    /// Change directory; empty means home.
    Cd(String),
    Reload,
    Clear,
    Help,
    Quit,
    Unknown(String),
}

impl PromptCommand {
    /// Returns `None` for an empty line.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let line = line.strip_prefix(':').unwrap_or(line).trim_start();
        if line.is_empty() {
            return None;
        }
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };
        Some(match cmd {
            "catlsr" => PromptCommand::Catlsr,
            "cd" => PromptCommand::Cd(rest.to_owned()),
            "ls" => PromptCommand::Reload,
            "clear" => PromptCommand::Clear,
            "help" | "h" | "?" => PromptCommand::Help,
            "q" | "quit" | "exit" => PromptCommand::Quit,
            other => PromptCommand::Unknown(other.to_owned()),
        })
    }
}

/// The open prompt and its input buffer.
#[derive(Debug, Clone)]
pub struct PromptState {
    kind: PromptKind,
    buffer: String,
    cursor: usize,
}

impl PromptState {
    pub fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            buffer: String::new(),
            cursor: 0,
        }
    }

    // Getters / accessors

    #[inline]
    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    #[inline]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    // Editing

    fn byte_index(&self, char_idx: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_idx)
            .map_or(self.buffer.len(), |(i, _)| i)
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.buffer.remove(at);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.buffer.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.buffer.chars().count();
    }

    /// True if the confirmation buffer says yes.
    pub fn confirmed(&self) -> bool {
        matches!(self.buffer.trim(), "y" | "Y" | "yes")
    }
}
