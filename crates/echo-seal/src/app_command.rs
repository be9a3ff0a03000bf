use std::path::PathBuf;

use uuid::Uuid;

/// What a typed line means depends on what the app is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal command prompt.
    Command,
    /// Waiting for the password to seal a finished recording.
    SealCredential,
    /// Waiting for the password to unseal a selected image.
    UnsealCredential,
}

/// A history entry picked by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySelector {
    /// 1-based position in the listing, newest first.
    Index(usize),
    /// Artifact id.
    Id(Uuid),
}

/// Commands parsed from terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Start, stop or reset depending on the current phase (empty line).
    Toggle,
    /// Start a new recording.
    Record,
    /// Stop the current recording.
    Stop,
    /// Return to idle after a result.
    Reset,
    /// Decode the seal image at a path.
    Unseal {
        /// Image file to decode.
        path: PathBuf,
    },
    /// List stored seals.
    History,
    /// Delete a stored seal.
    Delete(HistorySelector),
    /// Copy a stored seal image to the clipboard.
    Copy(HistorySelector),
    /// Open a stored seal in the default viewer.
    Open(HistorySelector),
    /// Show the command list.
    Help,
    /// Request application shutdown.
    Quit,
    /// A password typed at a credential prompt.
    Credential(String),
    /// Abandon the credential prompt.
    Cancel,
    /// Input that matched no command.
    Unknown(String),
}

/// Typed at a credential prompt to abandon it.
pub const CANCEL_WORD: &str = ":cancel";

impl AppCommand {
    /// Interpret one input line in `mode`.
    ///
    /// At a credential prompt every line is the credential, untrimmed, except
    /// [`CANCEL_WORD`].
    pub fn parse(line: &str, mode: InputMode) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);

        if mode != InputMode::Command {
            if line.trim() == CANCEL_WORD {
                return AppCommand::Cancel;
            }
            return AppCommand::Credential(line.to_string());
        }

        let trimmed = line.trim();
        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (trimmed, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" => AppCommand::Toggle,
            "record" | "r" => AppCommand::Record,
            "stop" | "s" => AppCommand::Stop,
            "reset" => AppCommand::Reset,
            "unseal" | "u" if !rest.is_empty() => AppCommand::Unseal {
                path: PathBuf::from(rest),
            },
            "history" | "h" | "ls" => AppCommand::History,
            "delete" | "rm" => Self::with_selector(trimmed, rest, AppCommand::Delete),
            "copy" | "cp" => Self::with_selector(trimmed, rest, AppCommand::Copy),
            "open" | "o" => Self::with_selector(trimmed, rest, AppCommand::Open),
            "help" | "?" => AppCommand::Help,
            "quit" | "exit" | "q" => AppCommand::Quit,
            _ => AppCommand::Unknown(trimmed.to_string()),
        }
    }

    fn with_selector(
        input: &str,
        rest: &str,
        build: fn(HistorySelector) -> AppCommand,
    ) -> AppCommand {
        match HistorySelector::parse(rest) {
            Some(selector) => build(selector),
            None => AppCommand::Unknown(input.to_string()),
        }
    }
}

impl HistorySelector {
    /// Parse a 1-based index or an artifact id.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Ok(index) = input.parse::<usize>() {
            return (index > 0).then_some(HistorySelector::Index(index));
        }
        Uuid::parse_str(input).ok().map(HistorySelector::Id)
    }
}
