//! Classification of console input into prompts and slash commands.
//!
//! Parsing is pure: it never touches settings or history. The session decides
//! what each [`Input`] does.

/// Prefix that turns a line into a command.
pub const COMMAND_MARKER: char = '/';

pub const HELP_TEXT: &str = "\
Available commands:
  /clear              - Clear chat history
  /config             - Show configuration
  /exit or /quit      - Exit the chat
  /help               - Show this help message
  /history            - Show history length
  /history [length]   - Set history length
  /model              - Switch model (not implemented yet)
  /system             - Show the system prompt
  /temperature        - Show temperature
  /temperature [0..1] - Set temperature
  /tokens             - Show max. output tokens
  /tokens [count]     - Set max. output tokens
  /version            - Show version of the chat bot";

/// A recognized slash command.
///
/// Commands that take an argument carry the first word after the command name,
/// unparsed. Anything after that word is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    Config,
    System,
    Version,
    Model,
    Clear,
    History(Option<String>),
    Temperature(Option<String>),
    Tokens(Option<String>),
}

/// Why a line produced nothing to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// Only whitespace was entered.
    BlankInput,
    /// The command marker with no command name.
    BlankCommand,
    UnknownCommand(String),
}

impl EmptyReason {
    /// Hint shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            EmptyReason::BlankInput => "Please enter a valid prompt.",
            EmptyReason::BlankCommand => {
                "Command cannot be empty. Type '/help' for help. Type '/exit' or '/quit' to quit."
            }
            EmptyReason::UnknownCommand(_) => {
                "Unknown command. Type '/help' to see list of commands."
            }
        }
    }
}

/// One classified line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Prompt(String),
    Command(Command),
    Empty(EmptyReason),
}

/// Classify a raw line.
///
/// # Examples
///
/// ```
/// use ticket_talk::command::{parse, Command, EmptyReason, Input};
///
/// assert_eq!(parse("  hello "), Input::Prompt("hello".to_string()));
/// assert_eq!(parse("/tokens 500"), Input::Command(Command::Tokens(Some("500".to_string()))));
/// assert_eq!(parse("   "), Input::Empty(EmptyReason::BlankInput));
/// ```
pub fn parse(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty(EmptyReason::BlankInput);
    }

    let Some(command_line) = trimmed.strip_prefix(COMMAND_MARKER) else {
        return Input::Prompt(trimmed.to_string());
    };

    let mut words = command_line.split_whitespace();
    let Some(name) = words.next() else {
        return Input::Empty(EmptyReason::BlankCommand);
    };
    let body = words.next().map(str::to_string);

    let command = match name {
        "exit" | "quit" => Command::Exit,
        "help" => Command::Help,
        "config" => Command::Config,
        "system" => Command::System,
        "version" => Command::Version,
        "model" => Command::Model,
        "clear" => Command::Clear,
        "history" => Command::History(body),
        "temperature" => Command::Temperature(body),
        "tokens" => Command::Tokens(body),
        other => return Input::Empty(EmptyReason::UnknownCommand(other.to_string())),
    };

    Input::Command(command)
}

/// Parse a retained-exchange count: any non-negative integer.
pub fn parse_history_length(body: &str) -> Option<usize> {
    body.parse().ok()
}

/// Parse a sampling temperature in `[0, 1]`.
pub fn parse_temperature(body: &str) -> Option<f32> {
    body.parse::<f32>()
        .ok()
        .filter(|t| (0.0..=1.0).contains(t))
}

/// Parse an output token budget: a positive integer.
pub fn parse_token_count(body: &str) -> Option<usize> {
    body.parse::<usize>().ok().filter(|&n| n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_plain_text_is_prompt() {
        assert_eq!(parse("hello"), Input::Prompt("hello".to_string()));
        assert_eq!(
            parse("  which tickets are open?  "),
            Input::Prompt("which tickets are open?".to_string())
        );
    }

    #[test]
    fn test_marker_inside_text_is_prompt() {
        assert_eq!(parse("is OPS-1 done/closed"), Input::Prompt("is OPS-1 done/closed".to_string()));
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(parse(""), Input::Empty(EmptyReason::BlankInput));
        assert_eq!(parse("   \t "), Input::Empty(EmptyReason::BlankInput));
    }

    #[test]
    fn test_blank_command() {
        assert_eq!(parse("/"), Input::Empty(EmptyReason::BlankCommand));
        assert_eq!(parse("  /   "), Input::Empty(EmptyReason::BlankCommand));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse("/bogus"),
            Input::Empty(EmptyReason::UnknownCommand("bogus".to_string()))
        );
        assert_eq!(
            parse("/Help"),
            Input::Empty(EmptyReason::UnknownCommand("Help".to_string()))
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("/exit"), Input::Command(Command::Exit));
        assert_eq!(parse("/quit"), Input::Command(Command::Exit));
        assert_eq!(parse("/help"), Input::Command(Command::Help));
        assert_eq!(parse("/config"), Input::Command(Command::Config));
        assert_eq!(parse("/system"), Input::Command(Command::System));
        assert_eq!(parse("/version"), Input::Command(Command::Version));
        assert_eq!(parse("/model gpt-4"), Input::Command(Command::Model));
        assert_eq!(parse("/clear"), Input::Command(Command::Clear));
    }

    #[test]
    fn test_command_bodies() {
        assert_eq!(parse("/history"), Input::Command(Command::History(None)));
        assert_eq!(parse("/history 4"), Input::Command(Command::History(arg("4"))));
        assert_eq!(
            parse("/ temperature   0.5 "),
            Input::Command(Command::Temperature(arg("0.5")))
        );
        assert_eq!(parse("/tokens -5"), Input::Command(Command::Tokens(arg("-5"))));
    }

    #[test]
    fn test_extra_words_are_ignored() {
        assert_eq!(
            parse("/history 3 please"),
            Input::Command(Command::History(arg("3")))
        );
    }

    #[test]
    fn test_parse_history_length() {
        assert_eq!(parse_history_length("0"), Some(0));
        assert_eq!(parse_history_length("12"), Some(12));
        assert_eq!(parse_history_length("-1"), None);
        assert_eq!(parse_history_length("two"), None);
        assert_eq!(parse_history_length("1.5"), None);
    }

    #[test]
    fn test_parse_temperature_bounds() {
        assert_eq!(parse_temperature("0"), Some(0.0));
        assert_eq!(parse_temperature("1"), Some(1.0));
        assert_eq!(parse_temperature("0.5"), Some(0.5));
        assert_eq!(parse_temperature("2"), None);
        assert_eq!(parse_temperature("-0.1"), None);
        assert_eq!(parse_temperature("NaN"), None);
        assert_eq!(parse_temperature("warm"), None);
    }

    #[test]
    fn test_parse_token_count_bounds() {
        assert_eq!(parse_token_count("0"), None);
        assert_eq!(parse_token_count("-5"), None);
        assert_eq!(parse_token_count("1"), Some(1));
        assert_eq!(parse_token_count("4096"), Some(4096));
    }
}
