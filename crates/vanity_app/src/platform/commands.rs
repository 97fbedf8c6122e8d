//! Line-oriented command parser for the terminal front end.

use thiserror::Error;
use vanity_core::{FormField, Msg};

pub(crate) const HELP: &str = "\
Commands:
  set host <ip>          server address to generate on
  set port <n>           SSH port (default 22)
  set user <name>        SSH username (default root)
  set password <secret>  SSH password, never saved
  set prefix <text>      address must start with this
  set suffix <text>      address must end with this
  set contains <text>    address must contain this
  set case on|off        case-sensitive matching
  set count <n>          number of wallets (default 1)
  set cores <n>          CPU cores to use, after a successful test
  test                   test the SSH connection
  start                  start generation
  stop                   stop the running task
  download               download the last result file
  clear                  clear the terminal
  status                 show the current form and session
  help                   show this list
  quit                   exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Edit(FormField),
    TestConnection,
    Start,
    Stop,
    Download,
    Clear,
    Status,
    Help,
    Quit,
    Empty,
}

impl Command {
    /// The controller message for commands that reach the core.
    pub(crate) fn into_msg(self) -> Option<Msg> {
        match self {
            Command::Edit(field) => Some(Msg::FormEdited(field)),
            Command::TestConnection => Some(Msg::TestConnectionClicked),
            Command::Start => Some(Msg::StartClicked),
            Command::Stop => Some(Msg::StopClicked),
            Command::Download => Some(Msg::DownloadClicked),
            Command::Clear => Some(Msg::ClearTerminalClicked),
            Command::Status | Command::Help | Command::Quit | Command::Empty => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CommandError {
    #[error("unknown command {0:?}; type `help` for the list")]
    Unknown(String),
    #[error("unknown field {0:?}; type `help` for the list")]
    UnknownField(String),
    #[error("`set {0}` needs a value")]
    MissingValue(&'static str),
    #[error("expected on or off, got {0:?}")]
    NotASwitch(String),
    #[error("expected a whole number, got {0:?}")]
    NotANumber(String),
}

pub(crate) fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = split_word(line);
    match word.to_ascii_lowercase().as_str() {
        "" => Ok(Command::Empty),
        "set" => parse_set(rest),
        "test" => Ok(Command::TestConnection),
        "start" => Ok(Command::Start),
        "stop" => Ok(Command::Stop),
        "download" => Ok(Command::Download),
        "clear" => Ok(Command::Clear),
        "status" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// `y` and `yes` accept a prompt; every other answer declines it.
pub(crate) fn parse_answer(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn parse_set(args: &str) -> Result<Command, CommandError> {
    let (field, value) = split_word(args);
    // Text fields keep inner spaces; an empty value clears the field.
    let text = value.to_string();
    let edit = match field.to_ascii_lowercase().as_str() {
        "host" => FormField::Host(text),
        "port" => FormField::Port(text),
        "user" | "username" => FormField::Username(text),
        "password" => FormField::Password(text),
        "prefix" => FormField::Prefix(text),
        "suffix" => FormField::Suffix(text),
        "contains" => FormField::Contains(text),
        "count" => FormField::WalletCount(text),
        "case" => FormField::CaseSensitive(parse_switch(value)?),
        "cores" => {
            if value.is_empty() {
                return Err(CommandError::MissingValue("cores"));
            }
            let cores = value
                .parse()
                .map_err(|_| CommandError::NotANumber(value.to_string()))?;
            FormField::CpuCores(cores)
        }
        "" => return Err(CommandError::MissingValue("<field>")),
        other => return Err(CommandError::UnknownField(other.to_string())),
    };
    Ok(Command::Edit(edit))
}

fn parse_switch(value: &str) -> Result<bool, CommandError> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        "" => Err(CommandError::MissingValue("case")),
        _ => Err(CommandError::NotASwitch(value.to_string())),
    }
}

fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_actions() {
        assert_eq!(parse_command("test"), Ok(Command::TestConnection));
        assert_eq!(parse_command("  START "), Ok(Command::Start));
        assert_eq!(parse_command("stop"), Ok(Command::Stop));
        assert_eq!(parse_command("download"), Ok(Command::Download));
        assert_eq!(parse_command("clear"), Ok(Command::Clear));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
        assert_eq!(parse_command(""), Ok(Command::Empty));
    }

    #[test]
    fn set_maps_to_form_edits() {
        assert_eq!(
            parse_command("set host 10.0.0.5"),
            Ok(Command::Edit(FormField::Host("10.0.0.5".to_string())))
        );
        assert_eq!(
            parse_command("set password two words"),
            Ok(Command::Edit(FormField::Password("two words".to_string())))
        );
        assert_eq!(
            parse_command("set user"),
            Ok(Command::Edit(FormField::Username(String::new())))
        );
        assert_eq!(
            parse_command("set case on"),
            Ok(Command::Edit(FormField::CaseSensitive(true)))
        );
        assert_eq!(
            parse_command("set cores 3"),
            Ok(Command::Edit(FormField::CpuCores(3)))
        );
        assert_eq!(
            parse_command("set count 5"),
            Ok(Command::Edit(FormField::WalletCount("5".to_string())))
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse_command("launch"),
            Err(CommandError::Unknown("launch".to_string()))
        );
        assert_eq!(
            parse_command("set colour red"),
            Err(CommandError::UnknownField("colour".to_string()))
        );
        assert_eq!(
            parse_command("set case maybe"),
            Err(CommandError::NotASwitch("maybe".to_string()))
        );
        assert_eq!(
            parse_command("set cores many"),
            Err(CommandError::NotANumber("many".to_string()))
        );
        assert_eq!(parse_command("set"), Err(CommandError::MissingValue("<field>")));
    }

    #[test]
    fn only_yes_accepts_a_prompt() {
        assert!(parse_answer("y"));
        assert!(parse_answer(" YES "));
        assert!(!parse_answer(""));
        assert!(!parse_answer("no"));
        assert!(!parse_answer("start"));
    }

    #[test]
    fn local_commands_do_not_reach_the_core() {
        assert_eq!(Command::Status.into_msg(), None);
        assert_eq!(Command::Help.into_msg(), None);
        assert_eq!(Command::Start.into_msg(), Some(Msg::StartClicked));
    }
}
