//! Line commands accepted by the REPL.

use std::path::PathBuf;

use thiserror::Error;

/// One REPL command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Welcome -> occasion.
    Start,
    /// Pick an image file.
    Select(PathBuf),
    /// Set the occasion.
    Occasion(String),
    /// Upload and analyze.
    Next,
    /// Navigate to a named screen.
    Back(String),
    /// Switch feedback tab.
    Tab(String),
    /// Switch advisor tone.
    Tone(String),
    /// Send a chat message.
    Say(String),
    /// Log in with an email.
    Login(String),
    /// Log out.
    Logout,
    /// Open the profile.
    Profile,
    /// Dismiss the login prompt.
    Dismiss,
    /// Start over with a new photo.
    Reset,
    /// Re-render the view.
    Show,
    /// List commands.
    Help,
    /// Leave the REPL.
    Quit,
}

/// Usage text printed by `help`.
pub const HELP_TEXT: &str = "\
commands:
  start              go to the occasion screen
  select <path>      pick an outfit photo
  occasion <text>    set the occasion
  next               upload and analyze
  back <screen>      show welcome|occasion|analysis|feedback|profile
  tab <name>         highlights|color-analysis|suggestions
  tone <name>        gentle|balanced|direct
  say <text>         chat with the advisor
  login <email>      sign in
  logout             sign out
  profile            open your profile
  dismiss            close the login prompt
  reset              start over with a new photo
  show               render the current view
  quit               exit";

/// Command parse failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Verb is not recognized.
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),
    /// Verb needs an argument.
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
}

/// Parses one input line. Blank lines yield `Ok(None)`.
///
/// # Errors
/// Returns [`CommandError`] for unknown verbs or missing arguments.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let argument = |name: &'static str| {
        if rest.is_empty() {
            Err(CommandError::MissingArgument(name))
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "start" => Command::Start,
        "select" => Command::Select(PathBuf::from(argument("select")?)),
        "occasion" => Command::Occasion(argument("occasion")?),
        "next" => Command::Next,
        "back" => Command::Back(argument("back")?),
        "tab" => Command::Tab(argument("tab")?),
        "tone" => Command::Tone(argument("tone")?),
        "say" => Command::Say(argument("say")?),
        "login" => Command::Login(argument("login")?),
        "logout" => Command::Logout,
        "profile" => Command::Profile,
        "dismiss" => Command::Dismiss,
        "reset" => Command::Reset,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err(CommandError::Unknown(verb.to_string())),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_argument_text_verbatim() {
        assert_eq!(
            parse_command("say  what shoes go with   this?").expect("parse"),
            Some(Command::Say("what shoes go with   this?".to_string()))
        );
        assert_eq!(
            parse_command("SELECT ./photos/look 1.jpg").expect("parse"),
            Some(Command::Select(PathBuf::from("./photos/look 1.jpg")))
        );
    }

    #[test]
    fn blank_and_bad_lines() {
        assert_eq!(parse_command("   ").expect("parse"), None);
        assert_eq!(
            parse_command("login"),
            Err(CommandError::MissingArgument("login"))
        );
        assert_eq!(
            parse_command("dance"),
            Err(CommandError::Unknown("dance".to_string()))
        );
    }
}
