use std::fmt::Write as _;
use thiserror::Error;

use crate::kernel::{Reactor, Route, Screen, UserInput};
use crate::workflow::RequestState;

pub const HELP: &str = "\
commands:
  go <path>            open /, /login or /signup (the bare path works too)
  email <address>      set the email field
  password <secret>    set the password field
  show                 toggle password visibility
  submit               sign in / sign up
  notes <text>         replace your notes
  sample               load the sample notes
  summarize            send the notes for summarization
  logout               sign out
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Input(UserInput),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("`{0}` needs a value")]
    MissingValue(&'static str),
    #[error(transparent)]
    Route(#[from] crate::kernel::session::RouteParseError),
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let input = match head {
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        "go" => UserInput::Navigate(required("go", rest)?.parse::<Route>()?),
        path if path.starts_with('/') => UserInput::Navigate(path.parse::<Route>()?),
        "email" => UserInput::EditEmail(rest.to_string()),
        "password" => UserInput::EditPassword(rest.to_string()),
        "show" => UserInput::TogglePasswordVisibility,
        "submit" => UserInput::SubmitCredentials,
        "notes" => UserInput::EditNotes(required("notes", rest)?.to_string()),
        "sample" => UserInput::LoadSample,
        "summarize" => UserInput::Summarize,
        "logout" => UserInput::SignOut,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Command::Input(input))
}

fn required<'a>(command: &'static str, value: &'a str) -> Result<&'a str, CommandError> {
    if value.is_empty() {
        Err(CommandError::MissingValue(command))
    } else {
        Ok(value)
    }
}

/// Text projection of whatever the reactor currently shows.
pub fn render(reactor: &Reactor) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "── {} ──", reactor.location());

    match &reactor.view().screen {
        Screen::Waiting => {
            let _ = writeln!(out, "Checking your session...");
        }
        Screen::Form(form) => {
            let _ = writeln!(out, "email:    {}", form.input().email);
            let _ = writeln!(out, "password: {}", form.display_password());
            if let Some(error) = form.error() {
                let _ = writeln!(out, "! {}", error);
            }
            let button = if form.is_pending() {
                form.mode().pending_label()
            } else {
                form.mode().submit_label()
            };
            let state = if form.can_submit() || form.is_pending() { "" } else { " (disabled)" };
            let _ = writeln!(out, "[{}]{}", button, state);
        }
        Screen::Workflow(workflow) => {
            if let Some(email) = reactor.session().identity().and_then(|i| i.email()) {
                let _ = writeln!(out, "signed in as {}", email);
            }
            let _ = writeln!(out, "{} characters", workflow.char_count());
            match workflow.state() {
                RequestState::Idle => {}
                RequestState::Pending => {
                    let _ = writeln!(out, "Summarizing...");
                }
                RequestState::Succeeded(summary) => {
                    let _ = writeln!(out, "AI Summary:\n{}", summary);
                }
                RequestState::Failed(message) => {
                    let _ = writeln!(out, "{}", message);
                }
            }
        }
    }
    out
}
