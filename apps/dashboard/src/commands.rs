//! Line commands typed at the dashboard prompt.

use shared::domain::PersonaId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardCommand {
    /// Raw persona key; unknown keys are rejected by the orchestrator, not here.
    SelectPersona(String),
    Refresh,
    Show,
    Help,
    Quit,
}

impl DashboardCommand {
    pub fn name(&self) -> &'static str {
        match self {
            DashboardCommand::SelectPersona(_) => "select_persona",
            DashboardCommand::Refresh => "refresh",
            DashboardCommand::Show => "show",
            DashboardCommand::Help => "help",
            DashboardCommand::Quit => "quit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("usage: persona <user1|user2|user3>")]
    MissingPersona,
    #[error("unknown command '{0}'; type 'help' for the list")]
    Unknown(String),
}

pub const HELP: &str = "\
commands:
  persona <key>   switch persona (user1, user2, user3)
  1 | 2 | 3       switch to the numbered persona
  refresh         reload recommendations for the current persona
  show            print the dashboard again
  help            this list
  quit            exit";

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<DashboardCommand>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "persona" | "p" => {
            let key = words.next().ok_or(CommandError::MissingPersona)?;
            DashboardCommand::SelectPersona(key.to_string())
        }
        "refresh" | "r" => DashboardCommand::Refresh,
        "show" | "s" => DashboardCommand::Show,
        "help" | "h" | "?" => DashboardCommand::Help,
        "quit" | "q" | "exit" => DashboardCommand::Quit,
        other => match numbered_persona(other) {
            Some(persona) => DashboardCommand::SelectPersona(persona.key().to_string()),
            None => return Err(CommandError::Unknown(head.to_string())),
        },
    };
    Ok(Some(command))
}

fn numbered_persona(word: &str) -> Option<PersonaId> {
    let index = word.parse::<usize>().ok()?.checked_sub(1)?;
    PersonaId::ALL.get(index).copied()
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
