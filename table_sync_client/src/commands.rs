use std::fmt;
use table_sync::{ActionKind, Amount};

/// A line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Play an action for the local seat
    Act {
        action: ActionKind,
        amount: Option<Amount>,
    },
    /// Ask the server to deal
    Deal,
    /// Show cached data for a seat
    Seat(u8),
    /// Print the current table summary
    State,
    Help,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Raise or bet without an amount.
    MissingAmount(&'static str),
    /// Amount is not a non-negative whole number.
    InvalidAmount(String),
    /// Seat command without a seat.
    MissingSeat,
    /// Seat is not a number.
    InvalidSeat(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAmount(action) => {
                write!(f, "'{}' needs an amount (e.g., '{} 100')", action, action)
            }
            Self::InvalidAmount(value) => write!(
                f,
                "Invalid amount '{}'. Must be a whole number of chips",
                value
            ),
            Self::MissingSeat => write!(f, "Seat command needs a seat number (e.g., 'seat 3')"),
            Self::InvalidSeat(value) => write!(f, "Invalid seat '{}'", value),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

pub const HELP_TEXT: &str = "\
Commands:
  fold | check | call     act for your seat
  raise N | bet N         act with an amount
  deal                    ask the server to deal
  seat N                  show cached data for seat N
  state                   print the table summary
  help                    show this text
  quit                    leave the table";

/// Parse a command string into a [`Command`].
///
/// # Examples
///
/// ```
/// use table_sync::{ActionKind, Amount};
/// use table_sync_client::commands::{Command, parse_command};
///
/// assert_eq!(parse_command("deal"), Ok(Command::Deal));
/// assert_eq!(
///     parse_command("raise 100"),
///     Ok(Command::Act { action: ActionKind::Raise, amount: Some(Amount(100)) })
/// );
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();
    let lowered = trimmed.to_ascii_lowercase();
    let parts: Vec<&str> = lowered.split_ascii_whitespace().collect();

    match parts.as_slice() {
        ["fold"] => Ok(simple(ActionKind::Fold)),
        ["check"] => Ok(simple(ActionKind::Check)),
        ["call"] => Ok(simple(ActionKind::Call)),
        ["raise", rest @ ..] => parse_amount_command(ActionKind::Raise, "raise", rest),
        ["bet", rest @ ..] => parse_amount_command(ActionKind::Bet, "bet", rest),
        ["deal"] => Ok(Command::Deal),
        ["seat", rest @ ..] => parse_seat_command(rest),
        ["state"] | ["s"] => Ok(Command::State),
        ["help"] | ["h"] | ["?"] => Ok(Command::Help),
        ["quit"] | ["exit"] | ["q"] => Ok(Command::Quit),
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

fn simple(action: ActionKind) -> Command {
    Command::Act {
        action,
        amount: None,
    }
}

/// Parse "raise N" / "bet N"
fn parse_amount_command(
    action: ActionKind,
    name: &'static str,
    rest: &[&str],
) -> Result<Command, ParseError> {
    let value = rest.first().ok_or(ParseError::MissingAmount(name))?;
    let amount = value
        .parse::<Amount>()
        .map_err(|_| ParseError::InvalidAmount(value.to_string()))?;

    Ok(Command::Act {
        action,
        amount: Some(amount),
    })
}

fn parse_seat_command(rest: &[&str]) -> Result<Command, ParseError> {
    let value = rest.first().ok_or(ParseError::MissingSeat)?;
    value
        .parse::<u8>()
        .map(Command::Seat)
        .map_err(|_| ParseError::InvalidSeat(value.to_string()))
}
