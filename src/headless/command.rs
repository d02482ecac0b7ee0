//! Stdin command parsing for headless mode

use std::str::FromStr;

use thiserror::Error;

use locwatch_app::LifecycleEvent;

/// One line of driver input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Start if not tracking, otherwise stop
    Toggle,
    Start,
    Stop,
    Status,
    /// Accept the pending dialog, or grant in system settings when none is shown
    Grant,
    Deny,
    DenyForever,
    /// Revoke the permission in system settings
    Revoke,
    /// Deliver a fix from the location stream
    Fix { latitude: f64, longitude: f64 },
    Lifecycle(LifecycleEvent),
    OpenSettings,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("usage: fix <lat> <lon>")]
    FixUsage,

    #[error("invalid coordinate: {0}")]
    Coordinate(String),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(ParseCommandError::Empty);
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "t" | "toggle" => Command::Toggle,
            "start" => Command::Start,
            "stop" => Command::Stop,
            "status" => Command::Status,
            "grant" => Command::Grant,
            "deny" => Command::Deny,
            "deny-forever" => Command::DenyForever,
            "revoke" => Command::Revoke,
            "fix" => {
                let (Some(lat), Some(lon), None) = (words.next(), words.next(), words.next())
                else {
                    return Err(ParseCommandError::FixUsage);
                };
                return Ok(Command::Fix {
                    latitude: parse_coordinate(lat, 90.0)?,
                    longitude: parse_coordinate(lon, 180.0)?,
                });
            }
            "pause" | "resume" | "destroy" => name
                .parse()
                .map(Command::Lifecycle)
                .map_err(|_| ParseCommandError::Unknown(name.to_string()))?,
            "settings" => Command::OpenSettings,
            "q" | "quit" => Command::Quit,
            _ => return Err(ParseCommandError::Unknown(name.to_string())),
        };

        if words.next().is_some() {
            return Err(ParseCommandError::Unknown(line.trim().to_string()));
        }
        Ok(command)
    }
}

fn parse_coordinate(word: &str, limit: f64) -> Result<f64, ParseCommandError> {
    match word.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() <= limit => Ok(value),
        _ => Err(ParseCommandError::Coordinate(word.to_string())),
    }
}
