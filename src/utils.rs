use chrono::{SecondsFormat, Utc};
use rusqlite::ErrorCode;

use crate::error::SomanaError;

pub struct Utils {}

impl Utils {
    /// Current time as stored in `createdAt`/`updatedAt`
    pub fn now_timestamp() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Trims a text attribute and checks its length in characters
    pub fn checked_length(
        label: &str,
        value: &str,
        min: usize,
        max: usize,
    ) -> Result<String, SomanaError> {
        let trimmed = value.trim();
        let len = trimmed.chars().count();

        if len < min {
            return Err(SomanaError::ValidationError(format!(
                "{label} must be at least {min} characters long. Current length: {len}"
            )));
        }

        if len > max {
            return Err(SomanaError::ValidationError(format!(
                "{label} must be less than {max} characters. Current length: {len}"
            )));
        }

        Ok(trimmed.to_owned())
    }

    /// Returns the value if it is present and not blank
    pub fn required(value: Option<String>, message: &str) -> Result<String, SomanaError> {
        match value {
            Some(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(SomanaError::ValidationError(message.to_owned())),
        }
    }

    /// Trims an optional attribute, treating blank as absent
    pub fn trimmed(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    /// Turns a unique-constraint failure into a `Conflict` carrying `message`
    pub fn map_unique_violation(err: rusqlite::Error, message: &str) -> SomanaError {
        match &err {
            rusqlite::Error::SqliteFailure(sqlite_err, _)
                if sqlite_err.code == ErrorCode::ConstraintViolation =>
            {
                SomanaError::Conflict(message.to_owned())
            }
            _ => SomanaError::DatabaseError(err),
        }
    }
}
