//! Whitelist validation of actions and option keys.

use chrono::NaiveDate;

use crate::command_catalog::code_list;
use crate::command_error::CommandError;
use crate::option_grammar::ParsedOptions;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validates a single-word action against the allowed set, returning it trimmed.
pub fn validate_action<S: AsRef<str>>(action: &str, allowed: &[S]) -> Result<String, CommandError> {
    let mut words = action.split_whitespace();
    let (Some(word), None) = (words.next(), words.next()) else {
        return Err(CommandError::MalformedAction);
    };
    if !allowed.iter().any(|item| item.as_ref() == word) {
        return Err(CommandError::UnsupportedAction {
            action: word.to_string(),
            supported: code_list(allowed),
        });
    }
    Ok(word.to_string())
}

/// Rejects the whole option set when any key is unknown or lacks a value.
pub fn validate_options<S: AsRef<str>>(
    parsed: &ParsedOptions,
    allowed: &[S],
) -> Result<(), CommandError> {
    for (key, values) in parsed {
        if !allowed.iter().any(|item| item.as_ref() == key) {
            return Err(CommandError::UnrecognizedOption {
                key: key.clone(),
                supported: if allowed.is_empty() {
                    "none".to_string()
                } else {
                    code_list(allowed)
                },
            });
        }
        if values.is_empty() {
            return Err(CommandError::MissingOptionValue { key: key.clone() });
        }
    }
    Ok(())
}

/// Returns the value of an option that may appear at most once.
pub fn single_option<'a>(
    parsed: &'a ParsedOptions,
    key: &str,
) -> Result<Option<&'a str>, CommandError> {
    match parsed.get(key).map(Vec::as_slice) {
        None | Some([]) => Ok(None),
        Some([value]) => Ok(Some(value.as_str())),
        Some(_) => Err(CommandError::RepeatedOption {
            key: key.to_string(),
        }),
    }
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date_value(value: &str) -> Result<NaiveDate, CommandError> {
    let invalid = || CommandError::InvalidDate {
        value: value.to_string(),
    };
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}
