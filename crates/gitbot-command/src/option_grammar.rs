//! Option-string grammar: `key1=val1;key2=val2a;key2=val2b;flagkey`.

use std::collections::BTreeMap;

use thiserror::Error;

/// Multi-valued option map keyed by trimmed, case-sensitive option name.
pub type ParsedOptions = BTreeMap<String, Vec<String>>;

pub const OPTION_SEPARATOR: char = ';';
pub const OPTION_ASSIGN: char = '=';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Enumerates syntax violations reported by [`parse_options`].
pub enum OptionGrammarError {
    #[error("parameter may not be empty")]
    EmptyParameter,
    #[error("parameter name may not be empty")]
    EmptyParameterName,
}

/// Parses a raw option string into a multi-valued key/value map.
///
/// Segments are separated by `;` and split on the first `=` only, so values
/// may contain `=`. Keys are trimmed; values are kept verbatim. A segment
/// without `=` registers the key with no values. Repeating a key with a value
/// appends to its value list in input order.
pub fn parse_options(raw: &str) -> Result<ParsedOptions, OptionGrammarError> {
    let mut values = ParsedOptions::new();
    if raw.is_empty() {
        return Ok(values);
    }

    for segment in raw.split(OPTION_SEPARATOR) {
        if segment.is_empty() {
            return Err(OptionGrammarError::EmptyParameter);
        }
        let (raw_key, value) = match segment.split_once(OPTION_ASSIGN) {
            Some((key, value)) => (key, Some(value)),
            None => (segment, None),
        };
        let key = raw_key.trim();
        if key.is_empty() {
            return Err(OptionGrammarError::EmptyParameterName);
        }
        match value {
            Some(value) => values
                .entry(key.to_string())
                .or_default()
                .push(value.to_string()),
            None => {
                values.insert(key.to_string(), Vec::new());
            }
        }
    }
    Ok(values)
}

/// Renders a parsed map back into option-string form, keys in sorted order.
pub fn render_options(options: &ParsedOptions) -> String {
    let mut segments = Vec::new();
    for (key, values) in options {
        if values.is_empty() {
            segments.push(key.clone());
            continue;
        }
        for value in values {
            segments.push(format!("{key}{OPTION_ASSIGN}{value}"));
        }
    }
    segments.join(&OPTION_SEPARATOR.to_string())
}
