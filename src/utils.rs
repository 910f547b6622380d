//! Utility functions and types.

use std::fmt::Debug;

/// Redacts a string by replacing all but the first and last three characters
/// with asterisks.
///
/// - Inputs shorter than 12 characters are redacted entirely.
/// - Longer inputs keep only the first three and last three characters.
///
/// Keeps redacted values distinguishable in debug output without leaking
/// the secret itself.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        match value {
            None => Redact(""),
            Some(v) => Redact(v),
        }
    }
}

impl<'a> Debug for Redact<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let length = self.0.len();
        if length == 0 {
            f.write_str("EMPTY")
        } else if length < 12 {
            f.write_str("***")
        } else {
            f.write_str(&self.0[..3])?;
            f.write_str("***")?;
            f.write_str(&self.0[length - 3..])
        }
    }
}

/// Escape a JSON body for embedding inside a single-quoted script string
/// literal.
///
/// Backslashes are escaped before single quotes; reversing the order would
/// re-escape the backslashes inserted for the quotes.
pub fn script_escape(body: &str) -> String {
    body.replace('\\', "\\\\").replace('\'', "\\'")
}
