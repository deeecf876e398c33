//! Error taxonomy for locale resolution and token normalization.
//!
//! Only [`UnknownLocaleError`] is meant to reach callers. Amount and date
//! errors stay inside the statement row parser, which treats them as
//! "skip this row".

use thiserror::Error;

/// A locale code outside the registry was requested.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown locale '{code}' (available: fr, de, en)")]
pub struct UnknownLocaleError {
    pub code: String,
}

impl UnknownLocaleError {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    #[error("amount is empty")]
    Empty,

    #[error("amount '{raw}' contains unexpected characters")]
    InvalidCharacters { raw: String },

    #[error("amount '{raw}' has more than one decimal point")]
    MultipleDecimalPoints { raw: String },

    #[error("amount '{raw}' is not a number")]
    Malformed { raw: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    #[error("'{raw}' does not match any date pattern")]
    NoMatch { raw: String },

    #[error("'{raw}': unknown month name '{month}'")]
    UnknownMonth { raw: String, month: String },

    #[error("'{raw}': {year:04}-{month:02}-{day:02} is not a calendar date")]
    OutOfRange {
        raw: String,
        year: i32,
        month: u32,
        day: u32,
    },
}
