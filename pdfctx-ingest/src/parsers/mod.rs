//! Post-extraction parsers selectable per run.

pub mod bank_statement;

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

pub use bank_statement::parse_bank_statement;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParserKind {
    /// Write the extracted grid as is.
    #[default]
    Raw,
    /// Normalize rows into dated, signed transactions.
    BankStatement,
}

impl ParserKind {
    pub const ALL: [ParserKind; 2] = [ParserKind::Raw, ParserKind::BankStatement];

    pub fn as_str(self) -> &'static str {
        match self {
            ParserKind::Raw => "raw",
            ParserKind::BankStatement => "bank-statement",
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParserKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "raw" => Ok(ParserKind::Raw),
            "bank-statement" => Ok(ParserKind::BankStatement),
            other => bail!("unknown parser '{other}' (available: raw, bank-statement)"),
        }
    }
}
