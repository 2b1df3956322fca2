use std::fmt;

use crate::countries::{
    repo_types::{CAPITAL_MAX, NAME_MAX, POPULATION_MAX, REGION_MAX},
    whitelist,
};

/// The four text cells read from one spreadsheet row, as found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub name: String,
    pub capital: String,
    pub region: String,
    pub population: String,
}

/// Trimmed and truncated fields of an accepted row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRow {
    pub name: String,
    pub capital: String,
    pub region: String,
    pub population: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    MissingName,
    UnknownCountry(String),
}

/// A rejected row, numbered as in the spreadsheet (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRejection {
    pub row: usize,
    pub reason: RejectReason,
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            RejectReason::MissingName => write!(f, "Row {}: No country name", self.row),
            RejectReason::UnknownCountry(name) => {
                write!(f, "Row {}: '{}' is not a valid country", self.row, name)
            }
        }
    }
}

pub fn validate_row(row_number: usize, raw: &RawRow) -> Result<ValidRow, RowRejection> {
    let name = raw.name.trim();
    if name.is_empty() {
        return Err(RowRejection {
            row: row_number,
            reason: RejectReason::MissingName,
        });
    }
    if !whitelist::is_recognized(name) {
        return Err(RowRejection {
            row: row_number,
            reason: RejectReason::UnknownCountry(name.to_string()),
        });
    }

    Ok(ValidRow {
        name: clip(name, NAME_MAX),
        capital: clip(&raw.capital, CAPITAL_MAX),
        region: clip(&raw.region, REGION_MAX),
        population: clip(&raw.population, POPULATION_MAX),
    })
}

/// Trims, then keeps at most `max` characters.
fn clip(value: &str, max: usize) -> String {
    value.trim().chars().take(max).collect()
}
