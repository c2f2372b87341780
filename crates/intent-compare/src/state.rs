//! Health assertions against device state

use std::str::FromStr;

use regex::Regex;
use serde_json::Value;

use intent_model::{AuditReport, StateAssertion};

use crate::equivalence::value_text;
use crate::path::join_path;
use crate::query::Query;
use crate::{Error, Result};

/// Operator of a health assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCheck {
    /// Exact text equality (`equals`, `matches`)
    Equals,
    /// Substring (`contains`, `includes`)
    Contains,
    /// Prefix (`startsWith`)
    StartsWith,
    /// Suffix (`endsWith`)
    EndsWith,
    /// Regular expression search (`regex`)
    Regex,
}

impl FromStr for StateCheck {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "equals" | "matches" => Ok(Self::Equals),
            "contains" | "includes" => Ok(Self::Contains),
            "startsWith" => Ok(Self::StartsWith),
            "endsWith" => Ok(Self::EndsWith),
            "regex" => Ok(Self::Regex),
            other => Err(Error::UnsupportedCheck {
                check: other.to_string(),
            }),
        }
    }
}

impl StateCheck {
    /// Whether `actual` satisfies the check against `expected`
    pub fn evaluate(&self, actual: &str, expected: &str) -> Result<bool> {
        Ok(match self {
            Self::Equals => actual == expected,
            Self::Contains => actual.contains(expected),
            Self::StartsWith => actual.starts_with(expected),
            Self::EndsWith => actual.ends_with(expected),
            Self::Regex => Regex::new(expected)
                .map_err(|e| Error::InvalidPattern {
                    pattern: expected.to_string(),
                    message: e.to_string(),
                })?
                .is_match(actual),
        })
    }
}

/// Evaluate health assertions against a state subtree
///
/// Each assertion selects at most one value from `actual_state`. Nothing
/// selected is recorded as `(expected, null)`; a failed check as
/// `(expected, actual)`. An unknown operator, bad pattern or malformed query
/// aborts with an error: those are configuration faults, not drift.
pub fn compare_state(
    device_id: &str,
    actual_state: &Value,
    assertions: &[StateAssertion],
    report: &mut AuditReport,
    base_path: &str,
) -> Result<()> {
    for assertion in assertions {
        let check = match assertion.check.as_deref() {
            Some(name) => name.parse::<StateCheck>()?,
            None => StateCheck::Equals,
        };
        let query = Query::parse(&assertion.path)?;
        let expected = value_text(&assertion.value);
        let name = join_path(base_path, display_query(&assertion.path));

        match query.select(actual_state) {
            None => {
                tracing::debug!(device = %device_id, path = %name, "State value not found");
                report.add_attribute(name, device_id, Some(expected), None);
            }
            Some(actual) => {
                let actual = value_text(actual);
                if !check.evaluate(&actual, &expected)? {
                    report.add_attribute(name, device_id, Some(expected), Some(actual));
                }
            }
        }
    }
    Ok(())
}

fn display_query(path: &str) -> &str {
    let path = path.trim();
    let path = path.strip_prefix('$').unwrap_or(path);
    path.trim_start_matches(['.', '/'])
}
