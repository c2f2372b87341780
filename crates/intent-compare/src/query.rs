//! Path queries into state documents
//!
//! Health assertions and indicators select a single value out of a device
//! state subtree. The query language is deliberately small:
//!
//! ```text
//! $.ethernet.oper-state          object members, `.` or `/` separated
//! $['oper-state']                quoted member names
//! $.queue[0]                     array index
//! $.sap[sap-id='1/1/1:10'].state list entry selected by a leaf value
//! ```
//!
//! A member step applied to an array searches its entries in order, so the
//! single-element arrays RESTCONF uses for list entries need no index.

use serde_json::Value;

use crate::equivalence::value_text;
use crate::{Error, Result};

/// One step of a parsed query
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Member(String),
    Index(usize),
    Select { field: String, value: String },
}

/// A parsed path query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    steps: Vec<Step>,
}

impl Query {
    /// Parse a query
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |message: &str| Error::InvalidQuery {
            query: text.to_string(),
            message: message.to_string(),
        };

        let mut steps = Vec::new();
        let body = text.trim();
        let body = body.strip_prefix('$').unwrap_or(body);
        let mut chars = body.char_indices().peekable();

        while let Some(&(start, c)) = chars.peek() {
            match c {
                '.' | '/' => {
                    chars.next();
                }
                '[' => {
                    chars.next();
                    let mut quote: Option<char> = None;
                    let mut inner = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        match (quote, c) {
                            (None, ']') => {
                                closed = true;
                                break;
                            }
                            (None, '\'' | '"') => {
                                quote = Some(c);
                                inner.push(c);
                            }
                            (Some(q), c) if c == q => {
                                quote = None;
                                inner.push(c);
                            }
                            _ => inner.push(c),
                        }
                    }
                    if !closed {
                        return Err(invalid("unterminated '['"));
                    }
                    steps.push(parse_bracket(inner.trim()).ok_or_else(|| invalid("bad bracket step"))?);
                }
                ']' => return Err(invalid("unexpected ']'")),
                _ => {
                    let mut end = body.len();
                    while let Some(&(i, c)) = chars.peek() {
                        if matches!(c, '.' | '/' | '[' | ']') {
                            end = i;
                            break;
                        }
                        chars.next();
                    }
                    steps.push(Step::Member(body[start..end].to_string()));
                }
            }
        }

        Ok(Self { steps })
    }

    /// First value the query selects, if any
    pub fn select<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        select_steps(root, &self.steps)
    }
}

/// Parse `text` and select from `root`
pub fn query<'a>(root: &'a Value, text: &str) -> Result<Option<&'a Value>> {
    Ok(Query::parse(text)?.select(root))
}

fn parse_bracket(inner: &str) -> Option<Step> {
    if let Some(name) = unquote(inner) {
        return Some(Step::Member(name.to_string()));
    }
    if !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit()) {
        return inner.parse().ok().map(Step::Index);
    }
    let (field, value) = inner.split_once('=')?;
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = unquote(value).unwrap_or(value);
    Some(Step::Select {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn unquote(text: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|q| {
        text.strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
            .filter(|inner| !inner.contains(q))
    })
}

fn select_steps<'a>(value: &'a Value, steps: &[Step]) -> Option<&'a Value> {
    let Some((step, rest)) = steps.split_first() else {
        return Some(value);
    };

    match (step, value) {
        (Step::Member(name), Value::Object(map)) => select_steps(map.get(name)?, rest),
        (Step::Member(_), Value::Array(items)) => {
            items.iter().find_map(|item| select_steps(item, steps))
        }
        (Step::Index(i), Value::Array(items)) => select_steps(items.get(*i)?, rest),
        (Step::Select { field, value: wanted }, Value::Array(items)) => items
            .iter()
            .filter(|item| entry_matches(item, field, wanted))
            .find_map(|item| select_steps(item, rest)),
        (Step::Select { field, value: wanted }, item @ Value::Object(_)) => {
            if entry_matches(item, field, wanted) {
                select_steps(item, rest)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn entry_matches(item: &Value, field: &str, wanted: &str) -> bool {
    item.get(field).is_some_and(|v| value_text(v) == wanted)
}
