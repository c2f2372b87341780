//! Intended vs. actual configuration tree diff
//!
//! [`ConfigComparator`] walks the intended tree and records every place the
//! actual tree differs:
//!
//! - leaves with a different value or type become misaligned attributes
//! - intended subtrees absent on the device become missing objects
//! - device subtrees the intent does not mention become undesired objects,
//!   unless the edit is a `merge` or the path is listed in `ignoreChildren`
//!
//! Arrays of objects are YANG lists. Both sides are grouped on the list's
//! key leaves and compared entry by entry, so reordering never produces a
//! finding.

use serde_json::{Map, Value};

use intent_model::{AuditReport, PatchOperation};

use crate::equivalence::{
    ValueKind, coerce, is_container, is_empty_container, scalars_equal, value_text,
};
use crate::keys::ListKeyResolver;
use crate::path::{encode_key, has_segment_prefix, join_path, list_path, strip_selectors};

/// Maximum recursion depth before subtrees are compared as whole values
const MAX_COMPARE_DEPTH: usize = 128;

/// Where a comparison happens and which rules apply
#[derive(Debug, Clone, Copy)]
pub struct CompareScope<'a> {
    /// Device the actual tree was read from
    pub device_id: &'a str,
    /// Device path of the compared object
    pub base_path: &'a str,
    /// Edit operation the intended tree is pushed with
    pub operation: PatchOperation,
    /// Relative paths whose extra actual content is pre-approved
    pub ignore_children: &'a [String],
}

impl<'a> CompareScope<'a> {
    /// Scope for a `replace` comparison with no exclusions
    pub fn new(device_id: &'a str, base_path: &'a str) -> Self {
        Self {
            device_id,
            base_path,
            operation: PatchOperation::Replace,
            ignore_children: &[],
        }
    }

    /// Use a different edit operation
    pub fn with_operation(mut self, operation: PatchOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Exclude relative paths from the undesired check
    pub fn with_ignore_children(mut self, ignore_children: &'a [String]) -> Self {
        self.ignore_children = ignore_children;
        self
    }

    fn asserts_absence(&self) -> bool {
        self.operation != PatchOperation::Merge
    }

    fn is_ignored(&self, relative: &str) -> bool {
        let stripped = strip_selectors(relative);
        self.ignore_children.iter().any(|prefix| {
            has_segment_prefix(relative, prefix) || has_segment_prefix(&stripped, prefix)
        })
    }

    fn finding_path(&self, relative: &str) -> String {
        match relative.strip_prefix('=') {
            Some(selector) => format!("{}={selector}", self.base_path.trim_end_matches('/')),
            None => join_path(self.base_path, relative),
        }
    }
}

/// Recursive configuration tree comparator
#[derive(Debug, Clone)]
pub struct ConfigComparator {
    keys: ListKeyResolver,
}

impl ConfigComparator {
    /// Create a comparator resolving list keys through `keys`
    pub fn new(keys: ListKeyResolver) -> Self {
        Self { keys }
    }

    /// Compare `intended` against `actual`, appending findings to `report`
    pub fn compare(
        &self,
        scope: &CompareScope<'_>,
        actual: &Value,
        intended: &Value,
        report: &mut AuditReport,
    ) {
        match (intended, actual) {
            (Value::Object(intended), Value::Object(actual)) => {
                self.compare_maps(scope, actual, intended, report, "", 0)
            }
            _ => self.compare_present(scope, "", actual, intended, report, 0),
        }
    }

    /// Compare two RESTCONF documents read for the object at the scope's path
    ///
    /// Both documents are unwrapped the same way. When either side carries
    /// a list envelope holding anything but a single entry, the envelopes
    /// are compared as the list the object belongs to, so extra device
    /// entries become undesired instances instead of a shape mismatch.
    pub fn compare_document(
        &self,
        scope: &CompareScope<'_>,
        actual: &Value,
        intended: &Value,
        report: &mut AuditReport,
    ) {
        if let (Some((name, Value::Array(intended_items))), Some((actual_name, Value::Array(actual_items)))) =
            (envelope(intended), envelope(actual))
            && name == actual_name
            && (intended_items.len() != 1 || actual_items.len() != 1)
            && (is_list(intended_items) || is_list(actual_items))
        {
            let list_scope = CompareScope {
                base_path: list_path(scope.base_path),
                ..*scope
            };
            self.compare_list(&list_scope, "", actual_items, intended_items, report, 0);
            return;
        }
        self.compare(scope, &unwrap_container(actual), &unwrap_container(intended), report);
    }

    fn compare_maps(
        &self,
        scope: &CompareScope<'_>,
        actual: &Map<String, Value>,
        intended: &Map<String, Value>,
        report: &mut AuditReport,
        relative: &str,
        depth: usize,
    ) {
        for (key, intended_value) in intended {
            let child = format!("{relative}{key}");
            match actual.get(key) {
                Some(actual_value) => {
                    self.compare_present(scope, &child, actual_value, intended_value, report, depth)
                }
                None => report_missing(scope, &child, intended_value, report),
            }
        }

        if !scope.asserts_absence() {
            return;
        }

        for (key, actual_value) in actual {
            if intended.contains_key(key) {
                continue;
            }
            let child = format!("{relative}{key}");
            if scope.is_ignored(&child) {
                tracing::debug!(device = %scope.device_id, path = %child, "Skipping pre-approved subtree");
                continue;
            }
            report_undesired(scope, &child, actual_value, report);
        }
    }

    fn compare_present(
        &self,
        scope: &CompareScope<'_>,
        relative: &str,
        actual: &Value,
        intended: &Value,
        report: &mut AuditReport,
        depth: usize,
    ) {
        let (intended, actual) = coerce(intended, actual);
        let (intended_kind, actual_kind) = (ValueKind::of(&intended), ValueKind::of(&actual));
        if intended_kind != actual_kind {
            report.add_attribute(
                scope.finding_path(relative),
                scope.device_id,
                Some(format!("type {intended_kind}")),
                Some(format!("type {actual_kind}")),
            );
            return;
        }

        if depth > MAX_COMPARE_DEPTH {
            if intended != actual {
                report.add_attribute(
                    scope.finding_path(relative),
                    scope.device_id,
                    Some(value_text(&intended)),
                    Some(value_text(&actual)),
                );
            }
            return;
        }

        match (&*intended, &*actual) {
            (Value::Object(intended), Value::Object(actual)) => {
                let nested = nested_relative(relative);
                self.compare_maps(scope, actual, intended, report, &nested, depth + 1);
            }
            (Value::Array(intended_items), Value::Array(actual_items)) => {
                if is_list(intended_items) || is_list(actual_items) {
                    self.compare_list(scope, relative, actual_items, intended_items, report, depth);
                } else if intended_items != actual_items {
                    report.add_attribute(
                        scope.finding_path(relative),
                        scope.device_id,
                        Some(value_text(&intended)),
                        Some(value_text(&actual)),
                    );
                }
            }
            (intended_scalar, actual_scalar) => {
                if !scalars_equal(intended_scalar, actual_scalar) {
                    report.add_attribute(
                        scope.finding_path(relative),
                        scope.device_id,
                        Some(value_text(intended_scalar)),
                        Some(value_text(actual_scalar)),
                    );
                }
            }
        }
    }

    fn compare_list(
        &self,
        scope: &CompareScope<'_>,
        relative: &str,
        actual: &[Value],
        intended: &[Value],
        report: &mut AuditReport,
        depth: usize,
    ) {
        let path = scope.finding_path(relative);
        let keys = self.keys.keys_of(scope.device_id, &path);
        if keys.is_empty() {
            compare_whole_list(scope, path, actual, intended, report);
            return;
        }

        match (group_by_keys(actual, &keys), group_by_keys(intended, &keys)) {
            (Some(actual), Some(intended)) => {
                let nested = format!("{relative}=");
                self.compare_maps(scope, &actual, &intended, report, &nested, depth + 1);
            }
            _ => {
                tracing::warn!(
                    device = %scope.device_id,
                    path = %path,
                    keys = ?keys,
                    "List entries lack a key leaf or repeat a key, comparing whole list"
                );
                compare_whole_list(scope, path, actual, intended, report);
            }
        }
    }
}

/// Inner value of a RESTCONF container document
///
/// Reads return `{"module:container": value}` where list entries arrive as
/// a single-element array. A lone top-level key holding an object or array
/// is unwrapped, taking the first array element. Anything else is returned
/// as is.
pub fn unwrap_container(document: &Value) -> Value {
    match envelope(document).map(|(_, inner)| inner) {
        Some(Value::Object(inner)) => Value::Object(inner.clone()),
        Some(Value::Array(items)) => match items.as_slice() {
            [Value::Object(inner)] => Value::Object(inner.clone()),
            _ => document.clone(),
        },
        _ => document.clone(),
    }
}

/// The single top-level member of a document
fn envelope(document: &Value) -> Option<(&String, &Value)> {
    match document {
        Value::Object(map) if map.len() == 1 => map.iter().next(),
        _ => None,
    }
}

fn nested_relative(relative: &str) -> String {
    if relative.is_empty() {
        String::new()
    } else {
        format!("{relative}/")
    }
}

fn is_list(items: &[Value]) -> bool {
    items.iter().any(Value::is_object)
}

/// Entries keyed by their encoded selector
///
/// `None` when an entry lacks a key leaf or two entries share a selector,
/// since grouping would then drop entries from the diff.
fn group_by_keys(items: &[Value], keys: &[String]) -> Option<Map<String, Value>> {
    let mut grouped = Map::new();
    for item in items {
        let selector = keys
            .iter()
            .map(|k| item.get(k).map(|v| encode_key(&value_text(v))))
            .collect::<Option<Vec<_>>>()?
            .join(",");
        if grouped.insert(selector, item.clone()).is_some() {
            return None;
        }
    }
    Some(grouped)
}

fn compare_whole_list(
    scope: &CompareScope<'_>,
    path: String,
    actual: &[Value],
    intended: &[Value],
    report: &mut AuditReport,
) {
    if intended != actual {
        report.add_attribute(
            path,
            scope.device_id,
            Some(Value::from(intended.to_vec()).to_string()),
            Some(Value::from(actual.to_vec()).to_string()),
        );
    }
}

fn report_missing(scope: &CompareScope<'_>, relative: &str, intended: &Value, report: &mut AuditReport) {
    let path = scope.finding_path(relative);
    if is_container(intended) && !is_empty_container(intended) {
        report.add_missing_object(path, scope.device_id);
    } else {
        report.add_attribute(path, scope.device_id, Some(value_text(intended)), None);
    }
}

fn report_undesired(scope: &CompareScope<'_>, relative: &str, actual: &Value, report: &mut AuditReport) {
    let path = scope.finding_path(relative);
    if is_container(actual) && !is_empty_container(actual) {
        report.add_undesired_object(path, scope.device_id);
    } else {
        report.add_attribute(path, scope.device_id, None, Some(value_text(actual)));
    }
}
