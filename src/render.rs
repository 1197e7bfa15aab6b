//! Plain-text rendering of schemas and submissions for the terminal.
//!
//! Every function returns a `String` so commands decide where it goes and
//! tests can assert on it.

use std::fmt::Write;

use serde_json::Value;

use crate::api::ListBody;
use dynaform_core::schema::{FieldDescriptor, FieldKind, FormSchema};
use dynaform_core::store::{SortOrder, SubmissionRecord};
use dynaform_core::validate::FieldErrors;

/// The form as a list of controls, one block per field.
pub fn render_schema(schema: &FormSchema) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", schema.title);
    let _ = writeln!(out, "{}", "=".repeat(schema.title.chars().count()));
    if !schema.description.is_empty() {
        let _ = writeln!(out, "{}", schema.description);
    }

    for field in &schema.fields {
        out.push('\n');
        out.push_str(&render_field(field));
    }
    out
}

/// One control: label line, then hint lines for the kind's rules.
pub fn render_field(field: &FieldDescriptor) -> String {
    let mut out = String::new();
    let marker = if field.required { " *" } else { "" };
    let _ = writeln!(
        out,
        "{}{}  [{}] ({})",
        field.label,
        marker,
        control_name(&field.kind),
        field.id
    );
    if let Some(placeholder) = &field.placeholder {
        let _ = writeln!(out, "    hint: {}", placeholder);
    }
    for line in rule_lines(&field.kind) {
        let _ = writeln!(out, "    {}", line);
    }
    out
}

fn control_name(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Text { .. } => "text input",
        FieldKind::Textarea { .. } => "text area",
        FieldKind::Number { .. } => "number input",
        FieldKind::Select { .. } => "single choice",
        FieldKind::MultiSelect { .. } => "multiple choice",
        FieldKind::Date { .. } => "date (YYYY-MM-DD)",
        FieldKind::Switch => "yes/no",
    }
}

fn rule_lines(kind: &FieldKind) -> Vec<String> {
    let mut lines = Vec::new();
    match kind {
        FieldKind::Text { validation } | FieldKind::Textarea { validation } => {
            match (validation.min_length, validation.max_length) {
                (Some(min), Some(max)) => lines.push(format!("length: {}-{} characters", min, max)),
                (Some(min), None) => lines.push(format!("length: at least {} characters", min)),
                (None, Some(max)) => lines.push(format!("length: at most {} characters", max)),
                (None, None) => {}
            }
            if let Some(regex) = &validation.regex {
                lines.push(format!("format: {}", regex));
            }
        }
        FieldKind::Number { validation } => match (validation.min, validation.max) {
            (Some(min), Some(max)) => lines.push(format!("range: {} to {}", min, max)),
            (Some(min), None) => lines.push(format!("range: at least {}", min)),
            (None, Some(max)) => lines.push(format!("range: at most {}", max)),
            (None, None) => {}
        },
        FieldKind::Select { options } => {
            for option in options {
                lines.push(format!("( ) {} [{}]", option.label, option.value));
            }
        }
        FieldKind::MultiSelect {
            options,
            validation,
        } => {
            for option in options {
                lines.push(format!("[ ] {} [{}]", option.label, option.value));
            }
            match (validation.min_selected, validation.max_selected) {
                (Some(min), Some(max)) => lines.push(format!("choose {} to {}", min, max)),
                (Some(min), None) => lines.push(format!("choose at least {}", min)),
                (None, Some(max)) => lines.push(format!("choose at most {}", max)),
                (None, None) => {}
            }
        }
        FieldKind::Date { validation } => {
            if let Some(min_date) = &validation.min_date {
                lines.push(format!("earliest: {}", min_date));
            }
        }
        FieldKind::Switch => {}
    }
    lines
}

/// A page of submissions as a table, with totals and page position.
pub fn render_submissions(page: &ListBody, order: SortOrder) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Form Submissions");
    let _ = writeln!(out, "Total: {} submissions", page.pagination.total);
    out.push('\n');

    if page.data.is_empty() {
        let _ = writeln!(out, "No submissions yet");
        return out;
    }

    let arrow = match order {
        SortOrder::Asc => "↑",
        SortOrder::Desc => "↓",
    };
    let _ = writeln!(out, "{:<15} Created Date {}", "Submission ID", arrow);
    let _ = writeln!(out, "{}", "-".repeat(40));
    for record in &page.data {
        let _ = writeln!(out, "{:<15} {}", record.id, display_time(record));
    }
    out.push('\n');
    let _ = writeln!(
        out,
        "Page {} of {}",
        page.pagination.page, page.pagination.total_pages
    );
    out
}

/// A single submission.
///
/// With a `schema`, known fields come first in declaration order under their
/// labels; keys the schema does not know follow under their raw names.
pub fn render_record(record: &SubmissionRecord, schema: Option<&FormSchema>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Submission {}", record.id);
    let _ = writeln!(out, "Created: {}", display_time(record));
    out.push('\n');

    match &record.data {
        Value::Object(map) => {
            let mut rows: Vec<(&str, &Value)> = Vec::with_capacity(map.len());
            if let Some(schema) = schema {
                for field in &schema.fields {
                    if let Some(value) = map.get(&field.id) {
                        rows.push((field.label.as_str(), value));
                    }
                }
            }
            for (key, value) in map {
                if schema.and_then(|s| s.field(key)).is_none() {
                    rows.push((key.as_str(), value));
                }
            }
            for (label, value) in rows {
                let _ = writeln!(out, "{}: {}", label, display_value(value));
            }
        }
        other => {
            let _ = writeln!(out, "{}", display_value(other));
        }
    }
    out
}

/// Per-field messages in schema order, one per line.
pub fn render_errors(errors: &FieldErrors) -> String {
    let mut out = String::new();
    for (field, message) in errors.iter() {
        let _ = writeln!(out, "  {}: {}", field, message);
    }
    out
}

fn display_time(record: &SubmissionRecord) -> String {
    record.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
