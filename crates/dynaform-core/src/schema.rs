//! Declarative form schema.
//!
//! A [`FormSchema`] is a title, a description, and an ordered list of
//! [`FieldDescriptor`]s. The JSON `type` key of each field selects a
//! [`FieldKind`] variant, and each variant carries only the rules that apply
//! to it, so validation and rendering can match on the kind exhaustively.
//!
//! The serde representation is the wire format served to clients:
//!
//! ```json
//! {
//!   "id": "age",
//!   "type": "number",
//!   "label": "Age",
//!   "required": true,
//!   "validation": { "min": 18, "max": 65 }
//! }
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A complete form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<FieldDescriptor>,
}

/// One input of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Key of this field in a submitted record. Unique within a schema.
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// Field type together with the rule subset that applies to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FieldKind {
    Text {
        #[serde(default, skip_serializing_if = "TextRules::is_empty")]
        validation: TextRules,
    },
    Textarea {
        #[serde(default, skip_serializing_if = "TextRules::is_empty")]
        validation: TextRules,
    },
    Number {
        #[serde(default, skip_serializing_if = "NumberRules::is_empty")]
        validation: NumberRules,
    },
    Select {
        #[serde(default)]
        options: Vec<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        options: Vec<SelectOption>,
        #[serde(default, skip_serializing_if = "SelectionRules::is_empty")]
        validation: SelectionRules,
    },
    Date {
        #[serde(default, skip_serializing_if = "DateRules::is_empty")]
        validation: DateRules,
    },
    Switch,
}

/// A `{value, label}` choice of a select or multi-select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Rules for `text` and `textarea` fields.
///
/// Lengths are counted in UTF-16 code units, the way a browser counts them.
/// `regex` is tested as an unanchored search; anchor the pattern with `^`/`$`
/// to require a whole-value match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

impl TextRules {
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none() && self.max_length.is_none() && self.regex.is_none()
    }
}

/// Inclusive bounds for `number` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl NumberRules {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Selection-count bounds for `multi-select` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_selected: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selected: Option<usize>,
}

impl SelectionRules {
    pub fn is_empty(&self) -> bool {
        self.min_selected.is_none() && self.max_selected.is_none()
    }
}

/// Rules for `date` fields. `min_date` is an ISO date (`YYYY-MM-DD`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
}

impl DateRules {
    pub fn is_empty(&self) -> bool {
        self.min_date.is_none()
    }
}

/// A schema that breaks one of the structural invariants.
///
/// These are configuration mistakes: a server refuses to start with a schema
/// that produces one.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("field #{0} has an empty id")]
    EmptyId(usize),

    #[error("duplicate field id '{0}'")]
    DuplicateId(String),

    #[error("field '{0}' must define at least one option")]
    MissingOptions(String),

    #[error("field '{field}' repeats option value '{value}'")]
    DuplicateOption { field: String, value: String },

    #[error("field '{field}' has contradictory bounds: {detail}")]
    ContradictoryBounds { field: String, detail: String },

    #[error("field '{field}' has an invalid regex: {source}")]
    InvalidRegex {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("field '{field}' has an invalid minDate '{value}'")]
    InvalidMinDate { field: String, value: String },
}

impl FieldKind {
    /// The wire name of this kind (`"multi-select"`, `"switch"`, ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text { .. } => "text",
            FieldKind::Textarea { .. } => "textarea",
            FieldKind::Number { .. } => "number",
            FieldKind::Select { .. } => "select",
            FieldKind::MultiSelect { .. } => "multi-select",
            FieldKind::Date { .. } => "date",
            FieldKind::Switch => "switch",
        }
    }

    /// Options of a select or multi-select field; empty for other kinds.
    pub fn options(&self) -> &[SelectOption] {
        match self {
            FieldKind::Select { options } | FieldKind::MultiSelect { options, .. } => options,
            _ => &[],
        }
    }
}

impl FieldDescriptor {
    /// Whether `value` is one of this field's option values.
    pub fn has_option(&self, value: &str) -> bool {
        self.kind.options().iter().any(|o| o.value == value)
    }
}

impl FormSchema {
    /// Looks up a field by id.
    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Checks the structural invariants of the schema.
    ///
    /// Regex and `minDate` syntax are checked when a
    /// [`Validator`](crate::validate::Validator) is built.
    pub fn check(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for (position, field) in self.fields.iter().enumerate() {
            if field.id.trim().is_empty() {
                return Err(SchemaError::EmptyId(position));
            }
            if !seen.insert(field.id.as_str()) {
                return Err(SchemaError::DuplicateId(field.id.clone()));
            }
            check_kind(field)?;
        }
        Ok(())
    }
}

fn check_kind(field: &FieldDescriptor) -> Result<(), SchemaError> {
    let contradiction = |detail: &str| SchemaError::ContradictoryBounds {
        field: field.id.clone(),
        detail: detail.to_string(),
    };

    match &field.kind {
        FieldKind::Text { validation } | FieldKind::Textarea { validation } => {
            if let (Some(min), Some(max)) = (validation.min_length, validation.max_length) {
                if min > max {
                    return Err(contradiction("minLength > maxLength"));
                }
            }
        }
        FieldKind::Number { validation } => {
            if let (Some(min), Some(max)) = (validation.min, validation.max) {
                if min > max {
                    return Err(contradiction("min > max"));
                }
            }
        }
        FieldKind::Select { options } => check_options(field, options)?,
        FieldKind::MultiSelect {
            options,
            validation,
        } => {
            check_options(field, options)?;
            if let (Some(min), Some(max)) = (validation.min_selected, validation.max_selected) {
                if min > max {
                    return Err(contradiction("minSelected > maxSelected"));
                }
            }
        }
        FieldKind::Date { .. } | FieldKind::Switch => {}
    }
    Ok(())
}

fn check_options(field: &FieldDescriptor, options: &[SelectOption]) -> Result<(), SchemaError> {
    if options.is_empty() {
        return Err(SchemaError::MissingOptions(field.id.clone()));
    }
    let mut values = HashSet::new();
    for option in options {
        if !values.insert(option.value.as_str()) {
            return Err(SchemaError::DuplicateOption {
                field: field.id.clone(),
                value: option.value.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> FormSchema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parses_every_field_kind() {
        let schema = parse(json!({
            "title": "Kinds",
            "description": "",
            "fields": [
                { "id": "a", "type": "text", "label": "A", "validation": { "minLength": 2 } },
                { "id": "b", "type": "textarea", "label": "B" },
                { "id": "c", "type": "number", "label": "C",
                  "validation": { "min": 1, "max": 2.5 } },
                { "id": "d", "type": "select", "label": "D",
                  "options": [{ "value": "x", "label": "X" }] },
                { "id": "e", "type": "multi-select", "label": "E",
                  "options": [{ "value": "x", "label": "X" }],
                  "validation": { "minSelected": 1 } },
                { "id": "f", "type": "date", "label": "F",
                  "validation": { "minDate": "2024-01-01" } },
                { "id": "g", "type": "switch", "label": "G", "required": true }
            ]
        }));

        let names: Vec<&str> = schema.fields.iter().map(|f| f.kind.type_name()).collect();
        assert_eq!(
            names,
            vec![
                "text",
                "textarea",
                "number",
                "select",
                "multi-select",
                "date",
                "switch"
            ]
        );
        assert!(schema.fields[6].required);
        assert!(!schema.fields[0].required);
        assert_eq!(
            schema.fields[2].kind,
            FieldKind::Number {
                validation: NumberRules {
                    min: Some(1.0),
                    max: Some(2.5)
                }
            }
        );
        assert!(schema.check().is_ok());
    }

    #[test]
    fn test_serializes_wire_shape() {
        let field = FieldDescriptor {
            id: "skills".into(),
            label: "Skills".into(),
            placeholder: None,
            required: true,
            kind: FieldKind::MultiSelect {
                options: vec![SelectOption::new("rust", "Rust")],
                validation: SelectionRules {
                    min_selected: Some(1),
                    max_selected: None,
                },
            },
        };
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], "multi-select");
        assert_eq!(value["validation"], json!({ "minSelected": 1 }));
        assert_eq!(value["options"][0]["value"], "rust");
        assert!(value.get("placeholder").is_none());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let schema = parse(json!({
            "title": "t",
            "fields": [
                { "id": "name", "type": "text", "label": "Name" },
                { "id": "name", "type": "textarea", "label": "Name again" }
            ]
        }));
        assert!(matches!(schema.check(), Err(SchemaError::DuplicateId(id)) if id == "name"));
    }

    #[test]
    fn test_rejects_select_without_options() {
        let schema = parse(json!({
            "title": "t",
            "fields": [{ "id": "dept", "type": "select", "label": "Dept" }]
        }));
        assert!(matches!(schema.check(), Err(SchemaError::MissingOptions(_))));
    }

    #[test]
    fn test_rejects_repeated_option_value() {
        let schema = parse(json!({
            "title": "t",
            "fields": [{
                "id": "dept", "type": "select", "label": "Dept",
                "options": [{ "value": "hr", "label": "HR" }, { "value": "hr", "label": "People" }]
            }]
        }));
        assert!(matches!(
            schema.check(),
            Err(SchemaError::DuplicateOption { value, .. }) if value == "hr"
        ));
    }

    #[test]
    fn test_rejects_contradictory_bounds() {
        let schema = parse(json!({
            "title": "t",
            "fields": [{
                "id": "age",
                "type": "number",
                "label": "Age",
                "validation": { "min": 9, "max": 3 }
            }]
        }));
        assert!(matches!(
            schema.check(),
            Err(SchemaError::ContradictoryBounds { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_id() {
        let schema = parse(json!({
            "title": "t",
            "fields": [{ "id": " ", "type": "switch", "label": "S" }]
        }));
        assert!(matches!(schema.check(), Err(SchemaError::EmptyId(0))));
    }

    #[test]
    fn test_unknown_type_fails_to_parse() {
        let result: Result<FormSchema, _> = serde_json::from_value(json!({
            "title": "t",
            "fields": [{ "id": "x", "type": "color", "label": "X" }]
        }));
        assert!(result.is_err());
    }
}
