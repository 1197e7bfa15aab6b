//! Schema-driven validation of submitted records.
//!
//! [`Validator::validate`] walks the schema's fields in declaration order and
//! produces at most one message per field:
//!
//! 1. A required field that is absent, `null`, or `""` fails with
//!    `"<label> is required"`.
//! 2. An optional field holding a falsy value (absent, `null`, `false`, `0`,
//!    `""`) passes without further checks.
//! 3. Otherwise the rules of the field's kind run in a fixed order and the
//!    first failing rule supplies the message.
//!
//! Invalid data never produces an `Err`: everything is reported through
//! [`ValidationOutcome::errors`]. Only an invalid schema (bad regex, bad
//! `minDate`, broken invariants) is an error, raised once by
//! [`Validator::new`].

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::schema::{
    DateRules, FieldDescriptor, FieldKind, FormSchema, NumberRules, SchemaError, SelectionRules,
    TextRules,
};

/// Per-field error messages, kept in schema declaration order.
///
/// Serializes as a JSON object `{ "<field id>": "<message>" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, String)>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field`, replacing an earlier message for it.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.0.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = message,
            None => self.0.push((field, message)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, message) in &self.0 {
            map.serialize_entry(field, message)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldErrors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ErrorsVisitor;

        impl<'de> Visitor<'de> for ErrorsVisitor {
            type Value = FieldErrors;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field ids to messages")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FieldErrors, A::Error> {
                let mut errors = FieldErrors::new();
                while let Some((field, message)) = access.next_entry::<String, String>()? {
                    errors.insert(field, message);
                }
                Ok(errors)
            }
        }

        deserializer.deserialize_map(ErrorsVisitor)
    }
}

/// Result of validating one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    /// `true` iff `errors` is empty.
    pub valid: bool,
    pub errors: FieldErrors,
}

/// A field with its regex and `minDate` prepared.
#[derive(Debug, Clone)]
struct CompiledField {
    descriptor: FieldDescriptor,
    pattern: Option<Regex>,
    min_date: Option<DateTime<Utc>>,
}

/// Validator bound to one schema.
///
/// Building it checks the schema and compiles its rules once; the validator
/// can then be shared and used for every submission.
#[derive(Debug, Clone)]
pub struct Validator {
    fields: Vec<CompiledField>,
}

impl Validator {
    pub fn new(schema: &FormSchema) -> Result<Self, SchemaError> {
        schema.check()?;

        let fields = schema
            .fields
            .iter()
            .map(compile_field)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { fields })
    }

    /// Validates `record` against the schema.
    ///
    /// A record that is not a JSON object is treated as an empty one. Keys
    /// the schema does not know are ignored.
    pub fn validate(&self, record: &Value) -> ValidationOutcome {
        let mut errors = FieldErrors::new();

        for field in &self.fields {
            let value = record.get(&field.descriptor.id);
            if let Some(message) = field.check(value) {
                errors.insert(field.descriptor.id.clone(), message);
            }
        }

        ValidationOutcome {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// One-shot validation: builds a [`Validator`] for `schema` and runs it.
pub fn validate(schema: &FormSchema, record: &Value) -> Result<ValidationOutcome, SchemaError> {
    Ok(Validator::new(schema)?.validate(record))
}

fn compile_field(field: &FieldDescriptor) -> Result<CompiledField, SchemaError> {
    let pattern = match &field.kind {
        FieldKind::Text { validation } | FieldKind::Textarea { validation } => validation
            .regex
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|source| SchemaError::InvalidRegex {
                field: field.id.clone(),
                source,
            })?,
        _ => None,
    };

    let min_date = match &field.kind {
        FieldKind::Date {
            validation: DateRules {
                min_date: Some(raw),
            },
        } => Some(parse_date(raw).ok_or_else(|| SchemaError::InvalidMinDate {
            field: field.id.clone(),
            value: raw.clone(),
        })?),
        _ => None,
    };

    Ok(CompiledField {
        descriptor: field.clone(),
        pattern,
        min_date,
    })
}

impl CompiledField {
    fn check(&self, value: Option<&Value>) -> Option<String> {
        let field = &self.descriptor;
        let label = &field.label;

        if field.required && is_blank(value) {
            return Some(format!("{label} is required"));
        }
        let value = match value {
            Some(v) if !is_falsy(v) => v,
            // A required `false` or `0` still goes through the kind's rules.
            Some(v) if field.required => v,
            _ => return None,
        };

        match &field.kind {
            FieldKind::Text { validation } | FieldKind::Textarea { validation } => {
                self.check_text(validation, value)
            }
            FieldKind::Number { validation } => check_number(label, validation, value),
            FieldKind::Select { options } => {
                if options.is_empty() {
                    return None;
                }
                let known = value.as_str().is_some_and(|v| field.has_option(v));
                (!known).then(|| format!("{label} must be one of the available options"))
            }
            FieldKind::MultiSelect {
                options,
                validation,
            } => check_multi_select(field, !options.is_empty(), validation, value),
            FieldKind::Date { .. } => self.check_date(value),
            FieldKind::Switch => {
                let Some(flag) = value.as_bool() else {
                    return Some(format!("{label} must be true or false"));
                };
                (field.required && !flag).then(|| format!("{label} must be accepted"))
            }
        }
    }

    fn check_text(&self, rules: &TextRules, value: &Value) -> Option<String> {
        let label = &self.descriptor.label;
        let Some(text) = value.as_str() else {
            return Some(format!("{label} must be text"));
        };
        let length = text.encode_utf16().count();

        if let Some(min) = rules.min_length.filter(|&n| n > 0) {
            if length < min {
                return Some(format!("{label} must be at least {min} characters"));
            }
        }
        if let Some(max) = rules.max_length.filter(|&n| n > 0) {
            if length > max {
                return Some(format!("{label} must be at most {max} characters"));
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(text) {
                return Some(format!("{label} format is invalid"));
            }
        }
        None
    }

    fn check_date(&self, value: &Value) -> Option<String> {
        let label = &self.descriptor.label;
        let Some(date) = value.as_str().and_then(parse_date) else {
            return Some(format!("{label} must be a valid date"));
        };

        let floor = self.min_date?;
        if date < floor {
            let raw = match &self.descriptor.kind {
                FieldKind::Date { validation } => validation.min_date.as_deref().unwrap_or(""),
                _ => "",
            };
            return Some(format!("{label} must be on or after {raw}"));
        }
        None
    }
}

fn check_number(label: &str, rules: &NumberRules, value: &Value) -> Option<String> {
    let Some(number) = coerce_number(value) else {
        return Some(format!("{label} must be a valid number"));
    };

    if let Some(min) = rules.min {
        if number < min {
            return Some(format!("{label} must be at least {min}"));
        }
    }
    if let Some(max) = rules.max {
        if number > max {
            return Some(format!("{label} must be at most {max}"));
        }
    }
    None
}

fn check_multi_select(
    field: &FieldDescriptor,
    has_options: bool,
    rules: &SelectionRules,
    value: &Value,
) -> Option<String> {
    let label = &field.label;
    let Some(items) = value.as_array() else {
        return Some(format!("{label} must be an array"));
    };

    if has_options {
        let unknown = items
            .iter()
            .any(|item| !item.as_str().is_some_and(|v| field.has_option(v)));
        if unknown {
            return Some(format!("{label} contains invalid options"));
        }
    }

    if let Some(min) = rules.min_selected.filter(|&n| n > 0) {
        if items.len() < min {
            return Some(format!("{label} must have at least {min} selection(s)"));
        }
    }
    if let Some(max) = rules.max_selected.filter(|&n| n > 0) {
        if items.len() > max {
            return Some(format!("{label} must have at most {max} selection(s)"));
        }
    }
    None
}

/// Absent, `null`, or the empty string.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Blank, `false`, or numeric zero. Arrays and objects are never falsy.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Coerces a submitted value to a finite number.
///
/// Accepts JSON numbers, numeric strings (surrounding whitespace ignored,
/// empty string is zero) and booleans. Strings may be decimal or exponent
/// notation, or unsigned `0x`, `0o` and `0b` integer literals.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                parse_numeric_str(trimmed)
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }?;
    number.is_finite().then_some(number)
}

fn parse_numeric_str(s: &str) -> Option<f64> {
    let radix = match s.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => return s.parse::<f64>().ok(),
    };
    let digits = &s[2..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    u128::from_str_radix(digits, radix).ok().map(|n| n as f64)
}

/// Parses a calendar date or timestamp into a UTC instant.
///
/// Accepts `YYYY-MM-DD` (midnight UTC), RFC 3339 timestamps, and
/// `YYYY-MM-DDTHH:MM[:SS[.fff]]` without offset (taken as UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SelectOption;
    use serde_json::json;

    fn field(id: &str, label: &str, required: bool, kind: FieldKind) -> FieldDescriptor {
        FieldDescriptor {
            id: id.into(),
            label: label.into(),
            placeholder: None,
            required,
            kind,
        }
    }

    fn single(field: FieldDescriptor) -> Validator {
        Validator::new(&FormSchema {
            title: "t".into(),
            description: String::new(),
            fields: vec![field],
        })
        .unwrap()
    }

    fn age_validator(required: bool) -> Validator {
        single(field(
            "age",
            "Age",
            required,
            FieldKind::Number {
                validation: NumberRules {
                    min: Some(18.0),
                    max: Some(65.0),
                },
            },
        ))
    }

    fn skills_validator() -> Validator {
        let options = [
            "javascript",
            "typescript",
            "react",
            "nodejs",
            "python",
            "java",
            "communication",
            "leadership",
        ]
        .iter()
        .map(|v| SelectOption::new(*v, v.to_uppercase()))
        .collect();
        single(field(
            "skills",
            "Skills",
            true,
            FieldKind::MultiSelect {
                options,
                validation: SelectionRules {
                    min_selected: Some(1),
                    max_selected: Some(5),
                },
            },
        ))
    }

    fn error_for(validator: &Validator, record: Value, id: &str) -> Option<String> {
        validator
            .validate(&record)
            .errors
            .get(id)
            .map(str::to_string)
    }

    #[test]
    fn test_required_absent_null_and_empty() {
        let v = single(field(
            "name",
            "Full Name",
            true,
            FieldKind::Text {
                validation: TextRules::default(),
            },
        ));
        for record in [json!({}), json!({ "name": null }), json!({ "name": "" })] {
            let outcome = v.validate(&record);
            assert!(!outcome.valid);
            assert_eq!(outcome.errors.len(), 1);
            assert_eq!(outcome.errors.get("name"), Some("Full Name is required"));
        }
    }

    #[test]
    fn test_optional_fields_skip_rules_when_empty() {
        let v = single(field(
            "bio",
            "Bio",
            false,
            FieldKind::Textarea {
                validation: TextRules {
                    min_length: Some(10),
                    max_length: Some(20),
                    regex: Some("^x+$".into()),
                },
            },
        ));
        assert!(v.validate(&json!({})).valid);
        assert!(v.validate(&json!({ "bio": "" })).valid);
        assert!(v.validate(&json!({ "bio": null })).valid);
        assert_eq!(
            error_for(&v, json!({ "bio": "short" }), "bio").as_deref(),
            Some("Bio must be at least 10 characters")
        );
    }

    #[test]
    fn test_text_rule_order() {
        let v = single(field(
            "code",
            "Code",
            true,
            FieldKind::Text {
                validation: TextRules {
                    min_length: Some(3),
                    max_length: Some(5),
                    regex: Some("^[a-z]+$".into()),
                },
            },
        ));
        assert_eq!(
            error_for(&v, json!({ "code": 42 }), "code").as_deref(),
            Some("Code must be text")
        );
        assert_eq!(
            error_for(&v, json!({ "code": "A1" }), "code").as_deref(),
            Some("Code must be at least 3 characters")
        );
        assert_eq!(
            error_for(&v, json!({ "code": "ABCDEFG" }), "code").as_deref(),
            Some("Code must be at most 5 characters")
        );
        assert_eq!(
            error_for(&v, json!({ "code": "AB12" }), "code").as_deref(),
            Some("Code format is invalid")
        );
        assert_eq!(error_for(&v, json!({ "code": "abcd" }), "code"), None);
    }

    #[test]
    fn test_regex_is_unanchored_search() {
        let v = single(field(
            "tag",
            "Tag",
            true,
            FieldKind::Text {
                validation: TextRules {
                    regex: Some("[0-9]".into()),
                    ..Default::default()
                },
            },
        ));
        assert!(v.validate(&json!({ "tag": "release-2" })).valid);
        assert!(!v.validate(&json!({ "tag": "release" })).valid);
    }

    #[test]
    fn test_email_pattern() {
        let v = single(field(
            "email",
            "Email Address",
            true,
            FieldKind::Text {
                validation: TextRules {
                    regex: Some(r"^[^\s@]+@[^\s@]+\.[^\s@]+$".into()),
                    ..Default::default()
                },
            },
        ));
        assert!(v.validate(&json!({ "email": "ada@example.com" })).valid);
        assert_eq!(
            error_for(&v, json!({ "email": "ada at example" }), "email").as_deref(),
            Some("Email Address format is invalid")
        );
    }

    #[test]
    fn test_length_counts_utf16_units() {
        let v = single(field(
            "name",
            "Name",
            true,
            FieldKind::Text {
                validation: TextRules {
                    max_length: Some(2),
                    ..Default::default()
                },
            },
        ));
        assert!(v.validate(&json!({ "name": "éé" })).valid);
        // One astral code point is two UTF-16 units.
        assert!(v.validate(&json!({ "name": "😀" })).valid);
        assert!(!v.validate(&json!({ "name": "😀a" })).valid);
    }

    #[test]
    fn test_number_bounds_inclusive() {
        let v = age_validator(true);
        assert_eq!(
            error_for(&v, json!({ "age": 17 }), "age").as_deref(),
            Some("Age must be at least 18")
        );
        assert_eq!(error_for(&v, json!({ "age": 18 }), "age"), None);
        assert_eq!(error_for(&v, json!({ "age": 65 }), "age"), None);
        assert_eq!(
            error_for(&v, json!({ "age": 66 }), "age").as_deref(),
            Some("Age must be at most 65")
        );
    }

    #[test]
    fn test_number_coercion() {
        let v = age_validator(true);
        assert_eq!(error_for(&v, json!({ "age": "30" }), "age"), None);
        assert_eq!(error_for(&v, json!({ "age": " 40.5 " }), "age"), None);
        for bad in [
            json!("abc"),
            json!("NaN"),
            json!("inf"),
            json!("0x"),
            json!("-0x1A"),
            json!("0b102"),
            json!([1, 2]),
            json!({}),
        ] {
            assert_eq!(
                error_for(&v, json!({ "age": bad }), "age").as_deref(),
                Some("Age must be a valid number")
            );
        }
    }

    #[test]
    fn test_number_radix_literals() {
        assert_eq!(coerce_number(&json!("0x1A")), Some(26.0));
        assert_eq!(coerce_number(&json!(" 0X1f ")), Some(31.0));
        assert_eq!(coerce_number(&json!("0b11")), Some(3.0));
        assert_eq!(coerce_number(&json!("0o17")), Some(15.0));
        assert_eq!(coerce_number(&json!("0x+1")), None);
        assert_eq!(coerce_number(&json!("1e2")), Some(100.0));

        let v = age_validator(true);
        assert_eq!(error_for(&v, json!({ "age": "0x1E" }), "age"), None);
        assert_eq!(
            error_for(&v, json!({ "age": "0b1" }), "age").as_deref(),
            Some("Age must be at least 18")
        );
    }

    #[test]
    fn test_required_zero_runs_rules() {
        let v = age_validator(true);
        assert_eq!(
            error_for(&v, json!({ "age": 0 }), "age").as_deref(),
            Some("Age must be at least 18")
        );
        // Optional zero is falsy and short-circuits.
        assert!(age_validator(false).validate(&json!({ "age": 0 })).valid);
    }

    #[test]
    fn test_select_membership() {
        let v = single(field(
            "dept",
            "Department",
            true,
            FieldKind::Select {
                options: vec![
                    SelectOption::new("hr", "HR"),
                    SelectOption::new("sales", "Sales"),
                ],
            },
        ));
        assert!(v.validate(&json!({ "dept": "hr" })).valid);
        assert_eq!(
            error_for(&v, json!({ "dept": "legal" }), "dept").as_deref(),
            Some("Department must be one of the available options")
        );
        assert_eq!(
            error_for(&v, json!({ "dept": 7 }), "dept").as_deref(),
            Some("Department must be one of the available options")
        );
    }

    #[test]
    fn test_multi_select_counts_and_membership() {
        let v = skills_validator();
        assert_eq!(
            error_for(&v, json!({ "skills": [] }), "skills").as_deref(),
            Some("Skills must have at least 1 selection(s)")
        );
        assert_eq!(
            error_for(
                &v,
                json!({
                    "skills": ["javascript", "typescript", "react", "nodejs", "python", "java"]
                }),
                "skills"
            )
            .as_deref(),
            Some("Skills must have at most 5 selection(s)")
        );
        assert_eq!(
            error_for(&v, json!({ "skills": ["react", "cobol"] }), "skills").as_deref(),
            Some("Skills contains invalid options")
        );
        assert_eq!(
            error_for(&v, json!({ "skills": "react" }), "skills").as_deref(),
            Some("Skills must be an array")
        );
        assert_eq!(
            error_for(&v, json!({ "skills": ["react", "java"] }), "skills"),
            None
        );
    }

    #[test]
    fn test_invalid_option_wins_over_count() {
        let v = skills_validator();
        let all = json!({ "skills": [
            "javascript", "typescript", "react", "nodejs", "python", "java", "communication", "rust"
        ] });
        assert_eq!(
            error_for(&v, all, "skills").as_deref(),
            Some("Skills contains invalid options")
        );
    }

    #[test]
    fn test_date_parsing_and_floor() {
        let v = single(field(
            "start",
            "Start Date",
            true,
            FieldKind::Date {
                validation: DateRules {
                    min_date: Some("2030-06-01".into()),
                },
            },
        ));
        assert!(v.validate(&json!({ "start": "2030-06-01" })).valid);
        let with_time = json!({ "start": "2030-06-02T08:00:00Z" });
        assert!(v.validate(&with_time).valid);
        assert_eq!(
            error_for(&v, json!({ "start": "2030-05-31" }), "start").as_deref(),
            Some("Start Date must be on or after 2030-06-01")
        );
        for bad in [json!("2030-02-30"), json!("tomorrow"), json!(20300601)] {
            assert_eq!(
                error_for(&v, json!({ "start": bad }), "start").as_deref(),
                Some("Start Date must be a valid date")
            );
        }
    }

    #[test]
    fn test_switch_semantics() {
        let required = single(field("terms", "Terms", true, FieldKind::Switch));
        assert!(required.validate(&json!({ "terms": true })).valid);
        assert_eq!(
            error_for(&required, json!({ "terms": false }), "terms").as_deref(),
            Some("Terms must be accepted")
        );
        assert_eq!(
            error_for(&required, json!({ "terms": "yes" }), "terms").as_deref(),
            Some("Terms must be true or false")
        );

        let optional = single(field("news", "Newsletter", false, FieldKind::Switch));
        assert!(optional.validate(&json!({ "news": false })).valid);
        assert!(optional.validate(&json!({})).valid);
        assert_eq!(
            error_for(&optional, json!({ "news": "on" }), "news").as_deref(),
            Some("Newsletter must be true or false")
        );
    }

    #[test]
    fn test_non_object_record_treated_as_empty() {
        let v = age_validator(true);
        for record in [json!([1, 2, 3]), json!("age"), json!(null)] {
            let outcome = v.validate(&record);
            assert_eq!(outcome.errors.get("age"), Some("Age is required"));
        }
    }

    #[test]
    fn test_errors_follow_declaration_order() {
        let schema = FormSchema {
            title: "t".into(),
            description: String::new(),
            fields: vec![
                field("zeta", "Zeta", true, FieldKind::Switch),
                field("alpha", "Alpha", true, FieldKind::Switch),
            ],
        };
        let outcome = validate(&schema, &json!({})).unwrap();
        let ids: Vec<&str> = outcome.errors.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
        let body = serde_json::to_string(&outcome.errors).unwrap();
        assert!(body.find("zeta").unwrap() < body.find("alpha").unwrap());
    }

    #[test]
    fn test_invalid_regex_rejected_at_build() {
        let schema = FormSchema {
            title: "t".into(),
            description: String::new(),
            fields: vec![field(
                "x",
                "X",
                false,
                FieldKind::Text {
                    validation: TextRules {
                        regex: Some("(unclosed".into()),
                        ..Default::default()
                    },
                },
            )],
        };
        assert!(matches!(
            Validator::new(&schema),
            Err(SchemaError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_invalid_min_date_rejected_at_build() {
        let schema = FormSchema {
            title: "t".into(),
            description: String::new(),
            fields: vec![field(
                "d",
                "D",
                false,
                FieldKind::Date {
                    validation: DateRules {
                        min_date: Some("next week".into()),
                    },
                },
            )],
        };
        assert!(matches!(
            Validator::new(&schema),
            Err(SchemaError::InvalidMinDate { .. })
        ));
    }

    #[test]
    fn test_field_errors_roundtrip_keeps_order() {
        let mut errors = FieldErrors::new();
        errors.insert("b", "B is required");
        errors.insert("a", "A is required");
        errors.insert("b", "B must be text");
        let parsed: FieldErrors =
            serde_json::from_str(&serde_json::to_string(&errors).unwrap()).unwrap();
        assert_eq!(parsed, errors);
        assert_eq!(parsed.get("b"), Some("B must be text"));
    }
}
