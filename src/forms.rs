//! Form catalogue: the built-in onboarding form and schema files.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use std::path::Path;

use crate::config::Config;
use dynaform_core::schema::{
    DateRules, FieldDescriptor, FieldKind, FormSchema, NumberRules, SelectOption, SelectionRules,
    TextRules,
};

/// Pattern of the built-in email field. Anchored, since text regexes are
/// tested as a search.
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// The "Employee Onboarding" form. The start date may not precede `today`.
pub fn employee_onboarding(today: NaiveDate) -> FormSchema {
    FormSchema {
        title: "Employee Onboarding".to_string(),
        description: "Please fill out this form to complete your onboarding process".to_string(),
        fields: vec![
            field(
                "fullName",
                "Full Name",
                Some("Enter your full name"),
                true,
                FieldKind::Text {
                    validation: TextRules {
                        min_length: Some(2),
                        max_length: Some(100),
                        regex: None,
                    },
                },
            ),
            field(
                "email",
                "Email Address",
                Some("your.email@company.com"),
                true,
                FieldKind::Text {
                    validation: TextRules {
                        regex: Some(EMAIL_PATTERN.to_string()),
                        ..Default::default()
                    },
                },
            ),
            field(
                "age",
                "Age",
                Some("Enter your age"),
                true,
                FieldKind::Number {
                    validation: NumberRules {
                        min: Some(18.0),
                        max: Some(65.0),
                    },
                },
            ),
            field(
                "department",
                "Department",
                Some("Select your department"),
                true,
                FieldKind::Select {
                    options: options(&[
                        ("engineering", "Engineering"),
                        ("marketing", "Marketing"),
                        ("sales", "Sales"),
                        ("hr", "Human Resources"),
                        ("finance", "Finance"),
                    ]),
                },
            ),
            field(
                "skills",
                "Skills",
                Some("Select your skills"),
                true,
                FieldKind::MultiSelect {
                    options: options(&[
                        ("javascript", "JavaScript"),
                        ("typescript", "TypeScript"),
                        ("react", "React"),
                        ("nodejs", "Node.js"),
                        ("python", "Python"),
                        ("java", "Java"),
                        ("communication", "Communication"),
                        ("leadership", "Leadership"),
                    ]),
                    validation: SelectionRules {
                        min_selected: Some(1),
                        max_selected: Some(5),
                    },
                },
            ),
            field(
                "startDate",
                "Start Date",
                None,
                true,
                FieldKind::Date {
                    validation: DateRules {
                        min_date: Some(today.format("%Y-%m-%d").to_string()),
                    },
                },
            ),
            field(
                "bio",
                "Brief Bio",
                Some("Tell us about yourself"),
                false,
                FieldKind::Textarea {
                    validation: TextRules {
                        max_length: Some(500),
                        ..Default::default()
                    },
                },
            ),
            field(
                "termsAccepted",
                "I accept the terms and conditions",
                None,
                true,
                FieldKind::Switch,
            ),
        ],
    }
}

fn field(
    id: &str,
    label: &str,
    placeholder: Option<&str>,
    required: bool,
    kind: FieldKind,
) -> FieldDescriptor {
    FieldDescriptor {
        id: id.to_string(),
        label: label.to_string(),
        placeholder: placeholder.map(str::to_string),
        required,
        kind,
    }
}

fn options(pairs: &[(&str, &str)]) -> Vec<SelectOption> {
    pairs
        .iter()
        .map(|(value, label)| SelectOption::new(*value, *label))
        .collect()
}

/// Reads a JSON schema file and checks its invariants.
pub fn load_schema_file(path: &Path) -> Result<FormSchema> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
    let schema: FormSchema = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse schema file: {}", path.display()))?;
    schema
        .check()
        .with_context(|| format!("Invalid schema in {}", path.display()))?;
    Ok(schema)
}

/// The schema this process serves: `form.schema_path` if configured,
/// otherwise the onboarding form dated today (UTC).
pub fn active_schema(config: &Config) -> Result<FormSchema> {
    match &config.form.schema_path {
        Some(path) => load_schema_file(path),
        None => Ok(employee_onboarding(Utc::now().date_naive())),
    }
}
