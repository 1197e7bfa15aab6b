//! Filling a form from the terminal.
//!
//! Each field is asked for in schema order. Answers are converted per field
//! kind by [`parse_answer`]; an empty answer leaves the field out of the
//! record. The record is then validated locally. In interactive mode only
//! the failing fields are asked again until the record passes.

use std::io::{BufRead, Write};

use anyhow::{bail, Result};
use serde_json::{Map, Number, Value};

use crate::render;
use dynaform_core::schema::{FieldDescriptor, FieldKind, FormSchema};
use dynaform_core::validate::Validator;

/// How prompts are shown and failures handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Prompts with hints; failing fields are asked again.
    Interactive,
    /// No prompts; one line per field, single pass.
    Piped,
}

impl PromptMode {
    /// Interactive when stdin is a TTY, otherwise piped.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stdin) {
            PromptMode::Interactive
        } else {
            PromptMode::Piped
        }
    }
}

/// Converts one line of input into the JSON value for `field`.
///
/// Returns `None` for a blank answer. Values that cannot be converted are
/// passed through as strings so validation reports them with the field's
/// own message.
pub fn parse_answer(field: &FieldDescriptor, input: &str) -> Option<Value> {
    let answer = input.trim();
    if answer.is_empty() {
        return None;
    }

    let value = match &field.kind {
        FieldKind::Text { .. } | FieldKind::Textarea { .. } | FieldKind::Date { .. } => {
            Value::String(answer.to_string())
        }
        FieldKind::Number { .. } => parse_number(answer),
        FieldKind::Select { .. } => Value::String(resolve_option(field, answer)),
        FieldKind::MultiSelect { .. } => Value::Array(
            answer
                .split(',')
                .map(str::trim)
                .filter(|choice| !choice.is_empty())
                .map(|choice| Value::String(resolve_option(field, choice)))
                .collect(),
        ),
        FieldKind::Switch => match answer.to_ascii_lowercase().as_str() {
            "y" | "yes" | "true" | "1" => Value::Bool(true),
            "n" | "no" | "false" | "0" => Value::Bool(false),
            _ => Value::String(answer.to_string()),
        },
    };
    Some(value)
}

fn parse_number(answer: &str) -> Value {
    if let Ok(n) = answer.parse::<i64>() {
        return Value::Number(n.into());
    }
    answer
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(answer.to_string()))
}

/// Accepts an option's value, its label (any case), or its 1-based position.
fn resolve_option(field: &FieldDescriptor, choice: &str) -> String {
    let options = field.kind.options();
    if let Some(option) = options.iter().find(|o| o.value == choice) {
        return option.value.clone();
    }
    if let Some(option) = options
        .iter()
        .find(|o| o.label.eq_ignore_ascii_case(choice))
    {
        return option.value.clone();
    }
    if let Ok(index) = choice.parse::<usize>() {
        if let Some(option) = index.checked_sub(1).and_then(|i| options.get(i)) {
            return option.value.clone();
        }
    }
    choice.to_string()
}

/// Asks for every field and returns a record that passes `validator`.
///
/// In [`PromptMode::Piped`] a failing record is an error listing the
/// messages. Running out of input is always an error.
pub fn fill_record<R: BufRead, W: Write>(
    schema: &FormSchema,
    validator: &Validator,
    mode: PromptMode,
    input: &mut R,
    prompts: &mut W,
) -> Result<Value> {
    let mut record = Map::new();
    let mut pending: Vec<&FieldDescriptor> = schema.fields.iter().collect();

    loop {
        for field in &pending {
            if mode == PromptMode::Interactive {
                write!(prompts, "\n{}> ", render::render_field(field))?;
                prompts.flush()?;
            }

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                bail!("Input ended before '{}' was answered", field.id);
            }

            match parse_answer(field, &line) {
                Some(value) => {
                    record.insert(field.id.clone(), value);
                }
                None => {
                    record.remove(&field.id);
                }
            }
        }

        let candidate = Value::Object(record.clone());
        let outcome = validator.validate(&candidate);
        if outcome.valid {
            return Ok(candidate);
        }

        if mode == PromptMode::Piped {
            bail!(
                "Submission is invalid:\n{}",
                render::render_errors(&outcome.errors)
            );
        }

        writeln!(prompts, "\nPlease fix the following:")?;
        write!(prompts, "{}", render::render_errors(&outcome.errors))?;
        pending = schema
            .fields
            .iter()
            .filter(|f| outcome.errors.get(&f.id).is_some())
            .collect();
    }
}
