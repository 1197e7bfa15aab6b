//! Implementations of the client-side CLI commands.
//!
//! Offline commands (`schema`, `validate`, `fill --dry-run`) work from the
//! configured schema; the rest talk to the server through [`ApiClient`].

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::client::{ApiClient, SubmitOutcome};
use crate::config::Config;
use crate::fill::{self, PromptMode};
use crate::forms;
use crate::render;
use dynaform_core::store::SortOrder;
use dynaform_core::validate::Validator;

/// Prints the active schema as controls, or as JSON with `json`.
pub fn run_schema(config: &Config, json: bool) -> Result<()> {
    let schema = forms::active_schema(config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&schema)?);
    } else {
        print!("{}", render::render_schema(&schema));
    }
    Ok(())
}

/// Validates a JSON record file offline. Returns whether it passed.
pub fn run_validate(config: &Config, path: &Path) -> Result<bool> {
    let schema = forms::active_schema(config)?;
    let validator = Validator::new(&schema).context("Invalid form schema")?;
    let record = read_record(path)?;

    let outcome = validator.validate(&record);
    if outcome.valid {
        println!("Valid: {} passes '{}'", path.display(), schema.title);
    } else {
        println!("Invalid: {} field(s) failed", outcome.errors.len());
        print!("{}", render::render_errors(&outcome.errors));
    }
    Ok(outcome.valid)
}

/// Prompts for every field, then submits. With `dry_run` the record is only
/// validated against the local schema and printed.
pub async fn run_fill(config: &Config, dry_run: bool) -> Result<bool> {
    let mode = PromptMode::default_for_tty();

    if dry_run {
        let schema = forms::active_schema(config)?;
        let validator = Validator::new(&schema).context("Invalid form schema")?;
        let record = prompt_record(&schema, &validator, mode)?;
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(true);
    }

    let client = ApiClient::new(&config.client)?;
    let schema = client.schema().await?;
    let validator = Validator::new(&schema).context("Server returned an invalid schema")?;
    let record = prompt_record(&schema, &validator, mode)?;
    report_submission(client.submit(&record).await?)
}

fn prompt_record(
    schema: &dynaform_core::schema::FormSchema,
    validator: &Validator,
    mode: PromptMode,
) -> Result<Value> {
    if mode == PromptMode::Interactive {
        eprint!("{}", render::render_schema(schema));
    }
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut prompts = io::stderr();
    fill::fill_record(schema, validator, mode, &mut input, &mut prompts)
}

/// POSTs a JSON record file. Returns whether the server accepted it.
pub async fn run_submit(config: &Config, path: &Path) -> Result<bool> {
    let record = read_record(path)?;
    let client = ApiClient::new(&config.client)?;
    report_submission(client.submit(&record).await?)
}

fn report_submission(outcome: SubmitOutcome) -> Result<bool> {
    match outcome {
        SubmitOutcome::Created { id, created_at } => {
            println!("Submitted {} at {}", id, created_at);
            Ok(true)
        }
        SubmitOutcome::Rejected(errors) => {
            println!("Rejected: {} field(s) failed", errors.len());
            print!("{}", render::render_errors(&errors));
            Ok(false)
        }
    }
}

pub async fn run_list(
    config: &Config,
    page: usize,
    limit: Option<usize>,
    order: SortOrder,
) -> Result<()> {
    let client = ApiClient::new(&config.client)?;
    let limit = limit.unwrap_or(config.pagination.default_limit);
    let body = client.list(page, limit, order).await?;
    print!("{}", render::render_submissions(&body, order));
    Ok(())
}

/// Prints one submission. Returns `false` when the ID is unknown.
pub async fn run_get(config: &Config, id: &str) -> Result<bool> {
    let client = ApiClient::new(&config.client)?;
    let Some(record) = client.get(id).await? else {
        eprintln!("Submission not found: {}", id);
        return Ok(false);
    };

    // Labels are nicer than field ids but not worth failing over.
    let schema = client.schema().await.ok();
    print!("{}", render::render_record(&record, schema.as_ref()));
    Ok(true)
}

fn read_record(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read record file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Record file is not valid JSON: {}", path.display()))
}
