//! Typed HTTP client for the submission API.
//!
//! Used by the `fill`, `submit`, and `submissions` commands. The base URL
//! includes the `/api` prefix (`client.api_url`).

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{CreatedBody, ErrorBody, ListBody, RecordBody, RejectedBody};
use crate::config::ClientConfig;
use dynaform_core::schema::FormSchema;
use dynaform_core::store::{SortOrder, SubmissionRecord};
use dynaform_core::validate::FieldErrors;

/// Result of posting a submission.
#[derive(Debug)]
pub enum SubmitOutcome {
    Created { id: String, created_at: String },
    /// The server's per-field messages.
    Rejected(FieldErrors),
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn schema(&self) -> Result<FormSchema> {
        let resp = self
            .http
            .get(self.url("/form-schema"))
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.base_url))?;
        expect_json(resp, StatusCode::OK).await
    }

    pub async fn submit(&self, record: &Value) -> Result<SubmitOutcome> {
        let resp = self
            .http
            .post(self.url("/submissions"))
            .json(record)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.base_url))?;

        if resp.status() == StatusCode::BAD_REQUEST {
            let body: Value = resp.json().await?;
            if body.get("errors").is_some() {
                let rejected: RejectedBody = serde_json::from_value(body)?;
                return Ok(SubmitOutcome::Rejected(rejected.errors));
            }
            bail!("Server rejected submission: {}", error_message(&body));
        }

        let created: CreatedBody = expect_json(resp, StatusCode::CREATED).await?;
        Ok(SubmitOutcome::Created {
            id: created.id,
            created_at: created.created_at,
        })
    }

    pub async fn list(&self, page: usize, limit: usize, order: SortOrder) -> Result<ListBody> {
        let resp = self
            .http
            .get(self.url("/submissions"))
            .query(&[
                ("page", page.to_string()),
                ("limit", limit.to_string()),
                ("sortBy", "createdAt".to_string()),
                ("sortOrder", order.to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.base_url))?;
        expect_json(resp, StatusCode::OK).await
    }

    /// `None` when the server answers 404.
    pub async fn get(&self, id: &str) -> Result<Option<SubmissionRecord>> {
        let resp = self
            .http
            .get(self.url(&format!("/submissions/{}", id)))
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.base_url))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: RecordBody = expect_json(resp, StatusCode::OK).await?;
        Ok(Some(body.data))
    }
}

async fn expect_json<T: DeserializeOwned>(
    resp: reqwest::Response,
    expected: StatusCode,
) -> Result<T> {
    let status = resp.status();
    if status != expected {
        let body_text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body_text)
            .map(|b| b.error)
            .unwrap_or(body_text);
        bail!("API error {}: {}", status, message);
    }
    resp.json::<T>()
        .await
        .context("Unexpected response body from API")
}

fn error_message(body: &Value) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string()
}
