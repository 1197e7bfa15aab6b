//! HTTP server for form schemas and submissions.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/form-schema` | The active form schema |
//! | `POST` | `/api/submissions` | Validate and store a submission |
//! | `GET`  | `/api/submissions` | Paginated listing (`page`, `limit`, `sortBy`, `sortOrder`) |
//! | `GET`  | `/api/submissions/{id}` | One submission |
//! | `GET`  | `/health` | Liveness probe |
//!
//! # Error Contract
//!
//! Validation failures are `400` with per-field messages:
//!
//! ```json
//! { "success": false, "errors": { "age": "Age must be at least 18" } }
//! ```
//!
//! Every other failure carries a single message:
//!
//! ```json
//! { "success": false, "error": "Submission not found" }
//! ```
//!
//! Bad query parameters are `400`, unknown submissions and routes are `404`,
//! and anything unexpected (malformed JSON, store failure, handler panic) is
//! `500` with `"Internal server error"`; the detail only goes to the log.
//!
//! # CORS
//!
//! With `cors.permissive = true` any origin is mirrored back; otherwise only
//! `cors.allowed_origins` are accepted. Credentials are allowed either way.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{
    CreatedBody, ErrorBody, HealthBody, ListBody, PaginationInfo, RecordBody, RejectedBody,
};
use crate::config::{Config, CorsConfig, PaginationConfig};
use crate::forms;
use dynaform_core::schema::FormSchema;
use dynaform_core::store::memory::InMemoryStore;
use dynaform_core::store::{timestamp, ListQuery, SortField, SortOrder, SubmissionStore};
use dynaform_core::validate::Validator;

pub const INVALID_SORT_BY: &str = "Invalid sortBy parameter. Only \"createdAt\" is supported.";
pub const INVALID_SORT_ORDER: &str = "Invalid sortOrder parameter. Must be \"asc\" or \"desc\".";

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    schema: Arc<FormSchema>,
    validator: Arc<Validator>,
    store: Arc<dyn SubmissionStore>,
    pagination: PaginationConfig,
    environment: Arc<str>,
}

impl AppState {
    /// Builds the state, compiling the schema's rules.
    pub fn new(
        config: &Config,
        schema: FormSchema,
        store: Arc<dyn SubmissionStore>,
    ) -> anyhow::Result<Self> {
        let validator = Validator::new(&schema).context("Invalid form schema")?;
        Ok(Self {
            schema: Arc::new(schema),
            validator: Arc::new(validator),
            store,
            pagination: config.pagination.clone(),
            environment: Arc::from(config.server.environment.as_str()),
        })
    }
}

/// Starts the server with the configured schema and a fresh in-memory store.
///
/// Runs until the process is terminated; returns an error if the schema is
/// invalid or binding fails.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let schema = forms::active_schema(config)?;
    run_server_with_store(config, schema, Arc::new(InMemoryStore::new())).await
}

/// Starts the server over an explicit schema and store.
pub async fn run_server_with_store(
    config: &Config,
    schema: FormSchema,
    store: Arc<dyn SubmissionStore>,
) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    let title = schema.title.clone();
    let state = AppState::new(config, schema, store)?;
    let app = router(state, &config.cors);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        addr = %addr,
        environment = %config.server.environment,
        form = %title,
        "server listening"
    );
    tracing::info!("health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Assembles the routes, CORS, tracing, and panic handling.
pub fn router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route(
            "/api/form-schema",
            get(handle_get_schema).fallback(handle_not_found),
        )
        .route(
            "/api/submissions",
            get(handle_list_submissions)
                .post(handle_create_submission)
                .fallback(handle_not_found),
        )
        .route(
            "/api/submissions/{id}",
            get(handle_get_submission).fallback(handle_not_found),
        )
        .route("/health", get(handle_health).fallback(handle_not_found))
        .fallback(handle_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.permissive {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

// ============ Error response ============

/// Internal error type that converts into an Axum HTTP response.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

/// Constructs a 404 Not Found error.
fn not_found(message: impl Into<String>) -> ApiError {
    ApiError {
        status: StatusCode::NOT_FOUND,
        message: message.into(),
    }
}

/// Logs `detail` and constructs an opaque 500 error.
fn internal(detail: impl fmt::Display) -> ApiError {
    tracing::error!(error = %detail, "request failed");
    ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Internal server error".to_string(),
    }
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    internal(format!("panic: {}", detail)).into_response()
}

async fn handle_not_found() -> ApiError {
    not_found("Route not found")
}

// ============ GET /health ============

/// Always 200 while the process serves requests. The submission count is
/// left out if the store cannot report it.
async fn handle_health(State(state): State<AppState>) -> Json<HealthBody> {
    let submissions = match state.store.count().await {
        Ok(n) => Some(n),
        Err(err) => {
            tracing::warn!(error = %err, "health check could not count submissions");
            None
        }
    };
    tracing::debug!(submissions = ?submissions, "health check");

    Json(HealthBody {
        status: "ok".to_string(),
        timestamp: timestamp::format(&Utc::now()),
        environment: state.environment.to_string(),
        submissions,
    })
}

// ============ GET /api/form-schema ============

async fn handle_get_schema(State(state): State<AppState>) -> Json<FormSchema> {
    Json(state.schema.as_ref().clone())
}

// ============ POST /api/submissions ============

/// Validates the body against the schema and stores it when valid.
///
/// A request without a JSON content type is validated as an empty record.
async fn handle_create_submission(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let record = match payload {
        Ok(Json(record)) => record,
        Err(JsonRejection::MissingJsonContentType(_)) => Value::Object(Default::default()),
        Err(rejection) => return Err(internal(rejection.body_text())),
    };

    let outcome = state.validator.validate(&record);
    if !outcome.valid {
        tracing::info!(fields = outcome.errors.len(), "submission rejected");
        let body = RejectedBody {
            success: false,
            errors: outcome.errors,
        };
        return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
    }

    let stored = state.store.add(record).await.map_err(internal)?;
    tracing::info!(id = %stored.id, "submission stored");

    let body = CreatedBody {
        success: true,
        id: stored.id,
        created_at: timestamp::format(&stored.created_at),
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

// ============ GET /api/submissions ============

async fn handle_list_submissions(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListBody>, ApiError> {
    let query = parse_list_query(&params, &state.pagination)?;
    let page = state.store.list(&query).await.map_err(internal)?;

    Ok(Json(ListBody {
        success: true,
        data: page.items,
        pagination: PaginationInfo {
            page: page.page,
            limit: query.limit,
            total: page.total,
            total_pages: page.total_pages,
        },
    }))
}

/// Reads listing parameters the lenient way browsers send them.
///
/// `page` and `limit` take the leading integer of the value; a missing,
/// unparseable, or zero value falls back to the default. `page` is floored at
/// 1 and `limit` clamped to `[1, max_limit]`. Empty `sortBy`/`sortOrder`
/// mean `createdAt`/`desc`; any other unknown value is rejected.
fn parse_list_query(
    params: &HashMap<String, String>,
    pagination: &PaginationConfig,
) -> Result<ListQuery, ApiError> {
    let int_param = |name: &str| {
        params
            .get(name)
            .and_then(|raw| leading_int(raw))
            .filter(|&n| n != 0)
    };

    let page = int_param("page").unwrap_or(1).max(1);
    let limit = int_param("limit")
        .unwrap_or(pagination.default_limit as i64)
        .max(1)
        .min(pagination.max_limit as i64);

    let text_param = |name: &str| params.get(name).map(String::as_str).filter(|s| !s.is_empty());

    let sort_field: SortField = text_param("sortBy")
        .unwrap_or("createdAt")
        .parse()
        .map_err(|_| bad_request(INVALID_SORT_BY))?;
    let sort_order: SortOrder = text_param("sortOrder")
        .unwrap_or("desc")
        .parse()
        .map_err(|_| bad_request(INVALID_SORT_ORDER))?;

    Ok(ListQuery {
        page: usize::try_from(page).unwrap_or(usize::MAX),
        limit: usize::try_from(limit).unwrap_or(1),
        sort_field,
        sort_order,
    })
}

/// The integer at the start of `raw` (after whitespace), e.g. `"12abc"` → 12.
fn leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude = rest[..digits_len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

// ============ GET /api/submissions/{id} ============

async fn handle_get_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecordBody>, ApiError> {
    let record = state
        .store
        .get(&id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("Submission not found"))?;

    Ok(Json(RecordBody {
        success: true,
        data: record,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn parse(pairs: &[(&str, &str)]) -> Result<ListQuery, ApiError> {
        parse_list_query(&params(pairs), &PaginationConfig::default())
    }

    #[test]
    fn test_defaults() {
        let q = parse(&[]).ok().unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 10);
        assert_eq!(q.sort_field, SortField::CreatedAt);
        assert_eq!(q.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_page_floor_and_fallback() {
        assert_eq!(parse(&[("page", "3")]).ok().unwrap().page, 3);
        assert_eq!(parse(&[("page", "0")]).ok().unwrap().page, 1);
        assert_eq!(parse(&[("page", "-4")]).ok().unwrap().page, 1);
        assert_eq!(parse(&[("page", "two")]).ok().unwrap().page, 1);
        assert_eq!(parse(&[("page", "2.7")]).ok().unwrap().page, 2);
    }

    #[test]
    fn test_limit_clamp() {
        assert_eq!(parse(&[("limit", "25")]).ok().unwrap().limit, 25);
        assert_eq!(parse(&[("limit", "500")]).ok().unwrap().limit, 100);
        assert_eq!(parse(&[("limit", "-5")]).ok().unwrap().limit, 1);
        assert_eq!(parse(&[("limit", "0")]).ok().unwrap().limit, 10);
        assert_eq!(parse(&[("limit", "")]).ok().unwrap().limit, 10);
    }

    #[test]
    fn test_limit_uses_configured_bounds() {
        let pagination = PaginationConfig {
            default_limit: 5,
            max_limit: 20,
        };
        let q = parse_list_query(&params(&[]), &pagination).ok().unwrap();
        assert_eq!(q.limit, 5);
        let q = parse_list_query(&params(&[("limit", "50")]), &pagination)
            .ok()
            .unwrap();
        assert_eq!(q.limit, 20);
    }

    #[test]
    fn test_sort_validation() {
        let err = parse(&[("sortBy", "name")]).err().unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, INVALID_SORT_BY);

        let err = parse(&[("sortBy", "createdAt"), ("sortOrder", "up")])
            .err()
            .unwrap();
        assert_eq!(err.message, INVALID_SORT_ORDER);

        let q = parse(&[("sortBy", ""), ("sortOrder", "asc")]).ok().unwrap();
        assert_eq!(q.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_sort_by_checked_before_order() {
        let err = parse(&[("sortBy", "name"), ("sortOrder", "up")])
            .err()
            .unwrap();
        assert_eq!(err.message, INVALID_SORT_BY);
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("42"), Some(42));
        assert_eq!(leading_int("  7 "), Some(7));
        assert_eq!(leading_int("12abc"), Some(12));
        assert_eq!(leading_int("-3"), Some(-3));
        assert_eq!(leading_int("+8"), Some(8));
        assert_eq!(leading_int("abc"), None);
        assert_eq!(leading_int("-"), None);
        assert_eq!(leading_int(""), None);
        assert_eq!(leading_int("99999999999999999999999"), Some(i64::MAX));
    }
}
