//! # dynaform
//!
//! Schema-driven dynamic forms. A form is described once as a declarative
//! schema; submissions are validated against it, stored in memory with
//! sequential IDs, and browsed page by page.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  FormSchema  │──▶│  Validator   │──▶│    Store     │
//! │ built-in/file│   │ rules per    │   │ SUB000001... │
//! └──────────────┘   │ field kind   │   └──────┬───────┘
//!                    └──────────────┘          │
//!                      ┌───────────────────────┤
//!                      ▼                       ▼
//!                 ┌──────────┐           ┌──────────┐
//!                 │   CLI    │──reqwest─▶│   HTTP   │
//!                 │ fill/list│           │  (axum)  │
//!                 └──────────┘           └──────────┘
//! ```
//!
//! The schema, validation, and store live in `dynaform-core`; this crate
//! adds configuration, the HTTP server, and the terminal client.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and environment overrides |
//! | [`forms`] | Built-in onboarding form, schema files |
//! | [`server`] | HTTP API |
//! | [`api`] | Request/response bodies shared by server and client |
//! | [`client`] | HTTP client for the API |
//! | [`render`] | Text rendering of schemas and submissions |
//! | [`fill`] | Terminal form filling |
//! | [`commands`] | CLI command implementations |

pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod fill;
pub mod forms;
pub mod render;
pub mod server;
