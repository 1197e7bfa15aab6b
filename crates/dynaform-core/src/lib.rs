//! # dynaform core
//!
//! Shared logic for dynaform: the declarative form schema, the schema-driven
//! validation engine, and the submission store abstraction.
//!
//! This crate performs no network or filesystem I/O; the HTTP server, the
//! configuration layer, and the terminal client live in the `dynaform`
//! application crate.

pub mod schema;
pub mod store;
pub mod validate;
