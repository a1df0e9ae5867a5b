//! gqlbridge - GraphQL-style query translation over a relational entity store
//!
//! This crate translates `select`/`where` query documents through:
//! - Entity models mapped to a query schema with per-scalar filter operators
//! - Pluggable scalar coercion for opaque payloads (JSON, variable values)
//! - Predicate compilation into joined, parameterized relational queries
//! - Execution against ClickHouse (or an in-memory store) and result reshaping

pub mod config;
pub mod entity_catalog;
pub mod executor;
pub mod graphql_parser;
pub mod query_planner;
pub mod query_schema;
pub mod render_plan;
pub mod scalars;
pub mod server;
pub mod sql_generator;
pub mod store;
