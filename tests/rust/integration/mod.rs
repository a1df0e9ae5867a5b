//! Integration tests - full query documents executed end to end
//!
//! Documents are parsed, compiled and executed against the in-memory store
//! (or a mocked store), then checked on the reshaped `{data, errors}` result.

mod common;
mod association_tests;
mod operator_availability_tests;
mod payload_filter_tests;
mod store_failure_tests;
