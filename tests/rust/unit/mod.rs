//! Unit tests exercised through the public API only

mod compiled_sql_tests;
mod filter_grammar_tests;
mod parser_robustness_tests;
