//! Unit test suite for mnemolite-ast-utils
//!
//! Run with: `cargo test -p mnemolite-ast-utils --test unit`

#[path = "unit/common.rs"]
mod common;

#[path = "unit/complexity_tests.rs"]
mod complexity;

#[path = "unit/cursor_tests.rs"]
mod cursor;

#[path = "unit/visitor_tests.rs"]
mod visitor;

#[path = "unit/walker_tests.rs"]
mod walker;

#[path = "unit/symbols_tests.rs"]
mod symbols;
