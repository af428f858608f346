//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Escape-parity scanning tests (separator/whitespace search)
//! - Properties parsing tests (separators, escapes, continuations)
