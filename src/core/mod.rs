// Copyright 2025 dcomp-config contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/core/mod.rs
//!
//! Core parsing logic module
//!
//! This module contains the fundamental algorithms for reading the
//! sectionless Java-properties dialect, including:
//! - Escape-parity character scanning (backslash-aware search)
//! - Separator detection across `=`, `:` and bare whitespace
//! - Key/value unescaping with their asymmetric historical rules
//! - Logical-line assembly from trailing-backslash continuations
//!
//! All parsing is isolated from file discovery and environment
//! concerns to enable unit testing on plain strings.

pub mod parser;
pub mod scan;

pub use parser::{parse_lines, parse_reader, parse_str};

#[cfg(test)]
mod tests;
