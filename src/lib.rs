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

//! Drupal Computing agent configuration
//!
//! A reader for the sectionless Java-properties dialect that Drupal
//! Computing agents share across runtimes, plus the layered lookup
//! facade built on top of it.
//!
//! # Features
//!
//! - **Properties parsing:** `=`, `:` and bare-whitespace separators,
//!   escaped separators, trailing-backslash continuation lines,
//!   `#`/`;` comments, last-write-wins duplicates
//! - **Never fails on content:** malformed lines degrade to a key with
//!   an empty value; only I/O can error
//! - **Layered lookup:** properties file, then process environment
//!   under derived names (`dcomp.drush.command` → `DCOMP_DRUSH_COMMAND`),
//!   then caller defaults
//! - **Caller-owned config:** no global state, no lazy initialization
//! - **Memory-safe:** 100% safe Rust (no unsafe blocks)
//!
//! # Architecture
//!
//! - **`core`:** Parsing logic (escape-aware scanning, separator
//!   detection, key/value unescaping)
//! - **`config`:** The [`AgentConfig`] facade (file discovery,
//!   environment fallback, well-known keys and defaults)
//!
//! # Examples
//!
//! ## Parsing properties content
//!
//! ```
//! use dcomp_config::core::parser::parse_str;
//!
//! let props = parse_str("dcomp.agent.name = worker-01\ndcomp.exec.timeout: 5000\n");
//! assert_eq!(props["dcomp.agent.name"], "worker-01");
//! assert_eq!(props["dcomp.exec.timeout"], "5000");
//! ```
//!
//! ## Resolving configuration with fallback
//!
//! ```no_run
//! use dcomp_config::config::AgentConfig;
//!
//! let config = AgentConfig::load("config.properties")?;
//! let command = config.drush_command();
//! let timeout = config.exec_timeout_ms()?;
//! println!("running {} with a {}ms timeout", command, timeout);
//! # Ok::<(), dcomp_config::config::ConfigError>(())
//! ```

pub mod config;
pub mod core;

// Re-export commonly used items for convenience
pub use crate::config::{env_key, AgentConfig, ConfigError, Source};
pub use crate::core::{parse_lines, parse_reader, parse_str};
