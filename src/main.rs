//! CLI entry point for dcomp-config
//!
//! Provides a command-line interface for inspecting agent properties
//! files: listing parsed keys, resolving a key through the layered
//! lookup, and deriving environment variable names.

use clap::{Parser, Subcommand};
use colored::*;
use dcomp_config::config::AgentConfig;
use dcomp_config::{env_key, Source};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dcomp-config")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every key/value pair in a properties file
    List {
        /// Path to the properties file
        #[arg(short, long, default_value = "config.properties")]
        config: PathBuf,

        /// Emit a JSON object instead of text
        #[arg(long)]
        json: bool,
    },

    /// Resolve one key through properties, environment and default
    Get {
        /// Configuration key (e.g. dcomp.drush.command)
        key: String,

        /// Path to the properties file
        #[arg(short, long, default_value = "config.properties")]
        config: PathBuf,

        /// Value to fall back to when nothing defines the key
        #[arg(short, long)]
        default: Option<String>,

        /// Emit {key, value, source} as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the environment variable name derived from a key
    EnvKey {
        /// Configuration key (e.g. dcomp.drush.command)
        key: String,
    },
}

/// JSON payload for `get --json`
#[derive(Serialize)]
struct Resolution<'a> {
    key: &'a str,
    value: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<Source>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List { config, json } => list_properties(&config, json)?,
        Commands::Get {
            key,
            config,
            default,
            json,
        } => resolve_key(&key, &config, default.as_deref(), json)?,
        Commands::EnvKey { key } => println!("{}", env_key(&key)),
    }

    Ok(())
}

/// Expand a leading tilde in a user-supplied path
fn expand_path(path: &Path) -> anyhow::Result<PathBuf> {
    let raw = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid path encoding"))?;
    Ok(PathBuf::from(shellexpand::tilde(raw).as_ref()))
}

/// List every property defined in the file
fn list_properties(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let path = expand_path(config_path)?;
    let config = AgentConfig::load(&path)?;

    // BTreeMap gives stable, sorted output
    let sorted: BTreeMap<&str, &str> = config.iter().collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&sorted)?);
        return Ok(());
    }

    println!("{}", format!("Properties from: {}\n", path.display()).bold());

    for (key, value) in &sorted {
        println!("{} = {}", key.cyan(), value);
    }

    println!("\n{} Total: {} properties", "✓".green(), sorted.len());

    Ok(())
}

/// Resolve one key through the layered lookup
fn resolve_key(
    key: &str,
    config_path: &Path,
    default: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let path = expand_path(config_path)?;
    let config = AgentConfig::load(&path)?;

    let resolved = config.lookup(key);

    if json {
        let report = Resolution {
            key,
            value: resolved
                .as_ref()
                .map(|(value, _)| value.as_str())
                .or(default),
            source: resolved.as_ref().map(|(_, source)| *source),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        if report.value.is_none() {
            std::process::exit(1);
        }
        return Ok(());
    }

    match resolved {
        Some((value, _)) => println!("{}", value),
        None => match default {
            Some(value) => println!("{}", value),
            None => {
                eprintln!("{} no value anywhere for {}", "✗".red().bold(), key.cyan());
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
