//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Silo using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Silo - Incremental File Ingestion Engine
#[derive(Parser, Debug)]
#[command(name = "silo")]
#[command(version, about, long_about = None)]
#[command(author = "Silo Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "silo.toml", env = "SILO_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SILO_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the landing area and ingest files continuously
    Run(commands::run::RunArgs),

    /// Ingest a single file and exit
    Ingest(commands::ingest::IngestArgs),

    /// Show persisted cursor state per entity
    Status(commands::status::StatusArgs),

    /// Recover the cipher key of an obfuscated staging column
    Reveal(commands::reveal::RevealArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
