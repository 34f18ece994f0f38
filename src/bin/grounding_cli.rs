// ABOUTME: Command-line front end for grounding meals and administering the lookup cache
// ABOUTME: Reads a JSON ingredient list, prints the breakdown, and exposes cache stats, purge, and clear
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Ground a meal and print the full breakdown as JSON
//! USDA_API_KEY=... grounding-cli analyze meal.json
//!
//! # Short human-readable summary, checking the credential first
//! grounding-cli analyze meal.json --summary --verify
//!
//! # Cache administration
//! grounding-cli cache stats
//! grounding-cli cache purge
//! grounding-cli cache clear
//! ```
//!
//! `meal.json` holds an array of `{"name": "...", "grams": 150, "notes": "..."}`.

use std::fs;
use std::future::{pending, Future};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{info, warn};

use nutrition_grounding::cache::{CacheConfig, FoodCache};
use nutrition_grounding::config::EngineConfig;
use nutrition_grounding::engine::GroundingEngine;
use nutrition_grounding::external::UsdaClient;
use nutrition_grounding::logging::{LogFormat, LoggingConfig};
use nutrition_grounding::models::RawIngredient;

#[derive(Parser)]
#[command(
    name = "grounding-cli",
    about = "Nutrition grounding engine",
    long_about = "Ground freeform ingredient lists against USDA FoodData Central and validate the totals."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Ground a meal read from a JSON file
    Analyze {
        /// Path to a JSON array of ingredients
        meal: PathBuf,

        /// Print a short summary instead of JSON
        #[arg(long)]
        summary: bool,

        /// Check the API credential before grounding
        #[arg(long)]
        verify: bool,

        /// Concurrent lookups (overrides `GROUNDING_WORKERS`)
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Lookup cache administration
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Show entry counts and hit statistics
    Stats,
    /// Remove expired entries
    Purge,
    /// Remove every entry
    Clear,
}

fn init_logging(cli: &Cli) -> Result<()> {
    let mut config = LoggingConfig::from_env();
    if cli.verbose {
        "debug".clone_into(&mut config.level);
    }
    if cli.json_logs {
        config = config.with_format(LogFormat::Json);
    }
    config.init()?;
    Ok(())
}

fn read_meal(path: &Path) -> Result<Vec<RawIngredient>> {
    let raw = fs::read_to_string(path)
        .map_err(|e| anyhow!("cannot read meal file {}: {e}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|e| anyhow!("meal file {} is not a JSON ingredient list: {e}", path.display()))
}

/// Resolves once `interrupt` reports a delivered signal
///
/// A failed handler registration never resolves, so the meal runs to completion.
async fn until_interrupted<F>(interrupt: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = interrupt.await {
        warn!(error = %e, "Ctrl-C handler unavailable; running without early exit");
        pending::<()>().await;
    }
}

async fn analyze(meal: &Path, summary: bool, verify: bool, workers: Option<usize>) -> Result<bool> {
    let ingredients = read_meal(meal)?;

    let mut config = EngineConfig::from_env()?;
    if let Some(workers) = workers {
        config.worker_pool_size = workers;
    }
    if verify {
        UsdaClient::new(config.usda.clone())?.verify_credentials().await?;
        info!("USDA credential verified");
    }

    let engine = GroundingEngine::from_config(config).await?;
    let breakdown = engine
        .analyze_until(&ingredients, until_interrupted(signal::ctrl_c()))
        .await?;

    if summary {
        print!("{}", breakdown.summary());
    } else {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
    }
    Ok(!breakdown.is_blocking())
}

async fn cache_command(action: &CacheCommand) -> Result<()> {
    let config = CacheConfig::from_env()?;
    let cache = FoodCache::from_config(&config).await?;
    match action {
        CacheCommand::Stats => {
            println!("{}", serde_json::to_string_pretty(&cache.stats().await?)?);
        }
        CacheCommand::Purge => {
            let removed = cache.purge_expired().await?;
            println!("purged {removed} expired entries");
        }
        CacheCommand::Clear => {
            let removed = cache.clear().await?;
            println!("cleared {removed} entries");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match &cli.command {
        Command::Analyze {
            meal,
            summary,
            verify,
            workers,
        } => {
            let usable = analyze(meal, *summary, *verify, *workers).await?;
            // exit 2 marks a blocking result
            Ok(if usable {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            })
        }
        Command::Cache { action } => {
            cache_command(action).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
