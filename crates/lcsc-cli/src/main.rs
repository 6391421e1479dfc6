//! `lcsc`: command-line client for the LCSC scheduling API.
//!
//! # Usage
//!
//! ```
//! lcsc availability --role Developer --weeks 2
//! lcsc schedule 3f1c7f7e-0d7a-4f0e-9b8a-2f4c6d1e5a90
//! lcsc --config ~/.config/lcsc/config.toml availability
//! ```

mod client;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::ApiClient;
use serde::Deserialize;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "lcsc", about = "Query the LCSC scheduling server")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the server (default: http://localhost:8080).
  #[arg(long, env = "LCSC_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the availability grid.
  Availability {
    /// Only count people holding this role.
    #[arg(long)]
    role:  Option<String>,
    /// Number of weeks to show.
    #[arg(long)]
    weeks: Option<u32>,
  },
  /// Print a person's upcoming schedule.
  Schedule {
    person: Uuid,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| "http://localhost:8080".to_string());
  let client = ApiClient::new(base_url)?;

  let output = match args.command {
    Command::Availability { role, weeks } => {
      let slots = client.availability(role.as_deref(), weeks).await?;
      render::availability_grid(&slots)
    }
    Command::Schedule { person } => {
      let events = client.schedule(person).await?;
      render::schedule(&events)
    }
  };
  print!("{output}");
  Ok(())
}
