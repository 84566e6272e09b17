//! CLI argument definitions for sociostat.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fetch` | Fetch unified statistics for one platform handle |
//! | `stats` | Fetch several platforms concurrently and combine totals |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--mock` | `false` | Serve deterministic offline data |
//! | `--timeout-ms` | `10000` | Per-request transport timeout |
//!
//! # Examples
//!
//! ```bash
//! # One platform
//! sociostat fetch tiktok charli.damelio --pretty
//!
//! # Cross-platform reach for one creator
//! sociostat stats --tiktok mrbeast --twitter MrBeast --twitch mrbeast6000
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use sociostat_core::PlatformId;

/// Multi-platform creator statistics CLI.
///
/// Fetches public profile statistics from TikTok, Twitter and Twitch,
/// normalizes them into one record shape, and combines cross-platform
/// reach figures. Requires `SOCIOSTAT_RAPIDAPI_KEY` (or `RAPIDAPI_KEY`)
/// unless `--mock` is set.
#[derive(Debug, Parser)]
#[command(
    name = "sociostat",
    author,
    version,
    about = "Multi-platform creator statistics CLI"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Serve deterministic offline data instead of calling providers.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Per-request transport timeout in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object output.
    Json,
    /// Human-readable table for terminal display.
    Table,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch unified statistics for one platform handle.
    Fetch(FetchArgs),
    /// Fetch several platforms concurrently and combine the totals.
    Stats(StatsArgs),
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Platform to query.
    #[arg(value_enum)]
    pub platform: PlatformSelector,

    /// Creator handle on that platform (leading `@` is accepted).
    pub handle: String,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// TikTok handle.
    #[arg(long)]
    pub tiktok: Option<String>,

    /// Twitter handle.
    #[arg(long)]
    pub twitter: Option<String>,

    /// Twitch channel name.
    #[arg(long)]
    pub twitch: Option<String>,
}

/// Platform selection for the `fetch` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformSelector {
    Tiktok,
    Twitter,
    Twitch,
}

impl PlatformSelector {
    pub const fn into_platform_id(self) -> PlatformId {
        match self {
            Self::Tiktok => PlatformId::Tiktok,
            Self::Twitter => PlatformId::Twitter,
            Self::Twitch => PlatformId::Twitch,
        }
    }
}
