use std::path::PathBuf;

use clap::Parser;

/// Running with no arguments serves the collection page on
/// http://127.0.0.1:8080 with the stock file layout.
#[derive(Parser)]
#[command(name = "embed-collector")]
#[command(about = "Local web tool for collecting Strava embed codes for race activities", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    pub(crate) port: u16,

    /// Bind address; loopback unless you know why not
    #[arg(long, default_value = "127.0.0.1")]
    pub(crate) bind: String,

    /// Race catalog JSON (read-only)
    #[arg(long, default_value = "public/races-data.json")]
    pub(crate) races: PathBuf,

    /// Embed store JSON (created on first save)
    #[arg(long, default_value = "data/strava-embeds.json")]
    pub(crate) embeds: PathBuf,
}
