use std::path::PathBuf;

use clap::Parser;

/// Real-time microgrid dispatch controller.
#[derive(Debug, Parser)]
#[command(name = "griddyd", version, about)]
pub struct Cli {
    /// Path to a TOML configuration file. Missing fields fall back to
    /// defaults; a missing file falls back to defaults entirely.
    #[arg(long, default_value = "griddy.toml")]
    pub config: PathBuf,

    /// Log filter, passed straight to `tracing_subscriber::EnvFilter`.
    /// Overridden by `RUST_LOG` if that is set.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
