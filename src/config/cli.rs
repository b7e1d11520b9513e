use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the powerworks binary.
#[derive(Debug, Parser)]
#[command(name = "powerworks", version, about = "Powerworks portfolio site server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "POWERWORKS_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the public HTTP server.
    Serve(Box<ServeArgs>),
    /// Fetch the project listing once and print the filtered result.
    Projects(ProjectsArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct UpstreamOverrides {
    /// Override the projects API base URL.
    #[arg(long = "upstream-base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Override the number of projects requested per fetch.
    #[arg(long = "upstream-limit", value_name = "COUNT")]
    pub limit: Option<u32>,

    /// Override the revalidation window (0 disables caching).
    #[arg(long = "upstream-revalidate-seconds", value_name = "SECONDS")]
    pub revalidate_seconds: Option<u64>,

    /// Override the upstream request timeout.
    #[arg(long = "upstream-timeout-seconds", value_name = "SECONDS")]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub upstream: UpstreamOverrides,

    #[command(flatten)]
    pub logging: LoggingOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the public site URL used for canonical links.
    #[arg(long = "site-public-url", value_name = "URL")]
    pub site_public_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ProjectsArgs {
    #[command(flatten)]
    pub upstream: UpstreamOverrides,

    #[command(flatten)]
    pub logging: LoggingOverrides,

    /// Case-insensitive text matched against title, client and location.
    #[arg(long, short = 'q', value_name = "TEXT")]
    pub query: Option<String>,

    /// Restrict to one sector (oil-and-gas, power-sector or all).
    #[arg(long, value_name = "SECTOR")]
    pub sector: Option<String>,

    /// Restrict to one status (ongoing, completed or all).
    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,

    /// Tie-break ordering (newest, oldest, name-asc, name-desc, year-asc, year-desc).
    #[arg(long, value_name = "KEY")]
    pub sort: Option<String>,

    /// Print the matching records as JSON.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,
}
