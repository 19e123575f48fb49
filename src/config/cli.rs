use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the content-filter binary.
#[derive(Debug, Parser)]
#[command(
    name = "content-filter",
    version,
    about = "Facetted blog listing and filter service"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "CONTENT_FILTER_CONFIG_FILE",
        value_name = "PATH"
    )]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(Box<ServeArgs>),
    /// Print the facet payload for one module as JSON.
    Facets(FacetsArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ContentOverride {
    /// Override the content seed file.
    #[arg(long = "content-seed", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub seed_path: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub content: ContentOverride,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

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

    /// Toggle the facet aggregation cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the facet cache capacity.
    #[arg(long = "cache-capacity", value_name = "COUNT")]
    pub cache_capacity: Option<usize>,

    /// Override the page size used when a module sets no `limit`.
    #[arg(long = "default-page-size", value_name = "COUNT")]
    pub default_page_size: Option<u32>,
}

#[derive(Debug, Args, Clone)]
pub struct FacetsArgs {
    #[command(flatten)]
    pub content: ContentOverride,

    /// Module whose facets are computed.
    #[arg(long = "module", value_name = "ID")]
    pub module: String,

    /// Raw request query string, e.g. `filters[color][]=red&min_price=5`.
    #[arg(long = "query", value_name = "QUERY", default_value = "")]
    pub query: String,

    /// Include the paginated listing alongside the facets.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub listing: bool,
}
