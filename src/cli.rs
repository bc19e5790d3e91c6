use clap::Parser;
use std::path::PathBuf;

/// Live YouTube player for content pages, with a one-field admin page
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Print the player fragment for the stored URL to stdout and exit
    #[arg(short = 'o', long, conflicts_with = "set_url")]
    pub render: bool,

    /// Render as a privileged viewer with the diagnostic block (with --render)
    #[arg(long, requires = "render")]
    pub debug: bool,

    /// Sanitize and store a YouTube URL, then exit. An empty string clears it.
    #[arg(long, value_name = "URL", conflicts_with = "render")]
    pub set_url: Option<String>,

    /// Config file to read (default: ./asamblea.toml if present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Port to listen on. Overrides the config (default: 5300).
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Host/IP address to bind to. Overrides the config (default: 127.0.0.1).
    /// Use 0.0.0.0 to listen on all interfaces.
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Directory of HTML content pages. Overrides the config.
    #[arg(long, value_name = "PATH")]
    pub content_dir: Option<PathBuf>,

    /// Settings file holding the configured URL. Overrides the config.
    #[arg(long, value_name = "PATH")]
    pub settings_file: Option<PathBuf>,

    /// Increase logging verbosity (-v = info, -vv = debug, -vvv = trace).
    /// Default is warn level. Can also set RUST_LOG env var.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Get the log level filter string based on verbosity flags.
    /// Returns a filter suitable for tracing_subscriber::EnvFilter.
    pub fn log_level_filter(&self) -> String {
        let level = if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        };

        // Set level for this crate and tower_http (for request logging)
        format!(
            "{}={},tower_http={}",
            env!("CARGO_CRATE_NAME"),
            level,
            level
        )
    }
}
