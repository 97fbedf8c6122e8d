mod platform;

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use url::Url;
use vanity_logging::{LogDestination, LogSettings};

/// Terminal client for the remote vanity-wallet generator.
#[derive(Debug, Parser)]
#[command(name = "vanity", version)]
struct Args {
    /// Backend base URL; the socket and download endpoints hang off it.
    #[arg(long, env = "VANITY_SERVER", default_value = "http://127.0.0.1:5000")]
    server: String,

    /// Directory that downloaded result files are written to.
    #[arg(long, default_value = "./output")]
    output_dir: PathBuf,

    /// File holding the last successful host, port and username.
    #[arg(long, default_value = "./.vanity_profile.ron")]
    profile: PathBuf,

    #[arg(long, default_value = "./vanity.log")]
    log_file: PathBuf,

    /// trace, debug, info, warn, error or off.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also write log records to the terminal.
    #[arg(long)]
    verbose: bool,

    /// Accept every confirmation prompt without asking.
    #[arg(long)]
    assume_yes: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = vanity_logging::parse_level(&args.log_level)
        .ok_or_else(|| anyhow!("unknown log level {:?}", args.log_level))?;
    let destination = if args.verbose {
        LogDestination::Both(args.log_file.clone())
    } else {
        LogDestination::File(args.log_file.clone())
    };
    vanity_logging::initialize(&LogSettings { level, destination });

    let server_url = Url::parse(&args.server)
        .with_context(|| format!("invalid --server URL {:?}", args.server))?;

    platform::run_app(platform::AppOptions {
        server_url,
        output_dir: args.output_dir,
        profile_path: args.profile,
        assume_yes: args.assume_yes,
    })
}
