//! Metadata probe.
//!
//! Resolves a URL (WMS endpoint, KML file, web page) to geodata metadata
//! and prints it as JSON. Logs go to stderr so the output can be piped.

mod report;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use geo_metadata::ParserRegistry;
use metadata_fetch::{FetchConfig, HttpFetcher, MetadataResolver};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "metadata-probe")]
#[command(about = "Extract bounding boxes and descriptive metadata for a geodata URL")]
struct Args {
    /// URL of the service, file or page
    #[arg(required_unless_present = "list_parsers")]
    url: Option<String>,

    /// Use only this parser (see --list-parsers)
    #[arg(short, long, env = "GEOMETA_PARSER")]
    parser: Option<String>,

    /// Request timeout in seconds (overrides GEOMETA_FETCH_TIMEOUT_SECS)
    #[arg(long)]
    timeout: Option<u64>,

    /// Write the JSON report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the registered parsers and exit
    #[arg(long)]
    list_parsers: bool,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

fn init_tracing(args: &Args) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(parse_level(&args.log_level))
        .with_target(true)
        .with_writer(std::io::stderr);

    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args)?;

    let registry = ParserRegistry::with_defaults();
    if args.list_parsers {
        print!("{}", report::render_parser_list(&registry));
        return Ok(());
    }
    let url = args.url.as_deref().context("A URL is required")?;

    let mut config = FetchConfig::from_env()?;
    if let Some(secs) = args.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    info!(?config, "Fetch configuration");

    let resolver = MetadataResolver::new(registry, HttpFetcher::new(config)?);
    let resolution = match &args.parser {
        Some(code) => resolver.resolve_with(code, url).await?,
        None => resolver.resolve(url).await?,
    };

    let json = report::render_json(&resolution)?;
    match &args.output {
        Some(path) => {
            report::write_report(path, &json).await?;
            info!(path = %path.display(), parser = resolution.parser, "Report written");
        }
        None => println!("{}", json),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_url_optional_with_list_parsers() {
        let args = Args::try_parse_from(["metadata-probe", "--list-parsers"]).unwrap();
        assert!(args.list_parsers);
        assert!(args.url.is_none());
        assert!(Args::try_parse_from(["metadata-probe"]).is_err());
    }

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "metadata-probe",
            "https://example.org/wms",
            "--parser",
            "wms",
            "--timeout",
            "5",
            "--json-logs",
        ])
        .unwrap();
        assert_eq!(args.url.as_deref(), Some("https://example.org/wms"));
        assert_eq!(args.parser.as_deref(), Some("wms"));
        assert_eq!(args.timeout, Some(5));
        assert!(args.json_logs);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level("loud"), Level::WARN);
    }
}
