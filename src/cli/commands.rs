use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Version};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::RouterConfig;
use crate::echo::registry_for;
use crate::logging::{init_logging_with_config, LogConfig};
use crate::route::{load_routes, RouteSource};
use crate::router::{Router, RouterBuilder};

/// Command-line interface for waypoint
///
/// Loads route files against echo handlers to list, check and resolve them.
#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "waypoint route table CLI", long_about = None)]
pub struct Cli {
    /// Log level (overrides WAYPOINT_LOG_LEVEL)
    #[arg(long, global = true, env = "WAYPOINT_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print the route table built from a route file
    Routes {
        /// Path to the route file (YAML, JSON or TOML)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Validate every entry of a route file and report all failures
    Check {
        /// Path to the route file (YAML, JSON or TOML)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Resolve one request against a route file and print the response
    Resolve {
        /// Path to the route file (YAML, JSON or TOML)
        #[arg(short, long)]
        file: PathBuf,

        /// Router config with default headers (YAML, JSON or TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// HTTP method of the request
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request header as `name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request path, e.g. /users/42
        path: String,
    },
}

/// Parse arguments, initialize logging and run the selected command.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_config = LogConfig {
        log_level: cli.log_level.clone(),
        ..LogConfig::from_env()
    };
    init_logging_with_config(&log_config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &mut out)
}

/// Run a parsed command, writing its report to `out`.
pub fn execute(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Routes { file } => {
            let (router, skipped) = build(file, RouterConfig::default())?;
            router.dump_routes(out)?;
            for (i, key) in &skipped {
                writeln!(out, "[skip]  #{i} {key}: {SKIP_REASON}")?;
            }
            Ok(())
        }
        Commands::Check { file } => check(file, out),
        Commands::Resolve {
            file,
            config,
            method,
            headers,
            path,
        } => {
            let config = match config {
                Some(path) => RouterConfig::load(path)?,
                None => RouterConfig::default(),
            };
            let (router, skipped) = build(file, config)?;
            for (index, key) in &skipped {
                warn!(index, key = %key, "{SKIP_REASON}");
            }
            let method = Method::from_bytes(method.as_bytes())
                .with_context(|| format!("invalid method '{method}'"))?;
            let headers = parse_headers(headers)?;

            let response = router.resolve_parts(&method, path, Version::HTTP_11, &headers)?;
            writeln!(out, "{:?} {}", response.version, response.status)?;
            for (name, value) in &response.headers {
                writeln!(out, "{name}: {value}")?;
            }
            writeln!(out)?;
            out.write_all(&response.body.to_bytes())?;
            writeln!(out)?;
            Ok(())
        }
    }
}

const SKIP_REASON: &str = "type reference skipped, its route metadata lives in application code";

/// Load a route file, separating type references (with their entry index)
/// from the descriptors the echo handlers can serve.
fn load(file: &Path) -> anyhow::Result<(Vec<RouteSource>, Vec<(usize, String)>)> {
    let mut sources = Vec::new();
    let mut skipped = Vec::new();
    for (i, source) in load_routes(file)?.into_iter().enumerate() {
        match source {
            RouteSource::Type(key) => skipped.push((i, key)),
            descriptor => sources.push(descriptor),
        }
    }
    Ok((sources, skipped))
}

fn build(file: &Path, config: RouterConfig) -> anyhow::Result<(Router, Vec<(usize, String)>)> {
    let (sources, skipped) = load(file)?;
    let mut builder = RouterBuilder::new(registry_for(&sources)).with_config(config);
    builder
        .extend(sources)
        .with_context(|| format!("invalid route file {}", file.display()))?;
    Ok((builder.freeze(), skipped))
}

fn check(file: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let sources = load_routes(file)?;
    let mut builder = RouterBuilder::new(registry_for(&sources));
    let mut failures = 0usize;
    let mut skipped = 0usize;

    for (i, source) in sources.into_iter().enumerate() {
        let label = match &source {
            RouteSource::Type(key) => {
                skipped += 1;
                writeln!(out, "[skip]  #{i} {key}: {SKIP_REASON}")?;
                continue;
            }
            RouteSource::Descriptor(d) if !d.name.is_empty() => d.name.clone(),
            RouteSource::Descriptor(d) => d.path.clone(),
        };
        match builder.add(source) {
            Ok(_) => writeln!(out, "[ok]    #{i} {label}")?,
            Err(e) => {
                failures += 1;
                writeln!(out, "[error] #{i} {label}: {e}")?;
            }
        }
    }

    writeln!(
        out,
        "{} route(s) valid, {failures} error(s), {skipped} skipped",
        builder.len()
    )?;
    if failures > 0 {
        bail!("{failures} invalid route(s) in {}", file.display());
    }
    Ok(())
}

fn parse_headers(raw: &[String]) -> anyhow::Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for h in raw {
        let (name, value) = h
            .split_once(':')
            .with_context(|| format!("header '{h}' must look like 'name: value'"))?;
        headers.append(
            HeaderName::from_bytes(name.trim().as_bytes())
                .with_context(|| format!("invalid header name in '{h}'"))?,
            HeaderValue::from_str(value.trim())
                .with_context(|| format!("invalid header value in '{h}'"))?,
        );
    }
    Ok(headers)
}
