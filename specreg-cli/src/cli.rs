//! Command-line interface for the registry resolver.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use specreg::{
    CONFIG_ENV, CatalogReport, DiscoverConfig, Registry, RegistryConfig, ResolutionMode, Resolver,
    SOURCES_ENV, SourceEntry, output,
};

use crate::logging;

/// specreg - load, check and serve the API description catalog of a documentation viewer.
#[derive(Parser, Debug)]
#[command(name = "specreg")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Registry config file (YAML or JSON)
    #[arg(short, long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); `RUST_LOG` takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the registry in display order.
    List,

    /// Resolve one source and write its document.
    Resolve {
        /// Source name as shown by `list`
        name: String,

        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve every source and report failures.
    Check {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the `urls` list for a documentation viewer.
    Urls,

    /// Build a source list from a directory of description documents.
    Discover {
        /// Directory to scan
        root: PathBuf,

        /// URL prefix for generated locators
        #[arg(long, default_value = "/specs")]
        prefix: String,

        /// Exclude glob (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
    },
}

/// Run the CLI. Returns `Ok(false)` when the command ran but found failures.
pub async fn run() -> Result<bool> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::List => {
            let (resolver, _) = open_resolver(config_path)?;
            list_command(resolver.registry());
            Ok(true)
        }
        Commands::Resolve { name, output } => {
            let (resolver, _) = open_resolver(config_path)?;
            resolve_command(&resolver, &name, output.as_deref()).await
        }
        Commands::Check { json } => {
            let (resolver, _) = open_resolver(config_path)?;
            check_command(&resolver, json).await
        }
        Commands::Urls => {
            let (resolver, mode) = open_resolver(config_path)?;
            urls_command(&resolver, mode).await
        }
        Commands::Discover {
            root,
            prefix,
            exclude,
        } => discover_command(&root, &prefix, &exclude),
    }
}

/// Load the configured registry and build a resolver over it.
fn open_resolver(config_path: Option<&Path>) -> Result<(Resolver, ResolutionMode)> {
    let config = load_config(config_path)?;
    let registry = config.registry().context("Invalid registry")?;
    let resolver = Resolver::new(registry, config.resolver_options())?;
    Ok((resolver, config.mode))
}

/// Read the config file (if any) and apply environment overrides.
fn load_config(path: Option<&Path>) -> Result<RegistryConfig> {
    let mut config = match path {
        Some(path) => RegistryConfig::from_file(path)?,
        None if std::env::var_os(SOURCES_ENV).is_some() => RegistryConfig::default(),
        None => {
            bail!("No sources configured: pass --config, or set {CONFIG_ENV} or {SOURCES_ENV}")
        }
    };
    config.apply_env()?;
    Ok(config)
}

fn list_command(registry: &Registry) {
    for entry in registry {
        println!("{}\t{}", entry.name.bold(), entry.locator);
    }
}

async fn resolve_command(resolver: &Resolver, name: &str, output: Option<&Path>) -> Result<bool> {
    let doc = resolver.resolve(name).await?;
    match output {
        Some(path) => {
            std::fs::write(path, &doc.content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} {} -> {}",
                "Resolved".green(),
                doc.entry.name,
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&doc.content)?;
            stdout.flush()?;
        }
    }
    Ok(true)
}

async fn check_command(resolver: &Resolver, json: bool) -> Result<bool> {
    let report = resolver.resolve_all().await;
    let mut stdout = std::io::stdout().lock();
    write_check_report(&report, json, &mut stdout)
}

/// Print the report; the result is `false` when any source failed.
fn write_check_report(report: &CatalogReport, json: bool, writer: &mut dyn Write) -> Result<bool> {
    if json {
        output::write_json(report, writer)?;
    } else {
        output::write_human(report, writer)?;
        if report.ok {
            writeln!(writer, "{}", "OK".green().bold())?;
        } else {
            writeln!(writer, "{}", "FAILED".red().bold())?;
        }
    }
    Ok(report.ok)
}

/// In eager mode every source is resolved first and only the ones that
/// resolved are handed to the viewer.
async fn urls_command(resolver: &Resolver, mode: ResolutionMode) -> Result<bool> {
    let registry = match mode {
        ResolutionMode::Lazy => resolver.registry().clone(),
        ResolutionMode::Eager => {
            let report = resolver.resolve_all().await;
            resolved_registry(resolver.registry(), &report)?
        }
    };
    let mut stdout = std::io::stdout().lock();
    output::write_viewer_urls(&registry, &mut stdout)?;
    Ok(true)
}

/// The entries of `registry` that resolved in `report`, in registry order.
fn resolved_registry(registry: &Registry, report: &CatalogReport) -> Result<Registry> {
    for failure in &report.failures {
        tracing::warn!("Dropping source: {}", failure.format_human_readable());
    }
    let kept: Vec<SourceEntry> = registry
        .iter()
        .filter(|e| report.documents.iter().any(|d| d.name == e.name))
        .cloned()
        .collect();
    Ok(Registry::load(kept)?)
}

#[derive(Serialize)]
struct DiscoveredSources<'a> {
    sources: &'a [SourceEntry],
}

fn discover_command(root: &Path, prefix: &str, exclude: &[String]) -> Result<bool> {
    let mut config = DiscoverConfig::new(root);
    config.url_prefix = prefix.to_owned();
    config.exclude = exclude.to_vec();

    let sources = specreg::discover(&config)?;
    // Validate before printing so the output is always loadable.
    Registry::load(sources.clone()).context("Discovered sources do not form a valid registry")?;

    print!("{}", render_sources(&sources)?);
    Ok(true)
}

/// Render a `sources:` block that a registry config file accepts as is.
fn render_sources(sources: &[SourceEntry]) -> Result<String> {
    Ok(serde_saphyr::to_string(&DiscoveredSources { sources })?)
}
