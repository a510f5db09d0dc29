use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use scholar_aggregator::config::{find_config_file, get_config, load_config, Config};
use scholar_aggregator::models::AggregatedResults;
use scholar_aggregator::utils::truncate_with_ellipsis;
use scholar_aggregator::{Aggregator, SearchQuery, SourceRegistry};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Scholar Aggregator - Search Latin American academic literature across
/// an OAI-PMH repository and the Crossref registry
#[derive(Parser, Debug)]
#[command(name = "scholar-aggregator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Aggregated academic search over Redalyc (OAI-PMH) and SciELO (Crossref)", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search every enabled source for a keyword
    #[command(alias = "s")]
    Search {
        /// Keyword (matched literally and case-insensitively by the harvester)
        #[arg(default_value = "")]
        keyword: String,

        /// Earliest publication date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Latest publication date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Skip the OAI-PMH harvester
        #[arg(long)]
        no_harvester: bool,

        /// Skip the Crossref registry search
        #[arg(long)]
        no_registry: bool,

        /// Result page (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Harvester page size (defaults to config)
        #[arg(long)]
        page_size: Option<usize>,

        /// Registry rows per page (defaults to config)
        #[arg(long)]
        rows: Option<usize>,
    },

    /// List the configured sources
    Sources,
}

fn resolve_config(path: Option<&PathBuf>) -> Result<Config> {
    if let Some(path) = path {
        return load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }
    if let Some(path) = find_config_file() {
        return load_config(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }
    get_config().context("Failed to load configuration")
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("scholar_aggregator={}", level)),
    );

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.is_json() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_ref())?;
    init_tracing(&cli, &config);

    match &cli.command {
        Commands::Search {
            keyword,
            from,
            to,
            no_harvester,
            no_registry,
            page,
            page_size,
            rows,
        } => {
            let mut query = SearchQuery::new(keyword.as_str())
                .use_harvester(!no_harvester)
                .use_registry(!no_registry)
                .page(*page)
                .page_size(page_size.unwrap_or(config.search.page_size))
                .rows(rows.unwrap_or(config.search.rows));
            if let Some(from) = from {
                query = query.date_from(*from);
            }
            if let Some(to) = to {
                query = query.date_to(*to);
            }

            if !query.is_searchable() {
                bail!("Enter a keyword or enable the harvester");
            }

            let aggregator = Aggregator::from_config(&config)?;
            let results = aggregator.search(&query).await;

            if results.all_failed() {
                bail!("Search failed: no source could be reached. Please try again later.");
            }

            output_results(&results, cli.output)?;
        }
        Commands::Sources => {
            let registry = SourceRegistry::from_config(&config)?;
            for source in registry.all() {
                println!(
                    "{:<10} {:<10} {}",
                    source.id(),
                    source.kind().to_string(),
                    source.name()
                );
            }
        }
    }

    Ok(())
}

fn output_results(results: &AggregatedResults, format: OutputFormat) -> Result<()> {
    let actual_format = if format == OutputFormat::Auto {
        if std::io::stdout().is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    };

    match actual_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results)?);
        }
        OutputFormat::Plain => {
            println!("Results: {}", results.total);
            println!();
            for record in &results.records {
                println!("{} - {} ({})", record.title, record.author_line(), record.source);
                if !record.journal.is_empty() {
                    println!("  Journal: {}", record.journal);
                }
                if !record.date.is_empty() {
                    println!("  Date: {}", record.date);
                }
                if !record.url.is_empty() {
                    println!("  URL: {}", record.url);
                }
                if record.has_doi() {
                    println!("  DOI: {}", record.doi);
                }
                println!();
            }
        }
        OutputFormat::Table => {
            println!("Results: {}", results.total);
            if results.is_empty() {
                println!("No results found");
                return Ok(());
            }

            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Title", "Authors", "Journal", "Year", "Source"]);

            for record in &results.records {
                table.add_row(vec![
                    Cell::new(truncate_with_ellipsis(&record.title, 50))
                        .add_attribute(Attribute::Bold),
                    Cell::new(truncate_with_ellipsis(&record.author_line(), 30)),
                    Cell::new(truncate_with_ellipsis(&record.journal, 30)),
                    Cell::new(record.year().unwrap_or_default()),
                    Cell::new(&record.source),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Auto => unreachable!(),
    }

    Ok(())
}
