use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use dracor_core::config::DashboardConfig;
use dracor_core::filter::{FilterBounds, InclusiveRange, PlayFilter};
use dracor_core::network::DracorClient;
use dracor_core::{schema, CorpusMetricsPipeline};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod render;

use render::OutputFormat;

/// Explore small-world metrics of the DraCor drama corpora
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file (falls back to DRACOR_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Metrics CSV, overriding the configured path
    #[arg(long, global = true)]
    csv: Option<PathBuf>,
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List corpus names
    Corpora,
    /// List play names, optionally for one corpus
    Plays {
        #[arg(long)]
        corpus: Option<String>,
    },
    /// Show every row of one corpus
    Subcorpus {
        corpus: String,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Per-corpus metadata and small-world counts over the filtered plays
    Summary(FilteredOutput),
    /// Small-world counts per century over the filtered plays
    Centuries {
        #[command(flatten)]
        output: FilteredOutput,
        /// Metric to sum (repeatable; defaults to swn, swt, sft)
        #[arg(long = "metric")]
        metrics: Vec<String>,
    },
    /// The filtered plays with swt, sft and century columns
    Classify(FilteredOutput),
    /// Download character networks as GraphML
    Network(NetworkArgs),
}

#[derive(Args, Debug)]
struct FilteredOutput {
    #[command(flatten)]
    filter: FilterArgs,
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Corpus to include (repeatable; defaults to all)
    #[arg(long = "corpus")]
    corpora: Vec<String>,
    /// Inclusive segment range, e.g. 1..40
    #[arg(long)]
    segments: Option<InclusiveRange>,
    /// Inclusive year range, e.g. 1700..1799
    #[arg(long)]
    years: Option<InclusiveRange>,
}

impl FilterArgs {
    fn resolve(&self, bounds: &FilterBounds) -> Result<PlayFilter> {
        let corpora = if self.corpora.is_empty() {
            bounds.corpora.clone()
        } else {
            self.corpora.clone()
        };
        let years = match self.years.or(bounds.years) {
            Some(years) => years,
            None => bail!("no play in the table has a known year; pass --years explicitly"),
        };
        Ok(PlayFilter::new(
            corpora,
            self.segments.unwrap_or(bounds.segments),
            years,
        ))
    }
}

#[derive(Args, Debug)]
struct NetworkArgs {
    /// Play names as listed in the metrics table
    #[arg(required = true)]
    plays: Vec<String>,
    /// Directory to write `{corpus}_{play}.graphml` files into
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(csv) = cli.csv.clone() {
        config.metrics_csv = csv;
    }
    init_tracing(cli.log_json || config.log_json);

    let pipeline = CorpusMetricsPipeline::from_csv(&config.metrics_csv, config.pipeline_config())
        .with_context(|| format!("failed to load metrics from {}", config.metrics_csv.display()))?;

    match cli.command {
        Command::Corpora => {
            for name in pipeline.corpus_names()? {
                println!("{name}");
            }
            Ok(())
        }
        Command::Plays { corpus } => {
            for name in pipeline.play_names(corpus.as_deref())? {
                println!("{name}");
            }
            Ok(())
        }
        Command::Subcorpus { corpus, format } => {
            let rows = pipeline.subcorpus(&corpus)?;
            if rows.height() == 0 {
                warn!(%corpus, "corpus has no plays");
            }
            let rendered = render::frame(&rows)?;
            rendered.emit(format)
        }
        Command::Summary(output) => {
            let filter = output.filter.resolve(&pipeline.bounds()?)?;
            let summaries = pipeline.summarize_by_corpus(&filter)?;
            let rendered = render::corpus_summaries(&summaries)?;
            rendered.emit(output.format)
        }
        Command::Centuries { output, metrics } => {
            let filter = output.filter.resolve(&pipeline.bounds()?)?;
            let metrics: Vec<&str> = if metrics.is_empty() {
                schema::DEFAULT_CENTURY_METRICS.to_vec()
            } else {
                metrics.iter().map(String::as_str).collect()
            };
            let buckets = pipeline.summarize_by_century(&filter, &metrics)?;
            let rendered = render::centuries(&buckets, &metrics)?;
            rendered.emit(output.format)
        }
        Command::Classify(output) => {
            let filter = output.filter.resolve(&pipeline.bounds()?)?;
            let classified = pipeline.classify_and_filter(&filter)?;
            let rendered = render::frame(&classified)?;
            rendered.emit(output.format)
        }
        Command::Network(args) => handle_network(&pipeline, &config, args).await,
    }
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn handle_network(
    pipeline: &CorpusMetricsPipeline,
    config: &DashboardConfig,
    args: NetworkArgs,
) -> Result<()> {
    let client = DracorClient::new(config.api_base.clone(), config.request_timeout())
        .context("failed to build HTTP client")?;

    let networks = match pipeline.fetch_networks(&client, &args.plays).await {
        Ok(networks) => networks,
        Err(err) => {
            // Lookup and retrieval failures are user-facing messages, not crashes.
            println!("{err}");
            return Ok(());
        }
    };

    match args.out {
        Some(dir) => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            for network in &networks {
                let path = dir.join(format!("{}_{}.graphml", network.corpus_name, network.play_name));
                fs::write(&path, &network.graphml)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "wrote play network");
                println!("{}", path.display());
            }
        }
        None => {
            for network in &networks {
                println!("{}", network.graphml);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> FilterBounds {
        FilterBounds {
            corpora: vec!["ger".to_string(), "rus".to_string()],
            segments: InclusiveRange::new(1, 52),
            years: Some(InclusiveRange::new(1772, 1836)),
        }
    }

    #[test]
    fn omitted_filter_flags_fall_back_to_table_bounds() {
        let filter = FilterArgs::default().resolve(&bounds()).unwrap();
        assert_eq!(filter.corpora.len(), 2);
        assert_eq!(filter.segments, InclusiveRange::new(1, 52));
        assert_eq!(filter.years, InclusiveRange::new(1772, 1836));
    }

    #[test]
    fn summary_flags_parse_into_a_filter() {
        let cli = Cli::try_parse_from([
            "dracor",
            "summary",
            "--corpus",
            "ger",
            "--segments",
            "5..40",
            "--years",
            "1700..1799",
            "--format",
            "json",
        ])
        .unwrap();

        let Command::Summary(output) = cli.command else {
            panic!("expected summary command");
        };
        assert_eq!(output.format, OutputFormat::Json);

        let filter = output.filter.resolve(&bounds()).unwrap();
        assert_eq!(filter.corpora.iter().collect::<Vec<_>>(), vec!["ger"]);
        assert_eq!(filter.segments, InclusiveRange::new(5, 40));
        assert_eq!(filter.years, InclusiveRange::new(1700, 1799));
    }

    #[test]
    fn missing_years_without_known_years_is_an_error() {
        let mut bounds = bounds();
        bounds.years = None;
        assert!(FilterArgs::default().resolve(&bounds).is_err());
    }

    #[test]
    fn network_requires_at_least_one_play() {
        assert!(Cli::try_parse_from(["dracor", "network"]).is_err());
    }
}
