//! Scene cataloger.
//!
//! Crawls satellite scene sidecars (local trees, CSV manifests, HTTP/S3 URIs
//! or a STAC search) and writes one raster descriptor per line.

mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use futures::TryStreamExt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::CatalogerConfig;
use output::JsonLinesWriter;
use scene_catalog::product::BuilderKind;
use scene_catalog::{
    all_products, search, CatalogError, CrawlSummary, Crawler, DescriptorAssembler, DiscoveryOptions,
    ItemOutcome, Locator, MetadataReader, PathDiscoverer,
};
use storage::SourceFetcher;

type LocatorIter = Box<dyn Iterator<Item = Result<Locator, CatalogError>> + Send>;

#[derive(Parser, Debug)]
#[command(name = "cataloger")]
#[command(about = "Catalog satellite scene sidecars into raster descriptors")]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "CATALOGER_CONFIG")]
    config: Option<PathBuf>,

    /// Product family (see --list-products)
    #[arg(short, long)]
    product: Option<String>,

    /// Source roots: directories, sidecar files, CSV manifests or URIs
    roots: Vec<String>,

    /// Walk directories recursively
    #[arg(long)]
    recurse: bool,

    /// `;`-separated glob patterns for directory scans
    #[arg(long)]
    filter: Option<String>,

    /// Root directory for MRF cache descriptors
    #[arg(long)]
    cache_root: Option<String>,

    /// Output file for JSON-lines descriptors (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of documents read at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Exit with an error at the first item failure
    #[arg(long)]
    fail_fast: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the known product families and exit
    #[arg(long)]
    list_products: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if args.list_products {
        for product in all_products() {
            println!("{:<20} {}", product.name, product.description);
        }
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => CatalogerConfig::default(),
    };
    apply_args(&mut config, &args);
    let product = config.validate()?;

    info!(
        product = product.name,
        paths = config.paths.len(),
        stac_search = config.stac.is_some(),
        "Starting cataloger"
    );

    let fetcher = Arc::new(
        SourceFetcher::new(config.storage.object_storage(product))
            .context("Failed to create document fetcher")?,
    );

    let mut assembler = DescriptorAssembler::new(product);
    if let Some(cache_root) = &config.cache_root {
        assembler = assembler.with_cache_root(cache_root.clone());
    }

    let mut sources: Vec<LocatorIter> = Vec::new();
    if let Some(stac) = config.stac.as_ref().filter(|_| product.builder == BuilderKind::Stac) {
        if let Some(dict) = &stac.attribute_dict {
            assembler = assembler.with_attribute_dict(dict.clone());
        }
        let features = search::search(fetcher.http(), stac).await?;
        sources.push(Box::new(features.into_iter().map(Ok)));
    }
    if !config.paths.is_empty() {
        let discoverer = PathDiscoverer::new(
            product,
            config.resolved_paths()?,
            DiscoveryOptions {
                recurse: config.recurse,
                filter: config.filter.clone(),
            },
        )?;
        sources.push(Box::new(discoverer));
    }
    let locators = sources.into_iter().flatten();

    let crawler = Crawler::new(MetadataReader::new(product, fetcher.clone()), assembler)
        .with_concurrency(config.concurrency);

    let sink: Box<dyn Write> = match &config.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create output {:?}", path))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = JsonLinesWriter::new(BufWriter::new(sink));

    let mut summary = CrawlSummary::default();
    let mut outcomes = Box::pin(crawler.run(locators)?);
    while let Some(outcome) = outcomes.try_next().await? {
        summary.record(&outcome);
        match outcome {
            ItemOutcome::Built(record) => writer
                .write_record(&record)
                .context("Failed to write descriptor")?,
            ItemOutcome::Failed(failure) if config.fail_fast => {
                error!(
                    locator = %failure.locator,
                    kind = failure.kind().as_str(),
                    error = %failure.error,
                    "Stopping at first failure"
                );
                anyhow::bail!("{}: {}", failure.locator, failure.error);
            }
            ItemOutcome::Failed(_) => {}
        }
    }
    writer.finish().context("Failed to flush output")?;

    report(&summary);
    Ok(())
}

/// Command-line values take precedence over the configuration file.
fn apply_args(config: &mut CatalogerConfig, args: &Args) {
    if let Some(product) = &args.product {
        config.product = Some(product.clone());
    }
    if !args.roots.is_empty() {
        config.paths = args.roots.clone();
    }
    if args.recurse {
        config.recurse = true;
    }
    if let Some(filter) = &args.filter {
        config.filter = Some(filter.clone());
    }
    if let Some(cache_root) = &args.cache_root {
        config.cache_root = Some(cache_root.clone());
    }
    if let Some(output) = &args.output {
        config.output = Some(output.clone());
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if args.fail_fast {
        config.fail_fast = true;
    }
}

fn report(summary: &CrawlSummary) {
    let failed = summary.total_failed();
    if failed > 0 {
        for (kind, count) in &summary.failed {
            warn!(kind = kind.as_str(), count, "Items failed");
        }
    }
    info!(built = summary.built, failed, "Catalog finished");
    eprintln!("built {} descriptor(s), {} failure(s)", summary.built, failed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_override_config() {
        let args = Args::parse_from([
            "cataloger",
            "--product",
            "superview-1",
            "--recurse",
            "--concurrency",
            "8",
            "/data/sv1",
        ]);
        let mut config: CatalogerConfig =
            serde_yaml::from_str("product: datacube-landsat\npaths: [/data/other]\n").unwrap();
        apply_args(&mut config, &args);

        assert_eq!(config.product.as_deref(), Some("superview-1"));
        assert_eq!(config.paths, vec!["/data/sv1".to_string()]);
        assert!(config.recurse);
        assert_eq!(config.concurrency, 8);
        assert!(!config.fail_fast);
    }

    #[test]
    fn test_config_kept_without_args() {
        let args = Args::parse_from(["cataloger"]);
        let mut config: CatalogerConfig =
            serde_yaml::from_str("product: stac\nfail_fast: true\nconcurrency: 2\n").unwrap();
        apply_args(&mut config, &args);

        assert_eq!(config.product.as_deref(), Some("stac"));
        assert!(config.fail_fast);
        assert_eq!(config.concurrency, 2);
    }
}
