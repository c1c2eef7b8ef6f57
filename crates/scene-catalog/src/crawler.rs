//! Crawl driver: discovery, expansion, reading and assembly as one stream.

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use storage::Locator;
use tracing::{debug, info, warn};

use crate::assemble::DescriptorAssembler;
use crate::error::{FailureKind, ItemError, Result};
use crate::expand::{expand_from_document, Expansion, VariantExpander};
use crate::item::CatalogItem;
use crate::reader::{MetadataReader, SourceDocument};
use crate::record::OutputRecord;

/// Result of processing one catalog item.
#[derive(Debug)]
pub enum ItemOutcome {
    Built(Box<OutputRecord>),
    Failed(ItemFailure),
}

/// A dropped item and why.
#[derive(Debug)]
pub struct ItemFailure {
    pub locator: String,
    /// Tags lost with this failure; empty when none could be chosen
    pub tags: Vec<&'static str>,
    pub error: ItemError,
}

impl ItemFailure {
    pub fn kind(&self) -> FailureKind {
        self.error.kind()
    }
}

/// Counts of built and failed catalog items for one run.
///
/// The unit is one (locator, tag) item. A fetch or parse failure drops every
/// tag of its locator and counts once per tag; a failure lost before any tag
/// was chosen counts as one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub built: usize,
    pub failed: BTreeMap<FailureKind, usize>,
}

impl CrawlSummary {
    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Built(_) => self.built += 1,
            ItemOutcome::Failed(failure) => {
                *self.failed.entry(failure.kind()).or_default() += failure.tags.len().max(1)
            }
        }
    }

    pub fn total_failed(&self) -> usize {
        self.failed.values().sum()
    }
}

/// Everything a collected run produced, in discovery order.
#[derive(Debug, Default)]
pub struct CrawlReport {
    pub outcomes: Vec<ItemOutcome>,
    pub summary: CrawlSummary,
}

impl CrawlReport {
    pub fn records(&self) -> impl Iterator<Item = &OutputRecord> {
        self.outcomes.iter().filter_map(|o| match o {
            ItemOutcome::Built(record) => Some(record.as_ref()),
            ItemOutcome::Failed(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemFailure> {
        self.outcomes.iter().filter_map(|o| match o {
            ItemOutcome::Failed(failure) => Some(failure),
            ItemOutcome::Built(_) => None,
        })
    }
}

/// Work for one locator: its document is read once for all of its items.
enum WorkUnit {
    Items(Locator, Vec<CatalogItem>),
    Deferred(Locator),
    Unmatched(Locator, ItemError),
}

/// Groups consecutive expander items that share a locator.
struct WorkUnits<I: Iterator> {
    expansions: Peekable<I>,
}

impl<I> Iterator for WorkUnits<I>
where
    I: Iterator<Item = Result<Expansion>>,
{
    type Item = Result<WorkUnit>;

    fn next(&mut self) -> Option<Result<WorkUnit>> {
        let first = match self.expansions.next()? {
            Ok(expansion) => expansion,
            Err(e) => return Some(Err(e)),
        };
        let item = match first {
            Expansion::Item(item) => item,
            Expansion::Deferred(locator) => return Some(Ok(WorkUnit::Deferred(locator))),
            Expansion::Unmatched(locator, err) => return Some(Ok(WorkUnit::Unmatched(locator, err))),
        };

        let locator = item.locator.clone();
        let mut items = vec![item];
        while let Some(Ok(Expansion::Item(next))) = self.expansions.peek() {
            if next.locator != locator {
                break;
            }
            if let Some(Ok(Expansion::Item(next))) = self.expansions.next() {
                items.push(next);
            }
        }
        Some(Ok(WorkUnit::Items(locator, items)))
    }
}

/// Drives one product's pipeline over a locator sequence.
#[derive(Clone)]
pub struct Crawler {
    reader: MetadataReader,
    assembler: Arc<DescriptorAssembler>,
    concurrency: usize,
}

impl Crawler {
    pub fn new(reader: MetadataReader, assembler: DescriptorAssembler) -> Self {
        Self {
            reader,
            assembler: Arc::new(assembler),
            concurrency: 1,
        }
    }

    /// Locators processed at once; output order is unaffected.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Stream every item outcome in discovery order.
    ///
    /// A discovery error is yielded as `Err` and should end the run; per-item
    /// failures arrive as [`ItemOutcome::Failed`].
    pub fn run<'a, I>(&'a self, locators: I) -> Result<impl Stream<Item = Result<ItemOutcome>> + 'a>
    where
        I: Iterator<Item = Result<Locator>> + Send + 'a,
    {
        let product = self.assembler.product();
        let units = WorkUnits {
            expansions: VariantExpander::new(product, locators)?.peekable(),
        };
        info!(product = product.name, concurrency = self.concurrency, "Starting crawl");

        Ok(stream::iter(units)
            .map(move |unit| async move {
                match unit {
                    Ok(unit) => Ok(self.process(unit).await),
                    Err(e) => Err(e),
                }
            })
            .buffered(self.concurrency)
            .flat_map(|batch| {
                let outcomes: Vec<Result<ItemOutcome>> = match batch {
                    Ok(outcomes) => outcomes.into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(e)],
                };
                stream::iter(outcomes)
            }))
    }

    /// Run to completion, stopping at the first discovery error.
    pub async fn collect<I>(&self, locators: I) -> Result<CrawlReport>
    where
        I: Iterator<Item = Result<Locator>> + Send,
    {
        let mut report = CrawlReport::default();
        let mut outcomes = Box::pin(self.run(locators)?);
        while let Some(outcome) = outcomes.try_next().await? {
            report.summary.record(&outcome);
            report.outcomes.push(outcome);
        }
        info!(
            built = report.summary.built,
            failed = report.summary.total_failed(),
            "Crawl finished"
        );
        Ok(report)
    }

    async fn process(&self, unit: WorkUnit) -> Vec<ItemOutcome> {
        match unit {
            WorkUnit::Unmatched(locator, error) => vec![failed(&locator, Vec::new(), error)],
            WorkUnit::Items(locator, items) => match self.reader.read(&locator).await {
                Ok(source) => self.build_all(&items, &source),
                Err(error) => {
                    let tags = items.iter().map(|item| item.tag).collect();
                    vec![failed(&locator, tags, error)]
                }
            },
            WorkUnit::Deferred(locator) => {
                let source = match self.reader.read(&locator).await {
                    Ok(source) => source,
                    Err(error) => return vec![failed(&locator, Vec::new(), error)],
                };
                match expand_from_document(self.assembler.product(), &locator, &source.document) {
                    Ok(items) => {
                        debug!(locator = %locator, count = items.len(), "Selected tags from document");
                        self.build_all(&items, &source)
                    }
                    Err(error) => vec![failed(&locator, Vec::new(), error)],
                }
            }
        }
    }

    fn build_all(&self, items: &[CatalogItem], source: &SourceDocument) -> Vec<ItemOutcome> {
        items
            .iter()
            .map(|item| match self.assembler.build(item, source) {
                Ok(record) => ItemOutcome::Built(Box::new(record)),
                Err(error) => failed(&item.locator, vec![item.tag], error),
            })
            .collect()
    }
}

fn failed(locator: &Locator, tags: Vec<&'static str>, error: ItemError) -> ItemOutcome {
    warn!(
        locator = %locator,
        tags = ?tags,
        kind = error.kind().as_str(),
        error = %error,
        "Dropping item"
    );
    ItemOutcome::Failed(ItemFailure {
        locator: locator.uri(),
        tags,
        error,
    })
}
