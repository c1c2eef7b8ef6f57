//! Variant expansion: multiply locators by a product's tags.

use storage::Locator;

use crate::document::MetadataDocument;
use crate::error::{CatalogError, ItemError, Result};
use crate::item::CatalogItem;
use crate::product::{ProductSpec, TagSelection};

/// What the expander produced for one step.
#[derive(Debug)]
pub enum Expansion {
    /// A ready item for one (locator, tag) pair.
    Item(CatalogItem),
    /// A locator whose tags depend on its document.
    Deferred(Locator),
    /// A locator the product's tag table does not cover.
    Unmatched(Locator, ItemError),
}

/// Lazy product of locators and tags.
///
/// Each locator is drawn before its first tag and the tag list restarts for
/// every locator, so N locators and T enumerated tags yield exactly N × T
/// items in (locator, tag) order. Discovery errors pass through unchanged.
pub struct VariantExpander<I> {
    product: &'static ProductSpec,
    locators: I,
    current: Option<Locator>,
    next_tag: usize,
}

impl<I> VariantExpander<I>
where
    I: Iterator<Item = Result<Locator>>,
{
    /// Fails only when the product has no templates to expand against.
    pub fn new(product: &'static ProductSpec, locators: I) -> Result<Self> {
        if product.templates.is_empty() {
            return Err(CatalogError::InvalidConfig(format!(
                "product '{}' declares no templates",
                product.name
            )));
        }
        Ok(Self {
            product,
            locators,
            current: None,
            next_tag: 0,
        })
    }

    fn enumerate_next(&mut self) -> Option<Result<Expansion>> {
        if self.current.is_none() || self.next_tag >= self.product.templates.len() {
            match self.locators.next()? {
                Ok(locator) => self.current = Some(locator),
                Err(e) => return Some(Err(e)),
            }
            self.next_tag = 0;
        }

        let template = &self.product.templates[self.next_tag];
        self.next_tag += 1;

        let locator = self.current.clone()?;
        Some(Ok(Expansion::Item(CatalogItem::new(
            self.product,
            locator,
            template.tag,
            template.product_name.map(str::to_string),
        ))))
    }

    fn select_by_name(&self, locator: Locator, select: fn(&str) -> Option<&'static str>) -> Expansion {
        let name = locator.file_name().unwrap_or_default().to_string();
        match select(&name).and_then(|tag| self.product.template(tag)) {
            Some(template) => Expansion::Item(CatalogItem::new(
                self.product,
                locator,
                template.tag,
                template.product_name.map(str::to_string),
            )),
            None => Expansion::Unmatched(
                locator,
                ItemError::NotApplicable(format!("no product matches file name '{}'", name)),
            ),
        }
    }
}

impl<I> Iterator for VariantExpander<I>
where
    I: Iterator<Item = Result<Locator>>,
{
    type Item = Result<Expansion>;

    fn next(&mut self) -> Option<Result<Expansion>> {
        match self.product.selection {
            TagSelection::Enumerate => self.enumerate_next(),
            TagSelection::FileName(select) => Some(
                self.locators
                    .next()?
                    .map(|locator| self.select_by_name(locator, select)),
            ),
            TagSelection::Document(_) => Some(self.locators.next()?.map(Expansion::Deferred)),
        }
    }
}

/// Items for a deferred locator once its document has been read.
pub fn expand_from_document(
    product: &'static ProductSpec,
    locator: &Locator,
    document: &MetadataDocument,
) -> std::result::Result<Vec<CatalogItem>, ItemError> {
    let TagSelection::Document(select) = product.selection else {
        return Err(ItemError::NotApplicable(format!(
            "product '{}' does not select tags from documents",
            product.name
        )));
    };

    let selection = select(document);
    if selection.tags.is_empty() {
        return Err(ItemError::NotApplicable(
            "document declares no recognised variant".to_string(),
        ));
    }

    Ok(selection
        .tags
        .into_iter()
        .map(|tag| CatalogItem::new(product, locator.clone(), tag, selection.product_name.clone()))
        .collect())
}
