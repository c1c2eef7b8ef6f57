//! Path discovery: turn source roots into sidecar locators.
//!
//! Roots are processed lazily and in input order. Each root is one of:
//! - a remote URI (`http`, `https`, `s3`), yielded verbatim
//! - a directory, walked recursively or globbed one level deep
//! - a `.csv` manifest listing paths or URIs
//! - a sidecar document itself
//!
//! Roots that do not exist locally are skipped without error.

use std::collections::VecDeque;
use std::fs::File;
use std::iter;
use std::path::{Path, PathBuf};

use storage::Locator;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{CatalogError, Result};
use crate::product::ProductSpec;

type LocatorIter = Box<dyn Iterator<Item = Result<Locator>> + Send>;

/// Options controlling how local directories are scanned.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Walk the whole subtree instead of one directory level
    pub recurse: bool,
    /// `;`-separated glob patterns; the product default when absent
    pub filter: Option<String>,
}

/// Lazy sequence of sidecar locators drawn from a list of roots.
pub struct PathDiscoverer {
    product: &'static ProductSpec,
    roots: VecDeque<String>,
    recurse: bool,
    patterns: Vec<String>,
    current: Option<LocatorIter>,
}

impl std::fmt::Debug for PathDiscoverer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathDiscoverer")
            .field("product", &self.product.name)
            .field("roots", &self.roots)
            .field("recurse", &self.recurse)
            .field("patterns", &self.patterns)
            .finish()
    }
}

impl PathDiscoverer {
    /// Create a discoverer. Fails on an empty root list or a bad filter.
    pub fn new<I, S>(product: &'static ProductSpec, roots: I, options: DiscoveryOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roots: VecDeque<String> = roots
            .into_iter()
            .map(Into::into)
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if roots.is_empty() {
            return Err(CatalogError::NoRoots);
        }

        let filter = options
            .filter
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(product.default_filter);
        let patterns = parse_filter(filter)?;

        Ok(Self {
            product,
            roots,
            recurse: options.recurse,
            patterns,
            current: None,
        })
    }

    fn open_root(&self, root: &str) -> Option<LocatorIter> {
        if Locator::is_remote_uri(root) {
            return Some(Box::new(iter::once(Ok(Locator::parse(root)))));
        }

        let path = PathBuf::from(root);
        if !path.exists() {
            debug!(root = %root, "Skipping missing root");
            return None;
        }

        if path.is_dir() {
            return Some(if self.recurse {
                walk_tree(self.product, path)
            } else {
                glob_dir(&path, &self.patterns)
            });
        }

        if has_extension(&path, "csv") {
            return Some(read_manifest(self.product, path));
        }

        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if self.product.is_sidecar_name(name) {
            let mut found = vec![Ok(Locator::Local(path.clone()))];
            if let Some(sibling) = paired_sibling(self.product, &path) {
                debug!(sibling = %sibling.display(), "Adding paired sibling");
                found.push(Ok(Locator::Local(sibling)));
            }
            return Some(Box::new(found.into_iter()));
        }

        debug!(root = %root, "Root is not a sidecar, directory or manifest");
        None
    }
}

impl Iterator for PathDiscoverer {
    type Item = Result<Locator>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(current) = self.current.as_mut() {
                if let Some(found) = current.next() {
                    return Some(found);
                }
                self.current = None;
            }

            let root = self.roots.pop_front()?;
            self.current = self.open_root(&root);
        }
    }
}

/// Split and validate a `;`-separated filter.
fn parse_filter(filter: &str) -> Result<Vec<String>> {
    let patterns: Vec<String> = filter
        .split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    if patterns.is_empty() {
        return Err(CatalogError::InvalidFilter {
            pattern: filter.to_string(),
            message: "no patterns".to_string(),
        });
    }
    for pattern in &patterns {
        glob::Pattern::new(pattern).map_err(|e| CatalogError::InvalidFilter {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
    }
    Ok(patterns)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

/// Every sidecar under `root`, in name-sorted traversal order.
fn walk_tree(product: &'static ProductSpec, root: PathBuf) -> LocatorIter {
    Box::new(
        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(move |entry| {
                entry
                    .file_name()
                    .to_str()
                    .map(|name| product.is_sidecar_name(name))
                    .unwrap_or(false)
            })
            .map(|entry| Ok(Locator::Local(entry.into_path()))),
    )
}

/// Files directly inside `dir` matching any pattern, pattern by pattern.
fn glob_dir(dir: &Path, patterns: &[String]) -> LocatorIter {
    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let mut found = Vec::new();

    for pattern in patterns {
        let full = format!("{}/{}", base, pattern);
        match glob::glob(&full) {
            Ok(paths) => {
                for path in paths {
                    match path {
                        Ok(path) if path.is_file() => found.push(Ok(Locator::Local(path))),
                        Ok(_) => {}
                        Err(e) => warn!(error = %e, "Skipping unreadable glob match"),
                    }
                }
            }
            Err(e) => {
                found.push(Err(CatalogError::InvalidFilter {
                    pattern: full.clone(),
                    message: e.to_string(),
                }));
            }
        }
    }

    Box::new(found.into_iter())
}

/// Locators listed in a CSV manifest.
///
/// The value column is the header cell named `raster` (any case); without one
/// the first column is used and the first row is treated as data.
fn read_manifest(product: &'static ProductSpec, path: PathBuf) -> LocatorIter {
    let reader = match csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(&path)
    {
        Ok(reader) => reader,
        Err(source) => return Box::new(iter::once(Err(CatalogError::Manifest { path, source }))),
    };

    let mut records = reader.into_records();
    let first = match records.next() {
        Some(Ok(record)) => record,
        Some(Err(source)) => return Box::new(iter::once(Err(CatalogError::Manifest { path, source }))),
        None => return Box::new(iter::empty()),
    };

    let raster_column = first
        .iter()
        .position(|cell| cell.trim().eq_ignore_ascii_case("raster"));
    let (column, header_row): (usize, Option<csv::StringRecord>) = match raster_column {
        Some(idx) => (idx, None),
        None => (0, Some(first)),
    };
    debug!(manifest = %path.display(), column, "Reading manifest");

    let rows = header_row.map(Ok).into_iter().chain(records);
    Box::new(rows.filter_map(move |row| {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!(error = %e, "Skipping malformed manifest row");
                return None;
            }
        };
        let value = row.get(column)?.trim();
        if value.is_empty() {
            return None;
        }
        if Locator::is_remote_uri(value) {
            return Some(Ok(Locator::parse(value)));
        }

        let local = PathBuf::from(value);
        let name = local.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if product.is_sidecar_name(name) && local.is_file() {
            Some(Ok(Locator::Local(local)))
        } else {
            debug!(value = %value, "Skipping manifest row without a local sidecar");
            None
        }
    }))
}

/// The other half of a MUX/PAN pair, if it exists on disk.
fn paired_sibling(product: &ProductSpec, path: &Path) -> Option<PathBuf> {
    let (a, b) = product.paired_tokens?;
    let name = path.file_name()?.to_str()?;
    let swapped = if name.contains(a) {
        name.replace(a, b)
    } else if name.contains(b) {
        name.replace(b, a)
    } else {
        return None;
    };
    let sibling = path.with_file_name(swapped);
    sibling.is_file().then_some(sibling)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products;

    #[test]
    fn test_empty_roots_rejected() {
        let roots: Vec<String> = Vec::new();
        let result = PathDiscoverer::new(&products::DATACUBE_LANDSAT, roots, DiscoveryOptions::default());
        assert!(matches!(result, Err(CatalogError::NoRoots)));
    }

    #[test]
    fn test_blank_filter_uses_default() {
        let d = PathDiscoverer::new(
            &products::SUPERVIEW,
            ["/nope"],
            DiscoveryOptions {
                recurse: false,
                filter: Some("  ".to_string()),
            },
        )
        .unwrap();
        assert_eq!(d.patterns, vec!["SV*.xml".to_string(), "SW*.dim".to_string()]);
    }

    #[test]
    fn test_bad_filter_rejected() {
        let result = PathDiscoverer::new(
            &products::DATACUBE_LANDSAT,
            ["/tmp"],
            DiscoveryOptions {
                recurse: false,
                filter: Some("[*.yaml".to_string()),
            },
        );
        assert!(matches!(result, Err(CatalogError::InvalidFilter { .. })));
    }

    #[test]
    fn test_remote_roots_verbatim() {
        let found: Vec<Locator> = PathDiscoverer::new(
            &products::DATACUBE_LANDSAT,
            ["s3://bucket/a/doc.yaml", "/no/such/dir", "http://host/b.yaml"],
            DiscoveryOptions::default(),
        )
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();
        assert_eq!(
            found,
            vec![
                Locator::parse("s3://bucket/a/doc.yaml"),
                Locator::parse("http://host/b.yaml"),
            ]
        );
    }
}
