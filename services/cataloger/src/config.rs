//! Cataloger configuration.
//!
//! Loaded from a YAML file with `${VAR}` / `${VAR:-default}` substitution,
//! then overridden from the command line.

use anyhow::{Context, Result};
use scene_catalog::product::BuilderKind;
use scene_catalog::{product_by_name, ProductSpec, StacSearchConfig};
use serde::Deserialize;
use std::env::VarError;
use std::fs;
use std::path::{Path, PathBuf};
use storage::ObjectStorageConfig;

// ============================================================================
// Configuration types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogerConfig {
    /// Product family name
    pub product: Option<String>,
    /// Source roots: directories, sidecar files, CSV manifests or URIs
    pub paths: Vec<String>,
    pub recurse: bool,
    /// `;`-separated glob patterns; the product default when absent
    pub filter: Option<String>,
    pub cache_root: Option<String>,
    pub storage: StorageSection,
    pub stac: Option<StacSearchConfig>,
    /// JSON-lines output file; stdout when absent
    pub output: Option<PathBuf>,
    /// Locators processed at once
    pub concurrency: usize,
    /// Stop at the first item failure
    pub fail_fast: bool,
}

impl Default for CatalogerConfig {
    fn default() -> Self {
        Self {
            product: None,
            paths: Vec::new(),
            recurse: false,
            filter: None,
            cache_root: None,
            storage: StorageSection::default(),
            stac: None,
            output: None,
            concurrency: 4,
            fail_fast: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub allow_http: bool,
    /// Overrides the product's requester-pays flag
    pub requester_pays: Option<bool>,
}

impl StorageSection {
    pub fn object_storage(&self, product: &ProductSpec) -> ObjectStorageConfig {
        let defaults = ObjectStorageConfig::default();
        ObjectStorageConfig {
            endpoint: self.endpoint.clone(),
            region: self.region.clone().unwrap_or(defaults.region),
            allow_http: self.allow_http,
            requester_pays: self.requester_pays.unwrap_or(product.requester_pays),
            ..defaults
        }
    }
}

// ============================================================================
// Loading and validation
// ============================================================================

/// Load a configuration file with environment variable substitution.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CatalogerConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config from {:?}", path.as_ref()))?;

    let expanded = expand_env_vars(&content)?;

    serde_yaml::from_str(&expanded)
        .with_context(|| format!("Failed to parse config from {:?}", path.as_ref()))
}

impl CatalogerConfig {
    /// Check the merged configuration and resolve its product.
    pub fn validate(&self) -> Result<&'static ProductSpec> {
        let name = self
            .product
            .as_deref()
            .context("No product given (use --product or the `product` key)")?;
        let product = product_by_name(name)?;

        let has_search = product.builder == BuilderKind::Stac && self.stac.is_some();
        anyhow::ensure!(
            !self.paths.is_empty() || has_search,
            "No source paths given for product {}",
            product.name
        );
        anyhow::ensure!(
            self.stac.is_none() || product.builder == BuilderKind::Stac,
            "A STAC search block is only valid for STAC products, not {}",
            product.name
        );
        anyhow::ensure!(self.concurrency > 0, "Concurrency must be greater than 0");

        Ok(product)
    }

    /// Source roots with `~` and environment variables expanded.
    pub fn resolved_paths(&self) -> Result<Vec<String>> {
        self.paths
            .iter()
            .map(|path| {
                shellexpand::full(path)
                    .map(|p| p.into_owned())
                    .with_context(|| format!("Failed to expand path {}", path))
            })
            .collect()
    }
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand `${VAR}` and `${VAR:-default}` in configuration text.
///
/// Unset or empty variables take their default; one without a default is an
/// error.
fn expand_env_vars(content: &str) -> Result<String> {
    let expanded = shellexpand::env_with_context(content, |name| match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(Some(value)),
        Ok(_) | Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(e),
    })
    .context("Failed to expand environment variables")?;

    if let Some(start) = expanded.find("${") {
        let end = expanded[start..]
            .find('}')
            .map(|idx| start + idx + 1)
            .unwrap_or(expanded.len());
        anyhow::bail!("Unresolved variable substitution: {}", &expanded[start..end]);
    }
    Ok(expanded.into_owned())
}
