//! References to a single sidecar document.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a sidecar document lives.
#[derive(Debug, Clone, PartialEq)]
pub enum Locator {
    /// A file on the local filesystem.
    Local(PathBuf),
    /// An `http://` or `https://` URL, kept verbatim.
    Http(String),
    /// An `s3://bucket/key` object.
    S3 { bucket: String, key: String },
    /// A document already held in memory, e.g. an item returned by a search.
    Embedded(Arc<serde_json::Value>),
}

impl Locator {
    /// Classify a root or manifest value.
    ///
    /// Anything without a remote scheme is treated as a local path. An `s3://`
    /// URI without a key keeps an empty key and fails at fetch time.
    pub fn parse(value: &str) -> Self {
        if let Some(rest) = value.strip_prefix("s3://") {
            let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
            return Locator::S3 {
                bucket: bucket.to_string(),
                key: key.to_string(),
            };
        }
        if Self::is_http(value) {
            return Locator::Http(value.to_string());
        }
        Locator::Local(PathBuf::from(value))
    }

    fn is_http(value: &str) -> bool {
        value.starts_with("http://") || value.starts_with("https://")
    }

    /// Whether a raw string names a remote document.
    pub fn is_remote_uri(value: &str) -> bool {
        Self::is_http(value) || value.starts_with("s3://")
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Locator::Http(_) | Locator::S3 { .. })
    }

    /// Final path segment of the document reference.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Locator::Local(path) => path.file_name().and_then(|n| n.to_str()),
            Locator::Http(url) => url.rsplit('/').next().filter(|s| !s.is_empty()),
            Locator::S3 { key, .. } => key.rsplit('/').next().filter(|s| !s.is_empty()),
            Locator::Embedded(_) => None,
        }
    }

    /// Lower-cased extension of the document name, without the dot.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name()?;
        let (_, ext) = name.rsplit_once('.')?;
        Some(ext.to_ascii_lowercase())
    }

    /// Directory holding a local document.
    pub fn local_dir(&self) -> Option<&Path> {
        match self {
            Locator::Local(path) => path.parent(),
            _ => None,
        }
    }

    /// Name of the directory containing the document.
    pub fn parent_name(&self) -> Option<String> {
        match self {
            Locator::Local(path) => path
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .map(str::to_string),
            Locator::Http(_) | Locator::S3 { .. } => {
                let uri = self.uri();
                let (dir, _) = uri.rsplit_once('/')?;
                dir.rsplit('/').next().filter(|s| !s.is_empty()).map(str::to_string)
            }
            Locator::Embedded(_) => None,
        }
    }

    /// A document in the same directory, addressed the same way.
    pub fn sibling(&self, name: &str) -> Option<Locator> {
        match self {
            Locator::Local(path) => Some(Locator::Local(path.with_file_name(name))),
            Locator::Http(url) => {
                let (dir, _) = url.rsplit_once('/')?;
                Some(Locator::Http(format!("{}/{}", dir, name)))
            }
            Locator::S3 { bucket, key } => {
                let key = match key.rsplit_once('/') {
                    Some((dir, _)) => format!("{}/{}", dir, name),
                    None => name.to_string(),
                };
                Some(Locator::S3 {
                    bucket: bucket.clone(),
                    key,
                })
            }
            Locator::Embedded(_) => None,
        }
    }

    /// The same document name with its last extension replaced.
    pub fn with_extension(&self, ext: &str) -> Option<Locator> {
        let name = self.file_name()?;
        let stem = match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        };
        self.sibling(&format!("{}.{}", stem, ext))
    }

    /// String form of the reference as it would appear in a manifest.
    pub fn uri(&self) -> String {
        match self {
            Locator::Local(path) => path.to_string_lossy().into_owned(),
            Locator::Http(url) => url.clone(),
            Locator::S3 { bucket, key } => format!("s3://{}/{}", bucket, key),
            Locator::Embedded(doc) => match doc.get("id").and_then(|v| v.as_str()) {
                Some(id) => format!("embedded:{}", id),
                None => "embedded".to_string(),
            },
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_s3() {
        let loc = Locator::parse("s3://dea-public-data/L2/sceneA.yaml");
        assert_eq!(
            loc,
            Locator::S3 {
                bucket: "dea-public-data".to_string(),
                key: "L2/sceneA.yaml".to_string()
            }
        );
        assert_eq!(loc.uri(), "s3://dea-public-data/L2/sceneA.yaml");
        assert!(loc.is_remote());
    }

    #[test]
    fn test_parse_s3_without_key() {
        let loc = Locator::parse("s3://bucket");
        assert_eq!(
            loc,
            Locator::S3 {
                bucket: "bucket".to_string(),
                key: String::new()
            }
        );
        assert_eq!(loc.file_name(), None);
    }

    #[test]
    fn test_parse_http_and_local() {
        assert!(matches!(
            Locator::parse("https://example.com/a/b.yaml"),
            Locator::Http(_)
        ));
        assert!(matches!(Locator::parse("/data/b.yaml"), Locator::Local(_)));
        assert!(matches!(Locator::parse("s3data/b.yaml"), Locator::Local(_)));
    }

    #[test]
    fn test_file_name_and_extension() {
        let loc = Locator::parse("http://host/dir/scene.odc-metadata.YAML");
        assert_eq!(loc.file_name(), Some("scene.odc-metadata.YAML"));
        assert_eq!(loc.extension().as_deref(), Some("yaml"));
    }

    #[test]
    fn test_parent_name() {
        assert_eq!(
            Locator::parse("/data/S2A_T55HFA/ARD-METADATA.yaml").parent_name().as_deref(),
            Some("S2A_T55HFA")
        );
        assert_eq!(
            Locator::parse("s3://bucket/a/S2B_T56/ARD-METADATA.yaml")
                .parent_name()
                .as_deref(),
            Some("S2B_T56")
        );
    }

    #[test]
    fn test_siblings() {
        let local = Locator::parse("/data/SV1_MUX.xml");
        assert_eq!(local.with_extension("rpb"), Some(Locator::parse("/data/SV1_MUX.rpb")));

        let http = Locator::parse("https://host/a/SV1_MUX.xml");
        assert_eq!(
            http.sibling("scene.tif").map(|l| l.uri()).as_deref(),
            Some("https://host/a/scene.tif")
        );

        let s3 = Locator::parse("s3://bucket/doc.dim");
        assert_eq!(s3.with_extension("rpb").map(|l| l.uri()).as_deref(), Some("s3://bucket/doc.rpb"));

        let embedded = Locator::Embedded(Arc::new(serde_json::json!({})));
        assert!(embedded.sibling("x").is_none());
    }

    #[test]
    fn test_embedded_uri_uses_id() {
        let doc = serde_json::json!({"id": "LC08_X", "type": "Feature"});
        assert_eq!(Locator::Embedded(Arc::new(doc)).uri(), "embedded:LC08_X");
    }
}
