//! Parsed sidecar documents.
//!
//! YAML and JSON sidecars share one value model (`serde_json::Value`); XML and
//! DIM sidecars become a small element tree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::Value;

use crate::error::ItemError;
use crate::product::DocumentFormat;

/// A parsed sidecar document.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataDocument {
    Tree(Value),
    Xml(XmlElement),
}

impl MetadataDocument {
    /// Parse raw bytes in the given format.
    pub fn parse(bytes: &[u8], format: DocumentFormat) -> Result<Self, ItemError> {
        match format {
            DocumentFormat::Yaml => serde_yaml::from_slice::<Value>(bytes)
                .map(MetadataDocument::Tree)
                .map_err(|e| ItemError::Parse(format!("YAML: {}", e))),
            DocumentFormat::Json => serde_json::from_slice::<Value>(bytes)
                .map(MetadataDocument::Tree)
                .map_err(|e| ItemError::Parse(format!("JSON: {}", e))),
            DocumentFormat::Xml => XmlElement::parse(bytes).map(MetadataDocument::Xml),
        }
    }

    pub fn as_tree(&self) -> Option<&Value> {
        match self {
            MetadataDocument::Tree(value) => Some(value),
            MetadataDocument::Xml(_) => None,
        }
    }

    pub fn as_xml(&self) -> Option<&XmlElement> {
        match self {
            MetadataDocument::Xml(root) => Some(root),
            MetadataDocument::Tree(_) => None,
        }
    }

    /// Look up a dotted key path in a tree document.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.as_tree().and_then(|tree| lookup(tree, path))
    }

    /// String at a dotted key path, if present and a string.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }
}

/// Follow a dotted key path through nested mappings.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |node, key| node.as_object().and_then(|map| map.get(key)))
        .filter(|v| !v.is_null())
}

/// Numeric value that may have been written as a string.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// One XML element with its text and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse a document and return its root element.
    pub fn parse(bytes: &[u8]) -> Result<Self, ItemError> {
        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => stack.push(Self::from_start(&e)?),
                Ok(Event::Empty(e)) => {
                    let element = Self::from_start(&e)?;
                    Self::attach(&mut stack, &mut root, element);
                }
                Ok(Event::Text(t)) => {
                    let text = t
                        .unescape()
                        .map_err(|e| ItemError::Parse(format!("XML text: {}", e)))?;
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&text);
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| ItemError::Parse("XML: unbalanced end tag".to_string()))?;
                    Self::attach(&mut stack, &mut root, element);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(ItemError::Parse(format!(
                        "XML error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(ItemError::Parse("XML: unclosed elements at end of document".to_string()));
        }
        root.ok_or_else(|| ItemError::Parse("XML: document has no root element".to_string()))
    }

    fn from_start(e: &BytesStart<'_>) -> Result<Self, ItemError> {
        let mut element = XmlElement {
            name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            ..Default::default()
        };
        for attr in e.attributes() {
            let attr = attr.map_err(|e| ItemError::Parse(format!("XML attribute: {}", e)))?;
            let value = attr
                .unescape_value()
                .map_err(|e| ItemError::Parse(format!("XML attribute: {}", e)))?;
            element.attributes.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value.into_owned(),
            ));
        }
        Ok(element)
    }

    fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => {
                if root.is_none() {
                    *root = Some(element);
                }
            }
        }
    }

    /// First descendant matching a `/`-separated path of child names.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self, |node, name| node.children.iter().find(|c| c.name == name))
    }

    /// Trimmed, non-empty text at `path`.
    pub fn text(&self, path: &str) -> Option<&str> {
        self.find(path)
            .map(|e| e.text.trim())
            .filter(|t| !t.is_empty())
    }

    pub fn parse_text<T: std::str::FromStr>(&self, path: &str) -> Option<T> {
        self.text(path).and_then(|t| t.parse().ok())
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Direct children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_lookup() {
        let doc = MetadataDocument::parse(
            b"image:\n  bands:\n    blue:\n      path: B2.tif\nid: abc\n",
            DocumentFormat::Yaml,
        )
        .unwrap();
        assert_eq!(doc.get_str("image.bands.blue.path"), Some("B2.tif"));
        assert_eq!(doc.get_str("id"), Some("abc"));
        assert!(doc.get("image.bands.red").is_none());
    }

    #[test]
    fn test_yaml_null_is_absent() {
        let doc = MetadataDocument::parse(b"product_type: ~\n", DocumentFormat::Yaml).unwrap();
        assert!(doc.get("product_type").is_none());
    }

    #[test]
    fn test_bad_yaml_is_parse_error() {
        let err = MetadataDocument::parse(b"image: [unclosed", DocumentFormat::Yaml).unwrap_err();
        assert!(matches!(err, ItemError::Parse(_)));
    }

    #[test]
    fn test_as_f64_accepts_strings() {
        assert_eq!(as_f64(&serde_json::json!("12.5")), Some(12.5));
        assert_eq!(as_f64(&serde_json::json!(3)), Some(3.0));
        assert_eq!(as_f64(&serde_json::json!([1])), None);
    }

    #[test]
    fn test_xml_tree() {
        let xml = br#"<?xml version="1.0"?>
            <ProductMetaData>
              <Bands>4</Bands>
              <Gain>0.1,0.2</Gain>
              <Data_Access><Data_File><DATA_FILE_PATH href="scene.tif"/></Data_File></Data_Access>
              <Note><![CDATA[a < b]]></Note>
            </ProductMetaData>"#;
        let root = XmlElement::parse(xml).unwrap();
        assert_eq!(root.name, "ProductMetaData");
        assert_eq!(root.parse_text::<u32>("Bands"), Some(4));
        assert_eq!(root.text("Gain"), Some("0.1,0.2"));
        assert_eq!(
            root.find("Data_Access/Data_File/DATA_FILE_PATH")
                .and_then(|e| e.attr("href")),
            Some("scene.tif")
        );
        assert_eq!(root.text("Note"), Some("a < b"));
        assert!(root.text("Missing").is_none());
    }

    #[test]
    fn test_xml_unclosed_is_error() {
        assert!(XmlElement::parse(b"<a><b>text</b>").is_err());
    }
}
