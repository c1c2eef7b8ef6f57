//! Catalog items: one locator paired with one variant tag.

use serde_json::{json, Value};
use storage::Locator;

use crate::product::{Naming, ProductSpec};

/// Unit of work handed from the expander to the assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub locator: Locator,
    pub display_name: String,
    pub tag: &'static str,
    pub group_name: String,
    pub product_name: Option<String>,
}

impl CatalogItem {
    /// Build an item, deriving display and group names from the product's
    /// naming policy.
    pub fn new(
        product: &ProductSpec,
        locator: Locator,
        tag: &'static str,
        product_name: Option<String>,
    ) -> Self {
        let (display_name, group_name) = item_names(product.naming, &locator);
        Self {
            locator,
            display_name,
            tag,
            group_name,
            product_name,
        }
    }

    /// The `itemUri` block echoed back in each descriptor.
    pub fn to_json(&self) -> Value {
        let mut uri = json!({
            "path": self.locator.uri(),
            "displayName": self.display_name,
            "tag": self.tag,
            "groupName": self.group_name,
        });
        if let (Some(name), Some(map)) = (&self.product_name, uri.as_object_mut()) {
            map.insert("productName".to_string(), Value::String(name.clone()));
        }
        uri
    }
}

/// Display and group names for a locator under a naming policy.
pub fn item_names(naming: Naming, locator: &Locator) -> (String, String) {
    if let Locator::Embedded(doc) = locator {
        let id = doc
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("item")
            .to_string();
        return (id.clone(), id);
    }

    match naming {
        Naming::ParentDir => {
            let name = locator.parent_name().unwrap_or_default();
            (name.clone(), name)
        }
        Naming::FileStem => {
            let name = locator
                .file_name()
                .map(|name| name.split('.').next().unwrap_or(name).to_string())
                .unwrap_or_default();
            (name.clone(), name)
        }
        Naming::Scene => {
            let display = locator
                .file_name()
                .map(|name| match name.rfind('.') {
                    Some(idx) if idx > 0 => name[..idx].to_string(),
                    _ => name.to_string(),
                })
                .unwrap_or_default();
            (display, locator.parent_name().unwrap_or_default())
        }
    }
}
