//! Snapshot data captured from one page load

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Serialized view of one JavaScript property value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValue {
    /// Result of `typeof`, with `null` reported as "null"
    pub kind: String,

    /// String form of primitive values; objects and functions have none
    pub preview: Option<String>,
}

impl PropertyValue {
    pub fn new(kind: impl Into<String>, preview: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            preview,
        }
    }

    /// Placeholder used when only the property name matters
    pub fn opaque() -> Self {
        Self::new("object", None)
    }
}

/// Property name to value, in the order the page reported them
pub type PropertyMap = IndexMap<String, PropertyValue>;

/// Rendered document size in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSize {
    pub width: u32,
    pub height: u32,
}

/// State captured from one (environment, path) page load.
///
/// Property maps are copied out of the page eagerly, so a snapshot stays
/// valid after the page that produced it is closed.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Identifier of the environment the page was loaded from
    pub environment: String,

    /// Full-page PNG screenshot
    pub screenshot: Vec<u8>,

    /// Scroll width/height of the document element
    pub document: DocumentSize,

    /// Own properties of the page's global object
    pub globals: PropertyMap,

    /// Own properties of the plugin namespace object
    pub plugin: PropertyMap,
}
