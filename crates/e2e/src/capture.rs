//! Page snapshot capture seam and remote property listing

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use sitediff_common::{Environment, PropertyMap, PropertyValue, Snapshot};

use crate::error::{E2eError, E2eResult};

/// Expression naming the page's global object
pub const GLOBAL_OBJECT: &str = "window";

/// Expression naming the plugin namespace whose properties are compared
pub const PLUGIN_NAMESPACE: &str = "jQuery.fn";

/// Reads back the rendered document size
pub const DOCUMENT_SIZE_SCRIPT: &str = "({ width: document.documentElement.scrollWidth, height: document.documentElement.scrollHeight })";

/// Longest primitive preview kept per property
const PREVIEW_LIMIT: usize = 80;

/// Produces one snapshot per (environment, path) page load.
///
/// Implementations write the full-page screenshot to
/// `{output_dir}/{environment.id}.png` as a side effect.
#[async_trait]
pub trait Capturer: Send + Sync {
    async fn capture(
        &self,
        environment: &Environment,
        path: &str,
        output_dir: &Path,
    ) -> E2eResult<Snapshot>;
}

/// A [`Capturer`] that owns a browser process, shut down once at the end of a run
#[async_trait]
pub trait BrowserSession: Capturer + Sized {
    async fn close(self) -> E2eResult<()>;
}

/// Something that can evaluate a script inside a loaded page and return
/// the JSON result by value
#[async_trait]
pub trait Evaluate: Send + Sync {
    async fn evaluate_value(&self, script: &str) -> E2eResult<Value>;
}

/// Reference to an object living inside a page, identified by the
/// expression that resolves it.
///
/// Only valid while the page is open: `list_properties` copies the
/// property names and primitive values out of the page immediately.
pub struct RemoteObject<'p, P: ?Sized> {
    page: &'p P,
    expression: String,
    url: String,
}

impl<'p, P: Evaluate + ?Sized> RemoteObject<'p, P> {
    pub fn new(page: &'p P, expression: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            page,
            expression: expression.into(),
            url: url.into(),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Own property names of the object with serialized values
    pub async fn list_properties(&self) -> E2eResult<PropertyMap> {
        let script = property_listing_script(&self.expression);
        let value = self.page.evaluate_value(&script).await?;

        parse_property_listing(value).ok_or_else(|| E2eError::PropertyAccess {
            expression: self.expression.clone(),
            url: self.url.clone(),
        })
    }
}

/// Script returning `[[name, kind, preview], ...]` for every own property
/// of `expression`, or `null` when it does not resolve to an object.
pub fn property_listing_script(expression: &str) -> String {
    format!(
        r#"(() => {{
  const target = (function () {{ try {{ return ({expression}); }} catch (e) {{ return undefined; }} }})();
  if (target === null || (typeof target !== 'object' && typeof target !== 'function')) {{
    return null;
  }}
  return Object.getOwnPropertyNames(target).map((name) => {{
    let value;
    try {{ value = target[name]; }} catch (e) {{ return [name, 'inaccessible', null]; }}
    const kind = value === null ? 'null' : typeof value;
    const preview = (kind === 'object' || kind === 'function') ? null : String(value).slice(0, {limit});
    return [name, kind, preview];
  }});
}})()"#,
        expression = expression,
        limit = PREVIEW_LIMIT,
    )
}

/// Convert the result of [`property_listing_script`] into a property map.
///
/// `None` when the target was missing or the payload is malformed.
pub fn parse_property_listing(value: Value) -> Option<PropertyMap> {
    let entries: Option<Vec<(String, String, Option<String>)>> = match serde_json::from_value(value) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Malformed property listing: {}", e);
            return None;
        }
    };

    entries.map(|entries| {
        entries
            .into_iter()
            .map(|(name, kind, preview)| (name, PropertyValue::new(kind, preview)))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct CannedPage(Value);

    #[async_trait]
    impl Evaluate for CannedPage {
        async fn evaluate_value(&self, _script: &str) -> E2eResult<Value> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_listing_script_embeds_expression() {
        let script = property_listing_script("jQuery.fn");
        assert!(script.contains("return (jQuery.fn);"));
        assert!(script.contains("Object.getOwnPropertyNames(target)"));
        assert!(script.contains(".slice(0, 80)"));
    }

    #[test]
    fn test_parse_keeps_page_order() {
        let listing = json!([
            ["zIndex", "number", "3"],
            ["alert", "function", null],
            ["name", "string", ""],
        ]);

        let props = parse_property_listing(listing).unwrap();
        let names: Vec<&str> = props.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zIndex", "alert", "name"]);
        assert_eq!(props["zIndex"], PropertyValue::new("number", Some("3".to_string())));
        assert_eq!(props["alert"].preview, None);
    }

    #[test]
    fn test_parse_null_is_missing_target() {
        assert!(parse_property_listing(Value::Null).is_none());
    }

    #[test]
    fn test_parse_rejects_malformed_payload() {
        assert!(parse_property_listing(json!({"not": "a list"})).is_none());
        assert!(parse_property_listing(json!([["only-name"]])).is_none());
    }

    #[test]
    fn test_parse_empty_object() {
        let props = parse_property_listing(json!([])).unwrap();
        assert!(props.is_empty());
    }

    #[tokio::test]
    async fn test_list_properties() {
        let page = CannedPage(json!([["jquery", "string", "3.6.0"], ["each", "function", null]]));
        let object = RemoteObject::new(&page, PLUGIN_NAMESPACE, "https://example.com/a");

        let props = object.list_properties().await.unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(props["jquery"].kind, "string");
        assert_eq!(object.expression(), "jQuery.fn");
    }

    #[tokio::test]
    async fn test_missing_namespace_is_property_access_error() {
        let page = CannedPage(Value::Null);
        let object = RemoteObject::new(&page, PLUGIN_NAMESPACE, "https://example.com/a");

        match object.list_properties().await {
            Err(E2eError::PropertyAccess { expression, url }) => {
                assert_eq!(expression, "jQuery.fn");
                assert_eq!(url, "https://example.com/a");
            }
            other => panic!("expected PropertyAccess, got {:?}", other.map(|p| p.len())),
        }
    }
}
