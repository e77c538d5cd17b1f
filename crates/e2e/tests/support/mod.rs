//! Scripted capturer and image helpers shared by the integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use image::{ImageOutputFormat, Rgba, RgbaImage};
use tokio::sync::Notify;

use sitediff_common::{DocumentSize, Environment, PropertyMap, PropertyValue, RunConfig, Snapshot};
use sitediff_e2e::{BrowserSession, Capturer, E2eError, E2eResult};

pub fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageOutputFormat::Png).unwrap();
    buf.into_inner()
}

pub fn props(names: &[&str]) -> PropertyMap {
    names
        .iter()
        .map(|name| (name.to_string(), PropertyValue::opaque()))
        .collect()
}

pub fn config(results_dir: &Path, paths: &[&str]) -> RunConfig {
    RunConfig {
        results_dir: results_dir.to_path_buf(),
        paths: paths.iter().map(|p| p.to_string()).collect(),
        ..Default::default()
    }
}

/// What one (environment, path) page load should look like
#[derive(Clone)]
pub struct PageScript {
    pub globals: Vec<&'static str>,
    /// `None` when the plugin namespace is absent from the page
    pub plugin: Option<Vec<&'static str>>,
    pub screenshot: Vec<u8>,
    pub fail_navigation: bool,
    pub delay: Option<Duration>,
    pub gate: Option<Arc<Notify>>,
}

impl Default for PageScript {
    fn default() -> Self {
        Self {
            globals: vec!["window", "document"],
            plugin: Some(vec!["jquery", "each"]),
            screenshot: png(16, 16, [255, 255, 255, 255]),
            fail_navigation: false,
            delay: None,
            gate: None,
        }
    }
}

/// Test double for the browser: serves scripted pages and records calls
#[derive(Default)]
pub struct ScriptedCapturer {
    pages: HashMap<(String, String), PageScript>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedCapturer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, env: &str, path: &str, script: PageScript) -> Self {
        self.pages.insert((env.to_string(), path.to_string()), script);
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Capturer for ScriptedCapturer {
    async fn capture(
        &self,
        environment: &Environment,
        path: &str,
        output_dir: &Path,
    ) -> E2eResult<Snapshot> {
        self.calls
            .lock()
            .unwrap()
            .push((environment.id.clone(), path.to_string()));

        let script = self
            .pages
            .get(&(environment.id.clone(), path.to_string()))
            .cloned()
            .unwrap_or_default();
        let url = environment.page_url(path);

        if let Some(gate) = &script.gate {
            gate.notified().await;
        }
        if let Some(delay) = script.delay {
            tokio::time::sleep(delay).await;
        }

        if script.fail_navigation {
            return Err(E2eError::Navigation {
                url,
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }

        let plugin = script.plugin.ok_or_else(|| E2eError::PropertyAccess {
            expression: "jQuery.fn".to_string(),
            url: url.clone(),
        })?;

        let file = output_dir.join(environment.screenshot_file());
        tokio::fs::write(&file, &script.screenshot)
            .await
            .map_err(|e| E2eError::fs(&file, e))?;

        Ok(Snapshot {
            environment: environment.id.clone(),
            screenshot: script.screenshot,
            document: DocumentSize { width: 16, height: 16 },
            globals: props(&script.globals),
            plugin: props(&plugin),
        })
    }
}

/// Stands in for a launched browser: serves scripted pages and counts shutdowns
pub struct ScriptedSession {
    capturer: ScriptedCapturer,
    closes: Arc<AtomicUsize>,
}

impl ScriptedSession {
    /// Returns the session and a handle to its close counter
    pub fn new(capturer: ScriptedCapturer) -> (Self, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        let session = Self {
            capturer,
            closes: closes.clone(),
        };
        (session, closes)
    }
}

#[async_trait]
impl Capturer for ScriptedSession {
    async fn capture(
        &self,
        environment: &Environment,
        path: &str,
        output_dir: &Path,
    ) -> E2eResult<Snapshot> {
        self.capturer.capture(environment, path, output_dir).await
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn close(self) -> E2eResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
