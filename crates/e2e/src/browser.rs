//! Headless Chrome session shared by every capture in a run

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use sitediff_common::{DocumentSize, Environment, Snapshot};

use crate::capture::{
    BrowserSession, Capturer, Evaluate, RemoteObject, DOCUMENT_SIZE_SCRIPT, GLOBAL_OBJECT,
    PLUGIN_NAMESPACE,
};
use crate::error::{E2eError, E2eResult};

/// Configuration for launching the browser
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Run without a visible window
    pub headless: bool,

    /// Accept invalid or self-signed certificates
    pub ignore_https_errors: bool,

    /// Disable the Chrome sandbox (needed when running as root in containers)
    pub no_sandbox: bool,

    /// Window dimensions; full-page screenshots extend past the height
    pub window_width: u32,
    pub window_height: u32,

    /// Chrome executable, auto-detected when unset
    pub executable: Option<PathBuf>,

    /// Timeout for individual DevTools requests
    pub request_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            ignore_https_errors: true,
            no_sandbox: false,
            window_width: 1280,
            window_height: 720,
            executable: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// One browser process; every capture opens its own page in it
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromeSession {
    /// Launch the browser process
    pub async fn launch(options: &BrowserOptions) -> E2eResult<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(options.window_width, options.window_height)
            .request_timeout(options.request_timeout);

        if !options.headless {
            builder = builder.with_head();
        }
        if options.ignore_https_errors {
            builder = builder.arg("--ignore-certificate-errors");
        }
        if options.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(executable) = &options.executable {
            builder = builder.chrome_executable(executable);
        }

        let config = builder.build().map_err(E2eError::BrowserLaunch)?;

        info!("Launching browser (headless: {})", options.headless);
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| E2eError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
        });

        Ok(Self { browser, handler })
    }

    async fn capture_page(
        page: &Page,
        environment: &Environment,
        url: &str,
        output_dir: &Path,
    ) -> E2eResult<Snapshot> {
        page.goto(url).await.map_err(|e| E2eError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        debug!(env = %environment.id, %url, "Navigation complete");

        let globals = RemoteObject::new(page, GLOBAL_OBJECT, url)
            .list_properties()
            .await?;
        let plugin = RemoteObject::new(page, PLUGIN_NAMESPACE, url)
            .list_properties()
            .await?;

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        let screenshot = page
            .screenshot(params)
            .await
            .map_err(|e| E2eError::Browser(format!("screenshot of {} failed: {}", url, e)))?;

        let screenshot_path = output_dir.join(environment.screenshot_file());
        tokio::fs::write(&screenshot_path, &screenshot)
            .await
            .map_err(|e| E2eError::fs(&screenshot_path, e))?;

        let document: DocumentSize = page
            .evaluate_value(DOCUMENT_SIZE_SCRIPT)
            .await
            .and_then(|value| {
                serde_json::from_value(value).map_err(|e| E2eError::Browser(e.to_string()))
            })?;

        info!(
            env = %environment.id,
            %url,
            globals = globals.len(),
            plugin = plugin.len(),
            "Captured {}x{} document",
            document.width,
            document.height
        );

        Ok(Snapshot {
            environment: environment.id.clone(),
            screenshot,
            document,
            globals,
            plugin,
        })
    }
}

#[async_trait]
impl Evaluate for Page {
    async fn evaluate_value(&self, script: &str) -> E2eResult<Value> {
        let result = self
            .evaluate(script)
            .await
            .map_err(|e| E2eError::Browser(format!("evaluation failed: {}", e)))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }
}

#[async_trait]
impl Capturer for ChromeSession {
    async fn capture(
        &self,
        environment: &Environment,
        path: &str,
        output_dir: &Path,
    ) -> E2eResult<Snapshot> {
        let url = environment.page_url(path);
        debug!(env = %environment.id, %url, "Opening page");

        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| E2eError::Browser(format!("failed to open page: {}", e)))?;

        let result = Self::capture_page(&page, environment, &url, output_dir).await;

        if let Err(e) = page.close().await {
            warn!(env = %environment.id, %url, "Failed to close page: {}", e);
        }

        result
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    /// Close the browser process and stop its event handler
    async fn close(mut self) -> E2eResult<()> {
        info!("Closing browser");

        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| E2eError::Browser(e.to_string()));

        if let Err(e) = self.browser.wait().await {
            warn!("Failed waiting for browser exit: {}", e);
        }
        self.handler.abort();

        closed
    }
}
