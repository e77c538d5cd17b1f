//! Run orchestrator: one shared browser, every path compared concurrently

use std::io::Write;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{error, info, warn};

use sitediff_common::RunConfig;

use crate::browser::{BrowserOptions, ChromeSession};
use crate::capture::{BrowserSession, Capturer};
use crate::comparator::compare_path;
use crate::error::{E2eError, E2eResult};
use crate::report;

/// A path whose comparison failed
#[derive(Debug)]
pub struct PathFailure {
    pub path: String,
    pub error: E2eError,
}

/// Outcome of a run, in completion order
#[derive(Debug, Default)]
pub struct RunSummary {
    pub succeeded: Vec<String>,
    pub failed: Vec<PathFailure>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Top-level entry point for a comparison run
pub struct Runner {
    config: RunConfig,
    browser: BrowserOptions,
}

impl Runner {
    pub fn new(config: RunConfig, browser: BrowserOptions) -> Self {
        Self { config, browser }
    }

    /// Launch the browser, compare every path, and close the browser.
    ///
    /// The browser is closed whether or not individual paths failed.
    pub async fn run<W: Write>(&self, out: &mut W) -> E2eResult<RunSummary> {
        self.config.validate()?;

        let session = ChromeSession::launch(&self.browser).await?;
        run_session(&self.config, session, out).await
    }
}

/// Compare every path through an already launched `session`, then close it.
///
/// `session` is closed exactly once, including when the results directory
/// cannot be created.
pub async fn run_session<S, W>(
    config: &RunConfig,
    session: S,
    out: &mut W,
) -> E2eResult<RunSummary>
where
    S: BrowserSession,
    W: Write,
{
    let outcome = async {
        let results_dir = &config.results_dir;
        tokio::fs::create_dir_all(results_dir)
            .await
            .map_err(|e| E2eError::fs(results_dir, e))?;
        Ok::<_, E2eError>(run_with(config, &session, out).await)
    }
    .await;

    if let Err(e) = session.close().await {
        warn!("Browser did not close cleanly: {}", e);
    }

    outcome
}

/// Compare every configured path concurrently through `capturer`.
///
/// Each path is isolated: a failure is recorded and logged without
/// affecting the others. Reports are written as paths complete.
pub async fn run_with<C, W>(config: &RunConfig, capturer: &C, out: &mut W) -> RunSummary
where
    C: Capturer + ?Sized,
    W: Write,
{
    info!("Comparing {} path(s)", config.paths.len());

    let mut pending: FuturesUnordered<_> = config
        .paths
        .iter()
        .map(|path| async move { (path.clone(), compare_path(config, capturer, path).await) })
        .collect();

    let mut summary = RunSummary::default();
    while let Some((path, result)) = pending.next().await {
        match result {
            Ok(result) => {
                if let Err(e) = report::render(out, &result) {
                    warn!(%path, "Failed to write report: {}", e);
                }
                summary.succeeded.push(path);
            }
            Err(e) => {
                error!(%path, "Comparison failed: {}", e);
                summary.failed.push(PathFailure { path, error: e });
            }
        }
    }

    info!(
        "Run complete: {} succeeded, {} failed",
        summary.succeeded.len(),
        summary.failed.len()
    );
    summary
}
