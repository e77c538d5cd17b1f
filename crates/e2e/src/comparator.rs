//! Per-path comparison of staging against production

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use sitediff_common::{diff_keys, DocumentSize, KeySetDiff, RunConfig};

use crate::capture::Capturer;
use crate::error::{E2eError, E2eResult};
use crate::visual::{self, ImageDiffSummary};

/// File name of the difference image inside a path directory
pub const DIFF_IMAGE_FILE: &str = "diff.png";

/// Combined structural and visual comparison of one path.
///
/// In both key diffs staging is the first side and production the second.
#[derive(Debug, Clone, Serialize)]
pub struct PathResult {
    pub path: String,

    /// Own properties of the global object
    pub global_diff: KeySetDiff,

    /// Own properties of the plugin namespace
    pub plugin_diff: KeySetDiff,

    pub image: ImageDiffSummary,
    pub diff_image_path: PathBuf,

    pub staging_document: DocumentSize,
    pub production_document: DocumentSize,
}

impl PathResult {
    /// No key-set or pixel differences
    pub fn is_identical(&self) -> bool {
        self.global_diff.is_identical() && self.plugin_diff.is_identical() && self.image.is_identical()
    }
}

/// Capture `path` in both environments and compare the pair.
///
/// Both captures are awaited before anything is diffed; if either fails
/// the whole path fails and no result is produced.
pub async fn compare_path<C>(config: &RunConfig, capturer: &C, path: &str) -> E2eResult<PathResult>
where
    C: Capturer + ?Sized,
{
    let output_dir = config.path_dir(path);
    tokio::fs::create_dir_all(&output_dir)
        .await
        .map_err(|e| E2eError::fs(&output_dir, e))?;

    let envs = &config.environments;
    debug!(%path, "Capturing staging and production");

    let (staging, production) = tokio::join!(
        capturer.capture(&envs.staging, path, &output_dir),
        capturer.capture(&envs.production, path, &output_dir)
    );
    let staging = staging?;
    let production = production?;

    let global_diff = diff_keys(&staging.globals, &production.globals);
    let plugin_diff = diff_keys(&staging.plugin, &production.plugin);

    let diff = visual::compare_images_async(staging.screenshot, production.screenshot).await?;
    let encoded = diff.to_png()?;

    let diff_image_path = output_dir.join(DIFF_IMAGE_FILE);
    tokio::fs::write(&diff_image_path, encoded)
        .await
        .map_err(|e| E2eError::fs(&diff_image_path, e))?;

    info!(
        %path,
        staging_only_globals = global_diff.only_in_first.len(),
        production_only_globals = global_diff.only_in_second.len(),
        "{:.2}% of pixels differ",
        diff.summary.mismatch_percent
    );

    Ok(PathResult {
        path: path.to_string(),
        global_diff,
        plugin_diff,
        image: diff.summary,
        diff_image_path,
        staging_document: staging.document,
        production_document: production.document,
    })
}
