//! Browser-backed smoke test
//!
//! Needs Chrome or Chromium on PATH and network access. Run with:
//! cargo test --package sitediff-e2e --test browser_smoke -- --ignored

use tempfile::TempDir;

use sitediff_common::{Environment, Environments, RunConfig};
use sitediff_e2e::{BrowserOptions, E2eError, Runner};

#[tokio::test]
#[ignore]
async fn page_without_plugin_namespace_fails_in_isolation() {
    let tmp = TempDir::new().expect("create temp dir");
    let config = RunConfig {
        results_dir: tmp.path().join("results"),
        environments: Environments {
            staging: Environment::new("staging", "staging", "https://example.com"),
            production: Environment::new("production", "production", "https://example.org"),
        },
        paths: vec!["index.html".to_string()],
    };

    let runner = Runner::new(
        config,
        BrowserOptions {
            no_sandbox: true,
            ..Default::default()
        },
    );

    let mut out = Vec::new();
    let summary = runner.run(&mut out).await.expect("browser should launch");

    // example.com never loads jQuery, and the namespace is read before the screenshot
    assert_eq!(summary.failed.len(), 1);
    assert!(matches!(summary.failed[0].error, E2eError::PropertyAccess { .. }));
    let path_dir = tmp.path().join("results/index.html");
    assert!(!path_dir.join("staging.png").exists());
    assert!(!path_dir.join("production.png").exists());
    assert!(!path_dir.join("diff.png").exists());
}
