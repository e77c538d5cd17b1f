//! Sitediff CLI - Main Entry Point
//!
//! Compares a staging and a production deployment page by page: global
//! property names, plugin namespace property names and full-page screenshots.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use sitediff_common::{RunConfig, DEFAULT_CONFIG_FILE};
use sitediff_e2e::{BrowserOptions, RunSummary, Runner};

mod output;

/// Exit statuses of the binary
mod exit_codes {
    /// Every path compared
    pub const SUCCESS: i32 = 0;
    /// At least one path failed
    pub const PATH_FAILED: i32 = 1;
    /// The run could not start
    pub const ERROR: i32 = 2;
}

/// Sitediff - staging vs production regression comparison
#[derive(Parser, Debug)]
#[command(name = "sitediff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML); built-in defaults are used when it does not exist
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, env = "SITEDIFF_CONFIG")]
    config: PathBuf,

    /// Results directory
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Path to compare; repeat for several. Replaces the configured paths
    #[arg(short, long = "path")]
    paths: Vec<String>,

    /// Staging base URL
    #[arg(long)]
    staging_url: Option<String>,

    /// Production base URL
    #[arg(long)]
    production_url: Option<String>,

    /// Chrome or Chromium executable
    #[arg(long)]
    chrome: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Disable the Chrome sandbox
    #[arg(long)]
    no_sandbox: bool,

    /// Browser window width
    #[arg(long, default_value = "1280")]
    window_width: u32,

    /// Browser window height
    #[arg(long, default_value = "720")]
    window_height: u32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Load the config file and fold command-line overrides into it
    fn run_config(&self) -> anyhow::Result<RunConfig> {
        let mut config = RunConfig::load(&self.config)
            .with_context(|| format!("loading {}", self.config.display()))?;

        if let Some(dir) = &self.results_dir {
            config.results_dir = dir.clone();
        }
        if !self.paths.is_empty() {
            config.paths = self.paths.clone();
        }
        if let Some(url) = &self.staging_url {
            config.environments.staging.base_url = url.clone();
        }
        if let Some(url) = &self.production_url {
            config.environments.production.base_url = url.clone();
        }

        config.validate()?;
        Ok(config)
    }

    fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            headless: !self.headed,
            no_sandbox: self.no_sandbox,
            window_width: self.window_width,
            window_height: self.window_height,
            executable: self.chrome.clone(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let code = match run(&cli).await {
        Ok(summary) if summary.is_success() => exit_codes::SUCCESS,
        Ok(_) => exit_codes::PATH_FAILED,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            exit_codes::ERROR
        }
    };

    std::process::exit(code);
}

async fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    let config = cli.run_config()?;
    tracing::info!(
        "Comparing {} against {}",
        config.environments.staging.base_url,
        config.environments.production.base_url
    );

    let runner = Runner::new(config, cli.browser_options());
    let mut stdout = std::io::stdout();
    let summary = runner.run(&mut stdout).await?;

    output::print_summary(&summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["sitediff"]).unwrap();
        assert!(cli.paths.is_empty());
        assert!(!cli.headed);

        let options = cli.browser_options();
        assert!(options.headless);
        assert_eq!(options.window_width, 1280);
    }

    #[test]
    fn test_overrides_replace_config() {
        let cli = Cli::try_parse_from([
            "sitediff",
            "--config",
            "/nonexistent/sitediff.toml",
            "--path",
            "news",
            "--path",
            "quotes",
            "--results-dir",
            "out",
            "--staging-url",
            "http://localhost:8081",
        ])
        .unwrap();

        let config = cli.run_config().unwrap();
        assert_eq!(config.paths, vec!["news", "quotes"]);
        assert_eq!(config.results_dir, PathBuf::from("out"));
        assert_eq!(config.environments.staging.page_url("news"), "http://localhost:8081/news");
        assert_eq!(config.environments.production.id, "production");
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let cli = Cli::try_parse_from([
            "sitediff",
            "--config",
            "/nonexistent/sitediff.toml",
            "--production-url",
            "not a url",
        ])
        .unwrap();

        assert!(cli.run_config().is_err());
    }
}
