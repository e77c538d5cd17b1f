//! Sitediff comparison engine
//!
//! Loads every configured path in a staging and a production deployment,
//! then compares the pair:
//! - the own property names of the page's global object,
//! - the own property names of a plugin namespace (`jQuery.fn`),
//! - full-page screenshots, pixel by pixel.
//!
//! # Architecture
//!
//! ```text
//! Runner::run
//!   ├── ChromeSession::launch            one browser for the whole run
//!   └── run_session
//!         ├── run_with                   all paths concurrently, isolated failures
//!         │     ├── compare_path         per path
//!         │     │     ├── Capturer::capture  staging ┐ joined before
//!         │     │     ├── Capturer::capture  production ┘ any diffing
//!         │     │     ├── diff_keys      globals, plugin namespace
//!         │     │     └── compare_images writes diff.png
//!         │     └── report::render       as each path completes
//!         └── BrowserSession::close      always, exactly once
//! ```

pub mod browser;
pub mod capture;
pub mod comparator;
pub mod error;
pub mod report;
pub mod runner;
pub mod visual;

pub use browser::{BrowserOptions, ChromeSession};
pub use capture::{BrowserSession, Capturer, RemoteObject};
pub use comparator::{compare_path, PathResult};
pub use error::{E2eError, E2eResult};
pub use runner::{run_session, run_with, PathFailure, RunSummary, Runner};
