//! Output formatting for CLI

use colored::Colorize;

use sitediff_e2e::RunSummary;

/// Print the end-of-run summary
pub fn print_summary(summary: &RunSummary) {
    println!();
    if summary.is_success() {
        print_success(&format!("{} path(s) compared", summary.total()));
        return;
    }

    for failure in &summary.failed {
        print_error(&format!("/{}: {}", failure.path, failure.error));
    }
    print_warning(&format!(
        "{} of {} path(s) failed",
        summary.failed.len(),
        summary.total()
    ));
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message.green());
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message.red());
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("⚠️  {}", message.yellow());
}
