//! Console report for a compared path

use std::io::{self, Write};

use colored::Colorize;

use sitediff_common::KeySetDiff;

use crate::capture::{GLOBAL_OBJECT, PLUGIN_NAMESPACE};
use crate::comparator::PathResult;

/// Write the global section, the plugin section and the visual summary
pub fn render<W: Write>(out: &mut W, result: &PathResult) -> io::Result<()> {
    render_key_section(out, &result.path, GLOBAL_OBJECT, &result.global_diff)?;
    render_key_section(out, &result.path, PLUGIN_NAMESPACE, &result.plugin_diff)?;
    render_visual_summary(out, result)?;
    out.flush()
}

/// One labelled key-set section. `diff` has staging as its first side.
pub fn render_key_section<W: Write>(
    out: &mut W,
    path: &str,
    label: &str,
    diff: &KeySetDiff,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", format!("/{}", path).bright_magenta().underline())?;
    writeln!(out, "  {}:", label.green().bold())?;

    writeln!(out, "    {}", "only in production:".green().underline())?;
    for key in &diff.only_in_second {
        writeln!(out, "      {}", key.bright_red())?;
    }

    writeln!(out, "    {}", "only in staging:".green().underline())?;
    for key in &diff.only_in_first {
        writeln!(out, "      {}", key.bright_yellow())?;
    }

    Ok(())
}

fn render_visual_summary<W: Write>(out: &mut W, result: &PathResult) -> io::Result<()> {
    let image = &result.image;
    let percent = format!("{:.2}% of pixels differ", image.mismatch_percent);
    let percent = if image.diff_pixels == 0 {
        percent.green()
    } else {
        percent.bright_red()
    };

    writeln!(
        out,
        "  {}: {} (staging {}x{}, production {}x{})",
        "screenshot".green().bold(),
        percent,
        result.staging_document.width,
        result.staging_document.height,
        result.production_document.width,
        result.production_document.height,
    )?;

    if let Some(bounds) = image.diff_bounds {
        writeln!(
            out,
            "    changed region: ({}, {}) to ({}, {})",
            bounds.left, bounds.top, bounds.right, bounds.bottom
        )?;
    }

    writeln!(out, "    diff image: {}", result.diff_image_path.display())
}
