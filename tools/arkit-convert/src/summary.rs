//! Console summary of a conversion run.

use mesh_blendshape::{ConversionOutput, ConvertParams, GroupCoverage, MissingReason};
use owo_colors::OwoColorize;

/// Print the banner and resolved locations.
pub fn print_header(params: &ConvertParams) {
    println!();
    println!("{}", "MakeHuman to ARKit Blend Shape Converter".bold());
    println!("{}", "========================================".bold());
    println!();
    println!("{} {}", "Input: ".dimmed(), params.resolve_input_dir().display());
    println!("{} {}", "Output:".dimmed(), params.output_dir.display());
    println!();
}

/// Print generated/missing counts, missing names, and per-group coverage.
pub fn print_summary(output: &ConversionOutput) {
    let report = &output.report;

    println!();
    println!("{}", "=== Summary ===".bold());
    println!("Loaded: {} input shapes", output.inputs_loaded);
    println!(
        "Generated: {}/{} shapes",
        report.generated.len(),
        report.total()
    );
    println!("Missing (need manual creation): {}", report.missing.len());

    if !report.missing.is_empty() {
        println!();
        println!("Missing shapes that need sculpting:");
        for missing in &report.missing {
            match missing.reason {
                MissingReason::Unmapped => println!("  - {}", missing.name),
                MissingReason::NoResolvedSources => {
                    println!("  - {} {}", missing.name, "(inputs not found)".yellow());
                }
            }
        }
    }

    if !report.unresolved.is_empty() {
        println!();
        println!("Unresolved input references:");
        for term in &report.unresolved {
            println!("  - {} <- {}", term.output, term.source.yellow());
        }
    }

    if !report.mirrored.is_empty() {
        println!();
        println!(
            "{}",
            format!(
                "⚠ {} left/right shapes affect both sides (no side filtering)",
                report.mirrored.len()
            )
            .yellow()
        );
    }

    println!();
    println!("{}", "=== Coverage ===".bold());
    for coverage in report.coverage() {
        println!("{}", coverage_line(&coverage));
    }
    println!();

    if report.is_complete() {
        println!("{}", "✓ All shapes generated".green().bold());
    }
}

fn coverage_line(coverage: &GroupCoverage) -> String {
    let counts = format!("{}/{}", coverage.generated, coverage.total);
    let counts = if coverage.missing == 0 {
        counts.green().to_string()
    } else if coverage.generated == 0 {
        counts.red().to_string()
    } else {
        counts.yellow().to_string()
    };

    if coverage.missing == 0 {
        format!("{}: {counts}", coverage.group)
    } else {
        format!(
            "{}: {counts} (need {} sculpted)",
            coverage.group, coverage.missing
        )
    }
}
