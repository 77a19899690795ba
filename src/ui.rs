//! Terminal output for the CLI.
//!
//! Status lines go to stdout, warnings and errors to stderr. Commands whose
//! stdout is consumed by scripts (`version`) only print the value itself.

use console::style;

use crate::manifest::ManifestRule;
use crate::stamper::StampOutcome;
use crate::warning::BuildWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

pub fn display_warning(warning: &BuildWarning) {
    eprintln!("{} {}", style("⚠").yellow().bold(), warning);
}

/// Show the directives written to the manifest.
pub fn display_manifest(path: &str, rules: &[ManifestRule]) {
    println!("\n{}", style(format!("Manifest {}", path)).bold());
    for rule in rules {
        let line = rule.to_string();
        if rule.is_exclusion() {
            println!("  {}", style(line).red());
        } else {
            println!("  {}", line);
        }
    }
}

pub fn display_stamp_outcome(outcome: &StampOutcome) {
    match outcome {
        StampOutcome::Stamped(path) => {
            display_success(&format!("Stamped installed version in {}", path.display()))
        }
        StampOutcome::Skipped(reason) => {
            display_status(&format!("Installed version left as is ({})", reason))
        }
    }
}
