//! Preflight checks module.

mod drive;
mod tmdb;

use crate::models::config::Config;
use crate::Result;
use colored::Colorize;

/// Result of a preflight check.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub success: bool,
    /// Passed, but with reduced functionality.
    pub warning: bool,
    pub message: String,
    pub hint: Option<String>,
}

impl CheckResult {
    pub fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            warning: false,
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn warn(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            warning: true,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    pub fn fail(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            warning: false,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }
}

/// Run all preflight checks.
pub async fn run_preflight_checks(config: &Config) -> Result<Vec<CheckResult>> {
    let mut results = Vec::new();

    // Check Drive
    results.push(drive::check(&config.drive).await);

    // Check TMDB
    results.push(tmdb::check(&config.tmdb).await);

    Ok(results)
}

/// Print preflight check results.
pub fn print_results(results: &[CheckResult]) {
    for result in results {
        let tag = if !result.success {
            "[FAIL]".red()
        } else if result.warning {
            "[WARN]".yellow()
        } else {
            "[OK]".green()
        };

        println!("{} {}: {}", tag, result.name.bold(), result.message);
        if let Some(ref hint) = result.hint {
            println!("  {} {}", "->".yellow(), hint);
        }
    }
}

/// Check if all preflight checks passed.
pub fn all_passed(results: &[CheckResult]) -> bool {
    results.iter().all(|r| r.success)
}
