//! Console output for provisioning runs.

use std::time::Duration;

use buildenv_core::Reporter;
use buildenv_schema::{LibraryId, Version};
use crossterm::style::Stylize;

const NAME_WIDTH: usize = 20;
const VERSION_WIDTH: usize = 12;

/// Prints one line per library event to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    fn row(&self, name: &LibraryId, version: &Version, status: &str) {
        if self.quiet {
            return;
        }
        let name = format!("{:<NAME_WIDTH$}", name.as_str());
        let version = format!("{:<VERSION_WIDTH$}", version.as_str());
        println!("  {} {} {status}", name.cyan(), version.dark_grey());
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, title: &str) {
        if !self.quiet {
            println!();
            println!("{}", title.bold());
        }
    }

    fn unavailable(&self, name: &LibraryId, version: &Version, reason: &str) {
        self.row(name, version, &format!("unavailable ({reason})").yellow().to_string());
    }

    fn no_match(&self, name: &LibraryId, version: &Version) {
        self.row(name, version, &"no matching build".yellow().to_string());
    }

    fn downloading(&self, name: &LibraryId, version: &Version, url: &str) {
        self.row(name, version, &format!("fetching {url}").dark_grey().to_string());
    }

    fn done(&self, name: &LibraryId, version: &Version, elapsed: Duration) {
        self.row(
            name,
            version,
            &format!("done in {:.2}s", elapsed.as_secs_f64())
                .green()
                .to_string(),
        );
    }

    fn failed(&self, name: &LibraryId, version: &Version, reason: &str) {
        // Failures are shown even in quiet mode
        let name = format!("{:<NAME_WIDTH$}", name.as_str());
        let version = format!("{:<VERSION_WIDTH$}", version.as_str());
        eprintln!("  {} {version} {}", name.red(), reason.red());
    }

    fn summary(&self, count: usize, elapsed_secs: f64) {
        if self.quiet {
            return;
        }
        let noun = if count == 1 { "library" } else { "libraries" };
        println!();
        println!(
            "{}",
            format!("Provisioned {count} {noun} in {elapsed_secs:.2}s").green()
        );
    }
}
