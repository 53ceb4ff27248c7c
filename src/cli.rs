//! # Command line surface.
//!
//! Task flags combine freely in one invocation; the execution order is
//! fixed regardless of flag order: `clean`, then `build`, then `zip`, and
//! finally watch mode if requested. With no task flag at all, the binary
//! prints help and exits 0.

use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_CONFIG_PATH;

/// Configurable asset build pipeline for WordPress themes and plugins.
#[derive(Debug, Parser)]
#[command(name = "wpeg", version, about)]
pub struct Cli {
    /// Run the full build pipeline.
    #[arg(short, long)]
    pub build: bool,

    /// Watch source globs and rebuild incrementally (dev mode).
    #[arg(short, long)]
    pub watch: bool,

    /// Package the dist tree into the configured archives.
    #[arg(short, long)]
    pub zip: bool,

    /// Remove the configured clean paths.
    #[arg(long)]
    pub clean: bool,

    /// Path to the configuration file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// A one-shot task selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliTask {
    Clean,
    Build,
    Zip,
}

impl Cli {
    /// Selected one-shot tasks, in execution order.
    pub fn selected(&self) -> Vec<CliTask> {
        let mut tasks = Vec::new();
        if self.clean {
            tasks.push(CliTask::Clean);
        }
        if self.build {
            tasks.push(CliTask::Build);
        }
        if self.zip {
            tasks.push(CliTask::Zip);
        }
        tasks
    }

    /// `true` when at least one task flag (including watch) was given.
    pub fn has_tasks(&self) -> bool {
        self.build || self.watch || self.zip || self.clean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_order_is_fixed() {
        let cli = Cli::parse_from(["wpeg", "--zip", "--build", "--clean"]);
        assert_eq!(
            cli.selected(),
            vec![CliTask::Clean, CliTask::Build, CliTask::Zip]
        );
    }

    #[test]
    fn test_short_flags_combine() {
        let cli = Cli::parse_from(["wpeg", "-b", "-z"]);
        assert!(cli.has_tasks());
        assert!(!cli.watch);
        assert_eq!(cli.selected(), vec![CliTask::Build, CliTask::Zip]);
    }

    #[test]
    fn test_no_flags_selects_nothing() {
        let cli = Cli::parse_from(["wpeg"]);
        assert!(!cli.has_tasks());
        assert!(cli.selected().is_empty());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_watch_alone_counts_as_a_task() {
        let cli = Cli::parse_from(["wpeg", "-w", "--config", "custom.json"]);
        assert!(cli.has_tasks());
        assert!(cli.selected().is_empty());
        assert_eq!(cli.config, PathBuf::from("custom.json"));
    }
}
