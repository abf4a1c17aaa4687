//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Organization performance: recalculate manager scores from their operators
#[derive(Parser, Debug)]
#[command(name = "orgperf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding a local .orgperf.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    /// Flat member records (JSON array)
    #[arg(long, global = true, conflicts_with = "tree", value_hint = ValueHint::FilePath)]
    pub records: Option<PathBuf>,

    /// Pre-built organization tree (JSON)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub tree: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the recalculated hierarchy as a tree
    Tree,

    /// Print the recalculated hierarchy as JSON
    Recalc {
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// List operators with their performance
    Operators,

    /// Show operator and manager result metrics
    Metrics,

    /// Show headcount per team
    Teams,

    /// Classify a performance value
    Status {
        /// Performance in percent
        #[arg(allow_hyphen_values = true)]
        value: i32,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a config template
    Template,
    /// Show config file locations
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_records_and_tree_when_parsing_then_conflicts() {
        let result = Cli::try_parse_from(["orgperf", "--records", "a.json", "--tree", "b.json", "tree"]);
        assert!(result.is_err());
    }

    #[test]
    fn given_global_flags_after_subcommand_when_parsing_then_accepted() {
        let cli = Cli::try_parse_from(["orgperf", "metrics", "-dd", "--records", "a.json"]).unwrap();
        assert_eq!(cli.debug, 2);
        assert_eq!(cli.records, Some(PathBuf::from("a.json")));
        assert!(matches!(cli.command, Some(Commands::Metrics)));
    }

    #[test]
    fn given_negative_value_when_parsing_status_then_accepted() {
        let cli = Cli::try_parse_from(["orgperf", "status", "-5"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Status { value: -5 })));
    }
}
