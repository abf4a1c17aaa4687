//! Command dispatch

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{LoadedOrganization, Origin};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::CliResult;
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    sample_organization, status_from_performance, team_distribution, Node, ResultsMetrics, Status,
};
use crate::infrastructure::di::{ServiceContainer, SourceOverride};
use crate::infrastructure::InfraError;
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Tree) => cmd_tree(cli),
        Some(Commands::Recalc { compact }) => cmd_recalc(cli, *compact),
        Some(Commands::Operators) => cmd_operators(cli),
        Some(Commands::Metrics) => cmd_metrics(cli),
        Some(Commands::Teams) => cmd_teams(cli),
        Some(Commands::Status { value }) => cmd_status(*value),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            generate(*shell, &mut Cli::command(), "orgperf", &mut io::stdout());
            Ok(())
        }
        None => {
            Cli::command()
                .print_help()
                .map_err(|e| InfraError::io("print help", e))?;
            Ok(())
        }
    }
}

fn config_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.config_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("determine current directory", e).into()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = config_dir(cli)?;
    Ok(Settings::load(Some(dir.as_path()))?)
}

fn source_override(cli: &Cli) -> SourceOverride {
    match (&cli.records, &cli.tree) {
        (Some(path), _) => SourceOverride::Records(path.clone()),
        (None, Some(path)) => SourceOverride::Tree(path.clone()),
        (None, None) => SourceOverride::None,
    }
}

/// Load and recalculate the organization; warn when falling back to the sample.
fn load_organization(cli: &Cli, settings: Settings) -> LoadedOrganization {
    let container = ServiceContainer::new(settings);
    let loaded = container
        .organization_service(&source_override(cli))
        .load(sample_organization());
    if let Origin::Fallback { reason } = &loaded.origin {
        output::warning(&format!("using sample organization: {}", reason));
    }
    debug!("origin: {}", loaded.origin);
    loaded
}

#[instrument(skip_all)]
fn cmd_tree(cli: &Cli) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let loaded = load_organization(cli, settings);
    output::header(&loaded.origin);
    output::info(&loaded.tree.to_tree_string());
    Ok(())
}

#[instrument(skip_all)]
fn cmd_recalc(cli: &Cli, compact: bool) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let loaded = load_organization(cli, settings);
    let json = if compact {
        serde_json::to_string(&loaded.tree)
    } else {
        serde_json::to_string_pretty(&loaded.tree)
    }
    .map_err(|source| InfraError::Serialize {
        context: "organization".to_string(),
        source,
    })?;
    output::info(&json);
    Ok(())
}

#[instrument(skip_all)]
fn cmd_operators(cli: &Cli) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let loaded = load_organization(cli, settings);
    for leaf in loaded.tree.operators() {
        output::info(&format!(
            "{}\t{}\t{}\t{}%\t{}",
            leaf.member.id,
            leaf.member.name,
            leaf.member.team.as_deref().unwrap_or("-"),
            leaf.performance,
            output::status(leaf.status())
        ));
    }
    Ok(())
}

#[instrument(skip_all)]
fn cmd_metrics(cli: &Cli) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let threshold = settings.aggregation.operator_threshold;
    let loaded = load_organization(cli, settings);
    print_metrics(&loaded.tree, threshold);
    Ok(())
}

fn print_metrics(tree: &Node, operator_threshold: i32) {
    let m = ResultsMetrics::from_tree(tree, operator_threshold);

    output::header("Operators");
    output::field(
        "on target",
        &format!(
            "{:.1}% ({} of {})",
            m.operator_success_rate(),
            m.operators_on_target,
            m.operators
        ),
    );
    output::field(
        "achieved / target",
        &format!("{} / {}", m.total_achieved, m.total_target),
    );

    output::header("Managers");
    output::field(
        "at 100%",
        &format!(
            "{:.1}% ({} of {})",
            m.manager_success_rate(),
            m.managers_at_full,
            m.managers
        ),
    );

    output::header("Status");
    output::detail(&format!(
        "{} {}, {} {}, {} {} ({} members)",
        m.success,
        output::status(Status::Success),
        m.warning,
        output::status(Status::Warning),
        m.danger,
        output::status(Status::Danger),
        m.total_members
    ));
}

#[instrument(skip_all)]
fn cmd_teams(cli: &Cli) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let loaded = load_organization(cli, settings);
    for share in team_distribution(&loaded.tree) {
        output::info(&format!(
            "{}\t{}\t{:.1}%",
            share.team, share.count, share.percentage
        ));
    }
    Ok(())
}

fn cmd_status(value: i32) -> CliResult<()> {
    output::info(&output::status(status_from_performance(value)));
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::field("global", &path.display()),
                None => output::field("global", "unavailable"),
            }
            let dir = config_dir(cli)?;
            output::field("local", &local_config_path(&dir).display());
        }
    }
    Ok(())
}
