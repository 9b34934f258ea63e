//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, LoadReport};
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputFormat, RangeArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::{widget_payload, TreeNodeConvert};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{continents, CountryAggregate, YearRange};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(Commands::Config { command }) => execute_config(cli, command),
        Some(Commands::Tree {
            range,
            format,
            layout,
        }) => cmd_tree(&container(cli)?, range, *format, *layout),
        Some(Commands::Countries { range }) => cmd_countries(&container(cli)?, range),
        Some(Commands::Validate) => cmd_validate(&container(cli)?, cli.verbose),
        Some(Commands::Route { range, base }) => {
            cmd_route(&container(cli)?, range, base.as_deref())
        }
        None => {
            Cli::command()
                .print_help()
                .map_err(|e| InfraError::io("print help", e))?;
            Ok(())
        }
    }
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    Ok(ServiceContainer::new(load_settings(cli)?))
}

/// Settings from config files and env, with `--dataset` on top.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dataset) = &cli.dataset {
        settings.dataset = dataset.clone();
    }
    debug!("dataset: {}", settings.dataset);
    Ok(settings)
}

fn resolve_range(settings: &Settings, range: &RangeArgs) -> CliResult<YearRange> {
    let default = settings.default_range()?;
    range
        .resolve(default)
        .map_err(|e| CliError::InvalidArgs(e.to_string()))
}

fn warn_dropped(report: &LoadReport) {
    if report.dropped() > 0 {
        output::warning(&format!(
            "{} of {} rows dropped (run `aidtree validate -v` for details)",
            report.dropped(),
            report.total()
        ));
    }
}

#[instrument(skip(container))]
fn cmd_tree(
    container: &ServiceContainer,
    range: &RangeArgs,
    format: OutputFormat,
    layout: bool,
) -> CliResult<()> {
    let range = resolve_range(&container.settings, range)?;
    let (service, report) = container.visualize_service()?;
    warn_dropped(&report);

    let published = service
        .visualize(range)?
        .ok_or_else(|| ApplicationError::OperationFailed {
            context: format!("visualize {}", range),
            source: "build superseded by a newer request".into(),
        })?;
    debug!("published {} for {}", published.token, published.range);

    if layout {
        output::info(&widget_payload(&published.tree, &container.settings.layout));
        return Ok(());
    }
    match format {
        OutputFormat::Text => output::info(&published.tree.to_tree_string()),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(published.tree.as_ref())
                .map_err(|e| InfraError::io("serialize tree", e.into()))?;
            output::info(&json);
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_countries(container: &ServiceContainer, range: &RangeArgs) -> CliResult<()> {
    let range = resolve_range(&container.settings, range)?;
    let (service, report) = container.visualize_service()?;
    warn_dropped(&report);

    let builder = container.tree_builder();
    let aggregates = builder.aggregate(service.records(), range);
    let known = continents(service.records());
    let options = builder.options();

    for (label, branch) in [
        (&options.yes_label, &aggregates.yes),
        (&options.no_label, &aggregates.no),
    ] {
        output::header(&format!("{} ({})", label, range));
        for line in branch_lines(branch, &known) {
            output::detail(&line);
        }
    }
    Ok(())
}

/// Aggregates grouped by continent in `continents` order, as in the tree.
fn branch_lines(branch: &[CountryAggregate], continents: &[&str]) -> Vec<String> {
    continents
        .iter()
        .flat_map(|continent| branch.iter().filter(move |a| a.continent == *continent))
        .map(format_aggregate)
        .collect()
}

fn format_aggregate(agg: &CountryAggregate) -> String {
    format!(
        "{} / {}: [{}]",
        agg.continent,
        agg.country,
        agg.years.iter().join(", ")
    )
}

#[instrument(skip(container))]
fn cmd_validate(container: &ServiceContainer, verbose: bool) -> CliResult<()> {
    let (service, report) = container.visualize_service()?;

    output::action("dataset", &container.settings.dataset);
    if report.dropped() == 0 {
        output::success(&report);
    } else {
        output::warning(&report);
        if verbose {
            for (row, reason) in report.dropped_rows() {
                output::failure(&format!("row {}: {}", row, reason));
            }
        }
    }
    output::detail(&format!(
        "continents: {}",
        continents(service.records()).iter().join(", ")
    ));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_route(container: &ServiceContainer, range: &RangeArgs, base: Option<&str>) -> CliResult<()> {
    let range = resolve_range(&container.settings, range)?;
    let base = base.unwrap_or(&container.settings.route_base);
    output::info(&range.route(base));
    Ok(())
}

fn execute_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("cannot determine config directory".into()))?
            } else {
                local_config_path(Path::new("."))
            };
            Settings::write_template(&path)?;
            output::action("Created", &path.display());
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::action("global", &"<unavailable>"),
            }
            let local = cli
                .config
                .clone()
                .unwrap_or_else(|| local_config_path(Path::new(".")));
            output::action("local", &local.display());
        }
    }
    Ok(())
}
