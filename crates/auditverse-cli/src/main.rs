use anyhow::{Context, Result};
use auditverse_cli::cli::command;
use auditverse_cli::commands::{self, read_json, write_json};
use auditverse_cli::{logging, ViewerConfig};
use auditverse_model::Collection;
use auditverse_views::{ViewContext, ViewRegistry};
use chrono::{DateTime, Utc};
use clap::ArgMatches;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};

fn input(args: &ArgMatches) -> Result<serde_json::Value> {
    let path = args
        .get_one::<PathBuf>("file")
        .context("missing input file")?;
    read_json(path)
}

fn output(args: &ArgMatches) -> Option<&PathBuf> {
    args.get_one::<PathBuf>("output")
}

async fn run(matches: ArgMatches, config: ViewerConfig) -> Result<ExitCode> {
    match matches.subcommand() {
        Some(("inspect", args)) => {
            let report = commands::inspect(&input(args)?)?;
            write_json(&report, None)?;
        }
        Some(("normalize", args)) => {
            let graph = commands::load_graph(&input(args)?)?;
            write_json(&graph, output(args).map(PathBuf::as_path))?;
        }
        Some(("export", args)) => {
            let types: Option<Vec<Collection>> =
                args.get_many::<Collection>("types").map(|t| t.copied().collect());
            let exported = commands::export(
                &input(args)?,
                types.as_deref(),
                config.export.max_rows,
                Utc::now(),
            )?;
            write_json(&exported, output(args).map(PathBuf::as_path))?;
        }
        Some(("validate", args)) => {
            let summary = commands::validate(&input(args)?)?;
            write_json(&summary, None)?;
            if !summary.is_valid() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Some(("replay", args)) => {
            let at = args.get_one::<DateTime<Utc>>("at").copied();
            let state = commands::replay(input(args)?, at)?;
            write_json(&*state, output(args).map(PathBuf::as_path))?;
        }
        Some(("play", args)) => {
            let speed = args
                .get_one::<u64>("speed")
                .copied()
                .unwrap_or(config.playback.speed_ms);
            let play_input = commands::play_input(&input(args)?)?;
            commands::play(play_input, speed, &mut std::io::stdout()).await?;
        }
        Some(("views", args)) => {
            let registry = ViewRegistry::with_defaults();
            match args.get_one::<String>("view") {
                Some(id) if !args.get_flag("list") => {
                    let ctx = ViewContext::default()
                        .with_threshold(config.views.high_residual_threshold)
                        .with_audit_recency(config.views.audit_recency_months);
                    let result = commands::apply_view(&registry, &input(args)?, id, &ctx)?;
                    write_json(&result, output(args).map(PathBuf::as_path))?;
                }
                _ => write_json(&registry.by_category(), None)?,
            }
        }
        _ => {}
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = command().get_matches();

    let config_path = matches.get_one::<PathBuf>("config").cloned();
    let mut config = match ViewerConfig::discover(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let warnings = config.validate();
    logging::init(&config.logging);
    for warning in warnings {
        warn!("{warning}");
    }

    match run(matches, config).await {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
