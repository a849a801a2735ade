//! Command-line definition

use auditverse_model::{parse_instant, Collection};
use chrono::{DateTime, Utc};
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

fn parse_at(s: &str) -> Result<DateTime<Utc>, String> {
    parse_instant(s).ok_or_else(|| format!("not an ISO date or timestamp: '{s}'"))
}

fn parse_collection(s: &str) -> Result<Collection, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn input_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Input JSON file")
}

fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_parser(value_parser!(PathBuf))
        .help("Write JSON here instead of stdout")
}

/// The `auditverse` command tree
#[must_use]
pub fn command() -> Command {
    Command::new("auditverse")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reconstruct, export and replay the AuditVerse knowledge graph")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Config file (default: ./auditverse.toml when present)"),
        )
        .subcommand(
            Command::new("inspect")
                .about("Describe a graph, dataset or playback file")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("normalize")
                .about("Convert a denormalized graph to relationship form")
                .arg(input_arg())
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("export")
                .about("Filtered denormalized export with metadata")
                .arg(input_arg())
                .arg(
                    Arg::new("types")
                        .long("types")
                        .value_delimiter(',')
                        .value_parser(parse_collection)
                        .help("Collections to include, e.g. risks,controls"),
                )
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a historical dataset's structure and events")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("replay")
                .about("Reconstruct the graph as of a date")
                .arg(input_arg())
                .arg(
                    Arg::new("at")
                        .long("at")
                        .value_parser(parse_at)
                        .help("Target date; omit for the current state"),
                )
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("play")
                .about("Step through playback snapshots on a timer")
                .arg(input_arg())
                .arg(
                    Arg::new("speed")
                        .long("speed")
                        .value_parser(value_parser!(u64))
                        .help("Milliseconds between steps (default from config)"),
                ),
        )
        .subcommand(
            Command::new("views")
                .about("List preset views or apply one to a graph")
                .arg(
                    Arg::new("list")
                        .long("list")
                        .action(ArgAction::SetTrue)
                        .help("List available views by category"),
                )
                .arg(
                    Arg::new("file")
                        .value_parser(value_parser!(PathBuf))
                        .requires("view")
                        .help("Graph or dataset JSON file"),
                )
                .arg(
                    Arg::new("view")
                        .long("view")
                        .requires("file")
                        .help("View id, e.g. uncontrolled-risks"),
                )
                .arg(output_arg()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn replay_parses_date() {
        let matches = command()
            .try_get_matches_from(["auditverse", "replay", "data.json", "--at", "2024-02-01"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();

        let at = args.get_one::<DateTime<Utc>>("at").unwrap();
        assert_eq!(at.to_rfc3339(), "2024-02-01T00:00:00+00:00");
    }

    #[test]
    fn replay_rejects_bad_date() {
        assert!(command()
            .try_get_matches_from(["auditverse", "replay", "data.json", "--at", "February"])
            .is_err());
    }

    #[test]
    fn export_parses_types() {
        let matches = command()
            .try_get_matches_from(["auditverse", "export", "g.json", "--types", "risks,audits"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();

        let types: Vec<Collection> = args.get_many::<Collection>("types").unwrap().copied().collect();
        assert_eq!(types, vec![Collection::Risks, Collection::Audits]);

        assert!(command()
            .try_get_matches_from(["auditverse", "export", "g.json", "--types", "vendors"])
            .is_err());
    }

    #[test]
    fn config_is_global() {
        let matches = command()
            .try_get_matches_from(["auditverse", "views", "--list", "--config", "my.toml"])
            .unwrap();

        assert_eq!(
            matches.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("my.toml"))
        );
    }
}
