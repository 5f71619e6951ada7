// Command line interface parsing
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use clap::builder::PossibleValuesParser;
use clap::{
    crate_description,
    crate_name,
    crate_version,
    value_parser,
    Arg,
    ArgAction,
    ArgMatches,
    Command,
};
use crate::common::{
    CONFIG_ENV_VAR,
    DEFAULT_CONCURRENCY,
    DEFAULT_MAX_ATTEMPTS,
    DEFAULT_TIMEOUT,
};
use tracing::debug;

// Default unit if one isn't provided on the command line
const DEFAULT_UNIT: &str = "byte";

// This should match the string values in the SizeUnit FromStr impl
const VALID_UNITS: &[&str] = &[
    "byte",
    "kb",
    "mb",
    "gb",
    "tb",
];

// Size unit argument shared by the table and details subcommands.
fn unit_arg() -> Arg {
    Arg::new("UNIT")
        .long("unit")
        .short('u')
        .value_name("UNIT")
        .help("Unit to report bucket sizes in")
        .default_value(DEFAULT_UNIT)
        .ignore_case(true)
        .value_parser(PossibleValuesParser::new(VALID_UNITS))
}

fn refresh_arg() -> Arg {
    Arg::new("REFRESH")
        .long("refresh")
        .action(ArgAction::SetTrue)
        .help("Recalculate every bucket instead of using cached metrics")
}

// Create clap app
fn create_app() -> Command {
    debug!("Creating CLI app");

    Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("CONFIG")
                .env(CONFIG_ENV_VAR)
                .long("config")
                .short('c')
                .value_name("PATH")
                .help("Path to the JSON credentials file")
                .global(true)
                .value_parser(value_parser!(std::path::PathBuf))
        )
        .arg(
            Arg::new("TIMEOUT")
                .long("timeout")
                .value_name("SECONDS")
                .help(format!(
                    "Timeout for each storage provider operation [default: {}]",
                    DEFAULT_TIMEOUT.as_secs(),
                ))
                .global(true)
                .value_parser(value_parser!(u64).range(1..))
        )
        .arg(
            Arg::new("MAX_ATTEMPTS")
                .long("max-attempts")
                .value_name("N")
                .help(format!(
                    "Attempts made for throttled or failed provider requests [default: {}]",
                    DEFAULT_MAX_ATTEMPTS,
                ))
                .global(true)
                .value_parser(value_parser!(u32).range(1..))
        )
        .arg(
            Arg::new("CONCURRENCY")
                .long("concurrency")
                .value_name("N")
                .help(format!(
                    "Number of buckets to scan at the same time [default: {}]",
                    DEFAULT_CONCURRENCY,
                ))
                .global(true)
                .value_parser(value_parser!(usize))
        )
        .arg(
            Arg::new("PRELOAD")
                .long("preload")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Calculate metrics for every bucket before running the command")
        )
        .subcommand(
            Command::new("setup-guide")
                .about("Brief guide to creating the credentials file")
        )
        .subcommand(
            Command::new("list-buckets")
                .about("Lists all accessible buckets")
        )
        .subcommand(
            Command::new("show-table")
                .about("Shows every bucket and its metrics as a table")
                .arg(unit_arg())
                .arg(refresh_arg())
        )
        .subcommand(
            Command::new("save-table")
                .about("Saves every bucket and its metrics to a .csv or .xlsx file")
                .arg(
                    Arg::new("PATH")
                        .required(true)
                        .value_name("PATH")
                        .help("Destination, .xls/.xlsx writes a workbook, anything else CSV")
                        .value_parser(value_parser!(std::path::PathBuf))
                )
                .arg(unit_arg())
                .arg(refresh_arg())
        )
        .subcommand(
            Command::new("bucket-details")
                .about("Shows the metrics of a single bucket")
                .arg(
                    Arg::new("BUCKET")
                        .long("bucket")
                        .short('b')
                        .required(true)
                        .value_name("BUCKET")
                        .help("Exact name of the bucket")
                )
                .arg(unit_arg())
                .arg(
                    Arg::new("CALCULATE")
                        .long("calculate")
                        .action(ArgAction::SetTrue)
                        .help("Recalculate the bucket instead of using cached metrics")
                )
        )
}

/// Parse the process arguments.
pub fn parse_args() -> ArgMatches {
    debug!("Parsing command line arguments");

    create_app().get_matches()
}
