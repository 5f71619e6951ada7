// s3review: A tool for reviewing the object counts, sizes and activity of S3
// buckets.
#![forbid(unsafe_code)]
use anyhow::{
    Context,
    Result,
};
use clap::ArgMatches;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod common;
mod review;
mod s3;

use common::{
    ClientConfig,
    Error,
    SizeUnit,
    CONFIG_ENV_VAR,
};
use review::Reviewer;

// Default log level when RUST_LOG isn't set.
const DEFAULT_LOG_FILTER: &str = "warn";

type S3Reviewer = Reviewer<s3::Client>;

// Log to stderr so that tables on stdout can be piped.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_guide() {
    let default_path = ClientConfig::default_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<none on this platform>".to_string());

    println!(
        r#"Create a JSON file with the following attributes:

    {{
        "region_name": "YOUR-REGION",
        "aws_access_key_id": "YOUR-ID",
        "aws_secret_access_key": "YOUR-KEY"
    }}

An optional "endpoint_url" selects an S3 compatible service.

s3review looks for the file in the following order:
  1. The --config PATH argument
  2. The {CONFIG_ENV_VAR} environment variable
  3. {default_path}

Run `s3review --help` to learn about the other commands."#,
    );
}

// Unit selected on the command line, clap has already validated it.
fn size_unit(matches: &ArgMatches) -> Result<SizeUnit> {
    let unit = matches.get_one::<String>("UNIT")
        .map_or("byte", String::as_str);

    Ok(SizeUnit::from_str(unit)?)
}

async fn create_reviewer(matches: &ArgMatches) -> Result<S3Reviewer> {
    let path = matches.get_one::<PathBuf>("CONFIG");

    // Flags override the configuration defaults only when given.
    let mut config = ClientConfig::load(path.map(PathBuf::as_path))?;

    if let Some(timeout) = matches.get_one::<u64>("TIMEOUT") {
        config = config.set_timeout(Duration::from_secs(*timeout));
    }

    if let Some(max_attempts) = matches.get_one::<u32>("MAX_ATTEMPTS") {
        config = config.set_max_attempts(*max_attempts);
    }

    if let Some(concurrency) = matches.get_one::<usize>("CONCURRENCY") {
        config = config.set_concurrency(*concurrency);
    }

    debug!("Client configuration: {:?}", config);

    let client   = s3::Client::new(&config).await;
    let reviewer = Reviewer::new(Arc::new(client))
        .set_concurrency(config.concurrency);

    if matches.get_flag("PRELOAD") {
        reviewer.preload_buckets()
            .await
            .context("Failed to preload bucket metrics")?;
    }

    Ok(reviewer)
}

async fn list_buckets(reviewer: &S3Reviewer) -> Result<()> {
    let names = reviewer.list()
        .await
        .context("Failed to list buckets")?;

    println!("Authorized user on the following buckets:");

    for name in names {
        println!("> {name}");
    }

    Ok(())
}

async fn show_table(reviewer: &S3Reviewer, matches: &ArgMatches) -> Result<()> {
    let unit    = size_unit(matches)?;
    let refresh = matches.get_flag("REFRESH");

    println!("S3 Bucket Detail:");

    reviewer.show_details(&mut std::io::stdout(), unit, refresh)
        .await
        .context("Error rendering bucket detail table")
}

async fn save_table(reviewer: &S3Reviewer, matches: &ArgMatches) -> Result<()> {
    let unit    = size_unit(matches)?;
    let refresh = matches.get_flag("REFRESH");
    let path    = matches.get_one::<PathBuf>("PATH")
        .context("PATH is required")?;

    let format = reviewer.save_detail_table(path, unit, refresh)
        .await
        .with_context(|| {
            format!("Error saving bucket details to {}", path.display())
        })?;

    debug!("save_table: Wrote {:?}", format);

    println!("Bucket details saved to {}", path.display());

    Ok(())
}

async fn bucket_details(reviewer: &S3Reviewer, matches: &ArgMatches) -> Result<()> {
    let unit      = size_unit(matches)?;
    let calculate = matches.get_flag("CALCULATE");
    let name      = matches.get_one::<String>("BUCKET")
        .context("BUCKET is required")?;

    let bucket = match reviewer.get_bucket(name).await {
        Ok(bucket) => bucket,
        Err(Error::BucketNotFound(name)) => {
            eprintln!(
                "'{name}' not found, consider using the 'list-buckets' \
                 command to browse for the target bucket",
            );

            return Err(Error::BucketNotFound(name).into());
        },
        Err(e) => return Err(e).context("Failed to list buckets"),
    };

    let details = bucket.details(unit, calculate)
        .await
        .with_context(|| format!("Failed to calculate details of '{name}'"))?;

    println!("{details}");

    Ok(())
}

async fn run() -> Result<()> {
    let matches = cli::parse_args();

    let Some((command, sub_matches)) = matches.subcommand() else {
        // clap requires a subcommand, so this shouldn't happen.
        return Ok(());
    };

    debug!("run: Running '{}'", command);

    if command == "setup-guide" {
        setup_guide();

        return Ok(());
    }

    let reviewer = create_reviewer(sub_matches).await?;

    match command {
        "list-buckets"   => list_buckets(&reviewer).await,
        "show-table"     => show_table(&reviewer, sub_matches).await,
        "save-table"     => save_table(&reviewer, sub_matches).await,
        "bucket-details" => bucket_details(&reviewer, sub_matches).await,
        _                => unreachable!("unknown subcommand '{command}'"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");

            let error = e.downcast_ref::<Error>();

            if error.is_some_and(Error::is_retryable) {
                eprintln!("This failure may be temporary, try again later.");
            }

            let code = error.map_or(1, Error::exit_code);

            ExitCode::from(u8::try_from(code).unwrap_or(1))
        },
    }
}
