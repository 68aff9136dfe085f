use std::collections::BTreeMap;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use neighborhood_data::config::ConfigLoader;
use neighborhood_data::domain::{DEFAULT_LIMIT, DatasetCategory, FetchRequest, parse_filter};
use neighborhood_data::error::DataError;
use neighborhood_data::export::export_all;
use neighborhood_data::output::JsonOutput;
use neighborhood_data::portal::{DatasetSource, Endpoint, PortalClient};
use neighborhood_data::transport::HttpTransport;

#[derive(Parser)]
#[command(name = "nbhd")]
#[command(about = "Fetch neighborhood datasets (housing, crime, 311) from an open-data portal")]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "JSON file overriding endpoints and credentials")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Fetch one dataset and print it as JSON")]
    Fetch(FetchArgs),
    #[command(about = "Show which endpoint each dataset resolves to")]
    Endpoints,
    #[command(about = "Fetch every dataset and write projected JSON files")]
    Export(ExportArgs),
}

#[derive(Args)]
struct FetchArgs {
    category: String,

    #[arg(long = "filter", value_name = "KEY=VALUE")]
    filters: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: u32,
}

#[derive(Args)]
struct ExportArgs {
    #[arg(long, default_value = "data/raw")]
    out: Utf8PathBuf,

    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: u32,
}

#[derive(Serialize)]
struct EndpointEntry {
    category: DatasetCategory,
    endpoint: Option<Endpoint>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<DataError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &DataError) -> u8 {
    match error {
        DataError::UnknownCategory(_)
        | DataError::InvalidFilter(_)
        | DataError::ConfigRead(_)
        | DataError::ConfigParse(_) => 2,
        DataError::UpstreamRequest(_)
        | DataError::UpstreamStatus { .. }
        | DataError::NoDatasetsExported => 3,
        DataError::Filesystem(_) => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let client = PortalClient::new(config, HttpTransport::new()?);

    match cli.command {
        Commands::Fetch(args) => run_fetch(args, &client),
        Commands::Endpoints => run_endpoints(&client),
        Commands::Export(args) => {
            let summary = export_all(&client, &args.out, args.limit)?;
            JsonOutput::print_export(&summary).into_diagnostic()
        }
    }
}

fn run_fetch(args: FetchArgs, client: &PortalClient<HttpTransport>) -> miette::Result<()> {
    let category: DatasetCategory = args.category.parse()?;
    let filters = args
        .filters
        .iter()
        .map(|raw| parse_filter(raw))
        .collect::<Result<BTreeMap<_, _>, DataError>>()?;
    let request = FetchRequest {
        category,
        filters,
        limit: args.limit,
    };
    let table = client.fetch(&request)?;
    JsonOutput::print_table(&table).into_diagnostic()
}

fn run_endpoints(client: &PortalClient<HttpTransport>) -> miette::Result<()> {
    let entries: Vec<EndpointEntry> = DatasetCategory::ALL
        .into_iter()
        .map(|category| EndpointEntry {
            category,
            endpoint: client.resolve(category).ok(),
        })
        .collect();
    JsonOutput::print_json(&entries).into_diagnostic()
}
