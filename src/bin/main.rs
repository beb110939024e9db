//! superset-sync CLI - Sync dbt models and metrics into Superset datasets
//!
//! Usage:
//!   superset-sync sync <manifest.json> [--config <file>] [--disallow-edits]
//!   superset-sync compile <manifest.json> <metric> [--policy <policy>]
//!   superset-sync check <manifest.json>
//!
//! Examples:
//!   superset-sync sync target/manifest.json --config superset-sync.toml
//!   superset-sync compile target/manifest.json revenue --policy coalesce-zero
//!   RUST_LOG=debug superset-sync sync target/manifest.json

use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use superset_sync::config::{DatabaseConnection, Settings};
use superset_sync::manifest::Manifest;
use superset_sync::metrics::{compile_metric, AggregatePolicy, MetricGraph};
use superset_sync::sql::Dialect;
use superset_sync::superset::HttpClient;
use superset_sync::sync::sync_datasets_with_report;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

#[derive(Parser)]
#[command(name = "superset-sync")]
#[command(about = "Sync dbt models and metrics into Superset datasets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update one Superset dataset per dbt model
    Sync {
        /// Path to the dbt manifest.json
        manifest: PathBuf,

        /// Config file (defaults to $SUPERSET_SYNC_CONFIG, ./superset-sync.toml, then the user config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Superset base URL (overrides the config file)
        #[arg(long)]
        superset_url: Option<String>,

        /// Superset database id (overrides the config file)
        #[arg(long)]
        database_id: Option<i64>,

        /// SQLAlchemy URI of the Superset database (overrides the config file)
        #[arg(long)]
        sqlalchemy_uri: Option<String>,

        /// Quoting dialect for virtual datasets (derived from the URI if not specified)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Mark datasets as managed externally
        #[arg(long)]
        disallow_edits: bool,

        /// dbt docs base URL for dataset links
        #[arg(long)]
        external_url_prefix: Option<String>,

        /// How aggregates treat empty input
        #[arg(short, long)]
        policy: Option<PolicyArg>,

        /// Only sync models with these names
        #[arg(short, long = "select")]
        select: Vec<String>,
    },

    /// Print the SQL expression for a metric
    Compile {
        /// Path to the dbt manifest.json
        manifest: PathBuf,

        /// Metric name
        metric: String,

        #[arg(short, long, default_value = "plain")]
        policy: PolicyArg,
    },

    /// Check the metric graph for cycles and unknown metric references
    Check {
        /// Path to the dbt manifest.json
        manifest: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Ansi,
    Postgres,
    Mysql,
    Tsql,
    Duckdb,
    Bigquery,
    Snowflake,
    Databricks,
    Redshift,
    Trino,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Ansi => Dialect::Ansi,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Tsql => Dialect::TSql,
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Bigquery => Dialect::BigQuery,
            DialectArg::Snowflake => Dialect::Snowflake,
            DialectArg::Databricks => Dialect::Databricks,
            DialectArg::Redshift => Dialect::Redshift,
            DialectArg::Trino => Dialect::Trino,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum PolicyArg {
    /// Plain SQL aggregates; empty input yields NULL
    Plain,
    /// Wrap aggregates in COALESCE(..., 0)
    CoalesceZero,
}

impl From<PolicyArg> for AggregatePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Plain => AggregatePolicy::Plain,
            PolicyArg::CoalesceZero => AggregatePolicy::CoalesceZero,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            manifest,
            config,
            superset_url,
            database_id,
            sqlalchemy_uri,
            dialect,
            disallow_edits,
            external_url_prefix,
            policy,
            select,
        } => {
            let args = SyncArgs {
                manifest,
                config,
                superset_url,
                database_id,
                sqlalchemy_uri,
                dialect,
                disallow_edits,
                external_url_prefix,
                policy,
                select,
            };
            cmd_sync(args).await
        }
        Commands::Compile {
            manifest,
            metric,
            policy,
        } => cmd_compile(manifest, metric, policy),
        Commands::Check { manifest } => cmd_check(manifest),
    }
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

struct SyncArgs {
    manifest: PathBuf,
    config: Option<PathBuf>,
    superset_url: Option<String>,
    database_id: Option<i64>,
    sqlalchemy_uri: Option<String>,
    dialect: Option<DialectArg>,
    disallow_edits: bool,
    external_url_prefix: Option<String>,
    policy: Option<PolicyArg>,
    select: Vec<String>,
}

async fn cmd_sync(args: SyncArgs) -> ExitCode {
    let loaded = match &args.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let mut settings = match loaded {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // CLI flags win over the config file
    if args.superset_url.is_some() {
        settings.superset.url = args.superset_url;
    }
    if args.database_id.is_some() {
        settings.database.id = args.database_id;
    }
    if args.sqlalchemy_uri.is_some() {
        settings.database.sqlalchemy_uri = args.sqlalchemy_uri;
    }
    if args.disallow_edits {
        settings.sync.disallow_edits = true;
    }
    if args.external_url_prefix.is_some() {
        settings.sync.external_url_prefix = args.external_url_prefix;
    }
    if let Some(policy) = args.policy {
        settings.sync.aggregate_policy = policy.into();
    }

    let options = match settings.sync_options() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let database: DatabaseConnection = match settings.database_connection() {
        Ok(db) => match args.dialect {
            Some(dialect) => db.with_dialect(dialect.into()),
            None => db,
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = match settings
        .superset_url()
        .and_then(|url| Ok((url, settings.superset_token()?)))
    {
        Ok((url, token)) => {
            let timeout = Duration::from_secs(settings.superset.timeout_secs);
            match HttpClient::with_timeout(&url, token.as_deref(), timeout) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error creating Superset client: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let manifest = match Manifest::from_path(&args.manifest) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error reading manifest '{}': {}", args.manifest.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let (mut models, metrics) = match manifest.models().and_then(|m| Ok((m, manifest.metrics()?))) {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if !args.select.is_empty() {
        models.retain(|model| args.select.contains(&model.name));
    }

    let report = sync_datasets_with_report(&client, &models, &metrics, &database, &options).await;

    for dataset in &report.datasets {
        println!("{}\t{}", dataset.id, dataset.table_name);
    }
    for failure in &report.failures {
        eprintln!("Skipped {}: {}", failure.unique_id, failure.error);
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn cmd_compile(manifest: PathBuf, metric: String, policy: PolicyArg) -> ExitCode {
    let metrics = match Manifest::from_path(&manifest).and_then(|m| m.metrics()) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error reading manifest '{}': {}", manifest.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match compile_metric(&metric, &metrics, policy.into()) {
        Ok(sql) => {
            println!("{}", sql);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_check(manifest: PathBuf) -> ExitCode {
    let metrics = match Manifest::from_path(&manifest).and_then(|m| m.metrics()) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error reading manifest '{}': {}", manifest.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let graph = MetricGraph::build(&metrics);
    let cycles = graph.detect_cycles();
    if !cycles.is_empty() {
        eprintln!("Metric cycles:");
        for cycle in &cycles {
            eprintln!("  {}", cycle.join(" -> "));
        }
        return ExitCode::FAILURE;
    }

    if let Err(e) = graph.validate() {
        eprintln!("Validation error: {}", e);
        return ExitCode::FAILURE;
    }

    println!("OK: {} metrics in {}", metrics.len(), manifest.display());
    ExitCode::SUCCESS
}
