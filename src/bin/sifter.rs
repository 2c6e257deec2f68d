//! Sifter CLI - resolve query-string requests against a configured allow-list
//!
//! Usage:
//!   sifter resolve --resource <table> [--config <file>] [--dialect <dialect>] [key=value...]
//!   sifter check [--config <file>]
//!
//! Examples:
//!   sifter resolve --resource users 'filter[name]=Ada' 'sort=-created_at'
//!   sifter resolve --resource users --format json 'include=posts'
//!   sifter check --config sifter.toml

use clap::{Parser, Subcommand, ValueEnum};
use sifter::config::Settings;
use sifter::sink::RecordingSink;
use sifter::sql::{Dialect, SqlDialect, SqlSink};
use sifter::{QueryResolver, RequestParams};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sifter")]
#[command(about = "Sifter - resolve filter, sort and include requests against an allow-list")]
#[command(version)]
struct Cli {
    /// Log resolution steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one request and print the resulting query
    Resolve {
        /// Path to the TOML config (defaults to $SIFTER_CONFIG or ./sifter.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Resource (table) to query
        #[arg(short, long)]
        resource: String,

        /// SQL dialect to generate (overrides the config)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        format: OutputFormat,

        /// Percent-encoded query-string pairs such as `filter[name]=Ada%20L` or `sort=-name`
        pairs: Vec<String>,
    },

    /// Validate a config and list each resource's allowed names
    Check {
        /// Path to the TOML config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Duckdb,
    Postgres,
    Mysql,
    Tsql,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Tsql => Dialect::TSql,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// SQL plus eager loads as comments
    Sql,
    /// The directive tree as JSON
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Resolve {
            config,
            resource,
            dialect,
            format,
            pairs,
        } => cmd_resolve(config.as_deref(), &resource, dialect, format, &pairs),
        Commands::Check { config } => cmd_check(config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sifter=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(config: Option<&Path>) -> Result<Settings, Box<dyn Error>> {
    let settings = match config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };
    Ok(settings)
}

fn cmd_resolve(
    config: Option<&Path>,
    resource: &str,
    dialect: Option<DialectArg>,
    format: OutputFormat,
    pairs: &[String],
) -> Result<(), Box<dyn Error>> {
    let settings = load_settings(config)?;
    let dialect = match dialect {
        Some(arg) => arg.into(),
        None => settings.dialect()?,
    };
    let allow_list = settings.allow_list(resource)?;
    let schema = settings.schema();

    let request = RequestParams::from_query_string(&pairs.join("&"), &settings.parameters);
    debug!(?request, resource, "parsed request");

    let mut resolver = QueryResolver::new(&allow_list);
    if let Some(sort) = &settings.resource(resource)?.default_sort {
        resolver = resolver.with_default_sort(sort);
    }

    match format {
        OutputFormat::Sql => {
            let mut sink = SqlSink::new(&schema, resource)?;
            resolver.resolve(&request, &mut sink)?;
            for load in sink.eager_loads() {
                match &load.alias {
                    Some(alias) => println!("-- include: {} as {}", load.relation, alias),
                    None => println!("-- include: {}", load.relation),
                }
            }
            println!("{}", sink.to_sql(dialect));
        }
        OutputFormat::Json => {
            let mut sink = schema
                .tables()
                .flat_map(|table| table.relations.iter())
                .fold(RecordingSink::new(resource), |sink, (accessor, relation)| {
                    sink.with_relation(accessor, &relation.table)
                });
            resolver.resolve(&request, &mut sink)?;
            println!("{}", serde_json::to_string_pretty(sink.directives())?);
        }
    }
    Ok(())
}

fn cmd_check(config: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let settings = load_settings(config)?;
    settings.validate()?;

    println!("Dialect: {}", settings.dialect()?.name());
    println!();
    for name in settings.resources.keys() {
        let allow_list = settings.allow_list(name)?;
        println!("{}:", name);
        println!("  filters:  {}", allow_list.allowed_filters().join(", "));
        println!("  sorts:    {}", allow_list.allowed_sorts().join(", "));
        println!("  includes: {}", allow_list.allowed_includes().join(", "));
    }
    Ok(())
}
