use anyhow::{Context, Result};
use apikit::api_errors::{handle_integrity_error, ApiError, Problem, ResourceErrors};
use apikit::db_integrity::{parse, RawIntegrityError, Vendor};
use apikit::paging_core::paginate;
use clap::{Parser, Subcommand, ValueEnum};
use runtime::{AppConfig, CliArgs};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use url::Url;

/// ApiKit CLI - classify database integrity errors and render API problems
#[derive(Parser)]
#[command(name = "apikit-cli")]
#[command(about = "ApiKit CLI - classify database integrity errors and render API problems")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long, global = true)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify an integrity error message (reads stdin when MESSAGE is omitted)
    Classify {
        #[arg(long, value_enum)]
        vendor: Option<VendorArg>,
        message: Option<String>,
    },
    /// Map an integrity error message to a problem document
    Problem {
        /// Resource name used in the error detail
        #[arg(long)]
        resource: String,
        /// Request body whose values are echoed for the violated columns
        #[arg(long, default_value = "{}")]
        payload: String,
        /// Request path reported as the problem instance
        #[arg(long, default_value = "/")]
        path: String,
        #[arg(long)]
        operation_id: Option<String>,
        #[arg(long, value_enum)]
        vendor: Option<VendorArg>,
        message: Option<String>,
    },
    /// Compute a page window over COUNT items
    Page {
        #[arg(long)]
        count: u64,
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Defaults to pagination.per_page
        #[arg(long)]
        page_size: Option<u64>,
        /// Collection URL used for previous/next links
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long, default_value = "list")]
        operation_id: String,
    },
    /// Check configuration
    Check,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VendorArg {
    Auto,
    Postgres,
    Sqlite,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::debug!(home_dir = %config.server.home_dir, "configuration loaded");

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Classify { vendor, message } => {
            let raw = raw_error(&config, vendor, message)?;
            match parse(&raw) {
                Ok(result) => {
                    println!("{}", serde_json::to_string(&result)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Problem {
            resource,
            payload,
            path,
            operation_id,
            vendor,
            message,
        } => {
            let payload: serde_json::Value =
                serde_json::from_str(&payload).context("--payload is not valid JSON")?;
            let raw = raw_error(&config, vendor, message)?;
            match handle_integrity_error(&ResourceErrors::new(resource), &raw, &payload) {
                Ok(err) => {
                    print_problem(&config, err.to_problem(&path, operation_id.as_deref()))?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Page {
            count,
            page,
            page_size,
            base_url,
            operation_id,
        } => {
            let base = base_url
                .as_deref()
                .map(Url::parse)
                .transpose()
                .context("--base-url is not a valid URL")?;

            let window = config
                .pagination
                .params(page, page_size)
                .and_then(|params| paginate(count, &params, base.as_ref()));
            match window {
                Ok(window) => {
                    println!("{}", serde_json::to_string_pretty(&window)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    let instance = base.as_ref().map_or("/", |u| u.path());
                    let err = ApiError::from_paging(None, operation_id.as_str(), &e);
                    print_problem(&config, err.to_problem(instance, Some(&operation_id)))?;
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Check => check_config(&config),
    }
}

/// Explicit `--vendor` wins; otherwise the configured database decides,
/// and without one the message text is sniffed.
fn raw_error(config: &AppConfig, vendor: Option<VendorArg>, message: Option<String>) -> Result<RawIntegrityError> {
    let message = match message {
        Some(m) => m,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read message from stdin")?;
            buf
        }
    };

    let vendor = match vendor {
        Some(VendorArg::Auto) => None,
        Some(VendorArg::Postgres) => Some(Vendor::Postgres),
        Some(VendorArg::Sqlite) => Some(Vendor::Sqlite),
        None => config.vendor(),
    };
    tracing::debug!(vendor = ?vendor, "classifying integrity error");

    Ok(match vendor {
        Some(v) => RawIntegrityError::from_vendor(v, message),
        None => RawIntegrityError::new(message),
    })
}

fn print_problem(config: &AppConfig, problem: Problem) -> Result<()> {
    let problem = problem.with_type_prefix(&config.errors.type_prefix);
    println!("{}", serde_json::to_string_pretty(&problem)?);
    Ok(())
}

fn check_config(config: &AppConfig) -> Result<ExitCode> {
    tracing::info!("Checking configuration...");
    config.validate().context("invalid configuration")?;

    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(ExitCode::SUCCESS)
}
