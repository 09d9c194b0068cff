//! CLI for the mapping service.
//!
//! Usage:
//!   datamapper mappings list
//!   datamapper mappings add <API_FIELD> <DB_FIELD>
//!   datamapper scheduler toggle
//!   datamapper webhook send '{"event": "test"}'
//!
//! Settings come from `DATAMAPPER_*` variables (a `.env` file is loaded
//! first if present); `--base-url`, `--task` and `--timeout-secs` override
//! them. Results go to stdout, logs to stderr.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use datamapper::config::normalize_base_url;
use datamapper::mappings::SubmitOutcome;
use datamapper::scheduler::STATUS_UNAVAILABLE;
use datamapper::{
    ClientConfig, ClientError, FlagController, FlagState, HttpApi, Listing, MapperApi,
    MappingBook, PayloadForwarder, SchedulerFlag, Settled, TracingReporter,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Service address, e.g. http://localhost:8000 [env: DATAMAPPER_BASE_URL]
    #[arg(long)]
    base_url: Option<String>,

    /// Scheduler task to control [env: DATAMAPPER_TASK_NAME]
    #[arg(long)]
    task: Option<String>,

    /// Per-request timeout in seconds [env: DATAMAPPER_TIMEOUT_SECS]
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log requests at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Field mappings
    #[command(subcommand)]
    Mappings(MappingsCommand),
    /// Scheduler flag
    #[command(subcommand)]
    Scheduler(SchedulerCommand),
    /// Webhook forwarding
    #[command(subcommand)]
    Webhook(WebhookCommand),
}

#[derive(Subcommand, Debug)]
enum MappingsCommand {
    /// Print all mappings in server order
    List,
    /// Create a mapping
    Add { api_field: String, db_field: String },
    /// Show the mapping for one API field
    Get { api_field: String },
}

#[derive(Subcommand, Debug)]
enum SchedulerCommand {
    /// Print the current flag
    Status,
    /// Fetch the flag and flip it
    Toggle,
    /// Register the flag on the server
    Create {
        #[arg(long)]
        enabled: bool,
    },
}

#[derive(Subcommand, Debug)]
enum WebhookCommand {
    /// Parse a JSON payload and forward it
    Send {
        /// Raw JSON text
        #[arg(conflicts_with = "file", required_unless_present = "file")]
        payload: Option<String>,
        /// Read the payload from a file instead
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Lay command-line flags over a config read from the environment.
fn apply_flags(mut config: ClientConfig, cli: &Cli) -> Result<ClientConfig, ClientError> {
    if let Some(base) = &cli.base_url {
        config.base_url = normalize_base_url(base)?;
    }
    if let Some(task) = &cli.task {
        config = config.with_task_name(task.clone())?;
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_request_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

fn print_flag(flag: &SchedulerFlag) {
    println!(
        "{}: {}",
        flag.task_name,
        FlagState::from(flag.enabled).label()
    );
}

/// Run one command. `Err` carries the message for stderr.
async fn run(cli: Cli) -> Result<(), String> {
    let config = ClientConfig::from_env()
        .and_then(|env| apply_flags(env, &cli))
        .map_err(|e| e.to_string())?;
    let api = HttpApi::new(&config).map_err(|e| e.to_string())?;
    let reporter = TracingReporter;
    tracing::debug!(base_url = %api.base_url(), task = %config.task_name, "Client ready.");

    match cli.command {
        Command::Mappings(MappingsCommand::List) => {
            let mut book = MappingBook::new();
            let listing = book.load(&api, &reporter).await;
            if let Some(notice) = book.notice() {
                return Err(notice.message.to_string());
            }
            match listing {
                Listing::Placeholder(text) => println!("{}", text),
                Listing::Rows(rows) => rows.iter().for_each(|row| println!("{}", row)),
            }
        }
        Command::Mappings(MappingsCommand::Add {
            api_field,
            db_field,
        }) => {
            let mut book = MappingBook::new();
            book.set_api_field(api_field);
            book.set_db_field(db_field);
            match book.submit(&api, &reporter).await {
                SubmitOutcome::Added(mapping) => {
                    if let Some(notice) = book.notice() {
                        eprintln!("{}", notice.message);
                    }
                    println!("{}\t{}", mapping.id, mapping.arrow_line());
                }
                SubmitOutcome::Invalid(errors) => return Err(errors.to_string()),
                SubmitOutcome::Failed => {
                    return Err(book
                        .notice()
                        .map(|n| n.message.to_string())
                        .unwrap_or_default());
                }
            }
        }
        Command::Mappings(MappingsCommand::Get { api_field }) => {
            let mapping = api
                .get_mapping(&api_field)
                .await
                .map_err(|e| e.to_string())?;
            println!("{}\t{}", mapping.id, mapping.arrow_line());
        }
        Command::Scheduler(SchedulerCommand::Status) => {
            let mut controller = FlagController::new(config.task_name.clone());
            if controller.fetch(&api, &reporter).await == Settled::Failed {
                let reason = controller.last_error().unwrap_or_default().to_string();
                return Err(format!("{}: {}", STATUS_UNAVAILABLE, reason));
            }
            print_flag(controller.flag());
        }
        Command::Scheduler(SchedulerCommand::Toggle) => {
            let mut controller = FlagController::new(config.task_name.clone());
            if controller.fetch(&api, &reporter).await == Settled::Failed {
                let reason = controller.last_error().unwrap_or_default().to_string();
                return Err(format!("{}: {}", STATUS_UNAVAILABLE, reason));
            }
            let (request, settled) = controller.toggle(&api, &reporter).await;
            if settled == Settled::Failed {
                return Err(controller
                    .notice()
                    .map(|n| n.message.to_string())
                    .unwrap_or_default());
            }
            eprintln!(
                "Requested: {}",
                FlagState::from(request.enabled).label()
            );
            print_flag(controller.flag());
        }
        Command::Scheduler(SchedulerCommand::Create { enabled }) => {
            let flag = SchedulerFlag {
                task_name: config.task_name.clone(),
                enabled,
            };
            let created = api
                .create_scheduler(&flag)
                .await
                .map_err(|e| e.to_string())?;
            print_flag(&created);
        }
        Command::Webhook(WebhookCommand::Send { payload, file }) => {
            let text = match (payload, file) {
                (Some(text), _) => text,
                (None, Some(path)) => {
                    datamapper::webhook::read_payload_file(&path).map_err(|e| e.to_string())?
                }
                (None, None) => return Err("no payload given".to_string()),
            };
            let mut forwarder = PayloadForwarder::new(text);
            let result = forwarder.send(&api, &reporter).await;
            let message = forwarder
                .banner()
                .map(|b| b.message())
                .unwrap_or_default();
            match result {
                Ok(()) => println!("{}", message),
                Err(_) => return Err(message.to_string()),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(message) = run(cli).await {
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}
