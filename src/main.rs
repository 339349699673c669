use anyhow::{Context, Result};
use arm_provider::azure::http::error_hint;
use arm_provider::azure::ArmClient;
use arm_provider::config::{Config, Env};
use arm_provider::error::ProviderError;
use arm_provider::provider::{Provider, ProviderContext};
use arm_provider::state::ResourceData;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Azure Resource Manager provider
#[derive(Parser, Debug)]
#[command(name = "arm-provider", version = arm_provider::VERSION, about, long_about = None)]
struct Args {
    /// Subscription to manage resources in
    #[arg(short, long, global = true)]
    subscription: Option<String>,

    /// Management endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the supported resource types
    Resources,
    /// Print the schema of a resource type
    Schema {
        #[arg(short = 't', long = "type")]
        type_name: String,
    },
    /// Create or update a resource from a configuration document
    Apply {
        #[arg(short = 't', long = "type")]
        type_name: String,
        /// Desired configuration (JSON or YAML)
        #[arg(short, long)]
        config: PathBuf,
        /// Current state; when it carries an ID the resource is updated
        #[arg(long)]
        prior: Option<PathBuf>,
    },
    /// Refresh a state document
    Read {
        #[arg(short = 't', long = "type")]
        type_name: String,
        #[arg(long)]
        state: PathBuf,
    },
    /// Delete the resource a state document points at
    Delete {
        #[arg(short = 't', long = "type")]
        type_name: String,
        #[arg(long)]
        state: PathBuf,
    },
    /// Import an existing resource by ID
    Import {
        #[arg(short = 't', long = "type")]
        type_name: String,
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// stdout carries the state document, so logs go to a file
fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("arm-provider started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("arm-provider").join("arm-provider.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".arm-provider").join("arm-provider.log");
    }
    PathBuf::from("arm-provider.log")
}

fn build_provider(args: &Args) -> Result<Provider> {
    let config = Config::load()?;
    let env = Env::from_process();

    let subscription = config
        .effective_subscription(args.subscription.as_deref(), &env)
        .ok_or_else(|| {
            ProviderError::config(
                "no subscription configured (use --subscription or ARM_SUBSCRIPTION_ID)",
            )
        })?;
    let endpoint = config.effective_endpoint(args.endpoint.as_deref(), &env);
    let source = config.credential_source(&env)?;

    tracing::debug!("Using subscription {} at {}", subscription, endpoint);
    let client = ArmClient::new(&endpoint, &subscription, source)?;

    Ok(Provider::new(ProviderContext::new(client)))
}

fn print_state(data: &ResourceData) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&data.to_json())?);
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    match &args.command {
        Command::Resources => {
            for name in arm_provider::resource::get_all_resource_keys() {
                println!("{}", name);
            }
        },
        Command::Schema { type_name } => {
            let resource = arm_provider::resource::get_resource(type_name)
                .ok_or_else(|| ProviderError::UnknownResource(type_name.clone()))?;
            println!("{}", serde_json::to_string_pretty(&resource.schema().to_json())?);
        },
        Command::Apply {
            type_name,
            config,
            prior,
        } => {
            let provider = build_provider(&args)?;
            let planned = ResourceData::load(config)?;
            let prior = prior.as_deref().map(ResourceData::load).transpose()?;
            let state = provider.apply(type_name, prior.as_ref(), planned).await?;
            print_state(&state)?;
        },
        Command::Read { type_name, state } => {
            let provider = build_provider(&args)?;
            let state = provider.read(type_name, ResourceData::load(state)?).await?;
            print_state(&state)?;
        },
        Command::Delete { type_name, state } => {
            let provider = build_provider(&args)?;
            let state = provider.delete(type_name, ResourceData::load(state)?).await?;
            print_state(&state)?;
        },
        Command::Import { type_name, id } => {
            let provider = build_provider(&args)?;
            let state = provider.import(type_name, id).await?;
            print_state(&state)?;
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Warning: {err:#}");
            None
        },
    };

    if let Err(err) = run(args).await {
        tracing::error!("{:#}", err);
        eprintln!("Error: {err:#}");
        if let Some(hint) = error_hint(&err) {
            eprintln!("Hint: {hint}");
        }
        std::process::exit(1);
    }
}
