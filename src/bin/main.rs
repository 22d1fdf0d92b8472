//! Glasnostic console CLI
//!
//! Usage:
//!   glasnostic environments
//!   glasnostic views <env-key>
//!   glasnostic create <env-key> -n <name> -s <source> -d <destination>
//!   glasnostic update <env-key> <view-id> [-n <name>] [--requests N] ...
//!   glasnostic delete <env-key> <view-id>
//!   glasnostic metrics <env-key> <view-index>
//!
//! Credentials come from a TOML config file (`--config`) or the
//! GLASNOSTIC_USERNAME / GLASNOSTIC_PASSWORD environment variables.

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "glasnostic")]
#[command(about = "Glasnostic console client", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file with credentials
    #[arg(short, long)]
    config: Option<String>,

    /// Base domain of the console
    #[arg(long)]
    base_domain: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Command {
    /// Print a sample configuration file
    SampleConfig,
    /// List environments (assemblies)
    Environments,
    /// List views (channels) of an environment
    Views {
        environment_key: String,
    },
    /// Create a view
    Create {
        environment_key: String,
        /// View name
        #[arg(short, long)]
        name: String,
        /// Source (client) pattern
        #[arg(short, long)]
        source: String,
        /// Destination (service) pattern
        #[arg(short, long)]
        destination: String,
        /// Request-rate limit
        #[arg(long)]
        requests: Option<f64>,
        /// Latency limit
        #[arg(long)]
        latency: Option<f64>,
        /// Concurrency limit
        #[arg(long)]
        concurrency: Option<f64>,
        /// Bandwidth limit
        #[arg(long)]
        bandwidth: Option<f64>,
    },
    /// Update a view; only the provided fields change
    Update {
        environment_key: String,
        view_id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        source: Option<String>,
        #[arg(short, long)]
        destination: Option<String>,
        #[arg(long)]
        requests: Option<f64>,
        #[arg(long)]
        latency: Option<f64>,
        #[arg(long)]
        concurrency: Option<f64>,
        #[arg(long)]
        bandwidth: Option<f64>,
    },
    /// Delete a view
    Delete {
        environment_key: String,
        view_id: String,
    },
    /// Fetch windowed traffic metrics for a view
    Metrics {
        environment_key: String,
        /// View index (see `views` output)
        view_index: String,
        /// Sample period in milliseconds
        #[arg(long, default_value_t = 10_000)]
        sample_period: u64,
        /// Window duration in milliseconds
        #[arg(long, default_value_t = 60_000)]
        duration: u64,
    },
}

#[cfg(feature = "cli")]
fn load_config(cli: &Cli) -> Result<glasnostic::ClientConfig, Box<dyn std::error::Error>> {
    use glasnostic::ClientConfig;

    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_toml_file(path)?,
        None => ClientConfig {
            username: std::env::var("GLASNOSTIC_USERNAME").unwrap_or_default(),
            password: std::env::var("GLASNOSTIC_PASSWORD").unwrap_or_default(),
            ..ClientConfig::default()
        },
    };
    if let Some(base_domain) = &cli.base_domain {
        config.base_domain = base_domain.clone();
    }
    Ok(config)
}

#[cfg(feature = "cli")]
fn collect_policies(
    requests: Option<f64>,
    latency: Option<f64>,
    concurrency: Option<f64>,
    bandwidth: Option<f64>,
) -> Option<glasnostic::Policies> {
    use glasnostic::{MetricType, Policies, Policy};

    let mut policies = Policies::new();
    for (metric, value) in [
        (MetricType::Requests, requests),
        (MetricType::Latency, latency),
        (MetricType::Concurrency, concurrency),
        (MetricType::Bandwidth, bandwidth),
    ] {
        if let Some(value) = value {
            policies.insert(metric, Policy::pending(value));
        }
    }
    if policies.is_empty() {
        None
    } else {
        Some(policies)
    }
}

#[cfg(feature = "cli")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use glasnostic::{ClientConfig, GlasnosticConsole, ViewUpdate};

    env_logger::init();

    let cli = Cli::parse();

    if matches!(cli.command, Command::SampleConfig) {
        print!("{}", ClientConfig::sample_toml());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let session = GlasnosticConsole::login_with_config(&config)?;

    match cli.command {
        Command::SampleConfig => unreachable!("handled above"),
        Command::Environments => {
            let environments = session.environments()?;
            println!("{}", serde_json::to_string_pretty(&environments)?);
        }
        Command::Views { environment_key } => {
            let views = session.views(&environment_key)?;
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
        Command::Create {
            environment_key,
            name,
            source,
            destination,
            requests,
            latency,
            concurrency,
            bandwidth,
        } => {
            let policies = collect_policies(requests, latency, concurrency, bandwidth);
            let view =
                session.create_view(&environment_key, &name, &source, &destination, policies)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Update {
            environment_key,
            view_id,
            name,
            source,
            destination,
            requests,
            latency,
            concurrency,
            bandwidth,
        } => {
            let mut update = ViewUpdate::new();
            if let Some(name) = name {
                update = update.name(name);
            }
            if let Some(source) = source {
                update = update.source(source);
            }
            if let Some(destination) = destination {
                update = update.destination(destination);
            }
            if let Some(policies) = collect_policies(requests, latency, concurrency, bandwidth) {
                update = update.policies(policies);
            }
            let view = session.update_view(&environment_key, &view_id, update)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Delete {
            environment_key,
            view_id,
        } => {
            session.delete_view(&environment_key, &view_id)?;
            println!("deleted view {}", view_id);
        }
        Command::Metrics {
            environment_key,
            view_index,
            sample_period,
            duration,
        } => {
            let metrics = session.view_metrics(
                &environment_key,
                &view_index,
                sample_period,
                duration,
                None,
            )?;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features not enabled. Please compile with --features cli");
    std::process::exit(1);
}
