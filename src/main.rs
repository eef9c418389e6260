use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hostdns::config::Settings;
use hostdns::dns::{create_provider, DnsApi};
use hostdns::host::{self, HostInventory};
use hostdns::records::{DEFAULT_NAME_TEMPLATE, DEFAULT_RECORD_TYPE, DEFAULT_TTL};
use hostdns::secrets::CredentialStore;
use hostdns::{AddRecordRequest, DelRecordRequest, RecordManager};

const PROVIDER: &str = "cloudflare";

#[derive(Parser)]
#[command(name = "hostdns")]
#[command(about = "Point Cloudflare A/AAAA records at this host's interface or subnet address")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add (or optionally edit) a record pointing at a local address
    Add(AddArgs),

    /// Delete a record
    Del(DelArgs),

    /// Show host identity, interfaces and, optionally, a zone's records
    Check {
        /// Zone whose records should be listed
        #[arg(long)]
        zone: Option<String>,
    },

    /// Store Cloudflare API credentials
    SetKey,

    /// Delete stored Cloudflare API credentials
    DeleteKey,

    /// Show configuration file location and contents
    Config,
}

#[derive(Args)]
struct AddArgs {
    /// DNS zone, e.g. example.com
    zone: Option<String>,

    /// Record name template; %H expands to the host, %M to the agent id
    #[arg(long, default_value = DEFAULT_NAME_TEMPLATE)]
    name: String,

    /// Record type (A or AAAA)
    #[arg(long = "type", default_value = DEFAULT_RECORD_TYPE)]
    record_type: String,

    /// Record TTL in seconds (1 = automatic)
    #[arg(long, default_value_t = DEFAULT_TTL)]
    ttl: u32,

    /// Overwrite an existing record with the same name and type
    #[arg(long)]
    edit_if_exists: bool,

    /// Take the address from this network interface
    #[arg(long)]
    iface: Option<String>,

    /// Take the first local address inside this network
    #[arg(long)]
    cidr: Option<String>,
}

#[derive(Args)]
struct DelArgs {
    /// DNS zone, e.g. example.com
    zone: Option<String>,

    /// Record name template; %H expands to the host, %M to the agent id
    #[arg(long, default_value = DEFAULT_NAME_TEMPLATE)]
    name: String,

    /// Record type
    #[arg(long = "type", default_value = DEFAULT_RECORD_TYPE)]
    record_type: String,
}

impl From<AddArgs> for AddRecordRequest {
    fn from(args: AddArgs) -> Self {
        let mut req = AddRecordRequest::new(args.zone.unwrap_or_default())
            .name(args.name)
            .record_type(args.record_type)
            .ttl(args.ttl)
            .edit_if_exists(args.edit_if_exists);
        req.iface = args.iface;
        req.cidr = args.cidr;
        req
    }
}

impl From<DelArgs> for DelRecordRequest {
    fn from(args: DelArgs) -> Self {
        DelRecordRequest::new(args.zone.unwrap_or_default())
            .name(args.name)
            .record_type(args.record_type)
    }
}

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Settings::config_path);
    let settings = Settings::load_from(&config_path)?;

    init_logging(&settings.logging.log_level);
    debug!("Loaded settings from {}", config_path.display());

    let store = CredentialStore::new(settings.credentials_path());

    match cli.command {
        Commands::Add(args) => {
            let manager = build_manager(&settings, &store)?;
            let outcome = manager.add_record(&args.into()).await?;
            print_messages(&outcome.messages());
        }

        Commands::Del(args) => {
            let manager = build_manager(&settings, &store)?;
            let outcome = manager.del_record(&args.into()).await?;
            print_messages(&outcome.messages());
        }

        Commands::Check { zone } => {
            check_status(&settings, &store, zone.as_deref()).await?;
        }

        Commands::SetKey => {
            use std::io::{self, Write};

            print!("Cloudflare account email: ");
            io::stdout().flush()?;
            let mut email = String::new();
            io::stdin().read_line(&mut email)?;
            let email = email.trim();

            let api_key = rpassword::prompt_password("Cloudflare API key: ")?;

            store.store(PROVIDER, email, api_key.trim())?;
            println!("Credentials stored in {}", store.path().display());
        }

        Commands::DeleteKey => {
            store.delete(PROVIDER)?;
            println!("Credentials deleted for provider: {}", PROVIDER);
        }

        Commands::Config => {
            show_config(&config_path, &settings)?;
        }
    }

    Ok(())
}

fn connect(settings: &Settings, store: &CredentialStore) -> Result<Arc<dyn DnsApi>> {
    let creds = store.get(PROVIDER)?;
    create_provider(PROVIDER, creds, settings)
}

fn build_manager(settings: &Settings, store: &CredentialStore) -> Result<RecordManager> {
    let inventory = host::discover(&settings.host)?;
    let api = connect(settings, store)?;
    info!("Using {} as {}", api.provider_name(), inventory.agent_id());
    Ok(RecordManager::new(api, Arc::new(inventory)))
}

fn print_messages(messages: &[String]) {
    for msg in messages {
        println!("{}", msg);
    }
}

async fn check_status(settings: &Settings, store: &CredentialStore, zone: Option<&str>) -> Result<()> {
    let inventory = host::discover(&settings.host)?;

    println!("Agent id: {}", inventory.agent_id());
    println!("Host:     {}\n", inventory.host());

    println!("Interfaces:");
    for iface in inventory.interfaces() {
        let addrs: Vec<String> = iface
            .inet
            .iter()
            .map(ToString::to_string)
            .chain(iface.inet6.iter().map(ToString::to_string))
            .collect();
        println!("  {:<12} {}", iface.name, addrs.join(", "));
    }

    if let Some(zone) = zone {
        println!("\nRecords in {}:\n", zone);

        let api = connect(settings, store)?;
        match api.list_records(zone).await {
            Ok(records) => {
                for record in records {
                    println!(
                        "  {:<40} {:<6} {:<40} ttl={}",
                        record.name, record.record_type, record.content, record.ttl
                    );
                }
            }
            Err(e) => println!("  Error - {:#}", e),
        }
    }

    Ok(())
}

fn show_config(config_path: &std::path::Path, settings: &Settings) -> Result<()> {
    println!("Configuration file location: {}\n", config_path.display());

    if config_path.exists() {
        println!("Current configuration:\n");
        println!("{}", toml::to_string_pretty(settings)?);
    } else {
        println!("Configuration file not found; defaults are in use.");
        println!("Example configuration:\n");
        println!(
            r#"[logging]
log_level = "info"

[host]
id = "web1.example.com"
host = "web1"

[cloudflare]
api_base = "https://api.cloudflare.com/client/v4"
timeout_seconds = 30
credentials_path = "{}"
"#,
            settings.credentials_path().display()
        );
    }

    Ok(())
}
