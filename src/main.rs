//! noipv6-duc - IPv6 dynamic DNS update client.

use clap::{Parser, Subcommand};
use noipv6_duc::config::Config;
use noipv6_duc::controller::UpdateController;
use noipv6_duc::probe::{AddressProbe, CommandAddressSource};
use noipv6_duc::provider::NoIpClient;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "noipv6-duc")]
#[command(about = "Keeps a dynamic DNS hostname pointed at this host's IPv6 address")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the update loop (default)
    Run,

    /// Show configuration and the current IPv6 address
    Status,

    /// Publish the current address once
    Update,

    /// Validate configuration
    Validate,

    /// Print an example configuration
    Init,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.unwrap_or_else(Config::default_path);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let config = load_config(&config_path)?;
            cmd_run(config).await?;
        }
        Commands::Status => {
            let config = load_config(&config_path)?;
            cmd_status(config).await?;
        }
        Commands::Update => {
            let config = load_config(&config_path)?;
            cmd_update(config).await?;
        }
        Commands::Validate => {
            let config = load_config(&config_path)?;
            cmd_validate(config);
        }
        Commands::Init => {
            print!("{}", Config::example().to_toml()?);
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Parsing config: {}", path.display());
    Ok(Config::load_from(path)?)
}

fn build_controller(
    config: &Config,
) -> anyhow::Result<UpdateController<CommandAddressSource, NoIpClient>> {
    let probe = AddressProbe::new(CommandAddressSource::new(&config.client.address_command));
    let transport = NoIpClient::new(config)?;

    Ok(UpdateController::new(
        config.host.host_name.clone(),
        config.interval(),
        probe,
        transport,
    ))
}

async fn cmd_run(config: Config) -> anyhow::Result<()> {
    let mut controller = build_controller(&config)?;
    controller.run().await?;
    Ok(())
}

async fn cmd_status(config: Config) -> anyhow::Result<()> {
    let probe = AddressProbe::new(CommandAddressSource::new(&config.client.address_command));

    println!("noipv6-duc Status");
    println!("=================\n");
    println!("Host:     {}", config.host.host_name);
    println!("Interval: {} minutes", config.host.interval);
    println!("Endpoint: {}", config.client.update_url);

    match probe.current_ipv6().await {
        Ok(ip) => println!("Current IPv6: {}", ip),
        Err(e) => println!("Current IPv6: {}", e),
    }

    Ok(())
}

async fn cmd_update(config: Config) -> anyhow::Result<()> {
    let probe = AddressProbe::new(CommandAddressSource::new(&config.client.address_command));
    let address = probe.current_ipv6().await?;

    let mut controller = build_controller(&config)?;

    print!("Updating {} to {}... ", config.host.host_name, address);
    let outcome = controller.publish(&address).await?;
    println!("{}", outcome);

    if outcome.is_transient() {
        println!("Provider is unavailable; try again in 30 minutes.");
    }

    Ok(())
}

fn cmd_validate(config: Config) {
    println!("Configuration OK\n");
    println!("  host_name: {}", config.host.host_name);
    println!("  interval:  {} minutes", config.host.interval);
    println!("  user:      {}", config.auth.user);
    println!("  endpoint:  {}", config.client.update_url);
    println!("  addresses: {}", config.client.address_command);
}
