use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gno_faucet::chain::{Coin, HttpClient, StaticEstimator};
use gno_faucet::config::{apply_env_overrides, read_config, Config};
use gno_faucet::lifecycle::{spawn_signal_listener, Shutdown};
use gno_faucet::Faucet;

const DEFAULT_REMOTE: &str = "http://127.0.0.1:26657";
const DEFAULT_GAS_FEE: &str = "1000000ugnot";
const DEFAULT_GAS_WANTED: i64 = 100_000;

#[derive(Parser)]
#[command(name = "gno-faucet")]
#[command(about = "Native-currency faucet for Tendermint2-family chains", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the faucet
    Serve(ServeArgs),
    /// Write a default TOML configuration file
    Generate(GenerateArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Path to the faucet TOML configuration, if any
    #[arg(long)]
    config: Option<PathBuf>,

    /// The JSON-RPC URL of the remote chain
    #[arg(long, default_value = DEFAULT_REMOTE)]
    remote: String,

    /// The static gas fee for the transaction, `<AMOUNT>ugnot` form
    #[arg(long, default_value = DEFAULT_GAS_FEE)]
    gas_fee: String,

    /// The static gas wanted for the transaction
    #[arg(long, default_value_t = DEFAULT_GAS_WANTED)]
    gas_wanted: i64,

    /// The IP:PORT address for the faucet server
    #[arg(long)]
    listen_address: Option<String>,

    /// The chain ID associated with the remote chain
    #[arg(long)]
    chain_id: Option<String>,

    /// The mnemonic for the faucet keys
    #[arg(long)]
    mnemonic: Option<String>,

    /// The number of faucet accounts derived from the mnemonic
    #[arg(long)]
    num_accounts: Option<u64>,

    /// The max send amount per drip
    #[arg(long)]
    max_send_amount: Option<String>,
}

#[derive(Args)]
struct GenerateArgs {
    /// Where to write the configuration
    #[arg(long, default_value = "config.toml")]
    output: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gno_faucet=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Generate(args) => generate(args),
    };

    if let Err(err) = result {
        tracing::error!(error = %err, "faucet exited with an error");
        std::process::exit(1);
    }
}

/// Assembles the faucet from config file, environment and flags
/// (in increasing precedence) and serves it until a signal arrives.
async fn serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => Config::default(),
    };

    apply_env_overrides(&mut config)?;

    if let Some(listen_address) = args.listen_address {
        config.listen_address = listen_address;
    }
    if let Some(chain_id) = args.chain_id {
        config.chain_id = chain_id;
    }
    if let Some(mnemonic) = args.mnemonic {
        config.mnemonic = mnemonic;
    }
    if let Some(num_accounts) = args.num_accounts {
        config.num_accounts = num_accounts;
    }
    if let Some(max_send_amount) = args.max_send_amount {
        config.max_send_amount = max_send_amount;
    }

    // Static gas estimation, until the chain supports estimating
    let gas_fee: Coin = args.gas_fee.parse()?;
    let estimator = StaticEstimator::new(gas_fee, args.gas_wanted);

    let client = HttpClient::new(&args.remote)?;

    let faucet = Faucet::builder(estimator, client)
        .with_config(config)
        .build()?;

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    faucet.serve(shutdown).await?;

    Ok(())
}

/// Writes the default configuration to the requested path.
fn generate(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.output.exists() {
        return Err(format!("refusing to overwrite {}", args.output.display()).into());
    }

    let config = Config {
        cors_config: Some(gno_faucet::config::CorsConfig::default()),
        ..Config::default()
    };

    std::fs::write(&args.output, toml::to_string_pretty(&config)?)?;

    println!("wrote default configuration to {}", args.output.display());

    Ok(())
}
