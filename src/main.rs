//! Dice casino binary
//!
//! `serve` runs the HTTP API, `init-config` writes a sample configuration,
//! `hash-token` prepares the operator credential and `simulate` deploys a
//! casino in-process and plays a series of bets.

use clap::{Parser, Subcommand};
use dice_casino::{
    api::{hash_api_key, ApiServer, AppState, OperatorAuth},
    config::{generate_sample_config, LogLevel},
    AccountId, Amount, Casino, CasinoConfig, CasinoResult, ConfigLoader,
};
use std::{path::PathBuf, sync::Arc};
use tracing::info;

/// Dice Casino CLI
#[derive(Parser)]
#[command(name = "dice-casino")]
#[command(about = "Provably fair dice wagering engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the hash to store as `api.operator_token_hash`
    HashToken {
        /// Raw bearer token the operator will present
        token: String,
    },

    /// Write a sample configuration file
    InitConfig {
        /// Destination path
        #[arg(default_value = "dice-casino.toml")]
        path: String,
    },

    /// Deploy a casino in-process and play bets against it
    Simulate {
        /// Number of bets to place
        #[arg(short, long, default_value = "10")]
        bets: usize,

        /// Stake per bet
        #[arg(short, long, default_value = "0.05")]
        stake: Amount,

        /// Number chosen by every player (1-6)
        #[arg(short = 'n', long, default_value = "3")]
        number: u8,

        /// Distinct players taking turns
        #[arg(long, default_value = "3")]
        players: usize,
    },
}

#[tokio::main]
async fn main() -> CasinoResult<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_path(path);
    }

    match cli.command {
        Commands::HashToken { token } => {
            println!("{}", hash_api_key(&token));
            Ok(())
        }
        Commands::InitConfig { path } => {
            init_tracing(LogLevel::Info, cli.verbose);
            generate_sample_config(&path)?;
            info!(path = %path, "Sample configuration written");
            Ok(())
        }
        Commands::Serve { port } => {
            let mut config = loader.load()?;
            if let Some(port) = port {
                config.api.port = port;
                config.validate()?;
            }
            init_tracing(config.monitoring.log_level, cli.verbose);
            serve(config).await
        }
        Commands::Simulate {
            bets,
            stake,
            number,
            players,
        } => {
            let config = loader.load()?;
            init_tracing(config.monitoring.log_level, cli.verbose);
            simulate(&config, bets, stake, number, players.max(1))
        }
    }
}

/// `RUST_LOG` wins, otherwise the configured level
fn init_tracing(level: LogLevel, verbose: bool) {
    let default_level = if verbose { LogLevel::Debug } else { level };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("dice_casino={},tower_http=info", default_level.as_filter()).into()
            }),
        )
        .init();
}

async fn serve(config: CasinoConfig) -> CasinoResult<()> {
    let operator_auth = OperatorAuth::from_config(&config.api)?;
    let casino = Arc::new(Casino::from_config(&config)?);
    info!(
        balance = %casino.balance_of(),
        vrf_public_key = ?casino.vrf_public_key(),
        "Casino ready"
    );

    let state = Arc::new(AppState::new(casino, operator_auth));
    ApiServer::new(config.api, state).run().await
}

fn simulate(
    config: &CasinoConfig,
    bets: usize,
    stake: Amount,
    number: u8,
    players: usize,
) -> CasinoResult<()> {
    let casino = Casino::from_config(config)?;
    let parameters = casino.parameters();

    println!("Dice casino deployed");
    println!("   Operator:   {}", casino.operator());
    println!("   Randomness: {}", casino.randomness_kind());
    println!(
        "   Limits:     {} - {} (house edge {} bps)",
        parameters.min_bet, parameters.max_bet, parameters.house_edge_bps
    );
    println!("   Treasury:   {}", casino.balance_of());
    println!();

    for i in 0..bets {
        let player = AccountId::new(format!("player-{}", i % players + 1));
        match casino.place_bet(&player, number, stake) {
            Ok(record) => println!(
                "#{:<4} {:<10} chose {} rolled {} -> {:?} payout {}",
                record.game_id,
                record.player,
                record.chosen_number,
                record.rolled_number,
                record.outcome,
                record.payout
            ),
            Err(e) => println!("       {:<10} rejected: {} ({})", player, e, e.code()),
        }
    }

    let stats = casino.stats();
    let totals = casino.treasury_totals();
    println!();
    println!("Results");
    println!("   Bets settled: {} ({} wins)", stats.bet_count, stats.wins);
    println!("   Wagered:      {}", stats.total_wagered);
    println!("   Paid out:     {}", stats.total_paid_out);
    println!("   Treasury:     {}", totals.balance);
    Ok(())
}
