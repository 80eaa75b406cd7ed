//! mudcombat - roll dice or run a fight from a world file

use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use mudcombat::combat::{self, DiceExpression};
use mudcombat::world::World;
use mudcombat::{Arena, Config};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "mudcombat", version, about = "Turn-based melee combat for MUD worlds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Roll a dice expression such as "2d6+3"
    Roll {
        expr: String,
        #[arg(long, default_value_t = 1)]
        times: u32,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Attack a target and keep fighting until the target dies or is lost
    Fight {
        /// TOML file with [[entity]] tables
        #[arg(long)]
        world: PathBuf,
        /// Entity ID of the attacker
        #[arg(long)]
        attacker: String,
        /// Name or keyword of the target in the attacker's room
        #[arg(long)]
        target: String,
        /// Combat config file
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        /// Print each turn as JSON
        #[arg(long)]
        json: bool,
        /// Stop after this many follow-up turns
        #[arg(long, default_value_t = 100)]
        max_turns: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mudcombat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match Cli::parse().command {
        Commands::Roll { expr, times, seed } => roll(&expr, times, seed),
        Commands::Fight {
            world,
            attacker,
            target,
            config,
            seed,
            json,
            max_turns,
        } => {
            if let Some(path) = &config {
                ensure!(path.exists(), "config file {} not found", path.display());
            }
            let mut config = Config::load(config.as_deref()).context("failed to load config")?;
            if seed.is_some() {
                config.seed = seed;
            }
            let world = World::load(&world)?;
            fight(Arena::from_config(world, &config), &config, &attacker, &target, json, max_turns)
                .await
        }
    }
}

fn roll(expr: &str, times: u32, seed: Option<u64>) -> Result<()> {
    let expr: DiceExpression = expr.parse()?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    println!(
        "{}: min {}, max {}, average {}",
        expr,
        expr.min(),
        expr.max(),
        expr.average()
    );
    for _ in 0..times {
        println!("{}", combat::roll(&expr, &mut rng));
    }
    Ok(())
}

async fn fight(
    mut arena: Arena,
    config: &Config,
    attacker: &str,
    target: &str,
    json: bool,
    max_turns: usize,
) -> Result<()> {
    ensure!(
        arena.world().get(attacker).is_some(),
        "no entity {} in world",
        attacker
    );

    let first = arena.command(attacker, &format!("attack {}", target));
    flush(&arena);
    let first = match first {
        Ok(result) => result,
        Err(e) => {
            info!("{} could not attack {}: {}", attacker, target, e);
            return Ok(());
        }
    };
    if json {
        println!("{}", serde_json::to_string(&first)?);
    }

    let mut interval = tokio::time::interval(config.tick_interval());
    let mut turns = 0;
    while !arena.is_quiet() && turns < max_turns {
        interval.tick().await;
        for follow_up in arena.tick() {
            turns += 1;
            if json {
                println!("{}", serde_json::to_string(&follow_up)?);
            }
        }
        flush(&arena);
    }

    info!("fight over after {} follow-up turns", turns);
    Ok(())
}

fn flush(arena: &Arena) {
    for message in arena.drain_messages() {
        println!("[{}] {}", message.target_id, message.message);
    }
}
