//! Temporary Traits Benchmark
//!
//! Seeds players with random classes and ticks the world for a month.
//! Usage: `temptraits-demo [traits.json characterclasses.json]`

use rand::seq::SliceRandom;
use std::path::PathBuf;
use std::sync::Arc;
use temptraits::{DefinitionSources, EngineConfig, Registries, TraitWorld};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const BUNDLED_TRAITS: &str = include_str!("../data/traits.json");
const BUNDLED_CLASSES: &str = include_str!("../data/characterclasses.json");

const INITIAL_PLAYERS: usize = 10_000;
const TICKS: u32 = 30 * 24;

fn load_registries() -> anyhow::Result<Registries> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let registries = match args.as_slice() {
        [traits, classes] => DefinitionSources {
            trait_files: vec![PathBuf::from(traits)],
            class_files: vec![PathBuf::from(classes)],
        }
        .load()?,
        [] => Registries::from_json_strs(&[BUNDLED_TRAITS], &[BUNDLED_CLASSES])?,
        _ => anyhow::bail!("usage: temptraits-demo [traits.json characterclasses.json]"),
    };
    Ok(registries)
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Temporary traits engine starting...");

    let registries = Arc::new(load_registries()?);
    let mut classes: Vec<String> = registries.classes.codes().map(str::to_string).collect();
    classes.sort();
    anyhow::ensure!(!classes.is_empty(), "no character classes defined");

    let mut world = TraitWorld::new(Arc::clone(&registries), EngineConfig::default());

    info!("Seeding {} players...", INITIAL_PLAYERS);
    let mut rng = rand::thread_rng();
    for i in 0..INITIAL_PLAYERS {
        let player = world.spawn_player(format!("Player_{}", i + 1));
        if let Some(class_code) = classes.choose(&mut rng) {
            world.select_class(player, class_code)?;
        }
    }
    info!("Players seeded. Entity count: {}", world.player_count());

    info!("Running 30 day benchmark ({} ticks)...", TICKS);
    let start = std::time::Instant::now();
    let mut expired = 0u32;
    let mut damage_events = 0u32;
    for _ in 0..TICKS {
        let result = world.tick();
        expired += result.expired;
        damage_events += result.damage_events;
    }
    let elapsed = start.elapsed();

    info!(
        "Benchmark complete: {:?} total, {:?} per tick, {} traits expired, {} damage events",
        elapsed,
        elapsed / TICKS,
        expired,
        damage_events
    );

    if let Some(stats) = memory_stats::memory_stats() {
        info!("Physical memory: {} MB", stats.physical_mem / (1024 * 1024));
    }

    Ok(())
}
