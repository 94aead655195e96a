#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a nether reactor from activation to decay.

mod registry;

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use nether_reactor_catalog::StructureCatalog;
use nether_reactor_core::{
    Actor, Block, BlockPos, Command, CreatureFactory, Difficulty, Event, GameMode, ReactorPhase,
};
use nether_reactor_system_reactor::{Activation, ActivationGate, Reactor};
use nether_reactor_system_rounds::PigmanFactory;
use nether_reactor_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use crate::registry::ReactorRegistry;

/// Runs a single nether reactor in an in-memory world.
#[derive(Debug, Parser)]
#[command(name = "nether-reactor", version, about)]
struct Args {
    /// Directory holding the structure definition files.
    #[arg(long, default_value = "assets/structure")]
    assets: PathBuf,
    /// Seed for loot, creature placement and spire decay.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Upper bound on simulated world ticks.
    #[arg(long, default_value_t = 1_000)]
    ticks: u32,
    /// World difficulty.
    #[arg(long, value_enum, default_value_t = DifficultyArg::Normal)]
    difficulty: DifficultyArg,
    /// Initial absolute world time.
    #[arg(long, default_value_t = 0)]
    time: i64,
    /// Disables the creature extension.
    #[arg(long)]
    no_creatures: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Peaceful,
    Easy,
    Normal,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Peaceful => Self::Peaceful,
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Normal => Self::Normal,
            DifficultyArg::Hard => Self::Hard,
        }
    }
}

/// Tally of what happened during the run.
#[derive(Debug, Default)]
struct Summary {
    rounds: usize,
    loot: usize,
    creatures: usize,
    transformations: usize,
    corrupted: usize,
    night_fell_at: Option<i64>,
}

impl Summary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::RoundStarted { .. } => self.rounds += 1,
                Event::LootDropped { .. } => self.loot += 1,
                Event::CreatureSpawned { .. } => self.creatures += 1,
                Event::LayerTransformed { .. } => self.transformations += 1,
                Event::SpireCorrupted { removed, .. } => self.corrupted += removed,
                Event::NightFell { time_of_day, .. } => self.night_fell_at = Some(*time_of_day),
                _ => {}
            }
        }
    }
}

/// Entry point for the nether reactor command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let catalog = StructureCatalog::from_dir(&args.assets)
        .with_context(|| format!("failed to load structure from {}", args.assets.display()))?;
    run(&args, Arc::new(catalog))
}

fn run(args: &Args, catalog: Arc<StructureCatalog>) -> Result<()> {
    let anchor = BlockPos::new(0, 64, 0);
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetDifficulty {
            difficulty: args.difficulty.into(),
        },
        &mut events,
    );
    world::apply(&mut world, Command::SetTime { time: args.time }, &mut events);
    place_pattern(&mut world, &catalog, anchor, &mut events);

    let mut registry = ReactorRegistry::default();
    registry.insert(Reactor::new(anchor, Arc::clone(&catalog)));

    let gate = ActivationGate::new(catalog);
    let actor = Actor::new(GameMode::Survival);
    let Some(reactor) = registry.get_mut(anchor) else {
        bail!("no reactor registered at {anchor}");
    };
    let activation = gate.try_activate(&mut world, reactor, Some(&actor), &mut events);
    if let Some(message) = activation.message() {
        println!("{}", message.translation_key());
    }
    if let Activation::Rejected(reason) = activation {
        bail!("reactor at {anchor} refused to start: {reason:?}");
    }

    let factory = PigmanFactory;
    let creatures: Option<&dyn CreatureFactory> = if args.no_creatures {
        None
    } else {
        Some(&factory)
    };
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut summary = Summary::default();

    for _ in 0..args.ticks {
        let mut due = Vec::new();
        world::apply(&mut world, Command::Tick, &mut due);
        let mut produced = Vec::new();
        registry.dispatch(&mut world, &due, &mut rng, creatures, &mut produced);
        summary.record(&produced);
        if !registry.any_running() {
            break;
        }
    }

    let progress = registry.get(anchor).map_or(0, Reactor::progress);
    let phase = query::block(&world, anchor)
        .reactor_phase()
        .map_or("none", ReactorPhase::name);
    let difficulty = query::difficulty(&world);
    tracing::info!(%anchor, phase, progress, ?difficulty, "reactor run complete");
    println!("reactor at {anchor}: phase {phase}, progress {progress}");
    println!("difficulty {difficulty:?}");
    println!(
        "{} rounds, {} loot drops, {} creatures, {} layer transformations",
        summary.rounds, summary.loot, summary.creatures, summary.transformations
    );
    match summary.night_fell_at {
        Some(time_of_day) => println!("night fell at time of day {time_of_day}"),
        None => println!("night never fell"),
    }
    println!(
        "{} spire blocks knocked out after {} world ticks",
        summary.corrupted,
        query::tick_index(&world)
    );
    Ok(())
}

fn place_pattern(
    world: &mut World,
    catalog: &StructureCatalog,
    anchor: BlockPos,
    events: &mut Vec<Event>,
) {
    for layer in catalog.pattern_layers() {
        for relative in layer.blocks() {
            world::apply(
                world,
                Command::PlaceBlock {
                    pos: anchor.offset(*relative),
                    block: Block::new(layer.material()),
                },
                events,
            );
        }
    }
    world::apply(
        world,
        Command::PlaceBlock {
            pos: anchor,
            block: Block::reactor_core(ReactorPhase::Inactive),
        },
        events,
    );
}
