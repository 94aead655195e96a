use std::{collections::HashSet, sync::Arc};

use nether_reactor_catalog::{PatternLayer, Round, StructureCatalog};
use nether_reactor_core::{
    BlockPos, Command, CreatureKind, Difficulty, Event, Material, WorldAccess,
};
use nether_reactor_system_rounds::{
    PigmanFactory, RoundScheduler, LOOT_DESPAWN_DELAY, MAX_PIGMEN_COUNT,
};
use nether_reactor_world::{apply, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const ANCHOR: BlockPos = BlockPos::new(4, 70, -9);

fn pattern_ring() -> Vec<BlockPos> {
    let mut cells = Vec::new();
    for x in -1..=1 {
        for z in -1..=1 {
            cells.push(BlockPos::new(x, -1, z));
        }
    }
    cells
}

fn catalog_with(rounds: Vec<Round>) -> Arc<StructureCatalog> {
    let mut builder =
        StructureCatalog::builder(BlockPos::new(-3, -1, -3), BlockPos::new(3, 3, 3))
            .pattern_layer(PatternLayer::new(
                Material::Cobblestone,
                pattern_ring(),
                Vec::new(),
            ))
            .pattern_radius(1);
    for round in rounds {
        builder = builder.round(round);
    }
    Arc::new(builder.build().expect("valid catalog"))
}

fn creature_round(tick: u32) -> Round {
    Round::new(tick, 1, 1, true).expect("valid round")
}

fn creature_columns(events: &[Event]) -> Vec<(i32, i32)> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::CreatureSpawned { location, .. } => Some((
                location.position.x.floor() as i32,
                location.position.z.floor() as i32,
            )),
            _ => None,
        })
        .collect()
}

#[test]
fn only_rounds_matching_progress_fire() {
    let catalog = catalog_with(vec![
        Round::new(40, 2, 4, false).expect("valid round"),
        Round::new(120, 3, 5, false).expect("valid round"),
    ]);
    let scheduler = RoundScheduler::new(catalog);
    let mut world = World::new();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut events = Vec::new();

    for progress in 0..200 {
        let _ = scheduler.fire_due(progress, &mut world, ANCHOR, &mut rng, None, &mut events);
    }

    let started: Vec<u32> = events
        .iter()
        .filter_map(|event| match event {
            Event::RoundStarted { tick, .. } => Some(*tick),
            _ => None,
        })
        .collect();
    assert_eq!(started, vec![40, 120]);
    let dropped = query::dropped_items(&world).len();
    assert!((5..=9).contains(&dropped), "dropped {dropped} items");
}

#[test]
fn loot_lands_on_the_room_floor_and_despawns() {
    let catalog = catalog_with(vec![Round::new(5, 3, 3, false).expect("valid round")]);
    let room = catalog.room_box(ANCHOR);
    let scheduler = RoundScheduler::new(catalog);
    let mut world = World::new();
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut events = Vec::new();

    assert_eq!(
        scheduler.fire_due(5, &mut world, ANCHOR, &mut rng, None, &mut events),
        1
    );
    let entities = query::entities(&world);
    assert_eq!(entities.len(), 3);
    for entity in &entities {
        assert_eq!(entity.position().y, f64::from(room.min().y()));
        assert_eq!(entity.despawn_in(), Some(LOOT_DESPAWN_DELAY));
        let dx = entity.position().x - f64::from(ANCHOR.x());
        let dz = entity.position().z - f64::from(ANCHOR.z());
        assert!(dx.abs() <= 4.5 && dz.abs() <= 4.5);
    }

    for _ in 0..LOOT_DESPAWN_DELAY {
        apply(&mut world, Command::Tick, &mut events);
    }
    assert!(query::dropped_items(&world).is_empty());
}

#[test]
fn creatures_never_share_a_row_or_column_with_the_pattern() {
    let catalog = catalog_with(vec![creature_round(1)]);
    let scheduler = RoundScheduler::new(Arc::clone(&catalog));

    let pattern_xs: HashSet<i32> = catalog
        .pattern_cells()
        .map(|relative| ANCHOR.offset(relative).x())
        .collect();
    let pattern_zs: HashSet<i32> = catalog
        .pattern_cells()
        .map(|relative| ANCHOR.offset(relative).z())
        .collect();
    let room = catalog.room_box(ANCHOR);
    let mut legal = HashSet::new();
    for x in room.min().x()..=room.max().x() {
        for z in room.min().z()..=room.max().z() {
            if (x, z) != (ANCHOR.x(), ANCHOR.z())
                && !pattern_xs.contains(&x)
                && !pattern_zs.contains(&z)
            {
                let _ = legal.insert((x, z));
            }
        }
    }
    assert_eq!(legal.len(), 16);

    let mut chosen = HashSet::new();
    for seed in 0..200 {
        let mut world = World::new();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut events = Vec::new();
        let spawned = scheduler.try_spawn_creatures(
            &mut world,
            ANCHOR,
            &mut rng,
            &PigmanFactory,
            &mut events,
        );
        assert_eq!(spawned, 2);
        for column in creature_columns(&events) {
            assert!(legal.contains(&column), "illegal spawn column {column:?}");
            let _ = chosen.insert(column);
        }
    }
    assert_eq!(chosen, legal);
}

#[test]
fn creature_population_is_capped() {
    let catalog = catalog_with(vec![creature_round(1)]);
    let scheduler = RoundScheduler::new(catalog);
    let mut world = World::new();
    let mut rng = ChaCha8Rng::seed_from_u64(77);
    let mut events = Vec::new();

    let mut spawned = Vec::new();
    for _ in 0..4 {
        spawned.push(scheduler.try_spawn_creatures(
            &mut world,
            ANCHOR,
            &mut rng,
            &PigmanFactory,
            &mut events,
        ));
    }
    assert_eq!(spawned, vec![2, 1, 0, 0]);
    assert_eq!(
        query::creature_count(&world, CreatureKind::ZombiePigman),
        MAX_PIGMEN_COUNT
    );
}

#[test]
fn peaceful_worlds_and_missing_factories_summon_nothing() {
    let catalog = catalog_with(vec![creature_round(3)]);
    let scheduler = RoundScheduler::new(catalog);
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let mut world = World::new();
    let mut events = Vec::new();
    let _ = scheduler.fire_due(3, &mut world, ANCHOR, &mut rng, None, &mut events);
    assert_eq!(query::creature_count(&world, CreatureKind::ZombiePigman), 0);

    let mut world = World::new();
    apply(
        &mut world,
        Command::SetDifficulty {
            difficulty: Difficulty::Peaceful,
        },
        &mut events,
    );
    let _ = scheduler.fire_due(3, &mut world, ANCHOR, &mut rng, Some(&PigmanFactory), &mut events);
    assert_eq!(query::creature_count(&world, CreatureKind::ZombiePigman), 0);

    let mut world = World::new();
    let _ = scheduler.fire_due(3, &mut world, ANCHOR, &mut rng, Some(&PigmanFactory), &mut events);
    assert_eq!(query::creature_count(&world, CreatureKind::ZombiePigman), 2);
}

#[test]
fn crowded_room_skips_spawning() {
    let catalog = Arc::new(
        StructureCatalog::builder(BlockPos::new(-1, -1, -1), BlockPos::new(1, 1, 1))
            .pattern_layer(PatternLayer::new(
                Material::Cobblestone,
                pattern_ring(),
                Vec::new(),
            ))
            .build()
            .expect("valid catalog"),
    );
    let scheduler = RoundScheduler::new(Arc::clone(&catalog));
    let mut world = World::new();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut events = Vec::new();

    let spawned =
        scheduler.try_spawn_creatures(&mut world, ANCHOR, &mut rng, &PigmanFactory, &mut events);
    assert_eq!(spawned, 0);
    assert!(world.nearby_entities(&catalog.room_box(ANCHOR)).is_empty());
}
