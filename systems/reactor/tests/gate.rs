use std::sync::Arc;

use nether_reactor_catalog::{PatternLayer, StructureCatalog};
use nether_reactor_core::{
    Actor, Block, BlockPos, Event, GameMode, Material, MessageKey, ReactorPhase, Rejection,
    WorldAccess,
};
use nether_reactor_system_reactor::{Activation, ActivationGate, Reactor, ReactorState};
use nether_reactor_world::{query, World};

const SURVIVOR: Actor = Actor::new(GameMode::Survival);

fn ring() -> Vec<BlockPos> {
    let mut cells = Vec::new();
    for x in -1..=1 {
        for z in -1..=1 {
            cells.push(BlockPos::new(x, -1, z));
        }
    }
    cells
}

fn catalog() -> Arc<StructureCatalog> {
    Arc::new(
        StructureCatalog::builder(BlockPos::new(-2, -1, -2), BlockPos::new(2, 2, 2))
            .spire(vec![BlockPos::new(0, 6, 0)], Material::Netherrack)
            .pattern_layer(PatternLayer::new(Material::Cobblestone, ring(), Vec::new()))
            .build()
            .expect("valid catalog"),
    )
}

fn world_with_core(anchor: BlockPos, phase: Option<ReactorPhase>, pattern: bool) -> World {
    let mut world = World::new();
    if pattern {
        for relative in ring() {
            world.set_block(anchor.offset(relative), Block::new(Material::Cobblestone));
        }
    }
    if let Some(phase) = phase {
        world.set_block(anchor, Block::reactor_core(phase));
    }
    world
}

fn attempt(world: &mut World, anchor: BlockPos, actor: Option<&Actor>) -> (Activation, Reactor) {
    let catalog = catalog();
    let gate = ActivationGate::new(Arc::clone(&catalog));
    let mut reactor = Reactor::new(anchor, catalog);
    let mut events = Vec::new();
    let outcome = gate.try_activate(world, &mut reactor, actor, &mut events);
    (outcome, reactor)
}

fn assert_rejected(world: &mut World, anchor: BlockPos, actor: Option<&Actor>, reason: Rejection) {
    let writes = query::block_writes(world);
    let (outcome, reactor) = attempt(world, anchor, actor);
    assert_eq!(outcome, Activation::Rejected(reason));
    assert_eq!(reactor.state(), ReactorState::default());
    assert_eq!(query::block_writes(world), writes, "rejection must not mutate");
    assert!(query::pending_updates(world).is_empty());
}

#[test]
fn successful_activation_builds_once_and_marks_core_active() {
    let anchor = BlockPos::new(0, 64, 0);
    let mut world = world_with_core(anchor, Some(ReactorPhase::Inactive), true);
    let catalog = catalog();
    let gate = ActivationGate::new(Arc::clone(&catalog));
    let mut reactor = Reactor::new(anchor, catalog);
    let mut events = Vec::new();

    let outcome = gate.try_activate(&mut world, &mut reactor, Some(&SURVIVOR), &mut events);
    assert_eq!(outcome, Activation::Activated);
    assert_eq!(outcome.message(), Some(MessageKey::Active));
    assert!(reactor.is_running());
    assert!(!reactor.has_turned_night());
    assert_eq!(
        world.block(anchor).reactor_phase(),
        Some(ReactorPhase::Active)
    );
    assert_eq!(
        world.block(anchor.offset(BlockPos::new(0, 6, 0))),
        Block::new(Material::Netherrack)
    );
    assert_eq!(query::pending_updates(&world), vec![anchor]);
    assert_eq!(events, vec![Event::ReactorActivated { anchor }]);

    let writes = query::block_writes(&world);
    let second = gate.try_activate(&mut world, &mut reactor, Some(&SURVIVOR), &mut events);
    assert_eq!(second, Activation::Rejected(Rejection::NotInactive));
    assert_eq!(query::block_writes(&world), writes);
}

#[test]
fn non_inactive_core_is_checked_first() {
    let anchor = BlockPos::new(3, 40, 3);
    let mut plain = world_with_core(anchor, None, false);
    assert_rejected(&mut plain, anchor, None, Rejection::NotInactive);

    for phase in [ReactorPhase::Active, ReactorPhase::Used] {
        let mut world = world_with_core(anchor, Some(phase), true);
        assert_rejected(&mut world, anchor, Some(&SURVIVOR), Rejection::NotInactive);
    }
}

#[test]
fn actors_without_finite_resources_are_refused() {
    let anchor = BlockPos::new(3, 40, 3);
    let mut world = world_with_core(anchor, Some(ReactorPhase::Inactive), false);
    assert_rejected(&mut world, anchor, None, Rejection::NoFiniteResources);
    for mode in [GameMode::Creative, GameMode::Spectator] {
        let actor = Actor::new(mode);
        assert_rejected(&mut world, anchor, Some(&actor), Rejection::NoFiniteResources);
    }
}

#[test]
fn incomplete_pattern_is_refused_with_message() {
    let anchor = BlockPos::new(3, 40, 3);
    let mut world = world_with_core(anchor, Some(ReactorPhase::Inactive), false);
    assert_rejected(&mut world, anchor, Some(&SURVIVOR), Rejection::WrongPattern);
    assert_eq!(
        Activation::Rejected(Rejection::WrongPattern).message(),
        Some(MessageKey::WrongPattern)
    );
}

#[test]
fn vertical_bounds_are_enforced() {
    let too_high = BlockPos::new(0, 290, 0);
    let mut world = world_with_core(too_high, Some(ReactorPhase::Inactive), true);
    assert_rejected(&mut world, too_high, Some(&SURVIVOR), Rejection::BuildTooHigh);

    let highest = BlockPos::new(0, 289, 0);
    let mut world = world_with_core(highest, Some(ReactorPhase::Inactive), true);
    assert_eq!(
        attempt(&mut world, highest, Some(&SURVIVOR)).0,
        Activation::Activated
    );

    let too_low = BlockPos::new(0, -62, 0);
    let mut world = world_with_core(too_low, Some(ReactorPhase::Inactive), true);
    assert_rejected(&mut world, too_low, Some(&SURVIVOR), Rejection::BuildTooLow);

    let lowest = BlockPos::new(0, -61, 0);
    let mut world = world_with_core(lowest, Some(ReactorPhase::Inactive), true);
    assert_eq!(
        attempt(&mut world, lowest, Some(&SURVIVOR)).0,
        Activation::Activated
    );
}

#[test]
fn adventure_players_may_activate() {
    let anchor = BlockPos::new(-5, 10, 9);
    let mut world = world_with_core(anchor, Some(ReactorPhase::Inactive), true);
    let actor = Actor::new(GameMode::Adventure);
    assert_eq!(attempt(&mut world, anchor, Some(&actor)).0, Activation::Activated);
}
