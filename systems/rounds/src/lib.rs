#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round scheduler that drops loot and summons creatures while a reactor runs.
//!
//! Rounds are plain definitions owned by the [`StructureCatalog`]; this
//! crate decides what a fired round actually does to the world. Loot lands
//! on a ring around the core, creatures are placed by rejection sampling so
//! that they never appear on the pattern's rows or columns.

use std::{collections::HashSet, sync::Arc};

use glam::DVec3;
use nether_reactor_catalog::{Round, StructureCatalog};
use nether_reactor_core::{
    BlockPos, BoundingBox, Creature, CreatureFactory, CreatureKind, Difficulty, EntityKind, Event,
    Item, Location, WorldAccess,
};
use rand::Rng;

/// Ticks a dropped loot item stays in the world.
pub const LOOT_DESPAWN_DELAY: u32 = 600;
/// Largest number of creatures a single round may summon.
pub const MAX_PIGMEN_SPAWN_PER_ROUND: usize = 2;
/// Creature population of the room at which rounds stop summoning.
pub const MAX_PIGMEN_COUNT: usize = 3;

const PLANT_LOOT: [Item; 6] = [
    Item::Cactus,
    Item::BrownMushroom,
    Item::RedMushroom,
    Item::Sugarcane,
    Item::MelonSeeds,
    Item::PumpkinSeeds,
];

/// Draws one loot item: 48% plants and seeds, 22% glowstone dust, 30% quartz.
pub fn random_loot<R>(rng: &mut R) -> Item
where
    R: Rng + ?Sized,
{
    match rng.gen_range(1..=50_u32) {
        1..=24 => PLANT_LOOT[rng.gen_range(0..PLANT_LOOT.len())],
        25..=35 => Item::GlowstoneDust,
        _ => Item::NetherQuartz,
    }
}

/// Point on a ring of `radius` blocks around `center`, snapped to a block centre.
pub fn ring_position<R>(center: DVec3, radius: i32, rng: &mut R) -> DVec3
where
    R: Rng + ?Sized,
{
    let angle = rng.gen_range(0.0..360.0_f64).to_radians();
    let radius = f64::from(radius);
    DVec3::new(
        center.x + (radius * angle.cos()).floor() + 0.5,
        center.y,
        center.z + (radius * angle.sin()).floor() + 0.5,
    )
}

/// Creature factory producing zombie pigmen.
#[derive(Clone, Copy, Debug, Default)]
pub struct PigmanFactory;

impl CreatureFactory for PigmanFactory {
    fn create(&self, location: Location) -> Creature {
        Creature {
            kind: CreatureKind::ZombiePigman,
            location,
        }
    }
}

/// Columns of the room where creatures must not appear.
#[derive(Debug)]
struct SpawnExclusion {
    anchor_x: i32,
    anchor_z: i32,
    xs: HashSet<i32>,
    zs: HashSet<i32>,
}

impl SpawnExclusion {
    fn new(catalog: &StructureCatalog, anchor: BlockPos) -> Self {
        let mut xs = HashSet::new();
        let mut zs = HashSet::new();
        for relative in catalog.pattern_cells() {
            let cell = anchor.offset(relative);
            let _ = xs.insert(cell.x());
            let _ = zs.insert(cell.z());
        }
        Self {
            anchor_x: anchor.x(),
            anchor_z: anchor.z(),
            xs,
            zs,
        }
    }

    fn allows(&self, x: i32, z: i32) -> bool {
        !(x == self.anchor_x && z == self.anchor_z)
            && !self.xs.contains(&x)
            && !self.zs.contains(&z)
    }

    fn has_candidate(&self, room: &BoundingBox) -> bool {
        let free_xs: Vec<i32> = (room.min().x()..=room.max().x())
            .filter(|x| !self.xs.contains(x))
            .collect();
        let free_zs: Vec<i32> = (room.min().z()..=room.max().z())
            .filter(|z| !self.zs.contains(z))
            .collect();
        free_xs
            .iter()
            .any(|&x| free_zs.iter().any(|&z| self.allows(x, z)))
    }
}

/// Fires the catalog's rounds for one reactor.
#[derive(Clone, Debug)]
pub struct RoundScheduler {
    catalog: Arc<StructureCatalog>,
}

impl RoundScheduler {
    /// Creates a scheduler reading rounds from the shared catalog.
    #[must_use]
    pub fn new(catalog: Arc<StructureCatalog>) -> Self {
        Self { catalog }
    }

    /// Starts every round scheduled for `progress`, returning how many fired.
    pub fn fire_due<W, R>(
        &self,
        progress: u32,
        world: &mut W,
        anchor: BlockPos,
        rng: &mut R,
        creatures: Option<&dyn CreatureFactory>,
        out_events: &mut Vec<Event>,
    ) -> usize
    where
        W: WorldAccess + ?Sized,
        R: Rng + ?Sized,
    {
        let mut fired = 0;
        for round in self.catalog.rounds() {
            if !round.can_start(progress) {
                continue;
            }
            tracing::debug!(%anchor, tick = progress, "round started");
            out_events.push(Event::RoundStarted {
                anchor,
                tick: progress,
            });
            self.start(round, world, anchor, rng, creatures, out_events);
            fired += 1;
        }
        fired
    }

    /// Drops the round's loot and, when allowed, summons creatures.
    pub fn start<W, R>(
        &self,
        round: &Round,
        world: &mut W,
        anchor: BlockPos,
        rng: &mut R,
        creatures: Option<&dyn CreatureFactory>,
        out_events: &mut Vec<Event>,
    ) where
        W: WorldAccess + ?Sized,
        R: Rng + ?Sized,
    {
        let room = self.catalog.room_box(anchor);
        let center = DVec3::new(
            f64::from(anchor.x()),
            f64::from(room.min().y()),
            f64::from(anchor.z()),
        );

        let amount = rng.gen_range(round.min_loot()..=round.max_loot());
        for _ in 0..amount {
            let radius = self.random_radius(rng);
            let position = ring_position(center, radius, rng);
            let item = random_loot(rng);
            if let Some(entity) = world.drop_item(position, item) {
                world.set_despawn_delay(entity, LOOT_DESPAWN_DELAY);
                out_events.push(Event::LootDropped { item, position });
            }
        }

        if !round.spawns_creatures() {
            return;
        }
        let Some(factory) = creatures else {
            return;
        };
        if world.difficulty() == Difficulty::Peaceful {
            return;
        }
        let _ = self.try_spawn_creatures(world, anchor, rng, factory, out_events);
    }

    /// Tops the room's creature population up, returning how many were spawned.
    pub fn try_spawn_creatures<W, R>(
        &self,
        world: &mut W,
        anchor: BlockPos,
        rng: &mut R,
        factory: &dyn CreatureFactory,
        out_events: &mut Vec<Event>,
    ) -> usize
    where
        W: WorldAccess + ?Sized,
        R: Rng + ?Sized,
    {
        let room = self.catalog.room_box(anchor);
        let present = world
            .nearby_entities(&room)
            .into_iter()
            .filter(|kind| *kind == EntityKind::Creature(CreatureKind::ZombiePigman))
            .count();
        if present >= MAX_PIGMEN_COUNT {
            return 0;
        }

        let exclusion = SpawnExclusion::new(&self.catalog, anchor);
        if !exclusion.has_candidate(&room) {
            tracing::warn!(%anchor, "room has no free column for creatures");
            return 0;
        }

        let wanted = MAX_PIGMEN_SPAWN_PER_ROUND.min(MAX_PIGMEN_COUNT - present);
        for _ in 0..wanted {
            let (x, z) = loop {
                let x = rng.gen_range(room.min().x()..=room.max().x());
                let z = rng.gen_range(room.min().z()..=room.max().z());
                if exclusion.allows(x, z) {
                    break (x, z);
                }
            };
            let yaw = rng.gen_range(0.0..360.0_f32);
            let floor = BlockPos::new(x, room.min().y(), z);
            let creature = factory.create(Location::new(floor.bottom_center(), yaw, 0.0));
            let _ = world.spawn_creature(creature);
            out_events.push(Event::CreatureSpawned {
                kind: creature.kind,
                location: creature.location,
            });
        }
        wanted
    }

    fn random_radius<R>(&self, rng: &mut R) -> i32
    where
        R: Rng + ?Sized,
    {
        let inner = self.catalog.pattern_radius();
        let outer = self.catalog.room_radius();
        rng.gen_range(inner.min(outer)..=inner.max(outer))
    }
}
