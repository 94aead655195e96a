#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative in-memory world used to host nether reactors.
//!
//! The world stores sparse block data, a clock, live entities and the queue
//! of delayed block updates. Hosts drive it through [`apply`] and read it
//! through the [`query`] module, while reactor systems reach it through the
//! [`WorldAccess`] implementation.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use glam::DVec3;
use nether_reactor_core::{
    Block, BlockPos, BoundingBox, Command, Creature, Difficulty, EntityId, EntityKind, Event, Item,
    WorldAccess,
};

const DEFAULT_MIN_Y: i32 = -64;
const DEFAULT_MAX_Y: i32 = 320;

/// Live entity tracked by the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entity {
    kind: EntityKind,
    position: DVec3,
    despawn_in: Option<u32>,
}

impl Entity {
    /// Kind of the entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Position of the entity.
    #[must_use]
    pub const fn position(&self) -> DVec3 {
        self.position
    }

    /// Remaining ticks before the entity despawns, if it ever does.
    #[must_use]
    pub const fn despawn_in(&self) -> Option<u32> {
        self.despawn_in
    }
}

/// Represents the authoritative world state.
#[derive(Debug)]
pub struct World {
    blocks: HashMap<BlockPos, Block>,
    time: i64,
    tick_index: u64,
    difficulty: Difficulty,
    min_y: i32,
    max_y: i32,
    entities: BTreeMap<EntityId, Entity>,
    next_entity: u32,
    loaded_chunks: HashSet<(i32, i32)>,
    scheduled: BTreeMap<u64, BTreeSet<BlockPos>>,
    block_writes: u64,
}

impl World {
    /// Creates an empty world with the default height limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_height_limits(DEFAULT_MIN_Y, DEFAULT_MAX_Y)
    }

    /// Creates an empty world with explicit height limits.
    ///
    /// `max_y` is exclusive: the highest writable cell sits at `max_y - 1`.
    #[must_use]
    pub fn with_height_limits(min_y: i32, max_y: i32) -> Self {
        Self {
            blocks: HashMap::new(),
            time: 0,
            tick_index: 0,
            difficulty: Difficulty::default(),
            min_y,
            max_y,
            entities: BTreeMap::new(),
            next_entity: 0,
            loaded_chunks: HashSet::new(),
            scheduled: BTreeMap::new(),
            block_writes: 0,
        }
    }

    fn allocate_entity(&mut self, entity: Entity) -> EntityId {
        let id = EntityId::new(self.next_entity);
        self.next_entity = self.next_entity.wrapping_add(1);
        let _ = self.entities.insert(id, entity);
        id
    }

    fn age_entities(&mut self, out_events: &mut Vec<Event>) {
        let mut expired = Vec::new();
        for (id, entity) in self.entities.iter_mut() {
            if let Some(remaining) = entity.despawn_in.as_mut() {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    expired.push(*id);
                }
            }
        }

        for entity in expired {
            let _ = self.entities.remove(&entity);
            tracing::trace!(entity = entity.get(), "entity despawned");
            out_events.push(Event::EntityDespawned { entity });
        }
    }

    fn release_due_updates(&mut self, out_events: &mut Vec<Event>) {
        let later = self.scheduled.split_off(&(self.tick_index + 1));
        let due = std::mem::replace(&mut self.scheduled, later);
        for pos in due.into_values().flatten() {
            out_events.push(Event::ScheduledUpdate { pos });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldAccess for World {
    fn block(&self, pos: BlockPos) -> Block {
        self.blocks.get(&pos).copied().unwrap_or(Block::AIR)
    }

    fn set_block(&mut self, pos: BlockPos, block: Block) {
        self.block_writes = self.block_writes.saturating_add(1);
        if block == Block::AIR {
            let _ = self.blocks.remove(&pos);
        } else {
            let _ = self.blocks.insert(pos, block);
        }
    }

    fn time(&self) -> i64 {
        self.time
    }

    fn set_time(&mut self, time: i64) {
        self.time = time;
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn nearby_entities(&self, area: &BoundingBox) -> Vec<EntityKind> {
        self.entities
            .values()
            .filter(|entity| area.contains_point(entity.position))
            .map(|entity| entity.kind)
            .collect()
    }

    fn drop_item(&mut self, position: DVec3, item: Item) -> Option<EntityId> {
        Some(self.allocate_entity(Entity {
            kind: EntityKind::Item(item),
            position,
            despawn_in: None,
        }))
    }

    fn set_despawn_delay(&mut self, entity: EntityId, ticks: u32) {
        if let Some(entity) = self.entities.get_mut(&entity) {
            entity.despawn_in = Some(ticks);
        }
    }

    fn spawn_creature(&mut self, creature: Creature) -> EntityId {
        self.allocate_entity(Entity {
            kind: EntityKind::Creature(creature.kind),
            position: creature.location.position,
            despawn_in: None,
        })
    }

    fn load_chunk(&mut self, chunk_x: i32, chunk_z: i32) {
        if self.loaded_chunks.insert((chunk_x, chunk_z)) {
            tracing::trace!(chunk_x, chunk_z, "chunk loaded");
        }
    }

    fn schedule_delayed_update(&mut self, pos: BlockPos, delay_ticks: u32) {
        let due = self.tick_index + u64::from(delay_ticks.max(1));
        let _ = self.scheduled.entry(due).or_default().insert(pos);
    }

    fn min_y(&self) -> i32 {
        self.min_y
    }

    fn max_y(&self) -> i32 {
        self.max_y
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.time = world.time.saturating_add(1);
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
            world.age_entities(out_events);
            world.release_due_updates(out_events);
        }
        Command::PlaceBlock { pos, block } => world.set_block(pos, block),
        Command::SetDifficulty { difficulty } => world.difficulty = difficulty,
        Command::SetTime { time } => world.time = time,
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use nether_reactor_core::{Block, BlockPos, CreatureKind, Difficulty, EntityKind, Item};

    use super::{Entity, World};
    use nether_reactor_core::WorldAccess;

    /// Block stored at the provided cell.
    #[must_use]
    pub fn block(world: &World, pos: BlockPos) -> Block {
        world.block(pos)
    }

    /// Absolute world time in ticks.
    #[must_use]
    pub fn time(world: &World) -> i64 {
        world.time
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Active difficulty setting.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Total number of block writes performed so far.
    #[must_use]
    pub fn block_writes(world: &World) -> u64 {
        world.block_writes
    }

    /// Snapshot of every live entity in identifier order.
    #[must_use]
    pub fn entities(world: &World) -> Vec<Entity> {
        world.entities.values().copied().collect()
    }

    /// Items currently lying in the world.
    #[must_use]
    pub fn dropped_items(world: &World) -> Vec<Item> {
        world
            .entities
            .values()
            .filter_map(|entity| match entity.kind {
                EntityKind::Item(item) => Some(item),
                EntityKind::Creature(_) => None,
            })
            .collect()
    }

    /// Number of live creatures of the provided species.
    #[must_use]
    pub fn creature_count(world: &World, kind: CreatureKind) -> usize {
        world
            .entities
            .values()
            .filter(|entity| entity.kind == EntityKind::Creature(kind))
            .count()
    }

    /// Reports whether the chunk column was loaded at any point.
    #[must_use]
    pub fn is_chunk_loaded(world: &World, chunk_x: i32, chunk_z: i32) -> bool {
        world.loaded_chunks.contains(&(chunk_x, chunk_z))
    }

    /// Cells with a pending delayed update, in due order.
    #[must_use]
    pub fn pending_updates(world: &World) -> Vec<BlockPos> {
        world.scheduled.values().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nether_reactor_core::{CreatureKind, Location, Material};

    #[test]
    fn unset_cells_read_as_air() {
        let world = World::new();
        assert_eq!(world.block(BlockPos::new(4, 4, 4)), Block::AIR);
    }

    #[test]
    fn writing_air_removes_stored_blocks() {
        let mut world = World::new();
        let pos = BlockPos::new(0, 1, 0);
        world.set_block(pos, Block::new(Material::Stone));
        world.set_block(pos, Block::AIR);
        assert!(world.blocks.is_empty());
        assert_eq!(query::block_writes(&world), 2);
    }

    #[test]
    fn scheduled_updates_fire_once_when_due() {
        let mut world = World::new();
        let pos = BlockPos::new(1, 2, 3);
        world.schedule_delayed_update(pos, 2);
        world.schedule_delayed_update(pos, 2);

        let mut events = Vec::new();
        apply(&mut world, Command::Tick, &mut events);
        assert!(!events.contains(&Event::ScheduledUpdate { pos }));

        events.clear();
        apply(&mut world, Command::Tick, &mut events);
        let due = events
            .iter()
            .filter(|event| **event == Event::ScheduledUpdate { pos })
            .count();
        assert_eq!(due, 1);
        assert!(query::pending_updates(&world).is_empty());
    }

    #[test]
    fn dropped_items_despawn_after_delay() {
        let mut world = World::new();
        let entity = world
            .drop_item(DVec3::new(0.5, 0.0, 0.5), Item::NetherQuartz)
            .expect("in-memory world accepts drops");
        world.set_despawn_delay(entity, 2);

        let mut events = Vec::new();
        apply(&mut world, Command::Tick, &mut events);
        assert_eq!(query::dropped_items(&world), vec![Item::NetherQuartz]);
        apply(&mut world, Command::Tick, &mut events);
        assert!(query::dropped_items(&world).is_empty());
        assert!(events.contains(&Event::EntityDespawned { entity }));
        assert_eq!(entity.get(), 0);
    }

    #[test]
    fn difficulty_commands_replace_the_setting() {
        let mut world = World::new();
        let mut events = Vec::new();
        assert_eq!(query::difficulty(&world), Difficulty::Normal);
        apply(
            &mut world,
            Command::SetDifficulty {
                difficulty: Difficulty::Peaceful,
            },
            &mut events,
        );
        assert_eq!(query::difficulty(&world), Difficulty::Peaceful);
        assert_eq!(world.difficulty(), Difficulty::Peaceful);
    }

    #[test]
    fn nearby_entities_are_filtered_by_area() {
        let mut world = World::new();
        let _ = world.spawn_creature(Creature {
            kind: CreatureKind::ZombiePigman,
            location: Location::new(DVec3::new(2.5, 0.0, 2.5), 0.0, 0.0),
        });
        let _ = world.spawn_creature(Creature {
            kind: CreatureKind::ZombiePigman,
            location: Location::new(DVec3::new(40.5, 0.0, 2.5), 0.0, 0.0),
        });

        let area = BoundingBox::from_corners(BlockPos::new(0, 0, 0), BlockPos::new(4, 4, 4));
        assert_eq!(
            world.nearby_entities(&area),
            vec![EntityKind::Creature(CreatureKind::ZombiePigman)]
        );
        assert_eq!(query::creature_count(&world, CreatureKind::ZombiePigman), 2);
    }

    #[test]
    fn time_of_day_wraps_the_absolute_clock() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::SetTime { time: 24_010 }, &mut events);
        assert_eq!(world.time_of_day(), 10);
    }
}
