#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the nether reactor engine.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the structure catalog and the pure reactor systems. Hosts submit
//! [`Command`] values to mutate the world, systems observe and mutate the
//! world exclusively through the [`WorldAccess`] trait, and everything that
//! happens is reported back as [`Event`] values so adapters can present it.

use std::{fmt, str::FromStr};

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of ticks in a full in-world day.
pub const TICKS_PER_DAY: i64 = 24_000;

/// Number of block columns along each horizontal edge of a chunk.
pub const CHUNK_EDGE: i32 = 16;

/// Integer block coordinate, either absolute or relative to a reactor core.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BlockPos {
    x: i32,
    y: i32,
    z: i32,
}

impl BlockPos {
    /// The relative position of the reactor core itself.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Creates a new block coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// East-west component.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// North-south component.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Translates the position by a relative offset.
    #[must_use]
    pub const fn offset(self, relative: BlockPos) -> Self {
        Self::new(self.x + relative.x, self.y + relative.y, self.z + relative.z)
    }

    /// Chunk column index containing this position along the x axis.
    #[must_use]
    pub const fn chunk_x(&self) -> i32 {
        self.x.div_euclid(CHUNK_EDGE)
    }

    /// Chunk column index containing this position along the z axis.
    #[must_use]
    pub const fn chunk_z(&self) -> i32 {
        self.z.div_euclid(CHUNK_EDGE)
    }

    /// Point at the horizontal centre of the block, resting on its floor.
    #[must_use]
    pub fn bottom_center(&self) -> DVec3 {
        DVec3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y),
            f64::from(self.z) + 0.5,
        )
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Axis-aligned box of whole blocks with inclusive corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    min: BlockPos,
    max: BlockPos,
}

impl BoundingBox {
    /// Builds a box spanning both corners, normalising them componentwise.
    #[must_use]
    pub fn from_corners(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Corner with the smallest coordinates.
    #[must_use]
    pub const fn min(&self) -> BlockPos {
        self.min
    }

    /// Corner with the largest coordinates.
    #[must_use]
    pub const fn max(&self) -> BlockPos {
        self.max
    }

    /// Translates both corners by the provided anchor.
    #[must_use]
    pub const fn offset(self, anchor: BlockPos) -> Self {
        Self {
            min: self.min.offset(anchor),
            max: self.max.offset(anchor),
        }
    }

    /// Reports whether the block lies inside the box.
    #[must_use]
    pub const fn contains(&self, pos: BlockPos) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }

    /// Reports whether a point lies within the space covered by the box's blocks.
    #[must_use]
    pub fn contains_point(&self, point: DVec3) -> bool {
        let lower = DVec3::new(
            f64::from(self.min.x),
            f64::from(self.min.y),
            f64::from(self.min.z),
        );
        let upper = DVec3::new(
            f64::from(self.max.x) + 1.0,
            f64::from(self.max.y) + 1.0,
            f64::from(self.max.z) + 1.0,
        );
        point.cmpge(lower).all() && point.cmplt(upper).all()
    }

    /// Number of blocks contained in the box.
    #[must_use]
    pub fn volume(&self) -> u64 {
        let span = |lo: i32, hi: i32| u64::from(hi.abs_diff(lo)) + 1;
        span(self.min.x, self.max.x) * span(self.min.y, self.max.y) * span(self.min.z, self.max.z)
    }

    /// Iterates every block of the box, x-major then z then y.
    pub fn iter(&self) -> impl Iterator<Item = BlockPos> {
        let (min, max) = (self.min, self.max);
        (min.x..=max.x).flat_map(move |x| {
            (min.z..=max.z)
                .flat_map(move |z| (min.y..=max.y).map(move |y| BlockPos::new(x, y, z)))
        })
    }
}

/// Block materials known to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    /// Empty space.
    Air,
    /// Plain stone.
    Stone,
    /// Dirt.
    Dirt,
    /// Grass-covered dirt.
    Grass,
    /// Cobblestone, the bulk of the reactor pattern.
    Cobblestone,
    /// Block of gold, the pattern corners.
    GoldBlock,
    /// Obsidian.
    Obsidian,
    /// Glowing obsidian produced while the reactor runs.
    GlowingObsidian,
    /// Netherrack, the default spire and platform material.
    Netherrack,
    /// Glowstone.
    Glowstone,
    /// Indestructible bedrock.
    Bedrock,
    /// The nether reactor core block itself.
    NetherReactorCore,
}

impl Material {
    /// Every material in declaration order.
    pub const ALL: [Material; 12] = [
        Material::Air,
        Material::Stone,
        Material::Dirt,
        Material::Grass,
        Material::Cobblestone,
        Material::GoldBlock,
        Material::Obsidian,
        Material::GlowingObsidian,
        Material::Netherrack,
        Material::Glowstone,
        Material::Bedrock,
        Material::NetherReactorCore,
    ];

    /// Canonical configuration name of the material.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Stone => "stone",
            Self::Dirt => "dirt",
            Self::Grass => "grass",
            Self::Cobblestone => "cobblestone",
            Self::GoldBlock => "gold_block",
            Self::Obsidian => "obsidian",
            Self::GlowingObsidian => "glowing_obsidian",
            Self::Netherrack => "netherrack",
            Self::Glowstone => "glowstone",
            Self::Bedrock => "bedrock",
            Self::NetherReactorCore => "nether_reactor_core",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raised when a material name does not match any known material.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown material `{0}`")]
pub struct UnknownMaterial(pub String);

impl FromStr for Material {
    type Err = UnknownMaterial;

    /// Accepts an optional `minecraft:` prefix, any letter case and spaces in
    /// place of underscores.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalised = input.trim().to_ascii_lowercase().replace(' ', "_");
        let name = normalised
            .strip_prefix("minecraft:")
            .unwrap_or(&normalised);
        Material::ALL
            .into_iter()
            .find(|material| material.name() == name)
            .ok_or_else(|| UnknownMaterial(input.to_owned()))
    }
}

/// Visible state of a nether reactor core block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReactorPhase {
    /// Freshly placed, waiting for activation.
    Inactive,
    /// Countdown in progress.
    Active,
    /// Countdown completed; the core can never be reactivated.
    Used,
}

/// Raised when packed reactor phase bits hold an unassigned value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("invalid serialized reactor phase {0}")]
pub struct PhaseDecodeError(pub u8);

impl ReactorPhase {
    /// Every phase in encoding order.
    pub const ALL: [ReactorPhase; 3] = [Self::Inactive, Self::Active, Self::Used];

    /// Packs the phase into its two-bit runtime representation.
    #[must_use]
    pub const fn to_bits(self) -> u8 {
        match self {
            Self::Inactive => 0,
            Self::Active => 1,
            Self::Used => 2,
        }
    }

    /// Unpacks a phase from its two-bit runtime representation.
    pub const fn from_bits(bits: u8) -> Result<Self, PhaseDecodeError> {
        match bits {
            0 => Ok(Self::Inactive),
            1 => Ok(Self::Active),
            2 => Ok(Self::Used),
            other => Err(PhaseDecodeError(other)),
        }
    }

    /// Name written into the block state property.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Active => "active",
            Self::Used => "used",
        }
    }

    /// Reads a block state property; unrecognised names fall back to inactive.
    #[must_use]
    pub fn from_state_name(name: &str) -> Self {
        match name {
            "active" => Self::Active,
            "used" => Self::Used,
            _ => Self::Inactive,
        }
    }
}

/// A material paired with its per-block state bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    material: Material,
    state: u8,
}

impl Block {
    /// Empty space.
    pub const AIR: Self = Self::new(Material::Air);

    /// Creates a block in the material's default state.
    #[must_use]
    pub const fn new(material: Material) -> Self {
        Self { material, state: 0 }
    }

    /// Creates a block with explicit state bits, such as an orientation.
    #[must_use]
    pub const fn with_state(material: Material, state: u8) -> Self {
        Self { material, state }
    }

    /// Creates a reactor core block showing the provided phase.
    #[must_use]
    pub const fn reactor_core(phase: ReactorPhase) -> Self {
        Self::with_state(Material::NetherReactorCore, phase.to_bits())
    }

    /// Material of the block.
    #[must_use]
    pub const fn material(&self) -> Material {
        self.material
    }

    /// Raw state bits of the block.
    #[must_use]
    pub const fn state(&self) -> u8 {
        self.state
    }

    /// Compares by item equivalence, ignoring state bits.
    #[must_use]
    pub fn is_same_item(&self, material: Material) -> bool {
        self.material == material
    }

    /// Phase of a reactor core block, or `None` for every other block.
    #[must_use]
    pub fn reactor_phase(&self) -> Option<ReactorPhase> {
        if self.material != Material::NetherReactorCore {
            return None;
        }
        ReactorPhase::from_bits(self.state).ok()
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::AIR
    }
}

/// Items that can be dropped into the world as loot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Item {
    /// Cactus block item.
    Cactus,
    /// Brown mushroom.
    BrownMushroom,
    /// Red mushroom.
    RedMushroom,
    /// Sugarcane.
    Sugarcane,
    /// Melon seeds.
    MelonSeeds,
    /// Pumpkin seeds.
    PumpkinSeeds,
    /// Glowstone dust.
    GlowstoneDust,
    /// Nether quartz.
    NetherQuartz,
}

/// Creature species the reactor may summon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CreatureKind {
    /// Zombie pigman.
    ZombiePigman,
}

/// Position and facing of an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Location {
    /// Position in world space.
    pub position: DVec3,
    /// Horizontal facing in degrees.
    pub yaw: f32,
    /// Vertical facing in degrees.
    pub pitch: f32,
}

impl Location {
    /// Creates a location with the provided facing.
    #[must_use]
    pub const fn new(position: DVec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }
}

/// Creature constructed by the creature extension, ready to be spawned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Creature {
    /// Species of the creature.
    pub kind: CreatureKind,
    /// Where the creature appears.
    pub location: Location,
}

/// Identifier allocated by the world to a live entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Kind of a live entity as observed through world queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A dropped item stack.
    Item(Item),
    /// A creature.
    Creature(CreatureKind),
}

/// World difficulty setting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Hostile creatures never spawn.
    Peaceful,
    /// Easy.
    Easy,
    /// Normal.
    #[default]
    Normal,
    /// Hard.
    Hard,
}

/// Game mode of an interacting player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameMode {
    /// Survival.
    Survival,
    /// Creative, with unlimited resources.
    Creative,
    /// Adventure.
    Adventure,
    /// Spectator.
    Spectator,
}

/// Player interacting with a reactor core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor {
    game_mode: GameMode,
}

impl Actor {
    /// Creates an actor playing in the provided game mode.
    #[must_use]
    pub const fn new(game_mode: GameMode) -> Self {
        Self { game_mode }
    }

    /// Game mode of the actor.
    #[must_use]
    pub const fn game_mode(&self) -> GameMode {
        self.game_mode
    }

    /// Reports whether the actor is subject to survival constraints.
    #[must_use]
    pub const fn has_finite_resources(&self) -> bool {
        matches!(self.game_mode, GameMode::Survival | GameMode::Adventure)
    }
}

/// User-facing message categories surfaced by the reactor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// The reactor started.
    Active,
    /// The core sits too close to the build ceiling.
    BuildTooHigh,
    /// The core sits too close to the world floor.
    BuildTooLow,
    /// Players are too far away from the core.
    PlayersTooFar,
    /// The surrounding blocks do not form the reactor pattern.
    WrongPattern,
}

impl MessageKey {
    /// Translation key resolved by the host's language files.
    #[must_use]
    pub const fn translation_key(self) -> &'static str {
        match self {
            Self::Active => "tile.netherreactor.active",
            Self::BuildTooHigh => "tile.netherreactor.builtTooHigh",
            Self::BuildTooLow => "tile.netherreactor.builtTooLow",
            Self::PlayersTooFar => "tile.netherreactor.playersTooFar",
            Self::WrongPattern => "tile.netherreactor.wrongPattern",
        }
    }
}

/// Reasons an activation attempt may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The core is already active or used, or is not a reactor core at all.
    NotInactive,
    /// Nobody interacted, or the actor has unlimited resources.
    NoFiniteResources,
    /// The pattern around the core is incomplete.
    WrongPattern,
    /// The structure would exceed the world ceiling.
    BuildTooHigh,
    /// The structure would fall below the world floor.
    BuildTooLow,
}

impl Rejection {
    /// Message shown to the actor, if the rejection is announced at all.
    #[must_use]
    pub const fn message(self) -> Option<MessageKey> {
        match self {
            Self::NotInactive | Self::NoFiniteResources => None,
            Self::WrongPattern => Some(MessageKey::WrongPattern),
            Self::BuildTooHigh => Some(MessageKey::BuildTooHigh),
            Self::BuildTooLow => Some(MessageKey::BuildTooLow),
        }
    }
}

/// Commands that express host-driven world mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Advances the world by one tick.
    Tick,
    /// Places a block, replacing whatever occupied the cell.
    PlaceBlock {
        /// Target cell.
        pos: BlockPos,
        /// Block written into the cell.
        block: Block,
    },
    /// Changes the world difficulty.
    SetDifficulty {
        /// Difficulty that becomes active.
        difficulty: Difficulty,
    },
    /// Overwrites the absolute world time.
    SetTime {
        /// New absolute time in ticks.
        time: i64,
    },
}

/// Events broadcast by the world and the reactor systems.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The world clock advanced by one tick.
    TimeAdvanced {
        /// Absolute tick counter after advancing.
        tick: u64,
    },
    /// A delayed block update requested earlier became due.
    ScheduledUpdate {
        /// Cell whose update is due.
        pos: BlockPos,
    },
    /// A dropped item reached the end of its despawn delay.
    EntityDespawned {
        /// Entity removed from the world.
        entity: EntityId,
    },
    /// A reactor passed the activation gate.
    ReactorActivated {
        /// Reactor core position.
        anchor: BlockPos,
    },
    /// A reactor activation attempt was refused.
    ActivationRejected {
        /// Reactor core position.
        anchor: BlockPos,
        /// Why the attempt failed.
        reason: Rejection,
    },
    /// Time forwarding reached nightfall.
    NightFell {
        /// Reactor core position.
        anchor: BlockPos,
        /// Time of day that was reached.
        time_of_day: i64,
    },
    /// A pattern layer switched material.
    LayerTransformed {
        /// Reactor core position.
        anchor: BlockPos,
        /// Index of the layer within the catalog.
        layer: usize,
        /// Material written into the layer.
        material: Material,
    },
    /// A round fired.
    RoundStarted {
        /// Reactor core position.
        anchor: BlockPos,
        /// Progress tick that triggered the round.
        tick: u32,
    },
    /// Loot was dropped into the room.
    LootDropped {
        /// Dropped item.
        item: Item,
        /// Position of the drop.
        position: DVec3,
    },
    /// A creature was summoned into the room.
    CreatureSpawned {
        /// Species of the creature.
        kind: CreatureKind,
        /// Where it appeared.
        location: Location,
    },
    /// A reactor completed its countdown.
    ReactorFinished {
        /// Reactor core position.
        anchor: BlockPos,
    },
    /// Spire blocks were knocked out after completion.
    SpireCorrupted {
        /// Reactor core position.
        anchor: BlockPos,
        /// Number of blocks turned into air.
        removed: usize,
    },
}

/// Access to the host world required by the reactor systems.
///
/// World mutation is assumed to always succeed; implementations deal with
/// their own storage failures.
pub trait WorldAccess {
    /// Block currently occupying the cell.
    fn block(&self, pos: BlockPos) -> Block;

    /// Overwrites the cell with the provided block.
    fn set_block(&mut self, pos: BlockPos, block: Block);

    /// Absolute world time in ticks.
    fn time(&self) -> i64;

    /// Time within the current day, in `0..TICKS_PER_DAY`.
    fn time_of_day(&self) -> i64 {
        self.time().rem_euclid(TICKS_PER_DAY)
    }

    /// Overwrites the absolute world time.
    fn set_time(&mut self, time: i64);

    /// Current difficulty setting.
    fn difficulty(&self) -> Difficulty;

    /// Kinds of all live entities located inside the box.
    fn nearby_entities(&self, area: &BoundingBox) -> Vec<EntityKind>;

    /// Drops an item stack, returning its entity if the world accepted it.
    fn drop_item(&mut self, position: DVec3, item: Item) -> Option<EntityId>;

    /// Number of ticks before a dropped item disappears.
    fn set_despawn_delay(&mut self, entity: EntityId, ticks: u32);

    /// Spawns a creature constructed by the creature extension.
    fn spawn_creature(&mut self, creature: Creature) -> EntityId;

    /// Ensures the chunk is loaded before it is written to.
    fn load_chunk(&mut self, chunk_x: i32, chunk_z: i32);

    /// Requests a block update at the cell after the provided delay.
    fn schedule_delayed_update(&mut self, pos: BlockPos, delay_ticks: u32);

    /// Lowest buildable y coordinate.
    fn min_y(&self) -> i32;

    /// Exclusive upper y bound of the world.
    fn max_y(&self) -> i32;
}

/// Optional extension that knows how to construct hostile creatures.
pub trait CreatureFactory {
    /// Builds a creature standing at the provided location.
    fn create(&self, location: Location) -> Creature;
}
