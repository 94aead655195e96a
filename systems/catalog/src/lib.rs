#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immutable description of the nether reactor structure.
//!
//! The [`StructureCatalog`] is loaded once at startup and shared read-only by
//! every reactor. It knows which blocks form a valid pattern, how to build
//! the spire, platforms and room around an activated core, and how to decay
//! the spire once the reactor is spent. All offsets are relative to the core.

use std::{collections::HashSet, path::Path};

use nether_reactor_core::{Block, BlockPos, BoundingBox, Material, WorldAccess};
use rand::{seq::index, Rng};

mod loader;
mod pattern;
mod platform;
mod round;

pub use loader::{CatalogError, CatalogSources, CONFIG_FILE, PATTERN_FILE, SPIRE_FILE};
pub use pattern::{LayerTransformation, PatternLayer};
pub use platform::Platform;
pub use round::{default_rounds, Round, RoundError};

/// Default headroom required above the core.
pub const DEFAULT_MAX_BOUND_Y: i32 = 30;
/// Default depth required below the core.
pub const DEFAULT_MIN_BOUND_Y: i32 = -3;
/// Default inner radius of the loot ring, matching the pattern footprint.
pub const DEFAULT_PATTERN_RADIUS: i32 = 3;

/// Structure definition shared by every reactor.
#[derive(Clone, Debug, PartialEq)]
pub struct StructureCatalog {
    spire_blocks: Vec<BlockPos>,
    spire_material: Material,
    platforms: Vec<Platform>,
    pattern_layers: Vec<PatternLayer>,
    room: BoundingBox,
    max_bound_y: i32,
    min_bound_y: i32,
    pattern_radius: i32,
    rounds: Vec<Round>,
}

impl StructureCatalog {
    /// Loads the structure definition files stored in `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        loader::load_dir(dir.as_ref())
    }

    /// Builds the catalog from the contents of the definition files.
    pub fn from_sources(sources: CatalogSources<'_>) -> Result<Self, CatalogError> {
        loader::parse(sources)
    }

    /// Starts a programmatic definition around the provided room bounds.
    #[must_use]
    pub fn builder(room_from: BlockPos, room_to: BlockPos) -> CatalogBuilder {
        CatalogBuilder::new(room_from, room_to)
    }

    /// Ordered spire offsets.
    #[must_use]
    pub fn spire_blocks(&self) -> &[BlockPos] {
        &self.spire_blocks
    }

    /// Material the spire is built from.
    #[must_use]
    pub const fn spire_material(&self) -> Material {
        self.spire_material
    }

    /// Platforms poured on activation.
    #[must_use]
    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    /// Layers composing the activation pattern.
    #[must_use]
    pub fn pattern_layers(&self) -> &[PatternLayer] {
        &self.pattern_layers
    }

    /// Loot and creature rounds in declaration order.
    #[must_use]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Room bounds relative to the core.
    #[must_use]
    pub const fn room_bounds(&self) -> BoundingBox {
        self.room
    }

    /// Absolute room bounds around the provided core.
    #[must_use]
    pub const fn room_box(&self, anchor: BlockPos) -> BoundingBox {
        self.room.offset(anchor)
    }

    /// Headroom that must fit below the world ceiling.
    #[must_use]
    pub const fn max_bound_y(&self) -> i32 {
        self.max_bound_y
    }

    /// Depth that must stay above the world floor.
    #[must_use]
    pub const fn min_bound_y(&self) -> i32 {
        self.min_bound_y
    }

    /// Inner radius of the loot ring.
    #[must_use]
    pub const fn pattern_radius(&self) -> i32 {
        self.pattern_radius
    }

    /// Outer radius of the loot ring, taken from the room's positive x extent.
    #[must_use]
    pub fn room_radius(&self) -> i32 {
        self.room.max().x().abs()
    }

    /// Every relative cell claimed by at least one pattern layer.
    pub fn pattern_cells(&self) -> impl Iterator<Item = BlockPos> + '_ {
        self.pattern_layers
            .iter()
            .flat_map(|layer| layer.blocks().iter().copied())
    }

    /// Reports whether every pattern layer is satisfied around `anchor`.
    pub fn is_valid_pattern<W>(&self, world: &W, anchor: BlockPos) -> bool
    where
        W: WorldAccess + ?Sized,
    {
        self.pattern_layers
            .iter()
            .all(|layer| layer.is_valid(world, anchor))
    }

    /// Builds the spire and platforms, then clears the room around the pattern.
    pub fn build<W>(&self, world: &mut W, anchor: BlockPos)
    where
        W: WorldAccess + ?Sized,
    {
        tracing::info!(%anchor, "building nether reactor structure");

        let spire = Block::new(self.spire_material);
        for relative in &self.spire_blocks {
            world.set_block(anchor.offset(*relative), spire);
        }

        for platform in &self.platforms {
            platform.build(world, anchor);
        }

        let mut preserved: HashSet<BlockPos> = self.pattern_cells().collect();
        let _ = preserved.insert(BlockPos::ORIGIN);

        let mut cleared = 0_u64;
        for relative in self.room.iter() {
            if preserved.contains(&relative) {
                continue;
            }
            world.set_block(anchor.offset(relative), Block::AIR);
            cleared += 1;
        }
        tracing::debug!(
            %anchor,
            cleared,
            room = self.room.volume(),
            "reactor room cleared"
        );
    }

    /// Knocks a random fifth to quarter of the spire blocks out.
    ///
    /// Returns the number of blocks turned into air; nothing is removed
    /// unless at least two blocks were selected.
    pub fn corrupt_spire<W, R>(&self, world: &mut W, anchor: BlockPos, rng: &mut R) -> usize
    where
        W: WorldAccess + ?Sized,
        R: Rng + ?Sized,
    {
        let count = self.spire_blocks.len();
        let amount = rng.gen_range(count / 5..=count / 4);
        if amount <= 1 {
            return 0;
        }

        for selected in index::sample(rng, count, amount).iter() {
            world.set_block(anchor.offset(self.spire_blocks[selected]), Block::AIR);
        }
        tracing::debug!(%anchor, amount, "spire corrupted");
        amount
    }
}

/// Programmatic alternative to the definition files.
#[derive(Clone, Debug)]
pub struct CatalogBuilder {
    catalog: StructureCatalog,
}

impl CatalogBuilder {
    fn new(room_from: BlockPos, room_to: BlockPos) -> Self {
        Self {
            catalog: StructureCatalog {
                spire_blocks: Vec::new(),
                spire_material: Material::Netherrack,
                platforms: Vec::new(),
                pattern_layers: Vec::new(),
                room: BoundingBox::from_corners(room_from, room_to),
                max_bound_y: DEFAULT_MAX_BOUND_Y,
                min_bound_y: DEFAULT_MIN_BOUND_Y,
                pattern_radius: DEFAULT_PATTERN_RADIUS,
                rounds: Vec::new(),
            },
        }
    }

    /// Sets the spire offsets and material.
    #[must_use]
    pub fn spire(mut self, blocks: Vec<BlockPos>, material: Material) -> Self {
        self.catalog.spire_blocks = blocks;
        self.catalog.spire_material = material;
        self
    }

    /// Appends a platform.
    #[must_use]
    pub fn platform(mut self, platform: Platform) -> Self {
        self.catalog.platforms.push(platform);
        self
    }

    /// Appends a pattern layer.
    #[must_use]
    pub fn pattern_layer(mut self, layer: PatternLayer) -> Self {
        self.catalog.pattern_layers.push(layer);
        self
    }

    /// Appends a round.
    #[must_use]
    pub fn round(mut self, round: Round) -> Self {
        self.catalog.rounds.push(round);
        self
    }

    /// Overrides the vertical headroom and depth checks.
    #[must_use]
    pub fn vertical_bounds(mut self, max_bound_y: i32, min_bound_y: i32) -> Self {
        self.catalog.max_bound_y = max_bound_y;
        self.catalog.min_bound_y = min_bound_y;
        self
    }

    /// Overrides the inner loot radius.
    #[must_use]
    pub fn pattern_radius(mut self, radius: i32) -> Self {
        self.catalog.pattern_radius = radius;
        self
    }

    /// Finishes the definition, applying the same checks as the file loader.
    pub fn build(self) -> Result<StructureCatalog, CatalogError> {
        if self.catalog.pattern_layers.is_empty() {
            return Err(CatalogError::NoPatternLayers);
        }
        if self.catalog.pattern_radius < 0 {
            return Err(CatalogError::NegativePatternRadius(
                self.catalog.pattern_radius,
            ));
        }
        Ok(self.catalog)
    }
}
