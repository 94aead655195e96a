//! Pattern layers: the blocks a player must place around the core.

use std::collections::HashSet;

use nether_reactor_core::{Block, BlockPos, Material, WorldAccess};

/// Material swap applied to a whole layer once the reactor reaches `tick`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerTransformation {
    tick: u32,
    material: Material,
}

impl LayerTransformation {
    /// Creates a transformation firing at the provided progress tick.
    #[must_use]
    pub const fn new(tick: u32, material: Material) -> Self {
        Self { tick, material }
    }

    /// Progress tick at which the transformation applies.
    #[must_use]
    pub const fn tick(&self) -> u32 {
        self.tick
    }

    /// Material written into every cell of the layer.
    #[must_use]
    pub const fn material(&self) -> Material {
        self.material
    }
}

/// Set of cells, relative to the core, that must all hold one material.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternLayer {
    material: Material,
    blocks: Vec<BlockPos>,
    transformations: Vec<LayerTransformation>,
}

impl PatternLayer {
    /// Creates a layer, keeping only the first occurrence of repeated cells.
    ///
    /// Transformations keep their declaration order, which is also the order
    /// in which same-tick transformations are applied.
    #[must_use]
    pub fn new(
        material: Material,
        blocks: impl IntoIterator<Item = BlockPos>,
        transformations: Vec<LayerTransformation>,
    ) -> Self {
        let mut seen = HashSet::new();
        let blocks = blocks.into_iter().filter(|pos| seen.insert(*pos)).collect();
        Self {
            material,
            blocks,
            transformations,
        }
    }

    /// Material the layer requires.
    #[must_use]
    pub const fn material(&self) -> Material {
        self.material
    }

    /// Relative cells that compose the layer.
    #[must_use]
    pub fn blocks(&self) -> &[BlockPos] {
        &self.blocks
    }

    /// Scheduled material swaps in declaration order.
    #[must_use]
    pub fn transformations(&self) -> &[LayerTransformation] {
        &self.transformations
    }

    /// Transformations scheduled for exactly the provided progress tick.
    pub fn transformations_at(&self, tick: u32) -> impl Iterator<Item = &LayerTransformation> {
        self.transformations
            .iter()
            .filter(move |transformation| transformation.tick == tick)
    }

    /// Reports whether every cell around `anchor` holds the layer material.
    ///
    /// Only the item identity is compared, so state bits such as orientation
    /// never invalidate a pattern.
    pub fn is_valid<W>(&self, world: &W, anchor: BlockPos) -> bool
    where
        W: WorldAccess + ?Sized,
    {
        self.blocks
            .iter()
            .all(|relative| world.block(anchor.offset(*relative)).is_same_item(self.material))
    }

    /// Overwrites every cell of the layer with the transformation material.
    pub fn apply_transformation<W>(
        &self,
        world: &mut W,
        anchor: BlockPos,
        transformation: &LayerTransformation,
    ) where
        W: WorldAccess + ?Sized,
    {
        let block = Block::new(transformation.material);
        for relative in &self.blocks {
            world.set_block(anchor.offset(*relative), block);
        }
    }
}
