//! Solid platforms poured around the reactor on activation.

use nether_reactor_core::{Block, BlockPos, BoundingBox, Material, WorldAccess};

/// Axis-aligned volume, relative to the core, filled with one material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Platform {
    bounds: BoundingBox,
    material: Material,
}

impl Platform {
    /// Creates a platform spanning both corners.
    #[must_use]
    pub fn new(from: BlockPos, to: BlockPos, material: Material) -> Self {
        Self {
            bounds: BoundingBox::from_corners(from, to),
            material,
        }
    }

    /// Relative volume covered by the platform.
    #[must_use]
    pub const fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Material the platform is made of.
    #[must_use]
    pub const fn material(&self) -> Material {
        self.material
    }

    /// Fills the platform around `anchor`, clipped to the world's height limits.
    ///
    /// Every column's chunk is loaded before it is written to.
    pub fn build<W>(&self, world: &mut W, anchor: BlockPos)
    where
        W: WorldAccess + ?Sized,
    {
        let absolute = self.bounds.offset(anchor);
        let min_y = absolute.min().y().max(world.min_y());
        let max_y = absolute.max().y().min(world.max_y() - 1);
        let block = Block::new(self.material);

        for x in absolute.min().x()..=absolute.max().x() {
            for z in absolute.min().z()..=absolute.max().z() {
                let column = BlockPos::new(x, min_y, z);
                world.load_chunk(column.chunk_x(), column.chunk_z());
                for y in min_y..=max_y {
                    world.set_block(BlockPos::new(x, y, z), block);
                }
            }
        }
    }
}
