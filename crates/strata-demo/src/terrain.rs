//! Sample chunk generators for the compaction demo.

use std::sync::Arc;

use noise::{NoiseFn, Simplex};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use strata_voxel::{BitDepth, ChunkLayers, Extent, Layer, VoxelArray, VoxelArrayError};

pub const AIR: u16 = 0;
pub const STONE: u16 = 1;
pub const DIRT: u16 = 2;
pub const GRASS: u16 = 3;
pub const ORE: u16 = 4;
pub const TORCH: u16 = 5;

/// Full sky light.
pub const SKY_LIGHT: u16 = 15;
/// Block light emitted by a torch.
pub const TORCH_LIGHT: u16 = 14;

const HEIGHT_FREQUENCY: f64 = 0.05;
const HEIGHT_AMPLITUDE: f64 = 6.0;
const DIRT_DEPTH: usize = 3;
const ORE_CHANCE: f64 = 0.02;
const TORCH_CHANCE: f64 = 0.05;

/// Surface height per column, indexed `x + z * size_x`.
fn heightmap(extent: Extent, seed: u64) -> Vec<usize> {
    let simplex = Simplex::new(seed as u32);
    let base = (extent.size_y / 4) as f64;
    let top = extent.size_y.saturating_sub(1);
    let mut heights = Vec::with_capacity(extent.row_size());
    for z in 0..extent.size_z {
        for x in 0..extent.size_x {
            let n = simplex.get([x as f64 * HEIGHT_FREQUENCY, z as f64 * HEIGHT_FREQUENCY]);
            let h = (base + n * HEIGHT_AMPLITUDE).round().max(1.0) as usize;
            heights.push(h.min(top));
        }
    }
    heights
}

/// Rolling surface terrain: stone with scattered ore, a dirt and grass
/// cover, open sky above and a few torches on the surface.
pub fn terrain_chunk(extent: Extent, seed: u64) -> Result<ChunkLayers, VoxelArrayError> {
    let heights = heightmap(extent, seed);
    let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
    let height_at = |x: usize, z: usize| heights[extent.row_index(x, z)];

    let blocks = VoxelArray::from_fn(BitDepth::Sixteen, extent, |x, y, z| {
        let h = height_at(x, z);
        if y > h {
            AIR
        } else if y == h {
            GRASS
        } else if y + DIRT_DEPTH >= h {
            DIRT
        } else if rng.gen_bool(ORE_CHANCE) {
            ORE
        } else {
            STONE
        }
    })?;
    let sunlight = VoxelArray::from_fn(BitDepth::Eight, extent, |x, y, z| {
        if y > height_at(x, z) { SKY_LIGHT } else { 0 }
    })?;

    let mut chunk = ChunkLayers::new(extent)?;
    chunk.replace(Layer::Blocks, Arc::new(blocks))?;
    chunk.replace(Layer::Sunlight, Arc::new(sunlight))?;

    for z in 0..extent.size_z {
        for x in 0..extent.size_x {
            let y = height_at(x, z) + 1;
            if y < extent.size_y && rng.gen_bool(TORCH_CHANCE) {
                chunk.get_mut(Layer::Blocks).set(x, y, z, TORCH);
                chunk.get_mut(Layer::Light).set(x, y, z, TORCH_LIGHT);
            }
        }
    }
    Ok(chunk)
}

/// A chunk with nothing in it.
pub fn empty_chunk(extent: Extent) -> Result<ChunkLayers, VoxelArrayError> {
    ChunkLayers::new(extent)
}

/// Alternating stone and air in every direction; no layer is uniform.
pub fn checkerboard_chunk(extent: Extent) -> Result<ChunkLayers, VoxelArrayError> {
    let blocks = VoxelArray::from_fn(BitDepth::Sixteen, extent, |x, y, z| {
        if (x + y + z) % 2 == 0 { STONE } else { AIR }
    })?;
    let mut chunk = ChunkLayers::new(extent)?;
    chunk.replace(Layer::Blocks, Arc::new(blocks))?;
    Ok(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heightmap_stays_in_bounds() {
        let extent = Extent::new(16, 32, 16);
        let heights = heightmap(extent, 9);
        assert_eq!(heights.len(), extent.row_size());
        assert!(heights.iter().all(|&h| (1..extent.size_y).contains(&h)));
    }

    #[test]
    fn test_terrain_is_deterministic() {
        let extent = Extent::new(8, 64, 8);
        let a = terrain_chunk(extent, 3).unwrap();
        let b = terrain_chunk(extent, 3).unwrap();
        for layer in Layer::ALL {
            assert!(a.get(layer).value_eq(b.get(layer)), "{}", layer.name());
        }
    }

    #[test]
    fn test_terrain_has_sky_and_ground() {
        let extent = Extent::default();
        let chunk = terrain_chunk(extent, 42).unwrap();
        let blocks = chunk.get(Layer::Blocks);
        let sunlight = chunk.get(Layer::Sunlight);
        assert!(matches!(blocks.get(0, 0, 0), STONE | ORE));
        assert_eq!(blocks.get(5, extent.size_y - 1, 5), AIR);
        assert_eq!(sunlight.get(5, extent.size_y - 1, 5), SKY_LIGHT);
        assert_eq!(sunlight.get(5, 0, 5), 0);
    }

    #[test]
    fn test_torches_light_their_cell() {
        let extent = Extent::new(16, 64, 16);
        let chunk = terrain_chunk(extent, 11).unwrap();
        let blocks = chunk.get(Layer::Blocks);
        let light = chunk.get(Layer::Light);
        for y in 0..extent.size_y {
            for z in 0..extent.size_z {
                for x in 0..extent.size_x {
                    let lit = light.get(x, y, z) == TORCH_LIGHT;
                    assert_eq!(lit, blocks.get(x, y, z) == TORCH);
                }
            }
        }
    }

    #[test]
    fn test_checkerboard_alternates() {
        let chunk = checkerboard_chunk(Extent::new(4, 4, 4)).unwrap();
        let blocks = chunk.get(Layer::Blocks);
        assert_eq!(blocks.get(0, 0, 0), STONE);
        assert_eq!(blocks.get(1, 0, 0), AIR);
        assert_eq!(blocks.get(1, 1, 0), STONE);
    }

    #[test]
    fn test_empty_chunk_is_air() {
        let chunk = empty_chunk(Extent::new(2, 2, 2)).unwrap();
        assert_eq!(chunk.get(Layer::Blocks).get(1, 1, 1), AIR);
    }
}
