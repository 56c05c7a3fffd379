//! The set of voxel arrays that make up one chunk.
//!
//! A chunk carries block ids plus lighting and auxiliary per-cell data, each
//! in its own [`VoxelArray`] at the depth that data needs. Named extension
//! arrays can be attached for mod-defined data. All arrays share the chunk's
//! [`Extent`] and are compacted together by [`ChunkLayers::deflate`].

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::array::{VoxelArray, VoxelArrayError};
use crate::deflate::Deflator;
use crate::extent::{BitDepth, Extent};

/// Built-in per-chunk arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Block ids (16-bit).
    Blocks,
    /// Sky light levels (8-bit).
    Sunlight,
    /// Sky light regeneration state (8-bit).
    SunlightRegen,
    /// Block light levels (8-bit).
    Light,
    /// Liquid and other auxiliary state (4-bit).
    Extra,
    /// Biome ids (8-bit).
    Biome,
}

impl Layer {
    /// Every built-in layer, in storage order.
    pub const ALL: [Self; 6] = [
        Self::Blocks,
        Self::Sunlight,
        Self::SunlightRegen,
        Self::Light,
        Self::Extra,
        Self::Biome,
    ];

    /// Layers that settle only once lighting has propagated, compacted by
    /// [`ChunkLayers::deflate_sunlight`].
    pub const SUNLIGHT: [Self; 2] = [Self::Sunlight, Self::SunlightRegen];

    /// Bit depth used for this layer.
    pub const fn bit_depth(self) -> BitDepth {
        match self {
            Self::Blocks => BitDepth::Sixteen,
            Self::Sunlight | Self::SunlightRegen | Self::Light | Self::Biome => BitDepth::Eight,
            Self::Extra => BitDepth::Four,
        }
    }

    /// Short name used in reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blocks => "blocks",
            Self::Sunlight => "sunlight",
            Self::SunlightRegen => "sunlight_regen",
            Self::Light => "light",
            Self::Extra => "extra",
            Self::Biome => "biome",
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Blocks => 0,
            Self::Sunlight => 1,
            Self::SunlightRegen => 2,
            Self::Light => 3,
            Self::Extra => 4,
            Self::Biome => 5,
        }
    }
}

/// Bytes used by one array before and after a deflation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerSavings {
    /// Layer or extension name.
    pub name: String,
    /// Estimated footprint before deflation.
    pub bytes_before: usize,
    /// Estimated footprint after deflation.
    pub bytes_after: usize,
}

impl LayerSavings {
    /// Percentage of the original footprint that was saved.
    pub fn percent_saved(&self) -> f64 {
        percent_saved(self.bytes_before, self.bytes_after)
    }
}

/// Outcome of deflating every array of a chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeflationReport {
    /// One entry per array, built-in layers first, then extensions by name.
    pub layers: Vec<LayerSavings>,
}

impl DeflationReport {
    /// Total estimated bytes before deflation.
    pub fn bytes_before(&self) -> usize {
        self.layers.iter().map(|l| l.bytes_before).sum()
    }

    /// Total estimated bytes after deflation.
    pub fn bytes_after(&self) -> usize {
        self.layers.iter().map(|l| l.bytes_after).sum()
    }

    /// Percentage of the chunk's original footprint that was saved.
    pub fn percent_saved(&self) -> f64 {
        percent_saved(self.bytes_before(), self.bytes_after())
    }

    /// Savings entry for the given name, if present.
    pub fn layer(&self, name: &str) -> Option<&LayerSavings> {
        self.layers.iter().find(|l| l.name == name)
    }
}

fn percent_saved(before: usize, after: usize) -> f64 {
    if before == 0 {
        return 0.0;
    }
    100.0 - 100.0 / before as f64 * after as f64
}

/// All voxel arrays of one chunk.
#[derive(Clone, Debug)]
pub struct ChunkLayers {
    extent: Extent,
    layers: [Arc<VoxelArray>; 6],
    extensions: FxHashMap<String, Arc<VoxelArray>>,
}

impl ChunkLayers {
    /// Creates zeroed dense arrays for every built-in layer.
    pub fn new(extent: Extent) -> Result<Self, VoxelArrayError> {
        let make = |layer: Layer| VoxelArray::new_dense(layer.bit_depth(), extent).map(Arc::new);
        Ok(Self {
            extent,
            layers: [
                make(Layer::Blocks)?,
                make(Layer::Sunlight)?,
                make(Layer::SunlightRegen)?,
                make(Layer::Light)?,
                make(Layer::Extra)?,
                make(Layer::Biome)?,
            ],
            extensions: FxHashMap::default(),
        })
    }

    /// Dimensions shared by every array.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// The array backing `layer`.
    pub fn get(&self, layer: Layer) -> &Arc<VoxelArray> {
        &self.layers[layer.slot()]
    }

    /// Mutable access to the array backing `layer`.
    ///
    /// Clones the array first if it is shared, so previously handed-out
    /// references keep seeing the old data.
    pub fn get_mut(&mut self, layer: Layer) -> &mut VoxelArray {
        Arc::make_mut(&mut self.layers[layer.slot()])
    }

    /// Replaces the array backing `layer`, returning the old one.
    pub fn replace(
        &mut self,
        layer: Layer,
        array: Arc<VoxelArray>,
    ) -> Result<Arc<VoxelArray>, VoxelArrayError> {
        self.check(&array)?;
        if array.bit_depth() != layer.bit_depth() {
            return Err(VoxelArrayError::DepthMismatch {
                expected: layer.bit_depth(),
                actual: array.bit_depth(),
            });
        }
        Ok(std::mem::replace(&mut self.layers[layer.slot()], array))
    }

    /// Attaches a named extension array, returning any previous one.
    pub fn insert_extension(
        &mut self,
        name: impl Into<String>,
        array: Arc<VoxelArray>,
    ) -> Result<Option<Arc<VoxelArray>>, VoxelArrayError> {
        self.check(&array)?;
        Ok(self.extensions.insert(name.into(), array))
    }

    /// The named extension array, if attached.
    pub fn extension(&self, name: &str) -> Option<&Arc<VoxelArray>> {
        self.extensions.get(name)
    }

    /// Mutable access to a named extension array, cloning it if shared.
    pub fn extension_mut(&mut self, name: &str) -> Option<&mut VoxelArray> {
        self.extensions.get_mut(name).map(Arc::make_mut)
    }

    /// Number of attached extensions.
    pub fn extension_count(&self) -> usize {
        self.extensions.len()
    }

    /// Estimated bytes used by every array of the chunk.
    pub fn estimated_memory_bytes(&self) -> usize {
        self.layers
            .iter()
            .chain(self.extensions.values())
            .map(|array| array.estimated_memory_bytes())
            .sum()
    }

    /// Deflates every array with `deflator` and reports the savings.
    pub fn deflate(&mut self, deflator: &dyn Deflator) -> DeflationReport {
        let mut report = self.deflate_layers(deflator, &Layer::ALL);

        let mut names: Vec<String> = self.extensions.keys().cloned().collect();
        names.sort_unstable();
        for name in names {
            if let Some(slot) = self.extensions.get_mut(&name) {
                report.layers.push(deflate_slot(deflator, &name, slot));
            }
        }

        debug!(
            size_before = report.bytes_before(),
            size_after = report.bytes_after(),
            percent_saved = report.percent_saved(),
            "chunk layers deflated"
        );
        report
    }

    /// Deflates only the sky light layers, leaving every other array as is.
    /// Meant to run once lighting has settled.
    pub fn deflate_sunlight(&mut self, deflator: &dyn Deflator) -> DeflationReport {
        let report = self.deflate_layers(deflator, &Layer::SUNLIGHT);
        debug!(
            size_before = report.bytes_before(),
            size_after = report.bytes_after(),
            percent_saved = report.percent_saved(),
            "chunk sunlight deflated"
        );
        report
    }

    fn deflate_layers(&mut self, deflator: &dyn Deflator, layers: &[Layer]) -> DeflationReport {
        let layers = layers
            .iter()
            .map(|&layer| {
                let slot = &mut self.layers[layer.slot()];
                deflate_slot(deflator, layer.name(), slot)
            })
            .collect();
        DeflationReport { layers }
    }
}

impl ChunkLayers {
    fn check(&self, array: &VoxelArray) -> Result<(), VoxelArrayError> {
        if array.extent() == self.extent {
            Ok(())
        } else {
            Err(VoxelArrayError::ExtentMismatch {
                expected: self.extent,
                actual: array.extent(),
            })
        }
    }
}

fn deflate_slot(deflator: &dyn Deflator, name: &str, slot: &mut Arc<VoxelArray>) -> LayerSavings {
    let bytes_before = slot.estimated_memory_bytes();
    *slot = deflator.deflate(slot);
    LayerSavings {
        name: name.to_string(),
        bytes_before,
        bytes_after: slot.estimated_memory_bytes(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
