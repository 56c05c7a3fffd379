//! Demo binary that generates sample chunks and compacts them.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p strata-demo -- --thresholds derived --log-deflation true`.

mod terrain;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use strata_config::{CliArgs, Config, ThresholdMode};
use strata_voxel::{ChunkLayers, DeflateThresholds, Deflator, Extent, Layer, VoxelArray};
use tracing::{error, info};

fn thresholds_for(mode: ThresholdMode, extent: Extent) -> DeflateThresholds {
    match mode {
        ThresholdMode::Tuned => DeflateThresholds::TUNED,
        ThresholdMode::Derived => DeflateThresholds::derived(extent),
    }
}

/// Deflates `chunk` and checks that every cell still reads the same.
fn compact(name: &str, mut chunk: ChunkLayers, deflator: &dyn Deflator, per_layer: bool) -> bool {
    let before: Vec<Arc<VoxelArray>> = Layer::ALL
        .iter()
        .map(|&layer| Arc::clone(chunk.get(layer)))
        .collect();

    let report = chunk.deflate(deflator);

    let mut intact = true;
    for (layer, original) in Layer::ALL.iter().zip(&before) {
        if !chunk.get(*layer).value_eq(original) {
            error!(chunk = name, layer = layer.name(), "deflation changed cell values");
            intact = false;
        }
    }

    info!(
        chunk = name,
        bytes_before = report.bytes_before(),
        bytes_after = report.bytes_after(),
        "Chunk compacted, saved {:.1}%",
        report.percent_saved()
    );
    if per_layer {
        for layer in &report.layers {
            info!(
                chunk = name,
                layer = %layer.name,
                bytes_before = layer.bytes_before,
                bytes_after = layer.bytes_after,
                "  {:.1}% saved",
                layer.percent_saved()
            );
        }
    }
    intact
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = match args.config.clone().map_or_else(Config::default_dir, Ok) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let extent = Extent::new(
        config.chunk.size_x,
        config.chunk.size_y,
        config.chunk.size_z,
    );
    let thresholds = thresholds_for(config.deflate.thresholds, extent);
    info!(
        enabled = config.deflate.enabled,
        ?thresholds,
        ?extent,
        "Chunk compaction configured"
    );
    let deflator = strata_voxel::deflator_for(config.deflate.enabled, thresholds);

    let chunks = [
        ("terrain", terrain::terrain_chunk(extent, args.seed)),
        ("empty", terrain::empty_chunk(extent)),
        ("checkerboard", terrain::checkerboard_chunk(extent)),
    ];

    let mut ok = true;
    for (name, chunk) in chunks {
        match chunk {
            Ok(chunk) => {
                ok &= compact(name, chunk, deflator.as_ref(), config.deflate.log_deflation);
            }
            Err(e) => {
                error!(chunk = name, "Failed to build chunk: {e}");
                ok = false;
            }
        }
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_voxel::{NullDeflator, StandardDeflator};

    #[test]
    fn test_thresholds_for_mode() {
        let extent = Extent::default();
        assert_eq!(
            thresholds_for(ThresholdMode::Tuned, extent),
            DeflateThresholds::TUNED
        );
        assert_eq!(
            thresholds_for(ThresholdMode::Derived, extent),
            DeflateThresholds::derived(extent)
        );
    }

    #[test]
    fn test_compact_sample_chunks() {
        let extent = Extent::new(16, 64, 16);
        let deflator = StandardDeflator::new();
        assert!(compact(
            "terrain",
            terrain::terrain_chunk(extent, 5).unwrap(),
            &deflator,
            true
        ));
        assert!(compact(
            "checkerboard",
            terrain::checkerboard_chunk(extent).unwrap(),
            &NullDeflator,
            false
        ));
    }
}
