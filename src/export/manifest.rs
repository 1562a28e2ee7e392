use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::layout::{ConvergenceStats, LayoutResult, PixelRect};
use crate::scanner::types::ImageEntry;
use crate::tree::arena::ImageId;

/// Machine-readable description of a finished collage.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub width: u32,
    pub height: u32,
    pub ratio: f64,
    pub stats: ConvergenceStats,
    pub tiles: Vec<ManifestTile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestTile {
    pub image: ImageId,
    pub path: Option<PathBuf>,
    #[serde(flatten)]
    pub rect: PixelRect,
}

pub fn build_manifest(layout: &LayoutResult, entries: &[ImageEntry]) -> Manifest {
    let by_id: HashMap<ImageId, &ImageEntry> = entries.iter().map(|e| (e.id, e)).collect();
    let (width, height) = layout.pixel_canvas();
    Manifest {
        width,
        height,
        ratio: layout.ratio,
        stats: layout.stats,
        tiles: layout
            .pixel_tiles()
            .into_iter()
            .map(|(image, rect)| ManifestTile {
                image,
                path: by_id.get(&image).map(|e| e.path.clone()),
                rect,
            })
            .collect(),
    }
}

pub fn write_manifest(layout: &LayoutResult, entries: &[ImageEntry], path: &Path) -> Result<()> {
    let manifest = build_manifest(layout, entries);
    let json = serde_json::to_string_pretty(&manifest).context("failed to serialize manifest")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write manifest {}", path.display()))?;
    tracing::info!("Manifest written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{compute_layout, CanvasSize, CollageConfig};
    use crate::tree::pool::AspectRatioUnit;
    use crate::tree::split::RandomSplits;

    #[test]
    fn manifest_lists_all_tiles_as_json() {
        let units: Vec<_> = [0.75, 1.5, 1.0]
            .iter()
            .enumerate()
            .map(|(i, &r)| AspectRatioUnit::new(ImageId(i as u32), r).unwrap())
            .collect();
        let config = CollageConfig {
            expect_ratio: 1.0,
            thresh: 2.0,
            canvas: CanvasSize::Height(300.0),
            ..CollageConfig::default()
        };
        let mut splits = RandomSplits::seeded(11);
        let layout = compute_layout(&units, &config, &mut splits).unwrap();

        let manifest = build_manifest(&layout, &[]);
        assert_eq!(manifest.tiles.len(), 3);
        assert_eq!(manifest.height, 300);
        assert!(manifest.tiles.iter().all(|t| t.path.is_none()));

        let json: serde_json::Value = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["tiles"].as_array().unwrap().len(), 3);
        assert!(json["tiles"][0]["width"].is_u64());
        assert!(json["stats"]["evaluations"].as_u64().unwrap() >= 1);
    }
}
