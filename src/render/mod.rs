use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use rayon::prelude::*;

use crate::layout::{LayoutResult, PixelRect};
use crate::scanner::types::ImageEntry;
use crate::tree::arena::ImageId;

/// Compositing parameters.
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    /// Resampling filter used to fit each image to its tile
    pub filter: FilterType,
    /// Canvas fill, visible only where a tile rounds to zero size
    pub background: [u8; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            filter: FilterType::Triangle,
            background: [20, 22, 28, 255],
        }
    }
}

/// Rasterize the collage: every image is decoded, stretched to exactly fill
/// its pixel tile and copied onto the canvas.
///
/// Tiles are decoded and resized in parallel; the copy onto the canvas is
/// sequential. Pixel tiles come from edge rounding, so neighbours abut
/// without gaps.
pub fn render_collage(
    layout: &LayoutResult,
    entries: &[ImageEntry],
    config: &RenderConfig,
) -> Result<RgbaImage> {
    let (width, height) = layout.pixel_canvas();
    if width == 0 || height == 0 {
        bail!("collage canvas rounds to {}x{} pixels", width, height);
    }

    let by_id: HashMap<ImageId, &ImageEntry> = entries.iter().map(|e| (e.id, e)).collect();
    let tiles = layout.pixel_tiles();

    let resized: Vec<(PixelRect, RgbaImage)> = tiles
        .par_iter()
        .filter(|(id, px)| {
            let visible = px.width > 0 && px.height > 0;
            if !visible {
                tracing::debug!("Tile for {:?} rounds to zero size, skipping", id);
            }
            visible
        })
        .map(|(id, px)| {
            let entry = by_id
                .get(id)
                .with_context(|| format!("layout references unknown image {:?}", id))?;
            let decoded = image::open(&entry.path)
                .with_context(|| format!("failed to decode {}", entry.path.display()))?;
            let tile = decoded
                .resize_exact(px.width, px.height, config.filter)
                .to_rgba8();
            Ok((*px, tile))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba(config.background));
    for (px, tile) in &resized {
        image::imageops::replace(&mut canvas, tile, px.x as i64, px.y as i64);
    }

    tracing::info!(
        "Collage rendered: {}x{} from {} tiles",
        width,
        height,
        resized.len()
    );
    Ok(canvas)
}

/// Save the canvas; the format follows the file extension. JPEG output drops alpha.
pub fn save_collage(canvas: &RgbaImage, path: &Path) -> Result<()> {
    let is_jpeg = path
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_ascii_lowercase();
            ext == "jpg" || ext == "jpeg"
        })
        .unwrap_or(false);

    if is_jpeg {
        DynamicImage::ImageRgba8(canvas.clone())
            .to_rgb8()
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    } else {
        canvas
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    tracing::info!("Collage saved to {}", path.display());
    Ok(())
}
