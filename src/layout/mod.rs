pub mod adjust;
pub mod resolve;

use serde::Serialize;

pub use adjust::{adjust_pass, converge, AcceptanceBand, Converged, ConvergenceStats};
pub use resolve::{resolve_node_rects, resolve_tiles};

use crate::error::{CollageError, Result};
use crate::tree::aggregate::evaluate_ratios;
use crate::tree::arena::{CollageTree, ImageId};
use crate::tree::build_guided_tree;
use crate::tree::pool::{AspectRatioPool, AspectRatioUnit};
use crate::tree::split::SplitSource;

/// A real-valued rectangle on the canvas. Rounded only at output time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Half-open containment: left/top edges inside, right/bottom outside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Round each edge to the nearest pixel. Rectangles sharing an edge keep
    /// sharing it after rounding.
    pub fn to_pixels(&self) -> PixelRect {
        let x0 = self.x.round().max(0.0);
        let y0 = self.y.round().max(0.0);
        let x1 = self.right().round().max(x0);
        let y1 = self.bottom().round().max(y0);
        PixelRect {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        }
    }
}

/// Integer rectangle handed to renderers and exporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One image and the rectangle it fills.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub image: ImageId,
    pub rect: Rect,
}

/// Which canvas side the caller fixes; the other follows from the achieved ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasSize {
    Height(f64),
    Width(f64),
}

impl CanvasSize {
    /// The fixed side's length.
    pub fn side(self) -> f64 {
        match self {
            CanvasSize::Height(h) => h,
            CanvasSize::Width(w) => w,
        }
    }

    /// (width, height) of a canvas with aspect ratio `ratio`.
    pub fn dimensions(self, ratio: f64) -> (f64, f64) {
        match self {
            CanvasSize::Height(h) => (h * ratio, h),
            CanvasSize::Width(w) => (w, w / ratio),
        }
    }
}

/// Configuration for the guided collage layout.
#[derive(Debug, Clone, PartialEq)]
pub struct CollageConfig {
    /// Target canvas aspect ratio (width / height)
    pub expect_ratio: f64,
    /// Accept ratios in `[expect_ratio / thresh, expect_ratio * thresh]`; must be > 1
    pub thresh: f64,
    /// Fixed canvas side
    pub canvas: CanvasSize,
    /// Evaluations per tree before it is regenerated
    pub max_adjust_iters: usize,
    /// Fresh trees tried before giving up
    pub max_regenerations: usize,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            expect_ratio: 1.0,
            thresh: 1.1,
            canvas: CanvasSize::Height(800.0),
            max_adjust_iters: 100,
            max_regenerations: 100,
        }
    }
}

impl CollageConfig {
    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.expect_ratio.is_finite() || self.expect_ratio <= 0.0 {
            return Err(CollageError::InvalidTarget(self.expect_ratio));
        }
        if !self.thresh.is_finite() || self.thresh <= 1.0 {
            return Err(CollageError::InvalidTolerance(self.thresh));
        }
        let side = self.canvas.side();
        if !side.is_finite() || side <= 0.0 {
            return Err(CollageError::InvalidCanvas(side));
        }
        if self.max_adjust_iters == 0 {
            return Err(CollageError::NoAdjustIterations);
        }
        Ok(())
    }

    pub fn band(&self) -> AcceptanceBand {
        AcceptanceBand::new(self.expect_ratio, self.thresh)
    }
}

/// The accepted tree and the geometry resolved from it.
#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub tree: CollageTree,
    pub width: f64,
    pub height: f64,
    /// Achieved root aspect ratio
    pub ratio: f64,
    /// Leaf rectangles, left to right in tree order
    pub tiles: Vec<Tile>,
    pub stats: ConvergenceStats,
}

impl LayoutResult {
    pub fn canvas_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Canvas size in whole pixels.
    pub fn pixel_canvas(&self) -> (u32, u32) {
        let px = self.canvas_rect().to_pixels();
        (px.width, px.height)
    }

    pub fn pixel_tiles(&self) -> Vec<(ImageId, PixelRect)> {
        self.tiles
            .iter()
            .map(|t| (t.image, t.rect.to_pixels()))
            .collect()
    }

    /// Image under the canvas point (x, y), if any.
    pub fn tile_at(&self, x: f64, y: f64) -> Option<ImageId> {
        self.tiles
            .iter()
            .find(|t| t.rect.contains(x, y))
            .map(|t| t.image)
    }

    pub fn total_tile_area(&self) -> f64 {
        self.tiles.iter().map(|t| t.rect.area()).sum()
    }
}

/// Compute a collage layout whose ratio lies within the configured band.
///
/// Input is validated once up front; `CollageError::ConvergenceFailure` is
/// the only error a valid input can produce.
pub fn compute_layout(
    units: &[AspectRatioUnit],
    config: &CollageConfig,
    splits: &mut dyn SplitSource,
) -> Result<LayoutResult> {
    config.validate()?;
    let pool = AspectRatioPool::from_units(units.to_vec())?;

    tracing::info!(
        "Laying out {} images, target ratio {:.3} (thresh {:.3}), canvas {:?}",
        pool.len(),
        config.expect_ratio,
        config.thresh,
        config.canvas
    );

    let Converged { tree, stats } = converge(&pool, config, splits)?;
    Ok(finish_layout(tree, config.canvas, stats))
}

/// Single guided build with no adjustment loop. Always succeeds for valid input,
/// but the achieved ratio may be far from `expect_ratio`.
pub fn compute_unguided_layout(
    units: &[AspectRatioUnit],
    expect_ratio: f64,
    canvas: CanvasSize,
    splits: &mut dyn SplitSource,
) -> Result<LayoutResult> {
    CollageConfig {
        expect_ratio,
        canvas,
        ..CollageConfig::default()
    }
    .validate()?;
    let mut pool = AspectRatioPool::from_units(units.to_vec())?;

    let mut tree = build_guided_tree(&mut pool, expect_ratio, splits)?;
    let ratio = evaluate_ratios(&mut tree);
    tracing::info!(
        "Unguided layout of {} images: ratio {:.4} (target {:.4})",
        units.len(),
        ratio,
        expect_ratio
    );

    let stats = ConvergenceStats {
        evaluations: 1,
        ..ConvergenceStats::default()
    };
    Ok(finish_layout(tree, canvas, stats))
}

fn finish_layout(tree: CollageTree, canvas: CanvasSize, stats: ConvergenceStats) -> LayoutResult {
    let ratio = tree.root_ratio();
    let (width, height) = canvas.dimensions(ratio);
    let tiles = resolve_tiles(&tree, Rect::new(0.0, 0.0, width, height));

    tracing::debug!(
        "Resolved {} tiles on a {:.1}x{:.1} canvas",
        tiles.len(),
        width,
        height
    );

    LayoutResult {
        tree,
        width,
        height,
        ratio,
        tiles,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::arena::Orientation;
    use crate::tree::split::{RandomSplits, ScriptedSplits};

    fn units(ratios: &[f64]) -> Vec<AspectRatioUnit> {
        ratios
            .iter()
            .enumerate()
            .map(|(i, &r)| AspectRatioUnit::new(ImageId(i as u32), r).unwrap())
            .collect()
    }

    #[test]
    fn config_validation() {
        assert!(CollageConfig::default().validate().is_ok());
        let bad_thresh = CollageConfig {
            thresh: 1.0,
            ..CollageConfig::default()
        };
        assert_eq!(bad_thresh.validate(), Err(CollageError::InvalidTolerance(1.0)));
        let bad_ratio = CollageConfig {
            expect_ratio: -2.0,
            ..CollageConfig::default()
        };
        assert_eq!(bad_ratio.validate(), Err(CollageError::InvalidTarget(-2.0)));
        let bad_canvas = CollageConfig {
            canvas: CanvasSize::Width(0.0),
            ..CollageConfig::default()
        };
        assert_eq!(bad_canvas.validate(), Err(CollageError::InvalidCanvas(0.0)));
    }

    #[test]
    fn zero_adjust_iterations_are_rejected() {
        let config = CollageConfig {
            max_adjust_iters: 0,
            max_regenerations: 2,
            ..CollageConfig::default()
        };
        assert_eq!(config.validate(), Err(CollageError::NoAdjustIterations));

        let mut splits = RandomSplits::seeded(0);
        let err = compute_layout(&units(&[0.5, 2.0]), &config, &mut splits).unwrap_err();
        assert_eq!(err, CollageError::NoAdjustIterations);
    }

    #[test]
    fn empty_input_is_rejected_before_building() {
        let mut splits = RandomSplits::seeded(0);
        let err = compute_layout(&[], &CollageConfig::default(), &mut splits).unwrap_err();
        assert_eq!(err, CollageError::NoImages);
    }

    #[test]
    fn single_image_fills_canvas() {
        let mut splits = RandomSplits::seeded(0);
        let config = CollageConfig {
            expect_ratio: 1.5,
            thresh: 1.2,
            canvas: CanvasSize::Height(200.0),
            ..CollageConfig::default()
        };
        let layout = compute_layout(&units(&[1.5]), &config, &mut splits).unwrap();
        assert_eq!(layout.tiles.len(), 1);
        assert_eq!(layout.tiles[0].rect, Rect::new(0.0, 0.0, 300.0, 200.0));
        assert_eq!(layout.pixel_canvas(), (300, 200));
    }

    #[test]
    fn four_images_at_height_100() {
        let config = CollageConfig {
            expect_ratio: 1.0,
            thresh: 1.2,
            canvas: CanvasSize::Height(100.0),
            ..CollageConfig::default()
        };
        let mut splits = ScriptedSplits::always(Orientation::Vertical);
        let layout = compute_layout(&units(&[0.5, 1.0, 2.0, 4.0]), &config, &mut splits).unwrap();

        assert_eq!(layout.tiles.len(), 4);
        assert!(layout.ratio >= 1.0 / 1.2 && layout.ratio <= 1.2);
        assert_eq!(layout.height, 100.0);
        let canvas_area = layout.width * 100.0;
        assert!((layout.total_tile_area() - canvas_area).abs() <= canvas_area * 1e-6);
    }

    #[test]
    fn fixed_width_derives_height() {
        let config = CollageConfig {
            expect_ratio: 2.0,
            thresh: 1.5,
            canvas: CanvasSize::Width(400.0),
            ..CollageConfig::default()
        };
        let mut splits = RandomSplits::seeded(3);
        let layout =
            compute_layout(&units(&[1.0, 1.33, 0.75, 1.5, 2.0]), &config, &mut splits).unwrap();
        assert_eq!(layout.width, 400.0);
        assert!((layout.height - 400.0 / layout.ratio).abs() < 1e-9);
    }

    #[test]
    fn unguided_layout_skips_adjustment() {
        let mut splits = ScriptedSplits::always(Orientation::Horizontal);
        let layout = compute_unguided_layout(
            &units(&[1.0, 1.0, 1.0, 1.0]),
            1.0,
            CanvasSize::Height(100.0),
            &mut splits,
        )
        .unwrap();
        assert_eq!(layout.stats.evaluations, 1);
        assert_eq!(layout.stats.attempts(), 0);
        assert_eq!(layout.tiles.len(), 4);
    }

    #[test]
    fn pixel_rects_share_edges() {
        let a = Rect::new(0.0, 0.0, 33.4, 10.0);
        let b = Rect::new(33.4, 0.0, 33.3, 10.0);
        let (pa, pb) = (a.to_pixels(), b.to_pixels());
        assert_eq!(pa.x + pa.width, pb.x);
    }

    #[test]
    fn tile_at_finds_covering_image() {
        let mut splits = ScriptedSplits::always(Orientation::Vertical);
        let config = CollageConfig {
            expect_ratio: 2.0,
            thresh: 1.2,
            canvas: CanvasSize::Height(100.0),
            ..CollageConfig::default()
        };
        let layout = compute_layout(&units(&[1.0, 1.0]), &config, &mut splits).unwrap();
        assert_eq!(layout.tile_at(10.0, 50.0), Some(layout.tiles[0].image));
        assert_eq!(layout.tile_at(150.0, 50.0), Some(layout.tiles[1].image));
        assert_eq!(layout.tile_at(250.0, 50.0), None);
    }
}
