/// Diagnostic tool to verify pool → tree → adjust → resolve pipeline
use collage_rs::layout::{compute_layout, CanvasSize, CollageConfig};
use collage_rs::scanner;
use collage_rs::tree::arena::ImageId;
use collage_rs::tree::pool::AspectRatioUnit;
use collage_rs::tree::split::RandomSplits;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;

const SYNTHETIC_IMAGES: u32 = 37;
const SEED: u64 = 2012;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("collage_rs=debug".parse()?),
        )
        .init();

    println!("=== DIAGNOSTIC: Pool → Tree → Layout Pipeline ===");

    // Ratios: scanned from a path if given, otherwise synthetic
    let units: Vec<AspectRatioUnit> = match std::env::args().nth(1).map(PathBuf::from) {
        Some(input) => {
            println!("Scanning: {}", input.display());
            let entries = scanner::load_images(&input)?;
            entries
                .iter()
                .map(|e| e.ratio_unit())
                .collect::<Result<_, _>>()?
        }
        None => {
            println!("No input given, using {} synthetic ratios", SYNTHETIC_IMAGES);
            let mut rng = StdRng::seed_from_u64(SEED);
            (0..SYNTHETIC_IMAGES)
                .map(|i| AspectRatioUnit::new(ImageId(i), rng.random_range(0.4..2.5)))
                .collect::<Result<_, _>>()?
        }
    };
    println!("\n[1] Pool: {} images", units.len());

    let mut ratios: Vec<f64> = units.iter().map(|u| u.ratio).collect();
    ratios.sort_by(|a, b| a.total_cmp(b));
    if let (Some(min), Some(max)) = (ratios.first(), ratios.last()) {
        println!("    Ratio range: {:.3} .. {:.3}", min, max);
    }

    let config = CollageConfig {
        expect_ratio: 16.0 / 9.0,
        thresh: 1.05,
        canvas: CanvasSize::Height(1080.0),
        ..CollageConfig::default()
    };
    let band = config.band();
    println!(
        "\n[2] Target: {:.4} (band [{:.4}, {:.4}])",
        config.expect_ratio, band.low, band.high
    );

    let mut splits = RandomSplits::seeded(SEED);
    let layout = compute_layout(&units, &config, &mut splits)?;

    println!("\n[3] Converged:");
    println!("    Root ratio:    {:.4}", layout.ratio);
    println!("    Regenerations: {}", layout.stats.regenerations);
    println!("    Adjustments:   {}", layout.stats.adjustments);
    println!("    Evaluations:   {}", layout.stats.evaluations);

    let tree = &layout.tree;
    println!("\n[4] Tree: {} nodes, depth {}", tree.len(), tree.depth());
    let mut leaves = tree.leaf_images();
    leaves.sort();
    leaves.dedup();
    println!(
        "    Distinct leaf images: {} (expected {})",
        leaves.len(),
        units.len()
    );

    // Show the 10 largest tiles
    println!("\n[5] Top 10 largest tiles by area:");
    let mut sorted_tiles = layout.tiles.clone();
    sorted_tiles.sort_by(|a, b| b.rect.area().total_cmp(&a.rect.area()));
    for (i, tile) in sorted_tiles.iter().take(10).enumerate() {
        let r = tile.rect;
        println!(
            "    [{}] {:?} - {:.1}x{:.1} ({:.0}px²) at ({:.1}, {:.1})",
            i,
            tile.image,
            r.w,
            r.h,
            r.area(),
            r.x,
            r.y
        );
    }

    // Check for anomalies
    println!("\n[6] Checking for anomalies:");
    let canvas_area = layout.width * layout.height;
    let tile_area = layout.total_tile_area();
    println!("    Total tile area: {:.1}px²", tile_area);
    println!("    Canvas area:     {:.1}px²", canvas_area);
    println!("    Coverage:        {:.6}%", tile_area / canvas_area * 100.0);

    let mut overlaps = 0usize;
    for (i, a) in layout.tiles.iter().enumerate() {
        for b in &layout.tiles[i + 1..] {
            let ix = a.rect.right().min(b.rect.right()) - a.rect.x.max(b.rect.x);
            let iy = a.rect.bottom().min(b.rect.bottom()) - a.rect.y.max(b.rect.y);
            if ix > 1e-6 && iy > 1e-6 {
                overlaps += 1;
            }
        }
    }
    println!("    Overlapping tile pairs: {}", overlaps);

    // Sample a grid of points; every one must hit a tile
    let mut misses = 0usize;
    let steps = 40;
    for sx in 0..steps {
        for sy in 0..steps {
            let x = (sx as f64 + 0.5) / steps as f64 * layout.width;
            let y = (sy as f64 + 0.5) / steps as f64 * layout.height;
            if layout.tile_at(x, y).is_none() {
                misses += 1;
            }
        }
    }
    println!("    Sample points outside any tile: {} of {}", misses, steps * steps);

    let (pw, ph) = layout.pixel_canvas();
    println!("\n[7] Pixel canvas: {}x{}", pw, ph);

    Ok(())
}
