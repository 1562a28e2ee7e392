use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use collage_rs::export::{write_html, write_manifest};
use collage_rs::render::{render_collage, save_collage, RenderConfig};
use collage_rs::scanner;
use collage_rs::{
    compute_layout, compute_unguided_layout, CanvasSize, CollageConfig, RandomSplits,
};

#[derive(Parser)]
#[command(name = "collage-rs")]
#[command(about = "Tile images into a gap-free collage with a chosen aspect ratio", long_about = None)]
struct Args {
    /// Image list file (one path per line) or a directory to scan for images
    input: PathBuf,

    /// Target canvas aspect ratio (width / height), 0.1 to 10
    #[arg(long, default_value = "1.0")]
    ratio: f64,

    /// Accept ratios within [ratio / thresh, ratio * thresh]; must be > 1
    #[arg(long, default_value = "1.1")]
    thresh: f64,

    /// Fixed canvas height in pixels (width follows from the layout)
    #[arg(long, conflicts_with = "width")]
    height: Option<u32>,

    /// Fixed canvas width in pixels (height follows from the layout)
    #[arg(long)]
    width: Option<u32>,

    /// Seed for split choices; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Evaluations per tree before regenerating it
    #[arg(long, default_value = "100")]
    max_adjust: usize,

    /// Tree regenerations before giving up
    #[arg(long, default_value = "100")]
    max_regen: usize,

    /// Build a single guided tree without steering it into the tolerance band
    #[arg(long)]
    no_adjust: bool,

    /// Write the composited collage image (format from extension)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Write an HTML page positioning the original images
    #[arg(long)]
    html: Option<PathBuf>,

    /// Write a JSON manifest of the tile rectangles
    #[arg(long)]
    json: Option<PathBuf>,
}

const MIN_CANVAS_SIDE: u32 = 100;
const MAX_CANVAS_SIDE: u32 = 20_000;

impl Args {
    fn to_config(&self) -> Result<CollageConfig> {
        if !(0.1..=10.0).contains(&self.ratio) {
            bail!("--ratio must be within [0.1, 10], got {}", self.ratio);
        }
        let canvas = match (self.height, self.width) {
            (_, Some(w)) => CanvasSize::Width(checked_side("--width", w)? as f64),
            (Some(h), None) => CanvasSize::Height(checked_side("--height", h)? as f64),
            (None, None) => CollageConfig::default().canvas,
        };
        let config = CollageConfig {
            expect_ratio: self.ratio,
            thresh: self.thresh,
            canvas,
            max_adjust_iters: self.max_adjust,
            max_regenerations: self.max_regen,
        };
        config.validate()?;
        Ok(config)
    }
}

fn checked_side(flag: &str, side: u32) -> Result<u32> {
    if !(MIN_CANVAS_SIDE..=MAX_CANVAS_SIDE).contains(&side) {
        bail!(
            "{} must be within [{}, {}], got {}",
            flag,
            MIN_CANVAS_SIDE,
            MAX_CANVAS_SIDE,
            side
        );
    }
    Ok(side)
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("collage_rs=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = args.to_config()?;

    let entries = scanner::load_images(&args.input)?;
    let units = entries
        .iter()
        .map(|e| e.ratio_unit())
        .collect::<Result<Vec<_>, _>>()?;

    let mut splits = match args.seed {
        Some(seed) => RandomSplits::seeded(seed),
        None => RandomSplits::from_entropy(),
    };

    let start = Instant::now();
    let layout = if args.no_adjust {
        compute_unguided_layout(&units, config.expect_ratio, config.canvas, &mut splits)?
    } else {
        compute_layout(&units, &config, &mut splits)
            .context("try a looser --thresh or a different --ratio")?
    };
    let elapsed = start.elapsed();

    let (width, height) = layout.pixel_canvas();
    println!("Images:                    {}", layout.tiles.len());
    println!("Tree re-generation number: {}", layout.stats.regenerations);
    println!("Tree adjust number:        {}", layout.stats.adjustments);
    println!("Canvas:                    {}x{}", width, height);
    println!("Canvas ratio:              {:.4}", layout.ratio);
    println!("Processing time:           {} us", elapsed.as_micros());

    if let Some(path) = &args.output {
        let canvas = render_collage(&layout, &entries, &RenderConfig::default())?;
        save_collage(&canvas, path)?;
        println!("Collage image:             {}", path.display());
    }
    if let Some(path) = &args.html {
        write_html(&layout, &entries, path)?;
        println!("HTML page:                 {}", path.display());
    }
    if let Some(path) = &args.json {
        write_manifest(&layout, &entries, path)?;
        println!("Manifest:                  {}", path.display());
    }

    Ok(())
}
