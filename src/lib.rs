// Public library interface for collage-rs
// This allows the CLI and the debug tool to share the layout engine

pub mod error;
pub mod export;
pub mod layout;
pub mod render;
pub mod scanner;
pub mod tree;

pub use error::CollageError;
pub use layout::{
    compute_layout, compute_unguided_layout, CanvasSize, CollageConfig, LayoutResult, PixelRect,
    Rect, Tile,
};
pub use tree::arena::{ImageId, Orientation};
pub use tree::pool::{AspectRatioPool, AspectRatioUnit};
pub use tree::split::{RandomSplits, ScriptedSplits, SplitSource};
