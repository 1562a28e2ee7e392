use thiserror::Error;

use crate::tree::arena::ImageId;

/// Errors produced by the layout engine.
///
/// Only `ConvergenceFailure` is expected in normal operation; the input
/// variants are raised once, before any tree work, and `PoolExhausted`
/// means the builder itself is broken.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollageError {
    #[error("image {id:?} has invalid aspect ratio {ratio} (must be finite and > 0)")]
    InvalidRatio { id: ImageId, ratio: f64 },

    #[error("image {0:?} appears more than once")]
    DuplicateImage(ImageId),

    #[error("no images to lay out")]
    NoImages,

    #[error("expected aspect ratio {0} must be finite and > 0")]
    InvalidTarget(f64),

    #[error("tolerance {0} must be finite and > 1")]
    InvalidTolerance(f64),

    #[error("canvas side {0} must be finite and > 0")]
    InvalidCanvas(f64),

    #[error("at least one evaluation per tree is required")]
    NoAdjustIterations,

    #[error("aspect ratio pool exhausted: requested {requested}, {available} left")]
    PoolExhausted { requested: usize, available: usize },

    #[error(
        "no layout within [{:.3}, {:.3}] after {evaluations} evaluations (closest ratio {best_ratio:.3})",
        .expect_ratio / .thresh,
        .expect_ratio * .thresh
    )]
    ConvergenceFailure {
        expect_ratio: f64,
        thresh: f64,
        best_ratio: f64,
        evaluations: usize,
    },
}

pub type Result<T, E = CollageError> = std::result::Result<T, E>;
