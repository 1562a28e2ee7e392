use serde::Serialize;

use super::CollageConfig;
use crate::error::{CollageError, Result};
use crate::tree::aggregate::evaluate_ratios;
use crate::tree::arena::{CollageTree, NodeKind, Orientation};
use crate::tree::build_guided_tree;
use crate::tree::pool::{ratio_distance, AspectRatioPool};
use crate::tree::split::SplitSource;

/// Closed interval `[expect / thresh, expect * thresh]` of acceptable ratios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptanceBand {
    pub low: f64,
    pub high: f64,
}

impl AcceptanceBand {
    pub fn new(expect_ratio: f64, thresh: f64) -> Self {
        Self {
            low: expect_ratio / thresh,
            high: expect_ratio * thresh,
        }
    }

    pub fn contains(&self, ratio: f64) -> bool {
        ratio >= self.low && ratio <= self.high
    }
}

/// Work done before a layout was accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConvergenceStats {
    /// Trees discarded and rebuilt from scratch.
    pub regenerations: usize,
    /// In-place adjustment passes.
    pub adjustments: usize,
    /// Bottom-up ratio evaluations.
    pub evaluations: usize,
}

impl ConvergenceStats {
    pub fn attempts(&self) -> usize {
        self.adjustments + self.regenerations
    }
}

/// A tree whose root ratio sits inside the acceptance band.
#[derive(Debug, Clone)]
pub struct Converged {
    pub tree: CollageTree,
    pub stats: ConvergenceStats,
}

/// One top-down adjustment pass over every internal node.
///
/// A node wider than `expected * half_tolerance` is turned into a stack and
/// its children aim twice as wide; a node narrower than
/// `expected / half_tolerance` is turned side by side and its children aim
/// half as wide. A node already inside the half tolerance keeps its
/// orientation and its children still aim twice as wide.
pub fn adjust_pass(tree: &mut CollageTree, expect_ratio: f64, thresh: f64) {
    if tree.is_empty() {
        return;
    }
    let half_tolerance = 1.0 + (thresh - 1.0) / 2.0;
    let root = tree.root();
    tree.get_mut(root).expected_ratio = expect_ratio;

    // Parents sit after their children, so walking backwards reaches every
    // parent before the children whose targets it rewrites.
    for i in (0..tree.nodes.len()).rev() {
        let node = &tree.nodes[i];
        let NodeKind::Split {
            orientation,
            left,
            right,
        } = node.kind
        else {
            continue;
        };
        let expected = node.expected_ratio;
        let achieved = node.achieved_ratio;

        let (orientation, child_target) = if achieved > expected * half_tolerance {
            (Orientation::Horizontal, expected * 2.0)
        } else if achieved < expected / half_tolerance {
            (Orientation::Vertical, expected / 2.0)
        } else {
            (orientation, expected * 2.0)
        };

        tree.nodes[i].kind = NodeKind::Split {
            orientation,
            left,
            right,
        };
        tree.nodes[left.index()].expected_ratio = child_target;
        tree.nodes[right.index()].expected_ratio = child_target;
    }
}

/// Build, evaluate and adjust trees until the root ratio lands inside
/// `[expect_ratio / thresh, expect_ratio * thresh]`.
///
/// Each generation allows `max_adjust_iters` evaluations with an adjustment
/// pass between consecutive ones; after that the tree is discarded and
/// rebuilt from a fresh copy of `pool`. Gives up with
/// `CollageError::ConvergenceFailure` once `max_regenerations` rebuilds have
/// also failed, so at most `max_adjust_iters * (max_regenerations + 1)`
/// evaluations ever run.
pub fn converge(
    pool: &AspectRatioPool,
    config: &CollageConfig,
    splits: &mut dyn SplitSource,
) -> Result<Converged> {
    let expect_ratio = config.expect_ratio;
    let thresh = config.thresh;
    let band = AcceptanceBand::new(expect_ratio, thresh);
    let passes = config.max_adjust_iters;

    let mut stats = ConvergenceStats::default();
    let mut best_ratio = f64::NAN;
    let mut best_distance = f64::INFINITY;

    for generation in 0..=config.max_regenerations {
        if generation > 0 {
            stats.regenerations += 1;
            tracing::debug!(
                "Regenerating tree (generation {}, closest ratio so far {:.4})",
                generation,
                best_ratio
            );
        }

        let mut working = pool.clone();
        let mut tree = build_guided_tree(&mut working, expect_ratio, splits)?;

        for pass in 0..passes {
            let ratio = evaluate_ratios(&mut tree);
            stats.evaluations += 1;

            let distance = ratio_distance(ratio, expect_ratio);
            if distance < best_distance {
                best_distance = distance;
                best_ratio = ratio;
            }

            if band.contains(ratio) {
                tracing::info!(
                    "Converged to ratio {:.4} (band [{:.4}, {:.4}]) after {} regenerations, {} adjustments",
                    ratio,
                    band.low,
                    band.high,
                    stats.regenerations,
                    stats.adjustments
                );
                return Ok(Converged { tree, stats });
            }

            if pass + 1 < passes {
                adjust_pass(&mut tree, expect_ratio, thresh);
                stats.adjustments += 1;
            }
        }
    }

    tracing::warn!(
        "No layout within [{:.4}, {:.4}] after {} evaluations; closest ratio {:.4}",
        band.low,
        band.high,
        stats.evaluations,
        best_ratio
    );
    Err(CollageError::ConvergenceFailure {
        expect_ratio,
        thresh,
        best_ratio,
        evaluations: stats.evaluations,
    })
}
