pub mod aggregate;
pub mod arena;
pub mod pool;
pub mod split;

use self::arena::{CollageTree, NodeId, Orientation};
use self::pool::AspectRatioPool;
use self::split::SplitSource;
use crate::error::{CollageError, Result};

/// Below this target every free split is forced `Vertical`.
pub const MIN_FREE_SPLIT_RATIO: f64 = 0.1;
/// Above this target every free split is forced `Horizontal`.
pub const MAX_FREE_SPLIT_RATIO: f64 = 10.0;

/// Build a guided binary tree over every unit in `pool`.
///
/// The image count is halved recursively while a per-node target ratio is
/// propagated downwards; leaves and leaf pairs are filled with the pool
/// entries that best match their local target. The pool is drained
/// completely, so the leaves are a permutation of the input images.
pub fn build_guided_tree(
    pool: &mut AspectRatioPool,
    target_ratio: f64,
    splits: &mut dyn SplitSource,
) -> Result<CollageTree> {
    let count = pool.len();
    if count == 0 {
        return Err(CollageError::NoImages);
    }

    let mut tree = CollageTree::with_capacity(count);
    let root = guided_subtree(&mut tree, pool, count, target_ratio, splits)?;
    debug_assert_eq!(root, tree.root());
    debug_assert!(pool.is_empty(), "guided build left {} units", pool.len());

    tracing::debug!(
        "Guided tree built: {} leaves, {} nodes, depth {}",
        count,
        tree.len(),
        tree.depth()
    );
    Ok(tree)
}

/// Recursively build a subtree holding exactly `count` images.
fn guided_subtree(
    tree: &mut CollageTree,
    pool: &mut AspectRatioPool,
    count: usize,
    target: f64,
    splits: &mut dyn SplitSource,
) -> Result<NodeId> {
    match count {
        0 => Err(pool_exhausted(0, pool.len())),
        1 => {
            let unit = pool
                .take_best_single(target)
                .ok_or_else(|| pool_exhausted(1, pool.len()))?;
            Ok(tree.add_leaf(unit.id, unit.ratio, target))
        }
        2 => {
            let pair = pool
                .take_best_pair(target)
                .ok_or_else(|| pool_exhausted(2, pool.len()))?;
            let child_target = pair.orientation.child_target(target);
            let left = tree.add_leaf(pair.first.id, pair.first.ratio, child_target);
            let right = tree.add_leaf(pair.second.id, pair.second.ratio, child_target);
            Ok(tree.add_split(pair.orientation, left, right, target))
        }
        _ => {
            let orientation = if target < MIN_FREE_SPLIT_RATIO {
                Orientation::Vertical
            } else if target > MAX_FREE_SPLIT_RATIO {
                Orientation::Horizontal
            } else {
                splits.next_orientation()
            };
            let child_target = orientation.child_target(target);
            let left_count = count / 2;
            let right_count = count - left_count;

            let left = guided_subtree(tree, pool, left_count, child_target, splits)?;
            let right = guided_subtree(tree, pool, right_count, child_target, splits)?;
            Ok(tree.add_split(orientation, left, right, target))
        }
    }
}

fn pool_exhausted(requested: usize, available: usize) -> CollageError {
    debug_assert!(
        false,
        "guided build requested {} units with {} left",
        requested, available
    );
    CollageError::PoolExhausted {
        requested,
        available,
    }
}
