use super::arena::{CollageTree, NodeKind};

/// Compute the achieved aspect ratio of every node (bottom-up) and return
/// the root's.
///
/// Leaves report their image ratio. A vertical split adds its children's
/// ratios (widths add at equal height); a horizontal split combines them
/// harmonically (heights add at equal width).
pub fn evaluate_ratios(tree: &mut CollageTree) -> f64 {
    // Process nodes in index order: `add_split` only accepts children that
    // already exist, so every child precedes its parent in the arena.
    for i in 0..tree.nodes.len() {
        let achieved = match tree.nodes[i].kind {
            NodeKind::Leaf { ratio, .. } => ratio,
            NodeKind::Split {
                orientation,
                left,
                right,
            } => {
                debug_assert!(left.index() < i && right.index() < i);
                orientation.combine(
                    tree.nodes[left.index()].achieved_ratio,
                    tree.nodes[right.index()].achieved_ratio,
                )
            }
        };
        tree.nodes[i].achieved_ratio = achieved;
    }
    tree.root_ratio()
}
