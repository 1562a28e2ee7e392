use super::{Rect, Tile};
use crate::tree::arena::{CollageTree, NodeKind, Orientation};

/// Assign a rectangle to every node, top-down from `canvas` at the root.
///
/// The first child of a split sizes itself from its achieved ratio along the
/// split axis; the second child takes whatever remains and is pushed against
/// the far edge, so children always tile their parent exactly.
/// The returned vector is indexed by `NodeId::index()`.
pub fn resolve_node_rects(tree: &CollageTree, canvas: Rect) -> Vec<Rect> {
    let mut rects = vec![Rect::default(); tree.len()];
    if tree.is_empty() {
        return rects;
    }
    let root = tree.root();
    rects[root.index()] = canvas;

    // Reverse arena order visits every parent before its children.
    for i in (0..tree.len()).rev() {
        let NodeKind::Split {
            orientation,
            left,
            right,
        } = tree.nodes[i].kind
        else {
            continue;
        };
        let parent = rects[i];
        let first_ratio = tree.get(left).achieved_ratio;
        let (first, second) = split_rect(parent, orientation, first_ratio);
        rects[left.index()] = first;
        rects[right.index()] = second;
    }
    rects
}

/// Leaf rectangles in left-to-right tree order.
pub fn resolve_tiles(tree: &CollageTree, canvas: Rect) -> Vec<Tile> {
    if tree.is_empty() {
        return Vec::new();
    }
    let rects = resolve_node_rects(tree, canvas);
    let mut tiles = Vec::with_capacity(tree.len() / 2 + 1);
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        match tree.get(id).kind {
            NodeKind::Leaf { image, .. } => tiles.push(Tile {
                image,
                rect: rects[id.index()],
            }),
            NodeKind::Split { left, right, .. } => {
                stack.push(right);
                stack.push(left);
            }
        }
    }
    tiles
}

fn split_rect(parent: Rect, orientation: Orientation, first_ratio: f64) -> (Rect, Rect) {
    match orientation {
        Orientation::Vertical => {
            // Height shared, widths add.
            let first_w = parent.h * first_ratio;
            let second_w = parent.w - first_w;
            let first = Rect::new(parent.x, parent.y, first_w, parent.h);
            let second = Rect::new(parent.x + parent.w - second_w, parent.y, second_w, parent.h);
            (first, second)
        }
        Orientation::Horizontal => {
            // Width shared, heights add.
            let first_h = parent.w / first_ratio;
            let second_h = parent.h - first_h;
            let first = Rect::new(parent.x, parent.y, parent.w, first_h);
            let second = Rect::new(parent.x, parent.y + parent.h - second_h, parent.w, second_h);
            (first, second)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::aggregate::evaluate_ratios;
    use crate::tree::arena::ImageId;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn lone_leaf_takes_whole_canvas() {
        let mut tree = CollageTree::new();
        tree.add_leaf(ImageId(4), 1.5, 1.5);
        evaluate_ratios(&mut tree);
        let canvas = Rect::new(0.0, 0.0, 150.0, 100.0);
        let tiles = resolve_tiles(&tree, canvas);
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].image, ImageId(4));
        assert_eq!(tiles[0].rect, canvas);
    }

    #[test]
    fn vertical_split_places_second_child_on_the_right() {
        let mut tree = CollageTree::new();
        let a = tree.add_leaf(ImageId(0), 0.5, 1.0);
        let b = tree.add_leaf(ImageId(1), 1.5, 1.0);
        tree.add_split(Orientation::Vertical, a, b, 2.0);
        let ratio = evaluate_ratios(&mut tree);

        let tiles = resolve_tiles(&tree, Rect::new(10.0, 20.0, 100.0 * ratio, 100.0));
        assert_eq!(tiles[0].rect, Rect::new(10.0, 20.0, 50.0, 100.0));
        assert_close(tiles[1].rect.x, 60.0);
        assert_close(tiles[1].rect.w, 150.0);
        assert_eq!(tiles[1].rect.y, 20.0);
        assert_eq!(tiles[1].rect.h, 100.0);
    }

    #[test]
    fn horizontal_split_places_second_child_below() {
        let mut tree = CollageTree::new();
        let a = tree.add_leaf(ImageId(0), 2.0, 1.0);
        let b = tree.add_leaf(ImageId(1), 1.0, 1.0);
        tree.add_split(Orientation::Horizontal, a, b, 1.0);
        let ratio = evaluate_ratios(&mut tree);

        let width = 120.0;
        let tiles = resolve_tiles(&tree, Rect::new(0.0, 0.0, width, width / ratio));
        assert_close(tiles[0].rect.h, 60.0);
        assert_close(tiles[1].rect.y, 60.0);
        assert_close(tiles[1].rect.h, 120.0);
        assert_eq!(tiles[1].rect.w, width);
    }

    #[test]
    fn second_child_absorbs_rounding_slack() {
        // Canvas deliberately off from the tree's own ratio.
        let mut tree = CollageTree::new();
        let a = tree.add_leaf(ImageId(0), 1.0, 1.0);
        let b = tree.add_leaf(ImageId(1), 1.0, 1.0);
        tree.add_split(Orientation::Vertical, a, b, 2.0);
        evaluate_ratios(&mut tree);

        let rects = resolve_node_rects(&tree, Rect::new(0.0, 0.0, 250.0, 100.0));
        assert_eq!(rects[a.index()].w, 100.0);
        assert_eq!(rects[b.index()].w, 150.0);
        assert_eq!(rects[b.index()].x, 100.0);
    }
}
