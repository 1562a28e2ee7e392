use serde::Serialize;

/// Stable identifier of an input image. Assigned densely by the image source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ImageId(pub u32);

impl ImageId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index into the arena `Vec<TreeNode>`. Uses u32 to save memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How an internal node divides its rectangle between its two children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Children side by side: widths add, height is shared.
    Vertical,
    /// Children stacked: heights add, width is shared.
    Horizontal,
}

impl Orientation {
    /// Aspect ratio of two children joined by this split.
    pub fn combine(self, left: f64, right: f64) -> f64 {
        match self {
            Orientation::Vertical => left + right,
            Orientation::Horizontal => (left * right) / (left + right),
        }
    }

    /// Target handed to each child so that two equal children combine to `expected`.
    pub fn child_target(self, expected: f64) -> f64 {
        match self {
            Orientation::Vertical => expected / 2.0,
            Orientation::Horizontal => expected * 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    /// Bound to exactly one image.
    Leaf { image: ImageId, ratio: f64 },
    /// Always has exactly two children, both allocated before this node.
    Split {
        orientation: Orientation,
        left: NodeId,
        right: NodeId,
    },
}

/// A single node of the partition tree, stored in a flat arena.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub kind: NodeKind,
    /// Parent node index (None for root). Bookkeeping only, never owning.
    pub parent: Option<NodeId>,
    /// Target ratio propagated down from the parent.
    pub expected_ratio: f64,
    /// Ratio this subtree actually achieves. Written only by `evaluate_ratios`.
    pub achieved_ratio: f64,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }
}

/// Binary partition tree stored as a flat arena of nodes.
///
/// Nodes are appended children-first, so every child has a lower index than
/// its parent and the root is always the last node. Bottom-up passes walk the
/// arena forwards, top-down passes walk it backwards.
#[derive(Debug, Clone, Default)]
pub struct CollageTree {
    pub nodes: Vec<TreeNode>,
}

impl CollageTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arena sized for `leaves` images (a full binary tree has 2n - 1 nodes).
    pub fn with_capacity(leaves: usize) -> Self {
        CollageTree {
            nodes: Vec::with_capacity((2 * leaves).saturating_sub(1)),
        }
    }

    /// Append a leaf. Its achieved ratio is the image's own ratio.
    pub fn add_leaf(&mut self, image: ImageId, ratio: f64, expected_ratio: f64) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(TreeNode {
            kind: NodeKind::Leaf { image, ratio },
            parent: None,
            expected_ratio,
            achieved_ratio: ratio,
        });
        id
    }

    /// Append an internal node over two existing, parentless nodes.
    pub fn add_split(
        &mut self,
        orientation: Orientation,
        left: NodeId,
        right: NodeId,
        expected_ratio: f64,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        debug_assert!(left != right, "split children must differ");
        debug_assert!(self.nodes[left.index()].parent.is_none());
        debug_assert!(self.nodes[right.index()].parent.is_none());

        self.nodes[left.index()].parent = Some(id);
        self.nodes[right.index()].parent = Some(id);
        self.nodes.push(TreeNode {
            kind: NodeKind::Split {
                orientation,
                left,
                right,
            },
            parent: None,
            expected_ratio,
            achieved_ratio: 0.0,
        });
        id
    }

    /// Root of the tree. Panics on an empty arena.
    pub fn root(&self) -> NodeId {
        assert!(!self.nodes.is_empty(), "empty collage tree has no root");
        NodeId(self.nodes.len() as u32 - 1)
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.index()]
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Achieved ratio of the whole tree (valid after evaluation).
    pub fn root_ratio(&self) -> f64 {
        self.get(self.root()).achieved_ratio
    }

    /// Children of a node, or None for a leaf.
    pub fn children(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        match self.get(id).kind {
            NodeKind::Split { left, right, .. } => Some((left, right)),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Image ids of all leaves, left to right.
    pub fn leaf_images(&self) -> Vec<ImageId> {
        let mut images = Vec::new();
        if self.is_empty() {
            return images;
        }
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            match self.get(id).kind {
                NodeKind::Leaf { image, .. } => images.push(image),
                NodeKind::Split { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        images
    }

    /// Number of leaves in the subtree rooted at `id`.
    pub fn leaf_count_under(&self, id: NodeId) -> usize {
        let mut count = 0;
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            match self.children(id) {
                Some((left, right)) => {
                    stack.push(left);
                    stack.push(right);
                }
                None => count += 1,
            }
        }
        count
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        let mut max_depth = 0;
        // Parents sit after their children, so a reverse walk sees parents first.
        for i in (0..self.nodes.len()).rev() {
            if let NodeKind::Split { left, right, .. } = self.nodes[i].kind {
                let child_depth = depths[i] + 1;
                depths[left.index()] = child_depth;
                depths[right.index()] = child_depth;
                max_depth = max_depth.max(child_depth);
            }
        }
        max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_leaf_tree(orientation: Orientation) -> CollageTree {
        let mut tree = CollageTree::with_capacity(2);
        let a = tree.add_leaf(ImageId(7), 0.5, 0.5);
        let b = tree.add_leaf(ImageId(3), 2.0, 0.5);
        tree.add_split(orientation, a, b, 1.0);
        tree
    }

    #[test]
    fn root_is_last_node_and_links_parents() {
        let tree = two_leaf_tree(Orientation::Vertical);
        let root = tree.root();
        assert_eq!(root, NodeId(2));
        assert_eq!(tree.get(NodeId(0)).parent, Some(root));
        assert_eq!(tree.get(NodeId(1)).parent, Some(root));
        assert_eq!(tree.get(root).parent, None);
        assert_eq!(tree.children(root), Some((NodeId(0), NodeId(1))));
    }

    #[test]
    fn leaf_images_are_left_to_right() {
        let tree = two_leaf_tree(Orientation::Horizontal);
        assert_eq!(tree.leaf_images(), vec![ImageId(7), ImageId(3)]);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn orientation_combination_rules() {
        assert!((Orientation::Vertical.combine(0.5, 2.0) - 2.5).abs() < 1e-12);
        assert!((Orientation::Horizontal.combine(0.5, 2.0) - 0.4).abs() < 1e-12);
        assert_eq!(Orientation::Vertical.child_target(1.0), 0.5);
        assert_eq!(Orientation::Horizontal.child_target(1.0), 2.0);
    }
}
