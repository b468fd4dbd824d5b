//! Search tree with arena allocation.
//!
//! Nodes live in a contiguous Vec and are referenced by [`NodeId`]. A node
//! carries statistics only; the position it stands for is rebuilt by replaying
//! columns from the root.

use crate::connect4::{Column, Player, WIDTH};

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// The ID of the parent node, or None for the root.
    pub parent: Option<NodeId>,
    /// The column that got the game to this node.
    pub column: Option<Column>,
    /// The player to move at this node.
    pub to_move: Player,
    /// Sum of outcome values routed through this node (+1 Yellow win, -1 Red
    /// win, 0 draw).
    pub wi: i64,
    /// Number of simulations that passed through this node.
    pub ni: u32,
    /// Child per column, if created.
    pub children: [Option<NodeId>; WIDTH],
    /// Legal columns that have no child yet.
    untried: u8,
}

impl Node {
    fn new(parent: Option<NodeId>, column: Option<Column>, to_move: Player, untried: u8) -> Self {
        Node {
            parent,
            column,
            to_move,
            wi: 0,
            ni: 0,
            children: [None; WIDTH],
            untried,
        }
    }

    /// Returns whether every legal column already has a child.
    pub fn is_fully_expanded(&self) -> bool {
        self.untried == 0
    }

    pub fn has_children(&self) -> bool {
        self.children.iter().any(Option::is_some)
    }

    /// Bit mask of legal columns without a child.
    pub fn untried(&self) -> u8 {
        self.untried
    }

    /// Bit mask of columns with a child.
    pub fn child_mask(&self) -> u8 {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, child)| child.is_some())
            .fold(0, |mask, (col, _)| mask | (1 << col))
    }

    /// Iterates `(column, child)` pairs in column order.
    pub fn children(&self) -> impl Iterator<Item = (Column, NodeId)> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(col, child)| child.map(|id| (col as Column, id)))
    }

    /// Mean outcome `wi / ni`, or 0 when never visited.
    pub fn ratio(&self) -> f64 {
        if self.ni == 0 {
            0.0
        } else {
            self.wi as f64 / self.ni as f64
        }
    }

    /// Records one simulation with the given outcome.
    pub fn update(&mut self, value: i32) {
        self.ni += 1;
        self.wi += i64::from(value);
    }
}

/// Search tree with arena-based node storage.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Creates a tree holding only a root for a position where `to_move` plays
    /// and `legal` is the mask of open columns.
    pub fn new(to_move: Player, legal: u8) -> Self {
        Tree {
            nodes: vec![Node::new(None, None, to_move, legal)],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Creates the child reached by dropping into `column` from `parent`.
    /// `untried` is the child's own legal mask, zero for terminal positions.
    pub fn add_child(&mut self, parent: NodeId, column: Column, to_move: Player, untried: u8) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes
            .push(Node::new(Some(parent), Some(column), to_move, untried));

        let parent = self.get_mut(parent);
        parent.untried &= !(1 << column);
        parent.children[column as usize] = Some(id);
        id
    }

    /// Iterates from `leaf` up to and including the root.
    pub fn path_to_root(&self, leaf: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(leaf), move |&id| self.get(id).parent)
    }

    /// Adds `value` to every node from `leaf` up to the root.
    pub fn backpropagate(&mut self, leaf: NodeId, value: i32) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.update(value);
            current = node.parent;
        }
    }

    /// Total visits over the root's children.
    pub fn root_child_visits(&self) -> u32 {
        self.get(self.root())
            .children()
            .map(|(_, id)| self.get(id).ni)
            .sum()
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root());
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.ni,
            max_depth: self.compute_max_depth(self.root(), 0),
        }
    }

    fn compute_max_depth(&self, id: NodeId, depth: u32) -> u32 {
        self.get(id)
            .children()
            .map(|(_, child)| self.compute_max_depth(child, depth + 1))
            .max()
            .unwrap_or(depth)
    }
}

/// Statistics about a search tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree() {
        let tree = Tree::new(Player::Yellow, 0x7F);
        let root = tree.get(tree.root());

        assert_eq!(tree.len(), 1);
        assert!(root.parent.is_none());
        assert_eq!(root.to_move, Player::Yellow);
        assert!(!root.is_fully_expanded());
        assert!(!root.has_children());
    }

    #[test]
    fn test_add_child_marks_column_tried() {
        let mut tree = Tree::new(Player::Red, 0b101);
        let child = tree.add_child(tree.root(), 2, Player::Yellow, 0x7F);

        let root = tree.get(tree.root());
        assert_eq!(root.untried(), 0b001);
        assert_eq!(root.child_mask(), 0b100);
        assert_eq!(root.children().collect::<Vec<_>>(), vec![(2, child)]);
        assert_eq!(tree.get(child).parent, Some(tree.root()));
        assert_eq!(tree.get(child).column, Some(2));

        tree.add_child(tree.root(), 0, Player::Yellow, 0x7F);
        assert!(tree.get(tree.root()).is_fully_expanded());
    }

    #[test]
    fn test_backpropagate_keeps_sign() {
        let mut tree = Tree::new(Player::Yellow, 0x7F);
        let child = tree.add_child(tree.root(), 3, Player::Red, 0x7F);
        let grandchild = tree.add_child(child, 3, Player::Yellow, 0x7F);

        tree.backpropagate(grandchild, 1);
        tree.backpropagate(child, -1);

        assert_eq!((tree.get(grandchild).wi, tree.get(grandchild).ni), (1, 1));
        assert_eq!((tree.get(child).wi, tree.get(child).ni), (0, 2));
        assert_eq!((tree.get(tree.root()).wi, tree.get(tree.root()).ni), (0, 2));
        assert_eq!(tree.root_child_visits(), 2);
        assert_eq!(
            tree.path_to_root(grandchild).collect::<Vec<_>>(),
            vec![grandchild, child, tree.root()]
        );
    }

    #[test]
    fn test_ratio() {
        let mut tree = Tree::new(Player::Yellow, 0x7F);
        let root = tree.root();
        assert_eq!(tree.get(root).ratio(), 0.0);

        tree.get_mut(root).update(1);
        tree.get_mut(root).update(1);
        tree.get_mut(root).update(-1);
        tree.get_mut(root).update(0);
        assert!((tree.get(root).ratio() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_tree_stats() {
        let mut tree = Tree::new(Player::Yellow, 0x7F);
        let child = tree.add_child(tree.root(), 0, Player::Red, 0x7F);
        tree.add_child(child, 1, Player::Yellow, 0x7F);
        tree.add_child(tree.root(), 1, Player::Red, 0x7F);

        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 4);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.root_visits, 0);
    }
}
