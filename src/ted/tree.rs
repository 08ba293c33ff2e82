//! Generic ordered-tree abstraction the rest of `ted` is built against.
//!
//! The algorithm never touches `indextree` directly outside of
//! [`ArenaNode`] below: every other module talks only to
//! [`TreeNode`], so the indexer, strategy computer and single-path
//! functions all work over any ordered labeled tree a caller cares to
//! provide.

use crate::parsing::{LabelId, ParsedTree};
use indextree::NodeId;

/// A node of an ordered, labeled tree.
///
/// Children are iterated left to right; this order is load-bearing
/// for every array the indexer builds; a [`TreeNode`] impl that
/// reorders children between two calls produces a meaningless index.
pub trait TreeNode: Sized + Clone {
    /// Node label type. Only required to support equality so cost
    /// models can recognize "no-op" renames.
    type Label: Clone + PartialEq;

    fn label(&self) -> &Self::Label;

    /// Children left to right. Returned as an owned `Vec` rather than
    /// an associated iterator type to keep the trait object-free and
    /// free of lifetime gymnastics; indexing only walks each tree
    /// once so the allocation cost is immaterial.
    fn children(&self) -> Vec<Self>;

    fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }
}

/// A [`TreeNode`] backed by an `indextree::Arena`, the concrete tree
/// representation produced by [`crate::parsing::parse_tree`].
#[derive(Clone, Copy)]
pub struct ArenaNode<'a> {
    pub(crate) arena: &'a ParsedTree,
    pub(crate) id: NodeId,
}

impl<'a> ArenaNode<'a> {
    pub fn new(arena: &'a ParsedTree, id: NodeId) -> Self {
        Self { arena, id }
    }

    /// Root node of `arena`. Panics if the arena holds no nodes;
    /// callers are expected to have rejected empty trees already (see
    /// [`crate::parsing::parse_tree`], which refuses rootless input).
    pub fn root(arena: &'a ParsedTree) -> Self {
        let node = arena
            .iter()
            .next()
            .expect("ArenaNode::root called on an empty arena");
        let id = arena
            .get_node_id(node)
            .expect("root node must have an id in its own arena");
        Self { arena, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl<'a> TreeNode for ArenaNode<'a> {
    type Label = LabelId;

    fn label(&self) -> &Self::Label {
        self.arena.get(self.id).expect("node must exist").get()
    }

    fn children(&self) -> Vec<Self> {
        self.id
            .children(self.arena)
            .map(|cid| ArenaNode::new(self.arena, cid))
            .collect()
    }
}
