use crate::error::TreeError;
use crate::types::{AssetId, NodeId, Role};
use generational_arena::Arena;
use glam::Vec2;
use tracing::instrument;

/// One directional growth segment.
///
/// Geometry and links are fixed at creation; only `role` and `sprite`
/// are writable from outside the [`Tree`].
#[derive(Clone, Debug)]
pub struct Node {
    pub role: Role,
    pub sprite: AssetId,
    direction: i32,
    length: u32,
    pos: Vec2,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new_root(pos: Vec2, direction: i32) -> Self {
        Self {
            role: Role::Leaf,
            sprite: AssetId::Stem,
            direction: direction.rem_euclid(360),
            length: 0,
            pos,
            parent: None,
            children: Vec::with_capacity(2),
        }
    }

    fn new_child(parent: NodeId, parent_pos: Vec2, sprite: AssetId, direction: i32, length: u32) -> Self {
        let direction = direction.rem_euclid(360);
        Self {
            role: Role::Leaf,
            sprite,
            direction,
            length,
            pos: parent_pos + heading(direction) * length as f32,
            parent: Some(parent),
            children: Vec::with_capacity(2),
        }
    }

    /// Heading in degrees, `[0, 360)`: right = 0, down = 90, left = 180, up = 270.
    pub fn direction(&self) -> i32 {
        self.direction
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    /// Cached drawing position. Never re-derived after creation.
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// `true` when the node has no children, whatever its [`Role`].
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Unit vector for a heading in degrees (screen space, y grows downwards).
pub fn heading(direction: i32) -> Vec2 {
    Vec2::from_angle((direction as f32).to_radians())
}

/// Rooted plant tree stored in a generational arena.
///
/// Nodes are created only through [`Tree::create_child`] and removed only
/// through [`Tree::remove_subtree`] / [`Tree::clear`], which unlink the
/// subtree from its parent in the same call. A stale [`NodeId`] therefore
/// resolves to `None` instead of a dangling node.
#[derive(Debug)]
pub struct Tree {
    nodes: Arena<Node>,
    root: NodeId,
}

impl Tree {
    pub fn new(root_pos: Vec2, root_direction: i32) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.insert(Node::new_root(root_pos, root_direction));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    /// Allocates a child of `parent` and appends it to the parent's children.
    ///
    /// The child's position is cached from the parent's position plus the
    /// unit vector at `direction` scaled by `length`. The child starts with
    /// [`Role::Leaf`] and inherits the parent's sprite until the next
    /// sprite correction.
    ///
    /// ### Returns
    /// - `Ok(id)` of the new node.
    /// - `Err(TreeError::UnknownNode)` if `parent` has been removed.
    #[instrument(level = "trace", skip(self))]
    pub fn create_child(
        &mut self,
        parent: NodeId,
        direction: i32,
        length: u32,
    ) -> Result<NodeId, TreeError> {
        let (parent_pos, sprite) = match self.nodes.get(parent) {
            Some(p) => (p.pos, p.sprite),
            None => return Err(TreeError::UnknownNode(parent)),
        };

        let id = self
            .nodes
            .insert(Node::new_child(parent, parent_pos, sprite, direction, length));
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(id);
        }
        Ok(id)
    }

    /// Removes `id` and every descendant, excising `id` from its parent.
    ///
    /// Descendants are freed depth-first before the node itself. Works on
    /// childless nodes (one node freed).
    ///
    /// ### Returns
    /// - `Ok(n)` with the number of freed nodes.
    /// - `Err(TreeError::RootRemoval)` for the root; use [`Tree::clear`].
    /// - `Err(TreeError::UnknownNode)` if `id` is already gone.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<usize, TreeError> {
        if id == self.root {
            return Err(TreeError::RootRemoval);
        }
        let parent = match self.nodes.get(id) {
            Some(n) => n.parent,
            None => return Err(TreeError::UnknownNode(id)),
        };

        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(p)) {
            p.children.retain(|&c| c != id);
        }
        Ok(self.free(id))
    }

    /// Removes every subtree below the root, keeping the root itself.
    ///
    /// Returns the number of freed nodes.
    #[instrument(level = "trace", skip(self))]
    pub fn clear(&mut self) -> usize {
        let children = match self.nodes.get_mut(self.root) {
            Some(root) => std::mem::take(&mut root.children),
            None => return 0,
        };
        children.into_iter().map(|c| self.free(c)).sum()
    }

    fn free(&mut self, id: NodeId) -> usize {
        let children = match self.nodes.get_mut(id) {
            Some(n) => std::mem::take(&mut n.children),
            None => return 0,
        };
        let freed: usize = children.into_iter().map(|c| self.free(c)).sum();
        self.nodes.remove(id);
        freed + 1
    }

    /// Depth-first pre-order iterator over the whole tree.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder::new(self, self.root)
    }

    /// Depth-first pre-order iterator over the subtree rooted at `start`.
    pub fn iter_from(&self, start: NodeId) -> PreOrder<'_> {
        PreOrder::new(self, start)
    }

    /// Calls `visit` on every node in pre-order.
    ///
    /// The visitor may change a node's role or sprite; the child list is
    /// not reachable through `&mut Node`, so the structure being walked
    /// cannot change under it.
    pub fn for_each_node<F>(&mut self, mut visit: F)
    where
        F: FnMut(NodeId, &mut Node),
    {
        let order: Vec<NodeId> = self.iter().map(|(id, _)| id).collect();
        for id in order {
            if let Some(node) = self.nodes.get_mut(id) {
                visit(id, node);
            }
        }
    }

    /// Graph-leaves (nodes without children) of the whole tree, in pre-order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.leaves_of(self.root)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn leaves_of(&self, start: NodeId) -> Vec<NodeId> {
        self.iter_from(start)
            .filter(|(_, n)| n.is_leaf())
            .map(|(id, _)| id)
            .collect()
    }

    /// Total number of live nodes, root included.
    pub fn count_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes in the subtree rooted at `start`, `start` included.
    pub fn count_nodes_of(&self, start: NodeId) -> usize {
        self.iter_from(start).count()
    }

    /// Node count along the longest root-to-leaf path (a lone root is 1).
    pub fn deepest_path(&self) -> usize {
        self.deepest_path_of(self.root)
    }

    pub fn deepest_path_of(&self, start: NodeId) -> usize {
        if let Some(node) = self.nodes.get(start) {
            1 + node
                .children
                .iter()
                .map(|&child| self.deepest_path_of(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Finds the node under `point`.
    ///
    /// Every node within `radius` of `point` is a candidate; the last one in
    /// pre-order wins, so a tip drawn over its stem is picked first.
    pub fn hit_test(&self, point: Vec2, radius: f32) -> Option<NodeId> {
        let r2 = radius * radius;
        self.iter()
            .filter(|(_, n)| (n.pos - point).length_squared() <= r2)
            .map(|(id, _)| id)
            .last()
    }
}

/// Pre-order walk: node first, then children left to right.
pub struct PreOrder<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> PreOrder<'a> {
    fn new(tree: &'a Tree, start: NodeId) -> Self {
        let mut stack = Vec::with_capacity(16);
        if tree.contains(start) {
            stack.push(start);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if let Some(node) = self.tree.nodes.get(id) {
                // Reverse push keeps the left-most child on top.
                self.stack.extend(node.children.iter().rev());
                return Some((id, node));
            }
        }
        None
    }
}
