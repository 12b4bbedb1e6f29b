/// Identifier for a node in a [`crate::tree::Tree`].
///
/// This is a generational arena index: once the node it names has been
/// removed, the handle resolves to `None` and never aliases a newer node.
pub type NodeId = generational_arena::Index;

/// Classification of a node, independent of whether it has children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Role {
    Stem,
    #[default]
    Leaf,
    /// Sticky terminal marker; growth passes never re-type or grow a flower.
    Flower,
}

/// Presentation handle for a node sprite.
///
/// The core never loads textures; a renderer maps each handle to whatever
/// it draws (an image, a coloured disc, a glyph).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AssetId {
    Pot,
    #[default]
    Stem,
    Leaf,
    Flower,
}
