//! Projection of node roles onto presentation handles.

use crate::{
    tree::Tree,
    types::{AssetId, Role},
};
use glam::Vec2;

/// Static role → asset lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteTable {
    pub stem: AssetId,
    pub leaf: AssetId,
    pub flower: AssetId,
}

impl Default for SpriteTable {
    fn default() -> Self {
        Self {
            stem: AssetId::Stem,
            leaf: AssetId::Leaf,
            flower: AssetId::Flower,
        }
    }
}

impl SpriteTable {
    pub fn lookup(&self, role: Role) -> AssetId {
        match role {
            Role::Stem => self.stem,
            Role::Leaf => self.leaf,
            Role::Flower => self.flower,
        }
    }
}

/// Re-derives every node's sprite from its role.
///
/// Run after anything that changes roles or structure (a growth pass,
/// a deletion).
pub fn correct_sprites(tree: &mut Tree, table: &SpriteTable) {
    tree.for_each_node(|_, node| node.sprite = table.lookup(node.role));
}

/// Draw-command sink implemented by the presentation layer.
pub trait Renderer {
    fn draw(&mut self, pos: Vec2, asset: AssetId);
}

/// Streams `(position, sprite)` pairs to `renderer` in pre-order.
pub fn render<R: Renderer + ?Sized>(tree: &Tree, renderer: &mut R) {
    for (_, node) in tree.iter() {
        renderer.draw(node.pos(), node.sprite);
    }
}

/// A [`Renderer`] that records every draw call.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    pub commands: Vec<(Vec2, AssetId)>,
}

impl Renderer for DrawList {
    fn draw(&mut self, pos: Vec2, asset: AssetId) {
        self.commands.push((pos, asset));
    }
}
