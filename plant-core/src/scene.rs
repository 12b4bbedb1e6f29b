//! Session object tying the plant, its species and input events together.

use crate::{
    config::Species,
    error::TreeError,
    growth::{self, GrowthReport},
    sprites::{self, Renderer, SpriteTable},
    tree::Tree,
    types::{AssetId, NodeId},
};
use glam::Vec2;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info};

/// Heading of the root segment (straight up).
pub const ROOT_DIRECTION: i32 = 270;

/// Discrete input delivered by the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Run one growth pass.
    Grow,
    /// Remove everything but the root.
    Clear,
    /// Remove the subtree of the node under the given point, if any.
    SelectAndDelete(Vec2),
}

/// What handling an [`InputEvent`] did to the plant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneOutcome {
    Grown(GrowthReport),
    Cleared { removed: usize },
    Deleted { node: NodeId, removed: usize },
    /// Nothing under the cursor, or only the root.
    NothingSelected,
}

/// A growing plant together with everything needed to advance it.
///
/// ### Fields
/// - `tree` - The plant.
/// - `species` - Growth parameters used by every pass.
/// - `sprites` - Role to asset lookup applied after every change.
/// - `rng` - Random source; defaults to an OS-seeded [`StdRng`].
#[derive(Debug)]
pub struct Scene<R = StdRng> {
    tree: Tree,
    species: Species,
    sprites: SpriteTable,
    rng: R,
}

impl Scene<StdRng> {
    pub fn new(species: Species) -> Self {
        Self::with_rng(species, StdRng::from_os_rng())
    }
}

impl<R: Rng> Scene<R> {
    /// Creates a scene with an injected random source.
    pub fn with_rng(species: Species, rng: R) -> Self {
        let mut scene = Self {
            tree: Tree::new(species.origin, ROOT_DIRECTION),
            species,
            sprites: SpriteTable::default(),
            rng,
        };
        scene.correct_sprites();
        scene
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn species(&self) -> &Species {
        &self.species
    }

    /// Replaces the species; takes effect on the next growth pass.
    pub fn set_species(&mut self, species: Species) {
        self.species = species;
    }

    /// Replaces the plant with a fresh root at the species' origin.
    pub fn reset(&mut self) {
        self.tree = Tree::new(self.species.origin, ROOT_DIRECTION);
        self.correct_sprites();
    }

    pub fn handle(&mut self, event: InputEvent) -> Result<SceneOutcome, TreeError> {
        let outcome = match event {
            InputEvent::Grow => {
                let report = growth::run_growth_pass(&mut self.tree, &self.species, &mut self.rng)?;
                SceneOutcome::Grown(report)
            }
            InputEvent::Clear => {
                let removed = self.tree.clear();
                info!(removed, "cleared plant");
                SceneOutcome::Cleared { removed }
            }
            InputEvent::SelectAndDelete(point) => self.select_and_delete(point)?,
        };
        self.correct_sprites();
        Ok(outcome)
    }

    fn select_and_delete(&mut self, point: Vec2) -> Result<SceneOutcome, TreeError> {
        let hit = self
            .tree
            .hit_test(point, self.species.select_radius)
            .filter(|&id| id != self.tree.root());

        let Some(node) = hit else {
            debug!(?point, "no node selected");
            return Ok(SceneOutcome::NothingSelected);
        };

        let removed = self.tree.remove_subtree(node)?;
        info!(?node, removed, "deleted subtree");
        Ok(SceneOutcome::Deleted { node, removed })
    }

    fn correct_sprites(&mut self) {
        sprites::correct_sprites(&mut self.tree, &self.sprites);
    }

    /// Draws the plant in pre-order, then the pot under the root.
    pub fn render<D: Renderer + ?Sized>(&self, renderer: &mut D) {
        sprites::render(&self.tree, renderer);
        if let Some(root) = self.tree.get(self.tree.root()) {
            renderer.draw(root.pos(), AssetId::Pot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{growth::GrowthOutcome, sprites::DrawList, types::Role};

    fn seeded(species: Species) -> Scene {
        Scene::with_rng(species, StdRng::seed_from_u64(11))
    }

    fn grown(passes: usize) -> Scene {
        let mut scene = seeded(Species::cherry_blossom());
        for _ in 0..passes {
            scene.handle(InputEvent::Grow).unwrap();
        }
        scene
    }

    #[test]
    fn new_scene_has_root_at_origin() {
        let scene = seeded(Species::default());
        let root = scene.tree().get(scene.tree().root()).unwrap();

        assert_eq!(root.pos(), Species::default().origin);
        assert_eq!(root.direction(), ROOT_DIRECTION);
        assert_eq!(root.role, Role::Leaf);
        assert_eq!(root.sprite, AssetId::Leaf);
    }

    #[test]
    fn grow_updates_sprites() {
        let mut scene = seeded(Species::default());

        let outcome = scene.handle(InputEvent::Grow).unwrap();
        let SceneOutcome::Grown(report) = &outcome else {
            panic!("expected a growth report, got {outcome:?}");
        };
        assert_eq!(report.outcome, GrowthOutcome::Grown);

        let tree = scene.tree();
        assert_eq!(tree.get(tree.root()).unwrap().sprite, AssetId::Stem);
        assert_eq!(tree.get(report.new_nodes[0]).unwrap().sprite, AssetId::Leaf);
    }

    #[test]
    fn select_and_delete_removes_exact_subtree() {
        let mut scene = grown(10);
        let tree = scene.tree();

        // Pick an internal, non-root node and click exactly on it.
        let (target, target_node) = tree
            .iter()
            .skip(1)
            .find(|(id, n)| {
                !n.is_leaf() && tree.hit_test(n.pos(), scene.species().select_radius) == Some(*id)
            })
            .unwrap();
        let parent = target_node.parent().unwrap();
        let subtree = tree.count_nodes_of(target);
        let before = tree.count_nodes();
        let siblings = tree.get(parent).unwrap().children().len();
        let point = target_node.pos();

        let outcome = scene.handle(InputEvent::SelectAndDelete(point)).unwrap();

        assert_eq!(
            outcome,
            SceneOutcome::Deleted {
                node: target,
                removed: subtree
            }
        );
        let tree = scene.tree();
        assert_eq!(tree.count_nodes(), before - subtree);
        assert_eq!(tree.get(parent).unwrap().children().len(), siblings - 1);
        assert!(tree.get(target).is_none());
        assert!(tree.iter().all(|(_, n)| !n.children().contains(&target)));
    }

    #[test]
    fn clicking_empty_space_or_root_is_a_noop() {
        let mut scene = seeded(Species::default());
        let origin = scene.species().origin;

        assert_eq!(
            scene
                .handle(InputEvent::SelectAndDelete(Vec2::new(-500.0, -500.0)))
                .unwrap(),
            SceneOutcome::NothingSelected
        );
        // Only the root is under the cursor.
        assert_eq!(
            scene.handle(InputEvent::SelectAndDelete(origin)).unwrap(),
            SceneOutcome::NothingSelected
        );
        assert_eq!(scene.tree().count_nodes(), 1);
    }

    #[test]
    fn clear_keeps_root_and_resets_its_sprite() {
        let mut scene = grown(8);
        let before = scene.tree().count_nodes();

        let outcome = scene.handle(InputEvent::Clear).unwrap();

        assert_eq!(outcome, SceneOutcome::Cleared { removed: before - 1 });
        let tree = scene.tree();
        assert_eq!(tree.count_nodes(), 1);
        // The root keeps the stem role from the last pass; only its sprite is re-derived.
        let root = tree.get(tree.root()).unwrap();
        assert_eq!(root.sprite, SpriteTable::default().lookup(root.role));
    }

    #[test]
    fn render_draws_plant_then_pot() {
        let scene = grown(3);

        let mut list = DrawList::default();
        scene.render(&mut list);

        assert_eq!(list.commands.len(), scene.tree().count_nodes() + 1);
        let root_pos = scene.tree().get(scene.tree().root()).unwrap().pos();
        assert_eq!(list.commands.first().copied(), Some((root_pos, AssetId::Stem)));
        assert_eq!(list.commands.last().copied(), Some((root_pos, AssetId::Pot)));
    }

    #[test]
    fn reset_starts_a_new_plant() {
        let mut scene = grown(5);

        scene.reset();

        assert_eq!(scene.tree().count_nodes(), 1);
        assert_eq!(scene.tree().deepest_path(), 1);
    }
}
