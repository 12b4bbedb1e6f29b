//! Stochastic growth of a plant [`Tree`].
//!
//! One call to [`run_growth_pass`] is one "season":
//! 1. Stop if the plant has reached its leaf or node cap.
//! 2. Mark every non-flower node as a stem.
//! 3. Pick branch parameters from the deepest path, so the plant grows a
//!    single trunk first and branches freely afterwards.
//! 4. Sprout new segments from every non-flower leaf with [`generate_branch`].
//! 5. Once the plant is deep enough, occasionally add a flower to a leaf.
//! 6. Mark every non-flower leaf as a leaf again.

use crate::{
    config::{MAX_SPREAD, Recursion, Species},
    error::TreeError,
    tree::Tree,
    types::{NodeId, Role},
};
use rand::Rng;
use tracing::{debug, info, instrument};

/// Raw sprout chance reserved to mean "never sprout a second shoot".
pub const NEVER_SPROUT: u32 = 99;

/// Whether [`generate_branch`] adds a second, wider shoot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sprout {
    Always,
    OneIn(u32),
    Never,
}

impl Sprout {
    /// Decodes a raw chance: `0` is [`Sprout::Always`], [`NEVER_SPROUT`] is
    /// [`Sprout::Never`], anything else is a 1-in-n chance.
    pub fn from_chance(chance: u32) -> Self {
        match chance {
            0 => Sprout::Always,
            NEVER_SPROUT => Sprout::Never,
            n => Sprout::OneIn(n),
        }
    }

    fn roll<R: Rng + ?Sized>(self, rng: &mut R) -> bool {
        match self {
            Sprout::Always => true,
            Sprout::Never => false,
            Sprout::OneIn(n) => rng.random_range(0..n) == 0,
        }
    }
}

/// Parameters of a single [`generate_branch`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchParams {
    /// Heading spread in degrees; the main shoot deviates by at most half.
    pub spread: u32,
    pub sprout: Sprout,
    pub segment_length: u32,
    pub recursion: Recursion,
}

impl BranchParams {
    /// Derives branch parameters for a plant whose deepest path is `deepest`.
    ///
    /// - Below `trunk_height`: narrow spread, never sprout (single stem).
    /// - At `trunk_height`: canopy spread, always sprout (the trunk forks).
    /// - Above: canopy spread and the species' sprout chance.
    pub fn for_depth(species: &Species, deepest: usize) -> Self {
        let (spread, sprout) = if deepest < species.trunk_height {
            (species.trunk_spread, Sprout::Never)
        } else if deepest == species.trunk_height {
            (species.canopy_spread, Sprout::Always)
        } else {
            (
                species.canopy_spread,
                Sprout::from_chance(species.sprout_chance),
            )
        };

        Self {
            spread,
            sprout,
            segment_length: species.segment_length,
            recursion: species.recursion,
        }
    }
}

/// Spread clamped to a full turn, so offsets stay within `(-720, 720)`.
fn clamped_spread(spread: u32) -> i32 {
    spread.clamp(1, MAX_SPREAD) as i32
}

/// Random heading offset in `[-spread/2, spread/2)`.
fn narrow_offset<R: Rng + ?Sized>(spread: u32, rng: &mut R) -> i32 {
    let spread = clamped_spread(spread);
    rng.random_range(0..spread) - spread / 2
}

/// Random heading offset in `[-spread, spread)`.
fn wide_offset<R: Rng + ?Sized>(spread: u32, rng: &mut R) -> i32 {
    let spread = clamped_spread(spread);
    rng.random_range(0..spread * 2) - spread
}

/// Recursively grows new segments from `node`.
///
/// Each level always adds one shoot close to the parent's heading and,
/// if the sprout test passes, a second shoot with twice the spread. It then
/// recurses with `depth_budget - 1` into the targets chosen by
/// `params.recursion`. A negative budget creates nothing.
///
/// ### Parameters
/// - `tree` - Tree to grow; new nodes are appended below `node`.
/// - `node` - Node to grow from.
/// - `depth_budget` - Remaining recursion levels; `0` grows one level.
/// - `params` - Spread, sprout test, segment length and recursion target.
/// - `rng` - Random source for headings and sprout tests.
///
/// ### Returns
/// Ids of every created node, in creation order.
pub fn generate_branch<R: Rng + ?Sized>(
    tree: &mut Tree,
    node: NodeId,
    depth_budget: i32,
    params: &BranchParams,
    rng: &mut R,
) -> Result<Vec<NodeId>, TreeError> {
    let mut created = Vec::new();
    grow_from(tree, node, depth_budget, params, rng, &mut created)?;
    Ok(created)
}

fn grow_from<R: Rng + ?Sized>(
    tree: &mut Tree,
    node: NodeId,
    depth_budget: i32,
    params: &BranchParams,
    rng: &mut R,
    created: &mut Vec<NodeId>,
) -> Result<(), TreeError> {
    if depth_budget < 0 {
        return Ok(());
    }
    let direction = tree
        .get(node)
        .ok_or(TreeError::UnknownNode(node))?
        .direction();

    let mut shoots = Vec::with_capacity(2);
    shoots.push(tree.create_child(
        node,
        direction + narrow_offset(params.spread, rng),
        params.segment_length,
    )?);
    if params.sprout.roll(rng) {
        shoots.push(tree.create_child(
            node,
            direction + wide_offset(params.spread, rng),
            params.segment_length,
        )?);
    }
    created.extend_from_slice(&shoots);

    let targets = match params.recursion {
        Recursion::NewShoots => shoots,
        Recursion::AllChildren => tree
            .get(node)
            .map(|n| n.children().to_vec())
            .unwrap_or_default(),
    };
    for target in targets {
        grow_from(tree, target, depth_budget - 1, params, rng, created)?;
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrowthOutcome {
    Grown,
    /// The leaf or node cap was already reached; the tree is unchanged.
    AtCapacity,
}

/// Summary of one [`run_growth_pass`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrowthReport {
    pub outcome: GrowthOutcome,
    /// Nodes created by the pass (shoots and flowers), in creation order.
    pub new_nodes: Vec<NodeId>,
    pub flowers_added: usize,
    /// Deepest path before growing.
    pub deepest_path: usize,
    /// Leaf count after the pass.
    pub leaves: usize,
    /// Node count after the pass.
    pub nodes: usize,
}

fn at_capacity(species: &Species, leaves: usize, nodes: usize) -> bool {
    species.leaf_cap.is_some_and(|cap| leaves >= cap)
        || species.node_cap.is_some_and(|cap| nodes >= cap)
}

/// Advances the plant by one growth pass.
///
/// See the module docs for the individual steps. Calling this again once a
/// cap has been reached is a no-op reported as [`GrowthOutcome::AtCapacity`].
///
/// ### Parameters
/// - `tree` - The plant to grow.
/// - `species` - Trunk shape, spreads, probabilities and size caps.
/// - `rng` - Random source; pass a seeded generator for reproducible plants.
#[instrument(level = "debug", skip_all)]
pub fn run_growth_pass<R: Rng + ?Sized>(
    tree: &mut Tree,
    species: &Species,
    rng: &mut R,
) -> Result<GrowthReport, TreeError> {
    let leaves = tree.leaves();
    let nodes = tree.count_nodes();
    if at_capacity(species, leaves.len(), nodes) {
        debug!(leaves = leaves.len(), nodes, "plant at maximum size");
        return Ok(GrowthReport {
            outcome: GrowthOutcome::AtCapacity,
            new_nodes: Vec::new(),
            flowers_added: 0,
            deepest_path: tree.deepest_path(),
            leaves: leaves.len(),
            nodes,
        });
    }

    tree.for_each_node(|_, node| {
        if node.role != Role::Flower {
            node.role = Role::Stem;
        }
    });

    let deepest = tree.deepest_path();
    let params = BranchParams::for_depth(species, deepest);
    debug!(deepest, ?params, "growing");

    let mut new_nodes = Vec::new();
    for &leaf in &leaves {
        if is_flower(tree, leaf) {
            continue;
        }
        new_nodes.extend(generate_branch(tree, leaf, 0, &params, rng)?);
    }

    let mut flowers_added = 0;
    if deepest >= species.bloom_depth {
        for &leaf in &leaves {
            if is_flower(tree, leaf) || rng.random_range(0..species.flower_chance.max(1)) != 0 {
                continue;
            }
            let (direction, length) = match tree.get(leaf) {
                Some(n) => (n.direction(), n.length()),
                None => return Err(TreeError::UnknownNode(leaf)),
            };
            let flower =
                tree.create_child(leaf, direction + wide_offset(params.spread, rng), length)?;
            if let Some(n) = tree.get_mut(flower) {
                n.role = Role::Flower;
            }
            new_nodes.push(flower);
            flowers_added += 1;
        }
    }

    let leaves = tree.leaves();
    for &leaf in &leaves {
        if let Some(n) = tree.get_mut(leaf)
            && n.role != Role::Flower
        {
            n.role = Role::Leaf;
        }
    }

    let nodes = tree.count_nodes();
    info!(leaves = leaves.len(), nodes, flowers_added, "growth pass done");

    Ok(GrowthReport {
        outcome: GrowthOutcome::Grown,
        new_nodes,
        flowers_added,
        deepest_path: deepest,
        leaves: leaves.len(),
        nodes,
    })
}

fn is_flower(tree: &Tree, id: NodeId) -> bool {
    tree.get(id).is_some_and(|n| n.role == Role::Flower)
}
