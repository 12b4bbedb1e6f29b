use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;

/// Widest accepted heading spread, in degrees.
pub const MAX_SPREAD: u32 = 360;

/// Which nodes [`crate::growth::generate_branch`] recurses into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recursion {
    /// Only the shoots created by the current call.
    #[default]
    NewShoots,
    /// Every child of the node, including ones that existed before the
    /// call. Grows far more branches per pass when the budget is above 0.
    AllChildren,
}

/// Growth parameters for one plant species.
///
/// ### Fields
/// - `trunk_height` - Deepest-path length below which the plant grows as a
///   single unbranched stem; the pass that reaches it always branches.
/// - `bloom_depth` - Deepest-path length from which flowers may appear.
/// - `trunk_spread` - Heading spread (degrees) while the trunk is growing.
/// - `canopy_spread` - Heading spread (degrees) once the trunk is established.
/// - `sprout_chance` - Raw 1-in-n chance of a second shoot in the canopy.
///   `0` always sprouts, `99` never does.
/// - `leaf_cap` / `node_cap` - Size limits; a pass is a no-op once either is
///   reached. `None` means unlimited (written as `0` in species files).
/// - `flower_chance` - 1-in-n chance per leaf and pass of a flower.
/// - `segment_length` - Length of every new segment, in drawing units.
/// - `recursion` - Recursion target of branch generation.
/// - `origin` - Position of the root node.
/// - `select_radius` - Hit-test radius in pixels for select-and-delete.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Species {
    pub trunk_height: usize,
    pub bloom_depth: usize,
    pub trunk_spread: u32,
    pub canopy_spread: u32,
    pub sprout_chance: u32,
    #[serde(serialize_with = "write_cap", deserialize_with = "read_cap")]
    pub leaf_cap: Option<usize>,
    #[serde(serialize_with = "write_cap", deserialize_with = "read_cap")]
    pub node_cap: Option<usize>,
    pub flower_chance: u32,
    pub segment_length: u32,
    pub recursion: Recursion,
    pub origin: Vec2,
    pub select_radius: f32,
}

fn read_cap<'de, D: Deserializer<'de>>(d: D) -> Result<Option<usize>, D::Error> {
    Ok(Some(usize::deserialize(d)?).filter(|&cap| cap > 0))
}

fn write_cap<S: Serializer>(cap: &Option<usize>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(cap.unwrap_or(0) as u64)
}

impl Default for Species {
    fn default() -> Self {
        Self {
            trunk_height: 6,
            bloom_depth: 6,
            trunk_spread: 20,
            canopy_spread: 50,
            sprout_chance: 10,
            leaf_cap: Some(50),
            node_cap: Some(250),
            flower_chance: 15,
            segment_length: 10,
            recursion: Recursion::NewShoots,
            origin: Vec2::new(400.0, 500.0),
            select_radius: 8.0,
        }
    }
}

impl Species {
    /// A small, taller-trunked plant that stops early.
    pub fn sapling() -> Self {
        Self {
            trunk_height: 10,
            bloom_depth: 10,
            leaf_cap: Some(60),
            node_cap: Some(300),
            flower_chance: 10,
            ..Self::default()
        }
    }

    /// Wide canopy limited by leaf count only; blooms once ten segments deep.
    pub fn cherry_blossom() -> Self {
        Self {
            trunk_height: 6,
            bloom_depth: 10,
            leaf_cap: Some(800),
            node_cap: None,
            flower_chance: 10,
            ..Self::default()
        }
    }

    /// Looks up a built-in species by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "sapling" => Some(Self::sapling()),
            "cherry_blossom" | "cherry-blossom" => Some(Self::cherry_blossom()),
            _ => None,
        }
    }

    /// Parses and validates a TOML species description.
    ///
    /// Missing keys fall back to [`Species::default`].
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let species: Species = toml::from_str(s)?;
        species.validate()?;
        Ok(species)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Rejects values that would make random sampling impossible or let the
    /// plant grow without bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_SPREAD).contains(&self.trunk_spread) {
            return Err(ConfigError::Invalid {
                field: "trunk_spread",
                reason: "must be between 1 and 360",
            });
        }
        if !(1..=MAX_SPREAD).contains(&self.canopy_spread) {
            return Err(ConfigError::Invalid {
                field: "canopy_spread",
                reason: "must be between 1 and 360",
            });
        }
        if self.leaf_cap.is_none() && self.node_cap.is_none() {
            return Err(ConfigError::Invalid {
                field: "leaf_cap",
                reason: "at least one of leaf_cap and node_cap must be set",
            });
        }
        if self.flower_chance == 0 {
            return Err(ConfigError::Invalid {
                field: "flower_chance",
                reason: "must be at least 1",
            });
        }
        if self.segment_length == 0 {
            return Err(ConfigError::Invalid {
                field: "segment_length",
                reason: "must be at least 1",
            });
        }
        if self.select_radius.is_nan() || self.select_radius < 0.0 {
            return Err(ConfigError::Invalid {
                field: "select_radius",
                reason: "must be a non-negative number",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for name in ["default", "sapling", "cherry_blossom"] {
            let species = Species::preset(name).unwrap();
            assert!(species.validate().is_ok(), "preset {name} should validate");
        }
        assert!(Species::preset("bonsai").is_none());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let species = Species::from_toml_str(
            r#"
            trunk_height = 10
            leaf_cap = 800
            recursion = "all_children"
            "#,
        )
        .unwrap();

        assert_eq!(species.trunk_height, 10);
        assert_eq!(species.leaf_cap, Some(800));
        assert_eq!(species.recursion, Recursion::AllChildren);
        assert_eq!(species.canopy_spread, Species::default().canopy_spread);
        assert_eq!(species.node_cap, Species::default().node_cap);
    }

    #[test]
    fn toml_roundtrip_keeps_values() {
        let species = Species::sapling();
        let text = toml::to_string(&species).unwrap();
        assert_eq!(Species::from_toml_str(&text).unwrap(), species);
    }

    #[test]
    fn zero_cap_means_unlimited() {
        let species = Species::from_toml_str("node_cap = 0\nleaf_cap = 800").unwrap();
        assert_eq!(species.node_cap, None);
        assert_eq!(species.leaf_cap, Some(800));

        let cherry = Species::cherry_blossom();
        let text = toml::to_string(&cherry).unwrap();
        assert_eq!(Species::from_toml_str(&text).unwrap(), cherry);
    }

    #[test]
    fn zero_spread_is_rejected() {
        let err = Species::from_toml_str("canopy_spread = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "canopy_spread",
                ..
            }
        ));
    }

    #[test]
    fn oversized_spread_is_rejected() {
        assert!(Species::from_toml_str("canopy_spread = 360").is_ok());

        let err = Species::from_toml_str("canopy_spread = 361").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "canopy_spread",
                ..
            }
        ));

        let err = Species::from_toml_str("trunk_height = 1\ntrunk_spread = 3000000000").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "trunk_spread",
                ..
            }
        ));
    }

    #[test]
    fn uncapped_species_is_rejected() {
        let err = Species::from_toml_str("leaf_cap = 0\nnode_cap = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "leaf_cap", .. }));

        let uncapped = Species {
            leaf_cap: None,
            node_cap: None,
            ..Species::default()
        };
        assert!(uncapped.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Species::from_toml_str("trunk_height = \"tall\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Species::load("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
