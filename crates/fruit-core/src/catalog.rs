//! Fruit catalog: the ordered, immutable list of fruit kinds.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::FruitError;

/// A catalog entry. Higher tiers are larger and later in the merge chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FruitKind {
    pub tier: usize,
    pub name: String,
    pub radius: f32,
    /// Opaque sprite handle passed through to the renderer.
    pub sprite: String,
}

impl FruitKind {
    pub fn new(tier: usize, name: impl Into<String>, radius: f32, sprite: impl Into<String>) -> Self {
        Self {
            tier,
            name: name.into(),
            radius,
            sprite: sprite.into(),
        }
    }
}

/// Ordered fruit kinds indexed by tier.
///
/// Tiers always form the dense sequence `0..len`.
#[derive(Debug, Clone, PartialEq)]
pub struct FruitCatalog {
    kinds: Vec<FruitKind>,
}

impl FruitCatalog {
    /// Builds a catalog, rejecting empty lists, non-dense tiers and
    /// non-positive radii.
    pub fn new(kinds: Vec<FruitKind>) -> Result<Self, FruitError> {
        if kinds.is_empty() {
            return Err(FruitError::InvalidConfig("fruit catalog is empty".to_string()));
        }
        for (index, kind) in kinds.iter().enumerate() {
            if kind.tier != index {
                return Err(FruitError::InvalidConfig(format!(
                    "fruit '{}' has tier {} at position {index}",
                    kind.name, kind.tier
                )));
            }
            if !(kind.radius > 0.0) {
                return Err(FruitError::InvalidConfig(format!(
                    "fruit '{}' has non-positive radius {}",
                    kind.name, kind.radius
                )));
            }
        }
        Ok(Self { kinds })
    }

    /// The classic eleven-step chain from cherries to watermelon.
    pub fn classic() -> Self {
        let kinds = [
            ("cherries", 13.0),
            ("strawberry", 18.0),
            ("grape", 24.0),
            ("dekopon", 30.0),
            ("persimmon", 36.0),
            ("apple", 44.0),
            ("pear", 52.0),
            ("peach", 60.0),
            ("pineapple", 70.0),
            ("melon", 82.0),
            ("watermelon", 96.0),
        ]
        .into_iter()
        .enumerate()
        .map(|(tier, (name, radius))| {
            FruitKind::new(tier, name, radius, format!("assets/{name}.png"))
        })
        .collect();

        Self { kinds }
    }

    /// Looks up the kind at `tier`.
    pub fn kind_at(&self, tier: usize) -> Result<&FruitKind, FruitError> {
        self.kinds.get(tier).ok_or(FruitError::OutOfRange {
            tier,
            len: self.kinds.len(),
        })
    }

    /// Returns the kind a merge of two `kind` fruits produces, or `None`
    /// for the top tier.
    pub fn next_kind(&self, kind: &FruitKind) -> Option<&FruitKind> {
        self.kinds.get(kind.tier + 1)
    }

    pub fn max_tier(&self) -> usize {
        self.kinds.len() - 1
    }

    pub fn is_top_tier(&self, kind: &FruitKind) -> bool {
        kind.tier >= self.max_tier()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kinds(&self) -> &[FruitKind] {
        &self.kinds
    }

    /// Number of low tiers offered as new drops: `floor(len * fraction)`,
    /// at least one and at most the whole catalog.
    pub fn spawnable_count(&self, fraction: f32) -> usize {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = (self.kinds.len() as f32 * fraction).floor().max(0.0) as usize;
        count.clamp(1, self.kinds.len())
    }

    /// The restricted low-tier prefix new drops are picked from.
    pub fn spawnable_kinds(&self, fraction: f32) -> &[FruitKind] {
        &self.kinds[..self.spawnable_count(fraction)]
    }

    /// Picks uniformly among the spawnable prefix.
    pub fn random_spawnable_kind<R: Rng + ?Sized>(&self, fraction: f32, rng: &mut R) -> &FruitKind {
        let count = self.spawnable_count(fraction);
        &self.kinds[rng.random_range(0..count)]
    }
}
