//! Fruit registry: which physics bodies are fruits, and of what kind.

use std::collections::BTreeMap;

use crate::catalog::FruitKind;
use crate::config::FruitMaterial;
use crate::physics::{BodyId, BodySpec, PhysicsBackend, RenderHint};

/// Unique identifier for a fruit instance.
pub type FruitId = u32;

/// A live fruit backed by a physics body.
#[derive(Debug, Clone, PartialEq)]
pub struct FruitInstance {
    pub id: FruitId,
    pub kind: FruitKind,
    pub body: BodyId,
    /// True while this fruit is the armed pointer awaiting a drop.
    pub is_pointer: bool,
}

impl FruitInstance {
    pub fn tier(&self) -> usize {
        self.kind.tier
    }

    pub fn radius(&self) -> f32 {
        self.kind.radius
    }
}

/// Maps body identities to fruit instances.
///
/// Every fruit body in the world has exactly one entry. Iteration follows
/// body identity order so replays stay deterministic.
#[derive(Debug, Clone, Default)]
pub struct FruitRegistry {
    fruits: BTreeMap<BodyId, FruitInstance>,
    next_id: FruitId,
}

impl FruitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fruit body at `(x, y)` and registers it.
    pub fn spawn_fruit_at<B: PhysicsBackend>(
        &mut self,
        world: &mut B,
        kind: &FruitKind,
        x: f32,
        y: f32,
        is_static: bool,
        material: FruitMaterial,
    ) -> &FruitInstance {
        let spec = BodySpec::circle(x, y, kind.radius)
            .with_static(is_static)
            .with_material(material)
            .with_render(RenderHint::Sprite(kind.sprite.clone()));
        let body = world.add_body(spec);

        let id = self.next_id;
        self.next_id += 1;

        self.fruits.entry(body).or_insert(FruitInstance {
            id,
            kind: kind.clone(),
            body,
            is_pointer: false,
        })
    }

    /// Unregisters a fruit and removes its body from the world.
    pub fn despawn<B: PhysicsBackend>(&mut self, world: &mut B, body: BodyId) -> Option<FruitInstance> {
        let fruit = self.fruits.remove(&body)?;
        world.remove_body(body);
        Some(fruit)
    }

    /// Registers an instance, returning any entry it replaced.
    pub fn insert(&mut self, fruit: FruitInstance) -> Option<FruitInstance> {
        self.fruits.insert(fruit.body, fruit)
    }

    /// Unregisters a fruit without touching the world.
    pub fn remove(&mut self, body: BodyId) -> Option<FruitInstance> {
        self.fruits.remove(&body)
    }

    pub fn get(&self, body: BodyId) -> Option<&FruitInstance> {
        self.fruits.get(&body)
    }

    pub fn get_mut(&mut self, body: BodyId) -> Option<&mut FruitInstance> {
        self.fruits.get_mut(&body)
    }

    pub fn contains(&self, body: BodyId) -> bool {
        self.fruits.contains_key(&body)
    }

    /// Finds a fruit by its instance id.
    pub fn find(&self, id: FruitId) -> Option<&FruitInstance> {
        self.fruits.values().find(|fruit| fruit.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FruitInstance> {
        self.fruits.values()
    }

    /// Counts fruits per tier, indexed by tier.
    pub fn tier_histogram(&self, tiers: usize) -> Vec<usize> {
        let mut histogram = vec![0; tiers];
        for fruit in self.fruits.values() {
            if let Some(slot) = histogram.get_mut(fruit.tier()) {
                *slot += 1;
            }
        }
        histogram
    }

    pub fn len(&self) -> usize {
        self.fruits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fruits.is_empty()
    }

    /// Forgets every fruit. The caller is responsible for the world.
    pub fn clear(&mut self) {
        self.fruits.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FruitCatalog;
    use crate::physics::ScriptedWorld;

    #[test]
    fn test_spawn_registers_body() {
        let mut world = ScriptedWorld::new();
        let mut registry = FruitRegistry::new();
        let catalog = FruitCatalog::classic();
        let kind = catalog.kind_at(2).unwrap();

        let fruit = registry
            .spawn_fruit_at(&mut world, kind, 40.0, 60.0, true, FruitMaterial::default())
            .clone();

        assert_eq!(fruit.id, 0);
        assert_eq!(fruit.tier(), 2);
        assert!(!fruit.is_pointer);
        assert_eq!(world.position(fruit.body), Some([40.0, 60.0]));
        assert_eq!(world.is_static(fruit.body), Some(true));
        assert_eq!(registry.get(fruit.body), Some(&fruit));
        assert_eq!(registry.find(0), Some(&fruit));
    }

    #[test]
    fn test_despawn_removes_entry_and_body() {
        let mut world = ScriptedWorld::new();
        let mut registry = FruitRegistry::new();
        let catalog = FruitCatalog::classic();
        let kind = catalog.kind_at(0).unwrap();

        let body = registry
            .spawn_fruit_at(&mut world, kind, 0.0, 0.0, false, FruitMaterial::default())
            .body;
        assert_eq!(registry.len(), 1);

        let removed = registry.despawn(&mut world, body).unwrap();
        assert_eq!(removed.body, body);
        assert!(registry.is_empty());
        assert!(!world.contains(body));
        assert!(registry.despawn(&mut world, body).is_none());
    }

    #[test]
    fn test_lookup_of_non_fruit_body_is_none() {
        let mut world = ScriptedWorld::new();
        let registry = FruitRegistry::new();
        let wall = world.add_body(BodySpec::rectangle(0.0, 0.0, 10.0, 100.0).with_static(true));
        assert!(registry.get(wall).is_none());
        assert!(!registry.contains(wall));
    }

    #[test]
    fn test_ids_keep_increasing_after_clear() {
        let mut world = ScriptedWorld::new();
        let mut registry = FruitRegistry::new();
        let catalog = FruitCatalog::classic();
        let kind = catalog.kind_at(0).unwrap();

        registry.spawn_fruit_at(&mut world, kind, 0.0, 0.0, false, FruitMaterial::default());
        registry.clear();
        let second = registry
            .spawn_fruit_at(&mut world, kind, 0.0, 0.0, false, FruitMaterial::default())
            .id;
        assert_eq!(second, 1);
    }

    #[test]
    fn test_tier_histogram() {
        let mut world = ScriptedWorld::new();
        let mut registry = FruitRegistry::new();
        let catalog = FruitCatalog::classic();

        for tier in [0, 0, 3] {
            let kind = catalog.kind_at(tier).unwrap();
            registry.spawn_fruit_at(&mut world, kind, 0.0, 0.0, false, FruitMaterial::default());
        }

        let histogram = registry.tier_histogram(catalog.len());
        assert_eq!(histogram[0], 2);
        assert_eq!(histogram[3], 1);
        assert_eq!(histogram.iter().sum::<usize>(), 3);
    }
}
