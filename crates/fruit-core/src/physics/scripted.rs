//! In-memory physics backend with scripted collisions.
//!
//! Bodies never move on their own. Each [`PhysicsBackend::step`] delivers the
//! next queued collision batch, which lets headless tests and replays feed
//! exact collision orders into the session.

use std::collections::{BTreeMap, VecDeque};

use super::{BodyId, BodySpec, CollisionPair, PhysicsBackend};
use crate::error::FruitError;

/// A body as tracked by [`ScriptedWorld`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedBody {
    pub spec: BodySpec,
    pub position: [f32; 2],
    pub is_static: bool,
}

/// Deterministic stand-in for a rigid-body engine.
#[derive(Debug, Default)]
pub struct ScriptedWorld {
    bodies: BTreeMap<BodyId, ScriptedBody>,
    batches: VecDeque<Vec<CollisionPair>>,
    next_body: u64,
    frame: u64,
}

impl ScriptedWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a collision batch for delivery on a future step.
    pub fn queue_batch(&mut self, pairs: impl IntoIterator<Item = CollisionPair>) {
        self.batches.push_back(pairs.into_iter().collect());
    }

    /// Number of batches still waiting to be delivered.
    pub fn pending_batches(&self) -> usize {
        self.batches.len()
    }

    pub fn body(&self, body: BodyId) -> Option<&ScriptedBody> {
        self.bodies.get(&body)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &ScriptedBody)> {
        self.bodies.iter().map(|(id, body)| (*id, body))
    }

    pub fn current_frame(&self) -> u64 {
        self.frame
    }
}

impl PhysicsBackend for ScriptedWorld {
    fn reset(&mut self) {
        self.bodies.clear();
    }

    fn add_body(&mut self, spec: BodySpec) -> BodyId {
        let id = BodyId(self.next_body);
        self.next_body += 1;
        self.bodies.insert(
            id,
            ScriptedBody {
                position: spec.position,
                is_static: spec.is_static,
                spec,
            },
        );
        id
    }

    fn remove_body(&mut self, body: BodyId) -> bool {
        self.bodies.remove(&body).is_some()
    }

    fn set_position(&mut self, body: BodyId, x: f32, y: f32) -> Result<(), FruitError> {
        let entry = self.bodies.get_mut(&body).ok_or(FruitError::UnknownBody(body))?;
        entry.position = [x, y];
        Ok(())
    }

    fn set_static(&mut self, body: BodyId, is_static: bool) -> Result<(), FruitError> {
        let entry = self.bodies.get_mut(&body).ok_or(FruitError::UnknownBody(body))?;
        entry.is_static = is_static;
        Ok(())
    }

    fn position(&self, body: BodyId) -> Option<[f32; 2]> {
        self.bodies.get(&body).map(|entry| entry.position)
    }

    fn is_static(&self, body: BodyId) -> Option<bool> {
        self.bodies.get(&body).map(|entry| entry.is_static)
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn body_ids(&self) -> Vec<BodyId> {
        self.bodies.keys().copied().collect()
    }

    fn step(&mut self) -> Vec<CollisionPair> {
        self.frame += 1;
        self.batches.pop_front().unwrap_or_default()
    }
}
