//! Pointer controller: the single armed fruit waiting for a drop.

use tracing::{debug, info, warn};

use crate::error::FruitError;
use crate::physics::{BodyId, PhysicsBackend};
use crate::session::Session;

/// Holds at most one armed pointer body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerSlot {
    armed: Option<BodyId>,
}

impl PointerSlot {
    /// Body of the armed pointer fruit.
    pub fn armed(&self) -> Option<BodyId> {
        self.armed
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Fills the slot. Rejects if something is already armed.
    pub(crate) fn arm(&mut self, body: BodyId) -> Result<(), FruitError> {
        if self.armed.is_some() {
            return Err(FruitError::PointerAlreadyArmed);
        }
        self.armed = Some(body);
        Ok(())
    }

    /// Empties the slot, returning what was armed.
    pub(crate) fn take(&mut self) -> Option<BodyId> {
        self.armed.take()
    }

    pub(crate) fn clear(&mut self) {
        self.armed = None;
    }
}

impl<B: PhysicsBackend> Session<B> {
    /// Spawns a new static pointer fruit at the top center of the arena.
    ///
    /// The kind is drawn from the spawnable low-tier prefix of the catalog.
    /// Fails with [`FruitError::PointerAlreadyArmed`] instead of creating a
    /// second pointer.
    pub fn arm_pointer(&mut self) -> Result<BodyId, FruitError> {
        if let Some(armed) = self.pointer.armed() {
            warn!("[pointer] Refusing to arm: body {armed} is still armed");
            return Err(FruitError::PointerAlreadyArmed);
        }

        let kind = self
            .catalog
            .random_spawnable_kind(self.config.spawnable_fraction, &mut self.rng)
            .clone();
        let [x, y] = self.arena.pointer_origin(kind.radius);

        let body = self
            .registry
            .spawn_fruit_at(&mut self.world, &kind, x, y, true, self.config.material)
            .body;
        if let Some(fruit) = self.registry.get_mut(body) {
            fruit.is_pointer = true;
        }
        self.pointer.arm(body)?;

        info!("[pointer] Armed {} (tier {}) as body {body}", kind.name, kind.tier);
        Ok(body)
    }

    /// Empties the pointer slot without touching the registry or the world.
    ///
    /// The fruit stays where it is and becomes a regular fruit.
    pub fn disarm_pointer(&mut self) -> Option<BodyId> {
        let body = self.pointer.take()?;
        if let Some(fruit) = self.registry.get_mut(body) {
            fruit.is_pointer = false;
        }
        debug!("[pointer] Disarmed body {body}");
        Some(body)
    }
}
