//! Physics backend using `Rapier2D` with deterministic behavior.

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use parking_lot::Mutex;
use rapier2d::prelude::*;

use super::{BodyId, BodyShape, BodySpec, CollisionPair, PHYSICS_DT, PhysicsBackend};
use crate::config::FruitMaterial;
use crate::error::FruitError;

/// Default gravity vector (downward, in pixels/s²).
pub fn default_gravity() -> Vector {
    Vector::new(0.0, 981.0)
}

/// Collects collision events emitted during a single pipeline step.
#[derive(Default)]
struct CollisionCollector {
    events: Mutex<Vec<CollisionEvent>>,
}

impl CollisionCollector {
    fn into_events(self) -> Vec<CollisionEvent> {
        self.events.into_inner()
    }
}

impl EventHandler for CollisionCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.events.lock().push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

/// Physics world containing all `Rapier2D` components.
///
/// Each body carries its [`BodyId`] in `user_data`, so collider handles from
/// collision events map back to identities without a side table.
pub struct RapierWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub gravity: Vector,
    pub frame: u64,
    handles: BTreeMap<BodyId, RigidBodyHandle>,
    next_body: u64,
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RapierWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RapierWorld")
            .field("frame", &self.frame)
            .field("rigid_body_count", &self.rigid_body_set.len())
            .field("collider_count", &self.collider_set.len())
            .field("gravity", &self.gravity)
            .finish_non_exhaustive()
    }
}

impl RapierWorld {
    /// Creates a new physics world with default settings.
    pub fn new() -> Self {
        Self::with_gravity(default_gravity())
    }

    /// Creates a new physics world with custom gravity.
    pub fn with_gravity(gravity: Vector) -> Self {
        let integration_parameters = IntegrationParameters {
            dt: PHYSICS_DT,
            ..Default::default()
        };

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity,
            frame: 0,
            handles: BTreeMap::new(),
            next_body: 0,
        }
    }

    /// Returns the current simulation frame number.
    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    /// Gets an immutable reference to the rigid body behind an identity.
    pub fn rigid_body(&self, body: BodyId) -> Option<&RigidBody> {
        self.handles
            .get(&body)
            .and_then(|handle| self.rigid_body_set.get(*handle))
    }

    fn rigid_body_mut(&mut self, body: BodyId) -> Result<&mut RigidBody, FruitError> {
        let handle = *self.handles.get(&body).ok_or(FruitError::UnknownBody(body))?;
        self.rigid_body_set
            .get_mut(handle)
            .ok_or(FruitError::UnknownBody(body))
    }

    /// Maps a collider back to the identity of its parent body.
    fn collider_to_body(&self, handle: ColliderHandle) -> Option<BodyId> {
        let collider = self.collider_set.get(handle)?;
        let parent = self.rigid_body_set.get(collider.parent()?)?;
        #[allow(clippy::cast_possible_truncation)]
        Some(BodyId(parent.user_data as u64))
    }

    fn build_collider(spec: &BodySpec) -> Collider {
        match spec.shape {
            BodyShape::Circle { radius } => {
                let material = spec.material.unwrap_or_default();
                ColliderBuilder::ball(radius)
                    .density(material.density)
                    .friction(material.friction)
                    .restitution(material.restitution)
                    .active_events(ActiveEvents::COLLISION_EVENTS)
                    .build()
            }
            BodyShape::Rectangle { width, height } => {
                let mut builder = ColliderBuilder::cuboid(width / 2.0, height / 2.0)
                    .active_events(ActiveEvents::COLLISION_EVENTS);
                if let Some(material) = spec.material {
                    builder = builder
                        .friction(material.friction)
                        .restitution(material.restitution);
                }
                builder.build()
            }
        }
    }

    /// Computes a deterministic hash of the current physics state.
    /// Two worlds fed the same operations produce the same hash.
    pub fn compute_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.frame.hash(&mut hasher);

        for (body, handle) in &self.handles {
            let Some(rigid_body) = self.rigid_body_set.get(*handle) else {
                continue;
            };
            body.hash(&mut hasher);

            let pos = rigid_body.translation();
            hash_f32(pos.x, &mut hasher);
            hash_f32(pos.y, &mut hasher);

            let rot = rigid_body.rotation().angle();
            hash_f32(rot, &mut hasher);

            let linvel = rigid_body.linvel();
            hash_f32(linvel.x, &mut hasher);
            hash_f32(linvel.y, &mut hasher);
        }

        hasher.finish()
    }
}

impl PhysicsBackend for RapierWorld {
    fn reset(&mut self) {
        // Identities stay unique across resets.
        let next_body = self.next_body;
        *self = Self::with_gravity(self.gravity);
        self.next_body = next_body;
    }

    fn add_body(&mut self, spec: BodySpec) -> BodyId {
        let id = BodyId(self.next_body);
        self.next_body += 1;

        let builder = if spec.is_static {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
        };
        let mut builder = builder
            .translation(Vector::new(spec.position[0], spec.position[1]))
            .user_data(u128::from(id.0));
        if let (BodyShape::Circle { .. }, Some(material)) = (spec.shape, spec.material) {
            builder = builder.linear_damping(material.air_friction).ccd_enabled(true);
        }

        let body_handle = self.rigid_body_set.insert(builder.build());
        let collider = Self::build_collider(&spec);
        self.collider_set
            .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);

        self.handles.insert(id, body_handle);
        id
    }

    fn remove_body(&mut self, body: BodyId) -> bool {
        let Some(handle) = self.handles.remove(&body) else {
            return false;
        };
        self.rigid_body_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some()
    }

    fn set_position(&mut self, body: BodyId, x: f32, y: f32) -> Result<(), FruitError> {
        let rigid_body = self.rigid_body_mut(body)?;
        rigid_body.set_translation(Vector::new(x, y), true);
        rigid_body.set_linvel(Vector::new(0.0, 0.0), true);
        Ok(())
    }

    fn set_static(&mut self, body: BodyId, is_static: bool) -> Result<(), FruitError> {
        let body_type = if is_static {
            RigidBodyType::Fixed
        } else {
            RigidBodyType::Dynamic
        };
        self.rigid_body_mut(body)?.set_body_type(body_type, true);
        Ok(())
    }

    fn position(&self, body: BodyId) -> Option<[f32; 2]> {
        self.rigid_body(body).map(|rigid_body| {
            let pos = rigid_body.translation();
            [pos.x, pos.y]
        })
    }

    fn is_static(&self, body: BodyId) -> Option<bool> {
        self.rigid_body(body).map(RigidBody::is_fixed)
    }

    fn body_count(&self) -> usize {
        self.handles.len()
    }

    fn body_ids(&self) -> Vec<BodyId> {
        self.handles.keys().copied().collect()
    }

    fn step(&mut self) -> Vec<CollisionPair> {
        let collector = CollisionCollector::default();
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &collector,
        );
        self.frame += 1;

        collector
            .into_events()
            .into_iter()
            .filter_map(|event| match event {
                CollisionEvent::Started(h1, h2, _flags) => Some(CollisionPair::new(
                    self.collider_to_body(h1)?,
                    self.collider_to_body(h2)?,
                )),
                CollisionEvent::Stopped(..) => None,
            })
            .collect()
    }
}

/// Hashes a f32 value by converting to bits.
fn hash_f32(value: f32, hasher: &mut impl Hasher) {
    value.to_bits().hash(hasher);
}
