//! Physics collaborator boundary.
//!
//! The fruit lifecycle never integrates motion itself. It drives a
//! [`PhysicsBackend`] that owns body geometry and velocity, and reads back
//! one collision-start batch per fixed step.

pub mod rapier;
pub mod scripted;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::FruitMaterial;
use crate::error::FruitError;

pub use rapier::RapierWorld;
pub use scripted::ScriptedWorld;

/// Fixed timestep for physics simulation (60Hz).
pub const PHYSICS_DT: f32 = 1.0 / 60.0;

/// [`PHYSICS_DT`] as a `Duration`, used by the session clock.
pub const PHYSICS_STEP: Duration = Duration::from_nanos(16_666_667);

/// Identity of a body inside a physics backend.
///
/// Backends never reuse an identity within one world instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Two bodies that started touching during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub body_a: BodyId,
    pub body_b: BodyId,
}

impl CollisionPair {
    pub fn new(body_a: BodyId, body_b: BodyId) -> Self {
        Self { body_a, body_b }
    }
}

/// Collision shape of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Circle { radius: f32 },
    Rectangle { width: f32, height: f32 },
}

/// Presentation hint forwarded to whoever draws the world.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderHint {
    Sprite(String),
    Fill(String),
}

/// Everything a backend needs to create a body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    /// Center of the body in arena coordinates (+y points down).
    pub position: [f32; 2],
    pub shape: BodyShape,
    pub is_static: bool,
    pub material: Option<FruitMaterial>,
    pub render: Option<RenderHint>,
}

impl BodySpec {
    /// A dynamic circle centered at `(x, y)`.
    pub fn circle(x: f32, y: f32, radius: f32) -> Self {
        Self {
            position: [x, y],
            shape: BodyShape::Circle { radius },
            is_static: false,
            material: None,
            render: None,
        }
    }

    /// A dynamic rectangle centered at `(x, y)`.
    pub fn rectangle(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: [x, y],
            shape: BodyShape::Rectangle { width, height },
            is_static: false,
            material: None,
            render: None,
        }
    }

    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    #[must_use]
    pub fn with_material(mut self, material: FruitMaterial) -> Self {
        self.material = Some(material);
        self
    }

    #[must_use]
    pub fn with_render(mut self, render: RenderHint) -> Self {
        self.render = Some(render);
        self
    }
}

/// Rigid-body simulation consumed by the session.
///
/// A world is created by the implementor's constructor and lives as long as
/// the session that owns it.
pub trait PhysicsBackend {
    /// Removes every body from the world.
    fn reset(&mut self);

    /// Adds a body and returns its identity.
    fn add_body(&mut self, spec: BodySpec) -> BodyId;

    /// Removes a body. Returns false if it was not present.
    fn remove_body(&mut self, body: BodyId) -> bool;

    /// Teleports a body, clearing its velocity.
    fn set_position(&mut self, body: BodyId, x: f32, y: f32) -> Result<(), FruitError>;

    /// Switches a body between static and dynamic.
    fn set_static(&mut self, body: BodyId, is_static: bool) -> Result<(), FruitError>;

    fn position(&self, body: BodyId) -> Option<[f32; 2]>;

    fn is_static(&self, body: BodyId) -> Option<bool>;

    fn contains(&self, body: BodyId) -> bool {
        self.position(body).is_some()
    }

    fn body_count(&self) -> usize;

    /// All bodies currently in the world, in ascending identity order.
    fn body_ids(&self) -> Vec<BodyId>;

    /// Advances one fixed step and returns the collision-start batch in
    /// delivery order.
    fn step(&mut self) -> Vec<CollisionPair>;
}
