//! Fruit-Merge Core Library
//!
//! Fruit lifecycle and merge-cascade state machine for a "merge-the-fruit"
//! arcade game. Physics is consumed through the [`PhysicsBackend`] trait;
//! a `Rapier2D` world and an in-memory scripted world are provided.
//!
//! Everything is driven through a single owned [`Session`]:
//! - input gestures arrive via [`Session::pointer_down`] or the [`CommandQueue`]
//! - [`Session::advance`] fires due timers and steps physics in a fixed order
//! - collision batches are merged in delivery order

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod arena;
pub mod catalog;
pub mod command;
pub mod config;
pub mod dropping;
pub mod error;
pub mod merge;
pub mod physics;
pub mod pointer;
pub mod registry;
pub mod scheduler;
pub mod session;

pub use arena::Arena;
pub use catalog::{FruitCatalog, FruitKind};
pub use command::{CommandQueue, SessionCommand};
pub use config::{ArenaConfig, FruitMaterial, GameConfig, GroundConfig, TimingConfig, TopTierPolicy};
pub use dropping::{DropOutcome, drop_target};
pub use error::FruitError;
pub use merge::{MergeDecision, MergeEvent};
pub use physics::{
    BodyId, BodyShape, BodySpec, CollisionPair, PHYSICS_DT, PHYSICS_STEP, PhysicsBackend,
    RapierWorld, RenderHint, ScriptedWorld,
};
pub use pointer::PointerSlot;
pub use registry::{FruitId, FruitInstance, FruitRegistry};
pub use scheduler::{Scheduler, TimerTask};
pub use session::Session;
