//! Error type shared by every fruit-core operation.

use crate::physics::BodyId;

/// Errors raised by the fruit lifecycle.
///
/// Benign no-ops (a drop with nothing armed, a collision with a wall) are
/// not errors and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum FruitError {
    #[error("tier {tier} is out of range for a catalog of {len} kinds")]
    OutOfRange { tier: usize, len: usize },
    #[error("a pointer fruit is already armed")]
    PointerAlreadyArmed,
    #[error("body {0} is not present in the physics world")]
    UnknownBody(BodyId),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
