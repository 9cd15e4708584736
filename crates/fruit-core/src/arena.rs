//! Arena bounds and the static boundary bodies that enclose them.

use tracing::debug;

use crate::config::ArenaConfig;
use crate::physics::{BodyId, BodySpec, PhysicsBackend, RenderHint};

/// Owns the arena constants and remembers which boundary bodies are
/// currently installed.
#[derive(Debug, Clone)]
pub struct Arena {
    config: ArenaConfig,
    boundaries: Vec<BodyId>,
}

impl Arena {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            config,
            boundaries: Vec::new(),
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn width(&self) -> f32 {
        self.config.width
    }

    pub fn height(&self) -> f32 {
        self.config.height
    }

    /// Where a freshly armed pointer of the given radius sits.
    pub fn pointer_origin(&self, radius: f32) -> [f32; 2] {
        [self.config.width / 2.0, radius]
    }

    /// Installed boundary bodies (ground first, then walls).
    pub fn boundaries(&self) -> &[BodyId] {
        &self.boundaries
    }

    pub fn is_boundary(&self, body: BodyId) -> bool {
        self.boundaries.contains(&body)
    }

    /// Removes every body from the world, fruits and boundaries alike.
    ///
    /// The fruit registry and pointer slot must be cleared alongside.
    pub fn reset_world<B: PhysicsBackend>(&mut self, world: &mut B) {
        debug!("[arena] Resetting world ({} bodies)", world.body_count());
        world.reset();
        self.boundaries.clear();
    }

    /// Adds the static ground and, if enabled, the two side walls.
    ///
    /// Calling this twice without a reset in between installs duplicates.
    pub fn install_boundaries<B: PhysicsBackend>(&mut self, world: &mut B) {
        let ArenaConfig {
            width,
            height,
            ref ground,
            walls,
            wall_thickness,
            ..
        } = self.config;

        let ground_body = world.add_body(
            BodySpec::rectangle(width / 2.0, height - ground.height / 2.0, width, ground.height)
                .with_static(true)
                .with_render(RenderHint::Fill(ground.color.clone())),
        );
        self.boundaries.push(ground_body);

        if walls {
            for x in [0.0, width] {
                let wall = world.add_body(
                    BodySpec::rectangle(x, height / 2.0, wall_thickness, height)
                        .with_static(true)
                        .with_render(RenderHint::Fill(ground.color.clone())),
                );
                self.boundaries.push(wall);
            }
        }

        debug!("[arena] Installed {} boundary bodies", self.boundaries.len());
    }
}
