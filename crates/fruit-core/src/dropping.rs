//! Drop controller: turns a pointer press into a placed, then released, fruit.
//!
//! A gesture moves the armed fruit through `Armed -> Dropping -> Settling`:
//! the press repositions the static fruit and empties the pointer slot at
//! once, the drop delay later makes it dynamic, and the independent re-arm
//! delay arms the next pointer.

use tracing::{debug, info};

use crate::error::FruitError;
use crate::physics::{BodyId, PhysicsBackend};
use crate::registry::FruitId;
use crate::scheduler::TimerTask;
use crate::session::Session;

/// Result of a pointer press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropOutcome {
    /// Nothing was armed; the press had no effect.
    Ignored,
    /// The armed fruit was placed at `target` and will be released later.
    Dropped {
        body: BodyId,
        fruit: FruitId,
        target: [f32; 2],
    },
}

/// Drop origin for a fruit of `radius` pressed at `x`.
///
/// `x` is clamped so the fruit lies fully inside `[0, arena_width]`; the
/// vertical origin is always three radii down from the top.
pub fn drop_target(x: f32, radius: f32, arena_width: f32) -> [f32; 2] {
    let target_x = x.min(arena_width - radius).max(radius);
    [target_x, radius * 3.0]
}

impl<B: PhysicsBackend> Session<B> {
    /// Handles a pointer press at arena-local `(x, y)`.
    ///
    /// Only `x` matters. Without an armed pointer the press is ignored.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Result<DropOutcome, FruitError> {
        let Some(body) = self.pointer.armed() else {
            debug!("[drop] Ignoring press at ({x}, {y}): no armed pointer");
            return Ok(DropOutcome::Ignored);
        };
        let fruit = self.registry.get(body).ok_or(FruitError::UnknownBody(body))?;
        let fruit_id = fruit.id;
        let target = drop_target(x, fruit.radius(), self.arena.width());

        self.world.set_position(body, target[0], target[1])?;
        self.disarm_pointer();

        let timing = &self.config.timing;
        self.scheduler.schedule(
            self.clock + timing.drop_delay(),
            TimerTask::ReleaseFruit {
                body,
                fruit: fruit_id,
            },
        );
        self.scheduler
            .schedule(self.clock + timing.rearm_delay(), TimerTask::ArmPointer);

        info!(
            "[drop] Fruit {fruit_id} dropped at ({:.1}, {:.1}) from press x={x}",
            target[0], target[1]
        );
        Ok(DropOutcome::Dropped {
            body,
            fruit: fruit_id,
            target,
        })
    }

    /// Hands a dropped fruit over to gravity once the drop delay elapses.
    ///
    /// A fruit that merged away in the meantime is left alone.
    pub(crate) fn release_fruit(&mut self, body: BodyId, fruit: FruitId) -> Result<(), FruitError> {
        match self.registry.get(body) {
            Some(instance) if instance.id == fruit => {}
            _ => {
                debug!("[drop] Fruit {fruit} is gone before release");
                return Ok(());
            }
        }
        self.world.set_static(body, false)?;
        debug!("[drop] Fruit {fruit} released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use proptest::prelude::*;

    use super::*;
    use crate::config::GameConfig;
    use crate::physics::ScriptedWorld;

    fn session() -> Session<ScriptedWorld> {
        Session::start(GameConfig::default(), ScriptedWorld::new(), 4242).unwrap()
    }

    #[test]
    fn test_drop_target_clamps_to_arena() {
        assert_eq!(drop_target(290.0, 13.0, 300.0), [287.0, 39.0]);
        assert_eq!(drop_target(-50.0, 13.0, 300.0), [13.0, 39.0]);
        assert_eq!(drop_target(150.0, 18.0, 300.0), [150.0, 54.0]);
    }

    #[test]
    fn test_press_without_pointer_is_ignored() {
        let mut session = session();
        session.disarm_pointer();
        let bodies = session.world().body_count();

        assert_eq!(session.pointer_down(100.0, 0.0).unwrap(), DropOutcome::Ignored);
        assert_eq!(session.world().body_count(), bodies);
        assert!(session.scheduler().is_empty());
    }

    #[test]
    fn test_double_press_drops_once() {
        let mut session = session();

        let first = session.pointer_down(100.0, 0.0).unwrap();
        assert!(matches!(first, DropOutcome::Dropped { .. }));
        assert_eq!(session.pointer_down(200.0, 0.0).unwrap(), DropOutcome::Ignored);
        assert_eq!(session.scheduler().len(), 2);
    }

    #[test]
    fn test_release_after_drop_delay() {
        let mut session = session();
        let DropOutcome::Dropped { body, target, .. } = session.pointer_down(60.0, 0.0).unwrap() else {
            panic!("expected a drop");
        };

        assert_eq!(session.world().position(body), Some(target));
        assert_eq!(session.world().is_static(body), Some(true));

        session.advance(Duration::from_millis(99));
        assert_eq!(session.world().is_static(body), Some(true));

        session.advance(Duration::from_millis(1));
        assert_eq!(session.world().is_static(body), Some(false));
    }

    #[test]
    fn test_release_of_merged_fruit_is_noop() {
        let mut session = session();
        let DropOutcome::Dropped { body, fruit, .. } = session.pointer_down(60.0, 0.0).unwrap() else {
            panic!("expected a drop");
        };
        session.registry.despawn(&mut session.world, body);

        assert!(session.release_fruit(body, fruit).is_ok());
    }

    proptest! {
        #[test]
        fn prop_drop_target_stays_inside(x in proptest::num::f32::ANY, radius in 1.0f32..150.0) {
            let [target_x, target_y] = drop_target(x, radius, 300.0);
            prop_assert!(target_x >= radius);
            prop_assert!(target_x <= 300.0 - radius);
            prop_assert_eq!(target_y, radius * 3.0);
        }
    }
}
