//! Merge engine: same-kind collisions fuse into the next tier.
//!
//! Pairs in a batch are handled strictly in delivery order and every
//! registry mutation is visible to the next pair. A fruit consumed by an
//! earlier pair no longer resolves, so the same fruit is never merged twice
//! within one step.

use tracing::{debug, info, warn};

use crate::catalog::FruitCatalog;
use crate::config::TopTierPolicy;
use crate::error::FruitError;
use crate::physics::{CollisionPair, PhysicsBackend};
use crate::registry::{FruitInstance, FruitRegistry};
use crate::scheduler::TimerTask;
use crate::session::Session;

/// What to do with one collision pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    /// At least one body is not a live fruit (a boundary, or already merged).
    Unresolved,
    /// Both sides are the same body.
    SameBody,
    /// Fruits of different kinds touch; nothing happens.
    DifferentKinds,
    /// Replace both fruits with one of `next_tier`.
    Promote { next_tier: usize },
    /// Two top-tier fruits under [`TopTierPolicy::Vanish`].
    Vanish,
    /// Two top-tier fruits under [`TopTierPolicy::Ignore`].
    Ignore,
}

impl MergeDecision {
    /// Decides a pair against the current registry contents.
    pub fn for_pair(
        registry: &FruitRegistry,
        catalog: &FruitCatalog,
        policy: TopTierPolicy,
        pair: CollisionPair,
    ) -> Self {
        if pair.body_a == pair.body_b {
            return Self::SameBody;
        }
        let (Some(a), Some(b)) = (registry.get(pair.body_a), registry.get(pair.body_b)) else {
            return Self::Unresolved;
        };
        if a.tier() != b.tier() {
            return Self::DifferentKinds;
        }
        match catalog.next_kind(&a.kind) {
            Some(next) => Self::Promote {
                next_tier: next.tier,
            },
            None => match policy {
                TopTierPolicy::Vanish => Self::Vanish,
                TopTierPolicy::Ignore => Self::Ignore,
            },
        }
    }
}

/// A completed merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeEvent {
    /// The two fruits that were removed.
    pub consumed: [FruitInstance; 2],
    /// The next-tier fruit, or `None` when top-tier fruits vanished.
    pub produced: Option<FruitInstance>,
    /// Midpoint of the consumed fruits at the time of the merge.
    pub point: [f32; 2],
}

impl<B: PhysicsBackend> Session<B> {
    /// Processes one collision-start batch in delivery order.
    pub fn handle_collisions(&mut self, batch: &[CollisionPair]) -> Vec<MergeEvent> {
        let mut merges = Vec::new();

        for pair in batch {
            let decision = MergeDecision::for_pair(
                &self.registry,
                &self.catalog,
                self.config.top_tier_policy,
                *pair,
            );
            let next_tier = match decision {
                MergeDecision::Unresolved
                | MergeDecision::SameBody
                | MergeDecision::DifferentKinds => continue,
                MergeDecision::Ignore => {
                    debug!(
                        "[merge] Top-tier pair {} / {} left in place",
                        pair.body_a, pair.body_b
                    );
                    continue;
                }
                MergeDecision::Vanish => None,
                MergeDecision::Promote { next_tier } => Some(next_tier),
            };

            match self.merge_pair(*pair, next_tier) {
                Ok(event) => merges.push(event),
                Err(err) => warn!(
                    "[merge] Skipping pair {} / {}: {err}",
                    pair.body_a, pair.body_b
                ),
            }
        }

        merges
    }

    /// Removes both fruits of `pair` and spawns `next_tier` at their midpoint.
    fn merge_pair(
        &mut self,
        pair: CollisionPair,
        next_tier: Option<usize>,
    ) -> Result<MergeEvent, FruitError> {
        let next_kind = next_tier
            .map(|tier| self.catalog.kind_at(tier).cloned())
            .transpose()?;
        let [ax, ay] = self
            .world
            .position(pair.body_a)
            .ok_or(FruitError::UnknownBody(pair.body_a))?;
        let [bx, by] = self
            .world
            .position(pair.body_b)
            .ok_or(FruitError::UnknownBody(pair.body_b))?;
        let point = [(ax + bx) / 2.0, (ay + by) / 2.0];

        let first = self
            .registry
            .despawn(&mut self.world, pair.body_a)
            .ok_or(FruitError::UnknownBody(pair.body_a))?;
        let second = self
            .registry
            .despawn(&mut self.world, pair.body_b)
            .ok_or(FruitError::UnknownBody(pair.body_b))?;

        if first.is_pointer || second.is_pointer {
            // The armed fruit was hit; arm a replacement after the usual delay.
            self.pointer.clear();
            self.scheduler.schedule(
                self.clock + self.config.timing.rearm_delay(),
                TimerTask::ArmPointer,
            );
            info!("[merge] Armed pointer consumed by a merge, re-arm scheduled");
        }

        let produced = next_kind.map(|kind| {
            self.registry
                .spawn_fruit_at(&mut self.world, &kind, point[0], point[1], false, self.config.material)
                .clone()
        });

        match &produced {
            Some(fruit) => info!(
                "[merge] {} + {} -> {} (fruit {}) at ({:.1}, {:.1})",
                first.id, second.id, fruit.kind.name, fruit.id, point[0], point[1]
            ),
            None => info!(
                "[merge] Top-tier fruits {} + {} vanished at ({:.1}, {:.1})",
                first.id, second.id, point[0], point[1]
            ),
        }

        Ok(MergeEvent {
            consumed: [first, second],
            produced,
            point,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FruitMaterial, GameConfig};
    use crate::physics::{BodyId, ScriptedWorld};

    fn session_with(policy: TopTierPolicy) -> Session<ScriptedWorld> {
        let config = GameConfig {
            top_tier_policy: policy,
            ..GameConfig::default()
        };
        Session::start(config, ScriptedWorld::new(), 7).unwrap()
    }

    fn place(session: &mut Session<ScriptedWorld>, tier: usize, x: f32, y: f32) -> BodyId {
        let kind = session.catalog.kind_at(tier).unwrap().clone();
        session
            .registry
            .spawn_fruit_at(&mut session.world, &kind, x, y, false, FruitMaterial::default())
            .body
    }

    #[test]
    fn test_same_kind_pair_promotes_at_midpoint() {
        let mut session = session_with(TopTierPolicy::Vanish);
        let a = place(&mut session, 2, 100.0, 400.0);
        let b = place(&mut session, 2, 140.0, 420.0);
        let bodies_before = session.world().body_count();
        let fruits_before = session.registry().len();

        let merges = session.handle_collisions(&[CollisionPair::new(a, b)]);

        assert_eq!(merges.len(), 1);
        let produced = merges[0].produced.clone().unwrap();
        assert_eq!(produced.tier(), 3);
        assert_eq!(merges[0].point, [120.0, 410.0]);
        assert_eq!(session.world().position(produced.body), Some([120.0, 410.0]));
        assert_eq!(session.world().is_static(produced.body), Some(false));

        assert!(!session.registry().contains(a));
        assert!(!session.registry().contains(b));
        assert!(!session.world().contains(a));
        assert_eq!(session.world().body_count(), bodies_before - 1);
        assert_eq!(session.registry().len(), fruits_before - 1);
    }

    #[test]
    fn test_different_kinds_are_inert() {
        let mut session = session_with(TopTierPolicy::Vanish);
        let a = place(&mut session, 1, 100.0, 400.0);
        let b = place(&mut session, 2, 120.0, 400.0);

        let merges = session.handle_collisions(&[CollisionPair::new(a, b)]);

        assert!(merges.is_empty());
        assert!(session.registry().contains(a));
        assert!(session.registry().contains(b));
    }

    #[test]
    fn test_boundary_collisions_are_skipped() {
        let mut session = session_with(TopTierPolicy::Vanish);
        let ground = session.arena().boundaries()[0];
        let a = place(&mut session, 0, 100.0, 540.0);

        let merges = session.handle_collisions(&[
            CollisionPair::new(ground, a),
            CollisionPair::new(a, ground),
            CollisionPair::new(a, a),
        ]);

        assert!(merges.is_empty());
        assert!(session.registry().contains(a));
    }

    #[test]
    fn test_three_way_collision_merges_once() {
        let mut session = session_with(TopTierPolicy::Vanish);
        let a = place(&mut session, 0, 100.0, 500.0);
        let b = place(&mut session, 0, 126.0, 500.0);
        let c = place(&mut session, 0, 113.0, 480.0);

        let merges = session.handle_collisions(&[
            CollisionPair::new(a, b),
            CollisionPair::new(a, c),
            CollisionPair::new(b, c),
        ]);

        assert_eq!(merges.len(), 1);
        let consumed: Vec<BodyId> = merges[0].consumed.iter().map(|f| f.body).collect();
        assert_eq!(consumed, vec![a, b]);
        assert!(session.registry().contains(c));
        assert_eq!(
            session
                .registry()
                .iter()
                .filter(|f| !f.is_pointer && f.tier() == 1)
                .count(),
            1
        );
    }

    #[test]
    fn test_promoted_fruit_merges_again() {
        let mut session = session_with(TopTierPolicy::Vanish);
        let a = place(&mut session, 0, 100.0, 500.0);
        let b = place(&mut session, 0, 126.0, 500.0);
        let c = place(&mut session, 1, 150.0, 500.0);

        let first = session.handle_collisions(&[CollisionPair::new(a, b)]);
        let promoted = first[0].produced.as_ref().unwrap().body;

        let second = session.handle_collisions(&[CollisionPair::new(promoted, c)]);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].produced.as_ref().unwrap().tier(), 2);
    }

    #[test]
    fn test_top_tier_vanish_policy() {
        let mut session = session_with(TopTierPolicy::Vanish);
        let top = session.catalog().max_tier();
        let a = place(&mut session, top, 100.0, 400.0);
        let b = place(&mut session, top, 200.0, 400.0);
        let bodies_before = session.world().body_count();

        let merges = session.handle_collisions(&[CollisionPair::new(a, b)]);

        assert_eq!(merges.len(), 1);
        assert!(merges[0].produced.is_none());
        assert_eq!(session.world().body_count(), bodies_before - 2);
        assert!(!session.registry().contains(a));
        assert!(!session.registry().contains(b));
    }

    #[test]
    fn test_top_tier_ignore_policy() {
        let mut session = session_with(TopTierPolicy::Ignore);
        let top = session.catalog().max_tier();
        let a = place(&mut session, top, 100.0, 400.0);
        let b = place(&mut session, top, 200.0, 400.0);

        let merges = session.handle_collisions(&[CollisionPair::new(a, b)]);

        assert!(merges.is_empty());
        assert!(session.registry().contains(a));
        assert!(session.registry().contains(b));
    }

    #[test]
    fn test_merging_the_pointer_schedules_rearm() {
        let mut session = session_with(TopTierPolicy::Vanish);
        let pointer = session.armed_fruit().unwrap().clone();
        let [x, y] = session.world().position(pointer.body).unwrap();
        let other = place(&mut session, pointer.tier(), x + 10.0, y + 10.0);

        let merges = session.handle_collisions(&[CollisionPair::new(pointer.body, other)]);

        assert_eq!(merges.len(), 1);
        assert!(!session.pointer().is_armed());
        assert!(!session.registry().contains(pointer.body));
        assert!(
            session
                .scheduler()
                .pending()
                .any(|(_, task)| task == TimerTask::ArmPointer)
        );
    }

    #[test]
    fn test_decision_for_pair() {
        let mut session = session_with(TopTierPolicy::Ignore);
        let a = place(&mut session, 4, 0.0, 0.0);
        let b = place(&mut session, 4, 0.0, 0.0);
        let c = place(&mut session, 5, 0.0, 0.0);

        let decide = |session: &Session<ScriptedWorld>, pair| {
            MergeDecision::for_pair(&session.registry, &session.catalog, TopTierPolicy::Ignore, pair)
        };
        assert_eq!(
            decide(&session, CollisionPair::new(a, b)),
            MergeDecision::Promote { next_tier: 5 }
        );
        assert_eq!(decide(&session, CollisionPair::new(a, c)), MergeDecision::DifferentKinds);
        assert_eq!(decide(&session, CollisionPair::new(a, a)), MergeDecision::SameBody);
        assert_eq!(
            decide(&session, CollisionPair::new(a, BodyId(10_000))),
            MergeDecision::Unresolved
        );
    }
}
