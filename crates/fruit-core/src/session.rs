//! The owned session context.
//!
//! A [`Session`] holds every piece of mutable game state (registry, pointer
//! slot, timers, RNG, physics world) and is the only thing that mutates it.
//! Component operations live in their own modules as `impl Session` blocks:
//! - [`crate::pointer`]: arming and disarming the pointer fruit
//! - [`crate::dropping`]: drop gestures and delayed release
//! - [`crate::merge`]: collision batches and the merge cascade
//!
//! Processing order inside [`Session::advance`]:
//! 1. queued commands, up to the first `Yield`
//! 2. for each fixed step: timers due up to the step instant, then the
//!    physics step, then its collision batch
//! 3. timers due up to the end of the advanced interval

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::arena::Arena;
use crate::catalog::FruitCatalog;
use crate::command::{CommandQueue, SessionCommand};
use crate::config::GameConfig;
use crate::error::FruitError;
use crate::merge::MergeEvent;
use crate::physics::{PHYSICS_STEP, PhysicsBackend, RapierWorld};
use crate::pointer::PointerSlot;
use crate::registry::{FruitInstance, FruitRegistry};
use crate::scheduler::{Scheduler, TimerTask};

/// A single game session over a physics backend.
#[derive(Debug)]
pub struct Session<B: PhysicsBackend> {
    pub(crate) config: GameConfig,
    pub(crate) catalog: FruitCatalog,
    pub(crate) arena: Arena,
    pub(crate) registry: FruitRegistry,
    pub(crate) pointer: PointerSlot,
    pub(crate) scheduler: Scheduler,
    pub(crate) commands: CommandQueue,
    pub(crate) world: B,
    pub(crate) rng: ChaCha8Rng,
    seed: u64,
    /// Current session time.
    pub(crate) clock: Duration,
    /// Session time of the last physics step.
    last_step: Duration,
}

impl Session<RapierWorld> {
    /// Starts a session on a fresh `Rapier2D` world.
    pub fn with_rapier(config: GameConfig, seed: u64) -> Result<Self, FruitError> {
        Self::start(config, RapierWorld::new(), seed)
    }
}

impl<B: PhysicsBackend> Session<B> {
    /// Builds a session without touching the world.
    ///
    /// Call [`Session::recalibrate`] before accepting input, or use
    /// [`Session::start`].
    pub fn new(config: GameConfig, world: B, seed: u64) -> Result<Self, FruitError> {
        config.validate()?;
        let catalog = config.catalog()?;
        let arena = Arena::new(config.arena.clone());

        Ok(Self {
            config,
            catalog,
            arena,
            registry: FruitRegistry::new(),
            pointer: PointerSlot::default(),
            scheduler: Scheduler::new(),
            commands: CommandQueue::new(),
            world,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            clock: Duration::ZERO,
            last_step: Duration::ZERO,
        })
    }

    /// Builds a session and recalibrates it, ready for the first drop.
    pub fn start(config: GameConfig, world: B, seed: u64) -> Result<Self, FruitError> {
        let mut session = Self::new(config, world, seed)?;
        session.recalibrate()?;
        Ok(session)
    }

    /// Rebuilds the world from configuration: reset, boundaries, pointer.
    ///
    /// Pending timers are dropped and the spawn RNG is reseeded, so
    /// repeated calls always produce the same fresh world.
    pub fn recalibrate(&mut self) -> Result<(), FruitError> {
        info!("[session] Recalibrating (seed={})", self.seed);

        self.scheduler.clear();
        self.arena.reset_world(&mut self.world);
        self.registry.clear();
        self.pointer.clear();
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);

        self.arena.install_boundaries(&mut self.world);
        self.arm_pointer()?;
        Ok(())
    }

    /// Runs queued commands up to the first `Yield`.
    pub fn process_commands(&mut self) {
        for command in self.commands.drain_until_yield() {
            match command {
                SessionCommand::PointerDown { x, y } => {
                    if let Err(err) = self.pointer_down(x, y) {
                        warn!("[command] PointerDown ({x}, {y}) failed: {err}");
                    }
                }
                SessionCommand::Recalibrate => {
                    if let Err(err) = self.recalibrate() {
                        warn!("[command] Recalibrate failed: {err}");
                    }
                }
                // Yield is consumed by drain_until_yield(), should not reach here
                SessionCommand::Yield => {}
            }
        }
    }

    /// Advances session time by `dt`, stepping physics at the fixed rate.
    ///
    /// Returns every merge that happened along the way, in order.
    pub fn advance(&mut self, dt: Duration) -> Vec<MergeEvent> {
        self.process_commands();

        let target = self.clock + dt;
        let mut merges = Vec::new();
        while self.last_step + PHYSICS_STEP <= target {
            merges.extend(self.step());
        }
        self.run_timers_until(target);
        self.clock = target;
        merges
    }

    /// Runs exactly one fixed physics step.
    ///
    /// Timers due at or before the step instant fire first, then the world
    /// steps and its collision batch is merged.
    pub fn step(&mut self) -> Vec<MergeEvent> {
        let next_step = self.last_step + PHYSICS_STEP;
        self.run_timers_until(next_step);
        self.clock = next_step;
        self.last_step = next_step;

        let batch = self.world.step();
        self.handle_collisions(&batch)
    }

    fn run_timers_until(&mut self, until: Duration) {
        while let Some((due, task)) = self.scheduler.pop_due(until) {
            self.clock = self.clock.max(due);
            self.run_task(task);
        }
    }

    fn run_task(&mut self, task: TimerTask) {
        match task {
            TimerTask::ReleaseFruit { body, fruit } => {
                if let Err(err) = self.release_fruit(body, fruit) {
                    warn!("[drop] Release of fruit {fruit} failed: {err}");
                }
            }
            TimerTask::ArmPointer => {
                if let Err(err) = self.arm_pointer() {
                    warn!("[pointer] Re-arm skipped: {err}");
                }
            }
        }
    }

    /// Returns a handle input collaborators can push commands into.
    pub fn command_queue(&self) -> CommandQueue {
        self.commands.clone()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &FruitCatalog {
        &self.catalog
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn registry(&self) -> &FruitRegistry {
        &self.registry
    }

    pub fn pointer(&self) -> PointerSlot {
        self.pointer
    }

    /// The armed pointer fruit, if any.
    pub fn armed_fruit(&self) -> Option<&FruitInstance> {
        self.pointer.armed().and_then(|body| self.registry.get(body))
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn world(&self) -> &B {
        &self.world
    }

    /// Mutable access to the backend, e.g. to queue scripted collisions.
    pub fn world_mut(&mut self) -> &mut B {
        &mut self.world
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Current session time.
    pub fn clock(&self) -> Duration {
        self.clock
    }
}
