//! Fruit-Merge Headless Runner
//!
//! Drives a session on the rapier backend with random drops and reports the
//! merges it sees.
//!
//! Usage: `fruit-sim [config.json] [seed] [drops]`

use std::time::Duration;

use anyhow::{Context, Result};
use fruit_core::{GameConfig, MergeEvent, PhysicsBackend, Session, SessionCommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SEED: u64 = 42;
const DEFAULT_DROPS: usize = 40;
/// Frame pacing of the simulated display.
const FRAME: Duration = Duration::from_millis(16);
/// Time between two simulated presses.
const DROP_INTERVAL: Duration = Duration::from_millis(800);
/// Settling time after the last press.
const SETTLE: Duration = Duration::from_secs(3);

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) if path != "-" => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file {path}"))?;
            GameConfig::from_json(&json).with_context(|| format!("invalid config in {path}"))?
        }
        _ => GameConfig::default(),
    };
    let seed = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid seed {raw:?}"))?,
        None => DEFAULT_SEED,
    };
    let drops = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid drop count {raw:?}"))?,
        None => DEFAULT_DROPS,
    };

    let width = config.arena.width;
    let mut session = Session::with_rapier(config, seed).context("failed to start session")?;
    let commands = session.command_queue();
    let mut input = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
    let mut merges = Vec::new();

    info!("[sim] Running {drops} drops (seed={seed}, width={width})");

    for _ in 0..drops {
        let x = input.random_range(0.0..width);
        commands.push(SessionCommand::PointerDown { x, y: 0.0 });
        commands.push(SessionCommand::Yield);
        run_for(&mut session, DROP_INTERVAL, &mut merges);
    }
    run_for(&mut session, SETTLE, &mut merges);

    report(&session, &merges);
    Ok(())
}

fn run_for<B: PhysicsBackend>(session: &mut Session<B>, duration: Duration, merges: &mut Vec<MergeEvent>) {
    let mut elapsed = Duration::ZERO;
    while elapsed < duration {
        for merge in session.advance(FRAME) {
            let [a, b] = &merge.consumed;
            match &merge.produced {
                Some(fruit) => info!(
                    "[sim] {} + {} -> {} at ({:.1}, {:.1})",
                    a.kind.name, b.kind.name, fruit.kind.name, merge.point[0], merge.point[1]
                ),
                None => info!("[sim] Two {} vanished", a.kind.name),
            }
            merges.push(merge);
        }
        elapsed += FRAME;
    }
}

fn report<B: PhysicsBackend>(session: &Session<B>, merges: &[MergeEvent]) {
    let catalog = session.catalog();
    let histogram = session.registry().tier_histogram(catalog.len());

    info!(
        "[sim] Finished at {:.2}s: {} merges, {} fruits in play",
        session.clock().as_secs_f32(),
        merges.len(),
        session.registry().len()
    );
    for (kind, count) in catalog.kinds().iter().zip(histogram) {
        if count > 0 {
            info!("[sim]   tier {:>2} {:<12} x{count}", kind.tier, kind.name);
        }
    }
}
