//! # Headless Walkthrough
//!
//! Walks an observer east through the world without any renderer and
//! prints what the simulation did: chunks streamed, features claimed,
//! progression transitions and pursuit counts.
//!
//! Usage: `walkthrough [config.toml]`

use std::time::Instant;

use liminal::procedural::{FeatureKind, MaterializeError, VisualHandle};
use liminal::shared::{Vec3, TICK_RATE};
use liminal::{ConfigError, LiminalConfig, Simulation, Transition, WorldEvent};

/// Chunks walked east.
const CHUNKS_TO_WALK: u16 = 12;

fn main() -> Result<(), ConfigError> {
    let config = match std::env::args().nth(1) {
        Some(path) => LiminalConfig::from_path(path)?,
        None => LiminalConfig::default(),
    };
    let chunk_size = config.world.chunk_size;
    let mut sim = Simulation::new(config);
    let events = sim.receiver();

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║                    LIMINAL WALKTHROUGH                        ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");

    // One chaser in the first parking chunk, one statue that only watches.
    let chaser = sim.spawn_entity(Vec3::new(chunk_size * 0.5, 0.0, chunk_size * 0.9), false);
    let statue = sim.spawn_entity(Vec3::new(chunk_size * 0.2, 0.0, chunk_size * 0.2), true);
    sim.pursuit_mut().resolve_appearance(chaser, Ok(VisualHandle(1)));
    sim.pursuit_mut().resolve_appearance(
        statue,
        Err(MaterializeError::AssetUnavailable("smiler model".to_owned())),
    );

    let dt = 1.0 / TICK_RATE as f32;
    let ticks_per_chunk = TICK_RATE;
    let step = chunk_size / ticks_per_chunk as f32;
    let start = Instant::now();

    let mut x = chunk_size * 0.5;
    let z = chunk_size * 0.5;
    let mut activated = 0usize;
    let mut evicted = 0usize;

    for _ in 0..u32::from(CHUNKS_TO_WALK) * ticks_per_chunk {
        let report = sim.tick(dt, Vec3::new(x, 1.7, z));
        activated += report.streaming.activated.len();
        evicted += report.streaming.evicted.len();

        match report.transition {
            Some(Transition::Began { visited }) => {
                println!("[frame {:>4}] Shift began after {} chunks", report.frame, visited);
            }
            Some(Transition::Triggered { traversed, ramp }) => {
                println!(
                    "[frame {:>4}] Shift triggered after {} chunks (ramp {:.3})",
                    report.frame, traversed, ramp
                );
            }
            None => {}
        }

        for event in events.drain() {
            if let WorldEvent::UniqueFeatureClaimed { kind, coord } = event {
                let name = match kind {
                    FeatureKind::HazardRoom => "Hazard room",
                    FeatureKind::SpecialExit => "Exit",
                };
                println!("[frame {:>4}] {} claimed at {}", report.frame, name, coord);
            }
        }

        x += step;
    }

    let elapsed = start.elapsed();
    let world = sim.world();
    let stats = sim.pursuit().stats();
    let env = sim.environment();

    println!();
    println!("Walked {} chunks in {:?}", CHUNKS_TO_WALK, elapsed);
    println!("Activated: {activated}, evicted: {evicted}, active now: {}", world.loaded_chunk_count());
    println!("Visited: {}", world.visited_count());
    println!("Fallback visuals: {}", world.stats().fallbacks_this_session);
    println!("Live handles: {}", world.materializer().live_handles());
    println!(
        "Phase: {} (ramp {:.3})",
        sim.progression().phase().name(),
        sim.progression().ramp()
    );
    println!("Sanity: {:.3}", sim.sanity().value());
    println!(
        "Clear color: ({:.3}, {:.3}, {:.3}), shadow darkness {:.2}",
        env.clear_color.r, env.clear_color.g, env.clear_color.b, env.shadow_darkness
    );
    println!(
        "Entities: {} total, {} chasing, {} idle",
        stats.total, stats.chasing, stats.idle
    );

    Ok(())
}
