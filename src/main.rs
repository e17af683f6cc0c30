//! p2d-stress entry point
//!
//! Headless stress scene: scatters bodies inside a static box and steps the
//! world through the frame accumulator, logging contacts and energy.
//!
//! Usage: `p2d-stress [bodies] [frames] [seed]`
//! Set `P2D_SETTINGS=path.json` to load world settings from a file.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("p2d-stress starting...");

    let mut args = std::env::args().skip(1);
    let bodies = parse_arg(args.next(), 500usize, "bodies");
    let frames = parse_arg(args.next(), 600u32, "frames");
    let seed = parse_arg(args.next(), 0x5eed_u64, "seed");

    let settings = match std::env::var("P2D_SETTINGS") {
        Ok(path) => match p2d::WorldSettings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Failed to load settings from {path}: {e}");
                std::process::exit(1);
            }
        },
        Err(_) => p2d::WorldSettings::default(),
    };

    stress::run(settings, bodies, frames, seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Headless demo is native only
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_arg<T: std::str::FromStr>(arg: Option<String>, default: T, name: &str) -> T {
    match arg {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Invalid {name} argument {raw:?}, using default");
            default
        }),
        None => default,
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod stress {
    use std::time::Instant;

    use p2d::consts::SIM_DT;
    use p2d::{Body, CollisionShape, Point, Vector, World, WorldSettings};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    /// Half-size of the arena box interior
    const ARENA_HALF: f64 = 400.0;
    const WALL_THICKNESS: f64 = 20.0;
    const LOG_EVERY: u32 = 60;

    pub fn run(settings: WorldSettings, bodies: usize, frames: u32, seed: u64) {
        let mut world = World::new(settings);
        build_arena(&mut world);
        scatter(&mut world, bodies, seed);

        log::info!(
            "Scene ready: {} bodies, seed {seed}, {frames} frames",
            world.len()
        );

        let start = Instant::now();
        let mut total_steps = 0u64;
        let mut peak_contacts = 0usize;

        for frame in 0..frames {
            // Pretend the display runs at 60 Hz
            total_steps += u64::from(world.advance(1.0 / 60.0));
            peak_contacts = peak_contacts.max(world.contacts().len());

            if frame % LOG_EVERY == 0 {
                log::info!(
                    "frame {frame:>5}: contacts={:>5} energy={:.2} alpha={:.2}",
                    world.contacts().len(),
                    world.kinetic_energy(),
                    world.interpolation_alpha()
                );
            }
        }

        let elapsed = start.elapsed().as_secs_f64();
        log::info!(
            "Done: {total_steps} steps in {elapsed:.3}s ({:.1} steps/s), peak contacts {peak_contacts}",
            total_steps as f64 / elapsed.max(f64::EPSILON)
        );
        log::info!(
            "Simulated {:.2}s, final energy {:.2}",
            total_steps as f64 * SIM_DT,
            world.kinetic_energy()
        );
    }

    fn build_arena(world: &mut World) {
        let span = ARENA_HALF + WALL_THICKNESS;
        let walls = [
            (Point::new(0.0, -span), Vector::new(span, WALL_THICKNESS)),
            (Point::new(0.0, span), Vector::new(span, WALL_THICKNESS)),
            (Point::new(-span, 0.0), Vector::new(WALL_THICKNESS, span)),
            (Point::new(span, 0.0), Vector::new(WALL_THICKNESS, span)),
        ];
        for (center, half) in walls {
            world.add_body(Body::fixed(CollisionShape::rectangle(center, half)));
        }
    }

    fn scatter(world: &mut World, count: usize, seed: u64) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let margin = ARENA_HALF - 20.0;

        for _ in 0..count {
            let center = Point::new(
                rng.random_range(-margin..margin),
                rng.random_range(-margin..margin),
            );
            let size = rng.random_range(3.0..10.0);
            let shape = if rng.random_bool(0.5) {
                CollisionShape::circle(center, size)
            } else {
                let mut shape = CollisionShape::rectangle(center, Vector::splat(size));
                shape.rotate(rng.random_range(0.0..std::f64::consts::PI));
                shape
            };
            let velocity = Vector::new(rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0));

            world.add_body(
                Body::dynamic(shape, size * size)
                    .with_velocity(velocity)
                    .with_restitution(rng.random_range(0.2..0.9)),
            );
        }
    }
}
