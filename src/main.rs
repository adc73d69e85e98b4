use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use polis::{WorldConfig, WorldGenerationContext};
use polis_geom::{Capsule, Ray, Vec3};
use polis_terrain::HeightSampler;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to world.toml configuration file
    #[arg(short, long, default_value = "assets/world.toml")]
    config: PathBuf,
    /// Override the world seed
    #[arg(short, long)]
    seed: Option<u64>,
    /// Override log level (trace|debug|info|warn|error)
    #[arg(short, long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print counts for every generation stage
    Summary,
    /// Query ground, zoning and collision at a world position
    Probe { x: f32, z: f32 },
    /// List placed building lots
    Lots {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = args.log_level.as_deref() {
        logger.parse_filters(level);
    }
    logger.init();

    let mut config = WorldConfig::load(&args.config);
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let world = match WorldGenerationContext::generate(config) {
        Ok(world) => world,
        Err(e) => {
            log::error!("world generation failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    match args.command.unwrap_or(Command::Summary) {
        Command::Summary => println!("{}", world.summary()),
        Command::Probe { x, z } => probe(&world, x, z),
        Command::Lots { limit } => {
            for lot in world.lots.items.iter().take(limit) {
                println!(
                    "#{:<4} {:<10} {:<10} ({:>7.1}, {:>6.1}, {:>7.1}) yaw {:>6.1} {:?}",
                    lot.id,
                    lot.kind,
                    lot.district,
                    lot.position.x,
                    lot.position.y,
                    lot.position.z,
                    lot.yaw.to_degrees(),
                    lot.facing
                );
            }
        }
    }
    ExitCode::SUCCESS
}

fn probe(world: &WorldGenerationContext, x: f32, z: f32) {
    let field = world.height_sampler();
    let Some(h) = field.sample(x, z) else {
        println!("({x}, {z}) is outside the terrain");
        return;
    };
    println!("height:    {h:.2}");
    println!("slope:     {:.3}", field.slope(x, z, 1.0));
    let w = field.surface_weights(x, z);
    println!("surface:   sand {:.2} grass {:.2} rock {:.2}", w.sand, w.grass, w.rock);
    println!("district:  {}", world.district_at(x, z).id);
    println!("road:      {:.1} m", world.road.distance_to_point(x, z));

    let down = Ray::new(Vec3::new(x, h + 100.0, z), Vec3::new(0.0, -1.0, 0.0));
    match world.collider.raycast(&down, 200.0) {
        Some(hit) => {
            let name = world.scene.get(hit.node).map_or("?", |n| n.name.as_str());
            println!("ray down:  hit {name} at y {:.2}", hit.point.y);
        }
        None => println!("ray down:  no hit"),
    }
    let standing = Capsule::new(Vec3::new(x, h + 0.4, z), Vec3::new(x, h + 1.4, z), 0.4);
    match world.collider.capsule_push_out(&standing) {
        Some(push) => println!("capsule:   pushed by ({:.2}, {:.2}, {:.2})", push.x, push.y, push.z),
        None => println!("capsule:   clear"),
    }
}
