use log::{error, info};
use rigid2d::*;
use std::env;
use std::fs;

type DemoResult = std::result::Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let example = args.get(1).map(String::as_str).unwrap_or("basic");

    // Optional JSON world configuration as the second argument
    let config = match args.get(2) {
        Some(path) => match fs::read_to_string(path)
            .map_err(|e| PhysicsError::ConfigParse(e.to_string()))
            .and_then(|json| WorldConfig::from_json_str(&json))
        {
            Ok(config) => config,
            Err(e) => {
                error!("could not load {}: {}", path, e);
                return;
            }
        },
        None => WorldConfig::default(),
    };

    info!("Running example: {}", example);
    let result = match example {
        "basic" => run_basic_example(config),
        "pile" => run_pile_example(config),
        "shatter" => run_shatter_example(config),
        _ => {
            error!("Unknown example: {}. Available examples: basic, pile, shatter", example);
            return;
        }
    };

    if let Err(e) = result {
        error!("example {} failed: {}", example, e);
    }
}

/// Static floor whose top surface is the line y = 0 (positive y is down).
fn add_floor(world: &mut PhysicsWorld, width: f64) -> Result<BodyHandle> {
    world.create_rectangle(Vec2::new(0.0, 1.0), width, 2.0, 0.0)
}

fn run_basic_example(config: WorldConfig) -> DemoResult {
    let mut world = PhysicsWorld::with_config(config)?;
    add_floor(&mut world, 20.0)?;

    let ball = world.create_circle(Vec2::new(0.0, -5.0), 0.5, 1.0)?;
    world.body_mut(ball)?.material = Material::new(0.4, 0.2, 0.6);

    for frame in 0..180 {
        world.step();
        if frame % 15 == 0 {
            let body = world.body(ball)?;
            info!(
                "frame {:3}: ball at ({:.2}, {:.2}), velocity {:.2}, grounded {}",
                frame,
                body.position.x,
                body.position.y,
                body.linear_velocity.y,
                body.is_grounded()
            );
        }
    }
    world.close();
    Ok(())
}

fn run_pile_example(config: WorldConfig) -> DemoResult {
    let mut world = PhysicsWorld::with_config(config)?;
    add_floor(&mut world, 30.0)?;
    world.create_rectangle(Vec2::new(-8.0, -3.0), 1.0, 6.0, 0.0)?;
    world.create_rectangle(Vec2::new(8.0, -3.0), 1.0, 6.0, 0.0)?;

    for i in 0..24 {
        let x = (i % 6) as f64 * 2.0 - 5.0;
        let y = -4.0 - (i / 6) as f64 * 2.0;
        match i % 3 {
            0 => world.create_circle(Vec2::new(x, y), 0.6, 1.0)?,
            1 => world.create_rectangle(Vec2::new(x, y), 1.2, 0.8, 1.0)?,
            _ => world.create_polygon(Vec2::new(x, y), 0.7, 3 + i % 5, 1.0)?,
        };
    }

    for frame in 0..300 {
        world.step();
        if frame % 60 == 0 {
            let stats = world.last_step_stats();
            info!(
                "frame {:3}: {} bodies, {} pairs tested, {} manifolds",
                frame,
                world.body_count(),
                stats.pairs_tested,
                stats.manifolds
            );
        }
    }

    for (index, (_, body)) in world.bodies().enumerate() {
        info!(
            "body {:2} {:?}: ({:.2}, {:.2}) rot {:.2}",
            index,
            body.kind(),
            body.position.x,
            body.position.y,
            body.orientation()
        );
    }
    world.close();
    Ok(())
}

fn run_shatter_example(config: WorldConfig) -> DemoResult {
    let mut world = PhysicsWorld::with_config(config)?;
    add_floor(&mut world, 30.0)?;
    let block = world.create_polygon(Vec2::new(0.0, -6.0), 1.5, 8, 1.0)?;

    // Let it land first
    for _ in 0..90 {
        world.step();
    }

    let impact = world.body(block)?.position + Vec2::new(0.2, -0.3);
    let pieces = world.shatter(block, impact, 400.0)?;
    info!("block broke into {} pieces", pieces.len());

    for _ in 0..120 {
        world.step();
    }
    for piece in pieces {
        let vertices = world.body(piece)?.world_vertices();
        info!("piece {:?}: {:?}", piece, vertices);
    }
    world.close();
    Ok(())
}
