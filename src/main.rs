use clap::Parser;
use tracing_subscriber::EnvFilter;

use reactive_pathfinding::{
    optimal_route_cost, Agent, Config, PathFinder, RangeSensor, SimAgent, SimWorld,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::parse();
    let params = config.engine_params();

    println!("Starting reactive path finding...");
    println!(
        "World: {}x{} at resolution {}",
        config.width, config.height, config.resolution
    );
    println!(
        "Start: ({}, {}) | Goal: ({}, {})",
        config.start_x, config.start_y, config.goal_x, config.goal_y
    );
    println!(
        "Obstacles: {} | Sensor range: {}",
        config.num_obstacles, config.sensor_range
    );
    println!();

    let start = (config.start_x, config.start_y);
    let goal = (config.goal_x, config.goal_y);
    let world = SimWorld::generate(
        &params,
        config.num_obstacles,
        config.obstacle_width,
        start,
        goal,
        config.seed,
    );

    let agent = SimAgent::new(config.start_x, config.start_y, config.speed);
    let sensor = RangeSensor::new(world.handle(), config.sensor_range);

    let mut finder = match PathFinder::new(agent, sensor, &params) {
        Ok(finder) => finder,
        Err(e) => {
            eprintln!("Engine initialization failed: {e}");
            std::process::exit(1);
        }
    };

    match finder.find_path(goal) {
        Ok(stats) => {
            let (x, y, _) = finder.agent().get_position();
            println!("=== RUN COMPLETE ===");
            println!("Final position: ({x:.2}, {y:.2})");
            print!("{stats}");
            println!("Distance traveled: {:.2}", finder.agent().odometer());

            let map = finder.map();
            let start_cell = map.coords_to_indices(config.start_x, config.start_y);
            let goal_cell = map.coords_to_indices(config.goal_x, config.goal_y);
            if let Some(optimal) = optimal_route_cost(map, start_cell, goal_cell) {
                let optimal_distance = optimal * config.resolution;
                println!("Optimal route (A* on the final map): {optimal_distance:.2}");
                if optimal_distance > 0.0 {
                    println!(
                        "Route efficiency: {:.3}",
                        finder.agent().odometer() / optimal_distance
                    );
                }
            }
        }
        Err(e) => {
            eprintln!("Path finding failed: {e}");
            std::process::exit(1);
        }
    }
}
