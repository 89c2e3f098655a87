//! RRT over an occupancy grid
//!
//! Feeds simulated range returns into an occupancy grid, adds a Gaussian
//! hazard to the derived scene and grows an RRT across it.

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use planar_rrt::common::{AreaBounds, Point2D};
use planar_rrt::mapping::OccupancyGrid2D;
use planar_rrt::path_planning::{RrtConfig, RrtPlanner};
use planar_rrt::scene::GaussianObstacle;
use planar_rrt::utils::{PathStyle, Visualizer};

const OUTPUT_DIR: &str = "img/path_planning";

/// Noisy returns along two walls with a gap between them
fn simulated_returns(rng: &mut StdRng) -> Vec<Point2D> {
    let mut points = Vec::new();
    for i in 0..60 {
        let t = i as f64 * 0.25;
        if t < 6.0 || t > 9.0 {
            points.push(Point2D::new(8.0 + rng.gen_range(-0.2..0.2), t));
        }
        if t < 12.0 {
            points.push(Point2D::new(t + 4.0, 14.0 + rng.gen_range(-0.2..0.2)));
        }
    }
    points
}

fn main() {
    env_logger::init();
    info!("RRT demo start!!");

    let start = Point2D::new(2.0, 2.0);
    let goal = Point2D::new(16.0, 17.0);
    let bounds = AreaBounds::new(0.0, 20.0, 0.0, 20.0);

    let mut grid = match OccupancyGrid2D::new(bounds, 1.0) {
        Ok(grid) => grid,
        Err(e) => {
            error!("Cannot create grid: {}", e);
            return;
        }
    };

    let mut rng = StdRng::seed_from_u64(7);
    let returns = simulated_returns(&mut rng);
    let summary = grid.insert_points(returns.iter().copied());
    info!(
        "Inserted {} of {} returns ({} out of bounds), {} occupied bins",
        summary.accepted,
        returns.len(),
        summary.out_of_bounds,
        grid.scene().num_obstacles()
    );

    match GaussianObstacle::new(12.0, 6.0, 2.0, 1.0, 0.3, 0.02) {
        Ok(hazard) => grid.scene_mut().add_obstacle(Box::new(hazard)),
        Err(e) => warn!("Skipping hazard: {}", e),
    }

    let config = RrtConfig {
        expand_dis: 1.0,
        goal_tolerance: 1.0,
        max_iter: 5000,
        ..Default::default()
    };
    let scene = grid.scene();
    let planner = RrtPlanner::new(scene, config);

    let mut vis = Visualizer::new();
    vis.set_title("RRT on Occupancy Grid");
    if let Err(e) = vis.plot_cost_map(scene, 0.25) {
        warn!("Cost map unavailable: {}", e);
    }
    vis.plot_occupancy(&grid);

    let mut tree_rng = StdRng::seed_from_u64(42);
    match planner.grow(start, goal, &mut tree_rng) {
        Ok(tree) => {
            info!("Tree grown to {} nodes", tree.len());
            vis.plot_tree(&tree);
            match tree.trajectory(&goal) {
                Some(path) => {
                    info!(
                        "Path found with {} points, length {:.2}",
                        path.len(),
                        path.total_length()
                    );
                    vis.plot_trajectory(&path, &PathStyle::default());
                }
                None => error!("Planning failed: goal not reached"),
            }
        }
        Err(e) => error!("Cannot grow tree: {}", e),
    }
    vis.plot_start(start);
    vis.plot_goal(goal);

    if let Err(e) = std::fs::create_dir_all(OUTPUT_DIR) {
        error!("Cannot create {}: {}", OUTPUT_DIR, e);
        return;
    }
    let output = format!("{}/rrt_demo.png", OUTPUT_DIR);
    match vis.save_png(&output, 800, 800) {
        Ok(()) => info!("Plot saved to: {}", output),
        Err(e) => error!("{}", e),
    }

    info!("RRT demo finish!!");
}
