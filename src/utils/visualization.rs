//! Visualization utilities for planar_rrt
//!
//! Collects scenes, grids, trees and trajectories as plot layers and renders
//! them onto a single gnuplot axes.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{PlanningError, PlanningResult, Point2D, Trajectory};
use crate::mapping::OccupancyGrid2D;
use crate::path_planning::RrtTree;
use crate::scene::Scene2D;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const GRAY: &str = "#808080";

    // Semantic colors
    pub const OBSTACLE: &str = BLACK;
    pub const OCCUPIED: &str = GRAY;
    pub const START: &str = GREEN;
    pub const GOAL: &str = BLUE;
    pub const PATH: &str = RED;
    pub const TREE: &str = "#35C788";
}

/// Style for path rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            color: colors::PATH.to_string(),
            line_width: 2.0,
            caption: "Path".to_string(),
        }
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

#[derive(Debug, Clone)]
enum Layer {
    Lines { x: Vec<f64>, y: Vec<f64>, style: PathStyle },
    Points { x: Vec<f64>, y: Vec<f64>, style: PointStyle },
    Segments { segments: Vec<(Point2D, Point2D)>, style: PathStyle },
    Heatmap { data: Vec<f64>, rows: usize, cols: usize, extent: (f64, f64, f64, f64) },
}

/// Main visualizer struct
pub struct Visualizer {
    figure: Figure,
    layers: Vec<Layer>,
    title: String,
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    /// Create a new visualizer
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
            layers: Vec::new(),
            title: String::new(),
            x_label: "X [m]".to_string(),
            y_label: "Y [m]".to_string(),
            x_range: None,
            y_range: None,
            aspect_ratio: Some(1.0),
        }
    }

    /// Set the plot title
    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    /// Set X axis range
    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    /// Set Y axis range
    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    /// Number of layers queued for rendering
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Plot a trajectory as a polyline
    pub fn plot_trajectory(&mut self, trajectory: &Trajectory, style: &PathStyle) -> &mut Self {
        self.layers.push(Layer::Lines {
            x: trajectory.x_coords(),
            y: trajectory.y_coords(),
            style: style.clone(),
        });
        self
    }

    /// Plot a single point (start, goal, etc.)
    pub fn plot_point(&mut self, point: Point2D, style: &PointStyle) -> &mut Self {
        self.plot_points(&[point], style)
    }

    /// Plot multiple points
    pub fn plot_points(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        if points.is_empty() {
            return self;
        }
        self.layers.push(Layer::Points {
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
            style: style.clone(),
        });
        self
    }

    /// Plot start position
    pub fn plot_start(&mut self, point: Point2D) -> &mut Self {
        self.plot_point(point, &PointStyle::new(colors::START, "Start").with_size(1.5))
    }

    /// Plot goal position
    pub fn plot_goal(&mut self, point: Point2D) -> &mut Self {
        self.plot_point(point, &PointStyle::new(colors::GOAL, "Goal").with_size(1.5))
    }

    /// Plot every parent-child edge of a tree
    pub fn plot_tree(&mut self, tree: &RrtTree) -> &mut Self {
        let segments = tree.edges();
        if !segments.is_empty() {
            self.layers.push(Layer::Segments {
                segments,
                style: PathStyle::new(colors::TREE, "Tree").with_line_width(1.0),
            });
        }
        self
    }

    /// Plot obstacle centers of a scene
    pub fn plot_obstacles(&mut self, scene: &Scene2D) -> &mut Self {
        let centers: Vec<Point2D> = scene.obstacles().iter().map(|o| o.center()).collect();
        self.plot_points(
            &centers,
            &PointStyle::new(colors::OBSTACLE, "Obstacles").with_symbol('S').with_size(0.5),
        )
    }

    /// Plot centers of every occupied bin
    pub fn plot_occupancy(&mut self, grid: &OccupancyGrid2D) -> &mut Self {
        let centers: Vec<Point2D> = grid.occupied_bins().map(|index| grid.center_of(&index)).collect();
        self.plot_points(
            &centers,
            &PointStyle::new(colors::OCCUPIED, "Occupied").with_symbol('S').with_size(1.0),
        )
    }

    /// Plot the scene cost sampled at `resolution` as a heatmap
    pub fn plot_cost_map(&mut self, scene: &Scene2D, resolution: f64) -> PlanningResult<&mut Self> {
        let map = scene.cost_map(resolution)?;
        let (x_width, y_width) = (map.nrows(), map.ncols());

        let mut data = Vec::with_capacity(x_width * y_width);
        for iy in 0..y_width {
            for ix in 0..x_width {
                data.push(map[(ix, iy)]);
            }
        }

        let bounds = scene.bounds();
        self.layers.push(Layer::Heatmap {
            data,
            rows: y_width,
            cols: x_width,
            extent: (bounds.xmin, bounds.ymin, bounds.xmax, bounds.ymax),
        });
        Ok(self)
    }

    /// Finalize and show the plot
    pub fn show(&mut self) -> PlanningResult<()> {
        self.render();
        self.figure
            .show()
            .map(|_| ())
            .map_err(|e| PlanningError::VisualizationError(e.to_string()))
    }

    /// Save plot to PNG file
    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> PlanningResult<()> {
        self.render();
        self.figure
            .save_to_png(path, width, height)
            .map_err(|e| PlanningError::VisualizationError(e.to_string()))
    }

    /// Save plot to SVG file
    pub fn save_svg(&mut self, path: &str) -> PlanningResult<()> {
        self.render();
        self.figure
            .save_to_svg(path, 800, 600)
            .map_err(|e| PlanningError::VisualizationError(e.to_string()))
    }

    fn render(&mut self) {
        self.figure.clear_axes();
        let axes = self.figure.axes2d();

        for layer in &self.layers {
            match layer {
                Layer::Heatmap { data, rows, cols, extent } => {
                    axes.image(data.iter().cloned(), *rows, *cols, Some(*extent), &[Caption("Cost")]);
                }
                Layer::Lines { x, y, style } => {
                    axes.lines(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        LineWidth(style.line_width),
                    ]);
                }
                Layer::Points { x, y, style } => {
                    axes.points(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        PointSymbol(style.symbol),
                        PointSize(style.size),
                    ]);
                }
                Layer::Segments { segments, style } => {
                    for (i, (from, to)) in segments.iter().enumerate() {
                        let caption = if i == 0 { style.caption.as_str() } else { "" };
                        axes.lines(&[from.x, to.x], &[from.y, to.y], &[
                            Caption(caption),
                            Color(&style.color),
                            LineWidth(style.line_width),
                        ]);
                    }
                }
            }
        }

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);

        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}
