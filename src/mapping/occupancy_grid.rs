//! 2D occupancy grid that accumulates point observations into bins and
//! promotes newly occupied bins into obstacles of a continuous scene.

use itertools::iproduct;
use log::debug;
use nalgebra::DMatrix;

use crate::common::{AreaBounds, PlanningError, PlanningResult, Point2D};
use crate::scene::{CircularObstacle, Scene2D};

/// Logical bin coordinates, with row 0 along `ymin` and column 0 along `xmin`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridIndex {
    pub row: usize,
    pub col: usize,
}

impl GridIndex {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Outcome of a batch insertion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    pub accepted: usize,
    pub out_of_bounds: usize,
    /// Points with non-finite coordinates
    pub invalid: usize,
}

/// Fixed-resolution histogram over a bounded region
#[derive(Debug)]
pub struct OccupancyGrid2D {
    bounds: AreaBounds,
    block_size: f64,
    nrows: usize,
    ncols: usize,
    /// Counts stored top-down: storage row 0 is the bin row along `ymax`
    counts: DMatrix<u32>,
    total_count: usize,
    scene: Scene2D,
}

impl OccupancyGrid2D {
    /// Create an empty grid. Row and column counts are rounded up so the bins
    /// cover the bounds; the block size is then recomputed from them.
    pub fn new(bounds: AreaBounds, block_size: f64) -> PlanningResult<Self> {
        bounds.validate()?;
        if !(block_size.is_finite() && block_size > 0.0) {
            return Err(PlanningError::InvalidArgument(format!(
                "block size must be positive, got {}",
                block_size
            )));
        }

        let nrows = (bounds.height() / block_size).ceil() as usize;
        let ncols = (bounds.width() / block_size).ceil() as usize;
        let block_size = (bounds.width() / ncols as f64).max(bounds.height() / nrows as f64);

        Ok(OccupancyGrid2D {
            bounds,
            block_size,
            nrows,
            ncols,
            counts: DMatrix::zeros(nrows, ncols),
            total_count: 0,
            scene: Scene2D::new(bounds)?,
        })
    }

    pub fn bounds(&self) -> &AreaBounds {
        &self.bounds
    }

    pub fn block_size(&self) -> f64 {
        self.block_size
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of accepted insertions
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Raw counts, top-down
    pub fn counts(&self) -> &DMatrix<u32> {
        &self.counts
    }

    pub fn scene(&self) -> &Scene2D {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene2D {
        &mut self.scene
    }

    pub fn into_scene(self) -> Scene2D {
        self.scene
    }

    /// Record one observation. Returns the updated count of the bin.
    ///
    /// The first observation in a bin adds a disc obstacle covering that bin
    /// to the scene.
    pub fn insert(&mut self, point: &Point2D) -> PlanningResult<u32> {
        let index = self.bin_index(point)?;
        let storage_row = self.storage_row(&index);

        self.counts[(storage_row, index.col)] += 1;
        self.total_count += 1;

        let count = self.counts[(storage_row, index.col)];
        if count == 1 {
            let center = self.center_of(&index);
            debug!(
                "Bin ({}, {}) occupied, adding obstacle at ({:.3}, {:.3})",
                index.row, index.col, center.x, center.y
            );
            self.scene.add_obstacle(Box::new(CircularObstacle::from_center(
                center,
                0.5 * self.block_size,
            )));
        }
        Ok(count)
    }

    /// Insert a batch of observations, skipping the ones the grid rejects.
    pub fn insert_points<I>(&mut self, points: I) -> InsertSummary
    where
        I: IntoIterator<Item = Point2D>,
    {
        let mut summary = InsertSummary::default();
        for point in points {
            match self.insert(&point) {
                Ok(_) => summary.accepted += 1,
                Err(PlanningError::OutOfBounds { .. }) => summary.out_of_bounds += 1,
                Err(_) => summary.invalid += 1,
            }
        }
        if summary.out_of_bounds > 0 {
            debug!("Skipped {} points outside the grid", summary.out_of_bounds);
        }
        if summary.invalid > 0 {
            debug!("Skipped {} points with non-finite coordinates", summary.invalid);
        }
        summary
    }

    /// Number of observations in the bin containing the point
    pub fn count_at(&self, point: &Point2D) -> PlanningResult<u32> {
        let index = self.bin_index(point)?;
        Ok(self.counts[(self.storage_row(&index), index.col)])
    }

    /// Count for a bin given by logical index
    pub fn count(&self, index: &GridIndex) -> Option<u32> {
        if index.row >= self.nrows || index.col >= self.ncols {
            return None;
        }
        Some(self.counts[(self.storage_row(index), index.col)])
    }

    /// Center of the bin containing the point
    pub fn bin_center(&self, point: &Point2D) -> PlanningResult<Point2D> {
        let index = self.bin_index(point)?;
        Ok(self.center_of(&index))
    }

    /// Bin containing the point. Points on the upper bounds belong to the
    /// last row/column.
    pub fn bin_index(&self, point: &Point2D) -> PlanningResult<GridIndex> {
        point.validate()?;
        if !self.bounds.contains(point) {
            debug!("Point ({}, {}) is out of bounds", point.x, point.y);
            return Err(PlanningError::OutOfBounds { x: point.x, y: point.y });
        }

        let row = (self.nrows as f64 * (point.y - self.bounds.ymin) / self.bounds.height()) as usize;
        let col = (self.ncols as f64 * (point.x - self.bounds.xmin) / self.bounds.width()) as usize;
        Ok(GridIndex {
            row: row.min(self.nrows - 1),
            col: col.min(self.ncols - 1),
        })
    }

    /// All bins with at least one observation, in row-major order
    pub fn occupied_bins(&self) -> impl Iterator<Item = GridIndex> + '_ {
        iproduct!(0..self.nrows, 0..self.ncols)
            .map(|(row, col)| GridIndex { row, col })
            .filter(move |index| self.counts[(self.storage_row(index), index.col)] > 0)
    }

    /// World coordinates of a bin center
    pub fn center_of(&self, index: &GridIndex) -> Point2D {
        let bin_width = self.bounds.width() / self.ncols as f64;
        let bin_height = self.bounds.height() / self.nrows as f64;
        Point2D::new(
            self.bounds.xmin + (index.col as f64 + 0.5) * bin_width,
            self.bounds.ymin + (index.row as f64 + 0.5) * bin_height,
        )
    }

    fn storage_row(&self, index: &GridIndex) -> usize {
        self.nrows - 1 - index.row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_by_ten() -> OccupancyGrid2D {
        OccupancyGrid2D::new(AreaBounds::new(0.0, 10.0, 0.0, 10.0), 1.0).unwrap()
    }

    #[test]
    fn test_grid_dimensions() {
        let grid = ten_by_ten();
        assert_eq!(grid.nrows(), 10);
        assert_eq!(grid.ncols(), 10);
        assert!((grid.block_size() - 1.0).abs() < 1e-12);
        assert_eq!(grid.total_count(), 0);
        assert_eq!(grid.occupied_bins().count(), 0);
    }

    #[test]
    fn test_block_size_recomputed_to_tile_bounds() {
        let grid = OccupancyGrid2D::new(AreaBounds::new(0.0, 10.0, 0.0, 4.0), 3.0).unwrap();
        assert_eq!(grid.nrows(), 2);
        assert_eq!(grid.ncols(), 4);
        assert!((grid.block_size() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let bounds = AreaBounds::new(0.0, 10.0, 0.0, 10.0);
        assert!(OccupancyGrid2D::new(bounds, 0.0).is_err());
        assert!(OccupancyGrid2D::new(bounds, -1.0).is_err());
        assert!(OccupancyGrid2D::new(AreaBounds::new(0.0, 0.0, 0.0, 1.0), 1.0).is_err());
    }

    #[test]
    fn test_repeated_insert_creates_one_obstacle() {
        let mut grid = ten_by_ten();
        let p = Point2D::new(2.4, 7.8);

        assert_eq!(grid.insert(&p).unwrap(), 1);
        assert_eq!(grid.scene().num_obstacles(), 1);

        assert_eq!(grid.insert(&p).unwrap(), 2);
        assert_eq!(grid.count_at(&p).unwrap(), 2);
        assert_eq!(grid.scene().num_obstacles(), 1);
        assert_eq!(grid.total_count(), 2);

        // another point in the same bin
        assert_eq!(grid.insert(&Point2D::new(2.9, 7.1)).unwrap(), 3);
        assert_eq!(grid.scene().num_obstacles(), 1);
    }

    #[test]
    fn test_obstacle_covers_bin() {
        let mut grid = ten_by_ten();
        let p = Point2D::new(2.4, 7.8);
        grid.insert(&p).unwrap();

        let center = grid.bin_center(&p).unwrap();
        assert_eq!(center, Point2D::new(2.5, 7.5));

        let obstacle = &grid.scene().obstacles()[0];
        assert_eq!(obstacle.center(), center);
        assert!(!grid.scene().is_feasible(&center));
        assert!(grid.scene().is_feasible(&Point2D::new(5.0, 5.0)));
    }

    #[test]
    fn test_upper_bound_maps_to_last_bin() {
        let mut grid = ten_by_ten();
        let corner = Point2D::new(10.0, 10.0);

        let index = grid.bin_index(&corner).unwrap();
        assert_eq!(index, GridIndex::new(9, 9));

        assert_eq!(grid.insert(&corner).unwrap(), 1);
        // stored top-down, so the top-right bin is storage row 0
        assert_eq!(grid.counts()[(0, 9)], 1);
        assert_eq!(grid.count(&GridIndex::new(9, 9)), Some(1));
    }

    #[test]
    fn test_lower_bound_maps_to_first_bin() {
        let mut grid = ten_by_ten();
        let origin = Point2D::new(0.0, 0.0);
        assert_eq!(grid.bin_index(&origin).unwrap(), GridIndex::new(0, 0));
        grid.insert(&origin).unwrap();
        assert_eq!(grid.counts()[(9, 0)], 1);
    }

    #[test]
    fn test_out_of_bounds_is_distinct_from_zero() {
        let mut grid = ten_by_ten();
        let outside = Point2D::new(10.5, 3.0);

        assert!(matches!(grid.insert(&outside), Err(PlanningError::OutOfBounds { .. })));
        assert!(matches!(grid.count_at(&outside), Err(PlanningError::OutOfBounds { .. })));
        assert!(grid.bin_center(&outside).is_err());
        assert_eq!(grid.count_at(&Point2D::new(5.0, 5.0)).unwrap(), 0);
        assert_eq!(grid.total_count(), 0);
        assert_eq!(grid.scene().num_obstacles(), 0);

        assert!(matches!(
            grid.insert(&Point2D::new(f64::NAN, 1.0)),
            Err(PlanningError::InvalidArgument(_))
        ));
        assert_eq!(grid.count(&GridIndex::new(10, 0)), None);
    }

    #[test]
    fn test_counts_are_monotone() {
        let mut grid = ten_by_ten();
        let points: Vec<Point2D> = (0..50)
            .map(|i| Point2D::new((i % 7) as f64 + 0.5, (i % 3) as f64 + 0.5))
            .collect();

        let mut previous = grid.counts().clone();
        for p in &points {
            grid.insert(p).unwrap();
            let current = grid.counts().clone();
            assert!(current.iter().zip(previous.iter()).all(|(c, p)| c >= p));
            previous = current;
        }

        // one obstacle per occupied bin
        assert_eq!(grid.scene().num_obstacles(), grid.occupied_bins().count());
        for index in grid.occupied_bins() {
            assert!(grid.count(&index).unwrap() >= 1);
        }
    }

    #[test]
    fn test_insert_points_skips_invalid() {
        let mut grid = ten_by_ten();
        let summary = grid.insert_points(vec![
            Point2D::new(1.0, 1.0),
            Point2D::new(-1.0, 1.0),
            Point2D::new(1.2, 1.3),
            Point2D::new(f64::NAN, 2.0),
            Point2D::new(3.0, 20.0),
        ]);
        assert_eq!(
            summary,
            InsertSummary {
                accepted: 2,
                out_of_bounds: 2,
                invalid: 1,
            }
        );
        assert_eq!(grid.total_count(), 2);
        assert_eq!(grid.occupied_bins().collect::<Vec<_>>(), vec![GridIndex::new(1, 1)]);

        let scene = grid.into_scene();
        assert_eq!(scene.num_obstacles(), 1);
    }
}
