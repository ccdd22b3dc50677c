//! Mutable occupancy grid with a batch update primitive.
//!
//! The grid stores one occupancy byte per cell (0 = free, >0 = blocked) in
//! row-major order. Planners read it through [`OccupancyGrid::is_free`] and
//! mutate it only through [`OccupancyGrid::update_cells`], which reports
//! which cells actually changed traversability so incremental searches can
//! dirty exactly the affected vertices.

use crate::error::MapError;
use crate::point::{GridCoord, Point2D};

/// Occupancy byte for a free cell.
pub const FREE: u8 = 0;

/// Conventional occupancy byte for a fully blocked cell.
pub const OCCUPIED: u8 = 100;

/// A 2D occupancy grid.
///
/// Cell (x, y) covers the world square from `origin + (x, y) * resolution`
/// to `origin + (x+1, y+1) * resolution`; its representative world point is
/// the cell center.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    occupancy: Vec<u8>,
    width: usize,
    height: usize,
    resolution: f64,
    inv_resolution: f64,
    origin: Point2D,
}

impl OccupancyGrid {
    /// Create an all-free grid with its origin at the world origin.
    pub fn new(width: usize, height: usize, resolution: f64) -> Result<Self, MapError> {
        Self::with_origin(width, height, resolution, Point2D::ZERO)
    }

    /// Create an all-free grid with an explicit origin (world coordinates of
    /// the lower-left corner of cell (0, 0)).
    pub fn with_origin(
        width: usize,
        height: usize,
        resolution: f64,
        origin: Point2D,
    ) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::EmptyGrid { width, height });
        }
        if resolution <= 0.0 {
            return Err(MapError::InvalidResolution(resolution));
        }
        Ok(Self {
            occupancy: vec![FREE; width * height],
            width,
            height,
            resolution,
            inv_resolution: 1.0 / resolution,
            origin,
        })
    }

    /// Grid width in cells (columns).
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells (rows).
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Resolution in meters per cell.
    #[inline]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Grid dimensions as (columns, rows).
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Raw occupancy bytes in row-major order.
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.occupancy
    }

    /// Whether a coordinate lies inside the grid.
    #[inline]
    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height
    }

    #[inline]
    fn index(&self, coord: GridCoord) -> usize {
        coord.y as usize * self.width + coord.x as usize
    }

    /// Occupancy byte of a cell. Out-of-bounds reads as fully occupied.
    #[inline]
    pub fn occupancy(&self, coord: GridCoord) -> u8 {
        if self.in_bounds(coord) {
            self.occupancy[self.index(coord)]
        } else {
            OCCUPIED
        }
    }

    /// Whether a cell is free. Out-of-bounds counts as blocked.
    #[inline]
    pub fn is_free(&self, coord: GridCoord) -> bool {
        self.occupancy(coord) == FREE
    }

    /// Overwrite a single cell's occupancy byte.
    ///
    /// # Panics
    /// Panics if `coord` is out of bounds.
    pub fn set_occupancy(&mut self, coord: GridCoord, value: u8) {
        assert!(
            self.in_bounds(coord),
            "cell ({}, {}) outside {}x{} grid",
            coord.x,
            coord.y,
            self.width,
            self.height
        );
        let idx = self.index(coord);
        self.occupancy[idx] = value;
    }

    /// Apply a batch of occupancy updates.
    ///
    /// Every differing byte is written. The returned vector is parallel to
    /// `updates`; a flag is true iff that cell's traversability (free vs
    /// blocked) changed. Rewrites that keep a cell on the same side (for
    /// example 50 -> 100) are stored but not flagged, since no edge cost
    /// depends on the raw byte.
    ///
    /// # Panics
    /// Panics if any update coordinate is out of bounds.
    pub fn update_cells(&mut self, updates: &[(GridCoord, u8)]) -> Vec<bool> {
        let mut changed = Vec::with_capacity(updates.len());
        for &(coord, value) in updates {
            assert!(
                self.in_bounds(coord),
                "cell ({}, {}) outside {}x{} grid",
                coord.x,
                coord.y,
                self.width,
                self.height
            );
            let idx = self.index(coord);
            let old = self.occupancy[idx];
            self.occupancy[idx] = value;
            changed.push((old == FREE) != (value == FREE));
        }
        changed
    }

    /// World coordinates of a cell's center.
    #[inline]
    pub fn grid_to_world(&self, coord: GridCoord) -> Point2D {
        Point2D::new(
            self.origin.x + (coord.x as f64 + 0.5) * self.resolution,
            self.origin.y + (coord.y as f64 + 0.5) * self.resolution,
        )
    }

    /// Grid cell containing a world point.
    #[inline]
    pub fn world_to_grid(&self, point: Point2D) -> GridCoord {
        GridCoord::new(
            ((point.x - self.origin.x) * self.inv_resolution).floor() as i32,
            ((point.y - self.origin.y) * self.inv_resolution).floor() as i32,
        )
    }

    /// Check line of sight between two cells with Bresenham traversal.
    ///
    /// Returns false if any visited cell (endpoints included) is blocked or
    /// out of bounds.
    pub fn line_of_sight(&self, from: GridCoord, to: GridCoord) -> bool {
        let mut x0 = from.x;
        let mut y0 = from.y;
        let x1 = to.x;
        let y1 = to.y;

        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;

        loop {
            if !self.is_free(GridCoord::new(x0, y0)) {
                return false;
            }

            if x0 == x1 && y0 == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x0 += sx;
            }
            if e2 < dx {
                err += dx;
                y0 += sy;
            }
        }

        true
    }
}
