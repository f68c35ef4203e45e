//! Grid geometry for square and hexagonal tessellations.
//!
//! A `GridGeometry` is pure, immutable coordinate math: adjacency, world↔grid
//! conversion, heuristic distance and range queries. Exactly two tessellations
//! are supported; the hex variant uses odd-r offset indexing (odd rows shifted
//! half a tile to the right) and cube coordinates for distance math.

use serde::{Deserialize, Serialize};

/// A grid cell coordinate (column, row).
///
/// Within a grid of size N a coordinate is valid iff `0 <= col, row < N`,
/// but `Coord` itself places no bounds on its fields.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coord {
    pub col: i32,
    pub row: i32,
}

impl Coord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub const fn offset(self, dc: i32, dr: i32) -> Self {
        Self::new(self.col + dc, self.row + dr)
    }
}

/// Cube coordinate for hex math. Invariant: `x + y + z == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CubeCoord {
    x: i32,
    y: i32,
    z: i32,
}

impl CubeCoord {
    /// Odd-r offset to cube.
    fn from_offset(offset: Coord) -> Self {
        let x = offset.col - (offset.row - (offset.row & 1)) / 2;
        let z = offset.row;
        let y = -x - z;
        Self { x, y, z }
    }

    /// Cube to odd-r offset.
    fn to_offset(self) -> Coord {
        let col = self.x + (self.z - (self.z & 1)) / 2;
        let row = self.z;
        Coord::new(col, row)
    }

    fn distance(self, other: Self) -> i32 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        let dz = (self.z - other.z).abs();
        (dx + dy + dz) / 2
    }
}

/// Coordinate and adjacency contract shared by the square and hex grids.
///
/// Implementations are stateless apart from their immutable configuration
/// (grid size and tile size). Neighbor enumeration is not bounds-filtered;
/// callers that care about grid bounds check validity themselves, and the
/// pathfinder's step budget guards against unbounded wandering.
pub trait GridGeometry {
    /// Logical grid dimension (the grid is `grid_size × grid_size` cells).
    fn grid_size(&self) -> i32;

    /// World-space size of one tile (square edge, or hex outer radius).
    fn tile_size(&self) -> f32;

    /// Cells reachable from `cell` at edge cost 1.
    fn neighbors(&self, cell: Coord) -> Vec<Coord>;

    /// World-space center of `cell`, relative to `origin`.
    fn tile_world_position(&self, cell: Coord, origin: (f32, f32)) -> (f32, f32);

    /// Nearest cell to an origin-relative world point. Round-trip with
    /// `tile_world_position` is exact for cell centers, approximate otherwise.
    fn world_to_grid(&self, x: f32, y: f32) -> Coord;

    /// All cells within `range` steps of `center` (a distance disk, center
    /// included). The order is arbitrary but deterministic: a pure function
    /// of `center` and `range`.
    fn cells_in_range(&self, center: Coord, range: i32) -> Vec<Coord>;

    /// Admissible, consistent distance estimate for unit edge costs.
    fn heuristic(&self, a: Coord, b: Coord) -> f32;
}

/// Square tessellation with 4-neighbor (orthogonal) adjacency.
#[derive(Debug, Clone)]
pub struct SquareGrid {
    grid_size: i32,
    tile_size: f32,
}

impl SquareGrid {
    pub fn new(grid_size: i32, tile_size: f32) -> Self {
        Self {
            grid_size,
            tile_size,
        }
    }
}

impl GridGeometry for SquareGrid {
    fn grid_size(&self) -> i32 {
        self.grid_size
    }

    fn tile_size(&self) -> f32 {
        self.tile_size
    }

    fn neighbors(&self, cell: Coord) -> Vec<Coord> {
        vec![
            cell.offset(1, 0),
            cell.offset(-1, 0),
            cell.offset(0, 1),
            cell.offset(0, -1),
        ]
    }

    fn tile_world_position(&self, cell: Coord, origin: (f32, f32)) -> (f32, f32) {
        (
            origin.0 + cell.col as f32 * self.tile_size,
            origin.1 + cell.row as f32 * self.tile_size,
        )
    }

    fn world_to_grid(&self, x: f32, y: f32) -> Coord {
        Coord::new(
            (x / self.tile_size).round() as i32,
            (y / self.tile_size).round() as i32,
        )
    }

    fn cells_in_range(&self, center: Coord, range: i32) -> Vec<Coord> {
        let mut result = Vec::new();
        for dc in -range..=range {
            for dr in -range..=range {
                if dc.abs() + dr.abs() > range {
                    continue;
                }
                result.push(center.offset(dc, dr));
            }
        }
        result
    }

    fn heuristic(&self, a: Coord, b: Coord) -> f32 {
        // Manhattan distance
        ((a.col - b.col).abs() + (a.row - b.row).abs()) as f32
    }
}

/// Hexagonal tessellation, odd-r offset layout, flat-top hexes.
///
/// `tile_size` is the outer radius (center to corner).
#[derive(Debug, Clone)]
pub struct HexGrid {
    grid_size: i32,
    tile_size: f32,
}

impl HexGrid {
    pub fn new(grid_size: i32, tile_size: f32) -> Self {
        Self {
            grid_size,
            tile_size,
        }
    }

    fn hex_metrics(&self) -> (f32, f32) {
        let width = self.tile_size * 2.0;
        let height = 3.0_f32.sqrt() * self.tile_size;
        (width, height)
    }
}

impl GridGeometry for HexGrid {
    fn grid_size(&self) -> i32 {
        self.grid_size
    }

    fn tile_size(&self) -> f32 {
        self.tile_size
    }

    fn neighbors(&self, cell: Coord) -> Vec<Coord> {
        // Odd-r layout: the neighbor template depends on row parity.
        let odd_row = cell.row % 2 != 0;
        if odd_row {
            vec![
                cell.offset(1, 0),
                cell.offset(0, 1),
                cell.offset(1, 1),
                cell.offset(-1, 0),
                cell.offset(0, -1),
                cell.offset(1, -1),
            ]
        } else {
            vec![
                cell.offset(1, 0),
                cell.offset(-1, 1),
                cell.offset(0, 1),
                cell.offset(-1, 0),
                cell.offset(-1, -1),
                cell.offset(0, -1),
            ]
        }
    }

    fn tile_world_position(&self, cell: Coord, origin: (f32, f32)) -> (f32, f32) {
        let (width, height) = self.hex_metrics();
        let x_step = width * 0.75;

        let row_shift = if cell.row % 2 == 0 { 0.0 } else { width * 0.5 };
        let x = cell.col as f32 * x_step + row_shift;
        let y = cell.row as f32 * (height * 0.5);

        (origin.0 + x, origin.1 + y)
    }

    fn world_to_grid(&self, x: f32, y: f32) -> Coord {
        let (width, height) = self.hex_metrics();
        let x_step = width * 0.75;

        let approx_row = (y / (height * 0.5)).round() as i32;
        let row_shift = if approx_row % 2 == 0 { 0.0 } else { width * 0.5 };
        let approx_col = ((x - row_shift) / x_step).round() as i32;

        Coord::new(approx_col, approx_row)
    }

    fn cells_in_range(&self, center: Coord, range: i32) -> Vec<Coord> {
        let center_cube = CubeCoord::from_offset(center);
        let mut result = Vec::new();

        for dx in -range..=range {
            let lo = (-range).max(-dx - range);
            let hi = range.min(-dx + range);
            for dy in lo..=hi {
                let dz = -dx - dy;
                let cube = CubeCoord {
                    x: center_cube.x + dx,
                    y: center_cube.y + dy,
                    z: center_cube.z + dz,
                };
                result.push(cube.to_offset());
            }
        }

        result
    }

    fn heuristic(&self, a: Coord, b: Coord) -> f32 {
        CubeCoord::from_offset(a).distance(CubeCoord::from_offset(b)) as f32
    }
}
