//! Tile grid and rectangular windows over it

use crate::core::types::{AgentId, Circle, Rect, Vec2};
use crate::spatial::tile::{Tile, TileCoord};

/// Uniform grid of tiles covering the battlefield
///
/// Stored row-major in a flat `Vec`. Windows are coordinate ranges over the
/// same backing cells, never copies.
#[derive(Debug, Clone)]
pub struct TileGrid {
    cols: i32,
    rows: i32,
    tile_size: f32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Build a grid of `ceil(world / tile_size)` cells covering `world_size`
    pub fn new(world_size: Vec2, tile_size: f32) -> Self {
        let cols = (world_size.x / tile_size).ceil().max(1.0) as i32;
        let rows = (world_size.y / tile_size).ceil().max(1.0) as i32;
        let mut tiles = Vec::with_capacity((cols * rows) as usize);
        for row in 0..rows {
            for col in 0..cols {
                tiles.push(Tile::new(TileCoord::new(col, row), tile_size));
            }
        }
        Self { cols, rows, tile_size, tiles }
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Pixel-space rectangle covered by the whole grid
    pub fn pixel_area(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.cols as f32 * self.tile_size,
            self.rows as f32 * self.tile_size,
        )
    }

    fn contains(&self, coord: TileCoord) -> bool {
        coord.col >= 0 && coord.col < self.cols && coord.row >= 0 && coord.row < self.rows
    }

    fn index(&self, coord: TileCoord) -> Option<usize> {
        if self.contains(coord) {
            Some((coord.row * self.cols + coord.col) as usize)
        } else {
            None
        }
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.index(coord).map(|i| &self.tiles[i])
    }

    pub fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        self.index(coord).map(move |i| &mut self.tiles[i])
    }

    pub fn occupant(&self, coord: TileCoord) -> Option<AgentId> {
        self.tile(coord).and_then(|t| t.occupant)
    }

    /// Grid coordinate of the cell containing pixel point `p`
    ///
    /// A point outside the grid bounds is simply "not here": callers skip.
    pub fn point_to_coord(&self, p: Vec2) -> Option<TileCoord> {
        let coord = TileCoord::new(
            (p.x / self.tile_size).floor() as i32,
            (p.y / self.tile_size).floor() as i32,
        );
        self.contains(coord).then_some(coord)
    }

    pub fn point_to_tile(&self, p: Vec2) -> Option<&Tile> {
        self.point_to_coord(p).and_then(|c| self.tile(c))
    }

    /// Windowed view over the cells intersecting `area`
    ///
    /// The window is clamped to the grid bounds and empty if disjoint.
    pub fn window(&self, area: Rect) -> GridWindow {
        let col0 = (area.x / self.tile_size).floor() as i32;
        let row0 = (area.y / self.tile_size).floor() as i32;
        let col1 = (area.right() / self.tile_size).ceil() as i32;
        let row1 = (area.bottom() / self.tile_size).ceil() as i32;
        GridWindow {
            col0: col0.clamp(0, self.cols),
            row0: row0.clamp(0, self.rows),
            col1: col1.clamp(0, self.cols),
            row1: row1.clamp(0, self.rows),
        }
    }

    /// The up-to-8 (or up-to-4) adjacent tiles that exist on the grid
    pub fn neighbors(&self, coord: TileCoord, diagonals: bool) -> Vec<TileCoord> {
        let mut out = Vec::with_capacity(8);
        for drow in -1i32..=1 {
            for dcol in -1..=1 {
                if dcol == 0 && drow == 0 {
                    continue;
                }
                if !diagonals && (dcol + drow).abs() != 1 {
                    continue;
                }
                let n = coord.offset(dcol, drow);
                if self.contains(n) {
                    out.push(n);
                }
            }
        }
        out
    }

    /// Accumulate forest density from one copse
    ///
    /// Every tile under the copse's bounding box receives a contribution
    /// proportional to circular closeness to the copse center; per-tile
    /// density saturates at 1.0.
    pub fn register_forest(&mut self, copse: Circle) {
        let window = self.window(copse.bounding_rect());
        for coord in window.coords() {
            let center = match self.tile(coord) {
                Some(tile) => tile.center(),
                None => continue,
            };
            let amount = copse.closeness(center);
            if amount > 0.0 {
                if let Some(tile) = self.tile_mut(coord) {
                    tile.deposit_forest(amount);
                }
            }
        }
    }
}

/// Rectangular coordinate range over a grid
///
/// Iteration is row-major (left-to-right, top-to-bottom), finite and
/// restartable; the window holds no tile data of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridWindow {
    pub col0: i32,
    pub row0: i32,
    /// Exclusive column end
    pub col1: i32,
    /// Exclusive row end
    pub row1: i32,
}

impl GridWindow {
    pub fn is_empty(&self) -> bool {
        self.col1 <= self.col0 || self.row1 <= self.row0
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            ((self.col1 - self.col0) * (self.row1 - self.row0)) as usize
        }
    }

    pub fn coords(self) -> impl Iterator<Item = TileCoord> {
        (self.row0..self.row1)
            .flat_map(move |row| (self.col0..self.col1).map(move |col| TileCoord::new(col, row)))
    }
}
