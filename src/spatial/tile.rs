//! One cell of the battlefield grid

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Rect, Vec2};

/// Grid coordinate (column, row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub col: i32,
    pub row: i32,
}

impl TileCoord {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn offset(self, dcol: i32, drow: i32) -> Self {
        Self { col: self.col + dcol, row: self.row + drow }
    }
}

/// One cell: pixel bounds, forest density and at most one occupying regiment
///
/// Tiles are created once when the grid is built and never destroyed; only
/// `occupant` and (during generation) `forest` are mutated afterwards.
#[derive(Debug, Clone)]
pub struct Tile {
    pub coord: TileCoord,
    pub bounds: Rect,
    /// Accumulated forest density in [0, 1]
    pub forest: f32,
    /// Back-reference into the agent slab; `None` when the tile is free
    pub occupant: Option<AgentId>,
}

impl Tile {
    pub fn new(coord: TileCoord, tile_size: f32) -> Self {
        Self {
            coord,
            bounds: Rect::new(
                coord.col as f32 * tile_size,
                coord.row as f32 * tile_size,
                tile_size,
                tile_size,
            ),
            forest: 0.0,
            occupant: None,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.bounds.center()
    }

    pub fn in_forest(&self) -> bool {
        self.forest > 0.0
    }

    /// First-claim-wins occupancy; reclaiming one's own tile succeeds
    pub fn try_claim(&mut self, id: AgentId) -> bool {
        match self.occupant {
            None => {
                self.occupant = Some(id);
                true
            }
            Some(current) => current == id,
        }
    }

    pub fn release(&mut self) {
        self.occupant = None;
    }

    /// Add a forest contribution, saturating at full density
    pub fn deposit_forest(&mut self, amount: f32) {
        self.forest = (self.forest + amount.max(0.0)).min(1.0);
    }
}
