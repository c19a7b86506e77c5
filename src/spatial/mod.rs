//! Uniform spatial partition over the battlefield
//!
//! The grid serves two masters: perception (rectangular windows scanned each
//! tick) and exclusive occupancy (one regiment per tile).

pub mod grid;
pub mod tile;

pub use grid::{GridWindow, TileGrid};
pub use tile::{Tile, TileCoord};
