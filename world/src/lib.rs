#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level-side collaborators consumed by the enemy AI.
//!
//! The [`LevelGrid`] is the reference [`ObstacleGrid`] implementation, the
//! [`CurrentField`] turns current tiles into a continuous flow, and
//! [`line_of_sight`] answers the visibility question the physics ray cast
//! answers in game. [`PointMass`] is a deliberately simple body used by the
//! harness and tests wherever a real physics engine would sit.

mod body;
mod current;
mod sight;

use theseus_core::{CellKind, ObstacleGrid, TileCoord};
use thiserror::Error;

pub use body::PointMass;
pub use current::{CurrentField, CURRENT_DAMPING};
pub use sight::line_of_sight;

/// Reasons a grid cannot be built or edited.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GridError {
    /// One of the dimensions is zero.
    #[error("grid dimensions must be non-zero (got {columns}x{rows})")]
    ZeroDimensions {
        /// Requested number of columns.
        columns: u32,
        /// Requested number of rows.
        rows: u32,
    },
    /// The tile size is not a positive finite number.
    #[error("tile size must be positive and finite (got {0})")]
    InvalidTileSize(f32),
    /// A tile lies outside the grid.
    #[error("tile ({column}, {row}) lies outside the {columns}x{rows} grid")]
    OutOfBounds {
        /// Column of the rejected tile.
        column: u32,
        /// Row of the rejected tile.
        row: u32,
        /// Number of columns in the grid.
        columns: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
}

/// Dense row-major obstacle map owned by the level.
#[derive(Clone, Debug)]
pub struct LevelGrid {
    columns: u32,
    rows: u32,
    tile_size: f32,
    cells: Vec<CellKind>,
}

impl LevelGrid {
    /// Creates an open grid of the provided dimensions.
    pub fn new(columns: u32, rows: u32, tile_size: f32) -> Result<Self, GridError> {
        if columns == 0 || rows == 0 {
            return Err(GridError::ZeroDimensions { columns, rows });
        }
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(GridError::InvalidTileSize(tile_size));
        }

        let cell_count = usize::try_from(u64::from(columns) * u64::from(rows))
            .map_err(|_| GridError::ZeroDimensions { columns, rows })?;

        Ok(Self {
            columns,
            rows,
            tile_size,
            cells: vec![CellKind::Empty; cell_count],
        })
    }

    /// Replaces the occupant of a tile.
    pub fn set(&mut self, tile: TileCoord, kind: CellKind) -> Result<(), GridError> {
        let offset = self.offset(tile).ok_or(GridError::OutOfBounds {
            column: tile.column(),
            row: tile.row(),
            columns: self.columns,
            rows: self.rows,
        })?;
        self.cells[offset] = kind;
        Ok(())
    }

    /// Builder-style variant of [`LevelGrid::set`].
    pub fn with_cell(mut self, tile: TileCoord, kind: CellKind) -> Result<Self, GridError> {
        self.set(tile, kind)?;
        Ok(self)
    }

    /// Occupants stored in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[CellKind] {
        &self.cells
    }

    /// Tiles currently holding treasure, in row-major order.
    pub fn treasures(&self) -> impl Iterator<Item = TileCoord> + '_ {
        let columns = self.columns;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, kind)| matches!(kind, CellKind::Treasure))
            .filter_map(move |(offset, _)| {
                let offset = u32::try_from(offset).ok()?;
                Some(TileCoord::new(offset % columns, offset / columns))
            })
    }

    fn offset(&self, tile: TileCoord) -> Option<usize> {
        if tile.column() >= self.columns || tile.row() >= self.rows {
            return None;
        }
        index(self.columns, tile)
    }
}

impl ObstacleGrid for LevelGrid {
    fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn obstacle_at(&self, tile: TileCoord) -> CellKind {
        debug_assert!(
            tile.column() < self.columns && tile.row() < self.rows,
            "obstacle_at called with out-of-bounds tile {tile:?}"
        );
        self.offset(tile)
            .and_then(|offset| self.cells.get(offset).copied())
            .unwrap_or(CellKind::Terrain)
    }

    fn tile_size(&self) -> f32 {
        self.tile_size
    }
}

pub(crate) fn index(width: u32, tile: TileCoord) -> Option<usize> {
    let width = usize::try_from(width).ok()?;
    let column = usize::try_from(tile.column()).ok()?;
    let row = usize::try_from(tile.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
