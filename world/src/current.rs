//! Ambient water-current flow field.

use glam::Vec2;
use theseus_core::{ObstacleGrid, TileCoord};

use crate::{index, GridError};

/// Fraction of a tile's full current magnitude felt by drifting objects.
pub const CURRENT_DAMPING: f32 = 0.12;

/// Dense per-tile velocity field stored in row-major order.
#[derive(Clone, Debug)]
pub struct CurrentField {
    columns: u32,
    rows: u32,
    resolution: f32,
    field: Vec<Vec2>,
}

impl CurrentField {
    /// Creates a still field covering `columns` by `rows` tiles of `resolution` world units.
    pub fn new(columns: u32, rows: u32, resolution: f32) -> Result<Self, GridError> {
        if columns == 0 || rows == 0 {
            return Err(GridError::ZeroDimensions { columns, rows });
        }
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(GridError::InvalidTileSize(resolution));
        }
        let cell_count = usize::try_from(u64::from(columns) * u64::from(rows))
            .map_err(|_| GridError::ZeroDimensions { columns, rows })?;

        Ok(Self {
            columns,
            rows,
            resolution,
            field: vec![Vec2::ZERO; cell_count],
        })
    }

    /// Builds the field from the current tiles of an obstacle grid.
    ///
    /// Every other tile contributes no flow.
    pub fn from_grid(grid: &impl ObstacleGrid) -> Result<Self, GridError> {
        let (columns, rows) = grid.dimensions();
        let mut field = Self::new(columns, rows, grid.tile_size())?;
        for row in 0..rows {
            for column in 0..columns {
                let tile = TileCoord::new(column, row);
                let flow = grid.obstacle_at(tile).flow();
                if flow != Vec2::ZERO {
                    field.set(tile, flow)?;
                }
            }
        }
        Ok(field)
    }

    /// Overrides the flow of a single tile.
    pub fn set(&mut self, tile: TileCoord, velocity: Vec2) -> Result<(), GridError> {
        let slot = self.slot(tile).ok_or(GridError::OutOfBounds {
            column: tile.column(),
            row: tile.row(),
            columns: self.columns,
            rows: self.rows,
        })?;
        self.field[slot] = velocity;
        Ok(())
    }

    /// Side length of one field tile in world units.
    #[must_use]
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// Full-strength flow of a tile, clamped onto the grid.
    #[must_use]
    pub fn velocity_at(&self, tile: TileCoord) -> Vec2 {
        let clamped = TileCoord::new(
            tile.column().min(self.columns - 1),
            tile.row().min(self.rows - 1),
        );
        self.slot(clamped)
            .and_then(|slot| self.field.get(slot).copied())
            .unwrap_or(Vec2::ZERO)
    }

    /// Full-strength flow of the tile containing `position`, clamped onto the grid.
    #[must_use]
    pub fn lookup(&self, position: Vec2) -> Vec2 {
        let column = clamp_index(position.x / self.resolution, self.columns);
        let row = clamp_index(position.y / self.resolution, self.rows);
        self.velocity_at(TileCoord::new(column, row))
    }

    /// Damped flow at `position`, blended bilinearly between neighbouring tile centres.
    ///
    /// Within half a tile of the grid edge the blend collapses to the edge
    /// tile along that axis instead of reaching past the boundary.
    #[must_use]
    pub fn interpolated_velocity(&self, position: Vec2) -> Vec2 {
        let (left, right, fx) = blend_axis(position.x / self.resolution, self.columns);
        let (bottom, top, fy) = blend_axis(position.y / self.resolution, self.rows);

        let lower = self
            .velocity_at(TileCoord::new(left, bottom))
            .lerp(self.velocity_at(TileCoord::new(right, bottom)), fx);
        let upper = self
            .velocity_at(TileCoord::new(left, top))
            .lerp(self.velocity_at(TileCoord::new(right, top)), fx);

        lower.lerp(upper, fy) * CURRENT_DAMPING
    }

    /// Drifts `position` along the damped flow for `dt` seconds.
    pub fn apply_to(&self, position: &mut Vec2, dt: f32) {
        *position += self.interpolated_velocity(*position) * dt;
    }

    fn slot(&self, tile: TileCoord) -> Option<usize> {
        if tile.column() >= self.columns || tile.row() >= self.rows {
            return None;
        }
        index(self.columns, tile)
    }
}

fn clamp_index(scaled: f32, count: u32) -> u32 {
    if !scaled.is_finite() || scaled <= 0.0 {
        return 0;
    }
    (scaled.floor() as u32).min(count - 1)
}

/// Lower tile, upper tile and blend weight along one axis, in tile-centre space.
fn blend_axis(scaled: f32, count: u32) -> (u32, u32, f32) {
    let last = count - 1;
    let centred = scaled - 0.5;
    if !centred.is_finite() || centred <= 0.0 {
        return (0, 0, 0.0);
    }

    let lower = centred.floor();
    if lower >= last as f32 {
        return (last, last, 0.0);
    }

    let lower_index = lower as u32;
    (lower_index, lower_index + 1, centred - lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_one(left: Vec2, right: Vec2) -> CurrentField {
        let mut field = CurrentField::new(2, 1, 1.0).expect("field builds");
        field.set(TileCoord::new(0, 0), left).expect("in bounds");
        field.set(TileCoord::new(1, 0), right).expect("in bounds");
        field
    }

    #[test]
    fn lookup_clamps_positions_to_the_grid() {
        let field = two_by_one(Vec2::X, Vec2::Y);
        assert_eq!(field.lookup(Vec2::new(-4.0, 0.5)), Vec2::X);
        assert_eq!(field.lookup(Vec2::new(1.2, 0.5)), Vec2::Y);
        assert_eq!(field.lookup(Vec2::new(40.0, 9.0)), Vec2::Y);
    }

    #[test]
    fn interpolation_blends_between_tile_centres() {
        let field = two_by_one(Vec2::new(2.0, 0.0), Vec2::new(0.0, 2.0));
        let midway = field.interpolated_velocity(Vec2::new(1.0, 0.5));
        let expected = Vec2::new(1.0, 1.0) * CURRENT_DAMPING;
        assert!((midway - expected).length() < 1e-6, "got {midway:?}");
    }

    #[test]
    fn interpolation_does_not_reach_past_the_edge() {
        let field = two_by_one(Vec2::new(2.0, 0.0), Vec2::new(0.0, 2.0));
        let near_left_wall = field.interpolated_velocity(Vec2::new(0.1, 0.1));
        assert!((near_left_wall - Vec2::new(2.0, 0.0) * CURRENT_DAMPING).length() < 1e-6);

        let near_right_wall = field.interpolated_velocity(Vec2::new(1.9, 0.9));
        assert!((near_right_wall - Vec2::new(0.0, 2.0) * CURRENT_DAMPING).length() < 1e-6);
    }

    #[test]
    fn apply_to_drifts_along_the_damped_flow() {
        let mut field = CurrentField::new(3, 3, 2.0).expect("field builds");
        for row in 0..3 {
            for column in 0..3 {
                field
                    .set(TileCoord::new(column, row), Vec2::new(5.0, 0.0))
                    .expect("in bounds");
            }
        }

        let mut position = Vec2::new(3.0, 3.0);
        field.apply_to(&mut position, 0.5);

        let expected = Vec2::new(3.0 + 5.0 * CURRENT_DAMPING * 0.5, 3.0);
        assert!((position - expected).length() < 1e-6, "got {position:?}");
    }
}
