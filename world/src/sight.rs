use glam::Vec2;
use theseus_core::{ObstacleGrid, TileCoord};

/// Whether the straight segment between two positions crosses only passable tiles.
///
/// Walks every tile the segment touches, in order, and stops at the first
/// terrain tile. Positions off the grid are never visible.
#[must_use]
pub fn line_of_sight(grid: &impl ObstacleGrid, from: Vec2, to: Vec2) -> bool {
    let (Some(start), Some(goal)) = (grid.tile_at(from), grid.tile_at(to)) else {
        return false;
    };

    let size = grid.tile_size();
    let delta = to - from;
    let (step_column, mut t_max_x, t_delta_x) = axis_walk(from.x, delta.x, start.column(), size);
    let (step_row, mut t_max_y, t_delta_y) = axis_walk(from.y, delta.y, start.row(), size);

    let mut column = start.column() as i32;
    let mut row = start.row() as i32;
    let budget = start.column().abs_diff(goal.column()) + start.row().abs_diff(goal.row()) + 1;

    for _ in 0..=budget {
        let tile = TileCoord::new(column.unsigned_abs(), row.unsigned_abs());
        if !grid.obstacle_at(tile).is_passable() {
            return false;
        }
        if tile == goal {
            return true;
        }

        if t_max_x < t_max_y {
            column += step_column;
            t_max_x += t_delta_x;
        } else {
            row += step_row;
            t_max_y += t_delta_y;
        }

        if !grid.in_bounds(column, row) {
            return false;
        }
    }

    false
}

/// Step sign, parameter of the first boundary crossing, and parameter spacing along one axis.
fn axis_walk(origin: f32, delta: f32, index: u32, size: f32) -> (i32, f32, f32) {
    if delta == 0.0 {
        return (0, f32::INFINITY, f32::INFINITY);
    }

    let boundary = if delta > 0.0 {
        (index as f32 + 1.0) * size
    } else {
        index as f32 * size
    };
    let step = if delta > 0.0 { 1 } else { -1 };
    (step, (boundary - origin) / delta, size / delta.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LevelGrid;
    use theseus_core::CellKind;

    fn grid_with_rock(rock: TileCoord) -> LevelGrid {
        LevelGrid::new(6, 6, 1.0)
            .and_then(|grid| grid.with_cell(rock, CellKind::Terrain))
            .expect("grid builds")
    }

    #[test]
    fn open_water_is_transparent() {
        let grid = grid_with_rock(TileCoord::new(5, 0));
        assert!(line_of_sight(
            &grid,
            Vec2::new(0.5, 0.5),
            Vec2::new(4.5, 5.5)
        ));
    }

    #[test]
    fn terrain_between_blocks_sight() {
        let grid = grid_with_rock(TileCoord::new(2, 2));
        assert!(!line_of_sight(
            &grid,
            Vec2::new(0.5, 0.5),
            Vec2::new(4.5, 4.5)
        ));
        assert!(!line_of_sight(
            &grid,
            Vec2::new(2.5, 0.5),
            Vec2::new(2.5, 5.5)
        ));
    }

    #[test]
    fn terrain_beside_the_line_does_not_block() {
        let grid = grid_with_rock(TileCoord::new(2, 3));
        assert!(line_of_sight(
            &grid,
            Vec2::new(0.5, 1.5),
            Vec2::new(5.5, 1.5)
        ));
    }

    #[test]
    fn off_grid_targets_are_hidden() {
        let grid = grid_with_rock(TileCoord::new(5, 5));
        assert!(!line_of_sight(
            &grid,
            Vec2::new(0.5, 0.5),
            Vec2::new(-3.0, 0.5)
        ));
    }
}
