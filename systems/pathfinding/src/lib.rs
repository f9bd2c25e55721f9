#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tile path search that reports only the first move toward a goal.
//!
//! Every search owns its frontier and visited set for the duration of one
//! call and drops them on return, so a single [`Navigator`] can serve any
//! number of enemies in sequence without state leaking between them.

mod weighted;

use std::collections::VecDeque;

use theseus_core::{
    CellKind, ObstacleGrid, SearchVariant, SpeedProfile, SpeedTable, StepDirection, TileCoord,
};
use theseus_world::CurrentField;

pub use weighted::{step_cost, MIN_EFFECTIVE_SPEED};

/// Number of steps explored before a search gives up.
pub const DEFAULT_SEARCH_DEPTH: u32 = 30;

/// Parameters of a single first-step query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    /// Tile the mover currently occupies.
    pub origin: TileCoord,
    /// Tile the mover wants to reach.
    pub goal: TileCoord,
    /// Movement regime used when costs matter.
    pub profile: SpeedProfile,
    /// Maximum path length, in steps, that the search explores.
    pub max_depth: u32,
}

impl SearchRequest {
    /// Creates a request bounded by [`DEFAULT_SEARCH_DEPTH`].
    #[must_use]
    pub const fn new(origin: TileCoord, goal: TileCoord, profile: SpeedProfile) -> Self {
        Self {
            origin,
            goal,
            profile,
            max_depth: DEFAULT_SEARCH_DEPTH,
        }
    }

    /// Overrides the depth bound.
    #[must_use]
    pub const fn with_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Result of a first-step query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    /// First move along the best path found, or [`StepDirection::NONE`].
    pub direction: StepDirection,
    /// Number of tiles whose neighbours were examined.
    pub expansions: u32,
    /// Whether the goal was dequeued within the depth bound.
    pub reached: bool,
}

impl SearchOutcome {
    const fn stranded(expansions: u32) -> Self {
        Self {
            direction: StepDirection::NONE,
            expansions,
            reached: false,
        }
    }
}

/// Path search bound to a level's obstacle grid and current field.
#[derive(Debug)]
pub struct Navigator<'a, G> {
    grid: &'a G,
    currents: &'a CurrentField,
    speeds: SpeedTable,
}

impl<'a, G> Navigator<'a, G>
where
    G: ObstacleGrid,
{
    /// Creates a navigator reading from the provided level collaborators.
    #[must_use]
    pub fn new(grid: &'a G, currents: &'a CurrentField, speeds: SpeedTable) -> Self {
        Self {
            grid,
            currents,
            speeds,
        }
    }

    /// Runs the requested search variant.
    #[must_use]
    pub fn search(&self, variant: SearchVariant, request: SearchRequest) -> SearchOutcome {
        match variant {
            SearchVariant::BreadthFirst => self.first_step(request),
            SearchVariant::CostPriority => self.first_step_weighted(request),
        }
    }

    /// Breadth-first first-step search over the 8-connected neighbourhood.
    ///
    /// Nodes remember the move that left the origin, so the answer is read
    /// straight off the goal node once it is dequeued. Costs are ignored;
    /// ties resolve in [`StepDirection::NEIGHBORS`] order.
    #[must_use]
    pub fn first_step(&self, request: SearchRequest) -> SearchOutcome {
        let (columns, rows) = self.grid.dimensions();
        if !self.enterable(request.origin) {
            return SearchOutcome::stranded(0);
        }

        let mut visited = Visited::new(columns, rows);
        let mut frontier = VecDeque::new();
        let _ = visited.insert(request.origin);
        frontier.push_back(Node {
            tile: request.origin,
            first_step: StepDirection::NONE,
            depth: 0,
        });

        let mut expansions = 0;
        while let Some(node) = frontier.pop_front() {
            if node.tile == request.goal {
                tracing::trace!(
                    origin = ?request.origin,
                    goal = ?request.goal,
                    expansions,
                    "breadth-first search reached goal"
                );
                return SearchOutcome {
                    direction: node.first_step,
                    expansions,
                    reached: true,
                };
            }

            if node.depth >= request.max_depth {
                continue;
            }
            expansions += 1;

            for step in StepDirection::NEIGHBORS {
                let Some(next) = node.tile.offset(step, columns, rows) else {
                    continue;
                };
                if !self.enterable(next) || !visited.insert(next) {
                    continue;
                }

                frontier.push_back(Node {
                    tile: next,
                    first_step: inherit(node.first_step, step),
                    depth: node.depth + 1,
                });
            }
        }

        tracing::trace!(
            origin = ?request.origin,
            goal = ?request.goal,
            expansions,
            "breadth-first search exhausted without reaching goal"
        );
        SearchOutcome::stranded(expansions)
    }

    fn enterable(&self, tile: TileCoord) -> bool {
        let (columns, rows) = self.grid.dimensions();
        tile.column() < columns && tile.row() < rows && self.grid.obstacle_at(tile).is_passable()
    }
}

/// Closest treasure tile reachable from `origin` within `max_depth` steps.
///
/// Distance is measured in 8-connected steps; ties resolve in
/// [`StepDirection::NEIGHBORS`] order.
#[must_use]
pub fn nearest_treasure(
    grid: &impl ObstacleGrid,
    origin: TileCoord,
    max_depth: u32,
) -> Option<TileCoord> {
    let (columns, rows) = grid.dimensions();
    if origin.column() >= columns || origin.row() >= rows {
        return None;
    }

    let mut visited = Visited::new(columns, rows);
    let mut frontier = VecDeque::new();
    let _ = visited.insert(origin);
    frontier.push_back((origin, 0_u32));

    while let Some((tile, depth)) = frontier.pop_front() {
        if matches!(grid.obstacle_at(tile), CellKind::Treasure) {
            return Some(tile);
        }
        if depth >= max_depth {
            continue;
        }

        for step in StepDirection::NEIGHBORS {
            let Some(next) = tile.offset(step, columns, rows) else {
                continue;
            };
            if grid.obstacle_at(next).is_passable() && visited.insert(next) {
                frontier.push_back((next, depth + 1));
            }
        }
    }

    None
}

#[derive(Clone, Copy, Debug)]
struct Node {
    tile: TileCoord,
    first_step: StepDirection,
    depth: u32,
}

/// Direction recorded on a child node: the origin's children record their own step.
fn inherit(parent_first_step: StepDirection, step: StepDirection) -> StepDirection {
    if parent_first_step.is_none() {
        step
    } else {
        parent_first_step
    }
}

/// Dense per-call visited set.
#[derive(Debug)]
struct Visited {
    columns: u32,
    seen: Vec<bool>,
}

impl Visited {
    fn new(columns: u32, rows: u32) -> Self {
        let cell_count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            seen: vec![false; cell_count],
        }
    }

    /// Marks the tile, returning `true` when it had not been seen before.
    fn insert(&mut self, tile: TileCoord) -> bool {
        let Some(slot) = self.slot(tile).and_then(|slot| self.seen.get_mut(slot)) else {
            return false;
        };
        let fresh = !*slot;
        *slot = true;
        fresh
    }

    fn slot(&self, tile: TileCoord) -> Option<usize> {
        let columns = usize::try_from(self.columns).ok()?;
        let column = usize::try_from(tile.column()).ok()?;
        let row = usize::try_from(tile.row()).ok()?;
        row.checked_mul(columns)?.checked_add(column)
    }
}
