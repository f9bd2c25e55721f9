//! Cost-priority variant of the first-step search.

use std::{cmp::Ordering, collections::BinaryHeap, f32::consts::SQRT_2};

use theseus_core::{ObstacleGrid, StepDirection, TileCoord};
use theseus_world::CurrentField;

use crate::{inherit, Navigator, SearchOutcome, SearchRequest, Visited};

/// Floor applied to the effective speed so head-on currents never stall a step outright.
pub const MIN_EFFECTIVE_SPEED: f32 = 0.25;

/// Estimated seconds needed to take `step` out of `from` at `speed`.
///
/// The step is split into two half-tile legs; each leg's speed is the mover's
/// own speed plus the projection of that tile's current onto the heading.
/// Returns infinity when the step leaves the grid.
#[must_use]
pub fn step_cost(
    grid: &impl ObstacleGrid,
    currents: &CurrentField,
    from: TileCoord,
    step: StepDirection,
    speed: f32,
) -> f32 {
    let (columns, rows) = grid.dimensions();
    let Some(to) = from.offset(step, columns, rows) else {
        return f32::INFINITY;
    };
    if step.is_none() {
        return 0.0;
    }

    let heading = step.heading();
    let mut half_leg = grid.tile_size() * 0.5;
    if step.is_diagonal() {
        half_leg *= SQRT_2;
    }

    let leaving = (speed + currents.velocity_at(from).dot(heading)).max(MIN_EFFECTIVE_SPEED);
    let entering = (speed + currents.velocity_at(to).dot(heading)).max(MIN_EFFECTIVE_SPEED);
    half_leg / leaving + half_leg / entering
}

impl<G> Navigator<'_, G>
where
    G: ObstacleGrid,
{
    /// First-step search that expands tiles in order of accumulated traversal time.
    ///
    /// Uses [`step_cost`] at the speed of the request's profile, so routes
    /// riding a current win over shorter routes fighting one.
    #[must_use]
    pub fn first_step_weighted(&self, request: SearchRequest) -> SearchOutcome {
        let (columns, rows) = self.grid.dimensions();
        if !self.enterable(request.origin) {
            return SearchOutcome::stranded(0);
        }

        let speed = self.speeds.speed(request.profile);
        let mut settled = Visited::new(columns, rows);
        let mut frontier = BinaryHeap::new();
        let mut sequence = 0_u32;
        frontier.push(Candidate {
            cost: 0.0,
            sequence,
            tile: request.origin,
            first_step: StepDirection::NONE,
            depth: 0,
        });

        let mut expansions = 0;
        while let Some(candidate) = frontier.pop() {
            if !settled.insert(candidate.tile) {
                continue;
            }

            if candidate.tile == request.goal {
                tracing::trace!(
                    origin = ?request.origin,
                    goal = ?request.goal,
                    cost = candidate.cost,
                    expansions,
                    "cost-priority search reached goal"
                );
                return SearchOutcome {
                    direction: candidate.first_step,
                    expansions,
                    reached: true,
                };
            }

            if candidate.depth >= request.max_depth {
                continue;
            }
            expansions += 1;

            for step in StepDirection::NEIGHBORS {
                let Some(next) = candidate.tile.offset(step, columns, rows) else {
                    continue;
                };
                if !self.enterable(next) {
                    continue;
                }

                sequence += 1;
                frontier.push(Candidate {
                    cost: candidate.cost
                        + step_cost(self.grid, self.currents, candidate.tile, step, speed),
                    sequence,
                    tile: next,
                    first_step: inherit(candidate.first_step, step),
                    depth: candidate.depth + 1,
                });
            }
        }

        tracing::trace!(
            origin = ?request.origin,
            goal = ?request.goal,
            expansions,
            "cost-priority search exhausted without reaching goal"
        );
        SearchOutcome::stranded(expansions)
    }
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    cost: f32,
    sequence: u32,
    tile: TileCoord,
    first_step: StepDirection,
    depth: u32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // Reversed so the max-heap pops the cheapest, then the oldest, candidate.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}
