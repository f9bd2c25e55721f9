use theseus_core::{EnemyId, ObstacleGrid, Perception, PhysicsBody, TargetSnapshot};
use theseus_world::{line_of_sight, CurrentField};

use crate::{Enemy, EnemyReport};

/// An enemy paired with the physics body it steers.
#[derive(Debug)]
pub struct Member<P> {
    /// The enemy's decision state.
    pub enemy: Enemy,
    /// The enemy's physics body.
    pub body: P,
    in_sight: bool,
}

impl<P> Member<P> {
    /// Line of sight to the target as of the enemy's last perceiving tick.
    #[must_use]
    pub fn sees_target(&self) -> bool {
        self.in_sight
    }
}

/// Every enemy on a level, ticked in insertion order.
#[derive(Debug)]
pub struct Squad<P> {
    members: Vec<Member<P>>,
}

impl<P> Default for Squad<P> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<P> Squad<P>
where
    P: PhysicsBody,
{
    /// Creates an empty squad.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an enemy and its body.
    pub fn push(&mut self, enemy: Enemy, body: P) {
        self.members.push(Member {
            enemy,
            body,
            in_sight: false,
        });
    }

    /// Number of enemies, living or dead.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the squad has no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Enemies in tick order.
    #[must_use]
    pub fn members(&self) -> &[Member<P>] {
        &self.members
    }

    /// Mutable access to enemies and bodies, for integrating physics.
    pub fn members_mut(&mut self) -> &mut [Member<P>] {
        &mut self.members
    }

    /// Finds the enemy with the provided identifier.
    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Member<P>> {
        self.members
            .iter_mut()
            .find(|member| member.enemy.id() == id)
    }

    /// Ticks every living enemy once, appending a report per enemy to `out`.
    ///
    /// Each enemy perceives `target` through its own line of sight on `grid`,
    /// traced only on ticks where the enemy runs its sight checks; a missing
    /// target leaves every enemy alone.
    pub fn tick_all<G>(
        &mut self,
        dt: f32,
        target: Option<TargetSnapshot>,
        grid: &G,
        currents: &CurrentField,
        out: &mut Vec<EnemyReport>,
    ) where
        G: ObstacleGrid,
    {
        for member in &mut self.members {
            if member.enemy.is_terminal() {
                continue;
            }

            let perception = match target {
                Some(target) => {
                    if member.enemy.perceives_next_tick() {
                        member.in_sight =
                            line_of_sight(grid, member.body.position(), target.position);
                    }
                    if member.in_sight {
                        Perception::visible(target)
                    } else {
                        Perception::hidden(target)
                    }
                }
                None => {
                    member.in_sight = false;
                    Perception::alone()
                }
            };
            out.push(
                member
                    .enemy
                    .tick(dt, &mut member.body, perception, grid, currents),
            );
        }
    }
}
