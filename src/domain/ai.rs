/// Enemy locomotion decisions.
///
/// Two patterns:
///   1. **Patrol**: goombas and koopas walk one pixel per tick, turning
///      around at walls and ledges (see `rules::walker_probe`).
///   2. **Turret**: piranhas never move; they face the player while the
///      player is in their row and shoot on a cooldown.
///
/// Decisions read the world through `Ctx` and return what to do; the
/// caller applies the result to the actor.

use super::entity::{Actor, Facing, Player};
use super::physics::{self, Query};
use super::rules;

/// Read-only view of the world for enemy decisions.
pub struct Ctx<'a> {
    pub player: &'a Player,
    pub actors: &'a [Actor],
}

impl<'a> Ctx<'a> {
    fn terrain_at(&self, x: i32, y: i32) -> bool {
        physics::find_occupant(self.player, self.actors, x, y, Query::Collidable).is_some()
    }
}

// ── Patrol ──

/// Result of one patrol tick: the (possibly reversed) facing and new x.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PatrolMove {
    pub facing: Facing,
    pub x: i32,
}

pub fn patrol(ctx: &Ctx, x: i32, y: i32, facing: Facing) -> PatrolMove {
    let probe = rules::walker_probe(x, y, facing);
    let wall = ctx.terrain_at(probe.wall.0, probe.wall.1);
    let floor = ctx.terrain_at(probe.floor.0, probe.floor.1);
    let facing = if wall || !floor { facing.reversed() } else { facing };

    // Re-probe in the new direction. Only a wall stops the step: a missing
    // floor still allows one more pixel.
    let probe = rules::walker_probe(x, y, facing);
    if ctx.terrain_at(probe.wall.0, probe.wall.1) {
        return PatrolMove { facing, x };
    }
    PatrolMove { facing, x: x + facing.dx() }
}

// ── Turret ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TurretAction {
    /// Player out of the vertical band: nothing changes.
    Idle,
    /// Turn toward the player; cooldown counts down by one.
    Reload(Facing),
    /// Turn toward the player; cooldown ready but player out of range.
    Aim(Facing),
    /// Turn toward the player and shoot.
    Fire(Facing),
}

pub fn turret(player: &Player, x: i32, y: i32, firing_delay: u32) -> TurretAction {
    if !rules::piranha_sees_row(y, player.y) {
        return TurretAction::Idle;
    }
    let facing = rules::face_toward(x, player.x);
    if firing_delay > 0 {
        return TurretAction::Reload(facing);
    }
    if rules::piranha_in_range(x, player.x) {
        TurretAction::Fire(facing)
    } else {
        TurretAction::Aim(facing)
    }
}
