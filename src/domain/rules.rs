/// Gameplay rules: constants and pure decisions, no side effects.
///
/// ## Step sizes (pixels)
///
/// ┌──────────────────────┬──────────────┐
/// │ Mover                │ Per tick     │
/// ├──────────────────────┼──────────────┤
/// │ Player walk / fall   │ half cell    │
/// │ Player jump          │ half cell up │
/// │ Projectile           │ quarter cell │
/// │ Ground walker        │ 1 pixel      │
/// └──────────────────────┴──────────────┘
///
/// ## Ground-walker probe
///
/// The wall probe and the floor probe both look one pixel further ahead
/// when facing right than when facing left:
///
///   facing left : wall at x-1,  floor at x-8 (one row down)
///   facing right: wall at x+2,  floor at x+9 (one row down)
///
/// Walkers therefore turn one pixel early when heading right. Level layouts
/// and fixtures depend on this asymmetry; keep it.

use super::entity::{Facing, Goodie};
use super::physics::{SPRITE_HEIGHT, SPRITE_WIDTH};

pub const PLAYER_STEP_X: i32 = SPRITE_WIDTH / 2;
pub const PLAYER_STEP_Y: i32 = SPRITE_HEIGHT / 2;
pub const PROJECTILE_STEP_X: i32 = SPRITE_WIDTH / 4;
pub const PROJECTILE_STEP_Y: i32 = SPRITE_HEIGHT / 4;

pub const JUMP_DISTANCE: i32 = 8;
pub const BOOSTED_JUMP_DISTANCE: i32 = 12;
pub const FIRE_COOLDOWN: u32 = 8;

pub const PIRANHA_FIRE_DELAY: u32 = 40;
/// Horizontal firing range: strictly closer than 8 cells. A player 8 or
/// more cells away is aimed at but never shot.
pub const PIRANHA_RANGE: i32 = 8 * SPRITE_WIDTH;

pub const ENEMY_SCORE: u32 = 100;
pub const LEVEL_END_SCORE: u32 = 1000;

/// Jump length in half-cell steps.
pub fn jump_distance(jump_boost: bool) -> i32 {
    if jump_boost { BOOSTED_JUMP_DISTANCE } else { JUMP_DISTANCE }
}

pub fn goodie_score(goodie: Goodie) -> u32 {
    match goodie {
        Goodie::Mushroom => 75,
        Goodie::Flower => 50,
        Goodie::Star => 100,
    }
}

/// Where a player fireball appears: half a cell ahead of the player.
pub fn fireball_spawn_x(x: i32, facing: Facing) -> i32 {
    x + facing.dx() * SPRITE_WIDTH / 2
}

/// Probe points a ground walker checks before stepping.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WalkerProbe {
    pub wall: (i32, i32),
    pub floor: (i32, i32),
}

/// See the asymmetry note at the top of this module.
pub fn walker_probe(x: i32, y: i32, facing: Facing) -> WalkerProbe {
    let dx = facing.dx();
    let cx = if facing == Facing::Right { dx + 1 } else { dx };
    WalkerProbe {
        wall: (x + cx, y),
        floor: (x + dx * (SPRITE_WIDTH - 1) + cx, y - 1),
    }
}

/// Is the player within the piranha's vertical band (1.5 cells)?
pub fn piranha_sees_row(piranha_y: i32, player_y: i32) -> bool {
    2 * (piranha_y - player_y).abs() <= 3 * SPRITE_HEIGHT
}

/// Is the player close enough horizontally to be shot at?
pub fn piranha_in_range(piranha_x: i32, player_x: i32) -> bool {
    (piranha_x - player_x).abs() < PIRANHA_RANGE
}

/// Facing that points from `x` toward `target_x` (ties face left).
pub fn face_toward(x: i32, target_x: i32) -> Facing {
    if x < target_x { Facing::Right } else { Facing::Left }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_boost_lengthens_jump() {
        assert_eq!(jump_distance(false), 8);
        assert_eq!(jump_distance(true), 12);
    }

    #[test]
    fn goodie_scores() {
        assert_eq!(goodie_score(Goodie::Mushroom), 75);
        assert_eq!(goodie_score(Goodie::Flower), 50);
        assert_eq!(goodie_score(Goodie::Star), 100);
    }

    #[test]
    fn fireball_spawns_half_cell_ahead() {
        assert_eq!(fireball_spawn_x(40, Facing::Right), 44);
        assert_eq!(fireball_spawn_x(40, Facing::Left), 36);
    }

    #[test]
    fn walker_probe_is_asymmetric() {
        let left = walker_probe(80, 16, Facing::Left);
        assert_eq!(left.wall, (79, 16));
        assert_eq!(left.floor, (72, 15));

        let right = walker_probe(80, 16, Facing::Right);
        assert_eq!(right.wall, (82, 16));
        assert_eq!(right.floor, (89, 15));
    }

    #[test]
    fn piranha_band_is_one_and_a_half_cells() {
        assert!(piranha_sees_row(64, 64));
        assert!(piranha_sees_row(64, 76));
        assert!(!piranha_sees_row(64, 77));
        assert!(piranha_sees_row(64, 52));
        assert!(!piranha_sees_row(64, 51));
    }

    #[test]
    fn piranha_range_is_exclusive() {
        assert!(piranha_in_range(100, 100 + 63));
        assert!(!piranha_in_range(100, 100 + 64));
        assert!(piranha_in_range(100, 100 - 63));
        // Ten cells out is well past the range.
        assert!(!piranha_in_range(100, 100 + 10 * SPRITE_WIDTH));
    }

    #[test]
    fn face_toward_target() {
        assert_eq!(face_toward(0, 10), Facing::Right);
        assert_eq!(face_toward(10, 0), Facing::Left);
        assert_eq!(face_toward(5, 5), Facing::Left);
    }
}
