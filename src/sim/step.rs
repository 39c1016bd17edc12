/// The tick function: advances the world by one step.
///
/// Processing order:
///   1. Player turn (skipped once dead)
///   2. Actor turns in collection order; before each, a player killed
///      earlier this tick aborts the pass
///   3. Level / game completion flags
///   4. Sweep dead actors
///   5. Status text
///
/// Actors spawned during the pass are appended past the snapshot length
/// and first act on the next tick.

use crate::domain::entity::{Facing, PlayerInput};
use crate::domain::physics::{Occupant, Query};
use crate::domain::rules::{self, FIRE_COOLDOWN, PLAYER_STEP_X, PLAYER_STEP_Y};
use super::behavior;
use super::event::GameEvent;
use super::world::{TickStatus, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn tick(world: &mut WorldState, input: Option<PlayerInput>) -> TickStatus {
    world.tick += 1;

    // Anything spawned from here on, by the player included, waits a tick.
    let count = world.actors.len();

    if world.player.alive {
        resolve_player(world, input);
    }

    for idx in 0..count {
        if !world.player.alive {
            return player_died(world);
        }
        behavior::act(world, idx);
    }

    if world.finished_level {
        world.finished_level = false;
        world.cue(GameEvent::LevelFinished);
        log::info!("level {} finished at tick {}, score {}", world.level, world.tick, world.score);
        return TickStatus::LevelFinished;
    }
    if world.finished_game {
        world.finished_game = false;
        world.cue(GameEvent::GameWon);
        log::info!("game won on level {} at tick {}, score {}", world.level, world.tick, world.score);
        return TickStatus::GameWon;
    }

    world.reap();
    world.refresh_status_text();
    TickStatus::Continue
}

fn player_died(world: &mut WorldState) -> TickStatus {
    world.cue(GameEvent::PlayerDied);
    world.lives = world.lives.saturating_sub(1);
    log::info!("player died on level {} at tick {}, {} lives left", world.level, world.tick, world.lives);
    TickStatus::PlayerDied
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player(world: &mut WorldState, input: Option<PlayerInput>) {
    world.player.tick_timers();
    resolve_star_kill(world);
    resolve_vertical(world);

    let blocked_by = resolve_input(world, input);
    if let Some(target) = blocked_by {
        behavior::bonk(world, target);
    }
}

/// With star power, any live enemy the player touches dies.
fn resolve_star_kill(world: &mut WorldState) {
    if !world.player.has_star_power() { return; }

    let (x, y) = (world.player.x, world.player.y);
    if let Some(Occupant::Actor(idx)) = world.find_occupant(x, y, Query::Contact) {
        let hit = world.actors[idx];
        if hit.alive && hit.is_damageable() {
            world.cue(GameEvent::Kick);
            behavior::bonk(world, Occupant::Actor(idx));
        }
    }
}

/// Rise while a jump is in progress (bonking whatever is overhead), else fall.
fn resolve_vertical(world: &mut WorldState) {
    let (x, y) = (world.player.x, world.player.y);

    if world.player.jump_distance > 0 {
        match world.find_occupant(x, y + PLAYER_STEP_Y, Query::Collidable) {
            Some(overhead) => {
                behavior::bonk(world, overhead);
                world.player.jump_distance = 0;
            }
            None => {
                world.player.y += PLAYER_STEP_Y;
                world.player.jump_distance -= 1;
            }
        }
    } else if !world.blocked(x, y - PLAYER_STEP_Y) {
        world.player.y -= PLAYER_STEP_Y;
    }
}

/// Apply this tick's action. Returns the terrain that blocked a walk, which
/// the caller bonks.
fn resolve_input(world: &mut WorldState, input: Option<PlayerInput>) -> Option<Occupant> {
    let action = input?;
    let (x, y) = (world.player.x, world.player.y);

    match action {
        PlayerInput::Left | PlayerInput::Right => {
            let facing = if action == PlayerInput::Left { Facing::Left } else { Facing::Right };
            world.player.facing = facing;
            let nx = x + facing.dx() * PLAYER_STEP_X;
            let wall = world.find_occupant(nx, y, Query::Collidable);
            if wall.is_none() {
                world.player.x = nx;
            }
            wall
        }
        PlayerInput::Jump => {
            if world.blocked(x, y - PLAYER_STEP_Y) {
                world.cue(GameEvent::Jump);
                world.player.jump_distance = rules::jump_distance(world.player.jump_boost);
            }
            None
        }
        PlayerInput::Fire => {
            let p = &world.player;
            if p.shoot_boost && p.fire_cooldown == 0 {
                let facing = p.facing;
                world.cue(GameEvent::Fire);
                world.player.fire_cooldown = FIRE_COOLDOWN;
                world.spawn_fireball(true, rules::fireball_spawn_x(x, facing), y, facing);
            }
            None
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{ActorKind, Goodie};
    use crate::domain::entity::STAR_TICKS;

    /// Player standing on a floor of blocks spanning columns [0, 20).
    fn flat_world(px: i32) -> WorldState {
        let mut w = WorldState::with_seed(3);
        for c in 0..20 {
            w.spawn(ActorKind::Block { goodie: None }, c * 8, 0, Facing::Right);
        }
        w.player.x = px;
        w.player.y = 8;
        w
    }

    fn count(w: &WorldState, kind: ActorKind) -> usize {
        w.actors.iter().filter(|a| a.kind == kind).count()
    }

    #[test]
    fn standing_player_stays_put() {
        let mut w = flat_world(40);
        assert_eq!(tick(&mut w, None), TickStatus::Continue);
        assert_eq!((w.player.x, w.player.y), (40, 8));
    }

    #[test]
    fn unsupported_player_falls_half_cell() {
        let mut w = flat_world(40);
        w.player.y = 24;
        tick(&mut w, None);
        assert_eq!(w.player.y, 20);
    }

    #[test]
    fn walking_moves_half_cell_and_turns() {
        let mut w = flat_world(40);
        tick(&mut w, Some(PlayerInput::Left));
        assert_eq!((w.player.x, w.player.facing), (36, Facing::Left));
        tick(&mut w, Some(PlayerInput::Right));
        assert_eq!((w.player.x, w.player.facing), (40, Facing::Right));
    }

    #[test]
    fn walking_into_wall_bonks_it() {
        let mut w = flat_world(40);
        w.spawn(ActorKind::Pipe, 48, 8, Facing::Right);
        tick(&mut w, Some(PlayerInput::Right));
        assert_eq!(w.player.x, 40);
        assert_eq!(w.take_events(), vec![GameEvent::Bonk]);
    }

    #[test]
    fn jump_needs_floor_and_rises_each_tick() {
        let mut w = flat_world(40);
        tick(&mut w, Some(PlayerInput::Jump));
        assert_eq!(w.player.jump_distance, rules::JUMP_DISTANCE);
        assert_eq!(w.take_events(), vec![GameEvent::Jump]);
        tick(&mut w, None);
        assert_eq!(w.player.y, 12);
        assert_eq!(w.player.jump_distance, rules::JUMP_DISTANCE - 1);

        // Mid-air: no floor, no new jump.
        tick(&mut w, Some(PlayerInput::Jump));
        assert!(w.take_events().is_empty());
    }

    #[test]
    fn boosted_jump_goes_further() {
        let mut w = flat_world(40);
        w.player.jump_boost = true;
        tick(&mut w, Some(PlayerInput::Jump));
        assert_eq!(w.player.jump_distance, rules::BOOSTED_JUMP_DISTANCE);
    }

    #[test]
    fn fire_needs_flower_and_cooldown() {
        let mut w = flat_world(40);
        tick(&mut w, Some(PlayerInput::Fire));
        assert_eq!(count(&w, ActorKind::PlayerFireball), 0);

        w.player.shoot_boost = true;
        tick(&mut w, Some(PlayerInput::Fire));
        assert_eq!(count(&w, ActorKind::PlayerFireball), 1);
        let ball = w.actors.iter().find(|a| a.kind == ActorKind::PlayerFireball).map(|a| (a.x, a.y, a.facing));
        assert_eq!(ball, Some((44, 8, Facing::Right)));
        assert_eq!(w.player.fire_cooldown, FIRE_COOLDOWN);

        tick(&mut w, Some(PlayerInput::Fire));
        assert_eq!(count(&w, ActorKind::PlayerFireball), 1);
    }

    #[test]
    fn one_hit_player_dies_without_hurt_cue() {
        let mut w = flat_world(40);
        w.spawn(ActorKind::Goomba, 44, 8, Facing::Left);
        w.take_events();

        // The goomba is the last actor: death shows on the next pass.
        assert_eq!(tick(&mut w, None), TickStatus::Continue);
        assert!(!w.player.alive);
        assert_eq!(w.player.hit_points, 0);
        assert!(!w.take_events().contains(&GameEvent::Hurt));

        assert_eq!(tick(&mut w, None), TickStatus::PlayerDied);
        assert_eq!(w.lives, 2);
        assert_eq!(w.take_events(), vec![GameEvent::PlayerDied]);
    }

    #[test]
    fn death_aborts_the_actor_pass() {
        let mut w = WorldState::with_seed(3);
        w.player.x = 40;
        w.player.y = 8;
        w.spawn(ActorKind::Goomba, 44, 8, Facing::Left);
        w.spawn(ActorKind::Powerup(Goodie::Star), 200, 200, Facing::Right);

        assert_eq!(tick(&mut w, None), TickStatus::PlayerDied);
        assert_eq!(w.lives, 2);
        // The power-up never got its turn.
        assert_eq!((w.actors[1].x, w.actors[1].y), (200, 200));
    }

    #[test]
    fn mushroom_block_from_below_then_collect() {
        let mut w = flat_world(40);
        let b = w.spawn(ActorKind::Block { goodie: Some(Goodie::Mushroom) }, 40, 24, Facing::Right);
        w.player.jump_distance = 2;
        w.player.y = 16;

        // Overhead probe at y+4 = 20 touches the block at 24.
        tick(&mut w, None);
        assert_eq!(w.actors[b].kind, ActorKind::Block { goodie: None });
        assert_eq!(w.player.jump_distance, 0);
        let shroom = w.actors.iter().position(|a| a.kind == ActorKind::Powerup(Goodie::Mushroom));
        let shroom = match shroom { Some(i) => i, None => panic!("no mushroom spawned") };
        assert_eq!((w.actors[shroom].x, w.actors[shroom].y), (40, 32));
        assert!(w.take_events().contains(&GameEvent::PowerupAppears));

        // Bring the player to the mushroom and let it act.
        w.player.y = 32;
        tick(&mut w, None);
        assert_eq!(w.player.hit_points, 2);
        assert!(w.player.jump_boost);
        assert_eq!(w.score, 75);
        assert_eq!(count(&w, ActorKind::Powerup(Goodie::Mushroom)), 0);
    }

    #[test]
    fn emptied_block_never_spawns_again() {
        let mut w = flat_world(40);
        w.spawn(ActorKind::Block { goodie: Some(Goodie::Star) }, 48, 8, Facing::Right);
        tick(&mut w, Some(PlayerInput::Right));
        tick(&mut w, Some(PlayerInput::Right));
        assert_eq!(count(&w, ActorKind::Powerup(Goodie::Star)), 1);
        let events = w.take_events();
        assert_eq!(events.iter().filter(|e| **e == GameEvent::PowerupAppears).count(), 1);
        assert_eq!(events.iter().filter(|e| **e == GameEvent::Bonk).count(), 1);
    }

    #[test]
    fn koopa_shot_leaves_shell() {
        let mut w = flat_world(16);
        w.player.shoot_boost = true;
        w.spawn(ActorKind::Koopa, 26, 8, Facing::Left);

        tick(&mut w, Some(PlayerInput::Fire));
        // The koopa walks onto the fireball at x=20 before it moves.
        tick(&mut w, None);
        assert_eq!(count(&w, ActorKind::Koopa), 0);
        assert_eq!(count(&w, ActorKind::Shell), 1);
        assert_eq!(w.score, 100);
    }

    #[test]
    fn flag_finishes_level_and_keeps_state() {
        let mut w = flat_world(40);
        w.spawn(ActorKind::Flag, 44, 8, Facing::Right);
        w.spawn(ActorKind::Goomba, 120, 8, Facing::Left);

        assert_eq!(tick(&mut w, None), TickStatus::LevelFinished);
        assert_eq!(w.score, 1000);
        assert!(!w.finished_level);
        assert_eq!(w.take_events(), vec![GameEvent::LevelFinished]);
        // No sweep on a terminal tick.
        assert_eq!(w.actors.len(), 22);
    }

    #[test]
    fn mario_wins_the_game() {
        let mut w = flat_world(40);
        w.spawn(ActorKind::Mario, 36, 8, Facing::Right);
        assert_eq!(tick(&mut w, None), TickStatus::GameWon);
        assert_eq!(w.score, 1000);
        assert_eq!(w.take_events(), vec![GameEvent::GameWon]);
    }

    #[test]
    fn piranha_fires_at_close_player_only() {
        let mut w = flat_world(8);
        let r = w.spawn(ActorKind::Piranha { firing_delay: 0, anim_frame: 0 }, 64, 8, Facing::Left);
        tick(&mut w, None);
        assert_eq!(count(&w, ActorKind::PiranhaFireball), 1);
        assert_eq!(w.actors[r].facing, Facing::Left);
        assert!(matches!(w.actors[r].kind, ActorKind::Piranha { firing_delay: 40, .. }));
        assert!(w.take_events().contains(&GameEvent::PiranhaFire));

        let mut far = flat_world(0);
        let r = far.spawn(ActorKind::Piranha { firing_delay: 0, anim_frame: 0 }, 160, 8, Facing::Left);
        tick(&mut far, None);
        assert_eq!(count(&far, ActorKind::PiranhaFireball), 0);
        assert!(matches!(far.actors[r].kind, ActorKind::Piranha { firing_delay: 0, .. }));
    }

    #[test]
    fn star_power_kills_touched_enemy() {
        let mut w = flat_world(40);
        w.player.apply_powerup(Goodie::Star);
        w.spawn(ActorKind::Goomba, 44, 8, Facing::Left);
        assert_eq!(tick(&mut w, None), TickStatus::Continue);
        assert!(w.player.alive);
        assert_eq!(count(&w, ActorKind::Goomba), 0);
        assert_eq!(w.score, 100);
        assert_eq!(w.player.star_ticks, STAR_TICKS - 1);
        assert!(w.take_events().contains(&GameEvent::Kick));
    }

    #[test]
    fn dead_actors_are_swept_at_end_of_tick() {
        let mut w = flat_world(40);
        let g = w.spawn(ActorKind::Goomba, 120, 8, Facing::Left);
        w.actors[g].alive = false;
        tick(&mut w, None);
        assert_eq!(count(&w, ActorKind::Goomba), 0);
        assert_eq!(w.actors.len(), 20);
    }

    #[test]
    fn dead_enemy_neither_walks_nor_hurts() {
        let mut w = flat_world(40);
        let g = w.spawn(ActorKind::Goomba, 44, 8, Facing::Left);
        w.actors[g].alive = false;

        behavior::act(&mut w, g);
        assert_eq!((w.actors[g].x, w.actors[g].facing), (44, Facing::Left));
        assert!(w.player.alive);
        assert_eq!(w.player.hit_points, 1);

        assert_eq!(tick(&mut w, None), TickStatus::Continue);
        assert!(w.player.alive);
        assert_eq!(w.player.hit_points, 1);
        assert!(!w.take_events().contains(&GameEvent::Hurt));
    }

    #[test]
    fn spawned_actor_waits_a_tick() {
        let mut w = flat_world(40);
        w.player.shoot_boost = true;
        tick(&mut w, Some(PlayerInput::Fire));
        let ball = w.actors.iter().find(|a| a.kind == ActorKind::PlayerFireball).map(|a| a.x);
        assert_eq!(ball, Some(44));
        tick(&mut w, None);
        let ball = w.actors.iter().find(|a| a.kind == ActorKind::PlayerFireball).map(|a| a.x);
        assert_eq!(ball, Some(46));
    }

    #[test]
    fn tick_counter_runs_per_level() {
        let mut w = flat_world(40);
        tick(&mut w, None);
        tick(&mut w, None);
        assert_eq!(w.tick, 2);
        w.teardown();
        assert_eq!(w.tick, 0);
    }

    #[test]
    fn status_text_tracks_powers() {
        let mut w = flat_world(40);
        w.player.apply_powerup(Goodie::Flower);
        tick(&mut w, None);
        assert_eq!(w.status_text, "Lives: 3  Level: 01  Points: 000000 ShootPower!");
    }
}
