/// Actor behavior set: what each kind does on its turn (`act`) and when it
/// is hit (`bonk`).
///
/// ┌─────────────┬──────────────────────────────┬──────────────────────────────┐
/// │ Class       │ act                          │ bonk                         │
/// ├─────────────┼──────────────────────────────┼──────────────────────────────┤
/// │ Terrain     │ nothing                      │ release goodie, else "bonk"  │
/// │ Enemy       │ hurt player on touch, then   │ die, +100, koopa drops shell │
/// │             │ patrol (walkers) or shoot    │                              │
/// │ Projectile  │ hit a target or fall + fly   │ nothing                      │
/// │ LevelEnder  │ end level on player touch    │ nothing                      │
/// └─────────────┴──────────────────────────────┴──────────────────────────────┘
///
/// Behaviors address actors by index and re-read them from the world after
/// every call that can mutate it, so no borrow outlives a spawn.

use crate::domain::ai::{self, Ctx, TurretAction};
use crate::domain::entity::{ActorClass, ActorKind, HitOutcome};
use crate::domain::physics::{Occupant, Query, SPRITE_HEIGHT};
use crate::domain::rules::{self, PIRANHA_FIRE_DELAY, PROJECTILE_STEP_X, PROJECTILE_STEP_Y};
use super::event::GameEvent;
use super::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Dispatch
// ══════════════════════════════════════════════════════════════

/// Run one actor's turn. Dead actors do nothing.
pub fn act(world: &mut WorldState, idx: usize) {
    let actor = world.actors[idx];
    if !actor.alive { return; }

    match actor.kind.class() {
        ActorClass::Terrain => {}
        ActorClass::Enemy => act_enemy(world, idx),
        ActorClass::Projectile => act_projectile(world, idx),
        ActorClass::LevelEnder => act_level_ender(world, idx),
    }
}

/// Deliver a hit to whoever occupies a spot.
pub fn bonk(world: &mut WorldState, target: Occupant) {
    match target {
        Occupant::Player => bonk_player(world),
        Occupant::Actor(idx) => match world.actors[idx].kind.class() {
            ActorClass::Terrain => bonk_terrain(world, idx),
            ActorClass::Enemy => bonk_enemy(world, idx),
            ActorClass::Projectile | ActorClass::LevelEnder => {}
        },
    }
}

pub fn bonk_player(world: &mut WorldState) {
    match world.player.take_hit() {
        HitOutcome::Ignored => {}
        HitOutcome::Hurt => world.cue(GameEvent::Hurt),
        HitOutcome::Killed => {
            log::info!("player killed at ({}, {})", world.player.x, world.player.y);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Terrain
// ══════════════════════════════════════════════════════════════

fn bonk_terrain(world: &mut WorldState, idx: usize) {
    let block = world.actors[idx];
    let released = match block.kind {
        ActorKind::Block { goodie: Some(goodie) } => {
            world.actors[idx].kind = ActorKind::Block { goodie: None };
            Some(goodie)
        }
        _ => None,
    };

    match released {
        Some(goodie) => {
            log::debug!("block #{} released {:?}", block.id, goodie);
            world.spawn_powerup(goodie, block.x, block.y + SPRITE_HEIGHT);
            world.cue(GameEvent::PowerupAppears);
        }
        None => world.cue(GameEvent::Bonk),
    }
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

fn bonk_enemy(world: &mut WorldState, idx: usize) {
    let enemy = world.actors[idx];
    if !enemy.alive { return; }

    world.actors[idx].alive = false;
    world.increase_score(rules::ENEMY_SCORE);
    log::debug!("{} #{} defeated", enemy.kind.name(), enemy.id);

    if enemy.kind == ActorKind::Koopa {
        world.spawn_shell(enemy.x, enemy.y, enemy.facing);
    }
}

fn act_enemy(world: &mut WorldState, idx: usize) {
    if let ActorKind::Piranha { firing_delay, anim_frame } = world.actors[idx].kind {
        world.actors[idx].kind = ActorKind::Piranha { firing_delay, anim_frame: anim_frame.wrapping_add(1) };
    }

    let enemy = world.actors[idx];
    if world.find_occupant(enemy.x, enemy.y, Query::ContactWithPlayer) == Some(Occupant::Player) {
        bonk_player(world);
        return;
    }

    match enemy.kind {
        ActorKind::Piranha { firing_delay, .. } => act_piranha(world, idx, firing_delay),
        _ => {
            let ctx = Ctx { player: &world.player, actors: &world.actors };
            let step = ai::patrol(&ctx, enemy.x, enemy.y, enemy.facing);
            let walker = &mut world.actors[idx];
            walker.facing = step.facing;
            walker.x = step.x;
        }
    }
}

fn act_piranha(world: &mut WorldState, idx: usize, firing_delay: u32) {
    let piranha = world.actors[idx];
    match ai::turret(&world.player, piranha.x, piranha.y, firing_delay) {
        TurretAction::Idle => {}
        TurretAction::Reload(facing) => {
            world.actors[idx].facing = facing;
            set_firing_delay(world, idx, firing_delay - 1);
        }
        TurretAction::Aim(facing) => world.actors[idx].facing = facing,
        TurretAction::Fire(facing) => {
            world.actors[idx].facing = facing;
            world.cue(GameEvent::PiranhaFire);
            world.spawn_fireball(false, piranha.x, piranha.y, facing);
            set_firing_delay(world, idx, PIRANHA_FIRE_DELAY);
        }
    }
}

fn set_firing_delay(world: &mut WorldState, idx: usize, delay: u32) {
    if let ActorKind::Piranha { anim_frame, .. } = world.actors[idx].kind {
        world.actors[idx].kind = ActorKind::Piranha { firing_delay: delay, anim_frame };
    }
}

// ══════════════════════════════════════════════════════════════
// Projectiles
// ══════════════════════════════════════════════════════════════

/// A projectile either resolves a hit (and vanishes) or moves:
/// fall a quarter cell if nothing is below, then advance a quarter cell.
fn act_projectile(world: &mut WorldState, idx: usize) {
    let shot = world.actors[idx];
    let targets_player = shot.kind.targets_player();

    if let Some(target) = world.find_occupant(shot.x, shot.y, Query::contact(targets_player)) {
        if is_target(world, target, targets_player) {
            hit_target(world, shot.kind, target);
            world.actors[idx].alive = false;
            return;
        }
    }

    let mut new_y = shot.y;
    if !world.blocked(shot.x, shot.y - PROJECTILE_STEP_Y) {
        new_y -= PROJECTILE_STEP_Y;
    }
    let new_x = shot.x + shot.facing.dx() * PROJECTILE_STEP_X;

    if world.blocked(new_x, new_y) {
        let shot = &mut world.actors[idx];
        if shot.kind.bounces() {
            shot.y = new_y;
            shot.facing = shot.facing.reversed();
        } else {
            shot.alive = false;
        }
    } else {
        let shot = &mut world.actors[idx];
        shot.x = new_x;
        shot.y = new_y;
    }
}

/// Player-seeking shots hit only the player; the rest hit only enemies.
fn is_target(world: &WorldState, target: Occupant, targets_player: bool) -> bool {
    if !world.is_alive(target) { return false; }
    match target {
        Occupant::Player => targets_player,
        Occupant::Actor(i) => !targets_player && world.actors[i].is_damageable(),
    }
}

fn hit_target(world: &mut WorldState, kind: ActorKind, target: Occupant) {
    match kind {
        ActorKind::Powerup(goodie) => {
            if target == Occupant::Player {
                world.increase_score(rules::goodie_score(goodie));
                world.player.apply_powerup(goodie);
                world.cue(GameEvent::PowerupCollected);
            }
        }
        ActorKind::PiranhaFireball => {
            if target == Occupant::Player {
                bonk_player(world);
            }
        }
        _ => bonk(world, target),
    }
}

// ══════════════════════════════════════════════════════════════
// Level enders
// ══════════════════════════════════════════════════════════════

fn act_level_ender(world: &mut WorldState, idx: usize) {
    let ender = world.actors[idx];
    if world.find_occupant(ender.x, ender.y, Query::ContactWithPlayer) != Some(Occupant::Player) {
        return;
    }

    world.increase_score(rules::LEVEL_END_SCORE);
    world.actors[idx].alive = false;
    world.finish_level(ender.kind == ActorKind::Mario);
    log::info!("{} reached on level {}", ender.kind.name(), world.level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Facing, Goodie};

    fn world() -> WorldState {
        let mut w = WorldState::with_seed(7);
        w.player.x = 400;
        w.player.y = 400;
        w
    }

    fn floor(w: &mut WorldState, from: i32, to: i32) {
        for c in from..to {
            w.spawn(ActorKind::Block { goodie: None }, c * 8, 0, Facing::Right);
        }
    }

    #[test]
    fn goodie_block_releases_once() {
        let mut w = world();
        let b = w.spawn(ActorKind::Block { goodie: Some(Goodie::Flower) }, 40, 40, Facing::Right);
        bonk(&mut w, Occupant::Actor(b));
        assert_eq!(w.actors[b].kind, ActorKind::Block { goodie: None });
        assert_eq!(w.actors.len(), 2);
        assert_eq!(w.actors[1].kind, ActorKind::Powerup(Goodie::Flower));
        assert_eq!((w.actors[1].x, w.actors[1].y), (40, 48));

        bonk(&mut w, Occupant::Actor(b));
        assert_eq!(w.actors.len(), 2);
        assert_eq!(w.take_events(), vec![GameEvent::PowerupAppears, GameEvent::Bonk]);
    }

    #[test]
    fn pipe_bonk_only_plays_cue() {
        let mut w = world();
        let p = w.spawn(ActorKind::Pipe, 0, 0, Facing::Right);
        bonk(&mut w, Occupant::Actor(p));
        assert_eq!(w.actors.len(), 1);
        assert_eq!(w.take_events(), vec![GameEvent::Bonk]);
    }

    #[test]
    fn enemy_death_scores_once() {
        let mut w = world();
        let g = w.spawn(ActorKind::Goomba, 0, 8, Facing::Left);
        bonk(&mut w, Occupant::Actor(g));
        bonk(&mut w, Occupant::Actor(g));
        assert!(!w.actors[g].alive);
        assert_eq!(w.score, 100);
    }

    #[test]
    fn koopa_leaves_shell_where_it_died() {
        let mut w = world();
        let k = w.spawn(ActorKind::Koopa, 24, 8, Facing::Left);
        bonk(&mut w, Occupant::Actor(k));
        bonk(&mut w, Occupant::Actor(k));
        let shells: Vec<_> = w.actors.iter().filter(|a| a.kind == ActorKind::Shell).collect();
        assert_eq!(shells.len(), 1);
        assert_eq!((shells[0].x, shells[0].y, shells[0].facing), (24, 8, Facing::Left));
    }

    #[test]
    fn projectiles_and_level_enders_ignore_bonks() {
        let mut w = world();
        let s = w.spawn(ActorKind::Shell, 0, 8, Facing::Right);
        let f = w.spawn(ActorKind::Flag, 16, 8, Facing::Right);
        bonk(&mut w, Occupant::Actor(s));
        bonk(&mut w, Occupant::Actor(f));
        assert!(w.actors[s].alive && w.actors[f].alive);
        assert!(w.take_events().is_empty());
        assert_eq!(w.score, 0);
    }

    #[test]
    fn enemy_touching_player_hurts_instead_of_moving() {
        let mut w = world();
        floor(&mut w, 0, 10);
        w.player.x = 36;
        w.player.y = 8;
        w.player.hit_points = 2;
        let g = w.spawn(ActorKind::Goomba, 32, 8, Facing::Right);
        act(&mut w, g);
        assert_eq!(w.actors[g].x, 32);
        assert_eq!(w.player.hit_points, 1);
        assert_eq!(w.take_events(), vec![GameEvent::Hurt]);
    }

    #[test]
    fn walker_steps_one_pixel() {
        let mut w = world();
        floor(&mut w, 0, 10);
        let g = w.spawn(ActorKind::Goomba, 32, 8, Facing::Right);
        act(&mut w, g);
        assert_eq!((w.actors[g].x, w.actors[g].facing), (33, Facing::Right));
    }

    #[test]
    fn piranha_reload_only_counts_while_player_in_band() {
        let mut w = world();
        let r = w.spawn(ActorKind::Piranha { firing_delay: 5, anim_frame: 0 }, 100, 8, Facing::Left);
        act(&mut w, r);
        assert_eq!(w.actors[r].kind, ActorKind::Piranha { firing_delay: 5, anim_frame: 1 });

        w.player.x = 150;
        w.player.y = 8;
        act(&mut w, r);
        assert_eq!(w.actors[r].kind, ActorKind::Piranha { firing_delay: 4, anim_frame: 2 });
        assert_eq!(w.actors[r].facing, Facing::Right);
    }

    #[test]
    fn powerup_bounces_off_walls() {
        let mut w = world();
        floor(&mut w, 0, 10);
        w.spawn(ActorKind::Block { goodie: None }, 48, 8, Facing::Right);
        let m = w.spawn_powerup(Goodie::Mushroom, 40, 8);
        act(&mut w, m);
        assert_eq!((w.actors[m].x, w.actors[m].y, w.actors[m].facing), (40, 8, Facing::Left));
        act(&mut w, m);
        assert_eq!((w.actors[m].x, w.actors[m].facing), (38, Facing::Left));
    }

    #[test]
    fn fireball_falls_then_vanishes_at_wall() {
        let mut w = world();
        floor(&mut w, 0, 10);
        w.spawn(ActorKind::Block { goodie: None }, 46, 8, Facing::Right);
        let f = w.spawn_fireball(true, 36, 10, Facing::Right);
        act(&mut w, f);
        assert_eq!((w.actors[f].x, w.actors[f].y), (38, 8));
        assert!(w.actors[f].alive);
        act(&mut w, f);
        assert!(!w.actors[f].alive);
    }

    #[test]
    fn player_fireball_kills_enemy_it_touches() {
        let mut w = world();
        floor(&mut w, 0, 10);
        let g = w.spawn(ActorKind::Goomba, 40, 8, Facing::Left);
        let f = w.spawn_fireball(true, 36, 8, Facing::Right);
        act(&mut w, f);
        assert!(!w.actors[f].alive);
        assert!(!w.actors[g].alive);
        assert_eq!(w.score, 100);
    }

    #[test]
    fn piranha_fireball_ignores_enemies_and_hits_player() {
        let mut w = world();
        floor(&mut w, 0, 10);
        w.spawn(ActorKind::Goomba, 40, 8, Facing::Left);
        let f = w.spawn_fireball(false, 36, 8, Facing::Right);
        act(&mut w, f);
        assert!(w.actors[f].alive);
        assert_eq!(w.score, 0);

        w.player.x = w.actors[f].x;
        w.player.y = 8;
        act(&mut w, f);
        assert!(!w.actors[f].alive);
        assert!(!w.player.alive);
    }

    #[test]
    fn collecting_star_scores_and_grants_power() {
        let mut w = world();
        w.player.x = 64;
        w.player.y = 8;
        let s = w.spawn_powerup(Goodie::Star, 66, 8);
        act(&mut w, s);
        assert!(!w.actors[s].alive);
        assert_eq!(w.score, 100);
        assert!(w.player.has_star_power());
        assert_eq!(w.take_events(), vec![GameEvent::PowerupCollected]);
    }

    #[test]
    fn mario_ends_the_game() {
        let mut w = world();
        w.player.x = 80;
        w.player.y = 8;
        let m = w.spawn(ActorKind::Mario, 84, 8, Facing::Right);
        act(&mut w, m);
        assert!(w.finished_game);
        assert!(!w.finished_level);
        assert_eq!(w.score, 1000);
        assert!(!w.actors[m].alive);
    }
}
