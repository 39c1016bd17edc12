/// WorldState: the complete snapshot of a running game.
///
/// ## Actor collection
///
/// `actors` is the single ordered collection of every non-player entity.
/// Order is construction order followed by spawn order, and it is the order
/// both the tick loop and the spatial query scan in. An actor's index is
/// its handle for the rest of the tick:
///   - spawns are appended, so existing indices never shift mid-tick
///   - dead actors stay in place until `reap()` at the end of the tick
///
/// ## Side effects raised by behaviors
///
/// Behaviors never touch audio or the driver directly. They push
/// `GameEvent` cues onto `events` and set the completion flags; the
/// orchestrator and driver read those back.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::domain::entity::{Actor, ActorKind, Facing, Goodie, Player};
use crate::domain::physics::{self, Occupant, Query};
use crate::sim::event::GameEvent;

pub const START_LIVES: u32 = 3;
pub const FIRST_LEVEL: u32 = 1;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    Dying,
    LevelComplete,
    GameOver,
    GameComplete,
    LevelError,
}

/// Outcome of one world tick, interpreted by the driver.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickStatus {
    Continue,
    PlayerDied,
    LevelFinished,
    GameWon,
}

/// Outcome of building a level.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InitStatus {
    Continue,
    LevelError,
}

pub struct WorldState {
    // ── Entities ──
    pub player: Player,
    pub actors: Vec<Actor>,
    next_id: u32,

    // ── Completion flags (set by level enders, consumed by tick) ──
    pub finished_level: bool,
    pub finished_game: bool,

    // ── Meta ──
    pub phase: Phase,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub tick: u64,
    pub status_text: String,

    // ── Side effects ──
    pub events: Vec<GameEvent>,
    rng: SmallRng,

    // ── UI ──
    pub message: String,
    pub anim_tick: u32,
}

// ── Construction ──

impl WorldState {
    /// A world seeded from OS entropy.
    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_entropy())
    }

    /// A world whose random choices replay identically for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        let mut world = WorldState {
            player: Player::new(0, 0),
            actors: vec![],
            next_id: 0,
            finished_level: false,
            finished_game: false,
            phase: Phase::Title,
            score: 0,
            lives: START_LIVES,
            level: FIRST_LEVEL,
            tick: 0,
            status_text: String::new(),
            events: vec![],
            rng,
            message: String::new(),
            anim_tick: 0,
        };
        world.refresh_status_text();
        world
    }

    /// Release every actor and clear per-level flags. Score, lives and the
    /// level number survive.
    pub fn teardown(&mut self) {
        self.actors.clear();
        self.next_id = 0;
        self.finished_level = false;
        self.finished_game = false;
        self.tick = 0;
    }

    /// Back to a fresh game: first level, full lives, zero score.
    pub fn reset_progress(&mut self, start_lives: u32) {
        self.teardown();
        self.score = 0;
        self.lives = start_lives;
        self.level = FIRST_LEVEL;
        self.refresh_status_text();
    }
}

// ── Spatial queries ──

impl WorldState {
    #[inline]
    pub fn find_occupant(&self, x: i32, y: i32, query: Query) -> Option<Occupant> {
        physics::find_occupant(&self.player, &self.actors, x, y, query)
    }

    /// Is there terrain at (x, y)?
    #[inline]
    pub fn blocked(&self, x: i32, y: i32) -> bool {
        self.find_occupant(x, y, Query::Collidable).is_some()
    }

    /// Is this occupant still alive?
    pub fn is_alive(&self, who: Occupant) -> bool {
        match who {
            Occupant::Player => self.player.alive,
            Occupant::Actor(i) => self.actors.get(i).map_or(false, |a| a.alive),
        }
    }
}

// ── Spawning ──

impl WorldState {
    /// Append a new actor; it joins the tick loop from the next tick on.
    pub fn spawn(&mut self, kind: ActorKind, x: i32, y: i32, facing: Facing) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.actors.push(Actor::new(id, kind, x, y, facing));
        log::debug!("spawn #{} {} at ({}, {}) facing {:?}", id, kind.name(), x, y, facing);
        self.actors.len() - 1
    }

    /// A power-up starts out heading right.
    pub fn spawn_powerup(&mut self, goodie: Goodie, x: i32, y: i32) -> usize {
        self.spawn(ActorKind::Powerup(goodie), x, y, Facing::Right)
    }

    pub fn spawn_fireball(&mut self, from_player: bool, x: i32, y: i32, facing: Facing) -> usize {
        let kind = if from_player { ActorKind::PlayerFireball } else { ActorKind::PiranhaFireball };
        self.spawn(kind, x, y, facing)
    }

    pub fn spawn_shell(&mut self, x: i32, y: i32, facing: Facing) -> usize {
        self.spawn(ActorKind::Shell, x, y, facing)
    }

    /// Coin flip between left and right, used for enemy start facing.
    pub fn random_facing(&mut self) -> Facing {
        if self.rng.gen_bool(0.5) { Facing::Left } else { Facing::Right }
    }

    /// Drop every actor marked dead, keeping the survivors' order.
    pub fn reap(&mut self) {
        let before = self.actors.len();
        self.actors.retain(|a| a.alive);
        let removed = before - self.actors.len();
        if removed > 0 {
            log::debug!("reaped {} dead actors", removed);
        }
    }
}

// ── Progress, cues and status ──

impl WorldState {
    pub fn increase_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Flag the current level as done. `game` marks the final level ender.
    pub fn finish_level(&mut self, game: bool) {
        if game {
            self.finished_game = true;
        } else {
            self.finished_level = true;
        }
    }

    /// Queue an audio cue for the driver.
    pub fn cue(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn refresh_status_text(&mut self) {
        let mut text = format!(
            "Lives: {}  Level: {:02}  Points: {:06}",
            self.lives, self.level, self.score
        );
        if self.player.has_star_power() {
            text.push_str(" StarPower!");
        }
        if self.player.shoot_boost {
            text.push_str(" ShootPower!");
        }
        if self.player.jump_boost {
            text.push_str(" JumpPower!");
        }
        self.status_text = text;
    }

    pub fn set_message(&mut self, msg: &str) {
        self.message = msg.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_world_starts_at_level_one_with_three_lives() {
        let w = WorldState::with_seed(1);
        assert_eq!(w.lives, 3);
        assert_eq!(w.level, 1);
        assert_eq!(w.score, 0);
        assert_eq!(w.status_text, "Lives: 3  Level: 01  Points: 000000");
    }

    #[test]
    fn status_suffixes_follow_fixed_order() {
        let mut w = WorldState::with_seed(1);
        w.score = 1275;
        w.level = 2;
        w.player.apply_powerup(Goodie::Mushroom);
        w.player.apply_powerup(Goodie::Flower);
        w.player.apply_powerup(Goodie::Star);
        w.refresh_status_text();
        assert_eq!(
            w.status_text,
            "Lives: 3  Level: 02  Points: 001275 StarPower! ShootPower! JumpPower!"
        );
    }

    #[test]
    fn spawn_appends_with_fresh_ids() {
        let mut w = WorldState::with_seed(1);
        let a = w.spawn(ActorKind::Pipe, 0, 0, Facing::Right);
        let b = w.spawn_shell(8, 0, Facing::Left);
        assert_eq!((a, b), (0, 1));
        assert_ne!(w.actors[0].id, w.actors[1].id);
        assert_eq!(w.actors[1].kind, ActorKind::Shell);
        assert_eq!(w.actors[1].facing, Facing::Left);
        assert_eq!(w.spawn_powerup(Goodie::Star, 0, 8), 2);
        assert_eq!(w.actors[2].facing, Facing::Right);
    }

    #[test]
    fn reap_keeps_order_of_survivors() {
        let mut w = WorldState::with_seed(1);
        w.spawn(ActorKind::Goomba, 0, 0, Facing::Left);
        w.spawn(ActorKind::Koopa, 8, 0, Facing::Left);
        w.spawn(ActorKind::Pipe, 16, 0, Facing::Left);
        w.actors[1].alive = false;
        w.reap();
        let kinds: Vec<_> = w.actors.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ActorKind::Goomba, ActorKind::Pipe]);
    }

    #[test]
    fn events_drain_once() {
        let mut w = WorldState::with_seed(1);
        w.cue(GameEvent::Bonk);
        w.cue(GameEvent::Jump);
        assert_eq!(w.take_events(), vec![GameEvent::Bonk, GameEvent::Jump]);
        assert!(w.take_events().is_empty());
    }

    #[test]
    fn seeded_facings_replay() {
        let mut a = WorldState::with_seed(42);
        let mut b = WorldState::with_seed(42);
        let fa: Vec<_> = (0..16).map(|_| a.random_facing()).collect();
        let fb: Vec<_> = (0..16).map(|_| b.random_facing()).collect();
        assert_eq!(fa, fb);
        assert!(fa.iter().all(|f| matches!(f, Facing::Left | Facing::Right)));
    }

    #[test]
    fn teardown_keeps_progress() {
        let mut w = WorldState::with_seed(1);
        w.spawn(ActorKind::Pipe, 0, 0, Facing::Right);
        w.score = 500;
        w.level = 2;
        w.finished_level = true;
        w.teardown();
        assert!(w.actors.is_empty());
        assert!(!w.finished_level);
        assert_eq!((w.score, w.level), (500, 2));
    }
}
