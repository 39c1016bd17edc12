/// Entities: Player, the shared Actor record, and the closed set of actor kinds.
/// Per-kind capabilities (collidable, damageable, bounce, targeting, depth)
/// are answered by `ActorKind`, so kind semantics are centralized here.

/// Facing direction. Only Left/Right are used for motion; Up/Down exist so
/// the four sprite orientations stay representable.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Right,
    #[allow(dead_code)]
    Up,
    Left,
    #[allow(dead_code)]
    Down,
}

impl Facing {
    pub fn reversed(self) -> Facing {
        match self {
            Facing::Right => Facing::Left,
            Facing::Up => Facing::Down,
            Facing::Left => Facing::Right,
            Facing::Down => Facing::Up,
        }
    }

    /// Horizontal unit step: +1 facing right, -1 facing left, 0 otherwise.
    pub fn dx(self) -> i32 {
        match self {
            Facing::Right => 1,
            Facing::Left => -1,
            Facing::Up | Facing::Down => 0,
        }
    }
}

/// Power-up payload stored in a block and carried by a power-up projectile.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Goodie {
    Mushroom,
    Flower,
    Star,
}

/// At most one player action per tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayerInput {
    Left,
    Right,
    Jump,
    Fire,
}

/// Behavior family an actor kind belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActorClass {
    Terrain,
    Enemy,
    Projectile,
    LevelEnder,
}

/// Every non-player entity kind. Variant payloads are the per-kind state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActorKind {
    Block { goodie: Option<Goodie> },
    Pipe,
    Goomba,
    Koopa,
    Piranha { firing_delay: u32, anim_frame: u32 },
    Powerup(Goodie),
    PiranhaFireball,
    PlayerFireball,
    Shell,
    Flag,
    Mario,
}

impl ActorKind {
    pub fn class(self) -> ActorClass {
        match self {
            ActorKind::Block { .. } | ActorKind::Pipe => ActorClass::Terrain,
            ActorKind::Goomba | ActorKind::Koopa | ActorKind::Piranha { .. } => ActorClass::Enemy,
            ActorKind::Powerup(_)
            | ActorKind::PiranhaFireball
            | ActorKind::PlayerFireball
            | ActorKind::Shell => ActorClass::Projectile,
            ActorKind::Flag | ActorKind::Mario => ActorClass::LevelEnder,
        }
    }

    /// Terrain blocks movement and answers collidable-only queries.
    pub fn is_collidable(self) -> bool {
        self.class() == ActorClass::Terrain
    }

    pub fn is_damageable(self) -> bool {
        self.class() == ActorClass::Enemy
    }

    /// Reverse on obstruction (true) or vanish (false). Projectiles only.
    pub fn bounces(self) -> bool {
        matches!(self, ActorKind::Powerup(_))
    }

    /// Projectiles that interact with the player rather than with enemies.
    pub fn targets_player(self) -> bool {
        matches!(self, ActorKind::Powerup(_) | ActorKind::PiranhaFireball)
    }

    /// Draw priority (lower draws on top). Not used by physics.
    pub fn depth(self) -> u8 {
        match self.class() {
            ActorClass::Terrain => 2,
            ActorClass::Enemy => 0,
            ActorClass::Projectile | ActorClass::LevelEnder => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ActorKind::Block { .. } => "block",
            ActorKind::Pipe => "pipe",
            ActorKind::Goomba => "goomba",
            ActorKind::Koopa => "koopa",
            ActorKind::Piranha { .. } => "piranha",
            ActorKind::Powerup(Goodie::Mushroom) => "mushroom",
            ActorKind::Powerup(Goodie::Flower) => "flower",
            ActorKind::Powerup(Goodie::Star) => "star",
            ActorKind::PiranhaFireball => "piranha fireball",
            ActorKind::PlayerFireball => "player fireball",
            ActorKind::Shell => "shell",
            ActorKind::Flag => "flag",
            ActorKind::Mario => "mario",
        }
    }
}

/// A non-player actor. Lives in `WorldState::actors`; its index there is its
/// handle for the duration of a tick.
#[derive(Clone, Copy, Debug)]
pub struct Actor {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
    pub alive: bool,
    pub kind: ActorKind,
}

impl Actor {
    pub fn new(id: u32, kind: ActorKind, x: i32, y: i32, facing: Facing) -> Self {
        Actor { id, x, y, facing, alive: true, kind }
    }

    pub fn depth(&self) -> u8 {
        self.kind.depth()
    }

    pub fn is_collidable(&self) -> bool {
        self.kind.is_collidable()
    }

    pub fn is_damageable(&self) -> bool {
        self.kind.is_damageable()
    }
}

pub const START_HIT_POINTS: i32 = 1;
pub const POWERED_HIT_POINTS: i32 = 2;
pub const INVINCIBLE_TICKS: u32 = 10;
pub const STAR_TICKS: u32 = 150;

/// What a hit did to the player.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HitOutcome {
    /// Invincible or star-powered: nothing happened.
    Ignored,
    /// Lost a hit point but still standing.
    Hurt,
    /// Hit points reached zero.
    Killed,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
    pub alive: bool,
    pub hit_points: i32,
    pub invincible_ticks: u32,
    pub star_ticks: u32,
    pub fire_cooldown: u32,
    pub jump_boost: bool,
    pub shoot_boost: bool,
    /// >0 while ascending; 0 or below means free-falling.
    pub jump_distance: i32,
}

impl Player {
    pub fn new(x: i32, y: i32) -> Self {
        Player {
            x, y,
            facing: Facing::Right,
            alive: true,
            hit_points: START_HIT_POINTS,
            invincible_ticks: 0,
            star_ticks: 0,
            fire_cooldown: 0,
            jump_boost: false,
            shoot_boost: false,
            jump_distance: 0,
        }
    }

    /// Count every active timer down by one, stopping at zero.
    pub fn tick_timers(&mut self) {
        self.invincible_ticks = self.invincible_ticks.saturating_sub(1);
        self.star_ticks = self.star_ticks.saturating_sub(1);
        self.fire_cooldown = self.fire_cooldown.saturating_sub(1);
    }

    pub fn has_star_power(&self) -> bool {
        self.star_ticks > 0
    }

    /// Apply one hit. This is the only way the player dies.
    pub fn take_hit(&mut self) -> HitOutcome {
        if self.invincible_ticks > 0 || self.star_ticks > 0 {
            return HitOutcome::Ignored;
        }
        self.invincible_ticks = INVINCIBLE_TICKS;
        self.hit_points -= 1;
        self.jump_boost = false;
        self.shoot_boost = false;
        if self.hit_points > 0 {
            HitOutcome::Hurt
        } else {
            self.alive = false;
            HitOutcome::Killed
        }
    }

    pub fn apply_powerup(&mut self, goodie: Goodie) {
        match goodie {
            Goodie::Mushroom => {
                self.hit_points = POWERED_HIT_POINTS;
                self.jump_boost = true;
            }
            Goodie::Flower => {
                self.hit_points = POWERED_HIT_POINTS;
                self.shoot_boost = true;
            }
            Goodie::Star => self.star_ticks = STAR_TICKS,
        }
    }
}
