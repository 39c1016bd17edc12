/// Audio cues raised during a simulation step.
/// The core only decides when a cue fires; the presentation layer plays it.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GameEvent {
    Jump,
    Fire,
    PiranhaFire,
    Hurt,
    Bonk,
    PowerupAppears,
    PowerupCollected,
    Kick,
    PlayerDied,
    LevelFinished,
    GameWon,
}

impl GameEvent {
    pub const ALL: [GameEvent; 11] = [
        GameEvent::Jump,
        GameEvent::Fire,
        GameEvent::PiranhaFire,
        GameEvent::Hurt,
        GameEvent::Bonk,
        GameEvent::PowerupAppears,
        GameEvent::PowerupCollected,
        GameEvent::Kick,
        GameEvent::PlayerDied,
        GameEvent::LevelFinished,
        GameEvent::GameWon,
    ];
}
