/// Keyboard state tracker.
///
/// Tracks which keys are currently held down, so movement continues while a
/// key is held and menu keys trigger once per press.
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.
///
/// Key bindings:
///   Left / A      →  Walk left
///   Right / D     →  Walk right
///   Up / W        →  Jump
///   Space / Z     →  Fire
///   Enter         →  Confirm
///   Esc           →  Back / Quit

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::PlayerInput;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_JUMP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
pub const KEYS_FIRE: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Char('z'), KeyCode::Char('Z')];
pub const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter];
pub const KEYS_CANCEL: &[KeyCode] = &[KeyCode::Esc];

/// Which actions are requested this frame, from any device.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActionRequest {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub fire: bool,
}

impl ActionRequest {
    pub fn merge(self, other: ActionRequest) -> ActionRequest {
        ActionRequest {
            left: self.left || other.left,
            right: self.right || other.right,
            jump: self.jump || other.jump,
            fire: self.fire || other.fire,
        }
    }

    /// The world takes one action per tick: jump beats fire beats walking.
    pub fn to_player_input(self) -> Option<PlayerInput> {
        if self.jump {
            Some(PlayerInput::Jump)
        } else if self.fire {
            Some(PlayerInput::Fire)
        } else if self.left {
            Some(PlayerInput::Left)
        } else if self.right {
            Some(PlayerInput::Right)
        } else {
            None
        }
    }
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent
    /// `drain_events()` call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call once per frame, before the world tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.raw_events.push(key);

                match key.kind {
                    KeyEventKind::Release if self.honor_release => {
                        self.last_active.remove(&key.code);
                    }
                    // Without enhancement, releases are unreliable; expiry handles them.
                    KeyEventKind::Release => {}
                    _ => {
                        let was_held = self.is_held(key.code);
                        self.last_active.insert(key.code, Instant::now());
                        if !was_held {
                            self.fresh_presses.push(key.code);
                        }
                    }
                }
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Gameplay actions from held keys.
    pub fn actions(&self) -> ActionRequest {
        ActionRequest {
            left: self.any_held(KEYS_LEFT),
            right: self.any_held(KEYS_RIGHT),
            jump: self.any_held(KEYS_JUMP),
            fire: self.any_held(KEYS_FIRE),
        }
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_action_per_tick_by_priority() {
        let all = ActionRequest { left: true, right: true, jump: true, fire: true };
        assert_eq!(all.to_player_input(), Some(PlayerInput::Jump));

        let no_jump = ActionRequest { jump: false, ..all };
        assert_eq!(no_jump.to_player_input(), Some(PlayerInput::Fire));

        let walk = ActionRequest { left: true, right: true, ..Default::default() };
        assert_eq!(walk.to_player_input(), Some(PlayerInput::Left));

        assert_eq!(ActionRequest::default().to_player_input(), None);
    }

    #[test]
    fn merge_ors_devices() {
        let keys = ActionRequest { right: true, ..Default::default() };
        let pad = ActionRequest { jump: true, ..Default::default() };
        assert_eq!(keys.merge(pad).to_player_input(), Some(PlayerInput::Jump));
    }

    #[test]
    fn fresh_state_holds_nothing() {
        let input = InputState::new();
        assert!(!input.any_held(KEYS_JUMP));
        assert!(!input.any_pressed(KEYS_CONFIRM));
        assert_eq!(input.actions().to_player_input(), None);
    }
}
