/// Gamepad support through gilrs.
///
/// Button state is two bitmasks: `held` for the current level of every
/// input and `pressed` for edges seen since the last `update()`. The d-pad
/// lives in the same masks, so walking and menu confirms share one path.
///
/// Default mapping (overridable in `[gamepad]` of config.toml):
///   D-pad / left stick   walk; up also jumps
///   A                    jump
///   B / X                fire
///   Start                confirm
///   Select               back / quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use super::input::ActionRequest;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    Lb,
    Rb,
    Start,
    Select,
    Up,
    Left,
    Right,
}

impl Btn {
    fn bit(self) -> u16 {
        1 << self as u16
    }

    /// Config name lookup; accepts face letters, compass names and bumper aliases.
    fn parse(name: &str) -> Option<Btn> {
        let btn = match name.trim().to_ascii_lowercase().as_str() {
            "a" | "south" => Btn::A,
            "b" | "east" => Btn::B,
            "x" | "west" => Btn::X,
            "y" | "north" => Btn::Y,
            "lb" | "l1" => Btn::Lb,
            "rb" | "r1" => Btn::Rb,
            "start" | "menu" => Btn::Start,
            "select" | "back" | "view" => Btn::Select,
            _ => return None,
        };
        Some(btn)
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(button: Button) -> Option<Btn> {
        let btn = match button {
            Button::South => Btn::A,
            Button::East => Btn::B,
            Button::West => Btn::X,
            Button::North => Btn::Y,
            Button::LeftTrigger => Btn::Lb,
            Button::RightTrigger => Btn::Rb,
            Button::Start => Btn::Start,
            Button::Select => Btn::Select,
            Button::DPadUp => Btn::Up,
            Button::DPadLeft => Btn::Left,
            Button::DPadRight => Btn::Right,
            _ => return None,
        };
        Some(btn)
    }
}

fn mask_of(btns: &[Btn]) -> u16 {
    btns.iter().fold(0, |m, b| m | b.bit())
}

/// Button masks for each configurable action.
#[derive(Debug, PartialEq)]
struct Bindings {
    jump: u16,
    fire: u16,
    confirm: u16,
    cancel: u16,
}

impl Default for Bindings {
    fn default() -> Self {
        Bindings {
            jump: Btn::A.bit(),
            fire: Btn::B.bit() | Btn::X.bit(),
            confirm: Btn::Start.bit(),
            cancel: Btn::Select.bit(),
        }
    }
}

impl Bindings {
    fn from_config(cfg: &GamepadConfig) -> Self {
        let defaults = Bindings::default();
        Bindings {
            jump: parse_binding("jump", &cfg.jump, defaults.jump),
            fire: parse_binding("fire", &cfg.fire, defaults.fire),
            confirm: parse_binding("confirm", &cfg.confirm, defaults.confirm),
            cancel: parse_binding("cancel", &cfg.cancel, defaults.cancel),
        }
    }
}

/// An action bound only to unknown names keeps its default buttons.
fn parse_binding(action: &str, names: &[String], fallback: u16) -> u16 {
    let btns: Vec<Btn> = names.iter().filter_map(|n| Btn::parse(n)).collect();
    if btns.is_empty() {
        log::warn!("gamepad {action}: no known buttons in {names:?}, using default");
        fallback
    } else {
        mask_of(&btns)
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    held: u16,
    pressed: u16,
    /// Stick directions folded in as virtual d-pad bits.
    stick: u16,
    bindings: Bindings,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs = Gilrs::new()
            .map_err(|e| log::warn!("gamepad support unavailable: {e}"))
            .ok();
        #[cfg(feature = "gamepad")]
        let connected = gilrs.as_ref().map_or(false, |g| g.gamepads().next().is_some());
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            held: 0,
            pressed: 0,
            stick: 0,
            bindings: Bindings::default(),
            connected,
        }
    }

    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.bindings = Bindings::from_config(cfg);
    }

    /// Poll pending events. Call once per frame.
    pub fn update(&mut self) {
        self.pressed = 0;

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else { return };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        let mut stick_x = None;
        let mut stick_y = None;
        for event in events {
            match event.event {
                EventType::ButtonPressed(button, _) => {
                    if let Some(btn) = Btn::from_gilrs(button) {
                        self.press(btn.bit());
                    }
                }
                EventType::ButtonReleased(button, _) => {
                    if let Some(btn) = Btn::from_gilrs(button) {
                        self.held &= !btn.bit();
                    }
                }
                EventType::AxisChanged(Axis::LeftStickX, v, _) => stick_x = Some(v),
                EventType::AxisChanged(Axis::LeftStickY, v, _) => stick_y = Some(v),
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.held = 0;
                    self.stick = 0;
                }
                _ => {}
            }
        }

        if let Some(x) = stick_x {
            self.stick &= !(Btn::Left.bit() | Btn::Right.bit());
            if x < -STICK_DEADZONE { self.stick |= Btn::Left.bit(); }
            if x > STICK_DEADZONE { self.stick |= Btn::Right.bit(); }
        }
        if let Some(y) = stick_y {
            self.stick &= !Btn::Up.bit();
            if y > STICK_DEADZONE { self.stick |= Btn::Up.bit(); }
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn press(&mut self, bits: u16) {
        self.connected = true;
        self.pressed |= bits & !self.held;
        self.held |= bits;
    }

    fn is_held(&self, mask: u16) -> bool {
        (self.held | self.stick) & mask != 0
    }

    pub fn confirm_pressed(&self) -> bool {
        self.pressed & self.bindings.confirm != 0
    }

    pub fn cancel_pressed(&self) -> bool {
        self.pressed & self.bindings.cancel != 0
    }

    /// Gameplay actions from held buttons, stick and d-pad.
    pub fn actions(&self) -> ActionRequest {
        ActionRequest {
            left: self.is_held(Btn::Left.bit()),
            right: self.is_held(Btn::Right.bit()),
            jump: self.is_held(self.bindings.jump | Btn::Up.bit()),
            fire: self.is_held(self.bindings.fire),
        }
    }
}
