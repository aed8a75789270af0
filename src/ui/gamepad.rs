/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Navigate / steer
///   A                     →  Confirm (Enter)
///   B / Select            →  Back (Esc)
///   X                     →  Alternate action (mode, press)
///   Y                     →  Restart
///   Start                 →  Pause

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Logical direction, fed by both the d-pad and the left stick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PadDir {
    Up,
    Down,
    Left,
    Right,
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Action-to-button mapping (loaded from config).
#[derive(Debug, PartialEq)]
struct ActionMap {
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
    action: Vec<Btn>,
    restart: Vec<Btn>,
    pause: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            confirm: vec![Btn::A],
            cancel:  vec![Btn::B, Btn::Select],
            action:  vec![Btn::X],
            restart: vec![Btn::Y],
            pause:   vec![Btn::Start],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // All tracked buttons (indexed by Btn)
    buttons: [BtnState; BTN_COUNT],

    // D-pad and stick, indexed by PadDir
    dpad: [BtnState; 4],
    stick: [BtnState; 4],
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

fn dir_index(dir: PadDir) -> usize {
    dir as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "gamepad support unavailable");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: [BtnState::default(); 4],
            stick: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config. Lists with no recognised names keep the default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_into(names: &[String], slot: &mut Vec<Btn>) {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if !parsed.is_empty() {
                *slot = parsed;
            }
        }
        let map = &mut self.action_map;
        parse_into(&cfg.confirm, &mut map.confirm);
        parse_into(&cfg.cancel, &mut map.cancel);
        parse_into(&cfg.action, &mut map.action);
        parse_into(&cfg.restart, &mut map.restart);
        parse_into(&cfg.pause, &mut map.pause);
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    self.connected = true;
                    tracing::info!("gamepad connected");
                }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                    tracing::info!("gamepad disconnected");
                }
                _ => {}
            }
        }

        self.stick[dir_index(PadDir::Left)].set(self.stick_x < -STICK_DEADZONE);
        self.stick[dir_index(PadDir::Right)].set(self.stick_x > STICK_DEADZONE);
        self.stick[dir_index(PadDir::Up)].set(self.stick_y > STICK_DEADZONE);
        self.stick[dir_index(PadDir::Down)].set(self.stick_y < -STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        let dir = match gilrs_btn {
            Button::DPadUp => Some(PadDir::Up),
            Button::DPadDown => Some(PadDir::Down),
            Button::DPadLeft => Some(PadDir::Left),
            Button::DPadRight => Some(PadDir::Right),
            _ => None,
        };
        if let Some(dir) = dir {
            self.dpad[dir_index(dir)].set(held);
        } else if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn_index(btn)].set(held);
        }
    }

    // ── Action queries (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    pub fn confirm_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.confirm)
    }
    pub fn cancel_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.cancel)
    }
    pub fn action_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.action)
    }
    pub fn restart_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.restart)
    }
    pub fn pause_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.pause)
    }

    /// Direction newly pushed this frame on the d-pad or stick.
    pub fn dir_pressed(&self) -> Option<PadDir> {
        [PadDir::Up, PadDir::Down, PadDir::Left, PadDir::Right]
            .into_iter()
            .find(|&d| self.dpad[dir_index(d)].just_pressed || self.stick[dir_index(d)].just_pressed)
    }

    #[cfg(test)]
    pub fn press(&mut self, btn: Btn) {
        self.buttons[btn_index(btn)].set(true);
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            b.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            *b = BtnState::default();
        }
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("start"), Some(Btn::Start));
        assert_eq!(Btn::from_name("South"), Some(Btn::A));
        assert_eq!(Btn::from_name("back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn config_overrides_only_recognised_lists() {
        let mut pad = GamepadState::new();
        let mut cfg = GameConfig::default().gamepad;
        cfg.confirm = vec!["Start".into(), "R1".into()];
        cfg.pause = vec!["nonsense".into()];
        pad.load_button_config(&cfg);
        assert_eq!(pad.action_map.confirm, vec![Btn::Start, Btn::R1]);
        assert_eq!(pad.action_map.pause, vec![Btn::Start]);
    }

    #[test]
    fn edge_is_reported_once_per_press() {
        let mut pad = GamepadState::new();
        pad.buttons[btn_index(Btn::A)].set(true);
        assert!(pad.confirm_pressed());
        pad.clear_just_pressed();
        pad.buttons[btn_index(Btn::A)].set(true);
        assert!(!pad.confirm_pressed());

        pad.dpad[dir_index(PadDir::Left)].set(true);
        assert_eq!(pad.dir_pressed(), Some(PadDir::Left));
    }
}
