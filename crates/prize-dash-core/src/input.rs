use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::player::{Direction, KeyboardProfile, PlayerSlot, SLOT_COUNT, SlotId};
use crate::time::Millis;

pub const BUTTON_CONFIRM: usize = 0;
pub const BUTTON_BACK: usize = 1;
pub const BUTTON_START: usize = 2;
pub const BUTTON_EXIT: usize = 8;
pub const DPAD_UP: usize = 12;
pub const DPAD_DOWN: usize = 13;
pub const DPAD_LEFT: usize = 14;
pub const DPAD_RIGHT: usize = 15;
/// Buttons in the standard gamepad layout.
pub const STANDARD_BUTTONS: usize = 17;

/// Key code that opens the exit prompt for everyone.
pub const EXIT_KEY: &str = "Escape";

/// A discrete menu action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuAction {
    Left,
    Right,
    Up,
    Down,
    Confirm,
    Back,
    Start,
    Exit,
}

impl MenuAction {
    const ALL: [MenuAction; 8] = [
        Self::Left,
        Self::Right,
        Self::Up,
        Self::Down,
        Self::Confirm,
        Self::Back,
        Self::Start,
        Self::Exit,
    ];

    /// Actions sharing a class share one cooldown.
    fn class(self) -> usize {
        match self {
            Self::Left | Self::Right | Self::Up | Self::Down => 0,
            Self::Confirm => 1,
            Self::Back => 2,
            Self::Start => 3,
            Self::Exit => 4,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

const ACTION_CLASSES: usize = 5;

impl Direction {
    /// Unit step in screen space (y grows downward).
    pub fn unit(self) -> Vec2 {
        match self {
            Self::Left => Vec2::NEG_X,
            Self::Right => Vec2::X,
            Self::Up => Vec2::NEG_Y,
            Self::Down => Vec2::Y,
        }
    }
}

/// One connected gamepad as seen at a single instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GamepadSnapshot {
    pub index: usize,
    /// Left stick, each axis in [-1, 1].
    pub axes: [f32; 2],
    /// Pressed state by standard button index.
    pub buttons: Vec<bool>,
}

impl GamepadSnapshot {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            axes: [0.0; 2],
            buttons: vec![false; STANDARD_BUTTONS],
        }
    }

    pub fn pressed(&self, button: usize) -> bool {
        self.buttons.get(button).copied().unwrap_or(false)
    }

    /// Set one button. Indices past the standard layout are ignored.
    pub fn with_button(mut self, button: usize, pressed: bool) -> Self {
        if button >= STANDARD_BUTTONS {
            return self;
        }
        if self.buttons.len() <= button {
            self.buttons.resize(STANDARD_BUTTONS, false);
        }
        self.buttons[button] = pressed;
        self
    }

    pub fn with_axes(mut self, x: f32, y: f32) -> Self {
        self.axes = [x, y];
        self
    }

    /// Whether `action` is currently held on this pad.
    fn holds(&self, action: MenuAction, deadzone: f32) -> bool {
        let [x, y] = self.axes;
        match action {
            MenuAction::Left => self.pressed(DPAD_LEFT) || x < -deadzone,
            MenuAction::Right => self.pressed(DPAD_RIGHT) || x > deadzone,
            MenuAction::Up => self.pressed(DPAD_UP) || y < -deadzone,
            MenuAction::Down => self.pressed(DPAD_DOWN) || y > deadzone,
            MenuAction::Confirm => self.pressed(BUTTON_CONFIRM),
            MenuAction::Back => self.pressed(BUTTON_BACK),
            MenuAction::Start => self.pressed(BUTTON_START),
            MenuAction::Exit => self.pressed(BUTTON_EXIT),
        }
    }
}

/// Anything that can report the connected gamepads.
pub trait GamepadSource {
    fn gamepads(&self) -> Vec<GamepadSnapshot>;
}

/// Edge and cooldown tracking for one slot's gamepad.
#[derive(Debug, Clone, Copy, Default)]
struct PadEdges {
    held: [bool; 8],
    cooldown: [Millis; ACTION_CLASSES],
}

/// Merges keyboard and gamepad input into per-slot movement vectors and
/// debounced menu actions.
#[derive(Debug, Clone)]
pub struct InputAggregator {
    held_keys: [HashSet<Direction>; SLOT_COUNT],
    edges: [PadEdges; SLOT_COUNT],
    deadzone: f32,
    cooldown_ms: Millis,
    poll_ms: Millis,
}

impl InputAggregator {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            held_keys: Default::default(),
            edges: Default::default(),
            deadzone: config.stick_deadzone,
            cooldown_ms: config.nav_cooldown_ms,
            poll_ms: config.input_poll_ms,
        }
    }

    /// Register a key press. Returns an action when the key is session-wide.
    pub fn key_down(&mut self, code: &str) -> Option<MenuAction> {
        if code == EXIT_KEY {
            return Some(MenuAction::Exit);
        }
        for (slot, held) in self.held_keys.iter_mut().enumerate() {
            if let Some(dir) = KeyboardProfile::for_slot(slot).direction(code) {
                held.insert(dir);
            }
        }
        None
    }

    pub fn key_up(&mut self, code: &str) {
        for (slot, held) in self.held_keys.iter_mut().enumerate() {
            if let Some(dir) = KeyboardProfile::for_slot(slot).direction(code) {
                held.remove(&dir);
            }
        }
    }

    pub fn clear_keys(&mut self) {
        for held in &mut self.held_keys {
            held.clear();
        }
    }

    /// Forget edge and cooldown state, e.g. after the slot's pad went away.
    pub fn reset_slot(&mut self, slot: SlotId) {
        self.edges[slot] = PadEdges::default();
    }

    /// This frame's displacement for `slot`. Zero unless the slot is playing.
    pub fn movement(&self, slot: &PlayerSlot, pads: &[GamepadSnapshot], move_speed: f32) -> Vec2 {
        if !slot.is_playing() {
            return Vec2::ZERO;
        }

        let mut delta: Vec2 = self.held_keys[slot.id]
            .iter()
            .map(|dir| dir.unit() * move_speed)
            .sum();

        if let Some(pad) = slot
            .input
            .gamepad_index
            .and_then(|index| pads.iter().find(|p| p.index == index))
        {
            delta += Vec2::from(pad.axes) * move_speed;
            for (button, dir) in [
                (DPAD_UP, Direction::Up),
                (DPAD_DOWN, Direction::Down),
                (DPAD_LEFT, Direction::Left),
                (DPAD_RIGHT, Direction::Right),
            ] {
                if pad.pressed(button) {
                    delta += dir.unit() * move_speed;
                }
            }
        }
        delta
    }

    /// One menu poll for `slot`. Cooldowns drain by one poll period first;
    /// an action then fires on a released-to-pressed edge if its class is
    /// not cooling down.
    pub fn poll_actions(&mut self, slot: SlotId, pad: Option<&GamepadSnapshot>) -> Vec<MenuAction> {
        let edges = &mut self.edges[slot];
        for cd in &mut edges.cooldown {
            *cd = cd.saturating_sub(self.poll_ms);
        }

        let mut fired = Vec::new();
        for action in MenuAction::ALL {
            let now_held = pad.is_some_and(|p| p.holds(action, self.deadzone));
            let was_held = std::mem::replace(&mut edges.held[action.index()], now_held);
            let class = action.class();
            if now_held && !was_held && edges.cooldown[class] == 0 {
                edges.cooldown[class] = self.cooldown_ms;
                fired.push(action);
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::SlotState;

    fn aggregator() -> InputAggregator {
        InputAggregator::new(&SessionConfig::default())
    }

    fn playing_slot(id: SlotId) -> PlayerSlot {
        let mut slot = PlayerSlot::new(id);
        slot.state = SlotState::Playing;
        slot
    }

    #[test]
    fn escape_is_exit_for_everyone() {
        let mut input = aggregator();
        assert_eq!(input.key_down("Escape"), Some(MenuAction::Exit));
        assert_eq!(input.key_down("ArrowLeft"), None);
    }

    #[test]
    fn keys_move_only_their_slot() {
        let mut input = aggregator();
        input.key_down("ArrowRight");
        input.key_down("KeyW");

        assert_eq!(input.movement(&playing_slot(0), &[], 10.0), Vec2::new(10.0, 0.0));
        assert_eq!(input.movement(&playing_slot(1), &[], 10.0), Vec2::new(0.0, -10.0));

        input.key_up("ArrowRight");
        assert_eq!(input.movement(&playing_slot(0), &[], 10.0), Vec2::ZERO);
    }

    #[test]
    fn menu_slots_do_not_move() {
        let mut input = aggregator();
        input.key_down("ArrowRight");
        assert_eq!(input.movement(&PlayerSlot::new(0), &[], 10.0), Vec2::ZERO);
    }

    #[test]
    fn gamepad_movement_is_additive() {
        let mut input = aggregator();
        input.key_down("ArrowRight");
        let mut slot = playing_slot(0);
        slot.input.gamepad_index = Some(2);
        let pad = GamepadSnapshot::new(2)
            .with_axes(0.5, -0.25)
            .with_button(DPAD_RIGHT, true);

        let delta = input.movement(&slot, &[pad], 10.0);
        assert!((delta - Vec2::new(25.0, -2.5)).length() < 1e-4);
    }

    #[test]
    fn unbound_pad_is_ignored() {
        let input = aggregator();
        let pad = GamepadSnapshot::new(0).with_axes(1.0, 0.0);
        assert_eq!(input.movement(&playing_slot(0), &[pad], 10.0), Vec2::ZERO);
    }

    #[test]
    fn actions_fire_on_edge_only() {
        let mut input = aggregator();
        let pressed = GamepadSnapshot::new(0).with_button(BUTTON_CONFIRM, true);
        let released = GamepadSnapshot::new(0);

        assert_eq!(input.poll_actions(0, Some(&pressed)), vec![MenuAction::Confirm]);
        // Held: no repeat even after the cooldown drains
        for _ in 0..20 {
            assert!(input.poll_actions(0, Some(&pressed)).is_empty());
        }
        input.poll_actions(0, Some(&released));
        assert_eq!(input.poll_actions(0, Some(&pressed)), vec![MenuAction::Confirm]);
    }

    #[test]
    fn cooldown_blocks_for_600ms_of_polls() {
        let mut input = aggregator();
        let pressed = GamepadSnapshot::new(0).with_button(DPAD_LEFT, true);
        let released = GamepadSnapshot::new(0);

        assert_eq!(input.poll_actions(0, Some(&pressed)), vec![MenuAction::Left]);
        // 11 more polls drain 550ms: still cooling down
        for i in 0..11 {
            let pad = if i % 2 == 0 { &released } else { &pressed };
            assert!(input.poll_actions(0, Some(pad)).is_empty());
        }
        // 12th poll drains to 0 and a fresh edge fires
        input.poll_actions(0, Some(&released));
        assert!(input.edges[0].cooldown[0] <= 50);
        assert_eq!(input.poll_actions(0, Some(&pressed)), vec![MenuAction::Left]);
    }

    #[test]
    fn stick_and_dpad_share_direction_cooldown() {
        let mut input = aggregator();
        let stick = GamepadSnapshot::new(0).with_axes(0.0, 0.9);
        assert_eq!(input.poll_actions(0, Some(&stick)), vec![MenuAction::Down]);

        let dpad = GamepadSnapshot::new(0).with_button(DPAD_RIGHT, true);
        assert!(input.poll_actions(0, Some(&dpad)).is_empty());
    }

    #[test]
    fn buttons_past_standard_layout_are_ignored() {
        let pad = GamepadSnapshot::new(0)
            .with_button(usize::MAX, true)
            .with_button(STANDARD_BUTTONS, true);
        assert_eq!(pad.buttons.len(), STANDARD_BUTTONS);
        assert!(!pad.pressed(usize::MAX));

        // A short button list grows to the standard layout only
        let pad = GamepadSnapshot {
            buttons: Vec::new(),
            ..GamepadSnapshot::new(1)
        }
        .with_button(DPAD_UP, true);
        assert_eq!(pad.buttons.len(), STANDARD_BUTTONS);
        assert!(pad.pressed(DPAD_UP));
    }

    #[test]
    fn deadzone_filters_small_stick() {
        let mut input = aggregator();
        let pad = GamepadSnapshot::new(0).with_axes(0.4, -0.5);
        assert!(input.poll_actions(0, Some(&pad)).is_empty());
    }

    #[test]
    fn classes_cool_down_independently() {
        let mut input = aggregator();
        let up = GamepadSnapshot::new(0).with_button(DPAD_UP, true);
        assert_eq!(input.poll_actions(1, Some(&up)), vec![MenuAction::Up]);

        let up_and_start = up.clone().with_button(BUTTON_START, true);
        assert_eq!(input.poll_actions(1, Some(&up_and_start)), vec![MenuAction::Start]);
    }
}
