use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::CharacterId;

/// Index of one of the two fixed player slots.
pub type SlotId = usize;

/// Number of player slots. Fixed, not a dynamic player list.
pub const SLOT_COUNT: usize = 2;

/// The slot across from `slot`.
pub fn other_slot(slot: SlotId) -> SlotId {
    1 - slot
}

/// Where a slot's sprite is placed when a round starts.
pub fn spawn_position(slot: SlotId) -> Vec2 {
    Vec2::new(100.0 + slot as f32 * 200.0, 100.0)
}

/// Movement / navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Fixed keyboard layout bound to a slot at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyboardProfile {
    /// Arrow keys (slot 0).
    Arrows,
    /// W/A/S/D (slot 1).
    Wasd,
}

impl KeyboardProfile {
    pub fn for_slot(slot: SlotId) -> Self {
        if slot == 0 { Self::Arrows } else { Self::Wasd }
    }

    /// Map a key code to a direction if it belongs to this layout.
    pub fn direction(self, code: &str) -> Option<Direction> {
        match (self, code) {
            (Self::Arrows, "ArrowLeft") | (Self::Wasd, "KeyA") => Some(Direction::Left),
            (Self::Arrows, "ArrowRight") | (Self::Wasd, "KeyD") => Some(Direction::Right),
            (Self::Arrows, "ArrowUp") | (Self::Wasd, "KeyW") => Some(Direction::Up),
            (Self::Arrows, "ArrowDown") | (Self::Wasd, "KeyS") => Some(Direction::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSource {
    pub keyboard: KeyboardProfile,
    pub gamepad_index: Option<usize>,
}

/// Per-slot progression through the menus into play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotState {
    CharacterSelection,
    ModeSelection,
    WaitingToStart,
    Playing,
}

/// One of the two player positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSlot {
    pub id: SlotId,
    pub character: Option<CharacterId>,
    pub score: u32,
    pub position: Vec2,
    pub input: InputSource,
    pub state: SlotState,
    /// Highlighted menu entry: a character index while selecting a
    /// character, a mode index while selecting a mode.
    pub cursor: usize,
}

impl PlayerSlot {
    pub fn new(id: SlotId) -> Self {
        Self {
            id,
            character: None,
            score: 0,
            position: spawn_position(id),
            input: InputSource {
                keyboard: KeyboardProfile::for_slot(id),
                gamepad_index: None,
            },
            state: SlotState::CharacterSelection,
            cursor: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == SlotState::Playing
    }

    pub fn has_character(&self) -> bool {
        self.character.is_some()
    }

    /// Back to a fresh menu slot. The gamepad binding survives.
    pub fn reset_for_menu(&mut self) {
        let gamepad_index = self.input.gamepad_index;
        *self = Self::new(self.id);
        self.input.gamepad_index = gamepad_index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_profiles_fixed_per_slot() {
        assert_eq!(PlayerSlot::new(0).input.keyboard, KeyboardProfile::Arrows);
        assert_eq!(PlayerSlot::new(1).input.keyboard, KeyboardProfile::Wasd);
    }

    #[test]
    fn profiles_ignore_foreign_keys() {
        assert_eq!(
            KeyboardProfile::Arrows.direction("ArrowUp"),
            Some(Direction::Up)
        );
        assert_eq!(KeyboardProfile::Arrows.direction("KeyW"), None);
        assert_eq!(KeyboardProfile::Wasd.direction("KeyD"), Some(Direction::Right));
        assert_eq!(KeyboardProfile::Wasd.direction("ArrowRight"), None);
    }

    #[test]
    fn reset_keeps_gamepad_binding() {
        let mut slot = PlayerSlot::new(1);
        slot.character = Some(CharacterId::new("aria"));
        slot.score = 7;
        slot.state = SlotState::Playing;
        slot.input.gamepad_index = Some(3);

        slot.reset_for_menu();
        assert_eq!(slot.character, None);
        assert_eq!(slot.score, 0);
        assert_eq!(slot.state, SlotState::CharacterSelection);
        assert_eq!(slot.input.gamepad_index, Some(3));
        assert_eq!(slot.position, spawn_position(1));
    }
}
