use serde::{Deserialize, Serialize};

use crate::catalog::CharacterId;
use crate::game_mode::GameMode;
use crate::player::{SLOT_COUNT, SlotId, SlotState};
use crate::store::Phase;

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    Race,
    Countdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Winner(SlotId),
    Tie,
}

/// Final word on a finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub reason: EndReason,
    pub outcome: RoundOutcome,
    pub scores: [u32; SLOT_COUNT],
}

/// Notifications for the presentation layer. Emitted from inside a store
/// update and delivered to every subscriber once the update completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    ScoreChanged {
        slot: SlotId,
        score: u32,
        /// Percent of the race target reached, race mode only.
        race_progress: Option<f32>,
    },
    SelectionChanged {
        slot: SlotId,
        character: Option<CharacterId>,
    },
    CursorMoved {
        slot: SlotId,
        index: usize,
    },
    SlotStateChanged {
        slot: SlotId,
        state: SlotState,
    },
    CountdownTick {
        remaining_secs: u32,
    },
    CountdownCancelled,
    ModeChanged {
        mode: Option<GameMode>,
    },
    PhaseChanged {
        phase: Phase,
    },
    TimerTick {
        remaining_secs: u32,
    },
    ExitPrompt {
        open: bool,
    },
    GamepadsChanged {
        bindings: [Option<usize>; SLOT_COUNT],
    },
    Notice {
        message: String,
    },
    RoundEnded(RoundResult),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ui_event_json_is_tagged() {
        let json = serde_json::to_value(UiEvent::CountdownTick { remaining_secs: 9 }).unwrap();
        assert_eq!(json["type"], "countdown_tick");
        assert_eq!(json["remaining_secs"], 9);
    }

    #[test]
    fn round_ended_carries_result() {
        let event = UiEvent::RoundEnded(RoundResult {
            reason: EndReason::Race,
            outcome: RoundOutcome::Winner(1),
            scores: [4, 15],
        });
        let json = serde_json::to_string(&event).unwrap();
        let back: UiEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
