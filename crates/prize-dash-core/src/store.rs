use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::CharacterId;
use crate::config::SessionConfig;
use crate::events::{RoundResult, UiEvent};
use crate::game_mode::GameMode;
use crate::player::{PlayerSlot, SLOT_COUNT, SlotId};
use crate::prize::Prize;
use crate::time::Millis;

/// Session-level phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Start,
    Playing,
    Ended,
}

/// Character-selection countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownState {
    pub active: bool,
    pub remaining_secs: u32,
    pub started_at: Option<Millis>,
}

/// Countdown-mode round timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTimer {
    pub remaining_secs: u32,
    pub started_at: Millis,
}

/// Everything the session knows. One instance per process, owned by the
/// [`SessionStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    pub game_mode: Option<GameMode>,
    pub countdown: CountdownState,
    pub game_timer: Option<GameTimer>,
    pub race_target: u32,
    pub prizes: Vec<Prize>,
    pub players: [PlayerSlot; SLOT_COUNT],
    /// Canvas width (x) and height (y) in pixels.
    pub canvas: Vec2,
    /// Exit confirmation is showing; the simulation holds still.
    pub exit_prompt: bool,
    pub result: Option<RoundResult>,
}

impl SessionState {
    pub fn new(canvas: Vec2, config: &SessionConfig) -> Self {
        Self {
            phase: Phase::Start,
            game_mode: None,
            countdown: CountdownState {
                active: false,
                remaining_secs: config.selection_countdown_secs,
                started_at: None,
            },
            game_timer: None,
            race_target: config.race_target,
            prizes: Vec::new(),
            players: [PlayerSlot::new(0), PlayerSlot::new(1)],
            canvas,
            exit_prompt: false,
            result: None,
        }
    }

    /// Back to the freshly created shape, keeping canvas and gamepad bindings.
    pub fn reset_to_menu(&mut self, config: &SessionConfig) {
        let canvas = self.canvas;
        let bindings = self.gamepad_bindings();
        *self = Self::new(canvas, config);
        for (slot, binding) in self.players.iter_mut().zip(bindings) {
            slot.input.gamepad_index = binding;
        }
    }

    pub fn gamepad_bindings(&self) -> [Option<usize>; SLOT_COUNT] {
        [
            self.players[0].input.gamepad_index,
            self.players[1].input.gamepad_index,
        ]
    }

    /// Which slot currently holds `id`, if any.
    pub fn holder_of(&self, id: &CharacterId) -> Option<SlotId> {
        self.players
            .iter()
            .find(|p| p.character.as_ref() == Some(id))
            .map(|p| p.id)
    }

    pub fn scores(&self) -> [u32; SLOT_COUNT] {
        [self.players[0].score, self.players[1].score]
    }
}

/// Receives every committed update. Observers see the state read-only and
/// cannot reach the store while being notified.
pub trait SessionObserver: Send {
    fn on_update(&mut self, state: &SessionState, events: &[UiEvent]);
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionState, &[UiEvent]) + Send,
{
    fn on_update(&mut self, state: &SessionState, events: &[UiEvent]) {
        self(state, events)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Owner of the single [`SessionState`]. All mutation goes through
/// [`SessionStore::update`], which notifies observers synchronously.
pub struct SessionStore {
    state: SessionState,
    observers: Vec<(SubscriptionId, Box<dyn SessionObserver>)>,
    next_id: u64,
}

impl SessionStore {
    pub fn new(state: SessionState) -> Self {
        Self {
            state,
            observers: Vec::new(),
            next_id: 1,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn subscribe(&mut self, observer: impl SessionObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Apply a read-modify-write to the state, then notify every observer with
    /// the events the mutation produced.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut SessionState, &mut Vec<UiEvent>) -> R) -> R {
        let mut events = Vec::new();
        let out = f(&mut self.state, &mut events);
        for (_, observer) in &mut self.observers {
            observer.on_update(&self.state, &events);
        }
        out
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}
