use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use crate::catalog::{Catalog, CharacterId};
use crate::config::SessionConfig;
use crate::events::{RoundResult, UiEvent};
use crate::game_mode::{GameMode, ModePolicy};
use crate::input::{GamepadSnapshot, InputAggregator, MenuAction};
use crate::player::{SLOT_COUNT, SlotId, SlotState, other_slot};
use crate::prize::PrizeRules;
use crate::simulation::{self, RenderSink, Step};
use crate::store::{
    CountdownState, GameTimer, Phase, SessionObserver, SessionState, SessionStore,
    SubscriptionId,
};
use crate::time::{Millis, OneShotTimer, RepeatingTimer};

/// Shown when start is requested before anyone is ready.
pub const NOBODY_READY_MESSAGE: &str = "At least one player must be ready to start!";

const SELECTION_TICK_MS: Millis = 1000;

/// Why a session operation was rejected. The state is untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    UnknownCharacter(CharacterId),
    CharacterUnavailable(CharacterId),
    CharacterTaken { id: CharacterId, holder: SlotId },
    InvalidState(&'static str),
    NobodyReady,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCharacter(id) => write!(f, "unknown character: {id}"),
            Self::CharacterUnavailable(id) => write!(f, "character not available: {id}"),
            Self::CharacterTaken { id, holder } => {
                write!(f, "character {id} already taken by player {}", holder + 1)
            },
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::NobodyReady => f.write_str(NOBODY_READY_MESSAGE),
        }
    }
}

impl std::error::Error for SessionError {}

fn reject(err: SessionError) -> Result<(), SessionError> {
    tracing::debug!(error = %err, "Session operation rejected");
    Err(err)
}

/// One local two-player session: menus, round lifecycle and the per-frame
/// simulation, driven by a host that supplies time, input and a renderer.
pub struct Session {
    store: SessionStore,
    catalog: Catalog,
    config: SessionConfig,
    rules: PrizeRules,
    input: InputAggregator,
    policy: Option<Box<dyn ModePolicy>>,
    selection_timer: RepeatingTimer,
    round_timer: RepeatingTimer,
    settle: OneShotTimer,
    rng: StdRng,
}

impl Session {
    pub fn new(catalog: Catalog, config: SessionConfig, canvas: Vec2) -> Self {
        Self::with_rng(catalog, config, canvas, StdRng::from_os_rng())
    }

    /// Deterministic session for tests and replays.
    pub fn with_seed(catalog: Catalog, config: SessionConfig, canvas: Vec2, seed: u64) -> Self {
        Self::with_rng(catalog, config, canvas, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: Catalog, config: SessionConfig, canvas: Vec2, rng: StdRng) -> Self {
        let state = SessionState::new(canvas, &config);
        Self {
            store: SessionStore::new(state),
            rules: PrizeRules::new(catalog.settings(), &config),
            input: InputAggregator::new(&config),
            policy: None,
            selection_timer: RepeatingTimer::new(SELECTION_TICK_MS),
            round_timer: RepeatingTimer::new(config.round_timer_tick_ms),
            settle: OneShotTimer::default(),
            rng,
            catalog,
            config,
        }
    }

    pub fn state(&self) -> &SessionState {
        self.store.state()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn subscribe(&mut self, observer: impl SessionObserver + 'static) -> SubscriptionId {
        self.store.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    // ---- Character and mode selection ----

    /// Claim a character for `slot` and move it on to mode selection.
    pub fn select_character(
        &mut self,
        slot: SlotId,
        id: CharacterId,
        now: Millis,
    ) -> Result<(), SessionError> {
        let state = self.store.state();
        if slot >= SLOT_COUNT {
            return reject(SessionError::InvalidState("no such slot"));
        }
        if state.phase != Phase::Start {
            return reject(SessionError::InvalidState("round already running"));
        }
        if state.players[slot].state != SlotState::CharacterSelection {
            return reject(SessionError::InvalidState("slot already has a character"));
        }
        if self.catalog.get(&id).is_none() {
            return reject(SessionError::UnknownCharacter(id));
        }
        if !self.catalog.is_available(&id) {
            return reject(SessionError::CharacterUnavailable(id));
        }
        if let Some(holder) = state.holder_of(&id) {
            return reject(SessionError::CharacterTaken { id, holder });
        }

        tracing::info!(slot, character = %id, "Character selected");
        let countdown_secs = self.config.selection_countdown_secs;
        let selection_timer = &mut self.selection_timer;
        let available = self.catalog.available();
        self.store.update(|state, events| {
            assign_character(state, events, slot, id.clone());

            let other = other_slot(slot);
            let other_cursor = state.players[other].cursor;
            if state.players[other].state == SlotState::CharacterSelection
                && available.get(other_cursor) == Some(&id)
                && let Some(index) = first_free(available, Some(&id))
            {
                state.players[other].cursor = index;
                events.push(UiEvent::CursorMoved { slot: other, index });
            }
            if state.players[other].character.is_none() {
                if !state.countdown.active {
                    state.countdown = CountdownState {
                        active: true,
                        remaining_secs: countdown_secs,
                        started_at: Some(now),
                    };
                    events.push(UiEvent::CountdownTick {
                        remaining_secs: countdown_secs,
                    });
                    selection_timer.start(now);
                    tracing::debug!(secs = countdown_secs, "Selection countdown started");
                }
            } else if state.countdown.active {
                stop_countdown(state, events, countdown_secs);
                selection_timer.cancel();
            }

            evaluate_barrier(state, events);
        });
        Ok(())
    }

    /// Give up the slot's character and return it to character selection.
    pub fn deselect(&mut self, slot: SlotId) -> Result<(), SessionError> {
        let state = self.store.state();
        if slot >= SLOT_COUNT || state.phase != Phase::Start {
            return reject(SessionError::InvalidState("nothing to deselect"));
        }
        if !matches!(
            state.players[slot].state,
            SlotState::ModeSelection | SlotState::WaitingToStart
        ) {
            return reject(SessionError::InvalidState("slot has no character"));
        }

        let countdown_secs = self.config.selection_countdown_secs;
        let available = self.catalog.available();
        self.selection_timer.cancel();
        self.settle.cancel();
        self.store.update(|state, events| {
            let taken = state.players[other_slot(slot)].character.clone();
            let player = &mut state.players[slot];
            player.character = None;
            player.state = SlotState::CharacterSelection;
            player.cursor = first_free(available, taken.as_ref()).unwrap_or(0);
            events.push(UiEvent::SelectionChanged {
                slot,
                character: None,
            });
            events.push(UiEvent::SlotStateChanged {
                slot,
                state: SlotState::CharacterSelection,
            });
            if state.countdown.active {
                stop_countdown(state, events, countdown_secs);
            }
        });
        tracing::info!(slot, "Character deselected");
        Ok(())
    }

    pub fn select_mode(&mut self, mode: GameMode) -> Result<(), SessionError> {
        if self.store.state().phase != Phase::Start {
            return reject(SessionError::InvalidState("mode is fixed once playing"));
        }
        self.store.update(|state, events| {
            state.game_mode = Some(mode);
            events.push(UiEvent::ModeChanged { mode: Some(mode) });
            evaluate_barrier(state, events);
        });
        tracing::info!(%mode, "Game mode selected");
        Ok(())
    }

    /// Begin the round with every ready slot. Slots without a character sit
    /// it out.
    pub fn start(&mut self, now: Millis) -> Result<(), SessionError> {
        let state = self.store.state();
        if state.phase != Phase::Start {
            return reject(SessionError::InvalidState("round already running"));
        }
        if !state
            .players
            .iter()
            .any(|p| p.state == SlotState::WaitingToStart)
        {
            self.store.update(|_, events| {
                events.push(UiEvent::Notice {
                    message: NOBODY_READY_MESSAGE.to_string(),
                });
            });
            return reject(SessionError::NobodyReady);
        }

        let countdown_secs = self.config.selection_countdown_secs;
        self.selection_timer.cancel();
        self.settle.cancel();
        self.store.update(|state, events| {
            if state.countdown.active {
                stop_countdown(state, events, countdown_secs);
            }
            for player in &mut state.players {
                if player.state == SlotState::WaitingToStart {
                    player.state = SlotState::Playing;
                    events.push(UiEvent::SlotStateChanged {
                        slot: player.id,
                        state: SlotState::Playing,
                    });
                }
            }
        });
        self.begin_round(now);
        Ok(())
    }

    // ---- Leaving ----

    /// Session-wide reset back to the character menu. Gamepad bindings stay.
    pub fn exit(&mut self) {
        self.selection_timer.cancel();
        self.round_timer.cancel();
        self.settle.cancel();
        self.policy = None;
        self.input.clear_keys();

        let config = &self.config;
        self.store.update(|state, events| {
            let prompt_was_open = state.exit_prompt;
            state.reset_to_menu(config);
            if prompt_was_open {
                events.push(UiEvent::ExitPrompt { open: false });
            }
            events.push(UiEvent::PhaseChanged { phase: Phase::Start });
            events.push(UiEvent::ModeChanged { mode: None });
            for slot in 0..SLOT_COUNT {
                events.push(UiEvent::SelectionChanged {
                    slot,
                    character: None,
                });
                events.push(UiEvent::SlotStateChanged {
                    slot,
                    state: SlotState::CharacterSelection,
                });
            }
        });
        tracing::info!("Session reset to menu");
    }

    /// Ask to leave. While playing this opens the confirmation prompt and
    /// pauses the simulation; after a round it leaves straight away.
    pub fn request_exit(&mut self) {
        match self.store.state().phase {
            Phase::Playing => {
                if self.store.state().exit_prompt {
                    return;
                }
                self.store.update(|state, events| {
                    state.exit_prompt = true;
                    events.push(UiEvent::ExitPrompt { open: true });
                });
            },
            Phase::Ended => self.exit(),
            Phase::Start => tracing::debug!("Exit requested from the menu, ignoring"),
        }
    }

    pub fn cancel_exit(&mut self) {
        if !self.store.state().exit_prompt {
            return;
        }
        self.store.update(|state, events| {
            state.exit_prompt = false;
            events.push(UiEvent::ExitPrompt { open: false });
        });
    }

    pub fn confirm_exit(&mut self) {
        if self.store.state().exit_prompt {
            self.exit();
        }
    }

    // ---- Input ----

    pub fn key_down(&mut self, code: &str, now: Millis) {
        // Session-wide, so one dispatch covers every slot
        if let Some(action) = self.input.key_down(code) {
            self.handle_menu_action(0, action, now);
        }
    }

    pub fn key_up(&mut self, code: &str) {
        self.input.key_up(code);
    }

    /// Menu poll: turn gamepad edges into actions for each bound slot.
    pub fn poll_gamepads(&mut self, pads: &[GamepadSnapshot], now: Millis) {
        for slot in 0..SLOT_COUNT {
            let pad = self.store.state().players[slot]
                .input
                .gamepad_index
                .and_then(|index| pads.iter().find(|p| p.index == index));
            for action in self.input.poll_actions(slot, pad) {
                self.handle_menu_action(slot, action, now);
            }
        }
    }

    /// Route a discrete action according to the phase and the slot's state.
    pub fn handle_menu_action(&mut self, slot: SlotId, action: MenuAction, now: Millis) {
        if slot >= SLOT_COUNT {
            return;
        }
        let state = self.store.state();
        match state.phase {
            Phase::Ended => {
                if matches!(
                    action,
                    MenuAction::Confirm | MenuAction::Start | MenuAction::Exit
                ) {
                    self.exit();
                }
            },
            Phase::Playing => match (action, state.exit_prompt) {
                (MenuAction::Exit, false) => self.request_exit(),
                (MenuAction::Exit | MenuAction::Back, true) => self.cancel_exit(),
                (MenuAction::Confirm, true) => self.confirm_exit(),
                _ => {},
            },
            Phase::Start => {
                // Rejections are already logged and leave the state alone
                let _ = match (state.players[slot].state, action) {
                    (SlotState::CharacterSelection, MenuAction::Left | MenuAction::Up) => {
                        self.move_character_cursor(slot, -1);
                        Ok(())
                    },
                    (SlotState::CharacterSelection, MenuAction::Right | MenuAction::Down) => {
                        self.move_character_cursor(slot, 1);
                        Ok(())
                    },
                    (SlotState::CharacterSelection, MenuAction::Confirm) => {
                        let highlighted = self
                            .catalog
                            .available()
                            .get(state.players[slot].cursor)
                            .cloned();
                        match highlighted {
                            Some(id) => self.select_character(slot, id, now),
                            None => Ok(()),
                        }
                    },
                    (SlotState::ModeSelection, MenuAction::Left | MenuAction::Up) => {
                        self.move_mode_cursor(slot, -1);
                        Ok(())
                    },
                    (SlotState::ModeSelection, MenuAction::Right | MenuAction::Down) => {
                        self.move_mode_cursor(slot, 1);
                        Ok(())
                    },
                    (SlotState::ModeSelection, MenuAction::Confirm) => {
                        let index = state.players[slot].cursor % GameMode::ALL.len();
                        self.select_mode(GameMode::ALL[index])
                    },
                    (SlotState::WaitingToStart, MenuAction::Start) => self.start(now),
                    (SlotState::ModeSelection | SlotState::WaitingToStart, MenuAction::Back) => {
                        self.deselect(slot)
                    },
                    _ => Ok(()),
                };
            },
        }
    }

    /// Step the character cursor, skipping the character the other slot holds.
    fn move_character_cursor(&mut self, slot: SlotId, delta: isize) {
        let available = self.catalog.available();
        let n = available.len();
        if n == 0 {
            return;
        }
        let state = self.store.state();
        let taken = state.players[other_slot(slot)].character.as_ref();
        let mut index = state.players[slot].cursor.min(n - 1);
        let mut target = None;
        for _ in 0..n {
            index = (index as isize + delta).rem_euclid(n as isize) as usize;
            if Some(&available[index]) != taken {
                target = Some(index);
                break;
            }
        }
        let Some(index) = target else { return };
        self.store.update(|state, events| {
            state.players[slot].cursor = index;
            events.push(UiEvent::CursorMoved { slot, index });
        });
    }

    fn move_mode_cursor(&mut self, slot: SlotId, delta: isize) {
        let n = GameMode::ALL.len() as isize;
        let index =
            (self.store.state().players[slot].cursor as isize + delta).rem_euclid(n) as usize;
        self.store.update(|state, events| {
            state.players[slot].cursor = index;
            events.push(UiEvent::CursorMoved { slot, index });
        });
    }

    // ---- Gamepads ----

    /// Bind a newly connected pad to the first slot without one.
    pub fn gamepad_connected(&mut self, index: usize) {
        let state = self.store.state();
        if state.players.iter().any(|p| p.input.gamepad_index == Some(index)) {
            return;
        }
        let Some(slot) = state
            .players
            .iter()
            .position(|p| p.input.gamepad_index.is_none())
        else {
            tracing::debug!(index, "Both slots already have a gamepad");
            return;
        };
        self.input.reset_slot(slot);
        self.store.update(|state, events| {
            state.players[slot].input.gamepad_index = Some(index);
            events.push(UiEvent::GamepadsChanged {
                bindings: state.gamepad_bindings(),
            });
        });
        tracing::info!(index, slot, "Gamepad connected");
    }

    pub fn gamepad_disconnected(&mut self, index: usize) {
        let Some(slot) = self
            .store
            .state()
            .players
            .iter()
            .position(|p| p.input.gamepad_index == Some(index))
        else {
            return;
        };
        self.input.reset_slot(slot);
        self.store.update(|state, events| {
            state.players[slot].input.gamepad_index = None;
            events.push(UiEvent::GamepadsChanged {
                bindings: state.gamepad_bindings(),
            });
        });
        tracing::info!(index, slot, "Gamepad disconnected");
    }

    /// Fallback discovery: bind every connected, unbound pad in index order.
    pub fn discover_gamepads(&mut self, pads: &[GamepadSnapshot]) {
        let mut indices: Vec<usize> = pads.iter().map(|p| p.index).collect();
        indices.sort_unstable();
        indices.dedup();
        for index in indices {
            self.gamepad_connected(index);
        }
    }

    // ---- Canvas ----

    pub fn resize(&mut self, width: f32, height: f32, now: Millis) {
        let Self {
            store,
            catalog,
            rules,
            rng,
            ..
        } = self;
        store.update(|state, _| {
            state.canvas = Vec2::new(width, height);
            if state.phase == Phase::Playing {
                simulation::regenerate_prizes(state, catalog, rules, rng, now);
            }
        });
        tracing::debug!(width, height, "Canvas resized");
    }

    // ---- Round lifecycle ----

    fn begin_round(&mut self, now: Millis) {
        let mode = self.store.state().game_mode.unwrap_or(GameMode::FreePlay);
        let mut policy = mode.create_policy(&self.config, self.store.state().race_target);
        policy.on_round_start(now);

        let Self {
            store,
            catalog,
            rules,
            rng,
            ..
        } = self;
        store.update(|state, events| {
            state.phase = Phase::Playing;
            state.exit_prompt = false;
            events.push(UiEvent::PhaseChanged {
                phase: Phase::Playing,
            });
            simulation::start_round(state, events, catalog, rules, &*policy, rng, now);
            state.game_timer = policy.remaining_secs(now).map(|remaining_secs| GameTimer {
                remaining_secs,
                started_at: now,
            });
            if let Some(timer) = state.game_timer {
                events.push(UiEvent::TimerTick {
                    remaining_secs: timer.remaining_secs,
                });
            }
        });

        if policy.uses_timer() {
            self.round_timer.start(now);
        } else {
            self.round_timer.cancel();
        }
        let players = self.store.state().players.iter().filter(|p| p.is_playing()).count();
        tracing::info!(%mode, players, "Round started");
        self.policy = Some(policy);
    }

    fn finish_round(&mut self, result: RoundResult) {
        self.round_timer.cancel();
        tracing::info!(
            reason = ?result.reason,
            outcome = ?result.outcome,
            scores = ?result.scores,
            "Round ended"
        );
        self.store.update(|state, events| end_round(state, events, result));
    }

    /// Run one display frame. Returns whether the host should keep
    /// scheduling frames.
    pub fn frame(&mut self, now: Millis, pads: &[GamepadSnapshot], renderer: &mut dyn RenderSink) -> bool {
        if self.store.state().phase != Phase::Playing {
            return false;
        }

        if !self.store.state().exit_prompt {
            let move_speed = self.catalog.settings().move_speed;
            let state = self.store.state();
            let movement = [0, 1].map(|i| self.input.movement(&state.players[i], pads, move_speed));

            let Some(policy) = self.policy.as_deref_mut() else {
                tracing::warn!("Playing without a mode policy");
                return false;
            };
            let mut step = Step {
                now,
                catalog: &self.catalog,
                rules: &self.rules,
                movement,
                policy,
                rng: &mut self.rng,
            };
            let result = self
                .store
                .update(|state, events| simulation::tick(state, events, &mut step));
            if let Some(result) = result {
                self.finish_round(result);
            }
        }

        let frame = simulation::snapshot(
            self.store.state(),
            &self.catalog,
            now,
            self.config.throb_window_ms,
        );
        renderer.draw(&frame);
        self.store.state().phase == Phase::Playing
    }

    // ---- Timers ----

    /// Earliest pending timer deadline, if any timer is armed.
    pub fn next_timer_deadline(&self) -> Option<Millis> {
        [
            self.selection_timer.next_due(),
            self.round_timer.next_due(),
            self.settle.due(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Fire every timer that is due at `now`.
    pub fn run_due_timers(&mut self, now: Millis) {
        if self.selection_timer.poll(now) {
            self.selection_tick(now);
        }
        if self.round_timer.poll(now) {
            self.round_tick(now);
        }
        if self.settle.poll(now) {
            self.settle_elapsed(now);
        }
    }

    fn selection_tick(&mut self, now: Millis) {
        let state = self.store.state();
        let Some(started_at) = state.countdown.started_at.filter(|_| state.countdown.active)
        else {
            self.selection_timer.cancel();
            return;
        };
        if state.phase != Phase::Start {
            self.selection_timer.cancel();
            return;
        }

        let total = self.config.selection_countdown_secs;
        let elapsed_secs = (now.saturating_sub(started_at) / 1000) as u32;
        let remaining = total.saturating_sub(elapsed_secs);

        let Self {
            store,
            catalog,
            rng,
            ..
        } = self;
        store.update(|state, events| {
            state.countdown.remaining_secs = remaining;
            events.push(UiEvent::CountdownTick {
                remaining_secs: remaining,
            });
            if remaining > 0 {
                return;
            }

            state.countdown.active = false;
            state.countdown.started_at = None;
            for slot in 0..SLOT_COUNT {
                if state.players[slot].state != SlotState::CharacterSelection {
                    continue;
                }
                let taken = state.players[other_slot(slot)].character.clone();
                let candidates: Vec<&CharacterId> = catalog
                    .available()
                    .iter()
                    .filter(|id| Some(*id) != taken.as_ref())
                    .collect();
                match candidates.choose(rng) {
                    Some(id) => {
                        let id = (*id).clone();
                        tracing::info!(slot, character = %id, "Character auto-assigned");
                        assign_character(state, events, slot, id);
                    },
                    None => tracing::warn!(slot, "No character left to auto-assign"),
                }
            }
            if state.game_mode.is_none() {
                state.game_mode = Some(GameMode::FreePlay);
                events.push(UiEvent::ModeChanged {
                    mode: Some(GameMode::FreePlay),
                });
            }
            evaluate_barrier(state, events);
        });

        if remaining == 0 {
            self.selection_timer.cancel();
            self.settle.arm(now, self.config.settle_delay_ms);
        }
    }

    fn round_tick(&mut self, now: Millis) {
        if self.store.state().phase != Phase::Playing {
            self.round_timer.cancel();
            return;
        }
        let Some(policy) = self.policy.as_deref_mut() else {
            self.round_timer.cancel();
            return;
        };
        let outcome = policy.on_timer(now, &self.store.state().scores());

        if let Some(remaining_secs) = outcome.display_secs {
            self.store.update(|state, events| {
                if let Some(timer) = &mut state.game_timer {
                    timer.remaining_secs = remaining_secs;
                }
                events.push(UiEvent::TimerTick { remaining_secs });
            });
        }
        if let Some(result) = outcome.result {
            self.finish_round(result);
        }
    }

    /// Settle delay after countdown expiry: everyone holding a character plays.
    fn settle_elapsed(&mut self, now: Millis) {
        let state = self.store.state();
        if state.phase != Phase::Start {
            return;
        }
        if !state.players.iter().any(|p| p.has_character()) {
            tracing::warn!("Countdown expired with nobody holding a character");
            return;
        }
        self.store.update(|state, events| {
            for player in state.players.iter_mut().filter(|p| p.has_character()) {
                player.state = SlotState::Playing;
                events.push(UiEvent::SlotStateChanged {
                    slot: player.id,
                    state: SlotState::Playing,
                });
            }
        });
        self.begin_round(now);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store)
            .field("mode", &self.policy.as_ref().map(|p| p.mode()))
            .field("next_deadline", &self.next_timer_deadline())
            .finish_non_exhaustive()
    }
}

fn assign_character(
    state: &mut SessionState,
    events: &mut Vec<UiEvent>,
    slot: SlotId,
    id: CharacterId,
) {
    let player = &mut state.players[slot];
    player.character = Some(id.clone());
    player.state = SlotState::ModeSelection;
    player.cursor = 0;
    events.push(UiEvent::SelectionChanged {
        slot,
        character: Some(id),
    });
    events.push(UiEvent::SlotStateChanged {
        slot,
        state: SlotState::ModeSelection,
    });
}

/// Index of the first available character nobody else holds.
fn first_free(available: &[CharacterId], taken: Option<&CharacterId>) -> Option<usize> {
    available.iter().position(|c| Some(c) != taken)
}

fn stop_countdown(state: &mut SessionState, events: &mut Vec<UiEvent>, total_secs: u32) {
    state.countdown = CountdownState {
        active: false,
        remaining_secs: total_secs,
        started_at: None,
    };
    events.push(UiEvent::CountdownCancelled);
}

/// Once a mode is chosen and every character holder has reached mode
/// selection, all of them become ready.
fn evaluate_barrier(state: &mut SessionState, events: &mut Vec<UiEvent>) {
    if state.game_mode.is_none() {
        return;
    }
    let all_through = state
        .players
        .iter()
        .filter(|p| p.has_character())
        .all(|p| matches!(p.state, SlotState::ModeSelection | SlotState::WaitingToStart));
    if !all_through {
        return;
    }
    for player in &mut state.players {
        if player.state == SlotState::ModeSelection {
            player.state = SlotState::WaitingToStart;
            events.push(UiEvent::SlotStateChanged {
                slot: player.id,
                state: SlotState::WaitingToStart,
            });
        }
    }
}

fn end_round(state: &mut SessionState, events: &mut Vec<UiEvent>, result: RoundResult) {
    state.phase = Phase::Ended;
    state.exit_prompt = false;
    state.result = Some(result.clone());
    events.push(UiEvent::PhaseChanged {
        phase: Phase::Ended,
    });
    events.push(UiEvent::RoundEnded(result));
}
