use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::events::{EndReason, RoundOutcome, RoundResult};
use crate::player::SLOT_COUNT;
use crate::time::Millis;

/// How a round is won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    FreePlay,
    Race,
    Countdown,
}

impl GameMode {
    /// Menu order.
    pub const ALL: [GameMode; 3] = [Self::FreePlay, Self::Race, Self::Countdown];

    pub fn label(self) -> &'static str {
        match self {
            Self::FreePlay => "Free Play",
            Self::Race => "Race",
            Self::Countdown => "Countdown",
        }
    }

    /// Build the policy object that enforces this mode for one round.
    pub fn create_policy(self, config: &SessionConfig, race_target: u32) -> Box<dyn ModePolicy> {
        match self {
            Self::FreePlay => Box::new(FreePlay),
            Self::Race => Box::new(Race::new(race_target)),
            Self::Countdown => Box::new(Countdown::new(
                u64::from(config.round_duration_secs) * 1000,
            )),
        }
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What a round-timer tick produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerOutcome {
    /// New whole-second display value, only when it changed.
    pub display_secs: Option<u32>,
    pub result: Option<RoundResult>,
}

/// Per-round win condition. One implementation per [`GameMode`].
pub trait ModePolicy: Send {
    fn mode(&self) -> GameMode;

    /// Called once when the round begins.
    fn on_round_start(&mut self, _now: Millis) {}

    /// Called after every score change, with all slot scores.
    fn on_score_changed(&mut self, _scores: &[u32; SLOT_COUNT]) -> Option<RoundResult> {
        None
    }

    /// Called on every round-timer tick. Only invoked if [`uses_timer`] is true.
    ///
    /// [`uses_timer`]: ModePolicy::uses_timer
    fn on_timer(&mut self, _now: Millis, _scores: &[u32; SLOT_COUNT]) -> TimerOutcome {
        TimerOutcome::default()
    }

    fn uses_timer(&self) -> bool {
        false
    }

    /// Whole seconds left in the round, for timed modes.
    fn remaining_secs(&self, _now: Millis) -> Option<u32> {
        None
    }

    /// Percent of the way to winning, for target-based modes.
    fn progress(&self, _score: u32) -> Option<f32> {
        None
    }
}

/// Play until someone leaves.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreePlay;

impl ModePolicy for FreePlay {
    fn mode(&self) -> GameMode {
        GameMode::FreePlay
    }
}

/// First to `target` wins.
#[derive(Debug, Clone, Copy)]
pub struct Race {
    target: u32,
}

impl Race {
    pub fn new(target: u32) -> Self {
        Self {
            target: target.max(1),
        }
    }

    pub fn target(&self) -> u32 {
        self.target
    }
}

impl ModePolicy for Race {
    fn mode(&self) -> GameMode {
        GameMode::Race
    }

    fn on_score_changed(&mut self, scores: &[u32; SLOT_COUNT]) -> Option<RoundResult> {
        // Id order, so the lower slot wins a simultaneous finish
        let winner = scores.iter().position(|&s| s >= self.target)?;
        Some(RoundResult {
            reason: EndReason::Race,
            outcome: RoundOutcome::Winner(winner),
            scores: *scores,
        })
    }

    fn progress(&self, score: u32) -> Option<f32> {
        Some((score as f32 / self.target as f32 * 100.0).min(100.0))
    }
}

/// Highest score when the clock runs out.
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    duration_ms: Millis,
    started_at: Millis,
    last_displayed: Option<u32>,
}

impl Countdown {
    pub fn new(duration_ms: Millis) -> Self {
        Self {
            duration_ms,
            started_at: 0,
            last_displayed: None,
        }
    }

    pub fn remaining_ms(&self, now: Millis) -> Millis {
        self.duration_ms
            .saturating_sub(now.saturating_sub(self.started_at))
    }
}

impl ModePolicy for Countdown {
    fn mode(&self) -> GameMode {
        GameMode::Countdown
    }

    fn on_round_start(&mut self, now: Millis) {
        self.started_at = now;
        self.last_displayed = self.remaining_secs(now);
    }

    fn on_timer(&mut self, now: Millis, scores: &[u32; SLOT_COUNT]) -> TimerOutcome {
        let secs = self.remaining_secs(now);
        let display_secs = if secs != self.last_displayed {
            self.last_displayed = secs;
            secs
        } else {
            None
        };

        let result = (self.remaining_ms(now) == 0).then(|| {
            let outcome = match scores[0].cmp(&scores[1]) {
                std::cmp::Ordering::Greater => RoundOutcome::Winner(0),
                std::cmp::Ordering::Less => RoundOutcome::Winner(1),
                std::cmp::Ordering::Equal => RoundOutcome::Tie,
            };
            RoundResult {
                reason: EndReason::Countdown,
                outcome,
                scores: *scores,
            }
        });

        TimerOutcome {
            display_secs,
            result,
        }
    }

    fn uses_timer(&self) -> bool {
        true
    }

    fn remaining_secs(&self, now: Millis) -> Option<u32> {
        Some(self.remaining_ms(now).div_ceil(1000) as u32)
    }
}
