use serde::{Deserialize, Serialize};

use crate::time::Millis;

/// Data-driven timing configuration for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Length of the character-selection countdown (seconds).
    pub selection_countdown_secs: u32,
    /// Delay between countdown auto-assignment and the round starting (ms).
    pub settle_delay_ms: Millis,
    /// Gamepad menu poll period (ms). Cooldowns drain by this much per poll.
    pub input_poll_ms: Millis,
    /// Lockout after a menu action fires, per action class (ms).
    pub nav_cooldown_ms: Millis,
    /// Stick magnitude that counts as a navigation press.
    pub stick_deadzone: f32,
    /// Fallback gamepad discovery period (ms).
    pub discovery_poll_ms: Millis,
    /// Countdown-mode round length (seconds).
    pub round_duration_secs: u32,
    /// Countdown-mode timer recompute period (ms).
    pub round_timer_tick_ms: Millis,
    /// Default score target for race mode.
    pub race_target: u32,
    /// Shortest prize lifetime (ms, inclusive).
    pub prize_lifetime_min_ms: Millis,
    /// Longest prize lifetime (ms, exclusive).
    pub prize_lifetime_max_ms: Millis,
    /// Prizes throb once this little time remains (ms).
    pub throb_window_ms: Millis,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            selection_countdown_secs: 15,
            settle_delay_ms: 500,
            input_poll_ms: 50,
            nav_cooldown_ms: 600,
            stick_deadzone: 0.5,
            discovery_poll_ms: 500,
            round_duration_secs: 60,
            round_timer_tick_ms: 100,
            race_target: 15,
            prize_lifetime_min_ms: 10_000,
            prize_lifetime_max_ms: 15_000,
            throb_window_ms: 5_000,
        }
    }
}

impl SessionConfig {
    /// Check internal consistency, returning a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        if self.input_poll_ms == 0 {
            return Err("input_poll_ms must be > 0".to_string());
        }
        if self.discovery_poll_ms == 0 {
            return Err("discovery_poll_ms must be > 0".to_string());
        }
        if self.round_timer_tick_ms == 0 {
            return Err("round_timer_tick_ms must be > 0".to_string());
        }
        if self.prize_lifetime_min_ms >= self.prize_lifetime_max_ms {
            return Err("prize_lifetime_min_ms must be below prize_lifetime_max_ms".to_string());
        }
        if !(0.0..1.0).contains(&self.stick_deadzone) {
            return Err("stick_deadzone must be in [0, 1)".to_string());
        }
        if self.race_target == 0 {
            return Err("race_target must be > 0".to_string());
        }
        Ok(())
    }
}
