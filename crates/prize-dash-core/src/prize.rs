use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::GameSettings;
use crate::config::SessionConfig;
use crate::time::Millis;

/// Smallest throb scale, reached at the trough of each pulse.
pub const MIN_THROB_SCALE: f32 = 0.7;
/// Prizes never fade below this opacity while throbbing.
pub const MIN_THROB_OPACITY: f32 = 0.3;

/// Spawn and expiry rules for prizes, resolved from settings and config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrizeRules {
    pub prize_size: f32,
    pub lifetime_min_ms: Millis,
    pub lifetime_max_ms: Millis,
    pub throb_window_ms: Millis,
}

impl PrizeRules {
    pub fn new(settings: &GameSettings, config: &SessionConfig) -> Self {
        Self {
            prize_size: settings.prize_size,
            lifetime_min_ms: config.prize_lifetime_min_ms,
            lifetime_max_ms: config.prize_lifetime_max_ms,
            throb_window_ms: config.throb_window_ms,
        }
    }

    fn random_lifetime(&self, rng: &mut impl Rng) -> Millis {
        if self.lifetime_max_ms <= self.lifetime_min_ms {
            return self.lifetime_min_ms;
        }
        rng.random_range(self.lifetime_min_ms..self.lifetime_max_ms)
    }

    /// Uniform position keeping the whole prize on the canvas.
    fn random_position(&self, canvas: Vec2, rng: &mut impl Rng) -> Vec2 {
        let max_x = canvas.x - self.prize_size;
        let max_y = canvas.y - self.prize_size;
        let x = if max_x > 0.0 { rng.random_range(0.0..max_x) } else { 0.0 };
        let y = if max_y > 0.0 { rng.random_range(0.0..max_y) } else { 0.0 };
        Vec2::new(x, y)
    }
}

/// A timed collectible. Only the slot whose character uses `prize_type` can
/// collect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    pub position: Vec2,
    pub prize_type: String,
    /// Image id handed to the renderer.
    pub art: String,
    pub spawn_time: Millis,
    pub lifetime: Millis,
    pub expired: bool,
}

impl Prize {
    pub fn spawn(
        prize_type: &str,
        art: &str,
        canvas: Vec2,
        rules: &PrizeRules,
        now: Millis,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            position: rules.random_position(canvas, rng),
            prize_type: prize_type.to_string(),
            art: art.to_string(),
            spawn_time: now,
            lifetime: rules.random_lifetime(rng),
            expired: false,
        }
    }

    /// Reuse this prize in place: new position, fresh lifetime.
    pub fn respawn(&mut self, canvas: Vec2, rules: &PrizeRules, now: Millis, rng: &mut impl Rng) {
        self.position = rules.random_position(canvas, rng);
        self.spawn_time = now;
        self.lifetime = rules.random_lifetime(rng);
        self.expired = false;
    }

    pub fn remaining(&self, now: Millis) -> Millis {
        let elapsed = now.saturating_sub(self.spawn_time);
        self.lifetime.saturating_sub(elapsed)
    }

    /// Recompute the expiry flag from elapsed time.
    pub fn update(&mut self, now: Millis) {
        if self.remaining(now) == 0 {
            self.expired = true;
        }
    }

    pub fn is_throbbing(&self, now: Millis, window: Millis) -> bool {
        let remaining = self.remaining(now);
        remaining > 0 && remaining <= window
    }

    /// Pulsing scale in [0.7, 1.0] while throbbing, 1.0 otherwise.
    pub fn throb_scale(&self, now: Millis, window: Millis) -> f32 {
        if !self.is_throbbing(now, window) {
            return 1.0;
        }
        let throb_time = (window - self.remaining(now)) as f32;
        let pulse = 0.5 + 0.5 * (throb_time / 100.0).sin();
        (MIN_THROB_SCALE + (1.0 - MIN_THROB_SCALE) * pulse).min(1.0)
    }

    /// Fade-out opacity while throbbing, 1.0 otherwise.
    pub fn opacity(&self, now: Millis, window: Millis) -> f32 {
        if !self.is_throbbing(now, window) {
            return 1.0;
        }
        (self.remaining(now) as f32 / window as f32).max(MIN_THROB_OPACITY)
    }
}
