use serde::Deserialize;

use prize_dash_core::config::SessionConfig;

use crate::error::HostError;

/// Name of the optional config file in the working directory.
pub const CONFIG_FILE: &str = "prize-dash.toml";

/// Top-level host configuration, loaded from `prize-dash.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Character catalog (JSON).
    pub catalog_path: String,
    /// Directory that catalog image paths are relative to.
    pub asset_root: String,
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Display frame rate driving the simulation.
    pub frame_rate_hz: f64,
    pub session: SessionConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            catalog_path: "assets/catalog.json".to_string(),
            asset_root: "assets".to_string(),
            canvas_width: 1280.0,
            canvas_height: 720.0,
            frame_rate_hz: 60.0,
            session: SessionConfig::default(),
        }
    }
}

impl HostConfig {
    /// Load from `prize-dash.toml` (defaults when absent or unparsable),
    /// then apply environment overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string(CONFIG_FILE) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from {CONFIG_FILE}");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("{e}, using defaults");
                    Self::default()
                },
            },
            Err(_) => {
                tracing::info!("No {CONFIG_FILE} found, using defaults");
                Self::default()
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn from_toml(content: &str) -> Result<Self, HostError> {
        toml::from_str(content)
            .map_err(|e| HostError::Config(format!("failed to parse {CONFIG_FILE}: {e}")))
    }

    /// Apply `PRIZE_DASH_*` overrides. Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("PRIZE_DASH_CATALOG")
            && !path.is_empty()
        {
            self.catalog_path = path;
        }
        if let Some(root) = lookup("PRIZE_DASH_ASSET_ROOT")
            && !root.is_empty()
        {
            self.asset_root = root;
        }
        if let Some(rate) = lookup("PRIZE_DASH_FRAME_RATE")
            && !rate.is_empty()
        {
            match rate.parse::<f64>() {
                Ok(hz) => self.frame_rate_hz = hz,
                Err(_) => tracing::warn!(value = %rate, "PRIZE_DASH_FRAME_RATE is not a number"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), HostError> {
        if !(self.frame_rate_hz > 0.0 && self.frame_rate_hz <= 1000.0) {
            return Err(HostError::Config(format!(
                "frame_rate_hz must be in (0, 1000], got {}",
                self.frame_rate_hz
            )));
        }
        if self.canvas_width <= 0.0 || self.canvas_height <= 0.0 {
            return Err(HostError::Config("canvas size must be positive".to_string()));
        }
        if self.catalog_path.is_empty() {
            return Err(HostError::Config("catalog_path must not be empty".to_string()));
        }
        self.session.validate().map_err(HostError::Config)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(HostConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
catalog_path = "game/config.json"
asset_root = "game"
canvas_width = 1024
canvas_height = 768
frame_rate_hz = 30

[session]
selection_countdown_secs = 10
race_target = 5
"#;
        let cfg = HostConfig::from_toml(toml_str).unwrap();
        assert_eq!(cfg.catalog_path, "game/config.json");
        assert_eq!(cfg.canvas_width, 1024.0);
        assert_eq!(cfg.frame_rate_hz, 30.0);
        assert_eq!(cfg.session.selection_countdown_secs, 10);
        assert_eq!(cfg.session.race_target, 5);
        // Unset session keys keep their defaults
        assert_eq!(cfg.session.nav_cooldown_ms, 600);
    }

    #[test]
    fn parse_empty_toml_is_default() {
        assert_eq!(HostConfig::from_toml("").unwrap(), HostConfig::default());
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = HostConfig::from_toml("frame_rate_hz = \"fast\"").unwrap_err();
        assert!(matches!(err, HostError::Config(_)));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("PRIZE_DASH_CATALOG", "/srv/catalog.json"),
            ("PRIZE_DASH_ASSET_ROOT", ""),
            ("PRIZE_DASH_FRAME_RATE", "120"),
        ]
        .into_iter()
        .collect();
        let mut cfg = HostConfig::default();
        cfg.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.catalog_path, "/srv/catalog.json");
        assert_eq!(cfg.asset_root, "assets");
        assert_eq!(cfg.frame_rate_hz, 120.0);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cfg = HostConfig {
            frame_rate_hz: 0.0,
            ..HostConfig::default()
        };
        assert!(cfg.validate().is_err());

        let mut cfg = HostConfig::default();
        cfg.session.input_poll_ms = 0;
        assert!(cfg.validate().is_err());

        let cfg = HostConfig::from_toml("[session]\ndiscovery_poll_ms = 0").unwrap();
        assert!(matches!(cfg.validate(), Err(HostError::Config(_))));
    }
}
