use super::{Config, GuardrailsMode};
use crate::error::ConfigError;
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

const MAX_TIMEOUT_MS: u64 = 60_000;

impl Config {
    /// `~/.turngate/config.toml`, or `None` when no home directory resolves.
    pub fn default_path() -> Option<PathBuf> {
        UserDirs::new().map(|u| u.home_dir().join(".turngate").join("config.toml"))
    }

    /// Load the user config if present, otherwise defaults. Never writes.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::read_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Load(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "config.loaded");
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup("TURNGATE_GUARDRAILS_MODE")
            && let Ok(mode) = mode.trim().parse::<GuardrailsMode>()
        {
            self.guardrails.mode = mode;
        }

        if let Some(flag) = lookup("TURNGATE_ROUTER_LLM")
            && let Ok(enabled) = flag.trim().parse::<bool>()
        {
            self.router.llm_enabled = enabled;
        }

        if let Some(ms) = lookup("TURNGATE_STAGE_TIMEOUT_MS")
            && let Ok(ms) = ms.trim().parse::<u64>()
        {
            self.guardrails.stage_timeout_ms = ms;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeouts = [
            ("router.timeout_ms", self.router.timeout_ms),
            ("guardrails.trigger_timeout_ms", self.guardrails.trigger_timeout_ms),
            ("guardrails.stage_timeout_ms", self.guardrails.stage_timeout_ms),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(ConfigError::Validation(format!("{name} must be > 0")));
            }
            if value > MAX_TIMEOUT_MS {
                return Err(ConfigError::Validation(format!(
                    "{name} must be <= {MAX_TIMEOUT_MS}"
                )));
            }
        }
        if self.router.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "router.max_tokens must be > 0".into(),
            ));
        }
        if self.guardrails.stage_max_tokens == 0 {
            return Err(ConfigError::Validation(
                "guardrails.stage_max_tokens must be > 0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.router.temperature) {
            return Err(ConfigError::Validation(
                "router.temperature must be within 0.0..=2.0".into(),
            ));
        }
        Ok(())
    }
}
