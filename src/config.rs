use std::path::{Path, PathBuf};

use crate::ai::frame::MINIBATCH_SIZE;
use crate::error::ConfigError;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dqn: DqnConfig,
    pub world: WorldConfig,
    pub training: RunConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            dqn: DqnConfig::default(),
            world: WorldConfig::default(),
            training: RunConfig::default(),
        }
    }
}

/// Hyperparameters shared by every Q-network in the run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DqnConfig {
    pub learning_rate: f32,
    pub gamma: f32,
    /// Replay memory capacity, in experiences.
    pub experience_size: usize,
    /// Age at which epsilon reaches its floor.
    pub learning_steps_total: usize,
    /// Age at which annealing starts; defaults to a tenth of the total.
    pub learning_steps_burnin: Option<usize>,
    pub epsilon_min: f32,
    /// Exploration probability when learning is switched off. Kept strictly
    /// positive so evaluation runs never freeze into a deterministic loop.
    pub epsilon_test: f32,
}

impl Default for DqnConfig {
    fn default() -> Self {
        DqnConfig {
            learning_rate: 1e-3,
            gamma: 0.95,
            experience_size: 100_000,
            learning_steps_total: 500_000,
            learning_steps_burnin: None,
            epsilon_min: 0.1,
            epsilon_test: 0.1,
        }
    }
}

impl DqnConfig {
    pub fn resolved_burnin(&self) -> usize {
        self.learning_steps_burnin
            .unwrap_or(self.learning_steps_total / 10)
    }
}

/// Arena geometry and team composition.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: i32,
    pub height: i32,
    /// Melee/ranged minion pairs spawned per team each match.
    pub minions_per_team: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            width: 8,
            height: 8,
            minions_per_team: 2,
        }
    }
}

/// Outer training loop settings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Total simulation ticks to run; a match cut off by the budget is
    /// scored as a draw.
    pub iterations: u64,
    /// Run one gradient step every this many ticks.
    pub train_interval: u64,
    /// Print a status line every this many ticks.
    pub log_interval: u64,
    /// Fixed RNG seed; omitted means seed from the OS.
    pub seed: Option<u64>,
    /// Where to load and save network weights; omitted disables persistence.
    pub weights_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            iterations: 1_000_000,
            train_interval: 1,
            log_interval: 10_000,
            seed: None,
            weights_dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            eprintln!("Warning: config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dqn.learning_rate <= 0.0 {
            return Err(ConfigError::Validation(
                "dqn.learning_rate must be > 0".into(),
            ));
        }
        if self.dqn.gamma < 0.0 || self.dqn.gamma > 1.0 {
            return Err(ConfigError::Validation(
                "dqn.gamma must be in [0, 1]".into(),
            ));
        }
        if self.dqn.experience_size < MINIBATCH_SIZE {
            return Err(ConfigError::Validation(format!(
                "dqn.experience_size must be >= {}",
                MINIBATCH_SIZE
            )));
        }
        if self.dqn.resolved_burnin() >= self.dqn.learning_steps_total {
            return Err(ConfigError::Validation(
                "dqn.learning_steps_burnin must be < dqn.learning_steps_total".into(),
            ));
        }
        if self.dqn.epsilon_min < 0.0 || self.dqn.epsilon_min > 1.0 {
            return Err(ConfigError::Validation(
                "dqn.epsilon_min must be in [0, 1]".into(),
            ));
        }
        if self.dqn.epsilon_test <= 0.0 || self.dqn.epsilon_test > 1.0 {
            return Err(ConfigError::Validation(
                "dqn.epsilon_test must be in (0, 1]".into(),
            ));
        }
        if self.world.width < 2 || self.world.height < 2 {
            return Err(ConfigError::Validation(
                "world.width and world.height must be >= 2".into(),
            ));
        }
        if self.training.iterations == 0 {
            return Err(ConfigError::Validation(
                "training.iterations must be > 0".into(),
            ));
        }
        if self.training.train_interval == 0 {
            return Err(ConfigError::Validation(
                "training.train_interval must be >= 1".into(),
            ));
        }
        if self.training.log_interval == 0 {
            return Err(ConfigError::Validation(
                "training.log_interval must be >= 1".into(),
            ));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
