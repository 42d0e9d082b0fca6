//! Run configuration, loaded from YAML.
//!
//! ```yaml
//! steps: 600
//! frequency: 60
//! trace: false
//! seed: 42
//! strict: false
//! keys:
//!   - { step: 10, key: 5, pressed: true }
//!   - { step: 20, key: 5, pressed: false }
//! ```
use chip8_core::{constants::DELAY_FREQUENCY, KeyCode};
use serde::Deserialize;

use crate::{clock::Hz, error::AppError};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConf {
    /// Number of steps to run before stopping.
    pub steps: usize,
    /// Steps per second. Zero runs as fast as possible.
    pub frequency: Hz,
    /// Log every executed instruction.
    pub trace: bool,
    /// Seed for the machine's random number generator.
    pub seed: Option<u64>,
    /// Stop on instructions that are not implemented.
    pub strict: bool,
    /// Scripted keypad input.
    pub keys: Vec<KeyEvent>,
}

impl Default for RunConf {
    fn default() -> Self {
        Self {
            // ten seconds at the conventional rate
            steps: 600,
            frequency: Hz(DELAY_FREQUENCY),
            trace: false,
            seed: None,
            strict: false,
            keys: Vec::new(),
        }
    }
}

/// Key state change applied before the given step executes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyEvent {
    pub step: usize,
    pub key: KeyCode,
    #[serde(default = "default_pressed")]
    pub pressed: bool,
}

fn default_pressed() -> bool {
    true
}

impl RunConf {
    pub fn from_file(filepath: &str) -> Result<Self, AppError> {
        let file = std::fs::File::open(filepath)?;
        let conf: RunConf = serde_yaml::from_reader(file)?;
        log::debug!("loaded run configuration: {:#?}", conf);
        Ok(conf)
    }

    /// Key events ordered by the step they apply to.
    pub fn key_schedule(&self) -> Vec<KeyEvent> {
        let mut keys = self.keys.clone();
        keys.sort_by_key(|ev| ev.step);
        keys
    }
}
