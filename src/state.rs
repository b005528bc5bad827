//! Aggregate tracker state
//!
//! Everything the controller owns and the local cache persists, as one serde
//! document.

use crate::cart::ShoppingCart;
use crate::config::TrackerConfig;
use crate::error::FastingError;
use crate::progress::ProgressHistory;
use crate::schedule::FastingSchedule;
use crate::session::FastingSession;
use crate::types::UserProfile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerState {
    #[serde(default)]
    pub session: FastingSession,
    #[serde(default)]
    pub history: ProgressHistory,
    #[serde(default)]
    pub profile: UserProfile,
    /// Glasses of water logged today
    #[serde(default)]
    pub water_intake: u32,
    #[serde(default = "enabled")]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub schedules: Vec<FastingSchedule>,
    #[serde(default)]
    pub cart: ShoppingCart,
}

fn enabled() -> bool {
    true
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::new(&TrackerConfig::default())
    }
}

impl TrackerState {
    /// Fresh state using the configured default ratio
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            session: FastingSession::new(config.default_ratio),
            history: ProgressHistory::new(),
            profile: UserProfile::default(),
            water_intake: 0,
            notifications_enabled: true,
            schedules: Vec::new(),
            cart: ShoppingCart::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, FastingError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, FastingError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn schedule(&self, id: &str) -> Option<&FastingSchedule> {
        self.schedules.iter().find(|schedule| schedule.id == id)
    }
}
