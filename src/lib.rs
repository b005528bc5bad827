//! Fastwise - intermittent fasting tracker core
//!
//! Fastwise runs the fasting timer, tracks progress over a fixed-length program and
//! derives analytics, insights and a daily calorie target from what the user
//! recorded. UI, persistence backends and notification delivery plug in through
//! small traits.
//!
//! ## Modules
//!
//! - **Session**: fasting state machine and the stage catalog it reads from
//! - **Progress**: completed days, streaks and per-day metrics
//! - **Analytics / Insights**: chart series, rule-based insights and recommendations
//! - **Recipes**: rotating meal plan menus that feed the shopping cart
//! - **Controller**: single owner of the tracker state, dispatching commands and
//!   syncing to the store, cache and notifier

pub mod analytics;
pub mod cart;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod insights;
pub mod notify;
pub mod nutrition;
pub mod progress;
pub mod recipes;
pub mod schedule;
pub mod session;
pub mod stages;
pub mod state;
pub mod store;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use analytics::AnalyticsGenerator;
pub use config::TrackerConfig;
pub use controller::{Collaborators, Command, CommandOutcome, FastingController, StateChange};
pub use error::FastingError;
pub use insights::InsightEngine;
pub use nutrition::calorie_target;
pub use progress::{weekly_success_rate, ProgressHistory};
pub use recipes::{all_ingredients, recipes_for_day};
pub use session::{FastingSession, TickReading};
pub use stages::{stage_for_elapsed_hours, FASTING_STAGES};
pub use state::TrackerState;

/// Library version
pub const FASTWISE_VERSION: &str = env!("CARGO_PKG_VERSION");
