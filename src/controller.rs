//! Tracker controller
//!
//! `FastingController` is the single owner of the tracker state. Every mutation goes
//! through one of its methods (or `dispatch` with a serialized `Command`), after
//! which the controller:
//!
//! 1. syncs the affected data to the `SessionStore`
//! 2. saves a snapshot to the `LocalCache`
//! 3. notifies subscribed observers
//!
//! Persistence is best-effort: failures are logged and never roll back local state.

use crate::analytics::AnalyticsGenerator;
use crate::cart::CartItem;
use crate::clock::{Clock, SystemClock};
use crate::config::{EarlyEndPolicy, TrackerConfig};
use crate::error::FastingError;
use crate::insights::InsightEngine;
use crate::notify::{plan_fast_notifications, MemoryNotifier, NotificationHandle, Notifier};
use crate::nutrition;
use crate::recipes;
use crate::schedule::{FastingSchedule, ScheduleDraft};
use crate::session::{ActiveFast, EndedFast, FastOutcome, TickReading};
use crate::state::TrackerState;
use crate::store::{LocalCache, MemoryCache, MemoryStore, SessionStore};
use crate::types::{
    validate_positive, AnalyticsSeries, DailyMetrics, FastingRatio, Insight, ProfileUpdate,
    Recommendation,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Id returned by `subscribe`
pub type SubscriptionId = u64;

/// Callback invoked after every successful mutation
pub type Observer = Box<dyn FnMut(&TrackerState, &StateChange)>;

/// External services the controller talks to
pub struct Collaborators {
    pub store: Box<dyn SessionStore>,
    pub cache: Box<dyn LocalCache>,
    pub notifier: Box<dyn Notifier>,
    pub clock: Box<dyn Clock>,
}

impl Collaborators {
    /// In-memory store, cache and notifier with the wall clock
    pub fn in_memory() -> Self {
        Self {
            store: Box::new(MemoryStore::new()),
            cache: Box::new(MemoryCache::new()),
            notifier: Box::new(MemoryNotifier::new()),
            clock: Box::new(SystemClock),
        }
    }
}

/// Mutation request, serialized as `{"type": "...", "payload": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Command {
    /// Start a fast with the configured ratio, or an explicit split when both hours
    /// are given
    StartFast {
        #[serde(default)]
        fasting_hours: Option<u32>,
        #[serde(default)]
        eating_hours: Option<u32>,
    },
    EndFast,
    SetFastingType {
        ratio: String,
    },
    SetDay {
        day: u32,
    },
    SetWeight {
        weight: f64,
    },
    SetTargetWeight {
        weight: f64,
    },
    AddWater {
        #[serde(default = "one_glass")]
        glasses: u32,
    },
    ResetWater,
    RecordDailyMetrics {
        /// Defaults to the current day
        #[serde(default)]
        day: Option<u32>,
        metrics: DailyMetrics,
    },
    UpdateProfile(ProfileUpdate),
    SetNotifications {
        enabled: bool,
    },
    AddToCart(CartItem),
    /// Add every ingredient of a catalog recipe
    AddRecipeToCart {
        recipe_id: String,
    },
    RemoveFromCart {
        id: String,
    },
    UpdateCartQuantity {
        id: String,
        quantity: u32,
    },
    ClearCart,
    AddSchedule(ScheduleDraft),
    UpdateSchedule {
        id: String,
        schedule: ScheduleDraft,
    },
    RemoveSchedule {
        id: String,
    },
}

fn one_glass() -> u32 {
    1
}

impl Command {
    pub fn from_json(json: &str) -> Result<Self, FastingError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Result of a dispatched command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    FastStarted(ActiveFast),
    FastEnded(EndedFast),
    WaterIntake { glasses: u32 },
    ScheduleSaved { id: String },
    Done,
}

/// What changed, passed to observers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum StateChange {
    Restored,
    FastStarted {
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    },
    FastEnded(EndedFast),
    RatioChanged {
        ratio: FastingRatio,
    },
    DayChanged {
        day: u32,
    },
    MetricsRecorded {
        day: u32,
    },
    WaterChanged {
        day: u32,
        intake: u32,
    },
    ProfileUpdated,
    NotificationsToggled {
        enabled: bool,
    },
    CartChanged,
    SchedulesChanged,
}

/// Tick reading, plus the ended fast when the tick completed it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickOutcome {
    #[serde(flatten)]
    pub reading: TickReading,
    pub ended: Option<EndedFast>,
}

pub struct FastingController {
    config: TrackerConfig,
    user_id: String,
    state: TrackerState,
    store: Box<dyn SessionStore>,
    cache: Box<dyn LocalCache>,
    notifier: Box<dyn Notifier>,
    clock: Box<dyn Clock>,
    /// Notifications scheduled for the running fast
    fast_handles: Vec<NotificationHandle>,
    /// Reminders scheduled per schedule id
    schedule_handles: HashMap<String, Vec<NotificationHandle>>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: SubscriptionId,
}

impl FastingController {
    /// Build a controller and restore its state.
    ///
    /// The cached snapshot is loaded first; session and history returned by the
    /// store replace the cached ones. Notifications of a restored fast that still
    /// lie in the future are scheduled again.
    pub fn bootstrap(
        config: TrackerConfig,
        user_id: impl Into<String>,
        collaborators: Collaborators,
    ) -> Result<Self, FastingError> {
        config.validate()?;

        let mut controller = Self {
            state: TrackerState::new(&config),
            config,
            user_id: user_id.into(),
            store: collaborators.store,
            cache: collaborators.cache,
            notifier: collaborators.notifier,
            clock: collaborators.clock,
            fast_handles: Vec::new(),
            schedule_handles: HashMap::new(),
            observers: Vec::new(),
            next_subscription: 1,
        };

        let mut state = match controller.cache.load() {
            Ok(Some(state)) => state,
            Ok(None) => TrackerState::new(&controller.config),
            Err(e) => {
                log::warn!("ignoring unreadable cached state: {e}");
                TrackerState::new(&controller.config)
            }
        };

        match controller.store.load_session(&controller.user_id) {
            Ok(Some(session)) => state.session = session,
            Ok(None) => {}
            Err(e) => log::warn!("could not load session for {}: {e}", controller.user_id),
        }
        match controller.store.load_history(&controller.user_id) {
            Ok(Some(mut history)) => {
                // Metrics recorded while the store was unreachable only live in the cache
                let cached_only: Vec<(u32, DailyMetrics)> = state
                    .history
                    .daily_metrics()
                    .iter()
                    .filter(|(day, _)| history.metrics_for(**day).is_none())
                    .map(|(day, metrics)| (*day, *metrics))
                    .collect();
                history.merge_daily_metrics(cached_only, controller.config.program_days);
                state.history = history;
                if let Some(water) = state
                    .history
                    .metrics_for(state.history.current_day())
                    .and_then(|m| m.water_intake)
                {
                    state.water_intake = water;
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("could not load history for {}: {e}", controller.user_id),
        }

        controller.install(state);
        log::debug!(
            "controller ready for {} (day {}, active fast: {})",
            controller.user_id,
            controller.state.history.current_day(),
            controller.state.session.is_active()
        );
        Ok(controller)
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Replace the whole state, e.g. with a snapshot supplied by the host
    pub fn load_state(&mut self, state: TrackerState) {
        self.install(state);
        self.commit(StateChange::Restored);
    }

    /// Register an observer; it is called after every successful mutation
    pub fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    /// Remove an observer. Returns false for unknown ids.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Apply a command
    pub fn dispatch(&mut self, command: Command) -> Result<CommandOutcome, FastingError> {
        log::debug!("dispatching {command:?}");

        match command {
            Command::StartFast {
                fasting_hours,
                eating_hours,
            } => {
                let fast = match (fasting_hours, eating_hours) {
                    (None, None) => self.start_fast()?,
                    (Some(fasting), Some(eating)) => self.start_fast_with(fasting, eating)?,
                    _ => {
                        return Err(FastingError::Validation(
                            "fasting_hours and eating_hours must be given together".to_string(),
                        ))
                    }
                };
                Ok(CommandOutcome::FastStarted(fast))
            }
            Command::EndFast => self.end_fast().map(CommandOutcome::FastEnded),
            Command::SetFastingType { ratio } => {
                self.set_fasting_type(&ratio)?;
                Ok(CommandOutcome::Done)
            }
            Command::SetDay { day } => {
                self.set_day(day)?;
                Ok(CommandOutcome::Done)
            }
            Command::SetWeight { weight } => {
                self.set_weight(weight)?;
                Ok(CommandOutcome::Done)
            }
            Command::SetTargetWeight { weight } => {
                self.set_target_weight(weight)?;
                Ok(CommandOutcome::Done)
            }
            Command::AddWater { glasses } => {
                let glasses = self.add_water(glasses)?;
                Ok(CommandOutcome::WaterIntake { glasses })
            }
            Command::ResetWater => {
                self.reset_water()?;
                Ok(CommandOutcome::WaterIntake { glasses: 0 })
            }
            Command::RecordDailyMetrics { day, metrics } => {
                self.record_daily_metrics(day, metrics)?;
                Ok(CommandOutcome::Done)
            }
            Command::UpdateProfile(update) => {
                self.update_profile(update)?;
                Ok(CommandOutcome::Done)
            }
            Command::SetNotifications { enabled } => {
                self.set_notifications(enabled);
                Ok(CommandOutcome::Done)
            }
            Command::AddToCart(item) => {
                self.add_to_cart(item);
                Ok(CommandOutcome::Done)
            }
            Command::AddRecipeToCart { recipe_id } => {
                self.add_recipe_to_cart(&recipe_id)?;
                Ok(CommandOutcome::Done)
            }
            Command::RemoveFromCart { id } => {
                self.remove_from_cart(&id);
                Ok(CommandOutcome::Done)
            }
            Command::UpdateCartQuantity { id, quantity } => {
                self.update_cart_quantity(&id, quantity)?;
                Ok(CommandOutcome::Done)
            }
            Command::ClearCart => {
                self.clear_cart();
                Ok(CommandOutcome::Done)
            }
            Command::AddSchedule(draft) => {
                let id = self.add_schedule(draft)?;
                Ok(CommandOutcome::ScheduleSaved { id })
            }
            Command::UpdateSchedule { id, schedule } => {
                self.update_schedule(&id, schedule)?;
                Ok(CommandOutcome::ScheduleSaved { id })
            }
            Command::RemoveSchedule { id } => {
                self.remove_schedule(&id)?;
                Ok(CommandOutcome::Done)
            }
        }
    }

    // --- fasting ---------------------------------------------------------------

    /// Start a fast now with the configured ratio
    pub fn start_fast(&mut self) -> Result<ActiveFast, FastingError> {
        let now = self.clock.now();
        self.state.session.start(now)?;
        self.after_start()
    }

    /// Start a fast now with an explicit split, which becomes the session ratio
    pub fn start_fast_with(
        &mut self,
        fasting_hours: u32,
        eating_hours: u32,
    ) -> Result<ActiveFast, FastingError> {
        if self.state.session.is_active() {
            return Err(FastingError::InvalidState(
                "a fast is already active".to_string(),
            ));
        }
        self.config
            .check_ratio(&FastingRatio::new(fasting_hours, eating_hours)?)?;

        let now = self.clock.now();
        self.state
            .session
            .start_with(fasting_hours, eating_hours, now)?;
        self.after_start()
    }

    fn after_start(&mut self) -> Result<ActiveFast, FastingError> {
        let Some(fast) = self.state.session.active().cloned() else {
            return Err(FastingError::InvalidState("no active fast".to_string()));
        };
        log::info!(
            "fast started ({}) until {}",
            self.state.session.ratio,
            fast.end_time()
        );

        if self.state.notifications_enabled {
            self.schedule_fast_notifications();
            self.show(
                "Fast started",
                &format!("Your {} fast has begun", self.state.session.ratio),
            );
        }

        self.commit(StateChange::FastStarted {
            start_time: fast.start_time(),
            end_time: fast.end_time(),
        });

        // The store may have attached a session id during the commit
        self.state
            .session
            .active()
            .cloned()
            .ok_or_else(|| FastingError::InvalidState("no active fast".to_string()))
    }

    /// End the running fast now
    pub fn end_fast(&mut self) -> Result<EndedFast, FastingError> {
        let now = self.clock.now();
        self.end_fast_at(now)
    }

    fn end_fast_at(&mut self, now: DateTime<Utc>) -> Result<EndedFast, FastingError> {
        let ended = self.state.session.end(now)?;
        self.cancel_fast_notifications();

        let counts = match (ended.outcome, self.config.early_end_policy) {
            (FastOutcome::Completed, _) => true,
            (FastOutcome::EndedEarly, EarlyEndPolicy::CountAsCompleted) => true,
            (FastOutcome::EndedEarly, EarlyEndPolicy::Discard) => false,
        };
        if counts {
            self.state.history.record_completion(ended.fasted_hours);
        } else {
            let day = self.state.history.current_day();
            self.state.history.log_fast(day, ended.fasted_hours);
        }
        log::info!(
            "fast ended after {:.1}h ({:?}, counted: {counts})",
            ended.fasted_hours,
            ended.outcome
        );

        if self.state.notifications_enabled {
            let body = format!("You fasted for {:.1} hours", ended.fasted_hours);
            match ended.outcome {
                FastOutcome::Completed => self.show("Fast complete", &body),
                FastOutcome::EndedEarly => self.show("Fast ended", &body),
            }
        }

        self.commit(StateChange::FastEnded(ended.clone()));
        Ok(ended)
    }

    /// Derive the timer reading now; ends the fast once its end time is reached
    pub fn tick(&mut self) -> Result<TickOutcome, FastingError> {
        let now = self.clock.now();
        let reading = self.state.session.tick(now)?;

        let ended = if reading.is_complete {
            Some(self.end_fast_at(now)?)
        } else {
            None
        };
        Ok(TickOutcome { reading, ended })
    }

    /// Change the fasting ratio, e.g. `"18:6"`
    pub fn set_fasting_type(&mut self, ratio: &str) -> Result<(), FastingError> {
        self.state.session.set_ratio(ratio, &self.config)?;
        self.commit(StateChange::RatioChanged {
            ratio: self.state.session.ratio,
        });
        Ok(())
    }

    // --- progress --------------------------------------------------------------

    /// Move to another program day; today's water counter follows the day
    pub fn set_day(&mut self, day: u32) -> Result<(), FastingError> {
        self.state
            .history
            .advance_day(day, self.config.program_days)?;
        self.state.water_intake = self
            .state
            .history
            .metrics_for(day)
            .and_then(|m| m.water_intake)
            .unwrap_or(0);
        self.commit(StateChange::DayChanged { day });
        Ok(())
    }

    /// Record today's weight; also updates the profile
    pub fn set_weight(&mut self, weight: f64) -> Result<(), FastingError> {
        let weight = validate_positive("weight", weight)?;
        let day = self.state.history.current_day();
        self.state
            .history
            .update_daily_metrics(day, self.config.program_days, |m| m.weight = Some(weight))?;
        self.state.profile.weight_kg = Some(weight);
        self.commit(StateChange::MetricsRecorded { day });
        Ok(())
    }

    pub fn set_target_weight(&mut self, weight: f64) -> Result<(), FastingError> {
        self.state.profile.target_weight_kg = Some(validate_positive("target weight", weight)?);
        self.commit(StateChange::ProfileUpdated);
        Ok(())
    }

    /// Add glasses of water, capped at the daily goal. Returns today's intake.
    pub fn add_water(&mut self, glasses: u32) -> Result<u32, FastingError> {
        let intake = self
            .state
            .water_intake
            .saturating_add(glasses)
            .min(self.config.daily_water_goal);
        self.set_water(intake)?;
        Ok(intake)
    }

    pub fn reset_water(&mut self) -> Result<(), FastingError> {
        self.set_water(0)
    }

    fn set_water(&mut self, intake: u32) -> Result<(), FastingError> {
        let day = self.state.history.current_day();
        self.state
            .history
            .update_daily_metrics(day, self.config.program_days, |m| {
                m.water_intake = Some(intake)
            })?;
        self.state.water_intake = intake;
        self.commit(StateChange::WaterChanged { day, intake });
        Ok(())
    }

    /// Upsert the metrics of `day` (the current day when `None`)
    pub fn record_daily_metrics(
        &mut self,
        day: Option<u32>,
        metrics: DailyMetrics,
    ) -> Result<(), FastingError> {
        let day = day.unwrap_or(self.state.history.current_day());
        self.state
            .history
            .record_daily_metrics(day, metrics, self.config.program_days)?;
        if day == self.state.history.current_day() {
            if let Some(water) = metrics.water_intake {
                self.state.water_intake = water;
            }
        }
        self.commit(StateChange::MetricsRecorded { day });
        Ok(())
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<(), FastingError> {
        self.state.profile.apply(update)?;
        self.commit(StateChange::ProfileUpdated);
        Ok(())
    }

    /// Turn notifications on or off. Turning them off cancels everything pending;
    /// turning them on schedules the running fast and active schedules again.
    pub fn set_notifications(&mut self, enabled: bool) {
        if self.state.notifications_enabled != enabled {
            self.cancel_all_notifications();
            self.state.notifications_enabled = enabled;
            self.schedule_all_notifications();
        }
        self.commit(StateChange::NotificationsToggled { enabled });
    }

    // --- cart ------------------------------------------------------------------

    pub fn add_to_cart(&mut self, item: CartItem) {
        self.state.cart.add(item);
        self.commit(StateChange::CartChanged);
    }

    /// Add the ingredients of recipe `recipe_id` to the cart
    pub fn add_recipe_to_cart(&mut self, recipe_id: &str) -> Result<(), FastingError> {
        let recipe = recipes::recipe(recipe_id)
            .ok_or_else(|| FastingError::Validation(format!("unknown recipe '{recipe_id}'")))?;
        for item in recipe.cart_items() {
            self.state.cart.add(item);
        }
        self.commit(StateChange::CartChanged);
        Ok(())
    }

    pub fn remove_from_cart(&mut self, id: &str) {
        if self.state.cart.remove(id) {
            self.commit(StateChange::CartChanged);
        }
    }

    pub fn update_cart_quantity(&mut self, id: &str, quantity: u32) -> Result<(), FastingError> {
        self.state.cart.update_quantity(id, quantity)?;
        self.commit(StateChange::CartChanged);
        Ok(())
    }

    pub fn clear_cart(&mut self) {
        self.state.cart.clear();
        self.commit(StateChange::CartChanged);
    }

    // --- schedules -------------------------------------------------------------

    /// Add a schedule and return its id
    pub fn add_schedule(&mut self, draft: ScheduleDraft) -> Result<String, FastingError> {
        let schedule = FastingSchedule::from_draft(draft)?;
        self.config.check_ratio(&schedule.ratio)?;

        let id = schedule.id.clone();
        self.state.schedules.push(schedule);
        self.schedule_reminders(&id);
        self.commit(StateChange::SchedulesChanged);
        Ok(id)
    }

    /// Replace a schedule's fields, keeping its id
    pub fn update_schedule(&mut self, id: &str, draft: ScheduleDraft) -> Result<(), FastingError> {
        let updated = FastingSchedule {
            id: id.to_string(),
            name: draft.name,
            start_time: draft.start_time,
            days: draft.days,
            ratio: draft.ratio,
            active: draft.active,
        }
        .normalized()?;
        self.config.check_ratio(&updated.ratio)?;

        let slot = self
            .state
            .schedules
            .iter_mut()
            .find(|schedule| schedule.id == id)
            .ok_or_else(|| FastingError::Validation(format!("no schedule with id '{id}'")))?;
        *slot = updated;

        self.cancel_schedule_reminders(id);
        self.schedule_reminders(id);
        self.commit(StateChange::SchedulesChanged);
        Ok(())
    }

    pub fn remove_schedule(&mut self, id: &str) -> Result<(), FastingError> {
        let before = self.state.schedules.len();
        self.state.schedules.retain(|schedule| schedule.id != id);
        if self.state.schedules.len() == before {
            return Err(FastingError::Validation(format!(
                "no schedule with id '{id}'"
            )));
        }
        self.cancel_schedule_reminders(id);
        self.commit(StateChange::SchedulesChanged);
        Ok(())
    }

    // --- read-outs -------------------------------------------------------------

    pub fn analytics(&self) -> AnalyticsSeries {
        AnalyticsGenerator::generate(
            &self.state.history,
            &self.state.profile,
            &self.state.session.ratio,
            &self.config,
        )
    }

    pub fn insights(&self) -> Vec<Insight> {
        InsightEngine::insights(&self.state.history, &self.analytics(), &self.config)
    }

    pub fn recommendations(&self) -> Vec<Recommendation> {
        InsightEngine::recommendations(&self.state.history, &self.state.session, &self.insights())
    }

    /// Daily calorie target for the current profile
    pub fn calorie_target(&self) -> u32 {
        nutrition::calorie_target(&self.state.profile, self.config.default_calorie_target)
    }

    // --- internals -------------------------------------------------------------

    fn install(&mut self, state: TrackerState) {
        self.cancel_all_notifications();
        self.state = state;
        self.schedule_all_notifications();
    }

    /// Sync, cache, then notify observers
    fn commit(&mut self, change: StateChange) {
        if let Err(e) = self.sync(&change) {
            log::warn!("sync failed for {}: {e}", self.user_id);
        }
        if let Err(e) = self.cache.save(&self.state) {
            log::warn!("could not cache state: {e}");
        }
        for (_, observer) in self.observers.iter_mut() {
            observer(&self.state, &change);
        }
    }

    fn sync(&mut self, change: &StateChange) -> Result<(), FastingError> {
        match change {
            StateChange::FastStarted { .. } | StateChange::RatioChanged { .. } => {
                self.sync_session()
            }
            StateChange::FastEnded(_) | StateChange::DayChanged { .. } | StateChange::Restored => {
                self.sync_session()?;
                self.store.save_history(&self.user_id, &self.state.history)
            }
            StateChange::MetricsRecorded { day } | StateChange::WaterChanged { day, .. } => {
                if let Some(metrics) = self.state.history.metrics_for(*day) {
                    self.store.append_daily_metric(&self.user_id, *day, metrics)?;
                }
                self.store.save_history(&self.user_id, &self.state.history)
            }
            StateChange::ProfileUpdated
            | StateChange::NotificationsToggled { .. }
            | StateChange::CartChanged
            | StateChange::SchedulesChanged => Ok(()),
        }
    }

    fn sync_session(&mut self) -> Result<(), FastingError> {
        if let Some(id) = self.store.save_session(&self.user_id, &self.state.session)? {
            self.state.session.set_session_id(id);
        }
        Ok(())
    }

    fn show(&self, title: &str, body: &str) {
        if let Err(e) = self.notifier.show_now(title, body) {
            log::warn!("could not show notification '{title}': {e}");
        }
    }

    fn schedule_all_notifications(&mut self) {
        if !self.state.notifications_enabled {
            return;
        }
        self.schedule_fast_notifications();
        let ids: Vec<String> = self.state.schedules.iter().map(|s| s.id.clone()).collect();
        for id in ids {
            self.schedule_reminders(&id);
        }
    }

    /// Schedule the stage and completion notifications of the running fast that
    /// still lie in the future
    fn schedule_fast_notifications(&mut self) {
        let Some(fast) = self.state.session.active() else {
            return;
        };
        let planned = plan_fast_notifications(fast, &self.state.session.ratio);
        let now = self.clock.now();

        for note in planned.into_iter().filter(|note| note.at > now) {
            match self.notifier.schedule_at(note.at, &note.title, &note.body) {
                Ok(handle) => self.fast_handles.push(handle),
                Err(e) => log::warn!("could not schedule '{}': {e}", note.title),
            }
        }
    }

    fn schedule_reminders(&mut self, id: &str) {
        if !self.state.notifications_enabled {
            return;
        }
        let Some(schedule) = self.state.schedule(id) else {
            return;
        };
        let title = format!("Time to fast: {}", schedule.name);
        let body = format!("Your {} fast starts now", schedule.ratio);
        let starts = schedule.upcoming_starts(self.clock.now());

        let mut handles = Vec::with_capacity(starts.len());
        for at in starts {
            match self.notifier.schedule_at(at, &title, &body) {
                Ok(handle) => handles.push(handle),
                Err(e) => log::warn!("could not schedule reminder for {id}: {e}"),
            }
        }
        self.schedule_handles.insert(id.to_string(), handles);
    }

    fn cancel(&self, handles: Vec<NotificationHandle>) {
        for handle in handles {
            if let Err(e) = self.notifier.cancel(handle) {
                log::warn!("could not cancel notification {}: {e}", handle.0);
            }
        }
    }

    fn cancel_fast_notifications(&mut self) {
        let handles = std::mem::take(&mut self.fast_handles);
        self.cancel(handles);
    }

    fn cancel_schedule_reminders(&mut self, id: &str) {
        if let Some(handles) = self.schedule_handles.remove(id) {
            self.cancel(handles);
        }
    }

    fn cancel_all_notifications(&mut self) {
        self.cancel_fast_notifications();
        let reminders: Vec<_> = self.schedule_handles.drain().flat_map(|(_, h)| h).collect();
        self.cancel(reminders);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notify::NotificationEvent;
    use crate::schedule::parse_time_of_day;
    use crate::types::{Gender, InsightKind, RecommendationKind};
    use chrono::{Duration, TimeZone, Weekday};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Harness {
        controller: FastingController,
        clock: ManualClock,
        store: MemoryStore,
        notifier: MemoryNotifier,
        cache: MemoryCache,
    }

    fn t0() -> DateTime<Utc> {
        // A Wednesday evening
        Utc.with_ymd_and_hms(2024, 1, 3, 20, 0, 0).unwrap()
    }

    fn harness_with(config: TrackerConfig, cache: MemoryCache, store: MemoryStore) -> Harness {
        let clock = ManualClock::new(t0());
        let notifier = MemoryNotifier::new();
        let controller = FastingController::bootstrap(
            config,
            "user-1",
            Collaborators {
                store: Box::new(store.clone()),
                cache: Box::new(cache.clone()),
                notifier: Box::new(notifier.clone()),
                clock: Box::new(clock.clone()),
            },
        )
        .unwrap();

        Harness {
            controller,
            clock,
            store,
            notifier,
            cache,
        }
    }

    fn harness() -> Harness {
        harness_with(TrackerConfig::default(), MemoryCache::new(), MemoryStore::new())
    }

    fn shown_titles(notifier: &MemoryNotifier) -> Vec<String> {
        notifier
            .events()
            .into_iter()
            .filter_map(|event| match event {
                NotificationEvent::Shown { title, .. } => Some(title),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_start_fast_schedules_notifications() {
        let mut h = harness();
        let fast = h.controller.start_fast().unwrap();

        assert_eq!(fast.start_time(), t0());
        assert_eq!(fast.end_time(), t0() + Duration::hours(16));
        // Session id assigned by the store
        assert!(fast.session_id().is_some());

        // Four stage boundaries within 16h plus completion
        assert_eq!(h.notifier.pending().len(), 5);
        assert_eq!(shown_titles(&h.notifier), vec!["Fast started"]);

        // Cached snapshot carries the id too
        let cached = h.cache.load().unwrap().unwrap();
        assert_eq!(cached.session, h.controller.state().session);
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut h = harness();
        h.controller.start_fast().unwrap();
        assert!(matches!(
            h.controller.start_fast(),
            Err(FastingError::InvalidState(_))
        ));
        assert!(matches!(
            h.controller.start_fast_with(20, 4),
            Err(FastingError::InvalidState(_))
        ));
    }

    #[test]
    fn test_start_with_explicit_split() {
        let mut h = harness();
        let fast = h.controller.start_fast_with(20, 4).unwrap();
        assert_eq!(fast.end_time(), t0() + Duration::hours(20));
        assert_eq!(h.controller.state().session.ratio.to_string(), "20:4");

        let mut other = harness();
        assert!(matches!(
            other.controller.start_fast_with(16, 10),
            Err(FastingError::Validation(_))
        ));
        assert!(!other.controller.state().session.is_active());
    }

    #[test]
    fn test_end_early_cancels_and_counts() {
        let mut h = harness();
        h.controller.start_fast().unwrap();
        h.clock.advance(Duration::hours(10));

        let ended = h.controller.end_fast().unwrap();
        assert_eq!(ended.outcome, FastOutcome::EndedEarly);
        assert!((ended.fasted_hours - 10.0).abs() < 1e-9);

        assert!(h.notifier.pending().is_empty());
        let history = &h.controller.state().history;
        assert_eq!(history.current_streak(), 1);
        assert!(history.completed_days().contains(&1));
        assert!(!h.controller.state().session.is_active());

        // History synced to the store
        let stored = h.store.load_history("user-1").unwrap().unwrap();
        assert_eq!(&stored, history);
    }

    #[test]
    fn test_discard_policy_ignores_early_end() {
        let config = TrackerConfig {
            early_end_policy: EarlyEndPolicy::Discard,
            ..Default::default()
        };
        let mut h = harness_with(config, MemoryCache::new(), MemoryStore::new());
        h.controller.start_fast().unwrap();
        h.clock.advance(Duration::hours(6));
        h.controller.end_fast().unwrap();

        let history = &h.controller.state().history;
        assert_eq!(history.current_streak(), 0);
        assert!(history.completed_days().is_empty());
        assert_eq!(history.fasted_hours(1), Some(6.0));
    }

    #[test]
    fn test_end_idle_is_invalid_state() {
        let mut h = harness();
        assert!(matches!(
            h.controller.end_fast(),
            Err(FastingError::InvalidState(_))
        ));
        assert!(matches!(h.controller.tick(), Err(FastingError::InvalidState(_))));
    }

    #[test]
    fn test_tick_auto_ends_at_completion() {
        let mut h = harness();
        h.controller.start_fast().unwrap();

        h.clock.advance(Duration::hours(8));
        let midway = h.controller.tick().unwrap();
        assert!(midway.ended.is_none());
        assert!((midway.reading.progress_pct - 50.0).abs() < 1e-9);
        assert_eq!(midway.reading.current_stage.id, 3);

        h.clock.advance(Duration::hours(8));
        let done = h.controller.tick().unwrap();
        assert!(done.reading.is_complete);
        let ended = done.ended.unwrap();
        assert_eq!(ended.outcome, FastOutcome::Completed);
        assert!(!h.controller.state().session.is_active());
        assert_eq!(h.controller.state().history.current_streak(), 1);
        assert_eq!(
            shown_titles(&h.notifier),
            vec!["Fast started", "Fast complete"]
        );
    }

    #[test]
    fn test_set_fasting_type() {
        let mut h = harness();
        h.controller.set_fasting_type("18:6").unwrap();
        assert_eq!(h.controller.state().session.ratio.to_string(), "18:6");

        h.controller.start_fast().unwrap();
        assert!(matches!(
            h.controller.set_fasting_type("20:4"),
            Err(FastingError::InvalidState(_))
        ));
        assert_eq!(h.controller.state().session.ratio.to_string(), "18:6");
    }

    #[test]
    fn test_water_is_capped_and_recorded() {
        let mut h = harness();
        assert_eq!(h.controller.add_water(1).unwrap(), 1);
        assert_eq!(h.controller.add_water(20).unwrap(), 8);

        assert_eq!(h.controller.state().water_intake, 8);
        assert_eq!(
            h.controller.state().history.metrics_for(1).unwrap().water_intake,
            Some(8)
        );
        assert_eq!(h.store.metrics("user-1")[&1].water_intake, Some(8));

        h.controller.reset_water().unwrap();
        assert_eq!(h.controller.state().water_intake, 0);
    }

    #[test]
    fn test_set_day_breaks_streak_and_loads_water() {
        let mut h = harness();
        h.controller.add_water(3).unwrap();
        h.controller.start_fast().unwrap();
        h.controller.end_fast().unwrap();

        h.controller.set_day(2).unwrap();
        assert_eq!(h.controller.state().water_intake, 0);
        assert_eq!(h.controller.state().history.current_streak(), 1);

        h.controller.set_day(3).unwrap();
        assert_eq!(h.controller.state().history.current_streak(), 0);
        assert_eq!(h.controller.state().history.longest_streak(), 1);

        h.controller.set_day(1).unwrap();
        assert_eq!(h.controller.state().water_intake, 3);

        assert!(matches!(
            h.controller.set_day(21),
            Err(FastingError::Validation(_))
        ));
    }

    #[test]
    fn test_weights_update_profile_and_metrics() {
        let mut h = harness();
        h.controller.set_weight(82.5).unwrap();
        h.controller.set_target_weight(75.0).unwrap();

        let state = h.controller.state();
        assert_eq!(state.profile.weight_kg, Some(82.5));
        assert_eq!(state.profile.target_weight_kg, Some(75.0));
        assert_eq!(state.history.metrics_for(1).unwrap().weight, Some(82.5));

        assert!(h.controller.set_weight(-1.0).is_err());
        assert!(h.controller.set_target_weight(f64::NAN).is_err());
    }

    #[test]
    fn test_record_daily_metrics_validation() {
        let mut h = harness();
        let bad = DailyMetrics {
            mood: Some(9.0),
            ..Default::default()
        };
        assert!(matches!(
            h.controller.record_daily_metrics(None, bad),
            Err(FastingError::Validation(_))
        ));
        assert!(h.controller.state().history.daily_metrics().is_empty());

        let good = DailyMetrics {
            water_intake: Some(5),
            weight: Some(80.0),
            mood: Some(4.0),
        };
        h.controller.record_daily_metrics(None, good).unwrap();
        assert_eq!(h.controller.state().water_intake, 5);
        assert_eq!(h.controller.state().history.metrics_for(1), Some(&good));
    }

    #[test]
    fn test_observers() {
        let mut h = harness();
        let seen: Rc<RefCell<Vec<StateChange>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let id = h.controller.subscribe(Box::new(move |_: &TrackerState, change: &StateChange| {
            sink.borrow_mut().push(change.clone());
        }));

        h.controller.add_water(1).unwrap();
        h.controller.set_fasting_type("20:4").unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![
                StateChange::WaterChanged { day: 1, intake: 1 },
                StateChange::RatioChanged {
                    ratio: FastingRatio::new(20, 4).unwrap()
                },
            ]
        );

        assert!(h.controller.unsubscribe(id));
        assert!(!h.controller.unsubscribe(id));
        h.controller.add_water(1).unwrap();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_failed_mutation_does_not_notify_observers() {
        let mut h = harness();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        h.controller
            .subscribe(Box::new(move |_: &TrackerState, _: &StateChange| {
                *counter.borrow_mut() += 1
            }));

        assert!(h.controller.end_fast().is_err());
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_offline_store_keeps_local_state() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let mut h = harness_with(TrackerConfig::default(), MemoryCache::new(), store);

        let fast = h.controller.start_fast().unwrap();
        assert!(fast.session_id().is_none());
        h.controller.end_fast().unwrap();

        assert_eq!(h.controller.state().history.current_streak(), 1);
        // Cache still written
        assert!(h.cache.load().unwrap().is_some());

        h.store.set_offline(false);
        assert!(h.store.load_history("user-1").unwrap().is_none());
    }

    #[test]
    fn test_restart_keeps_metrics_recorded_after_fast() {
        let mut h = harness();
        h.controller.start_fast().unwrap();
        h.clock.advance(Duration::hours(16));
        h.controller.end_fast().unwrap();
        h.controller.set_weight(79.5).unwrap();
        h.controller.add_water(3).unwrap();

        let restarted = harness_with(TrackerConfig::default(), h.cache.clone(), h.store.clone());
        let state = restarted.controller.state();
        let day1 = state.history.metrics_for(1).copied();

        assert_eq!(day1.and_then(|m| m.weight), Some(79.5));
        assert_eq!(day1.and_then(|m| m.water_intake), Some(3));
        assert_eq!(state.water_intake, 3);
        assert_eq!(state.history.current_streak(), 1);
    }

    #[test]
    fn test_restart_keeps_metrics_recorded_offline() {
        let mut h = harness();
        h.controller.start_fast().unwrap();
        h.clock.advance(Duration::hours(16));
        h.controller.end_fast().unwrap();

        h.store.set_offline(true);
        h.controller.set_weight(80.2).unwrap();
        h.store.set_offline(false);

        let restarted = harness_with(TrackerConfig::default(), h.cache.clone(), h.store.clone());
        let day1 = restarted.controller.state().history.metrics_for(1).copied();
        assert_eq!(day1.and_then(|m| m.weight), Some(80.2));
    }

    #[test]
    fn test_oversized_ratio_is_rejected_without_panic() {
        let mut h = harness();
        let result = h.controller.dispatch(Command::SetFastingType {
            ratio: "4294967295:1".to_string(),
        });
        assert!(matches!(result, Err(FastingError::Validation(_))));

        let relaxed = TrackerConfig {
            require_full_day_ratio: false,
            ..Default::default()
        };
        let mut h = harness_with(relaxed, MemoryCache::new(), MemoryStore::new());
        let result = h.controller.set_fasting_type("4000000000:1");
        assert!(matches!(result, Err(FastingError::Validation(_))));
        assert!(h.controller.start_fast().is_ok());
        assert_eq!(h.controller.state().session.ratio, FastingRatio::default());
    }

    #[test]
    fn test_bootstrap_overlays_store_over_cache() {
        let mut cached = TrackerState::default();
        cached.water_intake = 4;
        cached.history.record_completion(16.0);

        let mut remote = crate::session::FastingSession::default();
        remote.start(t0() - Duration::hours(2)).unwrap();
        let store = MemoryStore::new();
        store.save_session("user-1", &remote).unwrap();

        let h = harness_with(
            TrackerConfig::default(),
            MemoryCache::with_state(cached),
            store,
        );

        let state = h.controller.state();
        assert_eq!(state.water_intake, 4);
        // No history in the store: cached history kept
        assert_eq!(state.history.current_streak(), 1);
        assert!(state.session.is_active());

        // Only notifications still in the future: stages at 4, 8, 12, 16h and completion
        let pending = h.notifier.pending();
        assert_eq!(pending.len(), 5);
        assert!(pending.iter().all(|(_, n)| n.at > t0()));
    }

    #[test]
    fn test_bootstrap_skips_past_notifications() {
        let mut remote = crate::session::FastingSession::default();
        remote.start(t0() - Duration::hours(9)).unwrap();
        let store = MemoryStore::new();
        store.save_session("user-1", &remote).unwrap();

        let h = harness_with(TrackerConfig::default(), MemoryCache::new(), store);
        // 12h and 16h stages plus completion remain
        assert_eq!(h.notifier.pending().len(), 3);
    }

    #[test]
    fn test_bootstrap_rejects_invalid_config() {
        let config = TrackerConfig {
            program_days: 0,
            ..Default::default()
        };
        let result = FastingController::bootstrap(config, "u", Collaborators::in_memory());
        assert!(matches!(result, Err(FastingError::Validation(_))));
    }

    #[test]
    fn test_notifications_toggle() {
        let mut h = harness();
        h.controller.set_notifications(false);
        h.controller.start_fast().unwrap();
        assert!(h.notifier.pending().is_empty());
        assert!(shown_titles(&h.notifier).is_empty());

        h.controller.set_notifications(true);
        assert_eq!(h.notifier.pending().len(), 5);

        h.controller.set_notifications(false);
        assert!(h.notifier.pending().is_empty());
    }

    fn draft(name: &str, days: Vec<Weekday>) -> ScheduleDraft {
        ScheduleDraft {
            name: name.to_string(),
            start_time: parse_time_of_day("18:00").unwrap(),
            days,
            ratio: FastingRatio::default(),
            active: true,
        }
    }

    #[test]
    fn test_schedule_lifecycle() {
        let mut h = harness();
        let id = h
            .controller
            .add_schedule(draft("Workdays", vec![Weekday::Mon, Weekday::Fri]))
            .unwrap();
        assert_eq!(h.controller.state().schedules.len(), 1);
        assert_eq!(h.notifier.pending().len(), 2);

        h.controller
            .update_schedule(&id, draft("Daily", vec![]))
            .unwrap();
        let schedule = h.controller.state().schedule(&id).unwrap();
        assert_eq!(schedule.name, "Daily");
        // Old reminders replaced by one daily reminder
        let pending = h.notifier.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].1.at, t0() - Duration::hours(2) + Duration::days(1));

        h.controller.remove_schedule(&id).unwrap();
        assert!(h.controller.state().schedules.is_empty());
        assert!(h.notifier.pending().is_empty());

        assert!(matches!(
            h.controller.remove_schedule(&id),
            Err(FastingError::Validation(_))
        ));
        assert!(h
            .controller
            .update_schedule("missing", draft("x", vec![]))
            .is_err());
    }

    #[test]
    fn test_dispatch_json_commands() {
        let mut h = harness();

        let outcome = h
            .controller
            .dispatch(Command::from_json(r#"{"type":"start_fast","payload":{}}"#).unwrap())
            .unwrap();
        assert!(matches!(outcome, CommandOutcome::FastStarted(_)));

        let outcome = h
            .controller
            .dispatch(Command::from_json(r#"{"type":"end_fast"}"#).unwrap())
            .unwrap();
        assert!(matches!(outcome, CommandOutcome::FastEnded(_)));

        let outcome = h
            .controller
            .dispatch(Command::from_json(r#"{"type":"add_water","payload":{}}"#).unwrap())
            .unwrap();
        assert_eq!(outcome, CommandOutcome::WaterIntake { glasses: 1 });

        let outcome = h
            .controller
            .dispatch(
                Command::from_json(
                    r#"{"type":"add_to_cart","payload":{"id":"eggs","name":"Eggs","quantity":6}}"#,
                )
                .unwrap(),
            )
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Done);
        assert_eq!(h.controller.state().cart.items()[0].quantity, 1);

        let half = Command::StartFast {
            fasting_hours: Some(16),
            eating_hours: None,
        };
        assert!(matches!(
            h.controller.dispatch(half),
            Err(FastingError::Validation(_))
        ));

        assert!(Command::from_json(r#"{"type":"fly"}"#).is_err());
    }

    #[test]
    fn test_dispatch_cart_commands() {
        let mut h = harness();
        let item = CartItem {
            id: "oats".to_string(),
            name: "Oats".to_string(),
            amount: None,
            unit: None,
            category: None,
            quantity: 1,
        };
        h.controller.dispatch(Command::AddToCart(item)).unwrap();
        h.controller
            .dispatch(Command::UpdateCartQuantity {
                id: "oats".to_string(),
                quantity: 3,
            })
            .unwrap();
        assert_eq!(h.controller.state().cart.items()[0].quantity, 3);

        assert!(h
            .controller
            .dispatch(Command::UpdateCartQuantity {
                id: "rice".to_string(),
                quantity: 1,
            })
            .is_err());

        h.controller.dispatch(Command::ClearCart).unwrap();
        assert!(h.controller.state().cart.is_empty());
    }

    #[test]
    fn test_add_recipe_to_cart_merges_shared_ingredients() {
        let mut h = harness();
        let command = Command::from_json(
            r#"{"type":"add_recipe_to_cart","payload":{"recipe_id":"breakfast_1"}}"#,
        )
        .unwrap();
        h.controller.dispatch(command).unwrap();
        assert_eq!(h.controller.state().cart.items().len(), 7);

        // Lunch shares olive oil with breakfast
        h.controller.add_recipe_to_cart("lunch_1").unwrap();
        let cart = &h.controller.state().cart;
        let olive_oil = cart.items().iter().find(|i| i.id == "olive_oil").unwrap();
        assert_eq!(olive_oil.quantity, 2);
        assert_eq!(cart.items().len(), 7 + 7);

        assert!(matches!(
            h.controller.add_recipe_to_cart("brunch_9"),
            Err(FastingError::Validation(_))
        ));
    }

    #[test]
    fn test_read_outs() {
        let mut h = harness();
        assert_eq!(h.controller.calorie_target(), 2000);

        h.controller
            .update_profile(ProfileUpdate {
                gender: Some(Gender::Male),
                age: Some(30),
                height_cm: Some(180.0),
                weight_kg: Some(80.0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(h.controller.calorie_target(), 2207);

        // Day 1 not completed yet: 0% consistency
        let insights = h.controller.insights();
        assert!(insights.iter().any(|i| i.kind == InsightKind::Consistency));
        let recommendations = h.controller.recommendations();
        assert_eq!(
            recommendations[0].kind,
            RecommendationKind::ImproveConsistency
        );

        h.controller.start_fast().unwrap();
        h.controller.end_fast().unwrap();
        let analytics = h.controller.analytics();
        assert_eq!(analytics.fasting.len(), 1);
        assert!(analytics.fasting[0].completed);
        assert_eq!(analytics.weekly_success[0].success_rate, 100.0);
    }

    #[test]
    fn test_load_state_replaces_and_persists() {
        let mut h = harness();
        h.controller.start_fast().unwrap();
        assert_eq!(h.notifier.pending().len(), 5);

        let mut replacement = TrackerState::default();
        replacement.water_intake = 2;
        h.controller.load_state(replacement.clone());

        assert!(h.notifier.pending().is_empty());
        assert_eq!(h.controller.state(), &replacement);
        assert_eq!(h.cache.load().unwrap(), Some(replacement));
    }
}
