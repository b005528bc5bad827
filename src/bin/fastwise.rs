//! Fastwise CLI - Command-line front end for the fasting tracker
//!
//! Every invocation loads the tracker state from a JSON file, applies one command
//! and writes the state back.
//!
//! Commands:
//! - start / end / status: run the fasting timer
//! - ratio, water, weight, day, metrics, profile: record progress
//! - analytics, insights, calories, stages: read derived data
//! - schedule: manage recurring fasting schedules
//! - meals, cart: browse the meal plan and keep the shopping list
//! - dispatch: apply a raw JSON command
//! - doctor: diagnose the state and configuration files

use clap::{Parser, Subcommand, ValueEnum};
use chrono::{Utc, Weekday};
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use fastwise::clock::SystemClock;
use fastwise::controller::{Collaborators, Command, FastingController};
use fastwise::notify::MemoryNotifier;
use fastwise::recipes::recipes_for_day;
use fastwise::schedule::{parse_time_of_day, ScheduleDraft};
use fastwise::stages::FASTING_STAGES;
use fastwise::store::{JsonFileCache, LocalCache, MemoryStore};
use fastwise::types::{ActivityLevel, DailyMetrics, FastingRatio, Gender, Goal, ProfileUpdate};
use fastwise::{FastingError, TrackerConfig, TrackerState, FASTWISE_VERSION};

/// Environment variable holding the log filter
const LOG_ENV: &str = "FASTWISE_LOG";

/// User id for the local state file
const CLI_USER_ID: &str = "local";

/// Fastwise - intermittent fasting tracker
#[derive(Parser)]
#[command(name = "fastwise")]
#[command(version = FASTWISE_VERSION)]
#[command(about = "Track intermittent fasting from the command line", long_about = None)]
struct Cli {
    /// Tracker state file
    #[arg(long, global = true, default_value = "fastwise-state.json")]
    state: PathBuf,

    /// Tracker configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a fast
    Start {
        /// Fasting hours (requires --eating)
        #[arg(long, requires = "eating")]
        fasting: Option<u32>,

        /// Eating hours (requires --fasting)
        #[arg(long, requires = "fasting")]
        eating: Option<u32>,
    },

    /// End the running fast
    End,

    /// Show the timer, or a summary when no fast is running
    Status,

    /// Set the fasting ratio, e.g. 18:6
    Ratio { ratio: String },

    /// Log glasses of water
    Water {
        #[arg(default_value = "1")]
        glasses: u32,

        /// Reset today's counter instead
        #[arg(long)]
        reset: bool,
    },

    /// Record today's weight in kg
    Weight {
        kg: f64,

        /// Set the target weight instead
        #[arg(long)]
        target: bool,
    },

    /// Move to a program day
    Day { day: u32 },

    /// Record metrics for a day
    Metrics {
        /// Program day (defaults to the current day)
        #[arg(long)]
        day: Option<u32>,

        #[arg(long)]
        water: Option<u32>,

        #[arg(long)]
        weight: Option<f64>,

        /// Mood from 1 to 5
        #[arg(long)]
        mood: Option<f64>,
    },

    /// Update the user profile
    Profile {
        #[arg(long)]
        gender: Option<GenderArg>,

        #[arg(long)]
        age: Option<u32>,

        /// Height in cm
        #[arg(long)]
        height: Option<f64>,

        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,

        /// Target weight in kg
        #[arg(long)]
        target_weight: Option<f64>,

        #[arg(long)]
        activity: Option<ActivityArg>,

        #[arg(long)]
        goal: Option<GoalArg>,
    },

    /// Print the analytics series
    Analytics,

    /// Print insights and recommendations
    Insights,

    /// Print the daily calorie target
    Calories,

    /// List the fasting stages
    Stages,

    /// Show the meal plan for a day
    Meals {
        /// Program day (defaults to the current day)
        #[arg(long)]
        day: Option<u32>,

        /// Add a recipe's ingredients to the shopping cart
        #[arg(long, value_name = "RECIPE_ID")]
        add: Option<String>,
    },

    /// Show the shopping cart
    Cart {
        /// Empty the cart
        #[arg(long)]
        clear: bool,
    },

    /// Manage recurring schedules
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },

    /// Apply a raw JSON command (use - to read it from stdin)
    Dispatch { command: String },

    /// Diagnose the state and configuration files
    Doctor,
}

#[derive(Subcommand)]
enum ScheduleAction {
    /// Add a schedule
    Add {
        #[arg(long)]
        name: String,

        /// Start time of day, HH:MM (UTC)
        #[arg(long)]
        start: String,

        /// Weekdays, comma separated (empty means daily)
        #[arg(long, value_delimiter = ',', value_parser = parse_weekday)]
        days: Vec<Weekday>,

        #[arg(long, default_value = "16:8")]
        ratio: String,
    },

    /// List schedules with their next start
    List,

    /// Remove a schedule
    Remove { id: String },
}

#[derive(Clone, ValueEnum)]
enum GenderArg {
    Male,
    Female,
    Other,
}

#[derive(Clone, ValueEnum)]
enum ActivityArg {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

#[derive(Clone, ValueEnum)]
enum GoalArg {
    WeightLoss,
    WeightGain,
    MuscleGain,
    Maintenance,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
            GenderArg::Other => Gender::Other,
        }
    }
}

impl From<ActivityArg> for ActivityLevel {
    fn from(arg: ActivityArg) -> Self {
        match arg {
            ActivityArg::Sedentary => ActivityLevel::Sedentary,
            ActivityArg::Light => ActivityLevel::Light,
            ActivityArg::Moderate => ActivityLevel::Moderate,
            ActivityArg::Active => ActivityLevel::Active,
            ActivityArg::VeryActive => ActivityLevel::VeryActive,
        }
    }
}

impl From<GoalArg> for Goal {
    fn from(arg: GoalArg) -> Self {
        match arg {
            GoalArg::WeightLoss => Goal::WeightLoss,
            GoalArg::WeightGain => Goal::WeightGain,
            GoalArg::MuscleGain => Goal::MuscleGain,
            GoalArg::Maintenance => Goal::Maintenance,
        }
    }
}

fn parse_weekday(raw: &str) -> Result<Weekday, String> {
    raw.trim()
        .parse::<Weekday>()
        .map_err(|_| format!("'{raw}' is not a weekday"))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), FastwiseCliError> {
    match cli.command {
        Commands::Stages => return cmd_stages(cli.json),
        Commands::Doctor => return cmd_doctor(&cli.state, cli.config.as_deref(), cli.json),
        _ => {}
    }

    let config = load_config(cli.config.as_deref())?;

    let notifier = MemoryNotifier::new();
    let mut controller = FastingController::bootstrap(
        config,
        CLI_USER_ID,
        Collaborators {
            store: Box::new(MemoryStore::new()),
            cache: Box::new(JsonFileCache::new(&cli.state)),
            notifier: Box::new(notifier.clone()),
            clock: Box::new(SystemClock),
        },
    )?;
    let json = cli.json;

    match cli.command {
        Commands::Start { fasting, eating } => {
            let command = Command::StartFast {
                fasting_hours: fasting,
                eating_hours: eating,
            };
            let outcome = controller.dispatch(command)?;
            print_value(json, &outcome, || {
                if let Some(fast) = controller.state().session.active() {
                    println!(
                        "Fast started ({}), ends at {}",
                        controller.state().session.ratio,
                        fast.end_time().format("%Y-%m-%d %H:%M UTC")
                    );
                }
                let scheduled = notifier.pending().len();
                println!("{scheduled} reminders planned");
            })
        }

        Commands::End => {
            let ended = controller.end_fast()?;
            print_value(json, &ended, || {
                println!(
                    "Fast ended after {:.1}h ({})",
                    ended.fasted_hours,
                    match ended.outcome {
                        fastwise::session::FastOutcome::Completed => "completed",
                        fastwise::session::FastOutcome::EndedEarly => "ended early",
                    }
                );
                let history = &controller.state().history;
                println!(
                    "Streak: {} (longest {})",
                    history.current_streak(),
                    history.longest_streak()
                );
            })
        }

        Commands::Status => cmd_status(&mut controller, json),

        Commands::Ratio { ratio } => {
            controller.set_fasting_type(&ratio)?;
            let ratio = controller.state().session.ratio;
            print_value(json, &ratio, || println!("Fasting ratio set to {ratio}"))
        }

        Commands::Water { glasses, reset } => {
            let intake = if reset {
                controller.reset_water()?;
                0
            } else {
                controller.add_water(glasses)?
            };
            let goal = controller.config().daily_water_goal;
            print_value(json, &serde_json::json!({ "intake": intake, "goal": goal }), || {
                println!("Water: {intake}/{goal} glasses")
            })
        }

        Commands::Weight { kg, target } => {
            if target {
                controller.set_target_weight(kg)?;
            } else {
                controller.set_weight(kg)?;
            }
            print_value(json, &controller.state().profile, || {
                let label = if target { "Target weight" } else { "Weight" };
                println!("{label} set to {kg:.1} kg");
            })
        }

        Commands::Day { day } => {
            controller.set_day(day)?;
            let history = &controller.state().history;
            print_value(json, history, || {
                println!(
                    "Day {} of {} (streak {})",
                    history.current_day(),
                    controller.config().program_days,
                    history.current_streak()
                )
            })
        }

        Commands::Metrics {
            day,
            water,
            weight,
            mood,
        } => {
            let metrics = DailyMetrics {
                water_intake: water,
                weight,
                mood,
            };
            controller.record_daily_metrics(day, metrics)?;
            let day = day.unwrap_or(controller.state().history.current_day());
            print_value(json, &metrics, || println!("Metrics recorded for day {day}"))
        }

        Commands::Profile {
            gender,
            age,
            height,
            weight,
            target_weight,
            activity,
            goal,
        } => {
            controller.update_profile(ProfileUpdate {
                gender: gender.map(Gender::from),
                age,
                height_cm: height,
                weight_kg: weight,
                target_weight_kg: target_weight,
                activity_level: activity.map(ActivityLevel::from),
                goal: goal.map(Goal::from),
                ..Default::default()
            })?;
            print_value(json, &controller.state().profile, || {
                println!("Profile updated");
                println!("Calorie target: {} kcal/day", controller.calorie_target());
            })
        }

        Commands::Analytics => {
            let analytics = controller.analytics();
            print_value(json, &analytics, || {
                println!("Fasting");
                for point in &analytics.fasting {
                    let duration = point
                        .duration
                        .map(|h| format!("{h:.1}h"))
                        .unwrap_or_else(|| "-".to_string());
                    let mark = if point.completed { "x" } else { " " };
                    println!("  day {:>2} [{mark}] {duration} of {}h", point.day, point.planned);
                }
                if !analytics.weight.is_empty() {
                    println!("Weight");
                    for point in &analytics.weight {
                        println!(
                            "  day {:>2} {:.1} kg (target {:.1})",
                            point.day, point.weight, point.target
                        );
                    }
                }
                println!("Weekly success");
                for week in &analytics.weekly_success {
                    println!(
                        "  week {} {:.0}% ({}/{})",
                        week.week, week.success_rate, week.completed, week.total
                    );
                }
            })
        }

        Commands::Insights => {
            let insights = controller.insights();
            let recommendations = controller.recommendations();
            let report = serde_json::json!({
                "insights": insights,
                "recommendations": recommendations,
            });
            print_value(json, &report, || {
                println!("Insights");
                if insights.is_empty() {
                    println!("  (none yet)");
                }
                for insight in &insights {
                    println!("  {} ({}): {}", insight.label, insight.value, insight.description);
                }
                println!("Recommendations");
                for rec in &recommendations {
                    println!("  [{:?}] {}: {}", rec.priority, rec.title, rec.description);
                }
            })
        }

        Commands::Calories => {
            let target = controller.calorie_target();
            print_value(json, &serde_json::json!({ "calorie_target": target }), || {
                println!("Calorie target: {target} kcal/day")
            })
        }

        Commands::Meals { day, add } => {
            if let Some(recipe_id) = add {
                controller.add_recipe_to_cart(&recipe_id)?;
            }
            let day = day.unwrap_or(controller.state().history.current_day());
            let menu = recipes_for_day(day);
            print_value(json, menu, || {
                println!("Meal plan for day {day} ({} kcal)", menu.calories());
                for recipe in menu.recipes() {
                    println!(
                        "  {} {:<32} {:>4} kcal  [{}]",
                        recipe.serve_at, recipe.name, recipe.calories, recipe.id
                    );
                }
            })
        }

        Commands::Cart { clear } => {
            if clear {
                controller.clear_cart();
            }
            let cart = &controller.state().cart;
            print_value(json, cart, || {
                if cart.is_empty() {
                    println!("Cart is empty");
                }
                for item in cart.items() {
                    let amount = [item.amount.as_deref(), item.unit.as_deref()]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join(" ");
                    println!("  {} x{} {amount}", item.name, item.quantity);
                }
            })
        }

        Commands::Schedule { action } => cmd_schedule(&mut controller, action, json),

        Commands::Dispatch { command } => {
            let raw = if command == "-" {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                buffer
            } else {
                command
            };
            let outcome = controller.dispatch(Command::from_json(&raw)?)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }

        Commands::Stages | Commands::Doctor => Ok(()),
    }
}

fn load_config(path: Option<&Path>) -> Result<TrackerConfig, FastwiseCliError> {
    match path {
        Some(path) => Ok(TrackerConfig::from_file(path)?),
        None => Ok(TrackerConfig::default()),
    }
}

/// Print `value` as pretty JSON, or run the text printer
fn print_value<T: Serialize>(
    json: bool,
    value: &T,
    text: impl FnOnce(),
) -> Result<(), FastwiseCliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text();
    }
    Ok(())
}

fn format_hms(ms: i64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

fn cmd_status(controller: &mut FastingController, json: bool) -> Result<(), FastwiseCliError> {
    if !controller.state().session.is_active() {
        let state = controller.state();
        return print_value(json, state, || {
            println!("No active fast ({})", state.session.ratio);
            println!(
                "Day {} of {}, streak {} (longest {})",
                state.history.current_day(),
                controller.config().program_days,
                state.history.current_streak(),
                state.history.longest_streak()
            );
            println!(
                "Water: {}/{} glasses",
                state.water_intake,
                controller.config().daily_water_goal
            );
        });
    }

    let tick = controller.tick()?;
    print_value(json, &tick, || {
        let reading = &tick.reading;
        println!(
            "Stage {}: {} ({})",
            reading.current_stage.id,
            reading.current_stage.name,
            reading.current_stage.time_range()
        );
        println!("  {}", reading.current_stage.description);
        println!(
            "Elapsed {}  Remaining {}  {:.0}%",
            format_hms(reading.elapsed_ms),
            format_hms(reading.remaining_ms),
            reading.progress_pct
        );
        if let Some(next) = reading.next_stage {
            println!("Next: {} at {}h", next.name, next.start_hour);
        }
        if let Some(ended) = &tick.ended {
            println!("Fast complete after {:.1}h", ended.fasted_hours);
        }
    })
}

fn cmd_stages(json: bool) -> Result<(), FastwiseCliError> {
    print_value(json, &FASTING_STAGES, || {
        for stage in FASTING_STAGES.iter() {
            println!("{}. {} ({})", stage.id, stage.name, stage.time_range());
            println!("   {}", stage.description);
            for effect in stage.effects {
                println!("   - {effect}");
            }
        }
    })
}

fn cmd_schedule(
    controller: &mut FastingController,
    action: ScheduleAction,
    json: bool,
) -> Result<(), FastwiseCliError> {
    match action {
        ScheduleAction::Add {
            name,
            start,
            days,
            ratio,
        } => {
            let draft = ScheduleDraft {
                name,
                start_time: parse_time_of_day(&start)?,
                days,
                ratio: ratio.parse::<FastingRatio>()?,
                active: true,
            };
            let id = controller.add_schedule(draft)?;
            print_value(json, &controller.state().schedule(&id), || {
                println!("Schedule {id} added")
            })
        }

        ScheduleAction::List => {
            let now = Utc::now();
            let schedules = &controller.state().schedules;
            print_value(json, schedules, || {
                if schedules.is_empty() {
                    println!("No schedules");
                }
                for schedule in schedules {
                    let days = if schedule.days.is_empty() {
                        "daily".to_string()
                    } else {
                        schedule
                            .days
                            .iter()
                            .map(|d| d.to_string())
                            .collect::<Vec<_>>()
                            .join(",")
                    };
                    let next = schedule
                        .next_start_after(now)
                        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                        .unwrap_or_else(|| "inactive".to_string());
                    println!(
                        "{}  {} {} {} ({}), eating from {}, next {}",
                        schedule.id,
                        schedule.name,
                        schedule.start_time.format("%H:%M"),
                        days,
                        schedule.ratio,
                        schedule.eating_window_start().format("%H:%M"),
                        next
                    );
                }
            })
        }

        ScheduleAction::Remove { id } => {
            controller.remove_schedule(&id)?;
            print_value(json, &serde_json::json!({ "removed": id }), || {
                println!("Schedule {id} removed")
            })
        }
    }
}

fn cmd_doctor(
    state_path: &Path,
    config_path: Option<&Path>,
    json: bool,
) -> Result<(), FastwiseCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "fastwise_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Fastwise version {}", FASTWISE_VERSION),
    });

    let contiguous = FASTING_STAGES
        .windows(2)
        .all(|pair| pair[0].end_hour == pair[1].start_hour);
    checks.push(DoctorCheck {
        name: "stages".to_string(),
        status: if contiguous {
            CheckStatus::Ok
        } else {
            CheckStatus::Error
        },
        message: format!("{} stages loaded", FASTING_STAGES.len()),
    });

    let config = match config_path {
        Some(path) => match TrackerConfig::from_file(path) {
            Ok(config) => {
                checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!("{} is valid", path.display()),
                });
                config
            }
            Err(e) => {
                checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("{}: {e}", path.display()),
                });
                TrackerConfig::default()
            }
        },
        None => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: "Using built-in defaults".to_string(),
            });
            TrackerConfig::default()
        }
    };

    match JsonFileCache::new(state_path).load() {
        Ok(Some(state)) => {
            checks.push(state_check(&state, &config));
            if let Some(fast) = state.session.active() {
                if fast.end_time() <= Utc::now() {
                    checks.push(DoctorCheck {
                        name: "active_fast".to_string(),
                        status: CheckStatus::Warning,
                        message: "Fast passed its end time; run 'fastwise status' to complete it"
                            .to_string(),
                    });
                }
            }
        }
        Ok(None) => checks.push(DoctorCheck {
            name: "state".to_string(),
            status: CheckStatus::Warning,
            message: format!("{} does not exist yet", state_path.display()),
        }),
        Err(e) => checks.push(DoctorCheck {
            name: "state".to_string(),
            status: CheckStatus::Error,
            message: format!("Cannot read {}: {e}", state_path.display()),
        }),
    }

    let report = DoctorReport {
        version: FASTWISE_VERSION.to_string(),
        state_file: state_path.display().to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Fastwise Doctor Report");
        println!("======================");
        println!("Version: {}", report.version);
        println!("State:   {}", report.state_file);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(FastwiseCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn state_check(state: &TrackerState, config: &TrackerConfig) -> DoctorCheck {
    let day = state.history.current_day();
    if day > config.program_days {
        return DoctorCheck {
            name: "state".to_string(),
            status: CheckStatus::Warning,
            message: format!(
                "Current day {day} is past the {}-day program",
                config.program_days
            ),
        };
    }
    DoctorCheck {
        name: "state".to_string(),
        status: CheckStatus::Ok,
        message: format!(
            "Day {day}, {} days completed, {} schedules",
            state.history.completed_days().len(),
            state.schedules.len()
        ),
    }
}

// Error types

#[derive(Debug)]
enum FastwiseCliError {
    Tracker(FastingError),
    Io(io::Error),
    Json(serde_json::Error),
    DoctorFailed,
}

impl From<FastingError> for FastwiseCliError {
    fn from(e: FastingError) -> Self {
        FastwiseCliError::Tracker(e)
    }
}

impl From<io::Error> for FastwiseCliError {
    fn from(e: io::Error) -> Self {
        FastwiseCliError::Io(e)
    }
}

impl From<serde_json::Error> for FastwiseCliError {
    fn from(e: serde_json::Error) -> Self {
        FastwiseCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<FastwiseCliError> for CliError {
    fn from(e: FastwiseCliError) -> Self {
        match e {
            FastwiseCliError::Tracker(e) => {
                let hint = match &e {
                    FastingError::InvalidState(_) => {
                        Some("Run 'fastwise status' to see the current fast")
                    }
                    FastingError::Validation(_) => Some("Check the command arguments"),
                    FastingError::Sync(_) => None,
                    FastingError::Json(_) => Some("Check JSON syntax"),
                    FastingError::Io(_) => Some("Check file paths and permissions"),
                };
                CliError {
                    code: e.code().to_string(),
                    message: e.to_string(),
                    hint: hint.map(str::to_string),
                }
            }
            FastwiseCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            FastwiseCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            FastwiseCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct DoctorReport {
    version: String,
    state_file: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
