//! Fasting stage catalog
//!
//! Static table mapping elapsed fasting hours to physiological stages. Ranges are
//! half-open `[start, end)` and contiguous from hour 0; the last entry doubles as the
//! open-ended terminal stage for anything past its upper bound.

use serde::Serialize;

/// One physiological phase of a fast
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageDefinition {
    pub id: u32,
    /// Inclusive start hour
    pub start_hour: f64,
    /// Exclusive end hour
    pub end_hour: f64,
    pub name: &'static str,
    pub description: &'static str,
    pub effects: &'static [&'static str],
    pub tips: &'static [&'static str],
}

impl StageDefinition {
    /// Whether `hours` falls inside `[start_hour, end_hour)`
    pub fn contains(&self, hours: f64) -> bool {
        hours >= self.start_hour && hours < self.end_hour
    }

    /// Human-readable range, e.g. `"4-8h"`
    pub fn time_range(&self) -> String {
        format!("{}-{}h", self.start_hour, self.end_hour)
    }
}

pub static FASTING_STAGES: [StageDefinition; 6] = [
    StageDefinition {
        id: 1,
        start_hour: 0.0,
        end_hour: 4.0,
        name: "Fasting onset",
        description: "The body is running on available glucose",
        effects: &[
            "Digesting the last meal",
            "Insulin levels begin to fall",
            "Glucose is the main energy source",
        ],
        tips: &[
            "Drink plenty of water",
            "Keep your mind off food",
            "Stay busy with something useful",
        ],
    },
    StageDefinition {
        id: 2,
        start_hour: 4.0,
        end_hour: 8.0,
        name: "Entering ketosis",
        description: "The body starts burning stored fat",
        effects: &[
            "Insulin levels drop",
            "Fat burning begins",
            "Mental focus improves",
        ],
        tips: &[
            "Mild hunger is normal",
            "Keep drinking water",
            "Unsweetened tea or coffee is fine",
        ],
    },
    StageDefinition {
        id: 3,
        start_hour: 8.0,
        end_hour: 12.0,
        name: "Fat burning",
        description: "Active fat burning is under way",
        effects: &[
            "Stored fat is burned efficiently",
            "Energy levels improve",
            "Cellular renewal starts",
        ],
        tips: &[
            "A strong phase for weight loss",
            "You may feel more energetic",
            "Use the time for productive work",
        ],
    },
    StageDefinition {
        id: 4,
        start_hour: 12.0,
        end_hour: 16.0,
        name: "Deep ketosis",
        description: "Marked improvement in mental clarity",
        effects: &[
            "Heavy ketone production",
            "Excellent mental clarity",
            "Better focus and memory",
        ],
        tips: &[
            "Schedule demanding mental tasks now",
            "Clarity may feel unusually sharp",
            "A good window for creative work",
        ],
    },
    StageDefinition {
        id: 5,
        start_hour: 16.0,
        end_hour: 20.0,
        name: "Cellular renewal",
        description: "Autophagy begins",
        effects: &[
            "Autophagy is activated",
            "Damaged cells are cleared",
            "Tissue repair and cell renewal",
        ],
        tips: &[
            "An important phase for overall health",
            "The body is repairing itself",
            "Anti-ageing benefits start here",
        ],
    },
    StageDefinition {
        id: 6,
        start_hour: 20.0,
        end_hour: 24.0,
        name: "Advanced fasting",
        description: "Advanced health and renewal benefits",
        effects: &[
            "Growth hormone rises",
            "Insulin sensitivity improves",
            "Anti-inflammatory effects",
        ],
        tips: &[
            "Advanced phase, for experienced fasters",
            "Listen to your body",
            "Break the fast gradually",
        ],
    },
];

fn matching_index(hours: f64) -> Option<usize> {
    FASTING_STAGES.iter().position(|stage| stage.contains(hours))
}

/// Stage containing `hours`, falling back to the terminal stage
pub fn stage_for_elapsed_hours(hours: f64) -> &'static StageDefinition {
    let terminal = FASTING_STAGES.len() - 1;
    &FASTING_STAGES[matching_index(hours).unwrap_or(terminal)]
}

/// Stage after the one containing `hours`; `None` at or past the terminal stage
pub fn next_stage_for_elapsed_hours(hours: f64) -> Option<&'static StageDefinition> {
    matching_index(hours).and_then(|index| FASTING_STAGES.get(index + 1))
}
