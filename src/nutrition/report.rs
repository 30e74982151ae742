use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use super::DayTotals;

const SNACK_MESSAGE: &str = "Consider adding a healthy snack to meet your calorie goals";
const REDUCE_MESSAGE: &str = "Try to reduce portion sizes or choose lower-calorie options";
const PROTEIN_MESSAGE: &str = "Add more protein-rich foods like chicken, fish, or legumes";
const ON_TRACK_MESSAGE: &str = "Keep up the great work! Your nutrition is on track.";

const TARGET_HIT_MESSAGE: &str = "Perfect! You hit your calorie target today. Excellent work! 🎉";
const MOTIVATION_POOL: [&str; 5] = [
    "Every meal is a step toward your goals!",
    "You're making great progress!",
    "Consistency is key - keep it up!",
    "Your dedication is paying off!",
    "Small steps lead to big changes!",
];

/// A user's daily nutrient targets. Any of them may be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetPreferences {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
}

/// Generated text fields of a daily report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportText {
    pub analysis: String,
    pub recommendations: String,
    pub motivation: String,
}

/// Builds analysis, recommendation and motivation text for one day.
///
/// `rng` is only consulted when the calorie target was not hit, to pick a
/// message from the motivation pool.
pub fn derive_report<R: Rng + ?Sized>(
    totals: &DayTotals,
    targets: Option<&TargetPreferences>,
    rng: &mut R,
) -> ReportText {
    ReportText {
        analysis: analysis(totals, targets),
        recommendations: recommendations(totals, targets),
        motivation: motivation(totals, targets, rng),
    }
}

// zero counts as unset
fn set_target(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

fn analysis(totals: &DayTotals, targets: Option<&TargetPreferences>) -> String {
    let calories = totals.total_calories;
    let protein = totals.total_protein;

    let mut text = format!("Today you consumed {calories:.0} calories");
    if let Some(target) = targets.and_then(|t| set_target(t.calories)) {
        let diff = calories - target;
        if diff > 0.0 {
            text.push_str(&format!(" ({diff:.0} over your target)"));
        } else if diff < 0.0 {
            text.push_str(&format!(" ({:.0} under your target)", diff.abs()));
        } else {
            text.push_str(" (right on target!)");
        }
    }

    text.push_str(&format!(" and {protein:.0}g of protein"));
    if let Some(target) = targets.and_then(|t| set_target(t.protein)) {
        let diff = protein - target;
        if diff > 0.0 {
            text.push_str(&format!(" ({diff:.0}g over target)"));
        } else if diff < 0.0 {
            text.push_str(&format!(" ({:.0}g under target)", diff.abs()));
        } else {
            text.push_str(" (target met!)");
        }
    }
    text.push('.');
    text
}

fn recommendations(totals: &DayTotals, targets: Option<&TargetPreferences>) -> String {
    let mut out: Vec<&str> = Vec::new();

    if let Some(t) = targets {
        let target_calories = t.calories.unwrap_or(0.0);
        let target_protein = t.protein.unwrap_or(0.0);

        if totals.total_calories < target_calories * 0.8 {
            out.push(SNACK_MESSAGE);
        } else if totals.total_calories > target_calories * 1.2 && target_calories > 0.0 {
            out.push(REDUCE_MESSAGE);
        }

        if totals.total_protein < target_protein * 0.8 {
            out.push(PROTEIN_MESSAGE);
        }
    }

    if out.is_empty() {
        out.push(ON_TRACK_MESSAGE);
    }
    out.join(" ")
}

fn motivation<R: Rng + ?Sized>(
    totals: &DayTotals,
    targets: Option<&TargetPreferences>,
    rng: &mut R,
) -> String {
    if let Some(target) = targets.and_then(|t| set_target(t.calories)) {
        if (totals.total_calories - target).abs() < target * 0.1 {
            return TARGET_HIT_MESSAGE.to_string();
        }
    }
    MOTIVATION_POOL
        .choose(rng)
        .copied()
        .unwrap_or(MOTIVATION_POOL[0])
        .to_string()
}
