//! Nutrition arithmetic and daily report text.
//!
//! Pure functions only: callers resolve foods and preferences from storage
//! and hand fully-populated values in.

mod aggregate;
mod report;

pub use aggregate::{aggregate_day, aggregate_meal};
pub use report::{derive_report, ReportText, TargetPreferences};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Nutrient content of a catalog food, per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodProfile {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sugar: f64,
    #[serde(default)]
    pub sodium: f64,
}

impl FoodProfile {
    fn nutrients(&self) -> [(&'static str, f64); 7] {
        [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fats", self.fats),
            ("fiber", self.fiber),
            ("sugar", self.sugar),
            ("sodium", self.sodium),
        ]
    }

    /// Rejects negative or non-finite nutrient values.
    pub fn validate(&self) -> Result<(), NutritionError> {
        for (nutrient, value) in self.nutrients() {
            if !value.is_finite() || value < 0.0 {
                return Err(NutritionError::InvalidProfile {
                    food: self.name.clone(),
                    nutrient,
                });
            }
        }
        Ok(())
    }
}

/// One food eaten in a given quantity.
#[derive(Debug, Clone, Copy)]
pub struct MealLine<'a> {
    pub profile: &'a FoodProfile,
    pub quantity_g: f64,
}

impl<'a> MealLine<'a> {
    pub fn new(profile: &'a FoodProfile, quantity_g: f64) -> Self {
        Self { profile, quantity_g }
    }
}

/// Meal-level totals: the four primary nutrients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MealTotals {
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fats: f64,
}

/// Day-level totals: all seven tracked nutrients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DayTotals {
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fats: f64,
    pub total_fiber: f64,
    pub total_sugar: f64,
    pub total_sodium: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NutritionError {
    #[error("invalid quantity {quantity_g} g for food '{food}'")]
    InvalidQuantity { food: String, quantity_g: f64 },
    #[error("invalid {nutrient} value on food '{food}'")]
    InvalidProfile { food: String, nutrient: &'static str },
}
