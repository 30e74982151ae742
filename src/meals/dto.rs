use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::MealType;
use crate::{foods::repo_types::Food, nutrition::MealTotals};

#[derive(Debug, Clone, Deserialize)]
pub struct MealFoodItem {
    pub food_id: Uuid,
    pub quantity_g: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub meal_type: String,
    #[serde(with = "time::serde::rfc3339")]
    pub meal_date: OffsetDateTime,
    pub notes: Option<String>,
    #[serde(default)]
    pub foods: Vec<MealFoodItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealFoodResponse {
    pub id: Uuid,
    pub food_id: Uuid,
    pub quantity_g: f64,
    pub food: Food,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealResponse {
    pub id: Uuid,
    pub meal_type: MealType,
    #[serde(with = "time::serde::rfc3339")]
    pub meal_date: OffsetDateTime,
    pub notes: Option<String>,
    pub meal_foods: Vec<MealFoodResponse>,
    #[serde(flatten)]
    pub totals: MealTotals,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateRange {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
}
