use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::FoodProfile;

/// Catalog food, nutrients per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fats_per_100g: f64,
    pub fiber_per_100g: f64,
    pub sugar_per_100g: f64,
    pub sodium_per_100g: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Food {
    pub fn profile(&self) -> FoodProfile {
        FoodProfile {
            name: self.name.clone(),
            calories: self.calories_per_100g,
            protein: self.protein_per_100g,
            carbs: self.carbs_per_100g,
            fats: self.fats_per_100g,
            fiber: self.fiber_per_100g,
            sugar: self.sugar_per_100g,
            sodium: self.sodium_per_100g,
        }
    }
}
