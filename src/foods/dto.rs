use serde::Deserialize;

use crate::nutrition::FoodProfile;

#[derive(Debug, Deserialize)]
pub struct CreateFoodRequest {
    pub name: String,
    pub description: Option<String>,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fats_per_100g: f64,
    #[serde(default)]
    pub fiber_per_100g: f64,
    #[serde(default)]
    pub sugar_per_100g: f64,
    #[serde(default)]
    pub sodium_per_100g: f64,
}

impl CreateFoodRequest {
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

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(100).clamp(1, 100)
    }
    pub fn skip(&self) -> i64 {
        self.skip.max(0)
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
}

impl SearchQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 50)
    }
}
