use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::TargetPreferences;

#[derive(Debug, Clone, FromRow)]
pub struct PreferenceRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_calories: Option<f64>,
    pub target_protein: Option<f64>,
    pub target_carbs: Option<f64>,
    pub target_fats: Option<f64>,
    pub preferred_meal_times: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DietaryRestriction {
    pub id: Uuid,
    pub restriction_type: String,
    pub severity: String,
}

/// Preferences with their restrictions, as served and cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub id: Uuid,
    pub target_calories: Option<f64>,
    pub target_protein: Option<f64>,
    pub target_carbs: Option<f64>,
    pub target_fats: Option<f64>,
    pub preferred_meal_times: Option<String>,
    pub dietary_restrictions: Vec<DietaryRestriction>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Preferences {
    pub fn from_parts(row: PreferenceRow, dietary_restrictions: Vec<DietaryRestriction>) -> Self {
        Self {
            id: row.id,
            target_calories: row.target_calories,
            target_protein: row.target_protein,
            target_carbs: row.target_carbs,
            target_fats: row.target_fats,
            preferred_meal_times: row.preferred_meal_times,
            dietary_restrictions,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    pub fn targets(&self) -> TargetPreferences {
        TargetPreferences {
            calories: self.target_calories,
            protein: self.target_protein,
            carbs: self.target_carbs,
            fats: self.target_fats,
        }
    }

    pub fn restriction_names(&self) -> Vec<String> {
        self.dietary_restrictions
            .iter()
            .map(|r| r.restriction_type.clone())
            .collect()
    }
}
