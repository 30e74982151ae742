use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    WeightLoss,
    WeightGain,
    Maintenance,
    MuscleGain,
    GeneralHealth,
}

impl GoalType {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalType::WeightLoss => "weight_loss",
            GoalType::WeightGain => "weight_gain",
            GoalType::Maintenance => "maintenance",
            GoalType::MuscleGain => "muscle_gain",
            GoalType::GeneralHealth => "general_health",
        }
    }
}

impl FromStr for GoalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weight_loss" => Ok(GoalType::WeightLoss),
            "weight_gain" => Ok(GoalType::WeightGain),
            "maintenance" => Ok(GoalType::Maintenance),
            "muscle_gain" => Ok(GoalType::MuscleGain),
            "general_health" => Ok(GoalType::GeneralHealth),
            other => Err(format!("unknown goal_type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub goal_type: String,
    pub target_weight_kg: Option<f64>,
    pub current_weight_kg: Option<f64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub target_date: Option<OffsetDateTime>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}
