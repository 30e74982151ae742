use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DailyReport {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub report_date: OffsetDateTime,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fats: f64,
    pub total_fiber: f64,
    pub total_sugar: f64,
    pub total_sodium: f64,
    pub analysis: String,
    pub recommendations: String,
    pub motivation_message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}
