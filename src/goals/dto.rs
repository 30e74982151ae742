use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGoalRequest {
    pub goal_type: String,
    pub target_weight_kg: Option<f64>,
    pub current_weight_kg: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub target_date: Option<OffsetDateTime>,
}

impl CreateGoalRequest {
    pub fn check_weights(&self) -> Result<(), String> {
        for (name, value) in [
            ("target_weight_kg", self.target_weight_kg),
            ("current_weight_kg", self.current_weight_kg),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(format!("{name} must be positive"));
                }
            }
        }
        Ok(())
    }
}
