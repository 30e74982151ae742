use serde::Deserialize;

const SEVERITIES: [&str; 3] = ["strict", "moderate", "flexible"];

fn default_severity() -> String {
    "moderate".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestrictionRequest {
    pub restriction_type: String,
    #[serde(default = "default_severity")]
    pub severity: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferenceRequest {
    pub target_calories: Option<f64>,
    pub target_protein: Option<f64>,
    pub target_carbs: Option<f64>,
    pub target_fats: Option<f64>,
    pub preferred_meal_times: Option<String>,
    pub dietary_restrictions: Option<Vec<RestrictionRequest>>,
}

impl PreferenceRequest {
    /// Trims restriction fields and checks targets and severities.
    pub fn normalize(mut self) -> Result<Self, String> {
        for (name, value) in [
            ("target_calories", self.target_calories),
            ("target_protein", self.target_protein),
            ("target_carbs", self.target_carbs),
            ("target_fats", self.target_fats),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(format!("{name} must be a non-negative number"));
                }
            }
        }

        if let Some(restrictions) = self.dietary_restrictions.as_mut() {
            for r in restrictions.iter_mut() {
                r.restriction_type = r.restriction_type.trim().to_lowercase();
                r.severity = r.severity.trim().to_lowercase();
                if r.restriction_type.is_empty() {
                    return Err("restriction_type must not be empty".into());
                }
                if !SEVERITIES.contains(&r.severity.as_str()) {
                    return Err(format!("unknown severity '{}'", r.severity));
                }
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_defaults_to_moderate() {
        let body: PreferenceRequest = serde_json::from_str(
            r#"{"target_calories":2000,"dietary_restrictions":[{"restriction_type":" Vegan "}]}"#,
        )
        .unwrap();
        let body = body.normalize().unwrap();
        let r = &body.dietary_restrictions.unwrap()[0];
        assert_eq!(r.restriction_type, "vegan");
        assert_eq!(r.severity, "moderate");
    }

    #[test]
    fn negative_target_is_rejected() {
        let body = PreferenceRequest {
            target_protein: Some(-5.0),
            ..PreferenceRequest::default()
        };
        assert!(body.normalize().unwrap_err().contains("target_protein"));
    }

    #[test]
    fn unknown_severity_is_rejected() {
        let body = PreferenceRequest {
            dietary_restrictions: Some(vec![RestrictionRequest {
                restriction_type: "gluten-free".into(),
                severity: "extreme".into(),
            }]),
            ..PreferenceRequest::default()
        };
        assert!(body.normalize().is_err());
    }
}
