use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use super::rules::{self, Recommendation, MAX_CALORIES_PER_100G, MIN_PROTEIN_PER_100G};
use crate::{auth::AuthUser, foods::repo as foods_repo, preferences::load_preferences, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    pub target_calories: Option<f64>,
    pub dietary_restrictions: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
}

pub fn recommender_routes() -> Router<AppState> {
    Router::new().route("/recommender/recommendations", get(recommendations))
}

/// Explicit restrictions win; otherwise the user's stored ones apply.
async fn resolve_restrictions(
    state: &AppState,
    user_id: Uuid,
    raw: Option<&str>,
) -> anyhow::Result<Vec<String>> {
    if let Some(raw) = raw {
        let parsed = rules::parse_restrictions(raw);
        if !parsed.is_empty() {
            return Ok(parsed);
        }
    }
    Ok(load_preferences(state, user_id)
        .await?
        .map(|p| p.restriction_names())
        .unwrap_or_default())
}

pub async fn recommend(
    state: &AppState,
    user_id: Uuid,
    target_calories: Option<f64>,
    raw_restrictions: Option<&str>,
) -> anyhow::Result<Vec<Recommendation>> {
    if state.config.openai_api_key.is_some() {
        info!("model-backed ranking is not wired; using rule-based picks");
    }
    let restrictions = resolve_restrictions(state, user_id, raw_restrictions).await?;
    debug!(%user_id, ?restrictions, ?target_calories, "recommending");

    let candidates =
        foods_repo::lean_protein_candidates(&state.db, MIN_PROTEIN_PER_100G, MAX_CALORIES_PER_100G)
            .await?;
    Ok(rules::lean_protein_picks(candidates, &restrictions))
}

#[instrument(skip(state))]
pub async fn recommendations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<RecommendationQuery>,
) -> Result<Json<RecommendationsResponse>, (StatusCode, String)> {
    if let Some(target) = q.target_calories {
        if !target.is_finite() || target < 0.0 {
            return Err((
                StatusCode::BAD_REQUEST,
                "target_calories must be a non-negative number".into(),
            ));
        }
    }

    let recommendations = recommend(
        &state,
        user_id,
        q.target_calories,
        q.dietary_restrictions.as_deref(),
    )
    .await
    .map_err(|e| {
        error!(error = %e, %user_id, "recommendations failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(RecommendationsResponse { recommendations }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn negative_target_is_bad_request() {
        let state = AppState::fake();
        let q = RecommendationQuery {
            target_calories: Some(-10.0),
            dietary_restrictions: None,
        };
        let err = recommendations(State(state), AuthUser(Uuid::new_v4()), Query(q))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn explicit_restrictions_skip_stored_preferences() {
        let state = AppState::fake();
        let got = resolve_restrictions(&state, Uuid::new_v4(), Some("Vegan"))
            .await
            .unwrap();
        assert_eq!(got, vec!["vegan".to_string()]);
    }

    #[test]
    fn response_shape() {
        let body = RecommendationsResponse {
            recommendations: vec![Recommendation {
                id: Uuid::nil(),
                name: "Tempeh".into(),
                calories_per_100g: 192.0,
                protein_per_100g: 20.0,
                reason: rules::LEAN_PROTEIN_REASON,
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["recommendations"][0]["name"], "Tempeh");
        assert_eq!(json["recommendations"][0]["reason"], "High protein, moderate calories");
    }
}
