use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{error, info, instrument, warn};

use super::{
    dto::CreateGoalRequest,
    repo,
    repo_types::{Goal, GoalType},
};
use crate::{auth::AuthUser, state::AppState};

pub fn goal_routes() -> Router<AppState> {
    Router::new()
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/active", get(active_goal))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "goal request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[instrument(skip(state, body))]
pub async fn create_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<Goal>), (StatusCode, String)> {
    let goal_type: GoalType = body.goal_type.parse().map_err(|msg: String| {
        warn!(%user_id, error = %msg, "rejected goal");
        (StatusCode::BAD_REQUEST, msg)
    })?;
    body.check_weights()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let goal = repo::insert(
        &state.db,
        user_id,
        goal_type,
        body.target_weight_kg,
        body.current_weight_kg,
        body.target_date,
    )
    .await
    .map_err(internal)?;
    info!(%user_id, goal_id = %goal.id, goal_type = goal_type.as_str(), "goal created");
    Ok((StatusCode::CREATED, Json(goal)))
}

#[instrument(skip(state))]
pub async fn list_goals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Goal>>, (StatusCode, String)> {
    let goals = repo::list_by_user(&state.db, user_id).await.map_err(internal)?;
    Ok(Json(goals))
}

#[instrument(skip(state))]
pub async fn active_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Goal>, (StatusCode, String)> {
    match repo::active_for_user(&state.db, user_id).await {
        Ok(Some(goal)) => Ok(Json(goal)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "No active goal found".into())),
        Err(e) => Err(internal(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn body(goal_type: &str, target: Option<f64>) -> CreateGoalRequest {
        CreateGoalRequest {
            goal_type: goal_type.into(),
            target_weight_kg: target,
            current_weight_kg: Some(82.0),
            target_date: None,
        }
    }

    #[tokio::test]
    async fn unknown_goal_type_is_bad_request() {
        let state = AppState::fake();
        let err = create_goal(State(state), AuthUser(Uuid::new_v4()), Json(body("shred", None)))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert!(err.1.contains("shred"));
    }

    #[tokio::test]
    async fn non_positive_weight_is_bad_request() {
        let state = AppState::fake();
        let err = create_goal(
            State(state),
            AuthUser(Uuid::new_v4()),
            Json(body("weight_loss", Some(0.0))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(err.1, "target_weight_kg must be positive");
    }

    #[test]
    fn goal_serializes_without_owner() {
        let goal = Goal {
            id: Uuid::nil(),
            user_id: Uuid::new_v4(),
            goal_type: "maintenance".into(),
            target_weight_kg: None,
            current_weight_kg: Some(70.0),
            target_date: None,
            is_active: true,
            created_at: time::OffsetDateTime::UNIX_EPOCH,
            updated_at: None,
        };
        let json = serde_json::to_value(&goal).unwrap();
        assert!(json.get("user_id").is_none());
        assert_eq!(json["is_active"], true);
        assert_eq!(json["target_date"], serde_json::Value::Null);
    }
}
