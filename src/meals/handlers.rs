use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{error, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateMealRequest, DateRange, MealResponse},
    services::{self, MealError},
};
use crate::{auth::AuthUser, state::AppState};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/:id", get(get_meal))
}

fn reject(e: MealError) -> (StatusCode, String) {
    match e {
        MealError::InvalidMealType(_) | MealError::Nutrition(_) | MealError::UnknownFood(_) => {
            warn!(error = %e, "meal rejected");
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        MealError::Internal(e) => {
            error!(error = %e, "meal request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateMealRequest>,
) -> Result<(StatusCode, HeaderMap, Json<MealResponse>), (StatusCode, String)> {
    let meal = services::create_meal(&state, user_id, body)
        .await
        .map_err(reject)?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/meals/{}", meal.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(meal)))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(range): Query<DateRange>,
) -> Result<Json<Vec<MealResponse>>, (StatusCode, String)> {
    let meals = services::list_meals(&state, user_id, range.start_date, range.end_date)
        .await
        .map_err(reject)?;
    Ok(Json(meals))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MealResponse>, (StatusCode, String)> {
    match services::get_meal(&state, user_id, id).await {
        Ok(Some(meal)) => Ok(Json(meal)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Meal not found".into())),
        Err(e) => Err(reject(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::dto::MealFoodItem;
    use time::OffsetDateTime;

    fn body(meal_type: &str, quantity_g: f64) -> CreateMealRequest {
        CreateMealRequest {
            meal_type: meal_type.into(),
            meal_date: OffsetDateTime::UNIX_EPOCH,
            notes: None,
            foods: vec![MealFoodItem {
                food_id: Uuid::new_v4(),
                quantity_g,
            }],
        }
    }

    #[tokio::test]
    async fn unknown_meal_type_is_bad_request() {
        let state = AppState::fake();
        let err = create_meal(State(state), AuthUser(Uuid::new_v4()), Json(body("brunch", 100.0)))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert!(err.1.contains("brunch"));
    }

    #[tokio::test]
    async fn negative_quantity_is_bad_request() {
        let state = AppState::fake();
        let err = create_meal(State(state), AuthUser(Uuid::new_v4()), Json(body("lunch", -1.0)))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert!(err.1.contains("invalid quantity"));
    }

    #[test]
    fn date_range_parses_rfc3339() {
        let range: DateRange =
            serde_json::from_str(r#"{"start_date":"2025-01-02T00:00:00Z"}"#).unwrap();
        assert!(range.start_date.is_some());
        assert!(range.end_date.is_none());
    }
}
