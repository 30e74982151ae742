use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateFoodRequest, ListQuery, SearchQuery},
    repo,
    repo_types::Food,
};
use crate::{
    auth::AuthUser,
    cache::{self, FOOD_TTL},
    state::AppState,
};

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_foods).post(create_food))
        .route("/foods/search", get(search_foods))
        .route("/foods/:id", get(get_food))
}

pub(crate) fn food_cache_key(id: Uuid) -> String {
    format!("food:id:{id}")
}

#[instrument(skip(state, body))]
pub async fn create_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateFoodRequest>,
) -> Result<(StatusCode, HeaderMap, Json<Food>), (StatusCode, String)> {
    if body.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name is required".into()));
    }
    if let Err(e) = body.profile().validate() {
        warn!(error = %e, "rejected food");
        return Err((StatusCode::BAD_REQUEST, e.to_string()));
    }

    let food = repo::insert(&state.db, &body).await.map_err(|e| {
        error!(error = %e, "create food failed");
        internal(e)
    })?;
    cache::set_json(state.cache.as_ref(), &food_cache_key(food.id), &food, FOOD_TTL).await;
    info!(food_id = %food.id, %user_id, "food created");

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/foods/{}", food.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(food)))
}

#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Food>>, (StatusCode, String)> {
    let foods = repo::list(&state.db, q.skip(), q.limit())
        .await
        .map_err(internal)?;
    Ok(Json(foods))
}

#[instrument(skip(state))]
pub async fn search_foods(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<Food>>, (StatusCode, String)> {
    let term = q.q.trim();
    if term.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "q must not be empty".into()));
    }
    let foods = repo::search(&state.db, term, q.limit())
        .await
        .map_err(internal)?;
    Ok(Json(foods))
}

/// Loads one food, preferring the cached record.
pub async fn load_food(state: &AppState, id: Uuid) -> anyhow::Result<Option<Food>> {
    let key = food_cache_key(id);
    if let Some(food) = cache::get_json::<Food>(state.cache.as_ref(), &key).await {
        return Ok(Some(food));
    }
    let food = repo::get(&state.db, id).await?;
    if let Some(f) = &food {
        cache::set_json(state.cache.as_ref(), &key, f, FOOD_TTL).await;
    }
    Ok(food)
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Food>, (StatusCode, String)> {
    match load_food(&state, id).await {
        Ok(Some(food)) => Ok(Json(food)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Food not found".into())),
        Err(e) => {
            error!(error = %e, %id, "get_food failed");
            Err(internal(e))
        }
    }
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
