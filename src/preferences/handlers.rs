use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{dto::PreferenceRequest, repo, repo_types::Preferences};
use crate::{
    auth::AuthUser,
    cache::{self, PREFERENCES_TTL},
    state::AppState,
};

pub fn preference_routes() -> Router<AppState> {
    Router::new().route(
        "/preferences",
        get(get_preferences).post(upsert_preferences).put(upsert_preferences),
    )
}

pub(crate) fn preferences_cache_key(user_id: Uuid) -> String {
    format!("preferences:user:{user_id}")
}

/// Loads a user's preferences with restrictions, serving the cached record when present.
pub async fn load_preferences(state: &AppState, user_id: Uuid) -> anyhow::Result<Option<Preferences>> {
    let key = preferences_cache_key(user_id);
    if let Some(prefs) = cache::get_json::<Preferences>(state.cache.as_ref(), &key).await {
        return Ok(Some(prefs));
    }
    let Some(row) = repo::find_by_user(&state.db, user_id).await? else {
        return Ok(None);
    };
    let restrictions = repo::restrictions(&state.db, row.id).await?;
    let prefs = Preferences::from_parts(row, restrictions);
    cache::set_json(state.cache.as_ref(), &key, &prefs, PREFERENCES_TTL).await;
    Ok(Some(prefs))
}

async fn save_preferences(
    state: &AppState,
    user_id: Uuid,
    body: &PreferenceRequest,
) -> anyhow::Result<Preferences> {
    let mut tx = state.db.begin().await?;
    let row = repo::upsert_tx(&mut tx, user_id, body).await?;
    if let Some(restrictions) = body.dietary_restrictions.as_deref() {
        repo::replace_restrictions_tx(&mut tx, row.id, restrictions).await?;
    }
    tx.commit().await?;

    cache::invalidate(state.cache.as_ref(), &preferences_cache_key(user_id)).await;
    let restrictions = repo::restrictions(&state.db, row.id).await?;
    Ok(Preferences::from_parts(row, restrictions))
}

#[instrument(skip(state, body))]
pub async fn upsert_preferences(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<PreferenceRequest>,
) -> Result<Json<Preferences>, (StatusCode, String)> {
    let body = body.normalize().map_err(|msg| {
        warn!(%user_id, error = %msg, "rejected preferences");
        (StatusCode::BAD_REQUEST, msg)
    })?;

    let prefs = save_preferences(&state, user_id, &body).await.map_err(|e| {
        error!(error = %e, %user_id, "save preferences failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    info!(%user_id, restrictions = prefs.dietary_restrictions.len(), "preferences saved");
    Ok(Json(prefs))
}

#[instrument(skip(state))]
pub async fn get_preferences(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Preferences>, (StatusCode, String)> {
    match load_preferences(&state, user_id).await {
        Ok(Some(prefs)) => Ok(Json(prefs)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Preferences not found".into())),
        Err(e) => {
            error!(error = %e, %user_id, "load preferences failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
