use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        repo_types::{User, UserProfile},
        AuthUser,
    },
    cache::{self, USER_TTL},
    state::AppState,
};

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me))
}

pub(crate) fn user_cache_key(user_id: Uuid) -> String {
    format!("user:id:{user_id}")
}

/// Loads a profile, serving the cached record when present.
pub async fn load_profile(state: &AppState, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
    let key = user_cache_key(user_id);
    if let Some(profile) = cache::get_json::<UserProfile>(state.cache.as_ref(), &key).await {
        return Ok(Some(profile));
    }
    let Some(user) = User::find_by_id(&state.db, user_id).await? else {
        return Ok(None);
    };
    let profile = UserProfile::from(user);
    cache::set_json(state.cache.as_ref(), &key, &profile, USER_TTL).await;
    Ok(Some(profile))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserProfile>, (StatusCode, String)> {
    match load_profile(&state, user_id).await {
        Ok(Some(profile)) => Ok(Json(profile)),
        Ok(None) => {
            error!(user_id = %user_id, "user not found");
            Err((StatusCode::UNAUTHORIZED, "User not found".into()))
        }
        Err(e) => {
            error!(error = %e, user_id = %user_id, "load profile failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn profile(id: Uuid) -> UserProfile {
        UserProfile {
            id,
            email: "demo@nutribite.com".into(),
            username: "demo_user".into(),
            full_name: Some("Demo User".into()),
            age: Some(30),
            gender: None,
            height_cm: Some(175),
            weight_kg: Some(70),
            is_active: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn cached_profile_is_served_without_db() {
        let state = AppState::fake();
        let id = Uuid::new_v4();
        cache::set_json(state.cache.as_ref(), &user_cache_key(id), &profile(id), USER_TTL).await;

        let Json(got) = get_me(State(state), AuthUser(id)).await.expect("cached");
        assert_eq!(got, profile(id));
    }

    #[test]
    fn profile_serializes_rfc3339_and_hides_nothing_secret() {
        let json = serde_json::to_value(profile(Uuid::nil())).unwrap();
        assert_eq!(json["created_at"], "1970-01-01T00:00:00Z");
        assert!(json.get("password_hash").is_none());
    }
}
