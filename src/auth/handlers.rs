use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        repo::is_unique_violation,
        repo_types::{NewUser, User},
        services::{hash_password, is_valid_email, is_valid_username, verify_password, JwtKeys},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

fn issue_tokens(state: &AppState, user: &User) -> Result<AuthResponse, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    let refresh_token = keys.sign_refresh(user.id).map_err(|e| {
        error!(error = %e, "jwt sign refresh failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        token_type: "bearer",
        user: PublicUser {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
        },
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    if !is_valid_username(&payload.username) {
        warn!(username = %payload.username, "invalid username");
        return Err((StatusCode::BAD_REQUEST, "Invalid username".into()));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(_)) => {
            warn!(email = %payload.email, "email already registered");
            return Err((StatusCode::CONFLICT, "Email already registered".into()));
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    }

    match User::find_by_username(&state.db, &payload.username).await {
        Ok(Some(_)) => {
            warn!(username = %payload.username, "username already taken");
            return Err((StatusCode::CONFLICT, "Username already taken".into()));
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "find_by_username failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    }

    let hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "hash_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let new_user = NewUser {
        email: &payload.email,
        username: &payload.username,
        password_hash: &hash,
        full_name: payload.full_name.as_deref(),
        age: payload.age,
        gender: payload.gender.as_deref(),
        height_cm: payload.height_cm,
        weight_kg: payload.weight_kg,
    };
    let user = match User::create(&state.db, &new_user).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %payload.email, username = %payload.username, "registration raced a duplicate");
            return Err((StatusCode::CONFLICT, "Email or username already registered".into()));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let response = issue_tokens(&state, &user)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let username = payload.username.trim();
    if username.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Username is required".into()));
    }

    let user = match User::find_by_username(&state.db, username).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(username, "login unknown username");
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_username failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let ok = match verify_password(&payload.password, &user.password_hash) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "verify_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    if !ok {
        warn!(username, user_id = %user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    if !user.is_active {
        warn!(user_id = %user.id, "login on inactive account");
        return Err((StatusCode::FORBIDDEN, "Inactive user".into()));
    }

    let response = issue_tokens(&state, &user)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))?;

    let user = match User::find_by_id(&state.db, claims.sub).await {
        Ok(Some(u)) => u,
        Ok(None) => return Err((StatusCode::UNAUTHORIZED, "User not found".into())),
        Err(e) => {
            error!(error = %e, "find_by_id failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    Ok(Json(issue_tokens(&state, &user)?))
}
