// handlers/protected/account.rs - Profile and password management

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::database::models::Profile;
use crate::database::{profiles, DatabaseError, DatabaseManager};
use crate::error::ApiError;
use crate::handlers::public::auth::required;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::entitlement::{self, Entitlement};
use crate::services::profile;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: uuid::Uuid,
    pub email: Option<String>,
    pub profile: Option<Profile>,
    pub entitlement: Entitlement,
}

/// GET /api/me - Signed-in user's profile and entitlement
pub async fn me_get(Extension(user): Extension<CurrentUser>) -> ApiResult<MeResponse> {
    let pool = DatabaseManager::pool().await?;
    let (profile, entitlement) = futures::try_join!(
        profiles::find_by_id(&pool, user.id),
        entitlement::load(&pool, user.id)
    )?;

    Ok(ApiResponse::success(MeResponse {
        id: user.id,
        email: user.email,
        profile,
        entitlement,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub username: String,
    pub display_name: Option<String>,
}

/// PUT /api/profile - Update username (3+ characters, unique) and display name
pub async fn profile_put(
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<ProfileUpdate>,
) -> ApiResult<Profile> {
    let username = profile::validate_username(&body.username).map_err(|msg| ApiError::field_error("username", msg))?;
    let display_name = body.display_name.as_deref().map(str::trim).filter(|n| !n.is_empty());

    let pool = DatabaseManager::pool().await?;
    let holder = profiles::find_by_username(&pool, &username).await?.map(|p| p.id);
    if !profile::username_available(holder, user.id) {
        return Err(ApiError::conflict("That username is already taken"));
    }

    // A concurrent claim still surfaces as a unique violation
    match profiles::update(&pool, user.id, &username, display_name).await {
        Ok(profile) => Ok(ApiResponse::success(profile)),
        Err(e) if e.is_unique_violation_on("profiles_username_key") => {
            Err(ApiError::conflict("That username is already taken"))
        }
        Err(DatabaseError::NotFound(_)) => Err(ApiError::not_found("Profile not found")),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// POST /api/auth/reset-password - Set a new password for the signed-in user
pub async fn reset_password_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<ResetPasswordRequest>,
) -> ApiResult<Value> {
    let password = required(body.password.as_deref(), "password")?;
    let confirm = required(body.confirm_password.as_deref(), "confirm_password")?;
    if password != confirm {
        return Err(ApiError::field_error("confirm_password", "Passwords do not match"));
    }

    state.auth.update_password(&user.access_token, &password).await?;
    Ok(ApiResponse::success(json!({ "message": "Password updated" })))
}
