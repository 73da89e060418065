use axum::{
    extract::{FromRef, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        tokens, AuthUser,
    },
    error::ApiError,
    mailer::{restore_email, verification_email},
    state::AppState,
    users::{
        dto::{
            AvatarResponse, DailyNormaRequest, DeleteAccountRequest, EditProfileRequest,
            EmailRequest, InfoResponse, LoginRequest, LoginResponse, MessageResponse, PublicUser,
            SignupRequest, SignupResponse, SignupUser, DEFAULT_DAILY_NORMA, EDIT_WITH_PASSWORD,
            GENDERS,
        },
        repo,
        repo::{NewUser, ProfilePatch},
    },
    validate::{normalize_email, Validate},
};

const WRONG_CREDENTIALS: &str = "Email or password is wrong";

/// Dispatch the verification email without making the response wait on the
/// mail provider.
fn send_verification(state: &AppState, email: String, token: String) {
    let mailer = state.mailer.clone();
    let base_url = state.config.base_url.clone();
    tokio::spawn(async move {
        let (subject, html) = verification_email(&base_url, &token);
        if let Err(e) = mailer.send(&email, &subject, &html).await {
            warn!(error = %e, %email, "verification email failed");
        }
    });
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    payload.email = normalize_email(&payload.email);
    payload.validate()?;

    if repo::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email is already in use".into()));
    }

    let hash = hash_password(&payload.password)?;
    let verification_token = tokens::verification_token();

    let user = repo::create(
        &state.db,
        NewUser {
            username: &payload.username,
            email: &payload.email,
            password_hash: &hash,
            gender: payload.gender.as_deref().unwrap_or(GENDERS[0]),
            daily_norma: payload.daily_norma.unwrap_or(DEFAULT_DAILY_NORMA),
            verification_token: &verification_token,
        },
    )
    .await?;

    send_verification(&state, user.email.clone(), verification_token);

    info!(user_id = %user.id, email = %user.email, "user signed up");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user: SignupUser {
                username: user.username,
                email: user.email,
                avatar_url: user.avatar_url,
            },
        }),
    ))
}

#[instrument(skip(state))]
pub async fn verify(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = repo::find_by_verification_token(&state.db, &token)
        .await?
        .ok_or(ApiError::NotFound)?;

    repo::mark_verified(&state.db, user.id).await?;

    info!(user_id = %user.id, "email verified");
    Ok(Json(MessageResponse {
        message: "Verification successful".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(mut payload): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.email = normalize_email(&payload.email);
    payload.validate()?;

    let user = repo::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(ApiError::NotFound)?;

    if user.verified {
        return Err(ApiError::BadRequest(
            "Verification has already been passed".into(),
        ));
    }

    let token = user
        .verification_token
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("unverified user without token")))?;
    send_verification(&state, user.email, token);

    Ok(Json(MessageResponse {
        message: "Verification email sent".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.email = normalize_email(&payload.email);
    payload.validate()?;

    // Unknown email, wrong password and unverified account all produce the
    // same response so the failing check is not observable.
    let user = repo::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(WRONG_CREDENTIALS.into()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::Unauthorized(WRONG_CREDENTIALS.into()));
    }

    if !user.verified {
        warn!(user_id = %user.id, "login attempt on unverified account");
        return Err(ApiError::Unauthorized(WRONG_CREDENTIALS.into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    repo::set_session_token(&state.db, user.id, Some(&token)).await?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip(user))]
pub async fn current(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}

#[instrument(skip(state, user))]
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError> {
    repo::set_session_token(&state.db, user.id, None).await?;
    info!(user_id = %user.id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

#[instrument(skip(state, user, mp))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut mp: Multipart,
) -> Result<Json<AvatarResponse>, ApiError> {
    let mut upload = None;
    while let Ok(Some(field)) = mp.next_field().await {
        if field.name() == Some("avatar") {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("invalid upload: {e}")))?;
            upload = Some((data, content_type));
            break;
        }
    }

    let (data, content_type) =
        upload.ok_or_else(|| ApiError::validation("avatar", "file field is required"))?;
    let ext = ext_from_mime(&content_type).ok_or_else(|| {
        ApiError::validation("avatar", "must be a jpeg, png or webp image")
    })?;

    // The stale asset is removed best-effort; a CDN-side failure must not
    // block the replacement.
    if let Some(old_key) = &user.avatar_key {
        if let Err(e) = state.storage.delete_object(old_key).await {
            warn!(error = %e, key = %old_key, "stale avatar delete failed");
        }
    }

    let key = format!("avatars/{}/{}.{}", user.id, Uuid::new_v4(), ext);
    state.storage.put_object(&key, data, &content_type).await?;
    let url = state.storage.object_url(&key);
    repo::set_avatar(&state.db, user.id, &url, &key).await?;

    info!(user_id = %user.id, %key, "avatar replaced");
    Ok(Json(AvatarResponse { avatar_url: url }))
}

#[instrument(skip(user))]
pub async fn info(AuthUser(user): AuthUser) -> Json<InfoResponse> {
    Json(InfoResponse {
        username: user.username,
        email: user.email,
        gender: user.gender,
        daily_norma: user.daily_norma,
        avatar_url: user.avatar_url,
        verify: user.verified,
    })
}

#[instrument(skip(state, user, payload))]
pub async fn edit_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<EditProfileRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    payload.validate()?;

    let new_hash = if payload.mode == EDIT_WITH_PASSWORD {
        // Both fields are guaranteed present by validation.
        let old = payload.old_password.as_deref().unwrap_or_default();
        if !verify_password(old, &user.password_hash)? {
            warn!(user_id = %user.id, "profile edit with wrong old password");
            return Err(ApiError::Unauthorized("Old password is wrong".into()));
        }
        Some(hash_password(payload.new_password.as_deref().unwrap_or_default())?)
    } else {
        None
    };

    let email = payload.email.as_deref().map(normalize_email);
    if let Some(new_email) = &email {
        if *new_email != user.email
            && repo::find_by_email(&state.db, new_email).await?.is_some()
        {
            return Err(ApiError::Conflict("Email is already in use".into()));
        }
    }

    let updated = repo::update_profile(
        &state.db,
        user.id,
        ProfilePatch {
            username: payload.username.as_deref(),
            email: email.as_deref(),
            gender: payload.gender.as_deref(),
            daily_norma: payload.daily_norma,
            password_hash: new_hash.as_deref(),
        },
    )
    .await?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(PublicUser::from(&updated)))
}

#[instrument(skip(state, user, payload))]
pub async fn update_daily_norma(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<DailyNormaRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    payload.validate()?;
    repo::set_daily_norma(&state.db, user.id, payload.daily_norma).await?;
    Ok(Json(json!({ "dailyNorma": payload.daily_norma })))
}

#[instrument(skip(state, payload))]
pub async fn restore_password(
    State(state): State<AppState>,
    Json(mut payload): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.email = normalize_email(&payload.email);
    payload.validate()?;

    let user = repo::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(ApiError::NotFound)?;

    let temp = tokens::temp_password();
    let hash = hash_password(&temp)?;
    repo::set_password_hash(&state.db, user.id, &hash).await?;

    let mailer = state.mailer.clone();
    let email = user.email.clone();
    tokio::spawn(async move {
        let (subject, html) = restore_email(&temp);
        if let Err(e) = mailer.send(&email, &subject, &html).await {
            warn!(error = %e, %email, "restore email failed");
        }
    });

    info!(user_id = %user.id, "password restored");
    Ok(Json(MessageResponse {
        message: "New password sent to email".into(),
    }))
}

#[instrument(skip(state, user, payload))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<DeleteAccountRequest>,
) -> Result<StatusCode, ApiError> {
    payload.validate()?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "account delete with wrong password");
        return Err(ApiError::Unauthorized("Password is wrong".into()));
    }

    if let Some(key) = &user.avatar_key {
        if let Err(e) = state.storage.delete_object(key).await {
            warn!(error = %e, %key, "avatar delete failed");
        }
    }

    repo::delete(&state.db, user.id).await?;
    info!(user_id = %user.id, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ext_from_mime_accepts_images_only() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("application/pdf"), None);
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn email_lookups_share_one_canonical_form() {
        // Signup stores the normalized address; resend/restore/login must
        // normalize the same way or a mixed-case client string misses the row.
        let stored = normalize_email(" User@Example.com ");
        assert_eq!(stored, "user@example.com");
        assert_eq!(normalize_email("User@Example.com"), stored);
        assert_eq!(normalize_email("user@example.com"), stored);
    }

    #[test]
    fn login_error_is_uniform() {
        // Wrong password and unverified account must be indistinguishable.
        let wrong = ApiError::Unauthorized(WRONG_CREDENTIALS.into());
        let unverified = ApiError::Unauthorized(WRONG_CREDENTIALS.into());
        assert_eq!(wrong.to_string(), unverified.to_string());
        assert_eq!(wrong.status(), unverified.status());
    }
}
