use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, email, password_hash, gender, daily_norma, \
     avatar_url, avatar_key, token, verification_token, verified, created_at";

// Never serialized directly; responses go through the dto shapes.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub gender: String,
    pub daily_norma: i32,
    pub avatar_url: Option<String>,
    pub avatar_key: Option<String>,
    pub token: Option<String>,
    pub verification_token: Option<String>,
    pub verified: bool,
    pub created_at: OffsetDateTime,
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_verification_token(
    db: &PgPool,
    token: &str,
) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE verification_token = $1"
    ))
    .bind(token)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub gender: &'a str,
    pub daily_norma: i32,
    pub verification_token: &'a str,
}

pub async fn create(db: &PgPool, new: NewUser<'_>) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, email, password_hash, gender, daily_norma, verification_token)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(new.username)
    .bind(new.email)
    .bind(new.password_hash)
    .bind(new.gender)
    .bind(new.daily_norma)
    .bind(new.verification_token)
    .fetch_one(db)
    .await?;
    Ok(user)
}

/// Consume the verification token and flip the verified flag.
pub async fn mark_verified(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET verification_token = NULL, verified = TRUE WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn set_session_token(db: &PgPool, id: Uuid, token: Option<&str>) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET token = $2 WHERE id = $1")
        .bind(id)
        .bind(token)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn set_password_hash(db: &PgPool, id: Uuid, hash: &str) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(id)
        .bind(hash)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn set_avatar(db: &PgPool, id: Uuid, url: &str, key: &str) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET avatar_url = $2, avatar_key = $3 WHERE id = $1")
        .bind(id)
        .bind(url)
        .bind(key)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn set_daily_norma(db: &PgPool, id: Uuid, daily_norma: i32) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET daily_norma = $2 WHERE id = $1")
        .bind(id)
        .bind(daily_norma)
        .execute(db)
        .await?;
    Ok(())
}

pub struct ProfilePatch<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub daily_norma: Option<i32>,
    pub password_hash: Option<&'a str>,
}

/// Partial profile update; absent fields keep their stored value.
pub async fn update_profile(db: &PgPool, id: Uuid, patch: ProfilePatch<'_>) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                gender = COALESCE($4, gender),
                daily_norma = COALESCE($5, daily_norma),
                password_hash = COALESCE($6, password_hash)
          WHERE id = $1
      RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(patch.username)
    .bind(patch.email)
    .bind(patch.gender)
    .bind(patch.daily_norma)
    .bind(patch.password_hash)
    .fetch_one(db)
    .await?;
    Ok(user)
}

/// Records go with the user via `ON DELETE CASCADE`.
pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
