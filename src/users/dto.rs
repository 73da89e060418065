use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::users::repo::User;
use crate::validate::{check_email, check_password, check_range, Validate};

pub const GENDERS: [&str; 2] = ["woman", "man"];
pub const DEFAULT_DAILY_NORMA: i32 = 1500;
pub const MAX_DAILY_NORMA: i64 = 15000;

fn check_gender(gender: &str) -> Result<(), ApiError> {
    if GENDERS.contains(&gender) {
        Ok(())
    } else {
        Err(ApiError::validation("gender", "must be one of: woman, man"))
    }
}

fn check_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::validation("username", "cannot be empty"));
    }
    if username.chars().count() > 32 {
        return Err(ApiError::validation(
            "username",
            "must be at most 32 characters",
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub gender: Option<String>,
    #[serde(rename = "dailyNorma")]
    pub daily_norma: Option<i32>,
}

impl Validate for SignupRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_username(&self.username)?;
        check_email("email", &self.email)?;
        check_password("password", &self.password)?;
        if let Some(gender) = &self.gender {
            check_gender(gender)?;
        }
        if let Some(norma) = self.daily_norma {
            check_range("dailyNorma", norma as i64, 1, MAX_DAILY_NORMA)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

impl Validate for EmailRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_email("email", &self.email)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_email("email", &self.email)?;
        check_password("password", &self.password)
    }
}

/// Discriminator for profile edit: selects whether the password pair is
/// required or must be absent.
pub const EDIT_WITH_PASSWORD: &str = "withPassword";
pub const EDIT_WITHOUT_PASSWORD: &str = "withoutPassword";

#[derive(Debug, Deserialize)]
pub struct EditProfileRequest {
    pub mode: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    #[serde(rename = "dailyNorma")]
    pub daily_norma: Option<i32>,
    #[serde(rename = "oldPassword")]
    pub old_password: Option<String>,
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
}

impl Validate for EditProfileRequest {
    fn validate(&self) -> Result<(), ApiError> {
        match self.mode.as_str() {
            EDIT_WITHOUT_PASSWORD => {
                if self.old_password.is_some() {
                    return Err(ApiError::validation(
                        "oldPassword",
                        "must be absent when mode is withoutPassword",
                    ));
                }
                if self.new_password.is_some() {
                    return Err(ApiError::validation(
                        "newPassword",
                        "must be absent when mode is withoutPassword",
                    ));
                }
            }
            EDIT_WITH_PASSWORD => {
                let old = self
                    .old_password
                    .as_deref()
                    .ok_or_else(|| ApiError::validation("oldPassword", "is required"))?;
                if old.is_empty() {
                    return Err(ApiError::validation("oldPassword", "cannot be empty"));
                }
                let new = self
                    .new_password
                    .as_deref()
                    .ok_or_else(|| ApiError::validation("newPassword", "is required"))?;
                check_password("newPassword", new)?;
            }
            _ => {
                return Err(ApiError::validation(
                    "mode",
                    "must be one of: withPassword, withoutPassword",
                ))
            }
        }
        if let Some(username) = &self.username {
            check_username(username)?;
        }
        if let Some(email) = &self.email {
            check_email("email", email)?;
        }
        if let Some(gender) = &self.gender {
            check_gender(gender)?;
        }
        if let Some(norma) = self.daily_norma {
            check_range("dailyNorma", norma as i64, 1, MAX_DAILY_NORMA)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct DailyNormaRequest {
    #[serde(rename = "dailyNorma")]
    pub daily_norma: i32,
}

impl Validate for DailyNormaRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_range("dailyNorma", self.daily_norma as i64, 1, MAX_DAILY_NORMA)
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    pub password: String,
}

impl Validate for DeleteAccountRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_password("password", &self.password)
    }
}

/// Public part of a user returned to its owner.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub username: String,
    pub email: String,
    pub gender: String,
    #[serde(rename = "dailyNorma")]
    pub daily_norma: i32,
    #[serde(rename = "avatarURL")]
    pub avatar_url: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            username: u.username.clone(),
            email: u.email.clone(),
            gender: u.gender.clone(),
            daily_norma: u.daily_norma,
            avatar_url: u.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignupUser {
    pub username: String,
    pub email: String,
    #[serde(rename = "avatarURL")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user: SignupUser,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    #[serde(rename = "avatarURL")]
    pub avatar_url: String,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub username: String,
    pub email: String,
    pub gender: String,
    #[serde(rename = "dailyNorma")]
    pub daily_norma: i32,
    #[serde(rename = "avatarURL")]
    pub avatar_url: Option<String>,
    pub verify: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit_request(mode: &str) -> EditProfileRequest {
        EditProfileRequest {
            mode: mode.into(),
            username: None,
            email: None,
            gender: None,
            daily_norma: None,
            old_password: None,
            new_password: None,
        }
    }

    #[test]
    fn signup_accepts_valid_payload() {
        let req = SignupRequest {
            username: "hydrated".into(),
            email: "user@example.com".into(),
            password: "longenough".into(),
            gender: Some("man".into()),
            daily_norma: Some(2000),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn signup_rejects_bad_gender() {
        let req = SignupRequest {
            username: "hydrated".into(),
            email: "user@example.com".into(),
            password: "longenough".into(),
            gender: Some("other".into()),
            daily_norma: None,
        };
        let err = req.validate().unwrap_err();
        assert!(err.to_string().starts_with("gender"));
    }

    #[test]
    fn edit_without_password_forbids_password_fields() {
        let mut req = edit_request(EDIT_WITHOUT_PASSWORD);
        req.old_password = Some("whatever1".into());
        let err = req.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "oldPassword must be absent when mode is withoutPassword"
        );

        let mut req = edit_request(EDIT_WITHOUT_PASSWORD);
        req.new_password = Some("whatever1".into());
        assert!(req.validate().is_err());
    }

    #[test]
    fn edit_with_password_requires_both() {
        let mut req = edit_request(EDIT_WITH_PASSWORD);
        req.old_password = Some("oldsecret".into());
        let err = req.validate().unwrap_err();
        assert_eq!(err.to_string(), "newPassword is required");

        req.new_password = Some("newsecret".into());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn edit_rejects_unknown_mode() {
        let req = edit_request("maybePassword");
        let err = req.validate().unwrap_err();
        assert!(err.to_string().starts_with("mode"));
    }

    #[test]
    fn edit_without_password_allows_profile_fields() {
        let mut req = edit_request(EDIT_WITHOUT_PASSWORD);
        req.username = Some("newname".into());
        req.daily_norma = Some(1800);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn daily_norma_bounds() {
        assert!(DailyNormaRequest { daily_norma: 1500 }.validate().is_ok());
        assert!(DailyNormaRequest { daily_norma: 0 }.validate().is_err());
        assert!(DailyNormaRequest { daily_norma: 15001 }.validate().is_err());
    }

    #[test]
    fn public_user_serializes_camel_case() {
        let user = PublicUser {
            username: "hydrated".into(),
            email: "user@example.com".into(),
            gender: "woman".into(),
            daily_norma: 1500,
            avatar_url: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"dailyNorma\":1500"));
        assert!(json.contains("\"avatarURL\":null"));
    }
}
