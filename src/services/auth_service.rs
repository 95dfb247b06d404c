use std::sync::LazyLock;

use axum_extra::extract::cookie::{Cookie, SameSite};
use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use mongodb::bson::oid::ObjectId;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{config::Settings, AppState};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex")
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    // admin email
    pub sub: String,
    // console session id
    pub sid: String,
    // expiry (unix timestamp seconds)
    pub exp: usize,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Exact match against the configured admin credentials. When a bcrypt hash
/// is configured the password is checked against it instead of the literal.
pub fn check_credentials(settings: &Settings, email: &str, password: &str) -> bool {
    if email.is_empty() || password.is_empty() || email != settings.admin_email {
        return false;
    }

    match settings.admin_password_hash.as_deref() {
        Some(hash) => verify(password, hash).unwrap_or(false),
        None => password == settings.admin_password,
    }
}

pub fn new_session_id() -> String {
    ObjectId::new().to_hex()
}

pub fn make_jwt_with_days(
    state: &AppState,
    email: &str,
    session_id: &str,
    days: i64,
) -> Result<String, String> {
    let exp = (Utc::now() + Duration::days(days)).timestamp() as usize;

    let claims = Claims {
        sub: email.to_string(),
        sid: session_id.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

pub fn auth_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(state.settings.jwt_cookie_name.clone(), token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    if state.settings.cookie_secure {
        cookie.set_secure(true);
    }
    cookie
}

pub fn clear_auth_cookie(state: &AppState) -> Cookie<'static> {
    let mut cookie = Cookie::new(state.settings.jwt_cookie_name.clone(), "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.make_removal();
    cookie
}
