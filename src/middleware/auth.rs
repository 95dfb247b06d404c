use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{models::CurrentAdmin, services::auth_service::Claims, AppState};

pub const LOGIN_PATH: &str = "/admin";

fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    for part in raw.split(';') {
        let part = part.trim();
        let mut it = part.splitn(2, '=');
        let k = it.next()?.trim();
        let v = it.next()?.trim();
        if k == name {
            return Some(v.to_string());
        }
    }
    None
}

/// Decodes the session token, if any. Expired or tampered tokens yield None.
pub fn admin_from_headers(state: &AppState, headers: &HeaderMap) -> Option<CurrentAdmin> {
    let token = get_cookie(headers, &state.settings.jwt_cookie_name)?;
    if token.is_empty() {
        return None;
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.settings.jwt_secret.as_bytes()),
        &validation,
    )
    .ok()?;

    // a token minted for another admin identity is stale
    if data.claims.sub != state.settings.admin_email {
        return None;
    }

    Some(CurrentAdmin {
        email: data.claims.sub,
        session_id: data.claims.sid,
        expires_at: data.claims.exp as i64,
    })
}

pub async fn inject_current_admin(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(admin) = admin_from_headers(&state, req.headers()) {
        req.extensions_mut().insert(admin);
    }

    next.run(req).await
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn is_public_path(path: &str) -> bool {
    path == "/"
        || path == LOGIN_PATH
        || path == "/logout"
        || path == "/health"
        || path == "/favicon.ico"
        || path.starts_with("/static/")
}

pub async fn require_auth(
    State(_state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();

    if is_public_path(path) {
        return next.run(req).await;
    }

    // inject_current_admin runs first and leaves CurrentAdmin when the token is valid
    if req.extensions().get::<CurrentAdmin>().is_some() {
        return next.run(req).await;
    }

    tracing::debug!(path, "unauthenticated request redirected to login");

    if is_htmx(req.headers()) {
        let mut headers = HeaderMap::new();
        headers.insert("HX-Redirect", HeaderValue::from_static(LOGIN_PATH));
        return (StatusCode::OK, headers, Html("".to_string())).into_response();
    }

    Redirect::to(LOGIN_PATH).into_response()
}
