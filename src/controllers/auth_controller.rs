use axum::{
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::{models::CurrentAdmin, render, services::auth_service, AppState};

const DASHBOARD_PATH: &str = "/admin/dashboard";

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn htmx_redirect(path: &'static str) -> Response {
    (StatusCode::OK, [("HX-Redirect", path)], Html("".to_string())).into_response()
}

fn render_login(state: &AppState, headers: &HeaderMap, ctx: serde_json::Value) -> Response {
    let body = match state.hbs.render("pages/login", &ctx) {
        Ok(s) => s,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("template error: {e}")),
            )
                .into_response()
        }
    };

    if is_htmx(headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    match render::render_full(state, "Admin Login", body, None) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

// ---------------- LOGIN ----------------

pub async fn get_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    admin: Option<Extension<CurrentAdmin>>,
) -> Response {
    if admin.is_some() {
        if is_htmx(&headers) {
            return htmx_redirect(DASHBOARD_PATH);
        }
        return (StatusCode::SEE_OTHER, [("Location", DASHBOARD_PATH)]).into_response();
    }

    render_login(&state, &headers, json!({}))
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn post_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    admin: Option<Extension<CurrentAdmin>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let mut errors = serde_json::Map::new();

    if !form.email.is_empty() && !auth_service::is_valid_email(&form.email) {
        errors.insert("email".into(), json!("Invalid email."));
    } else if !auth_service::check_credentials(&state.settings, &form.email, &form.password) {
        tracing::info!("admin login rejected");
        errors.insert("_form".into(), json!("Invalid email or password"));
    }

    if !errors.is_empty() {
        // the password is never echoed back
        return render_login(
            &state,
            &headers,
            json!({
                "values": { "email": form.email },
                "errors": errors
            }),
        );
    }

    let session_id = auth_service::new_session_id();
    let token = match auth_service::make_jwt_with_days(
        &state,
        &form.email,
        &session_id,
        state.settings.session_days,
    ) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "could not sign session token");
            errors.insert("_form".into(), json!(format!("Auth error: {e}")));
            return render_login(
                &state,
                &headers,
                json!({ "values": { "email": form.email }, "errors": errors }),
            );
        }
    };

    // signing in again from the same browser replaces the old session
    if let Some(Extension(previous)) = admin {
        state.sessions.close(&previous.session_id).await;
    }

    tracing::info!(session_id = %session_id, "admin signed in");
    let jar = jar.add(auth_service::auth_cookie(&state, token));

    if is_htmx(&headers) {
        return (jar, htmx_redirect(DASHBOARD_PATH)).into_response();
    }

    (
        jar,
        (StatusCode::SEE_OTHER, [("Location", DASHBOARD_PATH)], Html("".to_string())),
    )
        .into_response()
}

// ---------------- LOGOUT ----------------

pub async fn logout(
    State(state): State<AppState>,
    admin: Option<Extension<CurrentAdmin>>,
    jar: CookieJar,
) -> impl IntoResponse {
    if let Some(Extension(a)) = admin {
        state.sessions.close(&a.session_id).await;
        tracing::info!(session_id = %a.session_id, "admin signed out");
    }

    let jar = jar.add(auth_service::clear_auth_cookie(&state));
    (jar, (StatusCode::SEE_OTHER, [("Location", "/")]))
}
