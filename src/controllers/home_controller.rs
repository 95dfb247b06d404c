use axum::{
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect},
};
use serde_json::json;

use crate::{auth::LOGIN_PATH, models::CurrentAdmin, render, AppState};

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Entry point: signed-in admins go to the console, everyone else to login.
pub async fn home(admin: Option<Extension<CurrentAdmin>>) -> impl IntoResponse {
    match admin {
        Some(_) => Redirect::to("/admin/dashboard"),
        None => Redirect::to(LOGIN_PATH),
    }
}

pub async fn not_found(
    State(state): State<AppState>,
    headers: HeaderMap,
    admin: Option<Extension<CurrentAdmin>>,
) -> impl IntoResponse {
    let body = match state.hbs.render("pages/not_found", &json!({})) {
        Ok(s) => s,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("template error: {e}")))
                .into_response()
        }
    };

    if is_htmx(&headers) {
        return (StatusCode::NOT_FOUND, Html(body)).into_response();
    }

    let admin_ref = admin.as_ref().map(|Extension(a)| a);

    match render::render_full(&state, "404", body, admin_ref) {
        Ok(page) => (StatusCode::NOT_FOUND, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Html("ok".to_string()))
}

pub async fn health_db(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(_) => (StatusCode::OK, Html(format!("{}: ok", state.store.name()))).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("{} error: {}", state.store.name(), e)),
        )
            .into_response(),
    }
}
