use axum::{
    extract::{Extension, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::LOGIN_PATH,
    models::{CurrentAdmin, OrderStatus, StatusFilter},
    render,
    services::console_service::{self, OrderConsole},
    AppState,
};

const DASHBOARD_PATH: &str = "/admin/dashboard";
const CLOSED_MODAL: &str = r#"<div id="modal" hx-swap-oob="true"></div>"#;

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn unauthorized_snippet() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Html(r#"<div class="text-danger">Unauthorized</div>"#.to_string()),
    )
        .into_response()
}

// The console lives in memory; after a restart the page has to be mounted again.
fn console_missing(headers: &HeaderMap) -> Response {
    if is_htmx(headers) {
        return (StatusCode::OK, [("HX-Redirect", DASHBOARD_PATH)], Html("".to_string()))
            .into_response();
    }
    Redirect::to(DASHBOARD_PATH).into_response()
}

fn template_error(e: impl std::fmt::Display) -> Response {
    tracing::error!(error = %e, "template render failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(format!("template error: {e}")),
    )
        .into_response()
}

fn list_response(state: &AppState, console: &OrderConsole, extra: &[String]) -> Response {
    match render::render_order_list(state, console) {
        Ok(mut html) => {
            for part in extra {
                html.push_str(part);
            }
            (StatusCode::OK, Html(html)).into_response()
        }
        Err(e) => template_error(e),
    }
}

// GET /admin/dashboard (mount: fetches every order once)
pub async fn get_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    admin: Option<Extension<CurrentAdmin>>,
) -> Response {
    let Some(Extension(admin)) = admin else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    let console = console_service::load_console(state.store.as_ref()).await;
    state
        .sessions
        .open(&admin.session_id, admin.expires_at, console.clone())
        .await;

    let order_list = match render::render_order_list(&state, &console) {
        Ok(s) => s,
        Err(e) => return template_error(e),
    };

    let body = match state
        .hbs
        .render("pages/dashboard", &json!({ "order_list": order_list }))
    {
        Ok(s) => s,
        Err(e) => return template_error(e),
    };

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    match render::render_full(&state, "Admin Dashboard", body, Some(&admin)) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

#[derive(Deserialize)]
pub struct FilterQuery {
    pub status: Option<String>,
}

// GET /admin/orders?status=Shipped (HTMX partial)
pub async fn get_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    admin: Option<Extension<CurrentAdmin>>,
    Query(q): Query<FilterQuery>,
) -> Response {
    let Some(Extension(admin)) = admin else {
        return unauthorized_snippet();
    };

    let filter = match q.status.as_deref() {
        None => StatusFilter::All,
        Some(raw) => match raw.parse::<StatusFilter>() {
            Ok(f) => f,
            Err(e) => return (StatusCode::BAD_REQUEST, Html(e)).into_response(),
        },
    };

    let console = state
        .sessions
        .update(&admin.session_id, |c| {
            c.set_filter(filter);
            c.clone()
        })
        .await;

    match console {
        Some(c) => list_response(&state, &c, &[]),
        None => console_missing(&headers),
    }
}

// POST /admin/orders/:id/toggle (HTMX partial)
pub async fn post_toggle(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    admin: Option<Extension<CurrentAdmin>>,
) -> Response {
    let Some(Extension(admin)) = admin else {
        return unauthorized_snippet();
    };

    let console = state
        .sessions
        .update(&admin.session_id, |c| {
            c.toggle(&id);
            c.clone()
        })
        .await;

    match console {
        Some(c) => list_response(&state, &c, &[]),
        None => console_missing(&headers),
    }
}

#[derive(Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub status: String,
}

// POST /admin/orders/:id/status (HTMX partial + toast)
pub async fn post_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    admin: Option<Extension<CurrentAdmin>>,
    Form(form): Form<StatusForm>,
) -> Response {
    let Some(Extension(admin)) = admin else {
        return unauthorized_snippet();
    };

    let toast = match form.status.parse::<OrderStatus>() {
        Ok(status) => {
            console_service::change_status(
                state.store.as_ref(),
                &state.sessions,
                &admin.session_id,
                &id,
                status,
            )
            .await
        }
        Err(_) => console_service::invalid_status_toast(),
    };

    let toast_html = match render::render_toast(&state, &toast) {
        Ok(html) => html,
        Err(e) => return template_error(e),
    };

    match state.sessions.snapshot(&admin.session_id).await {
        Some(c) => list_response(&state, &c, &[toast_html]),
        None => console_missing(&headers),
    }
}

// GET /admin/orders/:id/delete (confirmation prompt)
pub async fn get_delete_confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    admin: Option<Extension<CurrentAdmin>>,
) -> Response {
    let Some(Extension(admin)) = admin else {
        return unauthorized_snippet();
    };

    let Some(console) = state.sessions.snapshot(&admin.session_id).await else {
        return console_missing(&headers);
    };

    let Some(order) = console.orders().iter().find(|o| o.id == id) else {
        return (StatusCode::NOT_FOUND, Html("Not found".to_string())).into_response();
    };

    match state.hbs.render(
        "partials/delete_confirm",
        &json!({ "id": order.id, "order_id": order.order_id }),
    ) {
        Ok(html) => (StatusCode::OK, Html(html)).into_response(),
        Err(e) => template_error(e),
    }
}

// GET /admin/modal/close (cancel)
pub async fn get_close_modal() -> impl IntoResponse {
    (StatusCode::OK, Html("".to_string()))
}

#[derive(Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub confirm: Option<String>,
}

// POST /admin/orders/:id/delete (confirmed delete)
pub async fn post_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    admin: Option<Extension<CurrentAdmin>>,
    Form(form): Form<DeleteForm>,
) -> Response {
    let Some(Extension(admin)) = admin else {
        return unauthorized_snippet();
    };

    let confirmed = form.confirm.as_deref() == Some("true");

    let mut extra = vec![CLOSED_MODAL.to_string()];
    if confirmed {
        let toast = console_service::delete_order(
            state.store.as_ref(),
            &state.sessions,
            &admin.session_id,
            &id,
        )
        .await;
        match render::render_toast(&state, &toast) {
            Ok(html) => extra.push(html),
            Err(e) => return template_error(e),
        }
    } else {
        tracing::debug!(order_id = %id, "delete without confirmation ignored");
    }

    match state.sessions.snapshot(&admin.session_id).await {
        Some(c) => list_response(&state, &c, &extra),
        None => console_missing(&headers),
    }
}
