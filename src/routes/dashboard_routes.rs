use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::dashboard_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/admin/dashboard", get(dashboard_controller::get_dashboard))
        .route("/admin/orders", get(dashboard_controller::get_orders))
        .route("/admin/orders/:id/toggle", post(dashboard_controller::post_toggle))
        .route("/admin/orders/:id/status", post(dashboard_controller::post_status))
        .route(
            "/admin/orders/:id/delete",
            get(dashboard_controller::get_delete_confirm).post(dashboard_controller::post_delete),
        )
        .route("/admin/modal/close", get(dashboard_controller::get_close_modal))
}
