use serde_json::json;

use crate::{
    models::{CurrentAdmin, Order, OrderStatus, StatusFilter},
    services::console_service::{OrderConsole, Toast},
    AppState,
};

fn fmt2(v: f64) -> String {
    format!("{:.2}", v)
}

// Whole quantities print without a fraction ("2", not "2.0").
fn fmt_qty(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{:.0}", v)
    } else {
        v.to_string()
    }
}

pub fn render_full(
    state: &AppState,
    title: &str,
    body_html: String,
    admin: Option<&CurrentAdmin>,
) -> Result<String, String> {
    let (is_logged_in, admin_json) = match admin {
        Some(a) => (true, json!({ "email": a.email })),
        None => (false, serde_json::Value::Null),
    };

    let ctx = json!({
        "title": title,
        "body": body_html,
        "is_logged_in": is_logged_in,
        "admin": admin_json,
    });

    state
        .hbs
        .render("layouts/base", &ctx)
        .map_err(|e| e.to_string())
}

fn order_view(order: &Order, open: bool) -> serde_json::Value {
    let items: Vec<serde_json::Value> = order
        .items
        .iter()
        .map(|item| {
            json!({
                "product_id": item.product_id,
                "title": item.title,
                "quantity": fmt_qty(item.quantity),
                "subtotal": fmt2(item.subtotal()),
            })
        })
        .collect();

    let status_options: Vec<serde_json::Value> = OrderStatus::ALL
        .into_iter()
        .map(|s| json!({ "value": s.as_str(), "selected": s == order.status }))
        .collect();

    json!({
        "id": order.id,
        "order_id": order.order_id,
        "status": order.status.as_str(),
        "status_class": order.status.badge_class(),
        "full_name": order.billing_info.full_name,
        "email": order.billing_info.email,
        "address": order.billing_info.address,
        "city": order.billing_info.city,
        "zip_code": order.billing_info.zip_code,
        "total": fmt2(order.total_amount),
        "created": order.created_at.format("%Y-%m-%d").to_string(),
        "open": open,
        "items": items,
        "status_options": status_options,
    })
}

/// Template context for the filter bar and the visible orders.
pub fn console_view(console: &OrderConsole) -> serde_json::Value {
    let filters: Vec<serde_json::Value> = StatusFilter::CHOICES
        .into_iter()
        .map(|f| json!({ "value": f.as_str(), "active": f == console.filter() }))
        .collect();

    let orders: Vec<serde_json::Value> = console
        .visible()
        .into_iter()
        .map(|o| order_view(o, console.is_open(&o.id)))
        .collect();
    let is_empty = orders.is_empty();

    json!({
        "filters": filters,
        "filter": console.filter().as_str(),
        "orders": orders,
        "is_empty": is_empty,
    })
}

pub fn render_order_list(state: &AppState, console: &OrderConsole) -> Result<String, String> {
    state
        .hbs
        .render("partials/order_list", &console_view(console))
        .map_err(|e| e.to_string())
}

/// Toast markup swapped out-of-band into the page's toast slot.
pub fn render_toast(state: &AppState, toast: &Toast) -> Result<String, String> {
    state
        .hbs
        .render("partials/toast", toast)
        .map_err(|e| e.to_string())
}
