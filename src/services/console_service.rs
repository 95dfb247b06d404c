//! The order console: the in-memory order list an admin works on, plus the
//! filter and detail-expansion state, and the mutations that reconcile it
//! with the store.
//!
//! Local state only changes after the store has acknowledged a mutation, so a
//! failed call leaves the console exactly as it was.

use serde::Serialize;

use crate::models::{Order, OrderStatus, StatusFilter};

use super::{order_store::OrderStore, sessions::ConsoleSessions};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderConsole {
    orders: Vec<Order>,
    filter: StatusFilter,
    selected: Option<String>,
}

/// Orders matching `filter`, in their original relative order.
pub fn filter_orders(orders: &[Order], filter: StatusFilter) -> Vec<&Order> {
    orders.iter().filter(|o| filter.matches(o.status)).collect()
}

impl OrderConsole {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders,
            filter: StatusFilter::All,
            selected: None,
        }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    pub fn visible(&self) -> Vec<&Order> {
        filter_orders(&self.orders, self.filter)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_open(&self, order_id: &str) -> bool {
        self.selected.as_deref() == Some(order_id)
    }

    /// Opens the detail panel for `order_id`, or closes it if it is already
    /// the open one.
    pub fn toggle(&mut self, order_id: &str) {
        if !self.orders.iter().any(|o| o.id == order_id) {
            return;
        }
        if self.is_open(order_id) {
            self.selected = None;
        } else {
            self.selected = Some(order_id.to_string());
        }
    }

    /// Sets the status of the matching entry. Returns false when no entry has
    /// that id.
    pub fn apply_status(&mut self, order_id: &str, status: OrderStatus) -> bool {
        match self.orders.iter_mut().find(|o| o.id == order_id) {
            Some(order) => {
                order.status = status;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, order_id: &str) -> Option<Order> {
        let idx = self.orders.iter().position(|o| o.id == order_id)?;
        if self.is_open(order_id) {
            self.selected = None;
        }
        Some(self.orders.remove(idx))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

/// Notification shown after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: &'static str,
    pub message: String,
}

impl Toast {
    fn success(title: &'static str, message: &str) -> Self {
        Self {
            kind: ToastKind::Success,
            title,
            message: message.to_string(),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            kind: ToastKind::Error,
            title: "Error!",
            message: message.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == ToastKind::Error
    }
}

/// Fetches every order for a fresh console. A failed fetch is logged and
/// yields an empty console.
pub async fn load_console(store: &dyn OrderStore) -> OrderConsole {
    match store.fetch_orders().await {
        Ok(orders) => {
            tracing::info!(backend = store.name(), count = orders.len(), "orders fetched");
            OrderConsole::new(orders)
        }
        Err(e) => {
            tracing::error!(backend = store.name(), error = %e, "Error fetching orders");
            OrderConsole::default()
        }
    }
}

/// Patches the order's status in the store, then mirrors it into the
/// session's console.
pub async fn change_status(
    store: &dyn OrderStore,
    sessions: &ConsoleSessions,
    session_id: &str,
    order_id: &str,
    status: OrderStatus,
) -> Toast {
    if let Err(e) = store.set_status(order_id, status).await {
        tracing::warn!(order_id, status = %status, error = %e, "Error updating order status");
        return Toast::error("Something went wrong while updating the status.");
    }

    let applied = sessions
        .update(session_id, |console| console.apply_status(order_id, status))
        .await;
    tracing::info!(order_id, status = %status, reconciled = applied.unwrap_or(false), "order status updated");

    Toast::success("Updated!", "Order status has been updated.")
}

/// Deletes the order in the store, then drops it from the session's console.
pub async fn delete_order(
    store: &dyn OrderStore,
    sessions: &ConsoleSessions,
    session_id: &str,
    order_id: &str,
) -> Toast {
    if let Err(e) = store.delete_order(order_id).await {
        tracing::warn!(order_id, error = %e, "Error deleting order");
        return Toast::error("Something went wrong while deleting.");
    }

    sessions
        .update(session_id, |console| console.remove(order_id))
        .await;
    tracing::info!(order_id, "order deleted");

    Toast::success("Deleted!", "Your order has been deleted.")
}

/// Rejects a status value outside the four known literals.
pub fn invalid_status_toast() -> Toast {
    Toast::error("Unknown order status.")
}
