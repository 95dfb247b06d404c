#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use orders_admin::{
    config,
    models::{BillingInfo, Order, OrderItem, OrderStatus},
    services::{
        auth_service,
        order_store::{OrderStore, StoreError},
        sessions::ConsoleSessions,
    },
    templates, AppState,
};

pub const ADMIN_EMAIL: &str = "admin@shop.test";
pub const ADMIN_PASSWORD: &str = "test123";

/// In-memory order store; `fail_with` makes every call error out.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<Vec<Order>>,
    fail: AtomicBool,
    pub fetches: AtomicUsize,
    pub patches: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl MemoryOrderStore {
    pub fn with_orders(orders: Vec<Order>) -> Arc<Self> {
        Arc::new(Self {
            orders: Mutex::new(orders),
            ..Default::default()
        })
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Vec<Order> {
        self.orders.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Status {
                status: 503,
                body: "simulated outage".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_orders(&self) -> Result<Vec<Order>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.stored())
    }

    async fn set_status(&self, id: &str, status: OrderStatus) -> Result<(), StoreError> {
        self.patches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut orders = self.orders.lock().unwrap();
        match orders.iter_mut().find(|o| o.id == id) {
            Some(o) => {
                o.status = status;
                Ok(())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn delete_order(&self, id: &str) -> Result<(), StoreError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut orders = self.orders.lock().unwrap();
        let before = orders.len();
        orders.retain(|o| o.id != id);
        if orders.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }
}

pub fn order(id: &str, number: &str, status: OrderStatus) -> Order {
    Order {
        id: id.to_string(),
        order_id: number.to_string(),
        items: vec![
            OrderItem {
                product_id: format!("{id}-p1"),
                title: "Oak Chair".into(),
                price: 49.5,
                quantity: 2.0,
            },
            OrderItem {
                product_id: format!("{id}-p2"),
                title: "Side Table".into(),
                price: 120.0,
                quantity: 1.0,
            },
        ],
        billing_info: BillingInfo {
            full_name: format!("Customer {number}"),
            email: format!("{id}@customer.test"),
            address: "12 Market Street".into(),
            city: "Lahore".into(),
            zip_code: "54000".into(),
        },
        total_amount: 219.0,
        status,
        created_at: Utc.with_ymd_and_hms(2025, 2, 10, 9, 30, 0).unwrap(),
    }
}

pub fn sample_orders() -> Vec<Order> {
    vec![
        order("a", "1001", OrderStatus::Placed),
        order("b", "1002", OrderStatus::Shipped),
        order("c", "1003", OrderStatus::Delivered),
        order("d", "1004", OrderStatus::Shipped),
        order("e", "1005", OrderStatus::Cancelled),
    ]
}

pub fn test_state(store: Arc<MemoryOrderStore>) -> AppState {
    let mut settings = config::load();
    settings.admin_email = ADMIN_EMAIL.into();
    settings.admin_password = ADMIN_PASSWORD.into();
    settings.admin_password_hash = None;
    settings.jwt_secret = "test-secret".into();
    settings.jwt_cookie_name = "admin_session".into();

    AppState {
        hbs: templates::build_handlebars(),
        store,
        settings,
        sessions: ConsoleSessions::new(),
    }
}

/// `Cookie` header value for a signed-in admin with the given session id.
pub fn session_cookie(state: &AppState, session_id: &str) -> String {
    let token = auth_service::make_jwt_with_days(state, ADMIN_EMAIL, session_id, 1).unwrap();
    format!("{}={}", state.settings.jwt_cookie_name, token)
}

/// Expiry for consoles opened directly in tests.
pub fn in_an_hour() -> i64 {
    Utc::now().timestamp() + 3600
}

pub async fn response_body_string(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}
