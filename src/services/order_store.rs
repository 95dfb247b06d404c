use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Order, OrderStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing environment variable: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("db error: {0}")]
    Db(#[from] mongodb::error::Error),
    #[error("order {0} not found")]
    NotFound(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// The document store holding orders.
///
/// Reads always return the fixed order projection; the only writes are a
/// patch of `status` and a full-document delete, both keyed by the opaque id.
#[async_trait]
pub trait OrderStore: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_orders(&self) -> Result<Vec<Order>, StoreError>;

    async fn set_status(&self, id: &str, status: OrderStatus) -> Result<(), StoreError>;

    async fn delete_order(&self, id: &str) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Decodes raw documents one by one so a single malformed order does not
/// hide the rest of the list.
pub fn decode_orders<I>(docs: I) -> Vec<Order>
where
    I: IntoIterator<Item = serde_json::Value>,
{
    docs.into_iter()
        .filter_map(|raw| {
            let id = raw
                .get("_id")
                .and_then(|v| v.as_str())
                .unwrap_or("<missing>")
                .to_string();
            match serde_json::from_value::<Order>(raw) {
                Ok(order) => Some(order),
                Err(e) => {
                    tracing::warn!(order_id = %id, error = %e, "skipping malformed order document");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::decode_orders;
    use serde_json::json;

    #[test]
    fn malformed_documents_are_skipped_in_order() {
        let docs = vec![
            json!({ "_id": "a", "status": "Placed", "_createdAt": "2025-02-01T00:00:00Z" }),
            json!({ "_id": "b", "status": "Lost", "_createdAt": "2025-02-01T00:00:00Z" }),
            json!({ "_id": "c", "status": "Shipped", "_createdAt": "2025-02-02T00:00:00Z" }),
            json!({ "status": "Shipped", "_createdAt": "2025-02-02T00:00:00Z" }),
        ];

        let ids: Vec<String> = decode_orders(docs).into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["a".to_string(), "c".to_string()]);
    }
}
