use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    config::Settings,
    models::{Order, OrderStatus},
};

use super::order_store::{decode_orders, OrderStore, StoreError};

pub const ORDERS_QUERY: &str = r#"*[_type == "order"]{
  _id,
  orderId,
  items[]{ productId, title, price, quantity },
  billingInfo { fullName, email, address, city, zipCode },
  totalAmount,
  status,
  _createdAt
}"#;

const PING_QUERY: &str = r#"count(*[_type == "order"][0...1])"#;

/// Client for a Sanity-style hosted content store (GROQ query + mutate API).
#[derive(Clone)]
pub struct SanityClient {
    http: Client,
    base_url: String,
    dataset: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct MutateResponse {
    #[serde(default)]
    results: Vec<MutateResult>,
}

#[derive(Debug, Deserialize)]
struct MutateResult {
    #[serde(default)]
    id: String,
}

impl SanityClient {
    pub fn new(settings: &Settings) -> Result<Self, StoreError> {
        if settings.sanity_project_id.trim().is_empty() {
            return Err(StoreError::Config("SANITY_PROJECT_ID".into()));
        }
        if settings.sanity_dataset.trim().is_empty() {
            return Err(StoreError::Config("SANITY_DATASET".into()));
        }

        let version = settings.sanity_api_version.trim_start_matches('v');
        let base_url = format!(
            "https://{}.{}/v{}",
            settings.sanity_project_id, settings.sanity_api_host, version
        );

        Ok(Self::with_base_url(
            base_url,
            settings.sanity_dataset.clone(),
            settings.sanity_token.clone(),
        ))
    }

    pub fn with_base_url(base_url: String, dataset: String, token: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            dataset,
            token,
        }
    }

    pub fn query_url(&self) -> String {
        format!("{}/data/query/{}", self.base_url, self.dataset)
    }

    pub fn mutate_url(&self) -> String {
        format!("{}/data/mutate/{}", self.base_url, self.dataset)
    }

    fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }

    async fn query<T: serde::de::DeserializeOwned>(&self, groq: &str) -> Result<T, StoreError> {
        let mut req = self.http.get(self.query_url()).query(&[("query", groq)]);
        if self.has_token() {
            req = req.bearer_auth(&self.token);
        }

        let res = req.send().await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        let parsed = res.json::<QueryResponse<T>>().await?;
        Ok(parsed.result)
    }

    async fn mutate(&self, id: &str, mutation: Value) -> Result<(), StoreError> {
        if !self.has_token() {
            return Err(StoreError::Config("SANITY_TOKEN".into()));
        }

        let res = self
            .http
            .post(self.mutate_url())
            .query(&[("returnIds", "true")])
            .bearer_auth(&self.token)
            .json(&json!({ "mutations": [mutation] }))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        let parsed = res.json::<MutateResponse>().await?;
        if !parsed.results.iter().any(|r| r.id == id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

pub fn status_patch(id: &str, status: OrderStatus) -> Value {
    json!({ "patch": { "id": id, "set": { "status": status.as_str() } } })
}

pub fn delete_mutation(id: &str) -> Value {
    json!({ "delete": { "id": id } })
}

#[async_trait]
impl OrderStore for SanityClient {
    fn name(&self) -> &'static str {
        "sanity"
    }

    async fn fetch_orders(&self) -> Result<Vec<Order>, StoreError> {
        let docs: Vec<Value> = self.query(ORDERS_QUERY).await?;
        Ok(decode_orders(docs))
    }

    async fn set_status(&self, id: &str, status: OrderStatus) -> Result<(), StoreError> {
        self.mutate(id, status_patch(id, status)).await
    }

    async fn delete_order(&self, id: &str) -> Result<(), StoreError> {
        self.mutate(id, delete_mutation(id)).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let _: Value = self.query(PING_QUERY).await?;
        Ok(())
    }
}
