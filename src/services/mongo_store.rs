use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    options::{FindOptions, IndexOptions},
    Client, Database, IndexModel,
};

use crate::{
    config::Settings,
    models::{Order, OrderStatus},
};

use super::order_store::{decode_orders, OrderStore, StoreError};

const ORDERS: &str = "orders";

/// Orders kept as `_type: "order"` documents in a MongoDB collection, shaped
/// like the hosted store's documents.
#[derive(Clone)]
pub struct MongoOrderStore {
    db: Database,
}

impl MongoOrderStore {
    pub async fn connect(settings: &Settings) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(&settings.mongodb_uri).await?;
        Ok(Self::new(client.database(&settings.mongodb_db)))
    }

    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        // list query filters by type; status is the only field ever written
        let col = self.db.collection::<Document>(ORDERS);
        let model = IndexModel::builder()
            .keys(doc! { "_type": 1, "status": 1 })
            .options(IndexOptions::builder().name("type_status".to_string()).build())
            .build();

        col.create_index(model, None).await?;
        Ok(())
    }
}

/// Matches either a string id or its ObjectId form.
pub fn id_filter(id: &str) -> Document {
    match ObjectId::parse_str(id) {
        Ok(oid) => doc! { "_id": { "$in": [Bson::ObjectId(oid), Bson::String(id.to_string())] } },
        Err(_) => doc! { "_id": id },
    }
}

fn projection() -> Document {
    doc! {
        "_id": 1,
        "orderId": 1,
        "items.productId": 1,
        "items.title": 1,
        "items.price": 1,
        "items.quantity": 1,
        "billingInfo.fullName": 1,
        "billingInfo.email": 1,
        "billingInfo.address": 1,
        "billingInfo.city": 1,
        "billingInfo.zipCode": 1,
        "totalAmount": 1,
        "status": 1,
        "_createdAt": 1,
    }
}

// ObjectIds and BSON dates have no plain-JSON form; flatten them to strings.
fn normalize(mut d: Document) -> serde_json::Value {
    if let Some(Bson::ObjectId(oid)) = d.get("_id") {
        let hex = oid.to_hex();
        d.insert("_id", hex);
    }
    if let Some(Bson::DateTime(dt)) = d.get("_createdAt") {
        if let Ok(s) = dt.try_to_rfc3339_string() {
            d.insert("_createdAt", s);
        }
    }
    Bson::Document(d).into_relaxed_extjson()
}

#[async_trait]
impl OrderStore for MongoOrderStore {
    fn name(&self) -> &'static str {
        "mongo"
    }

    async fn fetch_orders(&self) -> Result<Vec<Order>, StoreError> {
        let col = self.db.collection::<Document>(ORDERS);
        let opts = FindOptions::builder().projection(projection()).build();

        let mut cursor = col.find(doc! { "_type": "order" }, opts).await?;

        let mut docs = Vec::new();
        while let Some(res) = cursor.next().await {
            docs.push(normalize(res?));
        }

        Ok(decode_orders(docs))
    }

    async fn set_status(&self, id: &str, status: OrderStatus) -> Result<(), StoreError> {
        let col = self.db.collection::<Document>(ORDERS);
        let res = col
            .update_one(id_filter(id), doc! { "$set": { "status": status.as_str() } }, None)
            .await?;

        if res.matched_count == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_order(&self, id: &str) -> Result<(), StoreError> {
        let col = self.db.collection::<Document>(ORDERS);
        let res = col.delete_one(id_filter(id), None).await?;

        if res.deleted_count == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_filter_accepts_both_id_forms() {
        let hex = "65c9f1a2b3c4d5e6f7a8b9c0";
        let f = id_filter(hex);
        let ids = f.get_document("_id").unwrap().get_array("$in").unwrap();
        assert_eq!(ids.len(), 2);

        let plain = id_filter("order-abc");
        assert_eq!(plain.get_str("_id").unwrap(), "order-abc");
    }

    #[test]
    fn normalize_flattens_object_id_and_date() {
        let oid = ObjectId::new();
        let created = mongodb::bson::DateTime::from_millis(1_738_368_000_000);
        let d = doc! { "_id": oid, "status": "Placed", "_createdAt": created };

        let v = normalize(d);
        assert_eq!(v["_id"], serde_json::json!(oid.to_hex()));
        assert!(v["_createdAt"].as_str().unwrap().starts_with("2025-02-01"));
    }
}
