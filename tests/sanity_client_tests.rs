use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use orders_admin::{
    models::OrderStatus,
    services::{
        order_store::{OrderStore, StoreError},
        sanity::SanityClient,
    },
};
use serde_json::{json, Value};

/// Document ids the fake content API still holds, plus what it was sent.
#[derive(Clone, Default)]
struct FakeApi {
    docs: Arc<Mutex<HashSet<String>>>,
    seen_auth: Arc<Mutex<Vec<String>>>,
    seen_queries: Arc<Mutex<Vec<String>>>,
}

impl FakeApi {
    fn holding(ids: &[&str]) -> Self {
        let api = Self::default();
        api.docs
            .lock()
            .unwrap()
            .extend(ids.iter().map(|s| s.to_string()));
        api
    }
}

fn order_doc(id: &str, number: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "orderId": number,
        "items": [{ "productId": "p1", "title": "Mug", "price": 12.5, "quantity": 2 }],
        "billingInfo": {
            "fullName": "Ayesha Khan",
            "email": "ayesha@customer.test",
            "address": "1 Mall Road",
            "city": "Lahore",
            "zipCode": "54000"
        },
        "totalAmount": 25.0,
        "status": status,
        "_createdAt": "2025-02-10T09:30:00Z"
    })
}

async fn query(
    State(api): State<FakeApi>,
    Path(dataset): Path<String>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        api.seen_auth.lock().unwrap().push(auth.to_string());
    }
    api.seen_queries
        .lock()
        .unwrap()
        .push(params.get("query").cloned().unwrap_or_default());

    Json(json!({
        "ms": 3,
        "query": params.get("query"),
        "result": [
            order_doc("a", "#1001", "Pending"),
            { "_id": "broken", "status": 42 },
            order_doc(&format!("{dataset}-b"), "#1002", "Shipped")
        ]
    }))
}

async fn mutate(State(api): State<FakeApi>, Json(body): Json<Value>) -> impl IntoResponse {
    let mut docs = api.docs.lock().unwrap();
    let mut results = Vec::new();

    for m in body["mutations"].as_array().cloned().unwrap_or_default() {
        if let Some(id) = m["delete"]["id"].as_str() {
            if docs.remove(id) {
                results.push(json!({ "id": id, "operation": "delete" }));
            }
        } else if let Some(id) = m["patch"]["id"].as_str() {
            if docs.contains(id) {
                results.push(json!({ "id": id, "operation": "update" }));
            }
        }
    }

    Json(json!({ "transactionId": "tx1", "results": results }))
}

async fn failing() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

/// Serves `app` on an ephemeral local port and returns its base url.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v2025-02-01")
}

async fn fake_api(api: FakeApi) -> String {
    let app = Router::new()
        .route("/v2025-02-01/data/query/:dataset", get(query))
        .route("/v2025-02-01/data/mutate/:dataset", post(mutate))
        .with_state(api);
    serve(app).await
}

#[tokio::test]
async fn fetch_orders_decodes_the_result_envelope() {
    let api = FakeApi::default();
    let base = fake_api(api.clone()).await;
    let client = SanityClient::with_base_url(base, "production".into(), "read-token".into());

    let orders = client.fetch_orders().await.unwrap();

    let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "production-b"]);
    assert_eq!(orders[0].order_id, "#1001");
    assert_eq!(orders[0].status, OrderStatus::Pending);
    assert_eq!(orders[0].billing_info.city, "Lahore");
    assert_eq!(orders[1].status, OrderStatus::Shipped);

    assert_eq!(*api.seen_auth.lock().unwrap(), vec!["Bearer read-token"]);
    assert!(api.seen_queries.lock().unwrap()[0].contains(r#"_type == "order""#));
}

#[tokio::test]
async fn non_success_responses_become_status_errors() {
    let app = Router::new()
        .route("/v2025-02-01/data/query/:dataset", get(failing))
        .route("/v2025-02-01/data/mutate/:dataset", post(failing));
    let base = serve(app).await;
    let client = SanityClient::with_base_url(base, "production".into(), "token".into());

    match client.fetch_orders().await {
        Err(StoreError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("upstream exploded"));
        }
        other => panic!("expected a status error, got {other:?}"),
    }

    match client.set_status("a", OrderStatus::Delivered).await {
        Err(StoreError::Status { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected a status error, got {other:?}"),
    }

    assert!(client.ping().await.is_err());
}

#[tokio::test]
async fn mutations_report_missing_documents_as_not_found() {
    let api = FakeApi::holding(&["a", "b"]);
    let base = fake_api(api.clone()).await;
    let client = SanityClient::with_base_url(base, "production".into(), "write-token".into());

    client.set_status("a", OrderStatus::Shipped).await.unwrap();
    client.delete_order("b").await.unwrap();

    match client.delete_order("b").await {
        Err(StoreError::NotFound(id)) => assert_eq!(id, "b"),
        other => panic!("expected not found, got {other:?}"),
    }
    match client.set_status("zzz", OrderStatus::Delivered).await {
        Err(StoreError::NotFound(id)) => assert_eq!(id, "zzz"),
        other => panic!("expected not found, got {other:?}"),
    }

    assert_eq!(*api.docs.lock().unwrap(), HashSet::from(["a".to_string()]));
}

#[tokio::test]
async fn mutations_without_a_token_never_reach_the_api() {
    let api = FakeApi::holding(&["a"]);
    let base = fake_api(api.clone()).await;
    let client = SanityClient::with_base_url(base, "production".into(), "  ".into());

    match client.delete_order("a").await {
        Err(StoreError::Config(var)) => assert_eq!(var, "SANITY_TOKEN"),
        other => panic!("expected a config error, got {other:?}"),
    }
    match client.set_status("a", OrderStatus::Cancelled).await {
        Err(StoreError::Config(var)) => assert_eq!(var, "SANITY_TOKEN"),
        other => panic!("expected a config error, got {other:?}"),
    }

    assert!(api.docs.lock().unwrap().contains("a"));

    // reads still work anonymously, without an authorization header
    client.fetch_orders().await.unwrap();
    assert!(api.seen_auth.lock().unwrap().is_empty());
}
