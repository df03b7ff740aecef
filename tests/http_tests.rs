//! Starts the real router on an ephemeral port and exercises it with reqwest.

use std::sync::Arc;

use purchases::api::{NOT_FOUND_MESSAGE, WELCOME_MESSAGE};
use purchases::{router, AppState, InMemoryStore};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn start_server() -> String {
    let app = router(AppState::new(Arc::new(InMemoryStore::new()), None));
    let server = axum::Server::bind(&"127.0.0.1:0".parse().unwrap())
        .serve(app.into_make_service());
    let addr = server.local_addr();
    tokio::spawn(async move {
        server.await.unwrap();
    });
    format!("http://{addr}")
}

fn abacus() -> Value {
    json!({ "name": "Abacus", "quantity": 1, "price": 10.20, "productType": "toy" })
}

async fn post(client: &reqwest::Client, base: &str, body: &Value) -> reqwest::Response {
    client
        .post(format!("{base}/api/purchases"))
        .json(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn welcome_message() {
    let base = start_server().await;
    let resp = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), WELCOME_MESSAGE);
}

#[tokio::test]
async fn end_to_end_lifecycle() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    let resp = post(&client, &base, &abacus()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(
        created,
        json!({ "id": 1, "name": "Abacus", "quantity": 1, "price": 10.2, "productType": "toy" })
    );

    let resp = client.get(format!("{base}/api/purchases/1")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), created);

    let resp = client.delete(format!("{base}/api/purchases/1")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), created);

    let resp = client.get(format!("{base}/api/purchases")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!([]));
}

#[tokio::test]
async fn delete_renumbers_over_http() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    for name in ["First", "Second", "Third"] {
        let mut body = abacus();
        body["name"] = json!(name);
        assert_eq!(post(&client, &base, &body).await.status(), StatusCode::CREATED);
    }

    let resp = client.delete(format!("{base}/api/purchases/1")).send().await.unwrap();
    assert_eq!(resp.json::<Value>().await.unwrap()["name"], "First");

    let list: Value = client
        .get(format!("{base}/api/purchases"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let pairs: Vec<(u64, String)> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|p| (p["id"].as_u64().unwrap(), p["name"].as_str().unwrap().to_string()))
        .collect();
    assert_eq!(pairs, vec![(1, "Second".to_string()), (2, "Third".to_string())]);
}

#[tokio::test]
async fn update_overwrites_fields() {
    let base = start_server().await;
    let client = reqwest::Client::new();
    post(&client, &base, &abacus()).await;

    let resp = client
        .put(format!("{base}/api/purchases/1"))
        .json(&json!({ "name": "Hammer", "quantity": 3, "price": 7.5, "productType": "hardware" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(
        updated,
        json!({ "id": 1, "name": "Hammer", "quantity": 3, "price": 7.5, "productType": "hardware" })
    );

    let fetched: Value = client
        .get(format!("{base}/api/purchases/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn invalid_bodies_are_rejected() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    let mut body = abacus();
    body["name"] = json!("Ab");
    let resp = post(&client, &base, &body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.text().await.unwrap(),
        "\"name\" length must be at least 3 characters long"
    );

    let mut body = abacus();
    body["productType"] = json!("electronics");
    let resp = post(&client, &base, &body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.text().await.unwrap(),
        "\"productType\" must be one of [toy, hardware, book, clothing]"
    );

    let resp = client
        .post(format!("{base}/api/purchases"))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client.post(format!("{base}/api/purchases")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.text().await.unwrap(), "\"name\" is required");

    let list: Value = client
        .get(format!("{base}/api/purchases"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn invalid_update_leaves_record() {
    let base = start_server().await;
    let client = reqwest::Client::new();
    let created: Value = post(&client, &base, &abacus()).await.json().await.unwrap();

    let resp = client
        .put(format!("{base}/api/purchases/1"))
        .json(&json!({ "name": "Hammer", "quantity": 0, "price": 7.5, "productType": "hardware" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let fetched: Value = client
        .get(format!("{base}/api/purchases/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/api/purchases/999")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.text().await.unwrap(), NOT_FOUND_MESSAGE);

    let resp = client.delete(format!("{base}/api/purchases/999")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client.get(format!("{base}/api/purchases/abc")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Lookup happens before validation.
    let resp = client
        .put(format!("{base}/api/purchases/999"))
        .json(&json!({ "name": "Ab" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let list: Value = client
        .get(format!("{base}/api/purchases"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn health_and_disabled_metrics() {
    let base = start_server().await;
    let client = reqwest::Client::new();
    post(&client, &base, &abacus()).await;

    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({ "status": "ok", "purchases": 1 })
    );

    let resp = client.get(format!("{base}/metrics")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn trailing_slash_and_unsupported_methods() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/purchases/"))
        .json(&abacus())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client.get(format!("{base}/api/purchases/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap().as_array().unwrap().len(), 1);

    let resp = client.get(format!("{base}/api/purchases/1/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap()["name"], "Abacus");

    let resp = client.put(format!("{base}/api/purchases")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let resp = client.post(format!("{base}/api/purchases/1")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
