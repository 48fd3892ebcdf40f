use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use medsupply_api::app::{build_app, services::AppServices};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let app = build_app(Arc::new(AppServices::in_memory()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn post_json(client: &reqwest::Client, url: String, body: Value) -> (StatusCode, Value) {
    let res = client.post(url).json(&body).send().await.unwrap();
    let status = res.status();
    let body = res.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn get_json(client: &reqwest::Client, url: String) -> (StatusCode, Value) {
    let res = client.get(url).send().await.unwrap();
    let status = res.status();
    let body = res.json().await.unwrap_or(Value::Null);
    (status, body)
}

/// Two supplies, one supplier and three lots with distinct orders per key.
async fn catalog(srv: &TestServer, client: &reqwest::Client) {
    let (status, _) = post_json(
        client,
        srv.url("/lots/suppliers"),
        json!({ "name_supplier": "MedCorp", "phone": null, "address": null }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    for (name, description) in [("Gauze", "Sterile pads"), ("Swab", "Cotton tipped applicator")] {
        let (status, _) = post_json(
            client,
            srv.url("/medical-supplies"),
            json!({ "name_material": name, "description": description }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    for (stock, delivered, supply) in [(30, "2024-01-10", 1), (10, "2024-03-05", 2), (20, "2024-02-01", 1)] {
        let (status, body) = post_json(
            client,
            srv.url("/lots"),
            json!({
                "stock": stock,
                "date_delivery": delivered,
                "due_date": "2026-06-30",
                "id_medical_supplies": supply,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "body={body}");
    }
}

fn stocks(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|lot| lot["stock"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn created_lot_is_hydrated_with_relations() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    catalog(&srv, &client).await;

    let (status, lot) = get_json(&client, srv.url("/lots/2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lot["id_lots"], 2);
    assert_eq!(lot["medical_supply"]["name_material"], "Swab");
    assert_eq!(lot["supplier"]["name_supplier"], "MedCorp");
}

#[tokio::test]
async fn listing_defaults_to_newest_delivery_first() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    catalog(&srv, &client).await;

    let (status, body) = get_json(&client, srv.url("/lots")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stocks(&body), vec![10, 20, 30]);
}

#[tokio::test]
async fn listing_sorts_by_supply_column_and_pages() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    catalog(&srv, &client).await;

    let (_, body) = get_json(&client, srv.url("/lots?sort=name_material&order=DESC")).await;
    assert_eq!(stocks(&body)[0], 10);

    let (_, body) = get_json(&client, srv.url("/lots?sort=stock&order=ASC&offset=1&limit=1")).await;
    assert_eq!(stocks(&body), vec![20]);
}

#[tokio::test]
async fn search_matches_supply_description_case_insensitively() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    catalog(&srv, &client).await;

    let (status, body) = get_json(&client, srv.url("/lots?search=TIPPED")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stocks(&body), vec![10]);

    let (_, body) = get_json(&client, srv.url("/lots?search=2024-02")).await;
    assert_eq!(stocks(&body), vec![20]);
}

#[tokio::test]
async fn invalid_query_parameters_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, srv.url("/lots?sort=password")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = get_json(&client, srv.url("/lots?limit=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(&client, srv.url("/lots?order=sideways")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_records_map_to_their_error_classes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, srv.url("/lots/99")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Lot with id 99 not found");

    let (status, _) = post_json(
        &client,
        srv.url("/lots"),
        json!({
            "stock": 1,
            "date_delivery": "2024-01-01",
            "due_date": "2025-01-01",
            "id_medical_supplies": 42,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let res = client
        .patch(srv.url("/lots/7"))
        .json(&json!({ "stock": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let (status, body) = get_json(&client, srv.url("/lots/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn patch_changes_only_given_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    catalog(&srv, &client).await;

    let res = client
        .patch(srv.url("/lots/1"))
        .json(&json!({ "stock": 99 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let (_, lot) = get_json(&client, srv.url("/lots/1")).await;
    assert_eq!(lot["stock"], 99);
    assert_eq!(lot["date_delivery"], "2024-01-10");
    assert_eq!(lot["medical_supply"]["name_material"], "Gauze");
    assert_eq!(lot["supplier"]["name_supplier"], "MedCorp");
}

#[tokio::test]
async fn delete_removes_lot() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    catalog(&srv, &client).await;

    let res = client.delete(srv.url("/lots/3")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let (status, _) = get_json(&client, srv.url("/lots/3")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, body) = get_json(&client, srv.url("/lots")).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_department_name_is_bad_request_with_detail() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let body = json!({ "name_department": "Emergency", "description": null });

    let (status, _) = post_json(&client, srv.url("/departments"), body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, err) = post_json(&client, srv.url("/departments"), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["message"].as_str().unwrap().contains("Emergency"));
}

#[tokio::test]
async fn seed_loads_every_family_and_is_repeatable() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, first) = post_json(&client, srv.url("/seed"), json!({})).await;
    assert_eq!(status, StatusCode::OK, "body={first}");
    let lots_inserted = first["lots_inserted"].as_u64().unwrap();
    assert!(lots_inserted > 0);

    let (status, second) = post_json(&client, srv.url("/seed"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["supplies_created"], 0);
    assert_eq!(second["lots_deleted"].as_u64().unwrap(), lots_inserted);

    let (_, lots) = get_json(&client, srv.url("/lots?limit=100")).await;
    assert_eq!(lots.as_array().unwrap().len() as u64, lots_inserted);

    let (_, departments) = get_json(&client, srv.url("/departments")).await;
    assert_eq!(
        departments.as_array().unwrap().len() as u64,
        second["departments_inserted"].as_u64().unwrap()
    );

    let (_, assets) = get_json(&client, srv.url("/national-assets")).await;
    assert!(!assets.as_array().unwrap().is_empty());

    let (_, suppliers) = get_json(&client, srv.url("/lots/suppliers")).await;
    assert!(!suppliers.as_array().unwrap().is_empty());
}
