//! Service regression tests.
//!
//! Drives the full router the daemon serves: balance, pan measurement,
//! health, and the metrics it leaves behind.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use balancer_metrics::MetricsCollector;
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_router() -> (Router, Arc<MetricsCollector>) {
    let metrics = Arc::new(MetricsCollector::new(Duration::from_secs(60)));
    (balancer_api::build_router(metrics.clone()), metrics)
}

fn recipe(percent_variation: f64) -> Value {
    json!({
        "id": 1,
        "uuid": "67e55044-10b1-426f-9247-bb680e5fe0c8",
        "name": "Test Recipe",
        "description": "pan pizza",
        "author": "kitchen",
        "dough": {
            "name": "classic",
            "percentVariation": percent_variation,
            "ingredients": [
                {"name": "flour", "amount": 55.7},
                {"name": "water", "amount": 41.6},
                {"name": "salt", "amount": 1.1},
                {"name": "evoOil", "amount": 1.1},
                {"name": "yeast", "amount": 0.5}
            ]
        },
        "topping": {
            "name": "margherita",
            "referenceArea": 1000,
            "ingredients": [
                {"name": "tomato", "amount": 300},
                {"name": "mozzarella", "amount": 200},
                {"name": "basil", "amount": 50},
                {"name": "evoOil", "amount": 50}
            ]
        },
        "steps": [{"id": 1, "stepNumber": 1, "description": "mix"}]
    })
}

fn pans(areas: &[f64], shape: &str) -> Value {
    let total: f64 = areas.iter().sum();
    json!({
        "pans": areas
            .iter()
            .enumerate()
            .map(|(i, a)| json!({"shape": shape, "name": format!("pan {i}"), "area": a}))
            .collect::<Vec<_>>(),
        "totalArea": total
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn amount_sum(ingredients: &Value) -> f64 {
    ingredients
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["amount"].as_f64().unwrap())
        .sum()
}

#[tokio::test]
async fn balance_without_percent_variation() {
    let (router, _) = test_router();
    let req = post_json(
        "/api/v1/balance",
        &json!({"recipe": recipe(0.0), "pans": pans(&[500.0, 500.0], "round")}),
    );

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert!((amount_sum(&data["recipe"]["dough"]["ingredients"]) - 500.0).abs() < 0.25);
    assert!((amount_sum(&data["recipe"]["topping"]["ingredients"]) - 600.0).abs() < 1e-9);

    let split = data["splitIngredients"]["splitDough"].as_array().unwrap();
    assert_eq!(split.len(), 2);
    assert_eq!(split[0]["name"], "pan 0");
    assert_eq!(split[1]["name"], "pan 1");
    assert_eq!(data["splitIngredients"]["splitTopping"], json!([]));

    // Untouched fields come back as sent.
    assert_eq!(data["recipe"]["uuid"], "67e55044-10b1-426f-9247-bb680e5fe0c8");
    assert_eq!(data["recipe"]["steps"][0]["description"], "mix");
}

#[tokio::test]
async fn balance_with_percent_variation() {
    let (router, _) = test_router();
    let req = post_json(
        "/api/v1/balance",
        &json!({"recipe": recipe(10.0), "pans": pans(&[1000.0, 1000.0], "square")}),
    );

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let data = body_json(resp).await["data"].clone();
    assert!((amount_sum(&data["recipe"]["dough"]["ingredients"]) - 1100.0).abs() < 0.25);
    assert!((amount_sum(&data["recipe"]["topping"]["ingredients"]) - 1200.0).abs() < 1e-9);
}

#[tokio::test]
async fn balance_zero_area_is_rejected_and_counted() {
    let (router, metrics) = test_router();
    let req = post_json(
        "/api/v1/balance",
        &json!({"recipe": recipe(0.0), "pans": {"pans": [], "totalArea": 0}}),
    );

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "invalid dough weight");

    assert_eq!(
        metrics
            .balance_errors(balancer_metrics::UNKNOWN_RECIPE_TYPE, "validation_error")
            .await,
        1
    );
    assert_eq!(metrics.request_count("/api/v1/balance").await, 1);
}

#[tokio::test]
async fn balance_empty_dough_is_rejected() {
    let (router, _) = test_router();
    let mut r = recipe(0.0);
    r["dough"]["ingredients"] = json!([]);
    let req = post_json(
        "/api/v1/balance",
        &json!({"recipe": r, "pans": pans(&[500.0], "round")}),
    );

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn balance_zero_reference_area_serializes_as_null() {
    let (router, _) = test_router();
    let mut r = recipe(0.0);
    r["topping"]["referenceArea"] = json!(0);
    let req = post_json(
        "/api/v1/balance",
        &json!({"recipe": r, "pans": pans(&[500.0], "round")}),
    );

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let data = body_json(resp).await["data"].clone();
    assert_eq!(data["recipe"]["topping"]["ingredients"][0]["amount"], Value::Null);
}

#[tokio::test]
async fn measure_pans_computes_areas() {
    let (router, _) = test_router();
    let req = post_json(
        "/api/v1/pans/area",
        &json!({"pans": [
            {"shape": "square", "measures": {"edge": 20}},
            {"shape": "rectangular", "measures": {"width": 30, "length": 40}}
        ]}),
    );

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let data = body_json(resp).await["data"].clone();
    assert_eq!(data["totalArea"], 1600.0);
    assert_eq!(data["pans"][0]["name"], "square 20 cm");
    assert_eq!(data["pans"][0]["area"], 400.0);
    assert_eq!(data["pans"][1]["measures"], json!({"width": 30, "length": 40}));
}

#[tokio::test]
async fn measure_pans_rejects_unsupported_shape() {
    let (router, _) = test_router();
    let req = post_json(
        "/api/v1/pans/area",
        &json!({"pans": [{"shape": "hexagon", "measures": {"edge": 10}}]}),
    );

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "unsupported shape: hexagon");
}

#[tokio::test]
async fn health_endpoint() {
    let (router, _) = test_router();
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "ingredients-balancer");
}

#[tokio::test]
async fn metrics_endpoint_reflects_traffic() {
    let (router, _) = test_router();

    let req = post_json(
        "/api/v1/balance",
        &json!({"recipe": recipe(0.0), "pans": pans(&[500.0, 500.0], "round")}),
    );
    let resp = router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("ingredients_balancer_balance_operations_total{recipe_type=\"unknown\"} 1"));
    assert!(text.contains(
        "ingredients_balancer_http_requests_total{route=\"/api/v1/balance\",status_code=\"200\"} 1"
    ));
    assert!(text.contains("ingredients_balancer_recipe_portions_bucket{le=\"2\"} 1"));
}

#[tokio::test]
async fn unknown_route_is_tracked_as_unmatched() {
    let (router, metrics) = test_router();
    let req = Request::builder().uri("/nope").body(Body::empty()).unwrap();

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(metrics.request_count("unmatched").await, 1);
}
