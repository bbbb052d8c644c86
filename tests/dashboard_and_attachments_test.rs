mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use rust_decimal_macros::dec;
use serde_json::json;
use tower::ServiceExt;

use common::{expect_json, response_json, TestApp};

#[tokio::test]
async fn dashboard_aggregates_orders_and_revenue() {
    let app = TestApp::new().await;
    let (customer_id, division_id, _) = app.seed_customer_tree().await;
    let family = app.seed_family("DA").await;
    let offer = app.seed_offer(customer_id, division_id, family).await;

    // Two articles with different prices, three orders.
    let (cheap, _) = app.seed_article(offer, dec!(1.00)).await;
    let (pricey, _) = app.seed_article(offer, dec!(10.00)).await;

    app.seed_order(cheap, 100).await; // 100.00
    app.seed_order(cheap, 50).await; // 50.00
    app.seed_order(pricey, 10).await; // 100.00

    let response = app
        .request_authenticated(Method::GET, "/api/v1/dashboard", None)
        .await;
    let body = expect_json(response, StatusCode::OK).await;

    assert_eq!(body["total_orders"], 3);
    assert_eq!(body["total_revenue"], "250.00");
    assert_eq!(body["orders_by_status"][0]["status"], "Pianificato");
    assert_eq!(body["orders_by_status"][0]["count"], 3);
    assert_eq!(body["top_customers"].as_array().unwrap().len(), 1);
    assert_eq!(body["top_articles"].as_array().unwrap().len(), 2);
    // The pricier article ties on revenue; both entries must be present
    // and sorted by revenue.
    let revenues: Vec<&str> = body["top_articles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["revenue"].as_str().unwrap())
        .collect();
    assert_eq!(revenues, vec!["150.00", "100.00"]);
    assert_eq!(body["trend"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn dashboard_filters_by_status_and_rejects_unknown_status() {
    let app = TestApp::new().await;
    let (customer_id, division_id, _) = app.seed_customer_tree().await;
    let family = app.seed_family("DF").await;
    let offer = app.seed_offer(customer_id, division_id, family).await;
    let (article, _) = app.seed_article(offer, dec!(1.00)).await;
    let order_id = app.seed_order(article, 10).await;

    // Move one order forward.
    let payload = json!({ "worked_quantity": 5 });
    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/orders/{}", order_id),
            Some(payload),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_authenticated(
            Method::GET,
            "/api/v1/dashboard?status=In%20Avanzamento",
            None,
        )
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["total_orders"], 1);

    let response = app
        .request_authenticated(Method::GET, "/api/v1/dashboard?status=Sconosciuto", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_rejects_inverted_date_range() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::GET,
            "/api/v1/dashboard?from=2025-12-31&to=2025-01-01",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

const BOUNDARY: &str = "lasline-test-boundary";

fn multipart_body(filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
            BOUNDARY, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

#[tokio::test]
async fn line_layout_upload_download_and_copy() {
    let app = TestApp::new().await;
    let (customer_id, division_id, _) = app.seed_customer_tree().await;
    let family = app.seed_family("AT").await;
    let offer = app.seed_offer(customer_id, division_id, family).await;
    let (source, _) = app.seed_article(offer, dec!(1.00)).await;
    let (target, _) = app.seed_article(offer, dec!(1.00)).await;

    // No layout yet.
    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/articles/{}/line-layout", source),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Upload.
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/articles/{}/line-layout", source))
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body("layout.pdf", b"%PDF-1.4 layout")))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    let body = response_json(response).await;
    assert_eq!(body["line_layout"], "layout.pdf");

    // Download round-trips the bytes.
    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/articles/{}/line-layout", source),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.4 layout");

    // Copy onto the second article.
    let payload = json!({ "target_article_id": target });
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/articles/{}/line-layout/copy", source),
            Some(payload),
        )
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["line_layout"], "layout.pdf");

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/articles/{}/line-layout", target),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}
