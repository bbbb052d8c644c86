mod common;

use axum::http::{Method, StatusCode};
use chrono::{Datelike, Utc};
use rust_decimal_macros::dec;
use serde_json::json;

use common::{expect_json, TestApp};

#[tokio::test]
async fn las_codes_increment_per_family() {
    let app = TestApp::new().await;
    let (customer_id, division_id, _) = app.seed_customer_tree().await;

    let family_ab = app.seed_family("AB").await;
    let family_xy = app.seed_family("XY").await;
    let offer_ab = app.seed_offer(customer_id, division_id, family_ab).await;
    let offer_xy = app.seed_offer(customer_id, division_id, family_xy).await;

    let (_, first) = app.seed_article(offer_ab, dec!(1.50)).await;
    let (_, second) = app.seed_article(offer_ab, dec!(1.50)).await;
    let (_, other_family) = app.seed_article(offer_xy, dec!(2.00)).await;

    assert_eq!(first, "LASAB0001");
    assert_eq!(second, "LASAB0002");
    // Each family runs its own sequence.
    assert_eq!(other_family, "LASXY0001");
}

#[tokio::test]
async fn get_las_code_previews_without_reserving() {
    let app = TestApp::new().await;
    let (customer_id, division_id, _) = app.seed_customer_tree().await;
    let family = app.seed_family("PR").await;
    let offer = app.seed_offer(customer_id, division_id, family).await;

    let uri = format!("/api/v1/articles/get-las-code?family_id={}", family);
    let response = app.request_authenticated(Method::GET, &uri, None).await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["cod_article_las"], "LASPR0001");

    // Previewing twice returns the same number; only creation consumes it.
    let response = app.request_authenticated(Method::GET, &uri, None).await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["cod_article_las"], "LASPR0001");

    let (_, created) = app.seed_article(offer, dec!(3.10)).await;
    assert_eq!(created, "LASPR0001");

    let response = app.request_authenticated(Method::GET, &uri, None).await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["cod_article_las"], "LASPR0002");
}

#[tokio::test]
async fn explicit_duplicate_article_code_is_rejected() {
    let app = TestApp::new().await;
    let (customer_id, division_id, _) = app.seed_customer_tree().await;
    let family = app.seed_family("DU").await;
    let offer = app.seed_offer(customer_id, division_id, family).await;

    let (_, code) = app.seed_article(offer, dec!(1.00)).await;

    let payload = json!({
        "offer_id": offer,
        "cod_article_las": code,
        "description": "Doppione",
        "unit_price": "1.00"
    });
    let response = app
        .request_authenticated(Method::POST, "/api/v1/articles", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn explicit_article_code_must_match_offer_family() {
    let app = TestApp::new().await;
    let (customer_id, division_id, _) = app.seed_customer_tree().await;
    let family = app.seed_family("FA").await;
    let offer = app.seed_offer(customer_id, division_id, family).await;

    let payload = json!({
        "offer_id": offer,
        "cod_article_las": "LASZZ0001",
        "description": "Famiglia sbagliata",
        "unit_price": "1.00"
    });
    let response = app
        .request_authenticated(Method::POST, "/api/v1/articles", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn offer_numbers_follow_the_yearly_sequence() {
    let app = TestApp::new().await;
    let (customer_id, division_id, _) = app.seed_customer_tree().await;
    let family = app.seed_family("OF").await;

    let year = Utc::now().year();

    let first = app
        .state
        .services
        .offers
        .get_offer(app.seed_offer(customer_id, division_id, family).await)
        .await
        .unwrap();
    let second = app
        .state
        .services
        .offers
        .get_offer(app.seed_offer(customer_id, division_id, family).await)
        .await
        .unwrap();

    assert_eq!(first.offer_number, format!("{}_001_01_A", year));
    assert_eq!(second.offer_number, format!("{}_002_01_A", year));
}

#[tokio::test]
async fn generate_offer_number_endpoint_previews_next_number() {
    let app = TestApp::new().await;

    let year = Utc::now().year();
    let response = app
        .request_authenticated(Method::GET, "/api/v1/offers/generate-number", None)
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["offer_number"], format!("{}_001_01_A", year));
}

#[tokio::test]
async fn explicit_duplicate_offer_number_is_rejected() {
    let app = TestApp::new().await;
    let (customer_id, division_id, _) = app.seed_customer_tree().await;
    let family = app.seed_family("DO").await;

    let existing = app
        .state
        .services
        .offers
        .get_offer(app.seed_offer(customer_id, division_id, family).await)
        .await
        .unwrap();

    let payload = json!({
        "customer_id": customer_id,
        "customer_division_id": division_id,
        "las_family_id": family,
        "offer_number": existing.offer_number,
        "offer_date": "2025-06-01"
    });
    let response = app
        .request_authenticated(Method::POST, "/api/v1/offers", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn production_numbers_follow_the_yearly_sequence() {
    let app = TestApp::new().await;
    let (customer_id, division_id, _) = app.seed_customer_tree().await;
    let family = app.seed_family("PN").await;
    let offer = app.seed_offer(customer_id, division_id, family).await;
    let (article_id, _) = app.seed_article(offer, dec!(0.80)).await;

    let year = Utc::now().year();

    let first = app.seed_order(article_id, 100).await;
    let second = app.seed_order(article_id, 50).await;

    let first = app.state.services.orders.get_order(first).await.unwrap();
    let second = app.state.services.orders.get_order(second).await.unwrap();

    assert_eq!(
        first.order.order_production_number,
        format!("{}.0001", year)
    );
    assert_eq!(
        second.order.order_production_number,
        format!("{}.0002", year)
    );
}

#[tokio::test]
async fn deleting_offer_with_articles_is_rejected() {
    let app = TestApp::new().await;
    let (customer_id, division_id, _) = app.seed_customer_tree().await;
    let family = app.seed_family("GA").await;
    let offer = app.seed_offer(customer_id, division_id, family).await;
    app.seed_article(offer, dec!(1.00)).await;

    let response = app
        .request_authenticated(Method::DELETE, &format!("/api/v1/offers/{}", offer), None)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The offer must remain non-removed.
    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/offers/{}", offer), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn deleting_article_with_orders_is_rejected() {
    let app = TestApp::new().await;
    let (customer_id, division_id, _) = app.seed_customer_tree().await;
    let family = app.seed_family("GB").await;
    let offer = app.seed_offer(customer_id, division_id, family).await;
    let (article_id, _) = app.seed_article(offer, dec!(1.00)).await;
    app.seed_order(article_id, 10).await;

    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/articles/{}", article_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/articles/{}", article_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn instruction_codes_increment_per_kind() {
    let app = TestApp::new().await;
    let (customer_id, division_id, _) = app.seed_customer_tree().await;
    let family = app.seed_family("IS").await;
    let offer = app.seed_offer(customer_id, division_id, family).await;
    let (article_id, _) = app.seed_article(offer, dec!(1.00)).await;

    let payload = json!({ "kind": "ic", "title": "Controllo qualità" });
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/articles/{}/instructions", article_id),
            Some(payload),
        )
        .await;
    let first = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(first["code"], "IC0001");

    let payload = json!({ "kind": "ic", "title": "Controllo qualità bis" });
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/articles/{}/instructions", article_id),
            Some(payload),
        )
        .await;
    let second = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(second["code"], "IC0002");

    // A different kind starts its own sequence.
    let payload = json!({ "kind": "packaging", "title": "Imballo" });
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/articles/{}/instructions", article_id),
            Some(payload),
        )
        .await;
    let packaging = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(packaging["code"], "IMB0001");
}
