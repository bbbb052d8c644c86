mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{expect_json, TestApp};

#[tokio::test]
async fn create_customer_returns_created_row() {
    let app = TestApp::new().await;

    let payload = json!({
        "business_name": "Alimentari Bianchi S.p.A.",
        "vat_number": "01234567890",
        "city": "Brescia",
        "postal_code": "25100",
        "province": "BS"
    });

    let response = app
        .request_authenticated(Method::POST, "/api/v1/customers", Some(payload))
        .await;
    let body = expect_json(response, StatusCode::CREATED).await;

    assert_eq!(body["business_name"], "Alimentari Bianchi S.p.A.");
    assert_eq!(body["vat_number"], "01234567890");
    assert_eq!(body["removed"], false);
}

#[tokio::test]
async fn create_customer_rejects_bad_vat_number() {
    let app = TestApp::new().await;

    let payload = json!({
        "business_name": "Ditta Errata",
        "vat_number": "12345"
    });

    let response = app
        .request_authenticated(Method::POST, "/api/v1/customers", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_customer_rejects_duplicate_vat_among_active_rows() {
    let app = TestApp::new().await;

    let payload = json!({
        "business_name": "Prima Ditta",
        "vat_number": "11111111111"
    });
    let response = app
        .request_authenticated(Method::POST, "/api/v1/customers", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let duplicate = json!({
        "business_name": "Seconda Ditta",
        "vat_number": "11111111111"
    });
    let response = app
        .request_authenticated(Method::POST, "/api/v1/customers", Some(duplicate))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn customer_routes_require_authentication() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/customers", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn listing_excludes_soft_deleted_rows() {
    let app = TestApp::new().await;

    let keep = json!({ "business_name": "Resta", "vat_number": "22222222222" });
    let response = app
        .request_authenticated(Method::POST, "/api/v1/customers", Some(keep))
        .await;
    expect_json(response, StatusCode::CREATED).await;

    let gone = json!({ "business_name": "Sparisce", "vat_number": "33333333333" });
    let response = app
        .request_authenticated(Method::POST, "/api/v1/customers", Some(gone))
        .await;
    let gone_body = expect_json(response, StatusCode::CREATED).await;
    let gone_id = gone_body["id"].as_str().unwrap().to_string();

    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/customers/{}", gone_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request_authenticated(Method::GET, "/api/v1/customers", None)
        .await;
    let body = expect_json(response, StatusCode::OK).await;

    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["business_name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Resta"));
    assert!(!names.contains(&"Sparisce"));

    // The removed row is gone from direct lookup too.
    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/customers/{}", gone_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_customer_with_divisions_is_rejected() {
    let app = TestApp::new().await;
    let (customer_id, _division_id, _address_id) = app.seed_customer_tree().await;

    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/customers/{}", customer_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The customer must remain visible.
    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/customers/{}", customer_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn division_lookups_return_the_tree() {
    let app = TestApp::new().await;
    let (customer_id, division_id, address_id) = app.seed_customer_tree().await;

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/customers/{}/load-divisions", customer_id),
            None,
        )
        .await;
    let divisions = expect_json(response, StatusCode::OK).await;
    assert_eq!(divisions.as_array().unwrap().len(), 1);
    assert_eq!(divisions[0]["id"], division_id.to_string());

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/customers/{}/get-divisions", customer_id),
            None,
        )
        .await;
    let tree = expect_json(response, StatusCode::OK).await;
    let addresses = tree[0]["shipping_addresses"].as_array().unwrap();
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0]["id"], address_id.to_string());
}

#[tokio::test]
async fn pagination_reports_accurate_metadata() {
    let app = TestApp::new().await;

    for i in 0..20u64 {
        let payload = json!({
            "business_name": format!("Cliente {:02}", i),
            "vat_number": format!("{:011}", 40_000_000_000u64 + i)
        });
        let response = app
            .request_authenticated(Method::POST, "/api/v1/customers", Some(payload))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Default page size is 15.
    let response = app
        .request_authenticated(Method::GET, "/api/v1/customers", None)
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 15);
    assert_eq!(body["total"], 20);
    assert_eq!(body["per_page"], 15);
    assert_eq!(body["current_page"], 1);
    assert_eq!(body["last_page"], 2);

    let response = app
        .request_authenticated(Method::GET, "/api/v1/customers?page=2", None)
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["current_page"], 2);

    // per_page is clamped to the configured maximum.
    let response = app
        .request_authenticated(Method::GET, "/api/v1/customers?per_page=5000", None)
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["per_page"], 100);
}

#[tokio::test]
async fn search_restricts_rows_and_empty_results_are_an_empty_array() {
    let app = TestApp::new().await;

    for (name, vat) in [
        ("Panificio Verdi", "50000000001"),
        ("Caseificio Blu", "50000000002"),
    ] {
        let payload = json!({ "business_name": name, "vat_number": vat });
        let response = app
            .request_authenticated(Method::POST, "/api/v1/customers", Some(payload))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .request_authenticated(Method::GET, "/api/v1/customers?search=Panificio", None)
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["business_name"], "Panificio Verdi");

    let response = app
        .request_authenticated(Method::GET, "/api/v1/customers?search=Inesistente", None)
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    assert_eq!(body["total"], 0);
}
