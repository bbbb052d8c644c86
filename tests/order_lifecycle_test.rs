mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

use common::{expect_json, TestApp};

async fn seed_order_chain(app: &TestApp) -> (Uuid, Uuid) {
    let (customer_id, division_id, _) = app.seed_customer_tree().await;
    let family = app.seed_family("OR").await;
    let offer = app.seed_offer(customer_id, division_id, family).await;
    let (article_id, _) = app.seed_article(offer, dec!(2.50)).await;
    let order_id = app.seed_order(article_id, 200).await;
    (article_id, order_id)
}

#[tokio::test]
async fn new_orders_start_planned_with_a_dark_semaphore() {
    let app = TestApp::new().await;
    let (_, order_id) = seed_order_chain(&app).await;

    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/orders/{}", order_id), None)
        .await;
    let body = expect_json(response, StatusCode::OK).await;

    assert_eq!(body["status"], "Pianificato");
    assert_eq!(body["worked_quantity"], 0);
    assert_eq!(body["progress_percent"], 0);
    assert_eq!(body["remaining_quantity"], 200);
    assert_eq!(
        body["status_semaforo"],
        json!({ "etichette": 0, "packaging": 0, "prodotto": 0 })
    );
}

#[tokio::test]
async fn worked_quantity_advances_status_and_progress() {
    let app = TestApp::new().await;
    let (_, order_id) = seed_order_chain(&app).await;

    let payload = json!({ "worked_quantity": 50 });
    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/orders/{}", order_id),
            Some(payload),
        )
        .await;
    let body = expect_json(response, StatusCode::OK).await;

    assert_eq!(body["status"], "In Avanzamento");
    assert_eq!(body["worked_quantity"], 50);
    assert_eq!(body["progress_percent"], 25);
    assert_eq!(body["remaining_quantity"], 150);
}

#[tokio::test]
async fn explicit_status_wins_over_derivation() {
    let app = TestApp::new().await;
    let (_, order_id) = seed_order_chain(&app).await;

    let payload = json!({ "worked_quantity": 200, "status": "Evaso" });
    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/orders/{}", order_id),
            Some(payload),
        )
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["status"], "Evaso");

    // A suspended order does not move on further work.
    let payload = json!({ "status": "Sospeso" });
    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/orders/{}", order_id),
            Some(payload),
        )
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["status"], "Sospeso");
}

#[tokio::test]
async fn invalid_status_and_semaphore_values_are_rejected() {
    let app = TestApp::new().await;
    let (_, order_id) = seed_order_chain(&app).await;

    let payload = json!({ "status": "Spedito" });
    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/orders/{}", order_id),
            Some(payload),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let payload = json!({
        "status_semaforo": { "etichette": 5, "packaging": 0, "prodotto": 0 }
    });
    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/orders/{}", order_id),
            Some(payload),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn semaphore_updates_are_persisted() {
    let app = TestApp::new().await;
    let (_, order_id) = seed_order_chain(&app).await;

    let payload = json!({
        "status_semaforo": { "etichette": 2, "packaging": 1, "prodotto": 0 }
    });
    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/orders/{}", order_id),
            Some(payload),
        )
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(
        body["status_semaforo"],
        json!({ "etichette": 2, "packaging": 1, "prodotto": 0 })
    );
}

#[tokio::test]
async fn portal_login_requires_enabled_employee_and_correct_pin() {
    let app = TestApp::new().await;
    let _employee_id = app.seed_portal_employee("B042", "1234").await;

    // Wrong PIN.
    let payload = json!({ "employee_code": "B042", "pin": "9999" });
    let response = app
        .request(Method::POST, "/api/v1/portal/login", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Unknown badge.
    let payload = json!({ "employee_code": "B999", "pin": "1234" });
    let response = app
        .request(Method::POST, "/api/v1/portal/login", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Correct credentials.
    let payload = json!({ "employee_code": "B042", "pin": "1234" });
    let response = app
        .request(Method::POST, "/api/v1/portal/login", Some(payload))
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    assert!(body["token"].as_str().unwrap().len() >= 32);
    assert_eq!(body["first_name"], "Mario");
}

#[tokio::test]
async fn disabled_employee_cannot_log_in() {
    let app = TestApp::new().await;
    let employee_id = app.seed_portal_employee("B050", "1234").await;

    app.state
        .services
        .employees
        .toggle_portal(
            employee_id,
            lasline_api::services::employees::TogglePortalRequest {
                enabled: false,
                pin: None,
            },
        )
        .await
        .unwrap();

    let payload = json!({ "employee_code": "B050", "pin": "1234" });
    let response = app
        .request(Method::POST, "/api/v1/portal/login", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn portal_processing_updates_order_and_respects_assignments() {
    let app = TestApp::new().await;
    let (_, order_id) = seed_order_chain(&app).await;
    let employee_id = app.seed_portal_employee("B061", "4321").await;

    let payload = json!({ "employee_code": "B061", "pin": "4321" });
    let response = app
        .request(Method::POST, "/api/v1/portal/login", Some(payload))
        .await;
    let session = expect_json(response, StatusCode::OK).await;
    let token = session["token"].as_str().unwrap().to_string();

    // Nothing assigned yet.
    let response = app
        .request_with_token(Method::GET, "/api/v1/portal/dashboard", None, &token)
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    // Logging against an unassigned order is forbidden.
    let payload = json!({ "quantity": 10 });
    let response = app
        .request_with_token(
            Method::POST,
            &format!("/api/v1/portal/orders/{}/processings", order_id),
            Some(payload),
            &token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    app.state
        .services
        .employees
        .assign_order(employee_id, order_id)
        .await
        .unwrap();

    let response = app
        .request_with_token(Method::GET, "/api/v1/portal/dashboard", None, &token)
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // First logged quantity advances the order.
    let payload = json!({ "quantity": 80 });
    let response = app
        .request_with_token(
            Method::POST,
            &format!("/api/v1/portal/orders/{}/processings", order_id),
            Some(payload),
            &token,
        )
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["worked_quantity"], 80);
    assert_eq!(body["status"], "In Avanzamento");
    assert_eq!(body["progress_percent"], 40);

    // A second log accumulates.
    let payload = json!({ "quantity": 20 });
    let response = app
        .request_with_token(
            Method::POST,
            &format!("/api/v1/portal/orders/{}/processings", order_id),
            Some(payload),
            &token,
        )
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["worked_quantity"], 100);
    assert_eq!(body["progress_percent"], 50);

    // Zero or negative quantities are rejected.
    let payload = json!({ "quantity": 0 });
    let response = app
        .request_with_token(
            Method::POST,
            &format!("/api/v1/portal/orders/{}/processings", order_id),
            Some(payload),
            &token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_revokes_the_portal_session() {
    let app = TestApp::new().await;
    app.seed_portal_employee("B070", "0000").await;

    let payload = json!({ "employee_code": "B070", "pin": "0000" });
    let response = app
        .request(Method::POST, "/api/v1/portal/login", Some(payload))
        .await;
    let session = expect_json(response, StatusCode::OK).await;
    let token = session["token"].as_str().unwrap().to_string();

    let response = app
        .request_with_token(Method::POST, "/api/v1/portal/logout", None, &token)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request_with_token(Method::GET, "/api/v1/portal/dashboard", None, &token)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn disabling_portal_access_kills_open_sessions() {
    let app = TestApp::new().await;
    let employee_id = app.seed_portal_employee("B080", "7777").await;

    let payload = json!({ "employee_code": "B080", "pin": "7777" });
    let response = app
        .request(Method::POST, "/api/v1/portal/login", Some(payload))
        .await;
    let session = expect_json(response, StatusCode::OK).await;
    let token = session["token"].as_str().unwrap().to_string();

    let payload = json!({ "enabled": false });
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/employees/{}/toggle-portal", employee_id),
            Some(payload),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_with_token(Method::GET, "/api/v1/portal/dashboard", None, &token)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
