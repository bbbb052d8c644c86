//! Shared test harness: an in-memory SQLite application instance with the
//! full router, a seeded back-office account, and request helpers.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use lasline_api::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db::DbPool,
    entities::{customer, customer_division, customer_shipping_address, las_family, user},
    events::EventSender,
    handlers::AppServices,
    migrator::Migrator,
    storage::AttachmentStore,
    AppState,
};
use sea_orm_migration::MigratorTrait;

const TEST_JWT_SECRET: &str =
    "integration_test_jwt_secret_with_plenty_of_unpredictable_characters_zq83vx91";

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub token: String,
    _storage_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        // A single connection keeps every query on the same in-memory
        // SQLite database.
        let mut options = ConnectOptions::new("sqlite::memory:".to_string());
        options.max_connections(1).sqlx_logging(false);
        let db: DbPool = Database::connect(options).await.expect("connect sqlite");
        Migrator::up(&db, None).await.expect("run migrations");

        let db = Arc::new(db);
        let storage_dir = TempDir::new().expect("create storage dir");

        let config = test_config(&storage_dir);

        let (event_tx, event_rx) = tokio::sync::mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        tokio::spawn(lasline_api::events::process_events(event_rx));

        let auth = Arc::new(AuthService::new(
            AuthConfig {
                jwt_secret: config.jwt_secret.clone(),
                jwt_issuer: config.auth_issuer.clone(),
                jwt_audience: config.auth_audience.clone(),
                access_token_expiration: Duration::from_secs(3600),
            },
            db.clone(),
        ));

        let services = AppServices::new(
            db.clone(),
            Arc::new(event_sender.clone()),
            Duration::from_secs(3600),
        );

        let state = AppState {
            db: db.clone(),
            config,
            event_sender,
            auth: auth.clone(),
            storage: AttachmentStore::new(storage_dir.path()),
            services,
        };

        let account = seed_backoffice_user(&db).await;
        let token = auth.issue_token(&account).expect("issue token");

        let router = lasline_api::build_app(state.clone());

        Self {
            state,
            router,
            token,
            _storage_dir: storage_dir,
        }
    }

    /// Issue a request without credentials.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        self.send(method, uri, body, None).await
    }

    /// Issue a request with the seeded back-office JWT.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        self.send(method, uri, body, Some(self.token.clone())).await
    }

    /// Issue a request with an arbitrary bearer token (portal sessions).
    pub async fn request_with_token(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: &str,
    ) -> Response<Body> {
        self.send(method, uri, body, Some(token.to_string())).await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<String>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Seed one customer with a division and shipping address, returning
    /// their IDs.
    pub async fn seed_customer_tree(&self) -> (Uuid, Uuid, Uuid) {
        let db = &*self.state.db;

        let customer_id = Uuid::new_v4();
        customer::ActiveModel {
            id: Set(customer_id),
            business_name: Set(format!("Cliente {}", &customer_id.to_string()[..8])),
            vat_number: Set(random_vat()),
            tax_code: Set(None),
            address: Set(Some("Via Roma 1".into())),
            city: Set(Some("Milano".into())),
            postal_code: Set(Some("20100".into())),
            province: Set(Some("MI".into())),
            email: Set(None),
            phone: Set(None),
            notes: Set(None),
            removed: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("seed customer");

        let division_id = Uuid::new_v4();
        customer_division::ActiveModel {
            id: Set(division_id),
            customer_id: Set(customer_id),
            name: Set("Divisione principale".into()),
            contact_name: Set(None),
            email: Set(None),
            phone: Set(None),
            removed: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("seed division");

        let address_id = Uuid::new_v4();
        customer_shipping_address::ActiveModel {
            id: Set(address_id),
            division_id: Set(division_id),
            label: Set("Magazzino".into()),
            address: Set("Via Milano 10".into()),
            city: Set("Bergamo".into()),
            postal_code: Set("24100".into()),
            province: Set("BG".into()),
            is_default: Set(true),
            removed: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("seed shipping address");

        (customer_id, division_id, address_id)
    }

    /// Seed a LAS family with the given code.
    pub async fn seed_family(&self, code: &str) -> Uuid {
        let db = &*self.state.db;
        let id = Uuid::new_v4();
        las_family::ActiveModel {
            id: Set(id),
            name: Set(format!("Famiglia {}", code)),
            code: Set(code.to_string()),
            removed: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("seed family");
        id
    }

    /// Seed an offer through the service layer, returning its ID.
    pub async fn seed_offer(&self, customer_id: Uuid, division_id: Uuid, family_id: Uuid) -> Uuid {
        let offer = self
            .state
            .services
            .offers
            .create_offer(lasline_api::services::offers::CreateOfferRequest {
                customer_id,
                customer_division_id: division_id,
                las_family_id: family_id,
                activity_id: None,
                sector_id: None,
                seasonality_id: None,
                order_type_id: None,
                las_work_line_id: None,
                ls_resource_id: None,
                offer_number: None,
                offer_date: Utc::now().date_naive(),
                status: None,
                notes: None,
            })
            .await
            .expect("seed offer");
        offer.id
    }

    /// Seed an article under an offer, returning its ID and LAS code.
    pub async fn seed_article(&self, offer_id: Uuid, unit_price: Decimal) -> (Uuid, String) {
        let article = self
            .state
            .services
            .articles
            .create_article(lasline_api::services::articles::CreateArticleRequest {
                offer_id,
                category_id: None,
                pallet_type_id: None,
                cod_article_las: None,
                description: "Vassoio termoformato".into(),
                unit_price,
                pieces_per_pallet: None,
                material_ids: vec![],
                machinery_ids: vec![],
                critical_issue_ids: vec![],
            })
            .await
            .expect("seed article");
        (article.id, article.cod_article_las)
    }

    /// Seed a production order for an article, returning its ID.
    pub async fn seed_order(&self, article_id: Uuid, quantity: i32) -> Uuid {
        let order = self
            .state
            .services
            .orders
            .create_order(lasline_api::services::orders::CreateOrderRequest {
                article_id,
                shipping_address_id: None,
                order_production_number: None,
                quantity,
                delivery_date: None,
                notes: None,
            })
            .await
            .expect("seed order");
        order.order.id
    }

    /// Seed an employee with portal access enabled, returning its ID.
    pub async fn seed_portal_employee(&self, code: &str, pin: &str) -> Uuid {
        let employee = self
            .state
            .services
            .employees
            .create_employee(lasline_api::services::employees::CreateEmployeeRequest {
                first_name: "Mario".into(),
                last_name: "Rossi".into(),
                employee_code: code.into(),
                email: None,
                phone: None,
            })
            .await
            .expect("seed employee");

        self.state
            .services
            .employees
            .toggle_portal(
                employee.id,
                lasline_api::services::employees::TogglePortalRequest {
                    enabled: true,
                    pin: Some(pin.into()),
                },
            )
            .await
            .expect("enable portal");

        employee.id
    }
}

fn test_config(storage_dir: &TempDir) -> AppConfig {
    // Deserializing through the config crate keeps this aligned with the
    // field defaults used in production.
    let raw = serde_json::json!({
        "database_url": "sqlite::memory:",
        "jwt_secret": TEST_JWT_SECRET,
        "jwt_expiration": 3600,
        "host": "127.0.0.1",
        "port": 0,
        "environment": "development",
        "storage_root": storage_dir.path().to_str().unwrap(),
    });
    serde_json::from_value(raw).expect("build test config")
}

async fn seed_backoffice_user(db: &Arc<DbPool>) -> user::Model {
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set("planner".into()),
        email: Set("planner@lasline.it".into()),
        password_hash: Set(AuthService::hash_secret("segretissimo").unwrap()),
        full_name: Set(Some("Test Planner".into())),
        active: Set(true),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    }
    .insert(&**db)
    .await
    .expect("seed user")
}

fn random_vat() -> String {
    let n = Uuid::new_v4().as_u128() % 100_000_000_000;
    format!("{:011}", n)
}

/// Decode a JSON response body.
pub async fn response_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body")
}

/// Assert a status and decode the body in one step.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    response_json(response).await
}
