pub mod articles;
pub mod auth;
pub mod common;
pub mod customers;
pub mod dashboard;
pub mod employees;
pub mod lookups;
pub mod offers;
pub mod orders;
pub mod portal;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub customers: Arc<crate::services::customers::CustomerService>,
    pub lookups: Arc<crate::services::lookups::LookupService>,
    pub offers: Arc<crate::services::offers::OfferService>,
    pub articles: Arc<crate::services::articles::ArticleService>,
    pub orders: Arc<crate::services::orders::OrderService>,
    pub employees: Arc<crate::services::employees::EmployeeService>,
    pub portal: Arc<crate::services::portal::PortalService>,
    pub dashboard: Arc<crate::services::dashboard::DashboardService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        portal_token_ttl: std::time::Duration,
    ) -> Self {
        let customers = Arc::new(crate::services::customers::CustomerService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let lookups = Arc::new(crate::services::lookups::LookupService::new(
            db_pool.clone(),
        ));
        let offers = Arc::new(crate::services::offers::OfferService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let articles = Arc::new(crate::services::articles::ArticleService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let orders = Arc::new(crate::services::orders::OrderService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let employees = Arc::new(crate::services::employees::EmployeeService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let portal = Arc::new(crate::services::portal::PortalService::new(
            db_pool.clone(),
            Some(event_sender),
            portal_token_ttl,
        ));
        let dashboard = Arc::new(crate::services::dashboard::DashboardService::new(db_pool));

        Self {
            customers,
            lookups,
            offers,
            articles,
            orders,
            employees,
            portal,
            dashboard,
        }
    }
}
