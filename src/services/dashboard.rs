use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        article::{Column as ArticleColumn, Entity as ArticleEntity},
        customer::{Column as CustomerColumn, Entity as CustomerEntity},
        offer::{Column as OfferColumn, Entity as OfferEntity},
        production_order::{Column as OrderColumn, Entity as OrderEntity, OrderStatus},
    },
    errors::ServiceError,
};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub customer_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct TopEntry {
    pub id: Uuid,
    pub label: String,
    pub orders: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub orders: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub total_orders: u64,
    pub total_revenue: Decimal,
    pub orders_by_status: Vec<StatusCount>,
    pub top_customers: Vec<TopEntry>,
    pub top_articles: Vec<TopEntry>,
    pub trend: Vec<TrendPoint>,
    pub generated_at: DateTime<Utc>,
}

const TOP_ENTRIES: usize = 5;

/// Aggregates order counts, revenue and trends for the landing dashboard
#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Build the dashboard for a date range with optional customer and
    /// status filters. Orders are bucketed by creation date; revenue is
    /// order quantity times the article's unit price.
    #[instrument(skip(self))]
    pub async fn metrics(&self, query: DashboardQuery) -> Result<DashboardMetrics, ServiceError> {
        let db = &*self.db_pool;

        if let (Some(from), Some(to)) = (query.from, query.to) {
            if to < from {
                return Err(ServiceError::ValidationError(
                    "Date range end cannot precede its start".to_string(),
                ));
            }
        }

        let mut orders_query = OrderEntity::find().filter(OrderColumn::Removed.eq(false));

        if let Some(from) = query.from {
            let start = from.and_hms_opt(0, 0, 0).unwrap().and_utc();
            orders_query = orders_query.filter(OrderColumn::CreatedAt.gte(start));
        }
        if let Some(to) = query.to {
            let end = to.and_hms_opt(23, 59, 59).unwrap().and_utc();
            orders_query = orders_query.filter(OrderColumn::CreatedAt.lte(end));
        }
        if let Some(status) = query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            OrderStatus::from_str(status)
                .map_err(|_| ServiceError::InvalidStatus(format!("Unknown status: {}", status)))?;
            orders_query = orders_query.filter(OrderColumn::Status.eq(status));
        }

        let orders = orders_query
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        // Resolve the article -> offer -> customer chain for the selected
        // orders in three batched lookups.
        let article_ids: Vec<Uuid> = orders.iter().map(|o| o.article_id).collect();
        let articles: HashMap<Uuid, _> = ArticleEntity::find()
            .filter(ArticleColumn::Id.is_in(article_ids))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let offer_ids: Vec<Uuid> = articles.values().map(|a| a.offer_id).collect();
        let offers: HashMap<Uuid, _> = OfferEntity::find()
            .filter(OfferColumn::Id.is_in(offer_ids))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|o| (o.id, o))
            .collect();

        let customer_ids: Vec<Uuid> = offers.values().map(|o| o.customer_id).collect();
        let customers: HashMap<Uuid, _> = CustomerEntity::find()
            .filter(CustomerColumn::Id.is_in(customer_ids))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut total_orders = 0u64;
        let mut total_revenue = Decimal::ZERO;
        let mut by_status: HashMap<String, u64> = HashMap::new();
        let mut by_customer: HashMap<Uuid, (String, u64, Decimal)> = HashMap::new();
        let mut by_article: HashMap<Uuid, (String, u64, Decimal)> = HashMap::new();
        let mut by_day: HashMap<NaiveDate, (u64, Decimal)> = HashMap::new();

        for order in &orders {
            let Some(article) = articles.get(&order.article_id) else {
                continue;
            };
            let customer = offers
                .get(&article.offer_id)
                .and_then(|offer| customers.get(&offer.customer_id));

            if let Some(filter_customer) = query.customer_id {
                if customer.map(|c| c.id) != Some(filter_customer) {
                    continue;
                }
            }

            let revenue = article.unit_price * Decimal::from(order.quantity);

            total_orders += 1;
            total_revenue += revenue;
            *by_status.entry(order.status.clone()).or_default() += 1;

            if let Some(customer) = customer {
                let entry = by_customer
                    .entry(customer.id)
                    .or_insert_with(|| (customer.business_name.clone(), 0, Decimal::ZERO));
                entry.1 += 1;
                entry.2 += revenue;
            }

            let entry = by_article
                .entry(article.id)
                .or_insert_with(|| (article.cod_article_las.clone(), 0, Decimal::ZERO));
            entry.1 += 1;
            entry.2 += revenue;

            let day = order.created_at.date_naive();
            let bucket = by_day.entry(day).or_insert((0, Decimal::ZERO));
            bucket.0 += 1;
            bucket.1 += revenue;
        }

        let mut orders_by_status: Vec<StatusCount> = by_status
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect();
        orders_by_status.sort_by(|a, b| a.status.cmp(&b.status));

        let top_customers = top_entries(by_customer);
        let top_articles = top_entries(by_article);

        let mut trend: Vec<TrendPoint> = by_day
            .into_iter()
            .map(|(date, (orders, revenue))| TrendPoint {
                date,
                orders,
                revenue,
            })
            .collect();
        trend.sort_by_key(|point| point.date);

        info!(
            total_orders = total_orders,
            "Dashboard metrics generated"
        );

        Ok(DashboardMetrics {
            total_orders,
            total_revenue,
            orders_by_status,
            top_customers,
            top_articles,
            trend,
            generated_at: Utc::now(),
        })
    }
}

fn top_entries(source: HashMap<Uuid, (String, u64, Decimal)>) -> Vec<TopEntry> {
    let mut entries: Vec<TopEntry> = source
        .into_iter()
        .map(|(id, (label, orders, revenue))| TopEntry {
            id,
            label,
            orders,
            revenue,
        })
        .collect();
    entries.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    entries.truncate(TOP_ENTRIES);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn top_entries_sorts_by_revenue_and_truncates() {
        let mut source = HashMap::new();
        for i in 0..8u32 {
            source.insert(
                Uuid::new_v4(),
                (format!("entry-{}", i), u64::from(i), Decimal::from(i * 10)),
            );
        }

        let top = top_entries(source);
        assert_eq!(top.len(), TOP_ENTRIES);
        assert_eq!(top[0].revenue, dec!(70));
        assert!(top.windows(2).all(|w| w[0].revenue >= w[1].revenue));
    }
}
