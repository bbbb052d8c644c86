use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, FromJsonQueryResult, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

/// Production order lifecycle. Stored as its display string so the column
/// stays readable in the database and in API payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum OrderStatus {
    #[strum(serialize = "Pianificato")]
    #[serde(rename = "Pianificato")]
    Pianificato,
    #[strum(serialize = "Lanciato")]
    #[serde(rename = "Lanciato")]
    Lanciato,
    #[strum(serialize = "In Avanzamento")]
    #[serde(rename = "In Avanzamento")]
    InAvanzamento,
    #[strum(serialize = "Evaso")]
    #[serde(rename = "Evaso")]
    Evaso,
    #[strum(serialize = "Sospeso")]
    #[serde(rename = "Sospeso")]
    Sospeso,
}

impl OrderStatus {
    /// Whether logging worked quantity should advance this status to
    /// `InAvanzamento`.
    pub fn advances_on_work(&self) -> bool {
        matches!(self, OrderStatus::Pianificato | OrderStatus::Lanciato)
    }
}

/// Three-light readiness indicator carried as a JSON column. Each light is
/// 0 (missing), 1 (in preparation) or 2 (ready).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StatusSemaforo {
    pub etichette: u8,
    pub packaging: u8,
    pub prodotto: u8,
}

impl StatusSemaforo {
    pub fn is_valid(&self) -> bool {
        self.etichette <= 2 && self.packaging <= 2 && self.prodotto <= 2
    }
}

/// Production order. `order_production_number` is unique among non-removed
/// rows and sequential per year (`YYYY.NNNN`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "production_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub article_id: Uuid,
    pub shipping_address_id: Option<Uuid>,

    #[validate(regex(
        path = "crate::validation::PRODUCTION_NUMBER_RE",
        message = "Production number must match YYYY.NNNN"
    ))]
    pub order_production_number: String,

    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i32,

    #[validate(range(min = 0, message = "Worked quantity cannot be negative"))]
    pub worked_quantity: i32,

    pub delivery_date: Option<Date>,

    pub status: String,

    #[sea_orm(column_type = "Json")]
    pub status_semaforo: StatusSemaforo,

    pub notes: Option<String>,

    pub removed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// Progress percentage for display, rounded and clamped to 100.
    pub fn progress_percent(&self) -> u32 {
        if self.quantity <= 0 {
            return 0;
        }
        let ratio = f64::from(self.worked_quantity) / f64::from(self.quantity) * 100.0;
        (ratio.round() as u32).min(100)
    }

    /// Quantity still to be produced, floored at zero.
    pub fn remaining_quantity(&self) -> i32 {
        (self.quantity - self.worked_quantity).max(0)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::article::Entity",
        from = "Column::ArticleId",
        to = "super::article::Column::Id"
    )]
    Article,
    #[sea_orm(
        belongs_to = "super::customer_shipping_address::Entity",
        from = "Column::ShippingAddressId",
        to = "super::customer_shipping_address::Column::Id"
    )]
    ShippingAddress,
    #[sea_orm(has_many = "super::production_log::Entity")]
    ProductionLog,
    #[sea_orm(has_many = "super::order_assignment::Entity")]
    OrderAssignment,
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
    }
}

impl Related<super::customer_shipping_address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShippingAddress.def()
    }
}

impl Related<super::production_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductionLog.def()
    }
}

impl Related<super::order_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderAssignment.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        let now = Utc::now();

        if insert {
            active_model.created_at = Set(now);
        }

        if let ActiveValue::NotSet = active_model.updated_at {
            active_model.updated_at = Set(Some(now));
        }

        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn order_with(quantity: i32, worked: i32) -> Model {
        Model {
            id: Uuid::new_v4(),
            article_id: Uuid::new_v4(),
            shipping_address_id: None,
            order_production_number: "2025.0001".to_string(),
            quantity,
            worked_quantity: worked,
            delivery_date: None,
            status: OrderStatus::Pianificato.to_string(),
            status_semaforo: StatusSemaforo::default(),
            notes: None,
            removed: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn status_round_trips_through_string() {
        for status in [
            OrderStatus::Pianificato,
            OrderStatus::Lanciato,
            OrderStatus::InAvanzamento,
            OrderStatus::Evaso,
            OrderStatus::Sospeso,
        ] {
            let as_string = status.to_string();
            assert_eq!(OrderStatus::from_str(&as_string).unwrap(), status);
        }
    }

    #[test]
    fn only_early_statuses_advance_on_work() {
        assert!(OrderStatus::Pianificato.advances_on_work());
        assert!(OrderStatus::Lanciato.advances_on_work());
        assert!(!OrderStatus::InAvanzamento.advances_on_work());
        assert!(!OrderStatus::Evaso.advances_on_work());
        assert!(!OrderStatus::Sospeso.advances_on_work());
    }

    #[test]
    fn progress_is_rounded_and_clamped() {
        assert_eq!(order_with(300, 100).progress_percent(), 33);
        assert_eq!(order_with(300, 200).progress_percent(), 67);
        assert_eq!(order_with(100, 150).progress_percent(), 100);
        assert_eq!(order_with(0, 10).progress_percent(), 0);
    }

    #[test]
    fn remaining_quantity_floors_at_zero() {
        assert_eq!(order_with(100, 30).remaining_quantity(), 70);
        assert_eq!(order_with(100, 150).remaining_quantity(), 0);
    }

    #[test]
    fn semaphore_levels_are_bounded() {
        let ok = StatusSemaforo {
            etichette: 0,
            packaging: 1,
            prodotto: 2,
        };
        assert!(ok.is_valid());

        let bad = StatusSemaforo {
            etichette: 3,
            ..Default::default()
        };
        assert!(!bad.is_valid());
    }
}
