use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "customer_shipping_addresses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub division_id: Uuid,

    #[validate(length(min = 1, max = 150, message = "Label must be between 1 and 150 characters"))]
    pub label: String,

    #[validate(length(min = 1, max = 255, message = "Address is required"))]
    pub address: String,

    #[validate(length(min = 1, max = 150, message = "City is required"))]
    pub city: String,

    #[validate(regex(
        path = "crate::validation::POSTAL_CODE_RE",
        message = "Postal code must be 5 digits"
    ))]
    pub postal_code: String,

    #[validate(regex(
        path = "crate::validation::PROVINCE_RE",
        message = "Province must be a 2-letter code"
    ))]
    pub province: String,

    pub is_default: bool,

    pub removed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer_division::Entity",
        from = "Column::DivisionId",
        to = "super::customer_division::Column::Id"
    )]
    Division,
    #[sea_orm(has_many = "super::production_order::Entity")]
    ProductionOrder,
}

impl Related<super::customer_division::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Division.def()
    }
}

impl Related<super::production_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductionOrder.def()
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
