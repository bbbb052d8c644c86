use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Business name must be between 1 and 255 characters"
    ))]
    pub business_name: String,

    #[validate(regex(
        path = "crate::validation::VAT_NUMBER_RE",
        message = "VAT number must be 11 digits"
    ))]
    pub vat_number: String,

    pub tax_code: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,

    #[validate(regex(
        path = "crate::validation::POSTAL_CODE_RE",
        message = "Postal code must be 5 digits"
    ))]
    pub postal_code: Option<String>,

    #[validate(regex(
        path = "crate::validation::PROVINCE_RE",
        message = "Province must be a 2-letter code"
    ))]
    pub province: Option<String>,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,

    pub removed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::customer_division::Entity")]
    CustomerDivision,
    #[sea_orm(has_many = "super::offer::Entity")]
    Offer,
}

impl Related<super::customer_division::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomerDivision.def()
    }
}

impl Related<super::offer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offer.def()
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
