use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Commercial offer. `offer_number` is unique among non-removed rows and
/// follows `YYYY_NNN_NN_A` (year, yearly sequence, revision block, revision
/// letter).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "offers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub customer_id: Uuid,
    pub customer_division_id: Uuid,

    pub activity_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub seasonality_id: Option<Uuid>,
    pub order_type_id: Option<Uuid>,
    pub las_family_id: Uuid,
    pub las_work_line_id: Option<Uuid>,
    pub ls_resource_id: Option<Uuid>,

    #[validate(regex(
        path = "crate::validation::OFFER_NUMBER_RE",
        message = "Offer number must match YYYY_NNN_NN_A"
    ))]
    pub offer_number: String,

    pub offer_date: Date,
    pub status: Option<String>,
    pub notes: Option<String>,

    pub removed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::customer_division::Entity",
        from = "Column::CustomerDivisionId",
        to = "super::customer_division::Column::Id"
    )]
    Division,
    #[sea_orm(
        belongs_to = "super::las_family::Entity",
        from = "Column::LasFamilyId",
        to = "super::las_family::Column::Id"
    )]
    LasFamily,
    #[sea_orm(has_many = "super::article::Entity")]
    Article,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::customer_division::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Division.def()
    }
}

impl Related<super::las_family::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LasFamily.def()
    }
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
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
