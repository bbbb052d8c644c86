use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Manufactured article. `cod_article_las` is unique among non-removed rows
/// and strictly incrementing inside its family; `line_layout` is the stored
/// filename of the attached layout drawing, scoped under this row's UUID.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub offer_id: Uuid,
    pub category_id: Option<Uuid>,
    pub pallet_type_id: Option<Uuid>,

    #[validate(regex(
        path = "crate::validation::LAS_CODE_RE",
        message = "Article code must match LAS{family}{4-digit sequence}"
    ))]
    pub cod_article_las: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Description must be between 1 and 255 characters"
    ))]
    pub description: String,

    pub unit_price: Decimal,

    #[validate(range(min = 1, message = "Pieces per pallet must be positive"))]
    pub pieces_per_pallet: Option<i32>,

    pub line_layout: Option<String>,

    pub removed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::offer::Entity",
        from = "Column::OfferId",
        to = "super::offer::Column::Id"
    )]
    Offer,
    #[sea_orm(
        belongs_to = "super::article_category::Entity",
        from = "Column::CategoryId",
        to = "super::article_category::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::pallet_type::Entity",
        from = "Column::PalletTypeId",
        to = "super::pallet_type::Column::Id"
    )]
    PalletType,
    #[sea_orm(has_many = "super::production_order::Entity")]
    ProductionOrder,
    #[sea_orm(has_many = "super::article_instruction::Entity")]
    Instruction,
    #[sea_orm(has_many = "super::article_material::Entity")]
    ArticleMaterial,
    #[sea_orm(has_many = "super::article_machinery::Entity")]
    ArticleMachinery,
    #[sea_orm(has_many = "super::article_critical_issue::Entity")]
    ArticleCriticalIssue,
}

impl Related<super::offer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offer.def()
    }
}

impl Related<super::pallet_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PalletType.def()
    }
}

impl Related<super::production_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductionOrder.def()
    }
}

impl Related<super::article_instruction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instruction.def()
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
