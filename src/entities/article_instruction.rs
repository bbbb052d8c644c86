use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter as StrumEnumIter, EnumString};
use uuid::Uuid;
use validator::Validate;

/// Instruction sheet kinds. The short prefix is embedded in the generated
/// instruction code (`IC0001`, `IP0042`, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, StrumEnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InstructionKind {
    Ic,
    Io,
    Ip,
    Packaging,
    Operating,
    Palletizing,
}

impl InstructionKind {
    /// Code prefix for this kind of instruction.
    pub fn code_prefix(&self) -> &'static str {
        match self {
            InstructionKind::Ic => "IC",
            InstructionKind::Io => "IO",
            InstructionKind::Ip => "IP",
            InstructionKind::Packaging => "IMB",
            InstructionKind::Operating => "OP",
            InstructionKind::Palletizing => "PAL",
        }
    }
}

/// Work instruction attached to an article. `document` is the stored PDF
/// filename, scoped under this row's UUID.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "article_instructions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub article_id: Uuid,

    /// One of the `InstructionKind` snake_case names.
    pub kind: String,

    #[validate(regex(
        path = "crate::validation::INSTRUCTION_CODE_RE",
        message = "Instruction code must match {prefix}{4-digit sequence}"
    ))]
    pub code: String,

    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    pub document: Option<String>,
    pub notes: Option<String>,

    pub removed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::article::Entity",
        from = "Column::ArticleId",
        to = "super::article::Column::Id"
    )]
    Article,
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kind_round_trips_through_string() {
        for kind in [
            InstructionKind::Ic,
            InstructionKind::Io,
            InstructionKind::Ip,
            InstructionKind::Packaging,
            InstructionKind::Operating,
            InstructionKind::Palletizing,
        ] {
            let as_string = kind.to_string();
            assert_eq!(InstructionKind::from_str(&as_string).unwrap(), kind);
        }
    }

    #[test]
    fn prefixes_are_uppercase_and_short() {
        use strum::IntoEnumIterator;
        for kind in InstructionKind::iter() {
            let prefix = kind.code_prefix();
            assert!(prefix.len() >= 2 && prefix.len() <= 3);
            assert!(prefix.chars().all(|c| c.is_ascii_uppercase()));
        }
    }
}
