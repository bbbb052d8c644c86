use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque portal session token. Only the SHA-256 digest of the token is
/// stored; the clear value is returned to the client once at login.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employee_portal_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub employee_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl Model {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(revoked: bool, expires_in: Duration) -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            token_hash: "abc".into(),
            created_at: now,
            expires_at: now + expires_in,
            revoked,
        }
    }

    #[test]
    fn expired_or_revoked_tokens_are_unusable() {
        let now = Utc::now();
        assert!(token(false, Duration::hours(1)).is_usable(now));
        assert!(!token(true, Duration::hours(1)).is_usable(now));
        assert!(!token(false, Duration::hours(-1)).is_usable(now));
    }
}
