use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An order owned by exactly one customer and scoped to one tailor account.
///
/// `order_id` (human-readable code), `token_number` and `created_at` are
/// assigned once at creation and never change. `measurements` is a snapshot
/// of the registry fields for (gender, stitch_category) at creation time;
/// its keys never change even if the registry is later edited.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Human-readable code, e.g. TB2502030001; globally unique
    pub order_id: String,

    /// Small sequential display counter, unique per tailor
    pub token_number: i32,

    pub tailor_id: Uuid,
    pub customer_id: Uuid,
    pub gender: String,
    pub stitch_category: String,

    /// Field name -> value; empty string means unmeasured
    pub measurements: Json,

    pub work_description: Option<String>,
    pub due_date: Date,
    pub charges: Option<Decimal>,
    pub status: String,
    pub is_completed: bool,

    /// Cached public URL of the last generated bill artifact
    pub bill_url: Option<String>,

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
        belongs_to = "super::profile::Entity",
        from = "Column::TailorId",
        to = "super::profile::Column::Id"
    )]
    Profile,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
