//! Anonymous order tracking by order code.
//!
//! This is the only read surface that requires no authentication, so the
//! response is a strict allowlist: production progress, due date, garment
//! category, and the shop's contact details. No customer identity, no
//! measurements, no charges.

use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::order::{self, Entity as OrderEntity},
    entities::profile::Entity as ProfileEntity,
    errors::ServiceError,
    services::orders::StageState,
    stage::Stage,
};

/// Shop contact block shown on the tracking page.
#[derive(Debug, Serialize)]
pub struct ShopContact {
    pub shop_name: String,
    pub phone_number: String,
}

/// Public view of one order's production state.
#[derive(Debug, Serialize)]
pub struct TrackingView {
    pub order_id: String,
    pub status: Stage,
    pub is_completed: bool,
    pub progress: Vec<StageState>,
    pub due_date: NaiveDate,
    pub gender: String,
    pub stitch_category: String,
    pub shop: Option<ShopContact>,
}

#[derive(Clone)]
pub struct TrackingService {
    db: Arc<DbPool>,
}

impl TrackingService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Looks up an order by its human-readable code. The code is
    /// uppercased before lookup so customers can type it in any case.
    /// Returns `Ok(None)` for an unknown code; errors are reserved for
    /// infrastructure failures.
    #[instrument(skip(self), fields(code = %code))]
    pub async fn track(&self, code: &str) -> Result<Option<TrackingView>, ServiceError> {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Ok(None);
        }

        let found = OrderEntity::find()
            .filter(order::Column::OrderId.eq(code.as_str()))
            .one(&*self.db)
            .await?;

        let Some(order) = found else {
            return Ok(None);
        };

        let shop = self.shop_contact(order.tailor_id).await?;
        let status = Stage::parse(&order.status)?;
        let progress = Stage::pipeline()
            .map(|candidate| StageState {
                stage: candidate,
                label: candidate.label(),
                state: Stage::progress(status, candidate),
            })
            .collect();

        Ok(Some(TrackingView {
            order_id: order.order_id,
            status,
            is_completed: order.is_completed,
            progress,
            due_date: order.due_date,
            gender: order.gender,
            stitch_category: order.stitch_category,
            shop,
        }))
    }

    // A missing profile row degrades to `None` rather than failing the
    // lookup; the order state is still useful without shop contact.
    async fn shop_contact(&self, tailor_id: Uuid) -> Result<Option<ShopContact>, ServiceError> {
        let profile = ProfileEntity::find_by_id(tailor_id).one(&*self.db).await?;
        Ok(profile.map(|p| ShopContact {
            shop_name: p.shop_name,
            phone_number: p.phone_number,
        }))
    }
}
