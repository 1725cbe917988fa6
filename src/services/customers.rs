use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::customer::{self, Entity as CustomerEntity, Model as CustomerModel},
    errors::ServiceError,
};

/// Service for the tailor's customer book.
#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DbPool>,
}

impl CustomerService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Finds the customer with this phone number in the tailor's scope, or
    /// creates one. The phone number is the dedup key; lookups never cross
    /// tailor boundaries.
    ///
    /// Takes the connection explicitly so order creation can run it inside
    /// its own transaction.
    #[instrument(skip(self, conn), fields(tailor_id = %tailor_id, phone = %phone_number))]
    pub async fn find_or_create<C: ConnectionTrait>(
        &self,
        conn: &C,
        tailor_id: Uuid,
        name: &str,
        phone_number: &str,
    ) -> Result<CustomerModel, ServiceError> {
        let existing = CustomerEntity::find()
            .filter(customer::Column::TailorId.eq(tailor_id))
            .filter(customer::Column::PhoneNumber.eq(phone_number))
            .one(conn)
            .await?;

        if let Some(found) = existing {
            return Ok(found);
        }

        let model = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            tailor_id: Set(tailor_id),
            name: Set(name.to_string()),
            phone_number: Set(phone_number.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(conn)
        .await?;

        info!(customer_id = %model.id, "Created new customer");
        Ok(model)
    }

    /// Lists the tailor's customers, most recent first.
    #[instrument(skip(self), fields(tailor_id = %tailor_id))]
    pub async fn list(&self, tailor_id: Uuid) -> Result<Vec<CustomerModel>, ServiceError> {
        let customers = CustomerEntity::find()
            .filter(customer::Column::TailorId.eq(tailor_id))
            .order_by_desc(customer::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(customers)
    }
}
