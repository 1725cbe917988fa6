use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::customer::{Entity as CustomerEntity, Model as CustomerModel},
    entities::order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
    },
    errors::ServiceError,
    schema::{self, Gender},
    services::customers::CustomerService,
    services::reminders,
    stage::{Stage, StageProgress},
};

/// Prefix of every human-readable order code.
const ORDER_CODE_PREFIX: &str = "TB";

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub gender: Gender,
    #[validate(length(min = 1, message = "Garment category is required"))]
    pub stitch_category: String,
    /// Field name -> value; keys must belong to the registry definition for
    /// (gender, stitch_category). Missing fields are stored as empty strings.
    #[serde(default)]
    pub measurements: BTreeMap<String, String>,
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
    #[validate(length(min = 6, message = "Phone number is too short"))]
    pub customer_phone: String,
    pub work_description: Option<String>,
    pub due_date: NaiveDate,
    pub charges: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct CustomerSummary {
    pub name: String,
    pub phone_number: String,
}

/// One entry of the progress strip rendered next to an order.
#[derive(Debug, Serialize)]
pub struct StageState {
    pub stage: Stage,
    pub label: &'static str,
    pub state: StageProgress,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_id: String,
    pub token_number: i32,
    pub gender: String,
    pub stitch_category: String,
    pub measurements: BTreeMap<String, String>,
    pub work_description: Option<String>,
    pub due_date: NaiveDate,
    pub charges: Option<Decimal>,
    pub status: Stage,
    pub is_completed: bool,
    pub bill_url: Option<String>,
    pub created_at: chrono::DateTime<Utc>,
    pub customer: Option<CustomerSummary>,
    pub progress: Vec<StageState>,
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListFilter {
    pub search: Option<String>,
    pub status: Option<Stage>,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total: u64,
    pub active: u64,
    pub completed: u64,
    pub due_soon: u64,
    pub overdue: u64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    /// Five most recent orders
    pub recent_orders: Vec<OrderResponse>,
    /// Incomplete orders due exactly tomorrow
    pub due_tomorrow: Vec<OrderResponse>,
}

/// Service for managing orders: creation with customer dedup, tailor-scoped
/// reads, and production-status transitions.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    customers: CustomerService,
}

impl OrderService {
    pub fn new(db: Arc<DbPool>, customers: CustomerService) -> Self {
        Self { db, customers }
    }

    /// Creates a new order. Assigns the human-readable order code and the
    /// per-tailor token number server-side, snapshots the measurement schema
    /// for the chosen (gender, category), and reuses an existing customer
    /// row when the phone number is already known for this tailor.
    #[instrument(skip(self, request), fields(tailor_id = %tailor_id, category = %request.stitch_category))]
    pub async fn create_order(
        &self,
        tailor_id: Uuid,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let registry_fields = schema::fields(request.gender, &request.stitch_category)
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Unknown category '{}' for gender '{}'",
                    request.stitch_category, request.gender
                ))
            })?;

        for key in request.measurements.keys() {
            if !registry_fields.contains(&key.as_str()) {
                return Err(ServiceError::ValidationError(format!(
                    "Measurement field '{}' is not defined for {} {}",
                    key, request.gender, request.stitch_category
                )));
            }
        }

        // Schema snapshot: every registry field becomes a key, unmeasured
        // fields are stored as empty strings.
        let mut measurements = BTreeMap::new();
        for field in registry_fields {
            let value = request
                .measurements
                .get(*field)
                .cloned()
                .unwrap_or_default();
            measurements.insert(field.to_string(), value);
        }

        if !measurements.values().any(|v| !v.is_empty()) {
            return Err(ServiceError::ValidationError(
                "At least one measurement is required".to_string(),
            ));
        }

        let now = Utc::now();
        let today = now.date_naive();
        if request.due_date < today {
            return Err(ServiceError::ValidationError(
                "Due date must not be in the past".to_string(),
            ));
        }

        if let Some(charges) = request.charges {
            if charges < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Charges must not be negative".to_string(),
                ));
            }
        }

        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order creation");
            ServiceError::DatabaseError(e)
        })?;

        let customer = self
            .customers
            .find_or_create(
                &txn,
                tailor_id,
                request.customer_name.trim(),
                request.customer_phone.trim(),
            )
            .await?;

        // Daily sequence for the order code; global across tailors like the
        // code itself.
        let day_prefix = format!("{}{}", ORDER_CODE_PREFIX, today.format("%y%m%d"));
        let todays = OrderEntity::find()
            .filter(order::Column::OrderId.starts_with(day_prefix.as_str()))
            .count(&txn)
            .await?;
        let order_code = order_code(today, todays + 1);

        let token_number = OrderEntity::find()
            .filter(order::Column::TailorId.eq(tailor_id))
            .count(&txn)
            .await? as i32
            + 1;

        let measurements_json = serde_json::to_value(&measurements)
            .map_err(|e| ServiceError::InternalError(format!("Measurement encoding: {e}")))?;

        let work_description = request
            .work_description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let model = OrderActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_code.clone()),
            token_number: Set(token_number),
            tailor_id: Set(tailor_id),
            customer_id: Set(customer.id),
            gender: Set(request.gender.to_string()),
            stitch_category: Set(request.stitch_category.clone()),
            measurements: Set(measurements_json),
            work_description: Set(work_description),
            due_date: Set(request.due_date),
            charges: Set(request.charges),
            status: Set(Stage::INITIAL.to_string()),
            is_completed: Set(false),
            bill_url: Set(None),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, order_code = %order_code, "Failed to create order");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_code = %order_code, "Failed to commit order creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_code = %order_code, token = token_number, "Order created");
        Ok(model_to_response(model, Some(customer))?)
    }

    /// Fetches one order with its customer, scoped to the owning tailor.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(
        &self,
        tailor_id: Uuid,
        id: Uuid,
    ) -> Result<OrderResponse, ServiceError> {
        let found = OrderEntity::find_by_id(id)
            .filter(order::Column::TailorId.eq(tailor_id))
            .find_also_related(CustomerEntity)
            .one(&*self.db)
            .await?;

        match found {
            Some((order, customer)) => Ok(model_to_response(order, customer)?),
            None => Err(ServiceError::NotFound(format!("Order {id} not found"))),
        }
    }

    /// Lists the tailor's orders newest first, with optional search over the
    /// order code, customer name and phone, and an optional stage filter.
    #[instrument(skip(self), fields(tailor_id = %tailor_id, page = page, per_page = per_page))]
    pub async fn list_orders(
        &self,
        tailor_id: Uuid,
        page: u64,
        per_page: u64,
        filter: OrderListFilter,
    ) -> Result<OrderListResponse, ServiceError> {
        let mut query = OrderEntity::find()
            .find_also_related(CustomerEntity)
            .filter(order::Column::TailorId.eq(tailor_id))
            .order_by_desc(order::Column::CreatedAt);

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(order::Column::OrderId.contains(search.to_uppercase().as_str()))
                    .add(crate::entities::customer::Column::Name.contains(search))
                    .add(crate::entities::customer::Column::PhoneNumber.contains(search)),
            );
        }

        if let Some(status) = filter.status {
            query = query.filter(order::Column::Status.eq(status.to_string()));
        }

        let paginator = query.paginate(&*self.db, per_page.max(1));
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        let orders = rows
            .into_iter()
            .map(|(order, customer)| model_to_response(order, customer))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OrderListResponse {
            orders,
            total,
            page,
            per_page,
        })
    }

    /// Moves an order to the given production stage. Any stage in the
    /// pipeline may be selected, including regressions; the derived
    /// completion flag is kept in lockstep. Last write wins.
    #[instrument(skip(self), fields(order_id = %id, target = %target))]
    pub async fn set_status(
        &self,
        tailor_id: Uuid,
        id: Uuid,
        target: Stage,
    ) -> Result<OrderResponse, ServiceError> {
        let found = OrderEntity::find_by_id(id)
            .filter(order::Column::TailorId.eq(tailor_id))
            .find_also_related(CustomerEntity)
            .one(&*self.db)
            .await?;

        let (order, customer) = found.ok_or_else(|| {
            warn!(order_id = %id, "Order not found for status update");
            ServiceError::NotFound(format!("Order {id} not found"))
        })?;

        let old_status = order.status.clone();

        let mut active: OrderActiveModel = order.into();
        active.status = Set(target.to_string());
        active.is_completed = Set(target.is_terminal());
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await.map_err(|e| {
            error!(error = %e, order_id = %id, "Failed to persist status update");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %id, from = %old_status, to = %target, "Order stage updated");
        Ok(model_to_response(updated, customer)?)
    }

    /// Caches the generated bill URL on the order row.
    #[instrument(skip(self, url), fields(order_id = %id))]
    pub async fn set_bill_url(
        &self,
        tailor_id: Uuid,
        id: Uuid,
        url: &str,
    ) -> Result<(), ServiceError> {
        let order = OrderEntity::find_by_id(id)
            .filter(order::Column::TailorId.eq(tailor_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {id} not found")))?;

        let mut active: OrderActiveModel = order.into();
        active.bill_url = Set(Some(url.to_string()));
        active.updated_at = Set(Some(Utc::now()));
        active.update(&*self.db).await?;
        Ok(())
    }

    /// Raw order + customer pair, used by bill generation to snapshot fields.
    pub async fn find_with_customer(
        &self,
        tailor_id: Uuid,
        id: Uuid,
    ) -> Result<(OrderModel, CustomerModel), ServiceError> {
        let found = OrderEntity::find_by_id(id)
            .filter(order::Column::TailorId.eq(tailor_id))
            .find_also_related(CustomerEntity)
            .one(&*self.db)
            .await?;

        match found {
            Some((order, Some(customer))) => Ok((order, customer)),
            Some((order, None)) => Err(ServiceError::InternalError(format!(
                "Order {} has no customer row",
                order.order_id
            ))),
            None => Err(ServiceError::NotFound(format!("Order {id} not found"))),
        }
    }

    /// Dashboard rollup: stats, the five most recent orders, and the
    /// reminder list of incomplete orders due tomorrow.
    #[instrument(skip(self), fields(tailor_id = %tailor_id))]
    pub async fn dashboard(
        &self,
        tailor_id: Uuid,
        today: NaiveDate,
    ) -> Result<DashboardResponse, ServiceError> {
        let rows = OrderEntity::find()
            .find_also_related(CustomerEntity)
            .filter(order::Column::TailorId.eq(tailor_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let mut stats = DashboardStats {
            total: rows.len() as u64,
            active: 0,
            completed: 0,
            due_soon: 0,
            overdue: 0,
        };

        for (order, _) in &rows {
            if order.is_completed {
                stats.completed += 1;
            } else {
                stats.active += 1;
            }
            if reminders::is_due_soon(order.is_completed, order.due_date, today) {
                stats.due_soon += 1;
            }
            if reminders::is_overdue(order.is_completed, order.due_date, today) {
                stats.overdue += 1;
            }
        }

        let due_tomorrow = rows
            .iter()
            .filter(|(order, _)| {
                reminders::is_due_tomorrow(order.is_completed, order.due_date, today)
            })
            .map(|(order, customer)| model_to_response(order.clone(), customer.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        let recent_orders = rows
            .into_iter()
            .take(5)
            .map(|(order, customer)| model_to_response(order, customer))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DashboardResponse {
            stats,
            recent_orders,
            due_tomorrow,
        })
    }
}

/// Builds the human-readable order code: prefix, yymmdd, 4-digit daily
/// sequence.
fn order_code(date: NaiveDate, sequence: u64) -> String {
    format!("{}{}{:04}", ORDER_CODE_PREFIX, date.format("%y%m%d"), sequence)
}

fn model_to_response(
    model: OrderModel,
    customer: Option<CustomerModel>,
) -> Result<OrderResponse, ServiceError> {
    let status = Stage::parse(&model.status)?;
    let measurements: BTreeMap<String, String> = serde_json::from_value(model.measurements)
        .map_err(|e| ServiceError::InternalError(format!("Measurement decoding: {e}")))?;

    let progress = Stage::pipeline()
        .map(|candidate| StageState {
            stage: candidate,
            label: candidate.label(),
            state: Stage::progress(status, candidate),
        })
        .collect();

    Ok(OrderResponse {
        id: model.id,
        order_id: model.order_id,
        token_number: model.token_number,
        gender: model.gender,
        stitch_category: model.stitch_category,
        measurements,
        work_description: model.work_description,
        due_date: model.due_date,
        charges: model.charges,
        status,
        is_completed: model.is_completed,
        bill_url: model.bill_url,
        created_at: model.created_at,
        customer: customer.map(|c| CustomerSummary {
            name: c.name,
            phone_number: c.phone_number,
        }),
        progress,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_code_embeds_date_and_sequence() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        assert_eq!(order_code(date, 1), "TB2502030001");
        assert_eq!(order_code(date, 42), "TB2502030042");
    }

    #[test]
    fn progress_entries_serialize_with_static_labels() {
        let entry = StageState {
            stage: Stage::SewingSeams,
            label: Stage::SewingSeams.label(),
            state: StageProgress::Current,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["stage"], "sewing_seams");
        assert_eq!(value["label"], "Sewing Seams");
        assert_eq!(value["state"], "current");
    }

    #[test]
    fn order_code_is_uppercase_alphanumeric() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        let code = order_code(date, 9999);
        assert_eq!(code, "TB2612319999");
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
