use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::profile::{
        self, ActiveModel as ProfileActiveModel, Entity as ProfileEntity, Model as ProfileModel,
    },
    errors::ServiceError,
};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Shop name is required"))]
    pub shop_name: String,
    #[validate(length(min = 1, message = "Owner name is required"))]
    pub owner_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Phone number is too short"))]
    pub phone_number: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "Shop name must not be empty"))]
    pub shop_name: Option<String>,
    #[validate(length(min = 1, message = "Owner name must not be empty"))]
    pub owner_name: Option<String>,
    #[validate(length(min = 6, message = "Phone number is too short"))]
    pub phone_number: Option<String>,
}

/// Service for tailor accounts. Email is the account key; registering an
/// email twice is a conflict, not an upsert.
#[derive(Clone)]
pub struct ProfileService {
    db: Arc<DbPool>,
}

impl ProfileService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<ProfileModel, ServiceError> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        let existing = ProfileEntity::find()
            .filter(profile::Column::Email.eq(email.as_str()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "An account already exists for {email}"
            )));
        }

        let model = ProfileActiveModel {
            id: Set(Uuid::new_v4()),
            shop_name: Set(request.shop_name.trim().to_string()),
            owner_name: Set(request.owner_name.trim().to_string()),
            email: Set(email),
            phone_number: Set(request.phone_number.trim().to_string()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(tailor_id = %model.id, "Registered new tailor account");
        Ok(model)
    }

    #[instrument(skip(self), fields(tailor_id = %tailor_id))]
    pub async fn get(&self, tailor_id: Uuid) -> Result<ProfileModel, ServiceError> {
        ProfileEntity::find_by_id(tailor_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Profile not found".to_string()))
    }

    /// Partial update; absent fields keep their value. Email is immutable.
    #[instrument(skip(self, request), fields(tailor_id = %tailor_id))]
    pub async fn update(
        &self,
        tailor_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<ProfileModel, ServiceError> {
        request.validate()?;

        let current = self.get(tailor_id).await?;
        let mut active: ProfileActiveModel = current.into();
        if let Some(shop_name) = request.shop_name {
            active.shop_name = Set(shop_name.trim().to_string());
        }
        if let Some(owner_name) = request.owner_name {
            active.owner_name = Set(owner_name.trim().to_string());
        }
        if let Some(phone_number) = request.phone_number {
            active.phone_number = Set(phone_number.trim().to_string());
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        Ok(updated)
    }
}
