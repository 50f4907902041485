use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use entity::verification_request;

use super::{now_ts, VerificationStore};
use crate::error::RegistrarError;
use crate::submission::NewVerificationRequest;
use crate::VerificationRequest;

/// SeaORM-backed store over the `verification_requests` table.
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VerificationStore for SeaOrmStore {
    async fn create(
        &self,
        request: NewVerificationRequest,
    ) -> Result<VerificationRequest, RegistrarError> {
        let active = verification_request::ActiveModel {
            id: NotSet,
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            institution_name: Set(request.institution_name),
            institution_address: Set(request.institution_address),
            role: Set(request.role),
            email: Set(request.email),
            is_verified: Set(false),
            created_at: Set(now_ts()),
        };

        Ok(active.insert(&self.db).await?)
    }

    async fn list_pending(&self) -> Result<Vec<VerificationRequest>, RegistrarError> {
        let pending = verification_request::Entity::find()
            .filter(verification_request::Column::IsVerified.eq(false))
            .order_by_asc(verification_request::Column::Id)
            .all(&self.db)
            .await?;
        Ok(pending)
    }

    async fn get_by_id(&self, id: i32) -> Result<VerificationRequest, RegistrarError> {
        verification_request::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RegistrarError::NotFound(id))
    }

    async fn mark_verified(&self, id: i32) -> Result<VerificationRequest, RegistrarError> {
        let found = self.get_by_id(id).await?;
        if found.is_verified {
            return Ok(found);
        }

        let mut active: verification_request::ActiveModel = found.into();
        active.is_verified = Set(true);

        Ok(active.update(&self.db).await?)
    }
}
