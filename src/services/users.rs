use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthService,
    db::DbPool,
    errors::ServiceError,
    models::user::{self, UserRole},
    repositories::{find_owned, paginate, Page, TenantScoped},
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub role: UserRole,
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub active: Option<bool>,
}

/// A user as shown by the API; never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserView {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub active: bool,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

impl From<user::Model> for UserView {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            tenant_id: user.tenant_id,
            name: user.name,
            email: user.email,
            role: user.role,
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: UserFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<UserView>, ServiceError> {
        let mut query = user::Entity::find_in_tenant(tenant_id);
        if let Some(role) = filter.role {
            query = query.filter(user::Column::Role.eq(role));
        }
        if let Some(active) = filter.active {
            query = query.filter(user::Column::Active.eq(active));
        }
        let page = paginate(
            &*self.db_pool,
            query.order_by_asc(user::Column::Name),
            page,
            per_page,
        )
        .await?;
        Ok(page.map(UserView::from))
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<UserView, ServiceError> {
        find_owned::<user::Entity, _>(&*self.db_pool, tenant_id, id)
            .await
            .map(UserView::from)
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: CreateUserInput,
    ) -> Result<UserView, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;
        let email = input.email.trim().to_lowercase();

        let taken = user::Entity::find()
            .filter(user::Column::Email.eq(email.clone()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if taken.is_some() {
            return Err(ServiceError::Conflict(format!(
                "email {} is already registered",
                email
            )));
        }

        let now = Utc::now();
        let created = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(input.name.trim().to_string()),
            email: Set(email),
            password_hash: Set(AuthService::hash_password(&input.password)?),
            role: Set(input.role),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(user_id = %created.id, role = created.role.as_str(), "user created");
        Ok(created.into())
    }

    /// Changes name, role and active flag. `acting_user` cannot deactivate itself.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        acting_user: Uuid,
        id: Uuid,
        input: UpdateUserInput,
    ) -> Result<UserView, ServiceError> {
        input.validate()?;
        if id == acting_user && !input.active {
            return Err(ServiceError::InvalidOperation(
                "you cannot deactivate your own user".to_string(),
            ));
        }
        let db = &*self.db_pool;
        let existing = find_owned::<user::Entity, _>(db, tenant_id, id).await?;

        let mut active: user::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.role = Set(input.role);
        active.active = Set(input.active);
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        info!(user_id = %id, role = updated.role.as_str(), active = updated.active, "user updated");
        Ok(updated.into())
    }
}
