use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    errors::ServiceError,
    models::{
        account_payable, account_receivable, buy, customer, customer::CustomerKind,
        industry_sale, maintenance, purchase, purchase_order, sale_contract, sale_exit,
    },
    repositories::{count_where, find_owned, paginate, Page, TenantScoped},
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CustomerInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// CPF (11 digits) or CNPJ (14 digits); punctuation is ignored.
    pub document: String,
    pub kind: CustomerKind,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub city: Option<String>,
    #[validate(length(max = 2))]
    pub state: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct CustomerFilter {
    pub kind: Option<CustomerKind>,
    /// Case-sensitive substring of the name or the document.
    pub search: Option<String>,
}

/// Keeps the digits of a CPF/CNPJ, rejecting anything that is neither.
pub fn normalize_document(document: &str) -> Result<String, ServiceError> {
    let digits: String = document.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        11 | 14 => Ok(digits),
        _ => Err(ServiceError::ValidationError(format!(
            "document {} is neither a CPF nor a CNPJ",
            document
        ))),
    }
}

#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: CustomerFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<customer::Model>, ServiceError> {
        use customer::Column;

        let mut query = customer::Entity::find_in_tenant(tenant_id);
        if let Some(kind) = filter.kind {
            query = query.filter(Column::Kind.eq(kind));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            let search = search.trim().to_string();
            query = query.filter(
                Column::Name
                    .contains(search.as_str())
                    .or(Column::Document.contains(search.as_str())),
            );
        }
        paginate(&*self.db_pool, query.order_by_asc(Column::Name), page, per_page).await
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<customer::Model, ServiceError> {
        find_owned::<customer::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: CustomerInput,
    ) -> Result<customer::Model, ServiceError> {
        input.validate()?;
        let document = normalize_document(&input.document)?;
        let db = &*self.db_pool;
        ensure_document_free(db, tenant_id, &document, None).await?;

        let now = Utc::now();
        let created = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(input.name.trim().to_string()),
            document: Set(document),
            kind: Set(input.kind),
            email: Set(input.email),
            phone: Set(input.phone),
            city: Set(input.city),
            state: Set(input.state.map(|s| s.to_uppercase())),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(customer_id = %created.id, "customer created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: CustomerInput,
    ) -> Result<customer::Model, ServiceError> {
        input.validate()?;
        let document = normalize_document(&input.document)?;
        let db = &*self.db_pool;
        let existing = find_owned::<customer::Entity, _>(db, tenant_id, id).await?;
        ensure_document_free(db, tenant_id, &document, Some(id)).await?;

        let mut active: customer::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.document = Set(document);
        active.kind = Set(input.kind);
        active.email = Set(input.email);
        active.phone = Set(input.phone);
        active.city = Set(input.city);
        active.state = Set(input.state.map(|s| s.to_uppercase()));
        active.notes = Set(input.notes);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = find_owned::<customer::Entity, _>(db, tenant_id, id).await?;

        let references = [
            count_where::<sale_contract::Entity, _, _>(
                db,
                tenant_id,
                sale_contract::Column::CustomerId,
                id,
            )
            .await?,
            count_where::<purchase_order::Entity, _, _>(
                db,
                tenant_id,
                purchase_order::Column::SupplierId,
                id,
            )
            .await?,
            count_where::<purchase::Entity, _, _>(db, tenant_id, purchase::Column::SupplierId, id)
                .await?,
            count_where::<buy::Entity, _, _>(db, tenant_id, buy::Column::SupplierId, id).await?,
            count_where::<sale_exit::Entity, _, _>(db, tenant_id, sale_exit::Column::CustomerId, id)
                .await?,
            count_where::<industry_sale::Entity, _, _>(
                db,
                tenant_id,
                industry_sale::Column::CustomerId,
                id,
            )
            .await?,
            count_where::<maintenance::Entity, _, _>(
                db,
                tenant_id,
                maintenance::Column::SupplierId,
                id,
            )
            .await?,
            count_where::<account_receivable::Entity, _, _>(
                db,
                tenant_id,
                account_receivable::Column::CustomerId,
                id,
            )
            .await?,
            count_where::<account_payable::Entity, _, _>(
                db,
                tenant_id,
                account_payable::Column::SupplierId,
                id,
            )
            .await?,
        ];
        if references.iter().any(|count| *count > 0) {
            return Err(ServiceError::Conflict(format!(
                "customer {} is referenced by other records",
                existing.name
            )));
        }

        existing.delete(db).await.map_err(ServiceError::db_error)?;
        info!(customer_id = %id, "customer deleted");
        Ok(())
    }
}

async fn ensure_document_free<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    document: &str,
    except: Option<Uuid>,
) -> Result<(), ServiceError> {
    let mut query = customer::Entity::find_in_tenant(tenant_id)
        .filter(customer::Column::Document.eq(document));
    if let Some(id) = except {
        query = query.filter(customer::Column::Id.ne(id));
    }
    if query.count(db).await.map_err(ServiceError::db_error)? > 0 {
        return Err(ServiceError::Conflict(format!(
            "a customer with document {} already exists",
            document
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("123.456.789-09", Some("12345678909"))]
    #[case("12.345.678/0001-95", Some("12345678000195"))]
    #[case("12345", None)]
    #[case("", None)]
    fn documents_are_normalized_to_digits(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_document(raw).ok().as_deref(), expected);
    }
}
