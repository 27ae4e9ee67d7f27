//! Tenant-scoped query helpers shared by the services.

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, PrimaryKeyTrait, QueryFilter,
    Select,
};
use uuid::Uuid;

use crate::errors::ServiceError;

/// An entity whose rows belong to a tenant.
pub trait TenantScoped: EntityTrait {
    /// Human-readable name used in not-found messages.
    const LABEL: &'static str;

    fn tenant_column() -> Self::Column;

    /// `SELECT` restricted to one tenant.
    fn find_in_tenant(tenant_id: Uuid) -> Select<Self> {
        Self::find().filter(Self::tenant_column().eq(tenant_id))
    }
}

/// Loads a row by id within the tenant. Rows of other tenants are reported as missing.
pub async fn find_owned<E, C>(db: &C, tenant_id: Uuid, id: Uuid) -> Result<E::Model, ServiceError>
where
    E: TenantScoped,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    E::find_by_id(id)
        .filter(E::tenant_column().eq(tenant_id))
        .one(db)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::not_found(E::LABEL, id))
}

/// Like [`find_owned`] but a missing reference inside a request body is a bad input,
/// not a missing resource.
pub async fn find_referenced<E, C>(
    db: &C,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<E::Model, ServiceError>
where
    E: TenantScoped,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    match find_owned::<E, C>(db, tenant_id, id).await {
        Err(ServiceError::NotFound(_)) => Err(ServiceError::ValidationError(format!(
            "{} {} does not exist",
            E::LABEL,
            id
        ))),
        other => other,
    }
}

/// One page of a query plus the total number of matching rows.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            0
        } else {
            (self.total + self.per_page - 1) / self.per_page
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Fetches a 1-based page of `select`.
pub async fn paginate<E, C>(
    db: &C,
    select: Select<E>,
    page: u64,
    per_page: u64,
) -> Result<Page<E::Model>, ServiceError>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
    C: ConnectionTrait,
{
    let page = page.max(1);
    let paginator = select.paginate(db, per_page.max(1));
    let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
    let items = paginator
        .fetch_page(page - 1)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(Page {
        items,
        total,
        page,
        per_page,
    })
}

/// Counts tenant rows matching `column = value`; used by delete guards.
pub async fn count_where<E, C, V>(
    db: &C,
    tenant_id: Uuid,
    column: E::Column,
    value: V,
) -> Result<u64, ServiceError>
where
    E: TenantScoped,
    E::Model: Send + Sync + 'static,
    C: ConnectionTrait,
    V: Into<sea_orm::Value>,
{
    E::find_in_tenant(tenant_id)
        .filter(column.eq(value))
        .count(db)
        .await
        .map_err(ServiceError::db_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::<u8> {
            items: vec![],
            total: 41,
            page: 1,
            per_page: 20,
        };
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let page = Page::<u8> {
            items: vec![],
            total: 0,
            page: 1,
            per_page: 20,
        };
        assert_eq!(page.total_pages(), 0);
    }
}
