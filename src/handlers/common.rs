use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::{
    config::AppConfig, errors::ApiError, repositories::Page, ApiResponse, PaginatedResponse,
};

/// Result of a handler that creates a resource.
pub type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// Result of a handler that deletes a resource.
pub type Deleted = Result<StatusCode, ApiError>;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

/// Standard no content response
pub fn no_content_response() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Pagination parameters for list operations
#[derive(Debug, Deserialize, Serialize, IntoParams)]
pub struct PaginationParams {
    /// Page number, starting at 1
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page; defaults to the configured page size
    pub per_page: Option<u64>,
}

fn default_page() -> u64 {
    1
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: None,
        }
    }
}

impl PaginationParams {
    /// Page number and page size, the latter clamped to the configured bounds.
    pub fn resolve(&self, config: &AppConfig) -> Result<(u64, u64), ApiError> {
        if self.page == 0 {
            return Err(ApiError::BadRequest("page starts at 1".to_string()));
        }
        Ok((self.page, config.page_size(self.per_page)))
    }
}

impl<T> From<Page<T>> for PaginatedResponse<T> {
    fn from(page: Page<T>) -> Self {
        let total_pages = page.total_pages();
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            limit: page.per_page,
            total_pages,
        }
    }
}

/// Wraps a service page into the list envelope.
pub fn page_response<T: Serialize>(page: Page<T>) -> Json<ApiResponse<PaginatedResponse<T>>> {
    success_response(PaginatedResponse::from(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "x".repeat(64),
            3600,
            "127.0.0.1".to_string(),
            8080,
            "development".to_string(),
        );
        cfg.api_default_page_size = 20;
        cfg.api_max_page_size = 100;
        cfg
    }

    #[test]
    fn page_size_is_clamped() {
        let cfg = config();
        let params = PaginationParams {
            page: 2,
            per_page: Some(1000),
        };
        assert_eq!(params.resolve(&cfg).unwrap(), (2, 100));
        assert_eq!(PaginationParams::default().resolve(&cfg).unwrap(), (1, 20));
    }

    #[test]
    fn page_zero_is_rejected() {
        let params = PaginationParams {
            page: 0,
            per_page: None,
        };
        assert!(matches!(
            params.resolve(&config()),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn page_converts_to_envelope() {
        let page = Page {
            items: vec![1, 2, 3],
            total: 23,
            page: 1,
            per_page: 3,
        };
        let response = PaginatedResponse::from(page);
        assert_eq!(response.total_pages, 8);
        assert_eq!(response.limit, 3);
        assert_eq!(response.items.len(), 3);
    }
}
