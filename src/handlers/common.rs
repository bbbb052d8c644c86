use axum::{
    extract::Multipart,
    http::header,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::services::PageData;

/// Query parameters shared by every list endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    pub per_page: Option<u64>,
    pub search: Option<String>,
}

fn default_page() -> u64 {
    1
}

impl ListQuery {
    /// Page number, 1-based.
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    /// Requested page size clamped into the configured bounds.
    pub fn per_page(&self, config: &AppConfig) -> u64 {
        config.clamp_page_size(self.per_page.unwrap_or(config.api_default_page_size))
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

/// Pagination envelope returned by every list endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub last_page: u64,
}

impl<T> From<PageData<T>> for Paginated<T> {
    fn from(page: PageData<T>) -> Self {
        let last_page = if page.total == 0 {
            1
        } else {
            (page.total + page.per_page - 1) / page.per_page
        };
        Self {
            data: page.items,
            total: page.total,
            per_page: page.per_page,
            current_page: page.page,
            last_page,
        }
    }
}

/// Pull the first file field out of a multipart upload.
pub async fn read_upload(mut multipart: Multipart) -> Result<(String, Vec<u8>), ServiceError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServiceError::InvalidInput(format!("Failed to read upload: {}", e)))?;
        return Ok((filename, bytes.to_vec()));
    }

    Err(ServiceError::InvalidInput(
        "Request contains no file field".to_string(),
    ))
}

/// Stream stored attachment bytes back as a download.
pub fn file_response(filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (
                header::CONTENT_TYPE,
                "application/octet-stream".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(total: u64, per_page: u64, page: u64, items: usize) -> Paginated<u32> {
        Paginated::from(PageData {
            items: vec![0; items],
            total,
            page,
            per_page,
        })
    }

    #[test]
    fn last_page_rounds_up() {
        assert_eq!(page_of(31, 15, 1, 15).last_page, 3);
        assert_eq!(page_of(30, 15, 1, 15).last_page, 2);
        assert_eq!(page_of(1, 15, 1, 1).last_page, 1);
    }

    #[test]
    fn empty_result_still_reports_one_page() {
        let page = page_of(0, 15, 1, 0);
        assert_eq!(page.last_page, 1);
        assert_eq!(page.total, 0);
        assert!(page.data.is_empty());
    }
}
