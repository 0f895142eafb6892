//! Paginated list envelope.

use serde::{Deserialize, Serialize};

/// One page of a listing, as returned by the list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub size: u32,
    /// Zero-based page index
    pub number: u32,
    pub first: bool,
    pub last: bool,
}

/// Query parameters for a list call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub const DEFAULT_SIZE: u32 = 10;

    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size: size.max(1) }
    }

    /// `?page=N&size=M` suffix for the list path.
    pub fn query(&self) -> String {
        format!("?page={}&size={}", self.page, self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: Self::DEFAULT_SIZE }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_query() {
        assert_eq!(PageRequest::default().query(), "?page=0&size=10");
        assert_eq!(PageRequest::new(2, 0).query(), "?page=2&size=1");
    }

    #[test]
    fn deserializes_spring_style_page() {
        let page: Page<String> = serde_json::from_str(
            r#"{"content":["a","b"],"totalElements":12,"totalPages":6,"size":2,"number":0,"first":true,"last":false}"#,
        )
        .unwrap();
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.total_elements, 12);
        assert!(page.first && !page.last);
    }
}
