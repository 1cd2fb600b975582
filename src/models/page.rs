//! Paginated list responses.

use serde::{Deserialize, Serialize};

/// One page of a listing, as returned by paginated endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub content: Vec<T>,
    /// Zero-based page index.
    #[serde(default)]
    pub number: u32,
    /// Requested page size.
    #[serde(default)]
    pub size: u32,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of items across all pages.
    #[serde(default)]
    pub total_elements: u64,
    /// Whether this is the first page.
    #[serde(default)]
    pub first: bool,
    /// Whether this is the last page.
    #[serde(default)]
    pub last: bool,
}

impl<T> Page<T> {
    /// Wraps a complete, unpaginated list as a single page.
    #[inline]
    #[must_use]
    pub fn single(content: Vec<T>) -> Self {
        let len = content.len();
        Self {
            content,
            number: 0,
            size: u32::try_from(len).unwrap_or(u32::MAX),
            total_pages: 1,
            total_elements: u64::try_from(len).unwrap_or(u64::MAX),
            first: true,
            last: true,
        }
    }

    /// Whether the page holds no items.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Either a page object or a bare JSON array.
///
/// Some endpoints paginate and some return every row; both are accepted
/// and normalised into a [`Page`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    /// Paginated response.
    Paged(Page<T>),
    /// Plain array.
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    /// Converts the response into a page.
    pub(crate) fn into_page(self) -> Page<T> {
        match self {
            Self::Paged(page) => page,
            Self::Plain(items) => Page::single(items),
        }
    }
}
