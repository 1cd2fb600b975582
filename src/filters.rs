//! Listing filters, client-held pagination and the query parameters they
//! produce.

use chrono::NaiveDate;

use crate::models::{CategoryId, Page, TransactionType};

/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A query-string parameter list.
pub type Params = Vec<(&'static str, String)>;

/// A single transaction filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionFilter {
    /// Case-insensitive name substring.
    Name(String),
    /// Earliest date (inclusive).
    StartDate(NaiveDate),
    /// Latest date (inclusive).
    EndDate(NaiveDate),
    /// Category.
    Category(CategoryId),
    /// Transaction type.
    Type(TransactionType),
}

/// Filters applied to the transaction listing and export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilters {
    /// Name substring; empty means unset.
    pub name: Option<String>,
    /// Earliest date.
    pub start_date: Option<NaiveDate>,
    /// Latest date.
    pub end_date: Option<NaiveDate>,
    /// Category.
    pub category_id: Option<CategoryId>,
    /// Transaction type.
    pub transaction_type: Option<TransactionType>,
}

impl TransactionFilters {
    /// Sets one filter, replacing its previous value.
    #[inline]
    pub fn set(&mut self, filter: TransactionFilter) {
        match filter {
            TransactionFilter::Name(name) => self.name = Some(name),
            TransactionFilter::StartDate(date) => self.start_date = Some(date),
            TransactionFilter::EndDate(date) => self.end_date = Some(date),
            TransactionFilter::Category(id) => self.category_id = Some(id),
            TransactionFilter::Type(kind) => self.transaction_type = Some(kind),
        }
    }

    /// Resets every filter.
    #[inline]
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether no filter would reach the query string.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params().is_empty()
    }

    /// Query parameters for the set filters, in a stable order.
    #[inline]
    #[must_use]
    pub fn params(&self) -> Params {
        let mut params = Params::new();
        if let Some(name) = self.name.as_deref().filter(|name| !name.is_empty()) {
            params.push(("name", name.to_owned()));
        }
        if let Some(date) = self.start_date {
            params.push(("startDate", date.to_string()));
        }
        if let Some(date) = self.end_date {
            params.push(("endDate", date.to_string()));
        }
        if let Some(id) = self.category_id {
            params.push(("categoryId", id.to_string()));
        }
        if let Some(kind) = self.transaction_type {
            params.push(("transactionType", kind.as_str().to_owned()));
        }
        params
    }
}

/// Filters applied to the monthly planning listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanningFilters {
    /// Month, 1-12.
    pub month: Option<u32>,
    /// Year.
    pub year: Option<i32>,
    /// Category.
    pub category_id: Option<CategoryId>,
}

impl PlanningFilters {
    /// Resets every filter.
    #[inline]
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Query parameters for the set filters.
    #[inline]
    #[must_use]
    pub fn params(&self) -> Params {
        let mut params = Params::new();
        if let Some(month) = self.month {
            params.push(("month", month.to_string()));
        }
        if let Some(year) = self.year {
            params.push(("year", year.to_string()));
        }
        if let Some(id) = self.category_id {
            params.push(("categoryId", id.to_string()));
        }
        params
    }
}

/// Client-held pagination state.
///
/// The page index and size are sent as `page` / `size`; the returned page
/// metadata is folded back with [`Pagination::update_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Zero-based page index to request.
    pub page: u32,
    /// Page size to request.
    pub size: u32,
    /// Total pages reported by the last response.
    pub total_pages: u32,
    /// Whether the current page is the first.
    pub first: bool,
    /// Whether the current page is the last.
    pub last: bool,
}

impl Default for Pagination {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    /// Starts at page 0 with the given size (at least 1).
    #[inline]
    #[must_use]
    pub const fn new(size: u32) -> Self {
        Self {
            page: 0,
            size: if size == 0 { 1 } else { size },
            total_pages: 0,
            first: true,
            last: true,
        }
    }

    /// Folds the metadata of a received page into the state.
    #[inline]
    pub const fn update_from<T>(&mut self, page: &Page<T>) {
        self.page = page.number;
        self.total_pages = page.total_pages;
        self.first = page.first;
        self.last = page.last;
    }

    /// Advances one page unless already on the last. Returns whether the
    /// index moved.
    #[inline]
    pub const fn next(&mut self) -> bool {
        if self.last {
            return false;
        }
        self.page += 1;
        true
    }

    /// Goes back one page unless already on the first. Returns whether the
    /// index moved.
    #[inline]
    pub const fn previous(&mut self) -> bool {
        if self.first || self.page == 0 {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Returns to page 0.
    #[inline]
    pub const fn reset(&mut self) {
        self.page = 0;
        self.first = true;
    }

    /// `page` and `size` parameters.
    #[inline]
    #[must_use]
    pub fn params(&self) -> Params {
        vec![("page", self.page.to_string()), ("size", self.size.to_string())]
    }
}

/// Generates a query type combining a filter set with optional pagination.
macro_rules! define_query {
    (
        name: $name:ident,
        filters: $filters:ty,
        doc: $doc:expr,
    ) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            /// Active filters.
            filters: $filters,
            /// Pagination state; `None` requests every row.
            pagination: Option<Pagination>,
        }

        impl $name {
            /// A paginated query starting at page 0.
            #[inline]
            #[must_use]
            pub fn paged(size: u32) -> Self {
                Self {
                    filters: <$filters>::default(),
                    pagination: Some(Pagination::new(size)),
                }
            }

            /// An unpaginated query.
            #[inline]
            #[must_use]
            pub fn all() -> Self {
                Self::default()
            }

            /// Replaces the filters and returns to page 0.
            #[inline]
            #[must_use]
            pub fn with_filters(mut self, filters: $filters) -> Self {
                self.set_filters(filters);
                self
            }

            /// Active filters.
            #[inline]
            #[must_use]
            pub const fn filters(&self) -> &$filters {
                &self.filters
            }

            /// Replaces the filters and returns to page 0.
            #[inline]
            pub fn set_filters(&mut self, filters: $filters) {
                self.filters = filters;
                self.reset_page();
            }

            /// Clears the filters and returns to page 0.
            #[inline]
            pub fn clear_filters(&mut self) {
                self.filters.clear();
                self.reset_page();
            }

            /// Pagination state, when paginated.
            #[inline]
            #[must_use]
            pub const fn pagination(&self) -> Option<&Pagination> {
                self.pagination.as_ref()
            }

            /// Mutable pagination state, when paginated.
            #[inline]
            pub const fn pagination_mut(&mut self) -> Option<&mut Pagination> {
                self.pagination.as_mut()
            }

            /// Filter parameters followed by `page` / `size`.
            #[inline]
            #[must_use]
            pub fn params(&self) -> Params {
                let mut params = self.filters.params();
                if let Some(pagination) = self.pagination {
                    params.extend(pagination.params());
                }
                params
            }

            /// Returns the pagination (if any) to page 0.
            fn reset_page(&mut self) {
                if let Some(pagination) = self.pagination.as_mut() {
                    pagination.reset();
                }
            }
        }
    };
}

define_query! {
    name: TransactionQuery,
    filters: TransactionFilters,
    doc: "Query for `GET /transactions`: filters plus pagination.",
}

define_query! {
    name: PlanningQuery,
    filters: PlanningFilters,
    doc: "Query for `GET /monthly-planning`: filters plus pagination.",
}

impl TransactionQuery {
    /// Sets one filter and returns to page 0.
    #[inline]
    pub fn set(&mut self, filter: TransactionFilter) {
        self.filters.set(filter);
        self.reset_page();
    }
}
