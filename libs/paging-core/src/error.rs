use thiserror::Error;

/// Unified error type for pagination and sorting input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("page must be greater than or equal to 1, got {0}")]
    InvalidPage(u64),

    #[error("page_size must be greater than or equal to 1, got {0}")]
    InvalidPageSize(u64),

    #[error("page_size {page_size} exceeds the maximum of {max}")]
    PageSizeTooLarge { page_size: u64, max: u64 },

    #[error("page {page} is out of range, last page is {pages}")]
    PageOutOfRange { page: u64, pages: u64 },

    #[error("invalid sort key: {0}")]
    InvalidSortKey(String),

    #[error("sort field '{0}' given more than once")]
    DuplicateSortField(String),
}

pub type Result<T> = std::result::Result<T, Error>;
