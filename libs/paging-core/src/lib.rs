//! Page-number pagination and enum-driven sort schemas.
//!
//! Both halves are framework-free: callers hand in the total item count and
//! the request URL, and get back a [`PageWindow`] describing which slice to
//! load plus the navigation links.

pub mod error;
pub mod page;
pub mod sort;

pub use error::{Error, Result};
pub use page::{paginate, paginate_vec, Page, PageParams, PageWindow, DEFAULT_PER_PAGE};
pub use sort::{all_tokens, SortDir, SortKey, SortSchema, SortableField};

#[cfg(test)]
mod tests;
