use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Page size used when the request does not name one.
pub const DEFAULT_PER_PAGE: u64 = 100;

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PER_PAGE
}

/// `?page=&page_size=` query input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PageParams {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self { page, page_size }
    }

    /// First page with a configured default size.
    pub fn with_per_page(per_page: u64) -> Self {
        Self {
            page: 1,
            page_size: per_page,
        }
    }

    /// Both values must be at least 1.
    pub fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(Error::InvalidPage(self.page));
        }
        if self.page_size < 1 {
            return Err(Error::InvalidPageSize(self.page_size));
        }
        Ok(())
    }

    /// [`validate`](Self::validate) plus an optional upper bound on `page_size`.
    pub fn validate_with_max(&self, max_page_size: Option<u64>) -> Result<()> {
        self.validate()?;
        match max_page_size {
            Some(max) if self.page_size > max => Err(Error::PageSizeTooLarge {
                page_size: self.page_size,
                max,
            }),
            _ => Ok(()),
        }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// The slice of a collection selected by [`paginate`], with navigation data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub count: u64,
    pub current_page: u64,
    pub pages: u64,
    pub previous_page: Option<u64>,
    pub next_page: Option<u64>,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
    /// Items to skip.
    pub offset: u64,
    /// Items to take.
    pub limit: u64,
}

impl PageWindow {
    /// Window over an empty collection: page 0 of 0, no links.
    pub fn empty() -> Self {
        Self {
            count: 0,
            current_page: 0,
            pages: 0,
            previous_page: None,
            next_page: None,
            previous_url: None,
            next_url: None,
            offset: 0,
            limit: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Attach the loaded items.
    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            count: self.count,
            current_page: self.current_page,
            pages: self.pages,
            previous_page: self.previous_page,
            next_page: self.next_page,
            previous_url: self.previous_url,
            next_url: self.next_url,
            items,
        }
    }
}

/// Page-number paginated response body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub current_page: u64,
    pub pages: u64,
    pub previous_page: Option<u64>,
    pub next_page: Option<u64>,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        PageWindow::empty().into_page(Vec::new())
    }

    /// Map items while keeping the navigation data (domain -> DTO).
    pub fn map_items<U>(self, mut f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            current_page: self.current_page,
            pages: self.pages,
            previous_page: self.previous_page,
            next_page: self.next_page,
            previous_url: self.previous_url,
            next_url: self.next_url,
            items: self.items.into_iter().map(&mut f).collect(),
        }
    }
}

/// Compute the window for `count` items.
///
/// An empty collection yields [`PageWindow::empty`] for any page. Otherwise a
/// page past the last one is rejected. Links are built only when the request
/// URL is known, as `{path}?page_size={n}&page={p}` on the same origin.
pub fn paginate(count: u64, params: &PageParams, base: Option<&Url>) -> Result<PageWindow> {
    params.validate()?;

    if count == 0 {
        return Ok(PageWindow::empty());
    }

    let pages = count.div_ceil(params.page_size);
    if params.page > pages {
        return Err(Error::PageOutOfRange {
            page: params.page,
            pages,
        });
    }

    let offset = params.offset();
    let previous_page = (params.page > 1).then(|| params.page - 1);
    let next_page = (offset + params.page_size < count).then(|| params.page + 1);

    Ok(PageWindow {
        count,
        current_page: params.page,
        pages,
        previous_page,
        next_page,
        previous_url: previous_page.and_then(|p| page_url(base, params.page_size, p)),
        next_url: next_page.and_then(|p| page_url(base, params.page_size, p)),
        offset,
        limit: params.page_size,
    })
}

/// Paginate an in-memory collection.
pub fn paginate_vec<T>(items: Vec<T>, params: &PageParams, base: Option<&Url>) -> Result<Page<T>> {
    let window = paginate(items.len() as u64, params, base)?;
    let (offset, limit) = (window.offset as usize, window.limit as usize);
    let items = items.into_iter().skip(offset).take(limit).collect();
    Ok(window.into_page(items))
}

fn page_url(base: Option<&Url>, page_size: u64, page: u64) -> Option<String> {
    let mut url = base?.clone();
    url.set_query(Some(&format!("page_size={page_size}&page={page}")));
    url.set_fragment(None);
    Some(url.into())
}
