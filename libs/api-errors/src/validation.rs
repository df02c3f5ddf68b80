use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use paging_core::Error as PagingError;

/// Element of an error location path, e.g. `["body", "items", 0, "name"]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocItem {
    Key(String),
    Index(usize),
}

impl From<&str> for LocItem {
    fn from(v: &str) -> Self {
        LocItem::Key(v.to_owned())
    }
}

impl From<String> for LocItem {
    fn from(v: String) -> Self {
        LocItem::Key(v)
    }
}

impl From<usize> for LocItem {
    fn from(v: usize) -> Self {
        LocItem::Index(v)
    }
}

/// One input validation failure, pydantic style.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub loc: Vec<LocItem>,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctx: Option<Map<String, Value>>,
}

impl ValidationErrorDetail {
    pub fn new<L, I>(error_type: impl Into<String>, loc: L, msg: impl Into<String>) -> Self
    where
        L: IntoIterator<Item = I>,
        I: Into<LocItem>,
    {
        Self {
            error_type: error_type.into(),
            loc: loc.into_iter().map(Into::into).collect(),
            msg: msg.into(),
            ctx: None,
        }
    }

    pub fn with_ctx(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ctx
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

impl From<&PagingError> for ValidationErrorDetail {
    fn from(err: &PagingError) -> Self {
        match err {
            PagingError::InvalidPage(_) => ValidationErrorDetail::new(
                "greater_than_equal",
                ["query", "page"],
                "Input should be greater than or equal to 1",
            )
            .with_ctx("ge", 1),
            PagingError::InvalidPageSize(_) => ValidationErrorDetail::new(
                "greater_than_equal",
                ["query", "page_size"],
                "Input should be greater than or equal to 1",
            )
            .with_ctx("ge", 1),
            PagingError::PageSizeTooLarge { max, .. } => ValidationErrorDetail::new(
                "less_than_equal",
                ["query", "page_size"],
                format!("Input should be less than or equal to {max}"),
            )
            .with_ctx("le", *max),
            PagingError::PageOutOfRange { pages, .. } => ValidationErrorDetail::new(
                "less_than_equal",
                ["query", "page"],
                format!("Input should be less than or equal to {pages}"),
            )
            .with_ctx("le", *pages),
            PagingError::InvalidSortKey(token) => ValidationErrorDetail::new(
                "enum",
                ["query", "ordering"],
                format!("Input should be a valid sort key, got '{token}'"),
            ),
            PagingError::DuplicateSortField(field) => ValidationErrorDetail::new(
                "value_error",
                ["query", "ordering"],
                format!("Value error, sort field '{field}' given more than once"),
            ),
        }
    }
}
