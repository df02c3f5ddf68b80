//! Sort schemas driven by a closed set of sortable fields.
//!
//! Each field `f` accepts the tokens `f_asc` and `f_desc` in an `ordering`
//! query parameter. Declare the field set with [`sortable_fields!`](crate::sortable_fields).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// A field that may appear in an `ordering` list.
pub trait SortableField: Copy + Eq + fmt::Debug + 'static {
    /// Every field, in declaration order.
    const ALL: &'static [Self];

    /// Public name used in the `{name}_asc` / `{name}_desc` tokens.
    fn name(&self) -> &'static str;

    /// Storage column the field sorts by.
    fn column(&self) -> &'static str;
}

/// Declare an enum implementing [`SortableField`].
///
/// ```
/// paging_core::sortable_fields! {
///     pub enum ResourceSort {
///         Name = "name" => "name",
///         CreatedAt = "created" => "created_at",
///     }
/// }
///
/// use paging_core::SortableField;
/// assert_eq!(ResourceSort::CreatedAt.column(), "created_at");
/// assert_eq!(ResourceSort::ALL.len(), 2);
/// ```
#[macro_export]
macro_rules! sortable_fields {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $field:literal => $column:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::sort::SortableField for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $field),+
                }
            }

            fn column(&self) -> &'static str {
                match self {
                    $(Self::$variant => $column),+
                }
            }
        }
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    fn suffix(self) -> &'static str {
        match self {
            SortDir::Asc => "_asc",
            SortDir::Desc => "_desc",
        }
    }

    fn sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// One `ordering` entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SortKey<F> {
    pub field: F,
    pub dir: SortDir,
}

impl<F: SortableField> SortKey<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            dir: SortDir::Asc,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            dir: SortDir::Desc,
        }
    }

    /// `column` or `-column`.
    pub fn field_expr(&self) -> String {
        match self.dir {
            SortDir::Asc => self.field.column().to_owned(),
            SortDir::Desc => format!("-{}", self.field.column()),
        }
    }
}

impl<F: SortableField> fmt::Display for SortKey<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.field.name(), self.dir.suffix())
    }
}

impl<F: SortableField> FromStr for SortKey<F> {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self> {
        let (name, dir) = if let Some(name) = token.strip_suffix("_asc") {
            (name, SortDir::Asc)
        } else if let Some(name) = token.strip_suffix("_desc") {
            (name, SortDir::Desc)
        } else {
            return Err(Error::InvalidSortKey(token.to_owned()));
        };

        F::ALL
            .iter()
            .find(|f| f.name() == name)
            .map(|&field| Self { field, dir })
            .ok_or_else(|| Error::InvalidSortKey(token.to_owned()))
    }
}

impl<F: SortableField> Serialize for SortKey<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, F: SortableField> Deserialize<'de> for SortKey<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(de::Error::custom)
    }
}

/// Every accepted token for `F`, ascending before descending per field.
pub fn all_tokens<F: SortableField>() -> Vec<String> {
    F::ALL
        .iter()
        .flat_map(|&f| [SortKey::asc(f).to_string(), SortKey::desc(f).to_string()])
        .collect()
}

/// Requested ordering; `None` keeps the storage default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "F: SortableField")]
pub struct SortSchema<F> {
    pub ordering: Option<Vec<SortKey<F>>>,
}

impl<F> Default for SortSchema<F> {
    fn default() -> Self {
        Self { ordering: None }
    }
}

impl<F: SortableField> SortSchema<F> {
    pub fn new(ordering: Vec<SortKey<F>>) -> Result<Self> {
        let schema = Self {
            ordering: Some(ordering),
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Parse a comma-separated `ordering` value. Blank input means no ordering.
    pub fn parse(raw: &str) -> Result<Self> {
        let keys = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<_>>>()?;

        if keys.is_empty() {
            return Ok(Self::default());
        }
        Self::new(keys)
    }

    /// A field may appear at most once, in either direction.
    pub fn validate(&self) -> Result<()> {
        let keys = self.keys();
        for (i, key) in keys.iter().enumerate() {
            if keys[..i].iter().any(|k| k.field == key.field) {
                return Err(Error::DuplicateSortField(key.field.name().to_owned()));
            }
        }
        Ok(())
    }

    pub fn keys(&self) -> &[SortKey<F>] {
        self.ordering.as_deref().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.keys().iter().map(ToString::to_string).collect()
    }

    /// Django-style `column` / `-column` list.
    pub fn fields(&self) -> Vec<String> {
        self.keys().iter().map(SortKey::field_expr).collect()
    }

    /// `"a" ASC, "b" DESC`, or `None` without ordering.
    pub fn order_by_sql(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let clause = self
            .keys()
            .iter()
            .map(|k| format!("{} {}", quote_ident(k.field.column()), k.dir.sql()))
            .collect::<Vec<_>>()
            .join(", ");
        Some(clause)
    }

    /// Stable multi-key sort; `cmp` compares two items on one field, ascending.
    pub fn sort_slice<T>(&self, items: &mut [T], cmp: impl Fn(F, &T, &T) -> Ordering) {
        let keys = self.keys();
        if keys.is_empty() {
            return;
        }
        items.sort_by(|a, b| {
            keys.iter()
                .map(|k| match k.dir {
                    SortDir::Asc => cmp(k.field, a, b),
                    SortDir::Desc => cmp(k.field, a, b).reverse(),
                })
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
