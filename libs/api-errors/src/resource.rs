use indexmap::IndexMap;

use crate::error::ApiError;
use crate::field_value::Fields;

/// Error constructors bound to one resource name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceErrors {
    pub resource: String,
}

impl ResourceErrors {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
        }
    }

    pub fn unique_constraint(&self, fields: Fields) -> ApiError {
        ApiError::UniqueConstraint {
            resource: self.resource.clone(),
            fields,
        }
    }

    pub fn not_null_constraint(&self, fields: Fields) -> ApiError {
        ApiError::NotNullConstraint {
            resource: self.resource.clone(),
            fields,
        }
    }

    pub fn check_constraint(&self, constraint: impl Into<String>) -> ApiError {
        ApiError::CheckConstraint {
            resource: self.resource.clone(),
            constraint: constraint.into(),
        }
    }

    pub fn not_found(&self, fields: Fields) -> ApiError {
        ApiError::NotFound {
            resource: self.resource.clone(),
            fields,
        }
    }

    pub fn multiple_objects_returned(&self, fields: Fields) -> ApiError {
        ApiError::MultipleObjectsReturned {
            resource: self.resource.clone(),
            fields,
        }
    }

    /// Group `(model, id)` references by model, in first-seen model order,
    /// with ids sorted ascending.
    pub fn protected<I, M>(&self, references: I) -> ApiError
    where
        I: IntoIterator<Item = (M, i64)>,
        M: Into<String>,
    {
        let mut foreign_items: IndexMap<String, Vec<i64>> = IndexMap::new();
        for (model, id) in references {
            foreign_items.entry(model.into()).or_default().push(id);
        }
        for ids in foreign_items.values_mut() {
            ids.sort_unstable();
        }

        ApiError::Protected {
            resource: self.resource.clone(),
            foreign_items,
        }
    }
}
