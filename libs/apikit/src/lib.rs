//! Building blocks for resource-oriented JSON APIs.
//!
//! - [`registry`]: operation-id uniqueness per router and per API.
//! - [`fields`]: constrained request fields with pydantic-style errors.
//!
//! The error, paging and integrity crates are re-exported so applications
//! depend on one crate.

pub mod fields;
pub mod registry;

pub use fields::{
    BoolField, DateField, DateTimeField, EmailField, FieldDefinitionError, FieldKind, FieldSet,
    FieldSpec, IntField, StringField,
};
pub use registry::{OperationRegistry, RegistryError};

pub use api_errors;
pub use api_errors::text;
pub use db_integrity;
pub use paging_core;
