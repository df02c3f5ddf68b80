//! Operation-id registries for routers and APIs.
//!
//! Operation ids must be unique per router and, once a router is mounted,
//! unique across the whole API. The registry is an ordinary value owned by
//! the application; routers and APIs are keyed by caller-chosen ids.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("router '{0}' already registered")]
    RouterAlreadyRegistered(String),

    #[error("router '{0}' is not registered")]
    RouterNotRegistered(String),

    #[error("operation id '{operation_id}' already registered on router '{router}'")]
    OperationIdOnRouterAlreadyRegistered { router: String, operation_id: String },

    #[error("api '{0}' already registered")]
    ApiAlreadyRegistered(String),

    #[error("api '{0}' is not registered")]
    ApiNotRegistered(String),

    #[error("operation id '{operation_id}' already registered on api '{api}'")]
    OperationIdOnApiAlreadyRegistered { api: String, operation_id: String },

    #[error("operation id '{operation_id}' not found in api '{api}'")]
    OperationIdNotFoundInApi { api: String, operation_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ApiOperation {
    operation_id: String,
    router: String,
}

#[derive(Debug, Default)]
pub struct OperationRegistry {
    routers: HashMap<String, Vec<String>>,
    apis: HashMap<String, Vec<ApiOperation>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_router(&mut self, router: &str) -> Result<(), RegistryError> {
        if self.routers.contains_key(router) {
            return Err(RegistryError::RouterAlreadyRegistered(router.to_owned()));
        }
        self.routers.insert(router.to_owned(), Vec::new());
        Ok(())
    }

    pub fn register_operation_id(
        &mut self,
        router: &str,
        operation_id: &str,
    ) -> Result<(), RegistryError> {
        let ids = self
            .routers
            .get_mut(router)
            .ok_or_else(|| RegistryError::RouterNotRegistered(router.to_owned()))?;

        if ids.iter().any(|id| id == operation_id) {
            tracing::warn!(router, operation_id, "duplicate operation id on router");
            return Err(RegistryError::OperationIdOnRouterAlreadyRegistered {
                router: router.to_owned(),
                operation_id: operation_id.to_owned(),
            });
        }

        ids.push(operation_id.to_owned());
        Ok(())
    }

    /// Operation ids of a router, in registration order.
    pub fn router_operation_ids(&self, router: &str) -> Result<&[String], RegistryError> {
        self.routers
            .get(router)
            .map(Vec::as_slice)
            .ok_or_else(|| RegistryError::RouterNotRegistered(router.to_owned()))
    }

    pub fn register_api(&mut self, api: &str) -> Result<(), RegistryError> {
        if self.apis.contains_key(api) {
            return Err(RegistryError::ApiAlreadyRegistered(api.to_owned()));
        }
        self.apis.insert(api.to_owned(), Vec::new());
        Ok(())
    }

    /// Mount all of a router's operation ids on an API.
    ///
    /// Either every id is added or, on the first collision, none is.
    pub fn register_routers_operation_ids(
        &mut self,
        api: &str,
        router: &str,
    ) -> Result<(), RegistryError> {
        if !self.apis.contains_key(api) {
            return Err(RegistryError::ApiNotRegistered(api.to_owned()));
        }
        let router_ids = self
            .routers
            .get(router)
            .ok_or_else(|| RegistryError::RouterNotRegistered(router.to_owned()))?;
        let api_ops = self
            .apis
            .get_mut(api)
            .ok_or_else(|| RegistryError::ApiNotRegistered(api.to_owned()))?;

        if let Some(taken) = router_ids
            .iter()
            .find(|id| api_ops.iter().any(|op| &op.operation_id == *id))
        {
            tracing::warn!(api, router, operation_id = %taken, "operation id collision on api");
            return Err(RegistryError::OperationIdOnApiAlreadyRegistered {
                api: api.to_owned(),
                operation_id: taken.clone(),
            });
        }

        api_ops.extend(router_ids.iter().map(|id| ApiOperation {
            operation_id: id.clone(),
            router: router.to_owned(),
        }));
        tracing::debug!(api, router, count = router_ids.len(), "mounted router operation ids");
        Ok(())
    }

    /// Operation ids of an API, in mount order.
    pub fn api_operation_ids(&self, api: &str) -> Result<Vec<&str>, RegistryError> {
        self.apis
            .get(api)
            .map(|ops| ops.iter().map(|op| op.operation_id.as_str()).collect())
            .ok_or_else(|| RegistryError::ApiNotRegistered(api.to_owned()))
    }

    /// Router that owns `operation_id` within `api`.
    pub fn find_operation(&self, api: &str, operation_id: &str) -> Result<&str, RegistryError> {
        let ops = self
            .apis
            .get(api)
            .ok_or_else(|| RegistryError::ApiNotRegistered(api.to_owned()))?;

        ops.iter()
            .find(|op| op.operation_id == operation_id)
            .map(|op| op.router.as_str())
            .ok_or_else(|| RegistryError::OperationIdNotFoundInApi {
                api: api.to_owned(),
                operation_id: operation_id.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router_with(reg: &mut OperationRegistry, router: &str, ids: &[&str]) {
        reg.register_router(router).unwrap();
        for id in ids {
            reg.register_operation_id(router, id).unwrap();
        }
    }

    #[test]
    fn router_registration() {
        let mut reg = OperationRegistry::new();
        router_with(&mut reg, "resources", &["list_resources", "create_resource"]);

        assert_eq!(
            reg.register_router("resources"),
            Err(RegistryError::RouterAlreadyRegistered("resources".into()))
        );
        assert_eq!(
            reg.router_operation_ids("resources").unwrap(),
            ["list_resources", "create_resource"]
        );
        assert_eq!(
            reg.register_operation_id("resources", "list_resources"),
            Err(RegistryError::OperationIdOnRouterAlreadyRegistered {
                router: "resources".into(),
                operation_id: "list_resources".into(),
            })
        );
        assert_eq!(
            reg.register_operation_id("users", "list_users"),
            Err(RegistryError::RouterNotRegistered("users".into()))
        );
    }

    #[test]
    fn api_mounting_is_all_or_nothing() {
        let mut reg = OperationRegistry::new();
        router_with(&mut reg, "resources", &["list_resources", "get_item"]);
        router_with(&mut reg, "others", &["list_others", "get_item"]);
        reg.register_api("v1").unwrap();

        reg.register_routers_operation_ids("v1", "resources").unwrap();
        assert_eq!(
            reg.register_routers_operation_ids("v1", "others"),
            Err(RegistryError::OperationIdOnApiAlreadyRegistered {
                api: "v1".into(),
                operation_id: "get_item".into(),
            })
        );
        // "list_others" was not added either.
        assert_eq!(
            reg.api_operation_ids("v1").unwrap(),
            vec!["list_resources", "get_item"]
        );
    }

    #[test]
    fn find_operation_returns_owning_router() {
        let mut reg = OperationRegistry::new();
        router_with(&mut reg, "resources", &["list_resources"]);
        router_with(&mut reg, "users", &["list_users"]);
        reg.register_api("v1").unwrap();
        reg.register_routers_operation_ids("v1", "resources").unwrap();
        reg.register_routers_operation_ids("v1", "users").unwrap();

        assert_eq!(reg.find_operation("v1", "list_users"), Ok("users"));
        assert_eq!(
            reg.find_operation("v1", "nope"),
            Err(RegistryError::OperationIdNotFoundInApi {
                api: "v1".into(),
                operation_id: "nope".into(),
            })
        );
    }

    #[test]
    fn unknown_api_and_router() {
        let mut reg = OperationRegistry::new();
        reg.register_router("resources").unwrap();

        assert_eq!(
            reg.register_routers_operation_ids("v1", "resources"),
            Err(RegistryError::ApiNotRegistered("v1".into()))
        );
        reg.register_api("v1").unwrap();
        assert_eq!(
            reg.register_api("v1"),
            Err(RegistryError::ApiAlreadyRegistered("v1".into()))
        );
        assert_eq!(
            reg.register_routers_operation_ids("v1", "users"),
            Err(RegistryError::RouterNotRegistered("users".into()))
        );
        assert_eq!(
            reg.api_operation_ids("v2"),
            Err(RegistryError::ApiNotRegistered("v2".into()))
        );
    }

    #[test]
    fn same_id_on_different_routers_is_allowed_until_mounted_together() {
        let mut reg = OperationRegistry::new();
        router_with(&mut reg, "a", &["list"]);
        router_with(&mut reg, "b", &["list"]);
        reg.register_api("v1").unwrap();
        reg.register_api("v2").unwrap();
        reg.register_routers_operation_ids("v1", "a").unwrap();
        reg.register_routers_operation_ids("v2", "b").unwrap();
        assert_eq!(reg.find_operation("v2", "list"), Ok("b"));
    }
}
