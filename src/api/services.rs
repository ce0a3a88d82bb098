//! Purpose: Service catalog operations (`/v0/services`).
//! Exports: `Services`, `ServiceFilter`.
//! Role: Typed wrappers over the transport; decode bodies through `Record`.
#![allow(clippy::result_large_err)]

use super::client::Client;
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::core::record::Record;
use crate::models::{
    NewServiceRequest, NewServiceResponse, ServiceDescr, UpdateServiceRequest,
    UpdateServiceResponse,
};
use serde_json::Value;

/// Exact-match filters for `Services::list`; unset fields do not filter.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ServiceFilter {
    pub id: Option<String>,
    pub name: Option<String>,
    pub config_type: Option<String>,
}

impl ServiceFilter {
    fn query_pairs(&self) -> Vec<(&str, &str)> {
        [
            ("id", self.id.as_deref()),
            ("name", self.name.as_deref()),
            ("config_type", self.config_type.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
        .collect()
    }
}

#[derive(Clone, Debug)]
pub struct Services {
    client: Client,
}

impl Services {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn list(&self, filter: &ServiceFilter) -> ApiResult<Vec<ServiceDescr>> {
        self.client
            .get(&["v0", "services"], &filter.query_pairs())
            .and_then(|value| match value {
                Value::Array(items) => items.into_iter().map(ServiceDescr::from_value).collect(),
                _ => Err(Error::new(ErrorKind::TypeMismatch)
                    .with_message("service list must be a JSON array")),
            })
            .map_err(|err| err.with_context("failed to list services"))
    }

    pub fn create(&self, request: &NewServiceRequest) -> ApiResult<NewServiceResponse> {
        self.client
            .post(&["v0", "services"], Some(&request.to_value()))
            .and_then(NewServiceResponse::from_value)
            .map_err(|err| err.with_context("failed to create service"))
    }

    pub fn get(&self, name: &str) -> ApiResult<ServiceDescr> {
        self.client
            .get(&["v0", "services", name], &[])
            .and_then(ServiceDescr::from_value)
            .map_err(|err| err.with_context("failed to retrieve service"))
    }

    /// Update name, description and/or configuration of the service called `name`.
    pub fn update(
        &self,
        name: &str,
        request: &UpdateServiceRequest,
    ) -> ApiResult<UpdateServiceResponse> {
        self.client
            .patch(&["v0", "services", name], &request.to_value())
            .and_then(|value| match value {
                Value::Null => Ok(UpdateServiceResponse::new()),
                value => UpdateServiceResponse::from_value(value),
            })
            .map_err(|err| err.with_context("failed to update service"))
    }

    pub fn delete(&self, name: &str) -> ApiResult<()> {
        self.client
            .delete(&["v0", "services", name])
            .map(drop)
            .map_err(|err| err.with_context("failed to delete service"))
    }
}
