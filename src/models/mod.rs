//! Purpose: Typed request/response bodies for the control-plane REST API.
//! Exports: Service, pipeline, and error models; all implement `Record`.
//! Role: Mapping between decoded JSON objects and strongly typed values.
//! Invariants: `from_value(x.to_value()) == x` and `to_value(from_value(v)) == v`.

/// Implements `Record` for a model that declares no fixed fields.
macro_rules! open_record {
    ($ty:ident, $name:literal) => {
        impl $ty {
            pub fn new() -> Self {
                Self {
                    extensions: $crate::core::record::Extensions::for_fields(&[]),
                }
            }

            pub fn into_map(self) -> serde_json::Map<String, serde_json::Value> {
                self.extensions.into_map()
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $crate::core::record::Record for $ty {
            const NAME: &'static str = $name;
            const FIELDS: &'static [&'static str] = &[];

            fn from_map(
                map: serde_json::Map<String, serde_json::Value>,
            ) -> $crate::core::error::ApiResult<Self> {
                let reader = $crate::core::record::FieldReader::new(Self::NAME, map);
                Ok(Self {
                    extensions: reader.finish(Self::FIELDS),
                })
            }

            fn to_map(&self) -> serde_json::Map<String, serde_json::Value> {
                $crate::core::record::FieldWriter::new(&self.extensions).finish()
            }

            fn extensions(&self) -> &$crate::core::record::Extensions {
                &self.extensions
            }

            fn extensions_mut(&mut self) -> &mut $crate::core::record::Extensions {
                &mut self.extensions
            }
        }
    };
}

mod error_response;
mod pipeline;
mod service;

pub use error_response::ErrorResponse;
pub use pipeline::{PipelineMetadata, PipelineStatus};
pub use service::{
    KafkaService, KafkaServiceConfig, MysqlService, MysqlServiceConfig, NewServiceRequest,
    NewServiceResponse, ServiceConfig, ServiceDescr, UpdateServiceRequest, UpdateServiceResponse,
};
