//! Purpose: Error body returned by the control plane on non-2xx responses.
//! Exports: `ErrorResponse`.
use crate::core::error::ApiResult;
use crate::core::record::{Extensions, FieldReader, FieldWriter, Record};
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    message: String,
    error_code: String,
    details: Value,
    extensions: Extensions,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error_code: impl Into<String>, details: Value) -> Self {
        Self {
            message: message.into(),
            error_code: error_code.into(),
            details,
            extensions: Extensions::for_fields(Self::FIELDS),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error_code(&self) -> &str {
        &self.error_code
    }

    pub fn details(&self) -> &Value {
        &self.details
    }
}

impl Record for ErrorResponse {
    const NAME: &'static str = "ErrorResponse";
    const FIELDS: &'static [&'static str] = &["details", "error_code", "message"];

    fn from_map(map: Map<String, Value>) -> ApiResult<Self> {
        let mut reader = FieldReader::new(Self::NAME, map);
        let details = reader.required("details")?;
        let error_code = reader.required_as("error_code")?;
        let message = reader.required_as("message")?;
        Ok(Self {
            message,
            error_code,
            details,
            extensions: reader.finish(Self::FIELDS),
        })
    }

    fn to_map(&self) -> Map<String, Value> {
        FieldWriter::new(&self.extensions)
            .value("details", self.details.clone())
            .field("error_code", self.error_code.as_str())
            .field("message", self.message.as_str())
            .finish()
    }

    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorResponse;
    use crate::core::error::ErrorKind;
    use crate::core::record::Record;
    use serde_json::json;

    #[test]
    fn decodes_server_error_body() {
        let body = json!({
            "message": "Unknown pipeline id '7'",
            "error_code": "UnknownPipeline",
            "details": {"pipeline_id": 7}
        });
        let err = ErrorResponse::from_value(body.clone()).expect("error body");
        assert_eq!(err.error_code(), "UnknownPipeline");
        assert_eq!(err.details()["pipeline_id"], json!(7));
        assert_eq!(err.to_value(), body);
    }

    #[test]
    fn plain_text_shape_is_rejected() {
        let err = ErrorResponse::from_value(json!({"error": "boom"})).expect_err("not an error body");
        assert_eq!(err.kind(), ErrorKind::MissingKey);
        assert_eq!(err.key(), Some("details"));
    }
}
