//! Purpose: Resolve untagged polymorphic fields by ordered structural trial.
//! Exports: `Candidate`, `decode_union`, `first_match`.
//! Role: Pure decode path for union-typed model fields; encode is enum dispatch.
//! Invariants: Candidates are tried in declaration order; the first success wins.
//! Invariants: Only the last candidate's failure is reported, as `TypeMismatch`.
use super::error::{ApiResult, Error, ErrorKind};
use super::record::json_type_name;
use serde_json::{Map, Value};

/// One variant of a union: a name for diagnostics plus its structural decoder.
pub struct Candidate<T> {
    name: &'static str,
    decode: fn(Map<String, Value>) -> ApiResult<T>,
}

impl<T> Candidate<T> {
    pub const fn new(name: &'static str, decode: fn(Map<String, Value>) -> ApiResult<T>) -> Self {
        Self { name, decode }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn try_decode(&self, value: &Value) -> Option<T> {
        match value {
            Value::Object(map) => (self.decode)(map.clone()).ok(),
            _ => None,
        }
    }
}

impl<T> Clone for Candidate<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Candidate<T> {}

impl<T> std::fmt::Debug for Candidate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Candidate").field(&self.name).finish()
    }
}

pub fn decode_union<T>(union: &str, value: Value, candidates: &[Candidate<T>]) -> ApiResult<T> {
    let Some((last, rest)) = candidates.split_last() else {
        return Err(Error::new(ErrorKind::Internal)
            .with_message(format!("union {union} declares no variants")));
    };

    for candidate in rest {
        if let Some(decoded) = candidate.try_decode(&value) {
            return Ok(decoded);
        }
    }

    let tried = candidates
        .iter()
        .map(Candidate::name)
        .collect::<Vec<_>>()
        .join(", ");
    match value {
        Value::Object(map) => (last.decode)(map).map_err(|err| {
            Error::new(ErrorKind::TypeMismatch)
                .with_message(format!("{union} matches none of [{tried}]"))
                .with_source(err)
        }),
        other => Err(Error::new(ErrorKind::TypeMismatch).with_message(format!(
            "{union} must be a JSON object, found {}",
            json_type_name(&other)
        ))),
    }
}

/// Name of the candidate `decode_union` would select, if any.
pub fn first_match<T>(value: &Value, candidates: &[Candidate<T>]) -> Option<&'static str> {
    candidates
        .iter()
        .find(|candidate| candidate.try_decode(value).is_some())
        .map(Candidate::name)
}

#[cfg(test)]
mod tests {
    use super::{Candidate, decode_union, first_match};
    use crate::core::error::{ApiResult, ErrorKind};
    use crate::core::record::FieldReader;
    use serde_json::{Map, Value, json};
    use std::error::Error as StdError;

    #[derive(Debug, PartialEq)]
    enum Shape {
        Point { x: i64 },
        Pair { x: i64, y: i64 },
    }

    fn point(map: Map<String, Value>) -> ApiResult<Shape> {
        let mut reader = FieldReader::new("Point", map);
        Ok(Shape::Point {
            x: reader.required_as("x")?,
        })
    }

    fn pair(map: Map<String, Value>) -> ApiResult<Shape> {
        let mut reader = FieldReader::new("Pair", map);
        Ok(Shape::Pair {
            x: reader.required_as("x")?,
            y: reader.required_as("y")?,
        })
    }

    const POINT: Candidate<Shape> = Candidate::new("Point", point);
    const PAIR: Candidate<Shape> = Candidate::new("Pair", pair);

    #[test]
    fn declaration_order_breaks_ties() {
        let value = json!({"x": 1, "y": 2});
        let first = decode_union("Shape", value.clone(), &[POINT, PAIR]).expect("point");
        assert_eq!(first, Shape::Point { x: 1 });

        let second = decode_union("Shape", value.clone(), &[PAIR, POINT]).expect("pair");
        assert_eq!(second, Shape::Pair { x: 1, y: 2 });

        assert_eq!(first_match(&value, &[POINT, PAIR]), Some("Point"));
        assert_eq!(first_match(&value, &[PAIR, POINT]), Some("Pair"));
    }

    #[test]
    fn falls_through_to_later_candidate() {
        let decoded = decode_union("Shape", json!({"x": 3, "y": 4}), &[PAIR, POINT]).expect("pair");
        assert_eq!(decoded, Shape::Pair { x: 3, y: 4 });

        let decoded = decode_union("Shape", json!({"x": 5}), &[PAIR, POINT]).expect("point");
        assert_eq!(decoded, Shape::Point { x: 5 });
    }

    #[test]
    fn exhaustion_reports_last_failure() {
        let err = decode_union("Shape", json!({"z": 0}), &[POINT, PAIR]).expect_err("no match");
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.message(), Some("Shape matches none of [Point, Pair]"));
        let source = err.source().expect("last candidate failure");
        assert!(source.to_string().contains("Pair is missing required field"));
        assert_eq!(first_match(&json!({"z": 0}), &[POINT, PAIR]), None);
    }

    #[test]
    fn non_object_is_a_mismatch() {
        let err = decode_union("Shape", json!([1, 2]), &[POINT, PAIR]).expect_err("array");
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.message(), Some("Shape must be a JSON object, found array"));
    }

    #[test]
    fn empty_candidate_list_is_internal() {
        let err = decode_union::<Shape>("Shape", json!({}), &[]).expect_err("empty");
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
