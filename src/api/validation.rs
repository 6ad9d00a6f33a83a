//! Purpose: Enforce the search-filter policy for broad-search endpoints.
//! Exports: `validate`, `ValidationError`, `BROAD_SEARCH_ENDPOINTS`, `is_broad_search`.
//! Role: Gate in front of expensive endpoints; rejects requests that would scan everything.
//! Invariants: Endpoints outside the broad-search set always pass.
//! Invariants: A broad-search request passes iff at least one parameter is meaningful.
//! Notes: Meaningful = non-null, and non-empty when a string or array.

use std::fmt;

use crate::core::error::{Error, ErrorKind};
use crate::json::value::Value;

pub const BROAD_SEARCH_ENDPOINTS: [&str; 3] = [
    "getResearchAssociations",
    "getDrugGeneInteractions",
    "getPolygeneticRiskScores",
];

pub const VALIDATION_ERROR_CODE: i32 = 400;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ValidationError {
    MissingParametersObject { endpoint: String },
    NoSearchParameter { endpoint: String },
    NoNonEmptySearchParameter { endpoint: String },
}

impl ValidationError {
    pub fn code(&self) -> i32 {
        VALIDATION_ERROR_CODE
    }

    pub fn label(&self) -> &'static str {
        match self {
            ValidationError::MissingParametersObject { .. } => "missing-parameters-object",
            ValidationError::NoSearchParameter { .. } => "no-search-parameter",
            ValidationError::NoNonEmptySearchParameter { .. } => "no-non-empty-search-parameter",
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            ValidationError::MissingParametersObject { endpoint }
            | ValidationError::NoSearchParameter { endpoint }
            | ValidationError::NoNonEmptySearchParameter { endpoint } => endpoint,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingParametersObject { endpoint } => {
                write!(f, "Missing parameters object for endpoint: {endpoint}")
            }
            ValidationError::NoSearchParameter { endpoint } => write!(
                f,
                "Endpoint '{endpoint}' requires at least one search parameter to prevent overly broad queries."
            ),
            ValidationError::NoNonEmptySearchParameter { endpoint } => write!(
                f,
                "Endpoint '{endpoint}' requires at least one non-empty search parameter to prevent overly broad queries."
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        let hint = match &err {
            ValidationError::MissingParametersObject { .. } => {
                "Pass a JSON object of search parameters, e.g. {\"gene_ids\":[\"COMT\"]}."
            }
            _ => "Provide at least one non-null, non-empty search parameter.",
        };
        Error::new(ErrorKind::Validation)
            .with_message(err.to_string())
            .with_hint(hint)
            .with_source(err)
    }
}

pub fn is_broad_search(endpoint: &str) -> bool {
    BROAD_SEARCH_ENDPOINTS.contains(&endpoint)
}

fn is_meaningful(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Number(_) | Value::Boolean(_) | Value::Object(_) => true,
    }
}

pub fn validate(endpoint: &str, parameters: Option<&Value>) -> Result<(), ValidationError> {
    if !is_broad_search(endpoint) {
        return Ok(());
    }

    let Some(Value::Object(params)) = parameters else {
        tracing::debug!(endpoint, "rejecting request without parameters object");
        return Err(ValidationError::MissingParametersObject {
            endpoint: endpoint.to_string(),
        });
    };

    if params.is_empty() {
        tracing::debug!(endpoint, "rejecting request with empty parameters");
        return Err(ValidationError::NoSearchParameter {
            endpoint: endpoint.to_string(),
        });
    }

    if !params.values().any(is_meaningful) {
        tracing::debug!(
            endpoint,
            count = params.len(),
            "rejecting request with only null/empty parameters"
        );
        return Err(ValidationError::NoNonEmptySearchParameter {
            endpoint: endpoint.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{BROAD_SEARCH_ENDPOINTS, ValidationError, is_broad_search, validate};
    use crate::core::error::{Error, ErrorKind};
    use crate::json::parse::parse;
    use crate::json::value::Value;

    fn params(text: &str) -> Value {
        parse(text).unwrap()
    }

    #[test]
    fn non_broad_endpoints_always_pass() {
        let inputs = [
            None,
            Some(Value::Null),
            Some(Value::object()),
            Some(Value::from("x")),
            Some(params(r#"{"a":null}"#)),
        ];
        for input in &inputs {
            assert_eq!(validate("getGeneInfo", input.as_ref()), Ok(()));
            assert_eq!(validate("", input.as_ref()), Ok(()));
        }
    }

    #[test]
    fn endpoint_matching_is_exact() {
        assert!(is_broad_search("getResearchAssociations"));
        assert!(!is_broad_search("getresearchassociations"));
        assert!(!is_broad_search("getResearchAssociations "));
    }

    #[test]
    fn missing_or_non_object_parameters_are_rejected() {
        for input in [None, Some(Value::Null), Some(Value::array()), Some(Value::from("q"))] {
            let err = validate("getResearchAssociations", input.as_ref()).unwrap_err();
            assert_eq!(
                err,
                ValidationError::MissingParametersObject {
                    endpoint: "getResearchAssociations".to_string()
                }
            );
        }
    }

    #[test]
    fn empty_parameters_are_rejected() {
        let err = validate("getResearchAssociations", Some(&Value::object())).unwrap_err();
        assert_eq!(err.label(), "no-search-parameter");
        assert!(err.to_string().contains("requires at least one search parameter"));
    }

    #[test]
    fn all_trivial_parameters_are_rejected() {
        let input = params(r#"{"condition":"","ids":[],"other":null}"#);
        let err = validate("getPolygeneticRiskScores", Some(&input)).unwrap_err();
        assert_eq!(err.label(), "no-non-empty-search-parameter");
        assert!(err.to_string().contains("non-empty search parameter"));
        assert_eq!(err.code(), 400);
        assert_eq!(err.endpoint(), "getPolygeneticRiskScores");
    }

    #[test]
    fn any_meaningful_parameter_is_enough() {
        let accepted = [
            r#"{"gene_ids":["COMT","HTR2A"]}"#,
            r#"{"condition":"","limit":0}"#,
            r#"{"a":null,"flag":false}"#,
            r#"{"a":null,"filter":{}}"#,
            r#"{"ids":[],"name":"x"}"#,
            r#"{"ids":[null]}"#,
        ];
        for input in accepted {
            let value = params(input);
            for endpoint in BROAD_SEARCH_ENDPOINTS {
                assert_eq!(validate(endpoint, Some(&value)), Ok(()), "{endpoint}: {input}");
            }
        }
    }

    #[test]
    fn validation_error_maps_to_crate_error() {
        let err = validate("getDrugGeneInteractions", None).unwrap_err();
        let mapped = Error::from(err);
        assert_eq!(mapped.kind(), ErrorKind::Validation);
        assert_eq!(
            mapped.message(),
            Some("Missing parameters object for endpoint: getDrugGeneInteractions")
        );
        assert!(mapped.hint().is_some());
    }
}
