//! Request validation for write bodies.

use crate::error::AppError;
use crate::store::Row;
use regex::Regex;
use serde_json::Value;

pub struct RequestValidator;

impl RequestValidator {
    /// All required fields must be present. Null and blank strings count as missing.
    /// The error names the whole required set.
    pub fn require(body: &Row, required: &[&str]) -> Result<(), AppError> {
        let missing = required.iter().any(|col| is_blank(body.get(*col)));
        if missing {
            return Err(AppError::Validation(format!(
                "missing required fields: {}",
                required.join(", ")
            )));
        }
        Ok(())
    }

    /// Partial writes may omit required fields but may not blank them.
    pub fn require_present(body: &Row, required: &[&str]) -> Result<(), AppError> {
        match required.iter().find(|col| body.contains_key(**col) && is_blank(body.get(**col))) {
            Some(col) => Err(AppError::Validation(format!("{} cannot be empty", col))),
            None => Ok(()),
        }
    }

    /// Column, when present and non-null, must be a plain decimal string.
    pub fn decimal(body: &Row, col: &str) -> Result<(), AppError> {
        let Some(v) = body.get(col).filter(|v| !v.is_null()) else {
            return Ok(());
        };
        let re = Regex::new(r"^-?\d+(\.\d+)?$")
            .map_err(|_| AppError::Validation(format!("invalid pattern for {}", col)))?;
        match v.as_str() {
            Some(s) if re.is_match(s) => Ok(()),
            _ => Err(AppError::Validation(format!("{} must be a decimal number", col))),
        }
    }
}

fn is_blank(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn blank_and_null_are_missing() {
        let required = ["type_key", "type_label"];
        assert!(RequestValidator::require(&row(json!({"type_key": "a", "type_label": "A"})), &required).is_ok());
        for body in [
            json!({"type_key": "a"}),
            json!({"type_key": "a", "type_label": null}),
            json!({"type_key": " ", "type_label": "A"}),
        ] {
            let err = RequestValidator::require(&row(body), &required).unwrap_err();
            assert_eq!(err.to_string(), "missing required fields: type_key, type_label");
        }
    }

    #[test]
    fn partial_writes_may_omit_but_not_blank() {
        let required = ["name", "sku"];
        assert!(RequestValidator::require_present(&row(json!({"href": "x"})), &required).is_ok());
        let err = RequestValidator::require_present(&row(json!({"sku": ""})), &required).unwrap_err();
        assert_eq!(err.to_string(), "sku cannot be empty");
    }

    #[test]
    fn decimal_strings_only() {
        assert!(RequestValidator::decimal(&row(json!({"price": "19.90"})), "price").is_ok());
        assert!(RequestValidator::decimal(&row(json!({})), "price").is_ok());
        assert!(RequestValidator::decimal(&row(json!({"price": "12,50"})), "price").is_err());
        assert!(RequestValidator::decimal(&row(json!({"price": true})), "price").is_err());
    }
}
