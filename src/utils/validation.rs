use crate::utils::error::{AppError, AppResult};
use mongodb::bson::oid::ObjectId;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const USER_SCHEMA: &[&str] = &["email", "password", "name"];
pub const DUKAAN_SCHEMA: &[&str] = &["name", "city", "categories"];
pub const RATING_SCHEMA: &[&str] = &["business", "rating"];
pub const CITY_SCHEMA: &[&str] = &["name"];

/// Checks that every required key is present in a JSON body. Null and
/// blank strings count as missing. Fails on the first missing key, in schema
/// order.
pub fn require_fields(payload: &Value, fields: &[&str]) -> AppResult<()> {
    let object = payload
        .as_object()
        .ok_or_else(|| AppError::InvalidRequest("Missing JSON in request".to_string()))?;

    for field in fields {
        match object.get(*field) {
            None | Some(Value::Null) => {
                return Err(AppError::InvalidRequest(format!("Missing {} parameter", field)));
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                return Err(AppError::InvalidRequest(format!("Missing {} parameter", field)));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Validates the schema, then deserializes the body into its typed request.
pub fn parse_payload<T: DeserializeOwned>(payload: Value, fields: &[&str]) -> AppResult<T> {
    require_fields(&payload, fields)?;
    serde_json::from_value(payload)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid request body: {}", e)))
}

pub fn parse_object_id(raw: &str, what: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| AppError::InvalidRequest(format!("Invalid {} id: {}", what, raw)))
}

pub fn non_blank(raw: &str, field: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidRequest(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// Escapes regex metacharacters so user input is matched literally by `$regex`.
pub fn escape_regex(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' | '#'
                | '-' | '&' | '~'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive substring test, same semantics as the `$regex` + `i` filter.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reports_first_missing_field() {
        let payload = json!({ "email": "a@b.c", "name": null });
        let err = require_fields(&payload, USER_SCHEMA).unwrap_err();
        assert_eq!(err, AppError::InvalidRequest("Missing password parameter".into()));
    }

    #[test]
    fn null_counts_as_missing() {
        let payload = json!({ "email": "a@b.c", "password": "pw", "name": null });
        let err = require_fields(&payload, USER_SCHEMA).unwrap_err();
        assert_eq!(err, AppError::InvalidRequest("Missing name parameter".into()));
    }

    #[test]
    fn blank_string_counts_as_missing() {
        let payload = json!({ "email": "  ", "password": "pw" });
        let err = require_fields(&payload, &["email", "password"]).unwrap_err();
        assert_eq!(err, AppError::InvalidRequest("Missing email parameter".into()));

        let payload = json!({ "email": "a@b.c", "password": "" });
        let err = require_fields(&payload, &["email", "password"]).unwrap_err();
        assert_eq!(err, AppError::InvalidRequest("Missing password parameter".into()));
    }

    #[test]
    fn rejects_non_object_body() {
        let err = require_fields(&json!([1, 2]), CITY_SCHEMA).unwrap_err();
        assert_eq!(err, AppError::InvalidRequest("Missing JSON in request".into()));
    }

    #[test]
    fn rejects_malformed_object_id() {
        assert!(parse_object_id("not-an-id", "user").is_err());
        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex(), "user").unwrap(), id);
    }

    #[test]
    fn escapes_metacharacters() {
        assert_eq!(escape_regex("a.b*c"), "a\\.b\\*c");
        assert_eq!(escape_regex("(chai)"), "\\(chai\\)");
        assert_eq!(escape_regex("plain"), "plain");
    }

    #[test]
    fn substring_match_ignores_case() {
        assert!(contains_ignore_case("Navi Mumbai", "mumbai"));
        assert!(contains_ignore_case("mumbai", "MUM"));
        assert!(!contains_ignore_case("Pune", "mumbai"));
    }
}
