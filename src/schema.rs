//! Collection metadata and boundary validation of field payloads.
//!
//! Each collection ("app") is described by a metadata document of controls.
//! Outgoing `fields` objects are validated against it before they reach the
//! network, so schema mistakes surface locally instead of as opaque server
//! rejections. Field values are modeled as a typed sum keyed by the
//! control's declared type rather than as untyped key/value pairs.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::reference;

/// Metadata for one collection, as returned by app provisioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMeta {
    pub app_id: String,
    pub name: String,
    pub controls: HashMap<String, Control>,
}

/// One field declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Control {
    /// Declared control type: `string`, `number`, `bool`, `date/date`,
    /// `date/datetimeminute`, `lookup/select`, `applookup/select`.
    pub fulltype: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    /// Allowed keys for `lookup/select` controls (key -> display label).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookups: Option<HashMap<String, String>>,
    /// Target app url for `applookup/select` controls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_app: Option<String>,
}

/// A field value after validation, typed by its control.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    /// Key of a `lookup/select` option.
    Lookup(String),
    /// Reference url of an `applookup/select` field.
    Reference(String),
}

#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("required field '{0}' is missing")]
    MissingRequired(String),
    #[error("field '{field}' expects {expected}, got {got}")]
    WrongType {
        field: String,
        expected: &'static str,
        got: &'static str,
    },
    #[error("field '{field}': date must be YYYY-MM-DD, got '{value}'")]
    BadDate { field: String, value: String },
    #[error("field '{field}': unknown option '{value}'")]
    UnknownOption { field: String, value: String },
    #[error("field '{field}': reference url carries no record id: '{value}'")]
    BadReference { field: String, value: String },
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expect_str<'a>(
    field: &str,
    expected: &'static str,
    value: &'a Value,
) -> Result<&'a str, FieldError> {
    value.as_str().ok_or_else(|| FieldError::WrongType {
        field: field.to_string(),
        expected,
        got: json_type_name(value),
    })
}

impl FieldValue {
    /// Parse and validate one JSON value against its control declaration.
    pub fn parse(field: &str, control: &Control, value: &Value) -> Result<FieldValue, FieldError> {
        match control.fulltype.as_str() {
            "number" => value
                .as_f64()
                .map(FieldValue::Number)
                .ok_or_else(|| FieldError::WrongType {
                    field: field.to_string(),
                    expected: "number",
                    got: json_type_name(value),
                }),
            "bool" => value
                .as_bool()
                .map(FieldValue::Bool)
                .ok_or_else(|| FieldError::WrongType {
                    field: field.to_string(),
                    expected: "bool",
                    got: json_type_name(value),
                }),
            "date/date" => {
                let s = expect_str(field, "date string", value)?;
                // Strict calendar date, no time component.
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map(FieldValue::Date)
                    .map_err(|_| FieldError::BadDate {
                        field: field.to_string(),
                        value: s.to_string(),
                    })
            }
            "date/datetimeminute" => {
                let s = expect_str(field, "datetime string", value)?;
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
                    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
                    .map(|dt| FieldValue::Date(dt.date()))
                    .map_err(|_| FieldError::BadDate {
                        field: field.to_string(),
                        value: s.to_string(),
                    })
            }
            "lookup/select" => {
                let key = expect_str(field, "lookup key", value)?;
                let known = control
                    .lookups
                    .as_ref()
                    .map(|l| l.contains_key(key))
                    .unwrap_or(false);
                if !known {
                    return Err(FieldError::UnknownOption {
                        field: field.to_string(),
                        value: key.to_string(),
                    });
                }
                Ok(FieldValue::Lookup(key.to_string()))
            }
            "applookup/select" => {
                let url = expect_str(field, "reference url", value)?;
                if reference::extract_record_id(Some(url)).is_none() {
                    return Err(FieldError::BadReference {
                        field: field.to_string(),
                        value: url.to_string(),
                    });
                }
                Ok(FieldValue::Reference(url.to_string()))
            }
            // Text, files and anything unrecognized travel as strings.
            _ => Ok(FieldValue::Text(
                expect_str(field, "string", value)?.to_string(),
            )),
        }
    }
}

/// Validate an outgoing `fields` object against collection metadata.
///
/// Unknown fields, missing required fields, and per-control type or format
/// violations are rejected before any request is made. Null values count as
/// absent.
pub fn validate_fields(
    meta: &AppMeta,
    fields: &serde_json::Map<String, Value>,
) -> Result<(), FieldError> {
    for (name, value) in fields {
        let control = meta
            .controls
            .get(name)
            .ok_or_else(|| FieldError::UnknownField(name.clone()))?;
        if value.is_null() {
            continue;
        }
        FieldValue::parse(name, control, value)?;
    }

    for (name, control) in &meta.controls {
        if control.required {
            let present = fields.get(name).map(|v| !v.is_null()).unwrap_or(false);
            if !present {
                return Err(FieldError::MissingRequired(name.clone()));
            }
        }
    }

    Ok(())
}

// ============================================================================
// Built-in shift-planner metadata
// ============================================================================

fn control(fulltype: &str, label: &str, required: bool) -> Control {
    Control {
        fulltype: fulltype.to_string(),
        label: label.to_string(),
        required,
        lookups: None,
        lookup_app: None,
    }
}

/// Metadata of the employees collection as provisioning creates it.
pub fn employees_meta(app_id: &str) -> AppMeta {
    let mut controls = HashMap::new();
    controls.insert("name".to_string(), control("string", "Name", true));
    controls.insert(
        "role".to_string(),
        Control {
            lookups: Some(HashMap::from([
                ("manager".to_string(), "Manager".to_string()),
                ("employee".to_string(), "Mitarbeiter".to_string()),
            ])),
            ..control("lookup/select", "Rolle", false)
        },
    );
    controls.insert("color".to_string(), control("string", "Farbe", false));
    AppMeta {
        app_id: app_id.to_string(),
        name: "Mitarbeiter".to_string(),
        controls,
    }
}

/// Metadata of the shifts collection. `employees_app_url` is the target of
/// the applookup control.
pub fn shifts_meta(app_id: &str, employees_app_url: &str) -> AppMeta {
    let mut controls = HashMap::new();
    controls.insert("date".to_string(), control("date/date", "Datum", true));
    controls.insert(
        "employee".to_string(),
        Control {
            lookup_app: Some(employees_app_url.to_string()),
            ..control("applookup/select", "Mitarbeiter", false)
        },
    );
    controls.insert(
        "shift_type".to_string(),
        Control {
            lookups: Some(HashMap::from([
                ("frueh".to_string(), "Frühschicht".to_string()),
                ("spaet".to_string(), "Spätschicht".to_string()),
                ("nacht".to_string(), "Nachtschicht".to_string()),
            ])),
            ..control("lookup/select", "Schichttyp", true)
        },
    );
    AppMeta {
        app_id: app_id.to_string(),
        name: "Schichten".to_string(),
        controls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_valid_shift_fields_pass() {
        let meta = shifts_meta(
            "bbbbbbbbbbbbbbbbbbbbbbbb",
            "https://my.living-apps.de/rest/apps/aaaaaaaaaaaaaaaaaaaaaaaa",
        );
        let payload = fields(json!({
            "date": "2025-01-06",
            "employee": "https://my.living-apps.de/rest/apps/aaaaaaaaaaaaaaaaaaaaaaaa/records/64a3f0c2d1e4b5a69788c0e1",
            "shift_type": "frueh"
        }));
        assert!(validate_fields(&meta, &payload).is_ok());
    }

    #[test]
    fn test_missing_required_field() {
        let meta = shifts_meta("b", "https://example.test/rest/apps/a");
        let payload = fields(json!({"shift_type": "frueh"}));
        let err = validate_fields(&meta, &payload).unwrap_err();
        assert!(matches!(err, FieldError::MissingRequired(f) if f == "date"));
    }

    #[test]
    fn test_date_with_time_component_rejected() {
        let meta = shifts_meta("b", "https://example.test/rest/apps/a");
        let payload = fields(json!({"date": "2025-01-06T08:00:00", "shift_type": "frueh"}));
        let err = validate_fields(&meta, &payload).unwrap_err();
        assert!(matches!(err, FieldError::BadDate { .. }));
    }

    #[test]
    fn test_unknown_lookup_key_rejected() {
        let meta = shifts_meta("b", "https://example.test/rest/apps/a");
        let payload = fields(json!({"date": "2025-01-06", "shift_type": "mittag"}));
        let err = validate_fields(&meta, &payload).unwrap_err();
        assert!(matches!(err, FieldError::UnknownOption { value, .. } if value == "mittag"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let meta = employees_meta("a");
        let payload = fields(json!({"name": "Anna", "salary": 3000}));
        let err = validate_fields(&meta, &payload).unwrap_err();
        assert!(matches!(err, FieldError::UnknownField(f) if f == "salary"));
    }

    #[test]
    fn test_reference_without_id_rejected() {
        let meta = shifts_meta("b", "https://example.test/rest/apps/a");
        let payload = fields(json!({
            "date": "2025-01-06",
            "shift_type": "nacht",
            "employee": "https://example.test/rest/apps/a/records/"
        }));
        let err = validate_fields(&meta, &payload).unwrap_err();
        assert!(matches!(err, FieldError::BadReference { .. }));
    }

    #[test]
    fn test_null_counts_as_absent() {
        let meta = employees_meta("a");
        let payload = fields(json!({"name": "Anna", "role": null}));
        assert!(validate_fields(&meta, &payload).is_ok());
        // but a required null is still missing
        let payload = fields(json!({"name": null}));
        assert!(matches!(
            validate_fields(&meta, &payload).unwrap_err(),
            FieldError::MissingRequired(_)
        ));
    }

    #[test]
    fn test_field_value_typing() {
        let num = control("number", "n", false);
        assert_eq!(
            FieldValue::parse("n", &num, &json!(2.5)).unwrap(),
            FieldValue::Number(2.5)
        );
        assert!(matches!(
            FieldValue::parse("n", &num, &json!("2.5")).unwrap_err(),
            FieldError::WrongType { expected: "number", got: "string", .. }
        ));

        let date = control("date/date", "d", false);
        assert_eq!(
            FieldValue::parse("d", &date, &json!("2025-01-06")).unwrap(),
            FieldValue::Date(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap())
        );

        let minute = control("date/datetimeminute", "d", false);
        assert_eq!(
            FieldValue::parse("d", &minute, &json!("2025-01-06T08:30")).unwrap(),
            FieldValue::Date(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap())
        );
    }

    #[test]
    fn test_metadata_roundtrip() {
        let meta = shifts_meta("bbbbbbbbbbbbbbbbbbbbbbbb", "https://example.test/rest/apps/a");
        let json = serde_json::to_string(&meta).unwrap();
        let parsed: AppMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.controls["date"].fulltype, "date/date");
        assert!(parsed.controls["shift_type"].required);
        assert_eq!(
            parsed.controls["employee"].lookup_app.as_deref(),
            Some("https://example.test/rest/apps/a")
        );
    }
}
