//! Shared data model: the record envelope, the two collection field types,
//! and the runtime configuration.

use serde::{Deserialize, Serialize};

/// Default API base path; overridable via config for other deployments.
pub const DEFAULT_BASE_URL: &str = "https://my.living-apps.de/rest";

/// One entity instance as the records API delivers it.
///
/// `record_id` is server-assigned on creation and immutable afterwards.
/// Timestamps are kept as the ISO strings the wire delivers; `fields` stays
/// a nested object, typed per collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<F> {
    pub record_id: String,
    pub createdat: String,
    #[serde(default)]
    pub updatedat: Option<String>,
    pub fields: F,
}

/// Fields of the employees collection. All members optional: the server
/// stores whatever subset was submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// CSS color, assigned from [`EMPLOYEE_PALETTE`] at creation time and
    /// stored explicitly so list order never reassigns colors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Employee,
}

/// Fields of the shifts collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShiftFields {
    /// Calendar date in `YYYY-MM-DD` form, no time component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Reference url to an employee record. May be absent; a shift is not
    /// guaranteed to have an assigned employee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_type: Option<ShiftType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    Frueh,
    Spaet,
    Nacht,
}

impl ShiftType {
    /// Display label for calendar cells.
    pub fn label(&self) -> &'static str {
        match self {
            ShiftType::Frueh => "Frühschicht",
            ShiftType::Spaet => "Spätschicht",
            ShiftType::Nacht => "Nachtschicht",
        }
    }
}

/// Fixed color palette for employees, indexed by creation order.
pub const EMPLOYEE_PALETTE: [&str; 8] = [
    "#4f46e5", "#0891b2", "#16a34a", "#d97706", "#dc2626", "#9333ea", "#0d9488", "#db2777",
];

/// Palette color for the nth created employee (wraps around).
pub fn palette_color(index: usize) -> &'static str {
    EMPLOYEE_PALETTE[index % EMPLOYEE_PALETTE.len()]
}

/// Runtime configuration stored in ~/.shiftplan/config.json, with
/// `SHIFTPLAN_*` environment variables taking precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Attached as `X-API-Key` to every request when set. Browser
    /// deployments rely on ambient session cookies instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub employees_app_id: String,
    pub shifts_app_id: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Config {
    pub fn config_path() -> std::path::PathBuf {
        dirs::home_dir()
            .unwrap_or_default()
            .join(".shiftplan")
            .join("config.json")
    }

    /// Load config from disk, then apply environment overrides.
    pub fn load() -> Result<Config, String> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            serde_json::from_str(&content)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?
        } else {
            Config {
                base_url: default_base_url(),
                api_key: None,
                employees_app_id: String::new(),
                shifts_app_id: String::new(),
            }
        };

        if let Ok(v) = std::env::var("SHIFTPLAN_BASE_URL") {
            config.base_url = v;
        }
        if let Ok(v) = std::env::var("SHIFTPLAN_API_KEY") {
            config.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("SHIFTPLAN_EMPLOYEES_APP_ID") {
            config.employees_app_id = v;
        }
        if let Ok(v) = std::env::var("SHIFTPLAN_SHIFTS_APP_ID") {
            config.shifts_app_id = v;
        }

        if config.employees_app_id.is_empty() || config.shifts_app_id.is_empty() {
            return Err(
                "employeesAppId and shiftsAppId must be set (config file or SHIFTPLAN_* env)"
                    .to_string(),
            );
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_envelope_deserialization() {
        let json = r##"{
            "record_id": "64a3f0c2d1e4b5a69788c0e1",
            "createdat": "2025-01-02T08:30:00",
            "updatedat": null,
            "fields": {"name": "Anna", "role": "manager", "color": "#4f46e5"}
        }"##;

        let rec: Record<EmployeeFields> = serde_json::from_str(json).unwrap();
        assert_eq!(rec.record_id, "64a3f0c2d1e4b5a69788c0e1");
        assert!(rec.updatedat.is_none());
        assert_eq!(rec.fields.name.as_deref(), Some("Anna"));
        assert_eq!(rec.fields.role, Some(Role::Manager));
    }

    #[test]
    fn test_shift_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ShiftType::Frueh).unwrap(),
            "\"frueh\""
        );
        let parsed: ShiftType = serde_json::from_str("\"nacht\"").unwrap();
        assert_eq!(parsed, ShiftType::Nacht);
    }

    #[test]
    fn test_partial_fields_skip_unset_members() {
        // PATCH bodies must contain only the changed fields; the server
        // merges, it does not replace.
        let fields = ShiftFields {
            shift_type: Some(ShiftType::Spaet),
            ..Default::default()
        };
        let json = serde_json::to_value(&fields).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["shift_type"], "spaet");
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(palette_color(0), EMPLOYEE_PALETTE[0]);
        assert_eq!(palette_color(EMPLOYEE_PALETTE.len()), EMPLOYEE_PALETTE[0]);
        assert_eq!(palette_color(3), palette_color(11));
    }

    #[test]
    fn test_config_parsing() {
        let json = r#"{
            "baseUrl": "https://example.test/rest",
            "apiKey": "secret",
            "employeesAppId": "aaaaaaaaaaaaaaaaaaaaaaaa",
            "shiftsAppId": "bbbbbbbbbbbbbbbbbbbbbbbb"
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.base_url, "https://example.test/rest");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_config_default_base_url() {
        let json = r#"{"employeesAppId": "a", "shiftsAppId": "b"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_none());
    }
}
