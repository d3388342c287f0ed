//! JSON backup of settings and assignments.
//!
//! The document layout is shared with the web front-end's export, so field
//! names are camelCase:
//!
//! ```json
//! {
//!   "settings": { "roles": [], "operators": [], "emailNotifications": false,
//!                 "pushNotifications": false, "reminderTime": 60 },
//!   "assignments": { "2025-04-01": { "Sala 1": "Imelio" } }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assignment::Assignments;
use crate::config::{Preferences, TurniConfig};
use crate::error::{TurniError, TurniResult};
use crate::roster::clean_names;

pub const BACKUP_FILE_NAME: &str = "backup_calendario.json";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSettings {
    pub roles: Vec<String>,
    pub operators: Vec<String>,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub reminder_time: u32,
}

impl BackupSettings {
    pub fn from_config(config: &TurniConfig) -> Self {
        BackupSettings {
            roles: config.roster.roles.clone(),
            operators: config.roster.operators.clone(),
            email_notifications: config.preferences.email_notifications,
            push_notifications: config.preferences.push_notifications,
            reminder_time: config.preferences.reminder_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Backup {
    pub settings: BackupSettings,
    pub assignments: Assignments,
}

impl Backup {
    pub fn new(config: &TurniConfig, assignments: &Assignments) -> Self {
        Backup {
            settings: BackupSettings::from_config(config),
            assignments: assignments.clone(),
        }
    }

    pub fn to_json(&self) -> TurniResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Settings found in an imported document. Each field is `None` when it was
/// missing or had the wrong type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedSettings {
    pub roles: Option<Vec<String>>,
    pub operators: Option<Vec<String>>,
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub reminder_time: Option<u32>,
}

impl ImportedSettings {
    fn from_value(value: &Value) -> Self {
        let strings = |key: &str| -> Option<Vec<String>> {
            value.get(key)?.as_array().map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
        };

        ImportedSettings {
            roles: strings("roles"),
            operators: strings("operators"),
            email_notifications: value.get("emailNotifications").and_then(Value::as_bool),
            push_notifications: value.get("pushNotifications").and_then(Value::as_bool),
            reminder_time: value
                .get("reminderTime")
                .and_then(Value::as_f64)
                .filter(|n| *n >= 0.0)
                .map(|n| n as u32),
        }
    }

    /// Overwrite only the fields that were present.
    pub fn apply_to(&self, config: &mut TurniConfig) {
        if let Some(roles) = &self.roles {
            config.roster.roles = clean_names(roles.iter().cloned());
        }
        if let Some(operators) = &self.operators {
            config.roster.operators = clean_names(operators.iter().cloned());
        }
        let prefs: &mut Preferences = &mut config.preferences;
        if let Some(v) = self.email_notifications {
            prefs.email_notifications = v;
        }
        if let Some(v) = self.push_notifications {
            prefs.push_notifications = v;
        }
        if let Some(v) = self.reminder_time {
            prefs.reminder_time = v;
        }
    }
}

/// Parsed backup. Either half may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedBackup {
    pub settings: Option<ImportedSettings>,
    pub assignments: Option<Assignments>,
}

impl ImportedBackup {
    pub fn parse(json: &str) -> TurniResult<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| TurniError::Serialization(format!("Invalid backup file: {e}")))?;

        if !value.is_object() {
            return Err(TurniError::Serialization(
                "Invalid backup file: expected a JSON object".into(),
            ));
        }

        let settings = value
            .get("settings")
            .filter(|s| s.is_object())
            .map(ImportedSettings::from_value);

        let assignments = match value.get("assignments") {
            Some(raw) if !raw.is_null() => Some(
                serde_json::from_value(raw.clone())
                    .map_err(|e| TurniError::Serialization(format!("Invalid assignments: {e}")))?,
            ),
            _ => None,
        };

        Ok(ImportedBackup { settings, assignments })
    }
}

/// Put roster and preferences back to their defaults, keeping everything else.
pub fn reset_settings(config: &mut TurniConfig) {
    config.roster = Default::default();
    config.preferences = Preferences::default();
}
