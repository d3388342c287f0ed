//! Configuration at ~/.config/turni/config.toml

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::UserRole;
use crate::error::{TurniError, TurniResult};
use crate::roster::Roster;
use crate::shift::BASE_DATE;
use crate::whatsapp::WhatsAppSettings;

static DEFAULT_DATA_DIR: &str = "~/.local/share/turni";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn is_default_data_dir(p: &PathBuf) -> bool {
    *p == default_data_dir()
}

fn default_base_date() -> NaiveDate {
    BASE_DATE
}

fn default_true() -> bool {
    true
}

fn default_reminder_time() -> u32 {
    60
}

/// Which parts of the front-ends are visible. Only users allowed to hide
/// features may change these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSettings {
    #[serde(default = "default_true")]
    pub show_whatsapp: bool,
    #[serde(default = "default_true")]
    pub show_settings: bool,
    #[serde(default = "default_true")]
    pub show_stats: bool,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        FeatureSettings {
            show_whatsapp: true,
            show_settings: true,
            show_stats: true,
        }
    }
}

/// Notification preferences kept alongside the roster in backups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub email_notifications: bool,
    #[serde(default)]
    pub push_notifications: bool,
    /// Minutes before a shift to send a reminder
    #[serde(default = "default_reminder_time")]
    pub reminder_time: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            email_notifications: false,
            push_notifications: false,
            reminder_time: default_reminder_time(),
        }
    }
}

/// A user allowed to call the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUser {
    pub name: String,
    pub token: String,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurniConfig {
    #[serde(default = "default_data_dir", skip_serializing_if = "is_default_data_dir")]
    pub data_dir: PathBuf,

    /// Day the eight-day rotation is anchored to
    #[serde(default = "default_base_date")]
    pub base_date: NaiveDate,

    /// Role the CLI acts with
    #[serde(default)]
    pub role: UserRole,

    #[serde(default)]
    pub roster: Roster,

    #[serde(default)]
    pub preferences: Preferences,

    #[serde(default)]
    pub features: FeatureSettings,

    #[serde(default)]
    pub whatsapp: WhatsAppSettings,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<ApiUser>,
}

impl Default for TurniConfig {
    fn default() -> Self {
        TurniConfig {
            data_dir: default_data_dir(),
            base_date: default_base_date(),
            role: UserRole::default(),
            roster: Roster::default(),
            preferences: Preferences::default(),
            features: FeatureSettings::default(),
            whatsapp: WhatsAppSettings::default(),
            users: Vec::new(),
        }
    }
}

impl TurniConfig {
    pub fn config_path() -> TurniResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TurniError::Config("Could not determine config directory".into()))?
            .join("turni");

        Ok(config_dir.join("config.toml"))
    }

    /// Read the file at `path`, then apply `TURNI_*` environment overrides
    /// (`TURNI_DATA_DIR`, `TURNI_WHATSAPP__ENABLED`, ...).
    pub fn load_with_env(path: &Path) -> TurniResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("TURNI").prefix_separator("_").separator("__"))
            .build()
            .map_err(|e| TurniError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| TurniError::Config(e.to_string()))
    }

    /// Read the file at `path` only.
    pub fn load_from(path: &Path) -> TurniResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| TurniError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| TurniError::Config(e.to_string()))
    }

    pub fn save_to(&self, path: &Path) -> TurniResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| TurniError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TurniError::Config(format!("Could not create config directory: {e}")))?;
        }

        std::fs::write(path, content)
            .map_err(|e| TurniError::Config(format!("Could not write config file: {e}")))?;

        // Provider credentials live in here
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> TurniResult<()> {
        let contents = format!(
            "\
# turni configuration

# Where assignments are stored:
# data_dir = \"{DEFAULT_DATA_DIR}\"

# First afternoon of the eight-day rotation:
# base_date = \"{BASE_DATE}\"

# Role used by the CLI (admin, operatore, visualizzatore):
# role = \"admin\"

# [roster]
# operators = [\"Pestarino\", \"Maccioni\"]
# roles = [\"Sala 1\", \"Sala 2\", \"Olieria\"]

# [whatsapp]
# enabled = true
# provider = \"twilio\"
#
# [whatsapp.twilio]
# account_sid = \"AC...\"
# auth_token = \"...\"
# whatsapp_number = \"whatsapp:+14155238886\"
#
# [[whatsapp.contacts]]
# name = \"Pestarino\"
# phone = \"+393331234567\"
# enabled = true

# API users for turni-server:
# [[users]]
# name = \"reception\"
# token = \"change-me\"
# role = \"operatore\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TurniError::Config(format!("Could not create config directory: {e}")))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| TurniError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned())
    }

    pub fn user_for_token(&self, token: &str) -> Option<&ApiUser> {
        self.users.iter().find(|u| u.token == token)
    }

    pub fn user_named(&self, name: &str) -> Option<&ApiUser> {
        self.users.iter().find(|u| u.name == name)
    }

    fn user_named_mut(&mut self, name: &str) -> TurniResult<&mut ApiUser> {
        self.users
            .iter_mut()
            .find(|u| u.name == name)
            .ok_or_else(|| TurniError::User(format!("User '{name}' not found")))
    }

    /// Register an API user with a fresh token. Asking for admin only
    /// gets `pending_admin` until someone approves it.
    pub fn add_user(&mut self, name: &str, requested: Option<UserRole>) -> TurniResult<ApiUser> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TurniError::User("User name cannot be empty".into()));
        }
        if self.user_named(name).is_some() {
            return Err(TurniError::User(format!("User '{name}' already exists")));
        }

        let user = ApiUser {
            name: name.to_string(),
            token: Uuid::new_v4().simple().to_string(),
            role: UserRole::for_signup(requested),
        };
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn set_user_role(&mut self, name: &str, role: UserRole) -> TurniResult<()> {
        let demotes_admin = self.user_named(name).is_some_and(|u| u.role == UserRole::Admin) && role != UserRole::Admin;
        if demotes_admin {
            self.keep_an_admin()?;
        }
        self.user_named_mut(name)?.role = role;
        Ok(())
    }

    /// Promote a pending admin.
    pub fn approve_user(&mut self, name: &str) -> TurniResult<UserRole> {
        let user = self.user_named_mut(name)?;
        if !user.role.is_pending_admin() {
            return Err(TurniError::User(format!("User '{name}' is not waiting for approval")));
        }
        user.role = user.role.approve();
        Ok(user.role)
    }

    pub fn remove_user(&mut self, name: &str) -> TurniResult<ApiUser> {
        let index = self
            .users
            .iter()
            .position(|u| u.name == name)
            .ok_or_else(|| TurniError::User(format!("User '{name}' not found")))?;
        if self.users[index].role == UserRole::Admin {
            self.keep_an_admin()?;
        }
        Ok(self.users.remove(index))
    }

    fn keep_an_admin(&self) -> TurniResult<()> {
        let admins = self.users.iter().filter(|u| u.role == UserRole::Admin).count();
        if admins <= 1 {
            return Err(TurniError::User("At least one admin must remain".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::whatsapp::Provider;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TurniConfig::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config.base_date, BASE_DATE);
        assert_eq!(config.role, UserRole::Admin);
        assert_eq!(config.roster, Roster::default());
        assert!(config.features.show_stats);
        assert_eq!(config.preferences.reminder_time, 60);
        assert!(!config.whatsapp.enabled);
    }

    #[test]
    fn commented_default_file_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        TurniConfig::create_default_config(&path).unwrap();

        let config = TurniConfig::load_from(&path).unwrap();
        assert_eq!(config.data_dir, default_data_dir());
    }

    #[test]
    fn reads_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
data_dir = "/srv/turni"
base_date = "2026-01-05"
role = "operatore"

[roster]
operators = ["Uno", "Due"]

[features]
show_whatsapp = false

[whatsapp]
enabled = true
provider = "wati"

[whatsapp.wati]
api_key = "k"

[[users]]
name = "desk"
token = "t0k"
role = "visualizzatore"
"#,
        )
        .unwrap();

        let config = TurniConfig::load_from(&path).unwrap();
        assert_eq!(config.data_path(), PathBuf::from("/srv/turni"));
        assert_eq!(config.base_date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(config.role, UserRole::Operator);
        assert_eq!(config.roster.operators, vec!["Uno".to_string(), "Due".to_string()]);
        assert_eq!(config.roster.roles.len(), 6);
        assert!(!config.features.show_whatsapp);
        assert!(config.features.show_settings);
        assert_eq!(config.whatsapp.provider, Provider::Wati);
        assert_eq!(config.whatsapp.wati.api_key, "k");
        assert_eq!(config.user_for_token("t0k").map(|u| u.role), Some(UserRole::Viewer));
        assert!(config.user_for_token("nope").is_none());
    }

    #[test]
    fn save_then_load_keeps_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = TurniConfig::default();
        config.roster.add_role("Cassa").unwrap();
        config.features.show_stats = false;
        config.save_to(&path).unwrap();

        let loaded = TurniConfig::load_from(&path).unwrap();
        assert!(loaded.roster.has_role("Cassa"));
        assert!(!loaded.features.show_stats);
    }

    #[test]
    fn signup_and_approval() {
        let mut config = TurniConfig::default();

        let desk = config.add_user(" desk ", None).unwrap();
        assert_eq!(desk.name, "desk");
        assert_eq!(desk.role, UserRole::Viewer);
        assert_eq!(desk.token.len(), 32);
        assert_eq!(config.user_for_token(&desk.token).map(|u| u.name.as_str()), Some("desk"));

        let boss = config.add_user("boss", Some(UserRole::Admin)).unwrap();
        assert_eq!(boss.role, UserRole::PendingAdmin);
        assert_ne!(boss.token, desk.token);

        assert!(matches!(config.add_user("desk", None), Err(TurniError::User(_))));
        assert!(config.approve_user("desk").is_err());
        assert_eq!(config.approve_user("boss").unwrap(), UserRole::Admin);
        assert!(config.approve_user("ghost").is_err());
    }

    #[test]
    fn last_admin_cannot_be_demoted_or_removed() {
        let mut config = TurniConfig::default();
        config.add_user("boss", Some(UserRole::Admin)).unwrap();
        config.approve_user("boss").unwrap();
        config.add_user("desk", Some(UserRole::Operator)).unwrap();

        assert!(config.set_user_role("boss", UserRole::Viewer).is_err());
        assert!(config.remove_user("boss").is_err());

        config.set_user_role("desk", UserRole::Admin).unwrap();
        config.set_user_role("boss", UserRole::Viewer).unwrap();
        assert_eq!(config.remove_user("boss").unwrap().role, UserRole::Viewer);
        assert_eq!(config.users.len(), 1);
    }
}
