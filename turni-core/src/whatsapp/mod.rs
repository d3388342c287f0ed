//! WhatsApp notifications for operators.
//!
//! Messages go through one of three WhatsApp Business providers. Settings and
//! the operator phone book live in the `[whatsapp]` section of the config.

mod client;
mod plan;
mod template;

pub use client::{SendReceipt, WhatsAppClient};
pub use plan::{PlannedMessage, plan_change_notifications, plan_reminders};
pub use template::{MessageTemplate, format_date_for_message, render_template, validate_phone_number};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TurniError, TurniResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Twilio,
    Wati,
    #[serde(rename = "aisensy")]
    AiSensy,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Provider::Twilio => "Twilio",
            Provider::Wati => "WATI",
            Provider::AiSensy => "AiSensy",
        };
        write!(f, "{name}")
    }
}

fn default_true() -> bool {
    true
}

/// Which events trigger a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationToggles {
    #[serde(default = "default_true")]
    pub new_assignment: bool,
    #[serde(default = "default_true")]
    pub reminder_tomorrow: bool,
    #[serde(default = "default_true")]
    pub change_assignment: bool,
}

impl Default for NotificationToggles {
    fn default() -> Self {
        NotificationToggles {
            new_assignment: true,
            reminder_tomorrow: true,
            change_assignment: true,
        }
    }
}

fn twilio_api_url() -> String {
    "https://api.twilio.com/2010-04-01/Accounts".to_string()
}

fn wati_api_url() -> String {
    "https://live-server.wati.io/api/v1".to_string()
}

fn aisensy_api_url() -> String {
    "https://backend.aisensy.com/campaign/t1/api/v2".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwilioConfig {
    #[serde(default)]
    pub account_sid: String,
    #[serde(default)]
    pub auth_token: String,
    /// Sender, e.g. `whatsapp:+14155238886`
    #[serde(default)]
    pub whatsapp_number: String,
    #[serde(default = "twilio_api_url")]
    pub api_url: String,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        TwilioConfig {
            account_sid: String::new(),
            auth_token: String::new(),
            whatsapp_number: String::new(),
            api_url: twilio_api_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "wati_api_url")]
    pub api_url: String,
}

impl Default for WatiConfig {
    fn default() -> Self {
        WatiConfig {
            api_key: String::new(),
            api_url: wati_api_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSensyConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "aisensy_api_url")]
    pub api_url: String,
}

impl Default for AiSensyConfig {
    fn default() -> Self {
        AiSensyConfig {
            api_key: String::new(),
            api_url: aisensy_api_url(),
        }
    }
}

/// An operator's WhatsApp number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorContact {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatsAppSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub notifications: NotificationToggles,
    #[serde(default)]
    pub twilio: TwilioConfig,
    #[serde(default)]
    pub wati: WatiConfig,
    #[serde(default)]
    pub aisensy: AiSensyConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<OperatorContact>,
}

impl WhatsAppSettings {
    /// Contact that can be messaged: enabled and with a phone number.
    pub fn contact_for(&self, operator: &str) -> Option<&OperatorContact> {
        self.contacts
            .iter()
            .find(|c| c.name == operator && c.enabled && !c.phone.is_empty())
    }

    /// Reject enabled contacts whose phone number is malformed.
    pub fn validate(&self) -> TurniResult<()> {
        let invalid: Vec<&str> = self
            .contacts
            .iter()
            .filter(|c| c.enabled && !c.phone.is_empty() && !validate_phone_number(&c.phone))
            .map(|c| c.name.as_str())
            .collect();

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(TurniError::InvalidPhone(invalid.join(", ")))
        }
    }

    /// Add or update the contact for `name`.
    pub fn set_contact(&mut self, name: &str, phone: &str, enabled: bool) {
        match self.contacts.iter_mut().find(|c| c.name == name) {
            Some(contact) => {
                contact.phone = phone.to_string();
                contact.enabled = enabled;
            }
            None => self.contacts.push(OperatorContact {
                name: name.to_string(),
                phone: phone.to_string(),
                enabled,
            }),
        }
    }
}
