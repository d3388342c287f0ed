//! Deciding who gets which message.

use chrono::NaiveDate;
use serde::Serialize;

use super::template::{MessageTemplate, format_date_for_message};
use super::{Provider, WhatsAppSettings};
use crate::assignment::{AssignmentChange, DayAssignments, diff_day};

/// A message ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMessage {
    pub phone: String,
    pub template: MessageTemplate,
    pub operator: String,
    pub role: String,
    /// Already formatted for the message body
    pub date: String,
}

impl PlannedMessage {
    pub fn text(&self, provider: Provider) -> String {
        self.template.render(
            provider,
            &[
                ("operator", self.operator.as_str()),
                ("role", self.role.as_str()),
                ("date", self.date.as_str()),
            ],
        )
    }
}

/// Messages to send after `date` changed from `old` to `new`.
pub fn plan_change_notifications(
    date: NaiveDate,
    old: &DayAssignments,
    new: &DayAssignments,
    settings: &WhatsAppSettings,
) -> Vec<PlannedMessage> {
    if !settings.enabled {
        return Vec::new();
    }

    let formatted = format_date_for_message(date);

    diff_day(old, new)
        .into_iter()
        .filter_map(|change| {
            let Some(contact) = settings.contact_for(change.operator()) else {
                tracing::debug!(operator = change.operator(), "no WhatsApp contact, skipping");
                return None;
            };

            let template = match change {
                AssignmentChange::New { .. } if settings.notifications.new_assignment => {
                    MessageTemplate::NewAssignment
                }
                AssignmentChange::Changed { .. } if settings.notifications.change_assignment => {
                    MessageTemplate::ChangeAssignment
                }
                _ => return None,
            };

            Some(PlannedMessage {
                phone: contact.phone.clone(),
                template,
                operator: change.operator().to_string(),
                role: change.role().to_string(),
                date: formatted.clone(),
            })
        })
        .collect()
}

/// Reminders for everyone assigned on `tomorrow`.
pub fn plan_reminders(
    tomorrow: NaiveDate,
    day: Option<&DayAssignments>,
    settings: &WhatsAppSettings,
) -> Vec<PlannedMessage> {
    if !settings.enabled || !settings.notifications.reminder_tomorrow {
        return Vec::new();
    }
    let Some(day) = day else {
        return Vec::new();
    };

    let formatted = format_date_for_message(tomorrow);

    day.iter()
        .filter_map(|(role, operator)| {
            let contact = settings.contact_for(operator)?;
            Some(PlannedMessage {
                phone: contact.phone.clone(),
                template: MessageTemplate::ReminderTomorrow,
                operator: operator.clone(),
                role: role.clone(),
                date: formatted.clone(),
            })
        })
        .collect()
}
