//! Message texts and formatting helpers.

use chrono::{Locale, NaiveDate};
use serde::{Deserialize, Serialize};

use super::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageTemplate {
    NewAssignment,
    ReminderTomorrow,
    ChangeAssignment,
}

impl MessageTemplate {
    /// Template text for `provider`, with `{{operator}}`, `{{role}}` and
    /// `{{date}}` placeholders.
    pub fn text(self, provider: Provider) -> &'static str {
        match (self, provider) {
            (MessageTemplate::NewAssignment, Provider::Twilio) => {
                "Ciao {{operator}}! Sei stato assegnato al ruolo {{role}} per il {{date}}. Calendario Turni App."
            }
            (MessageTemplate::NewAssignment, Provider::Wati) => {
                "Nuovo turno assegnato:\n👤 Operatore: {{operator}}\n🏢 Ruolo: {{role}}\n📅 Data: {{date}}\n\nCalendario Turni"
            }
            (MessageTemplate::NewAssignment, Provider::AiSensy) => {
                "Nuovo Assignment\n\nOperatore: {{operator}}\nRuolo: {{role}}\nData: {{date}}\n\nGrazie!"
            }
            (MessageTemplate::ReminderTomorrow, Provider::Twilio) => {
                "Promemoria: Domani {{date}} sei assegnato al ruolo {{role}}. Buona giornata!"
            }
            (MessageTemplate::ReminderTomorrow, Provider::Wati) => {
                "⏰ Promemoria Turno\n\n📅 Domani: {{date}}\n🏢 Ruolo: {{role}}\n👤 Operatore: {{operator}}\n\nNon dimenticare!"
            }
            (MessageTemplate::ReminderTomorrow, Provider::AiSensy) => {
                "Promemoria\n\nDomani {{date}} - {{role}}\n\nBuona giornata {{operator}}!"
            }
            (MessageTemplate::ChangeAssignment, Provider::Twilio) => {
                "Attenzione {{operator}}! Il tuo turno del {{date}} è cambiato. Nuovo ruolo: {{role}}."
            }
            (MessageTemplate::ChangeAssignment, Provider::Wati) => {
                "🔄 Cambio Turno\n\n📅 Data: {{date}}\n👤 Operatore: {{operator}}\n🏢 Nuovo Ruolo: {{role}}\n\nVerifica il calendario!"
            }
            (MessageTemplate::ChangeAssignment, Provider::AiSensy) => {
                "Cambio Turno\n\nData: {{date}}\nNuovo ruolo: {{role}}\n\nOperatore: {{operator}}"
            }
        }
    }

    pub fn render(self, provider: Provider, vars: &[(&str, &str)]) -> String {
        render_template(self.text(provider), vars)
    }
}

/// Replace every `{{key}}` in `template`. Unknown placeholders are left as is.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{{{key}}}}}"), value)
    })
}

/// E.164 with a leading `+`: `+` then 2 to 15 digits, the first not zero.
pub fn validate_phone_number(phone: &str) -> bool {
    let Some(digits) = phone.strip_prefix('+') else {
        return false;
    };

    (2..=15).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0')
}

/// Long Italian date used in messages, e.g. `martedì 1 aprile 2025`.
pub fn format_date_for_message(date: NaiveDate) -> String {
    date.format_localized("%A %-d %B %Y", Locale::it_IT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_every_occurrence() {
        let text = render_template("{{a}}-{{b}}-{{a}} {{c}}", &[("a", "1"), ("b", "2")]);
        assert_eq!(text, "1-2-1 {{c}}");
    }

    #[test]
    fn twilio_new_assignment_text() {
        let text = MessageTemplate::NewAssignment.render(
            Provider::Twilio,
            &[("operator", "Imelio"), ("role", "Sala 1"), ("date", "martedì 1 aprile 2025")],
        );
        assert_eq!(
            text,
            "Ciao Imelio! Sei stato assegnato al ruolo Sala 1 per il martedì 1 aprile 2025. Calendario Turni App."
        );
    }

    #[test]
    fn every_template_has_all_placeholders_for_wati() {
        for template in [
            MessageTemplate::NewAssignment,
            MessageTemplate::ReminderTomorrow,
            MessageTemplate::ChangeAssignment,
        ] {
            let text = template.text(Provider::Wati);
            for key in ["{{operator}}", "{{role}}", "{{date}}"] {
                assert!(text.contains(key), "{template:?} is missing {key}");
            }
        }
    }

    #[test]
    fn phone_validation() {
        assert!(validate_phone_number("+393331234567"));
        assert!(validate_phone_number("+12"));
        assert!(!validate_phone_number("+1"));
        assert!(!validate_phone_number("393331234567"));
        assert!(!validate_phone_number("+0393331234567"));
        assert!(!validate_phone_number("+39 333 1234567"));
        assert!(!validate_phone_number("+1234567890123456"));
    }

    #[test]
    fn italian_long_date() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        assert_eq!(format_date_for_message(date), "martedì 1 aprile 2025");

        let date = NaiveDate::from_ymd_opt(2026, 11, 29).unwrap();
        assert_eq!(format_date_for_message(date), "domenica 29 novembre 2026");

        let date = NaiveDate::from_ymd_opt(2025, 10, 16).unwrap();
        assert_eq!(format_date_for_message(date), "giovedì 16 ottobre 2025");
    }
}
