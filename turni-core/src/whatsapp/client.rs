//! HTTP delivery through the configured provider.

use chrono::Local;
use reqwest::{Client, Request};
use serde::Serialize;
use serde_json::{Value, json};

use super::plan::PlannedMessage;
use super::template::{MessageTemplate, format_date_for_message};
use super::{Provider, WhatsAppSettings};
use crate::error::{TurniError, TurniResult};

/// Provider acknowledgement of a sent message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    pub message_id: Option<String>,
}

pub struct WhatsAppClient {
    http: Client,
    settings: WhatsAppSettings,
}

fn require<'a>(value: &'a str, what: &str) -> TurniResult<&'a str> {
    if value.is_empty() {
        Err(TurniError::Config(format!("WhatsApp {what} is not configured")))
    } else {
        Ok(value)
    }
}

fn id_field(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl WhatsAppClient {
    pub fn new(settings: &WhatsAppSettings) -> Self {
        WhatsAppClient {
            http: Client::new(),
            settings: settings.clone(),
        }
    }

    pub fn provider(&self) -> Provider {
        self.settings.provider
    }

    /// Build the provider request for one message without sending it.
    pub fn request(&self, phone: &str, message: &str) -> TurniResult<Request> {
        let request = match self.settings.provider {
            Provider::Twilio => {
                let cfg = &self.settings.twilio;
                let sid = require(&cfg.account_sid, "Twilio account_sid")?;
                let from = require(&cfg.whatsapp_number, "Twilio whatsapp_number")?;
                let to = format!("whatsapp:{phone}");

                self.http
                    .post(format!("{}/{}/Messages.json", cfg.api_url, sid))
                    .basic_auth(sid, Some(&cfg.auth_token))
                    .form(&[("From", from), ("To", to.as_str()), ("Body", message)])
                    .build()?
            }
            Provider::Wati => {
                let cfg = &self.settings.wati;
                let key = require(&cfg.api_key, "WATI api_key")?;

                self.http
                    .post(format!("{}/sendSessionMessage/{}", cfg.api_url, phone))
                    .bearer_auth(key)
                    .json(&json!({ "messageText": message }))
                    .build()?
            }
            Provider::AiSensy => {
                let cfg = &self.settings.aisensy;
                let key = require(&cfg.api_key, "AiSensy api_key")?;

                self.http
                    .post(format!("{}/send-message", cfg.api_url))
                    .header("X-AiSensy-API-Key", key)
                    .json(&json!({
                        "apikey": key,
                        "mobile": phone,
                        "msg": message,
                        "priority": 1,
                    }))
                    .build()?
            }
        };

        Ok(request)
    }

    /// Turn a provider response into a receipt or an error.
    fn receipt(&self, ok: bool, body: &Value) -> TurniResult<SendReceipt> {
        let provider = self.settings.provider;
        let accepted = match provider {
            Provider::AiSensy => ok && body.get("status").and_then(Value::as_str) == Some("success"),
            Provider::Twilio | Provider::Wati => ok,
        };

        if !accepted {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(TurniError::Notification {
                provider: provider.to_string(),
                message,
            });
        }

        let id_key = match provider {
            Provider::Twilio => "sid",
            Provider::Wati | Provider::AiSensy => "id",
        };
        Ok(SendReceipt {
            message_id: id_field(body, id_key),
        })
    }

    pub async fn send(&self, phone: &str, message: &str) -> TurniResult<SendReceipt> {
        let request = self.request(phone, message)?;
        tracing::info!(provider = %self.settings.provider, phone, "sending WhatsApp message");

        let response = self.http.execute(request).await?;
        let ok = response.status().is_success();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        let receipt = self.receipt(ok, &body);
        if let Err(e) = &receipt {
            tracing::warn!(provider = %self.settings.provider, phone, error = %e, "WhatsApp send failed");
        }
        receipt
    }

    /// Send every planned message. A failure is logged and the rest still go out.
    pub async fn deliver(&self, planned: &[PlannedMessage]) -> Vec<(PlannedMessage, TurniResult<SendReceipt>)> {
        let mut results = Vec::with_capacity(planned.len());
        for message in planned {
            let text = message.text(self.settings.provider);
            let result = self.send(&message.phone, &text).await;
            results.push((message.clone(), result));
        }
        results
    }

    /// Send a sample new-assignment message to `phone` to check credentials.
    pub async fn test(&self, phone: &str) -> TurniResult<SendReceipt> {
        let date = format_date_for_message(Local::now().date_naive());
        let text = MessageTemplate::NewAssignment.render(
            self.settings.provider,
            &[("operator", "Test User"), ("role", "Test Role"), ("date", date.as_str())],
        );
        self.send(phone, &text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: Provider) -> WhatsAppSettings {
        let mut settings = WhatsAppSettings {
            enabled: true,
            provider,
            ..Default::default()
        };
        settings.twilio.account_sid = "AC123".into();
        settings.twilio.auth_token = "secret".into();
        settings.twilio.whatsapp_number = "whatsapp:+14155238886".into();
        settings.wati.api_key = "wati-key".into();
        settings.aisensy.api_key = "ai-key".into();
        settings
    }

    fn body_text(request: &Request) -> String {
        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap_or_default();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn twilio_posts_a_form_with_basic_auth() {
        let client = WhatsAppClient::new(&settings(Provider::Twilio));
        let request = client.request("+393331234567", "Ciao").unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
        let auth = request.headers()["authorization"].to_str().unwrap();
        assert!(auth.starts_with("Basic "));

        let body = body_text(&request);
        assert!(body.contains("To=whatsapp%3A%2B393331234567"));
        assert!(body.contains("Body=Ciao"));
        assert!(body.contains("From=whatsapp%3A%2B14155238886"));
    }

    #[test]
    fn wati_posts_json_with_bearer_token() {
        let client = WhatsAppClient::new(&settings(Provider::Wati));
        let request = client.request("+393331234567", "Ciao").unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://live-server.wati.io/api/v1/sendSessionMessage/+393331234567"
        );
        assert_eq!(request.headers()["authorization"], "Bearer wati-key");

        let body: Value = serde_json::from_str(&body_text(&request)).unwrap();
        assert_eq!(body["messageText"], "Ciao");
    }

    #[test]
    fn aisensy_sends_key_in_header_and_body() {
        let client = WhatsAppClient::new(&settings(Provider::AiSensy));
        let request = client.request("+393331234567", "Ciao").unwrap();

        assert_eq!(request.headers()["x-aisensy-api-key"], "ai-key");
        let body: Value = serde_json::from_str(&body_text(&request)).unwrap();
        assert_eq!(body["mobile"], "+393331234567");
        assert_eq!(body["msg"], "Ciao");
        assert_eq!(body["priority"], 1);
    }

    #[test]
    fn missing_credentials_are_config_errors() {
        let mut s = settings(Provider::Twilio);
        s.twilio.account_sid.clear();
        let client = WhatsAppClient::new(&s);
        assert!(matches!(client.request("+393331234567", "x"), Err(TurniError::Config(_))));
    }

    #[tokio::test]
    async fn deliver_reports_each_failure_and_keeps_going() {
        // No credentials: every send fails before touching the network
        let client = WhatsAppClient::new(&WhatsAppSettings::default());
        let planned: Vec<PlannedMessage> = ["+393331111111", "+393332222222"]
            .iter()
            .map(|phone| PlannedMessage {
                phone: phone.to_string(),
                template: MessageTemplate::ReminderTomorrow,
                operator: "Imelio".into(),
                role: "Sala 1".into(),
                date: "martedì 1 aprile 2025".into(),
            })
            .collect();

        let results = client.deliver(&planned).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, r)| matches!(r, Err(TurniError::Config(_)))));
        assert_eq!(results[1].0.phone, "+393332222222");
    }

    #[test]
    fn receipts_follow_provider_rules() {
        let twilio = WhatsAppClient::new(&settings(Provider::Twilio));
        let receipt = twilio.receipt(true, &json!({ "sid": "SM1" })).unwrap();
        assert_eq!(receipt.message_id.as_deref(), Some("SM1"));

        match twilio.receipt(false, &json!({ "message": "bad number" })) {
            Err(TurniError::Notification { provider, message }) => {
                assert_eq!(provider, "Twilio");
                assert_eq!(message, "bad number");
            }
            other => panic!("expected Notification error, got {other:?}"),
        }

        // AiSensy needs status == success even on HTTP 200
        let aisensy = WhatsAppClient::new(&settings(Provider::AiSensy));
        assert!(aisensy.receipt(true, &json!({ "status": "failed" })).is_err());
        let receipt = aisensy.receipt(true, &json!({ "status": "success", "id": 42 })).unwrap();
        assert_eq!(receipt.message_id.as_deref(), Some("42"));
    }
}
