use anyhow::{Result, bail};
use chrono::{Duration, Local};
use owo_colors::OwoColorize;
use turni_core::access::Permission;
use turni_core::turni::Turni;
use turni_core::whatsapp::{WhatsAppClient, plan_reminders, validate_phone_number};

use crate::WhatsappAction;

pub async fn run(turni: &mut Turni, action: WhatsappAction) -> Result<()> {
    if !turni.config().features.show_whatsapp {
        println!("{}", "WhatsApp is turned off (features.show_whatsapp)".dimmed());
        return Ok(());
    }

    match action {
        WhatsappAction::Test { phone } => test(turni, &phone).await,
        WhatsappAction::Contact {
            operator,
            phone,
            disabled,
        } => set_contact(turni, &operator, &phone, !disabled),
        WhatsappAction::Remind => remind(turni).await,
    }
}

async fn test(turni: &Turni, phone: &str) -> Result<()> {
    if !validate_phone_number(phone) {
        bail!("Invalid phone number. Expected format: +393331234567");
    }

    let client = WhatsAppClient::new(&turni.config().whatsapp);
    let receipt = client.test(phone).await?;

    println!("{} Test message sent via {}", "✓".green(), client.provider());
    if let Some(id) = receipt.message_id {
        println!("  {}", format!("id: {id}").dimmed());
    }
    Ok(())
}

fn set_contact(turni: &mut Turni, operator: &str, phone: &str, enabled: bool) -> Result<()> {
    turni.config().role.require(Permission::ManageSettings)?;

    if !turni.config().roster.has_operator(operator) {
        bail!("Unknown operator '{}'", operator);
    }

    turni.edit_config(|config| {
        config.whatsapp.set_contact(operator, phone, enabled);
        config.whatsapp.validate()
    })?;

    let state = if enabled { "enabled".green().to_string() } else { "disabled".dimmed().to_string() };
    println!("{} {} → {} ({})", "✓".green(), operator, phone, state);
    Ok(())
}

async fn remind(turni: &Turni) -> Result<()> {
    let config = turni.config();
    if !config.whatsapp.enabled {
        println!("{}", "WhatsApp notifications are disabled".dimmed());
        return Ok(());
    }

    let tomorrow = Local::now().date_naive() + Duration::days(1);
    let assignments = turni.store().load()?;
    let planned = plan_reminders(tomorrow, assignments.day(tomorrow), &config.whatsapp);

    if planned.is_empty() {
        println!("{}", "No reminders to send".dimmed());
        return Ok(());
    }

    let client = WhatsAppClient::new(&config.whatsapp);
    let mut failed = 0;
    for (message, result) in client.deliver(&planned).await {
        match result {
            Ok(_) => println!("  {} {} ({})", "✓".green(), message.operator, message.role),
            Err(e) => {
                failed += 1;
                println!("  {} {} ({}): {}", "✗".red(), message.operator, message.role, e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} reminders failed", failed, planned.len());
    }
    Ok(())
}
