use anyhow::{Result, bail};
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use turni_core::access::Permission;
use turni_core::turni::Turni;
use turni_core::whatsapp::{WhatsAppClient, plan_change_notifications};

/// Set (`Some`) or clear (`None`) the operator on `role` for `date`.
pub async fn run(turni: &Turni, date: NaiveDate, role: &str, operator: Option<&str>, notify: bool) -> Result<()> {
    let config = turni.config();
    config.role.require(Permission::Write)?;

    if !config.roster.has_role(role) {
        bail!("Unknown role '{}'. Known roles: {}", role, config.roster.roles.join(", "));
    }
    if let Some(operator) = operator {
        if !config.roster.has_operator(operator) {
            bail!("Unknown operator '{}'. Run `turni roster` to list operators.", operator);
        }
    }

    let info = turni.shift(date);
    if !info.active {
        println!(
            "{}",
            format!("Note: {} is a {} day, roles aren't shown on it", date, info.kind).yellow()
        );
    }

    let (updated, previous) = turni.store().update_day(date, |day| {
        match operator {
            Some(operator) => day.insert(role.to_string(), operator.to_string()),
            None => day.remove(role),
        };
        Ok(())
    })?;
    if operator.is_none() && !previous.contains_key(role) {
        println!("{}", format!("Nothing assigned to {} on {}", role, date).dimmed());
        return Ok(());
    }
    let current = updated.day(date).cloned().unwrap_or_default();

    match operator {
        Some(operator) => println!("{} {} → {} on {}", "✓".green(), role, operator.bold(), date),
        None => println!("{} {} cleared on {}", "✓".green(), role, date),
    }

    if !notify || !config.features.show_whatsapp {
        return Ok(());
    }

    let planned = plan_change_notifications(date, &previous, &current, &config.whatsapp);
    if planned.is_empty() {
        return Ok(());
    }

    let client = WhatsAppClient::new(&config.whatsapp);
    for (message, result) in client.deliver(&planned).await {
        match result {
            Ok(_) => println!("  {} WhatsApp sent to {}", "✓".green(), message.operator),
            Err(e) => println!("  {} WhatsApp to {} failed: {}", "✗".red(), message.operator, e),
        }
    }

    Ok(())
}
