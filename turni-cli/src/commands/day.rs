use anyhow::Result;
use chrono::{Local, NaiveDate};
use owo_colors::OwoColorize;
use turni_core::turni::Turni;

use crate::render::Render;

pub fn run(turni: &Turni, date: NaiveDate) -> Result<()> {
    let assignments = turni.store().load()?;
    let info = turni.shift(date);

    println!("{}  {}", format_date_label(date).bold(), info.kind.render());

    if !info.active {
        println!("  {}", "No roles on this day".dimmed());
        return Ok(());
    }

    let day = assignments.day(date);
    for role in &turni.config().roster.roles {
        match day.and_then(|d| d.get(role)) {
            Some(operator) => println!("  {:<12} {}", role, operator),
            None => println!("  {:<12} {}", role, "-".dimmed()),
        }
    }

    // Roles that were assigned but later removed from the roster
    if let Some(day) = day {
        for (role, operator) in day.iter().filter(|(r, _)| !turni.config().roster.has_role(r)) {
            println!("  {:<12} {} {}", role.dimmed(), operator, "(not in roster)".dimmed());
        }
    }

    Ok(())
}

/// "Today", "Tomorrow" or e.g. "Tue Apr 1 2025".
fn format_date_label(date: NaiveDate) -> String {
    let today = Local::now().date_naive();
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}
