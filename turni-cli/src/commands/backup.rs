use std::path::Path;

use anyhow::{Context, Result};
use dialoguer::Confirm;
use owo_colors::OwoColorize;
use turni_core::access::Permission;
use turni_core::backup::{BACKUP_FILE_NAME, Backup, ImportedBackup, reset_settings};
use turni_core::turni::Turni;

pub fn export(turni: &Turni, path: Option<&str>) -> Result<()> {
    let path = Path::new(path.unwrap_or(BACKUP_FILE_NAME));
    let assignments = turni.store().load()?;

    let json = Backup::new(turni.config(), &assignments).to_json()?;
    std::fs::write(path, json).with_context(|| format!("Could not write {}", path.display()))?;

    println!(
        "{} Exported {} days to {}",
        "✓".green(),
        assignments.len(),
        path.display()
    );
    Ok(())
}

pub fn import(turni: &mut Turni, path: &str, yes: bool) -> Result<()> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Could not read {}", path))?;
    let backup = ImportedBackup::parse(&content)?;

    let role = turni.config().role;
    if backup.settings.is_some() {
        role.require(Permission::ManageSettings)?;
    }
    if backup.assignments.is_some() {
        role.require(Permission::Write)?;
    }

    let days = backup.assignments.as_ref().map(|a| a.len()).unwrap_or(0);
    println!("{}", format!("Backup: {} days, settings {}", days, if backup.settings.is_some() { "included" } else { "missing" }).dimmed());

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Import will overwrite current settings and matching days. Continue?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Import cancelled".dimmed());
            return Ok(());
        }
    }

    if let Some(settings) = &backup.settings {
        turni.edit_config(|config| {
            settings.apply_to(config);
            Ok(())
        })?;
    }

    if let Some(assignments) = backup.assignments {
        let all = turni.store().import(assignments)?;
        tracing::info!(imported = days, total = all.len(), "imported assignments");
    }

    println!("{} Imported {}", "✓".green(), path);
    Ok(())
}

pub fn reset(turni: &mut Turni, yes: bool) -> Result<()> {
    turni.config().role.require(Permission::ManageSettings)?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Reset roles, operators and notification preferences to defaults?")
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(());
        }
    }

    turni.edit_config(|config| {
        reset_settings(config);
        Ok(())
    })?;

    println!("{} Settings reset", "✓".green());
    Ok(())
}
