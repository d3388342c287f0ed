use anyhow::Result;
use owo_colors::OwoColorize;
use turni_core::access::Permission;
use turni_core::turni::Turni;

use crate::RosterAction;

pub fn run(turni: &mut Turni, action: Option<RosterAction>) -> Result<()> {
    let Some(action) = action else {
        print_roster(turni);
        return Ok(());
    };

    if !turni.config().features.show_settings {
        println!("{}", "Settings are turned off (features.show_settings)".dimmed());
        return Ok(());
    }
    turni.config().role.require(Permission::ManageSettings)?;

    let message = turni.edit_config(|config| {
        let roster = &mut config.roster;
        Ok(match action {
            RosterAction::AddRole { name } => format!("Added role {}", roster.add_role(&name)?),
            RosterAction::RemoveRole { name } => {
                roster.remove_role(&name)?;
                format!("Removed role {}", name)
            }
            RosterAction::AddOperator { name } => format!("Added operator {}", roster.add_operator(&name)?),
            RosterAction::RemoveOperator { name } => {
                roster.remove_operator(&name)?;
                format!("Removed operator {}", name)
            }
        })
    })?;

    println!("{} {}", "✓".green(), message);
    Ok(())
}

fn print_roster(turni: &Turni) {
    let roster = &turni.config().roster;

    println!("{}", "Roles".bold());
    for role in &roster.roles {
        println!("  {}", role);
    }

    println!();
    println!("{}", "Operators".bold());
    let whatsapp = &turni.config().whatsapp;
    for operator in &roster.operators {
        match whatsapp.contact_for(operator) {
            Some(contact) => println!("  {:<14} {}", operator, contact.phone.dimmed()),
            None => println!("  {}", operator),
        }
    }
}
