use anyhow::Result;
use owo_colors::OwoColorize;
use turni_core::access::{Permission, UserRole};
use turni_core::turni::Turni;

use crate::UsersAction;

pub fn run(turni: &mut Turni, action: Option<UsersAction>) -> Result<()> {
    let role = turni.config().role;
    role.require(Permission::ManageUsers)?;

    let Some(action) = action else {
        print_users(turni);
        return Ok(());
    };

    match action {
        UsersAction::Add { name, role: requested } => {
            let user = turni.edit_config(|config| config.add_user(&name, requested))?;
            println!("{} Added {} as {}", "✓".green(), user.name.bold(), user.role);
            if user.role.is_pending_admin() {
                println!("{}", format!("  Run `turni users approve {}` to make them admin", user.name).dimmed());
            }
            println!("  Token: {}", user.token);
        }
        UsersAction::SetRole { name, role } => {
            turni.edit_config(|config| config.set_user_role(&name, role))?;
            println!("{} {} is now {}", "✓".green(), name, role);
        }
        UsersAction::Approve { name } => {
            let role = turni.edit_config(|config| config.approve_user(&name))?;
            println!("{} {} is now {}", "✓".green(), name, role);
        }
        UsersAction::Remove { name } => {
            role.require(Permission::Delete)?;
            turni.edit_config(|config| config.remove_user(&name))?;
            println!("{} Removed {}", "✓".green(), name);
        }
    }

    Ok(())
}

fn print_users(turni: &Turni) {
    let users = &turni.config().users;
    if users.is_empty() {
        println!("{}", "No API users. Add one with `turni users add <name>`".dimmed());
        return;
    }

    for user in users {
        let role = match user.role {
            UserRole::PendingAdmin => "pending admin".yellow().to_string(),
            role => role.to_string(),
        };
        println!("  {:<16} {}", user.name, role);
    }
}
