use anyhow::Result;
use owo_colors::OwoColorize;
use turni_core::turni::Turni;

pub fn run(turni: &Turni) -> Result<()> {
    let store = turni.store();

    println!("{}", "Paths".bold());
    println!("  Config:       {}", turni.config_path().display());
    println!("  Assignments:  {}", store.path().display());

    println!();
    println!("{}", "Identity".bold());
    println!("  Role:         {}", turni.config().role);
    println!("  Rotation:     starts {}", turni.config().base_date);

    let role = turni.config().role;
    println!();
    println!("{}", "Can".bold());
    println!("  Edit assignments:  {}", yes_no(role.can_modify_assignments()));
    println!("  Manage settings:   {}", yes_no(role.can_manage_settings()));
    println!("  Manage users:      {}", yes_no(role.can_manage_users()));
    println!("  Hide features:     {}", yes_no(role.can_hide_features()));
    if role.is_pending_admin() {
        println!("{}", "  Waiting for an admin to approve".yellow());
    }

    Ok(())
}

fn yes_no(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".dimmed().to_string()
    }
}
