use anyhow::Result;
use owo_colors::OwoColorize;
use turni_core::access::Permission;
use turni_core::turni::Turni;

fn on_off(value: bool) -> String {
    if value {
        "on".green().to_string()
    } else {
        "off".red().to_string()
    }
}

pub fn run(turni: &mut Turni, whatsapp: Option<bool>, settings: Option<bool>, stats: Option<bool>) -> Result<()> {
    if whatsapp.is_some() || settings.is_some() || stats.is_some() {
        turni.config().role.require(Permission::HideFeatures)?;

        turni.edit_config(|config| {
            let features = &mut config.features;
            if let Some(v) = whatsapp {
                features.show_whatsapp = v;
            }
            if let Some(v) = settings {
                features.show_settings = v;
            }
            if let Some(v) = stats {
                features.show_stats = v;
            }
            Ok(())
        })?;
    }

    let features = turni.config().features;
    println!("{}", "Features".bold());
    println!("  WhatsApp:  {}", on_off(features.show_whatsapp));
    println!("  Settings:  {}", on_off(features.show_settings));
    println!("  Stats:     {}", on_off(features.show_stats));

    Ok(())
}
