mod commands;
mod render;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use turni_core::access::UserRole;
use turni_core::assignment::parse_date_key;
use turni_core::month::YearMonth;
use turni_core::turni::Turni;

#[derive(Parser)]
#[command(name = "turni")]
#[command(about = "Assign operators to shifts and keep track of who worked what")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatsView {
    Monthly,
    Annual,
    Operators,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the rotation and coverage for a month
    Month {
        /// Month to show (YYYY-MM, defaults to the current month)
        month: Option<String>,
    },
    /// Show who works each role on a day
    Day {
        /// Date (YYYY-MM-DD or e.g. "tomorrow", "next fri")
        date: String,
    },
    /// Put an operator on a role for a day
    Assign {
        date: String,
        role: String,
        operator: String,

        /// Don't send WhatsApp notifications for this change
        #[arg(long)]
        no_notify: bool,
    },
    /// Clear a role for a day
    Unassign { date: String, role: String },
    /// Assignment counts and rankings
    Stats {
        #[arg(value_enum, default_value = "monthly")]
        view: StatsView,

        /// Print the numbers as JSON
        #[arg(long)]
        json: bool,
    },
    /// List or edit operators and roles
    Roster {
        #[command(subcommand)]
        action: Option<RosterAction>,
    },
    /// Show or toggle which features are visible
    Features {
        #[arg(long)]
        whatsapp: Option<bool>,
        #[arg(long)]
        settings: Option<bool>,
        #[arg(long)]
        stats: Option<bool>,
    },
    /// API users for turni-server
    Users {
        #[command(subcommand)]
        action: Option<UsersAction>,
    },
    /// WhatsApp notifications
    Whatsapp {
        #[command(subcommand)]
        action: WhatsappAction,
    },
    /// Write settings and assignments to a JSON backup
    Export {
        /// Output file (defaults to backup_calendario.json)
        path: Option<String>,
    },
    /// Restore settings and assignments from a JSON backup
    Import {
        path: String,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Put roster and notification preferences back to defaults
    Reset {
        #[arg(short, long)]
        yes: bool,
    },
    /// Show where turni keeps its files
    Config,
}

#[derive(Subcommand)]
pub enum RosterAction {
    AddRole { name: String },
    RemoveRole { name: String },
    AddOperator { name: String },
    RemoveOperator { name: String },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// Register a user and print their token
    Add {
        name: String,

        /// admin, operatore or visualizzatore. Asking for admin needs approval.
        #[arg(long)]
        role: Option<UserRole>,
    },
    SetRole { name: String, role: UserRole },
    /// Promote a pending admin
    Approve { name: String },
    Remove { name: String },
}

#[derive(Subcommand)]
pub enum WhatsappAction {
    /// Send a test message with the configured provider
    Test { phone: String },
    /// Set an operator's WhatsApp number
    Contact {
        operator: String,
        phone: String,

        /// Keep the number but don't message it
        #[arg(long)]
        disabled: bool,
    },
    /// Send reminders to everyone assigned tomorrow
    Remind,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut turni = Turni::load()?;

    match cli.command {
        Commands::Month { month } => {
            let month = match month {
                Some(s) => YearMonth::parse(&s)?,
                None => YearMonth::of(today()),
            };
            commands::month::run(&turni, month)
        }
        Commands::Day { date } => commands::day::run(&turni, parse_date_arg(&date)?),
        Commands::Assign {
            date,
            role,
            operator,
            no_notify,
        } => commands::assign::run(&turni, parse_date_arg(&date)?, &role, Some(operator.as_str()), !no_notify).await,
        Commands::Unassign { date, role } => {
            commands::assign::run(&turni, parse_date_arg(&date)?, &role, None, false).await
        }
        Commands::Stats { view, json } => commands::stats::run(&turni, view, json),
        Commands::Roster { action } => commands::roster::run(&mut turni, action),
        Commands::Features {
            whatsapp,
            settings,
            stats,
        } => commands::features::run(&mut turni, whatsapp, settings, stats),
        Commands::Users { action } => commands::users::run(&mut turni, action),
        Commands::Whatsapp { action } => commands::whatsapp::run(&mut turni, action).await,
        Commands::Export { path } => commands::backup::export(&turni, path.as_deref()),
        Commands::Import { path, yes } => commands::backup::import(&mut turni, &path, yes),
        Commands::Reset { yes } => commands::backup::reset(&mut turni, yes),
        Commands::Config => commands::config::run(&turni),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// YYYY-MM-DD, or anything fuzzydate understands ("tomorrow", "next fri").
fn parse_date_arg(s: &str) -> Result<NaiveDate> {
    if let Ok(date) = parse_date_key(s) {
        return Ok(date);
    }

    let expanded = expand_abbreviations(s);
    let datetime = fuzzydate::parse(&expanded).map_err(|_| anyhow::anyhow!("Could not parse date: \"{}\"", s))?;
    Ok(datetime.date())
}

/// Expand common abbreviations that fuzzydate doesn't handle.
fn expand_abbreviations(input: &str) -> String {
    const ABBREVIATIONS: [(&str, &str); 22] = [
        ("mon", "monday"),
        ("tue", "tuesday"),
        ("tues", "tuesday"),
        ("wed", "wednesday"),
        ("thu", "thursday"),
        ("thur", "thursday"),
        ("thurs", "thursday"),
        ("fri", "friday"),
        ("sat", "saturday"),
        ("sun", "sunday"),
        ("jan", "january"),
        ("feb", "february"),
        ("mar", "march"),
        ("apr", "april"),
        ("jun", "june"),
        ("jul", "july"),
        ("aug", "august"),
        ("sep", "september"),
        ("sept", "september"),
        ("oct", "october"),
        ("nov", "november"),
        ("dec", "december"),
    ];

    input
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            ABBREVIATIONS
                .iter()
                .find(|(short, _)| *short == word)
                .map_or(word, |(_, full)| *full)
                .to_string()
        })
        .collect::<Vec<_>>()
        .join(" ")
}
