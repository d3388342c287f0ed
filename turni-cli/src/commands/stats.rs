use anyhow::Result;
use owo_colors::OwoColorize;
use turni_core::stats::{OperatorStats, PeriodStats, Ranking, RoleCategory, StatsReport};
use turni_core::turni::Turni;

use crate::StatsView;
use crate::render::render_medal;

pub fn run(turni: &Turni, view: StatsView, json: bool) -> Result<()> {
    let config = turni.config();
    if !config.features.show_stats {
        println!("{}", "Statistics are turned off (features.show_stats)".dimmed());
        return Ok(());
    }

    let assignments = turni.store().load()?;
    let operators = &config.roster.operators;
    let report = StatsReport::build(&assignments, operators);

    if json {
        let value = match view {
            StatsView::Monthly => serde_json::to_value(&report.monthly)?,
            StatsView::Annual => serde_json::to_value(&report.annual)?,
            StatsView::Operators => serde_json::json!({
                "operators": report.operators,
                "global": report.global,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match view {
        StatsView::Monthly => print_periods(&report.monthly, operators),
        StatsView::Annual => print_periods(&report.annual, operators),
        StatsView::Operators => print_operators(&report.operators, &report.global),
    }

    Ok(())
}

fn print_periods(periods: &[PeriodStats], operators: &[String]) {
    if periods.is_empty() {
        println!("{}", "No assignments yet".dimmed());
        return;
    }

    for (i, period) in periods.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", period.period.bold());

        for operator in operators {
            let count = period.counts.get(operator).copied().unwrap_or(0);
            let medal = render_medal(period.ranking.medal_for(operator));
            println!("  {} {:<14} {:>3}", medal, operator, count);
        }

        // Counted but not on the roster any more
        for (operator, count) in period.counts.iter().filter(|(op, _)| !operators.contains(*op)) {
            println!("     {:<14} {:>3}", operator.dimmed(), count.dimmed());
        }
    }
}

fn print_operators(rows: &[OperatorStats], global: &Ranking<String>) {
    println!(
        "{}",
        format!(
            "     {:<14} {:>9} {:>9} {:>9} {:>7}",
            "Operator",
            RoleCategory::Sala,
            RoleCategory::Reparto,
            RoleCategory::Olieria,
            "Total"
        )
        .bold()
    );

    for row in rows {
        let category = |c: RoleCategory| format!("{} {:>6}", render_medal(row.ranking.medal_for(&c)), row.categories.get(c));
        println!(
            "  {} {:<14} {} {} {} {:>7}",
            render_medal(global.medal_for(&row.operator)),
            row.operator,
            category(RoleCategory::Sala),
            category(RoleCategory::Reparto),
            category(RoleCategory::Olieria),
            row.total
        );
    }
}
