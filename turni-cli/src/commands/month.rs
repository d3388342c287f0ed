use anyhow::Result;
use chrono::Local;
use turni_core::month::{MonthGrid, YearMonth};
use turni_core::turni::Turni;

use crate::render::Render;

pub fn run(turni: &Turni, month: YearMonth) -> Result<()> {
    let assignments = turni.store().load()?;
    let config = turni.config();

    let grid = MonthGrid::build(
        month,
        config.base_date,
        Local::now().date_naive(),
        &config.roster.roles,
        &assignments,
    );

    println!("{}", grid.render());
    Ok(())
}
