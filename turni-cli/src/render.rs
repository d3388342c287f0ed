//! Colored terminal rendering for turni-core types.

use owo_colors::OwoColorize;
use turni_core::ShiftKind;
use turni_core::month::{DayCell, MonthGrid};
use turni_core::stats::Medal;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for ShiftKind {
    fn render(&self) -> String {
        match self {
            ShiftKind::Afternoon => self.label().red().to_string(),
            ShiftKind::Morning => self.label().yellow().to_string(),
            ShiftKind::Night => self.label().blue().to_string(),
            ShiftKind::Rest | ShiftKind::Unwind => self.label().dimmed().to_string(),
        }
    }
}

impl Render for Medal {
    fn render(&self) -> String {
        match self {
            Medal::Gold => "🥇".to_string(),
            Medal::Silver => "🥈".to_string(),
            Medal::Bronze => "🥉".to_string(),
            Medal::Last => "🥄".to_string(),
        }
    }
}

pub fn render_medal(medal: Option<Medal>) -> String {
    medal.map(|m| m.render()).unwrap_or_else(|| "  ".to_string())
}

/// Single-letter tag for a shift, used in the month grid.
fn shift_letter(kind: ShiftKind) -> char {
    match kind {
        ShiftKind::Afternoon => 'P',
        ShiftKind::Morning => 'M',
        ShiftKind::Night => 'N',
        ShiftKind::Rest => 'R',
        ShiftKind::Unwind => 'S',
    }
}

const CELL_WIDTH: usize = 9;

/// Plain text of a grid cell, e.g. ` 1 P 2/6`.
fn cell_text(cell: &DayCell) -> String {
    let day = cell.date.format("%-d").to_string();
    let letter = shift_letter(cell.shift.kind);
    if cell.shift.active {
        let covered = cell.roles.iter().filter(|(_, c)| *c).count();
        format!("{:>2} {} {}/{}", day, letter, covered, cell.roles.len())
    } else {
        format!("{:>2} {}", day, letter)
    }
}

impl Render for DayCell {
    fn render(&self) -> String {
        let text = format!("{:<width$}", cell_text(self), width = CELL_WIDTH);
        let colored = match self.shift.kind {
            ShiftKind::Afternoon => text.red().to_string(),
            ShiftKind::Morning => text.yellow().to_string(),
            ShiftKind::Night => text.blue().to_string(),
            ShiftKind::Rest | ShiftKind::Unwind => text.dimmed().to_string(),
        };
        if self.is_today {
            colored.bold().underline().to_string()
        } else {
            colored
        }
    }
}

impl Render for MonthGrid {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        let title = self.month.first_day().format("%B %Y").to_string();
        lines.push(title.bold().to_string());

        let header: Vec<String> = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
            .iter()
            .map(|d| format!("{:<width$}", d, width = CELL_WIDTH))
            .collect();
        lines.push(header.join(" ").dimmed().to_string());

        for week in self.weeks() {
            let row: Vec<String> = week
                .iter()
                .map(|cell| match cell {
                    Some(cell) => cell.render(),
                    None => " ".repeat(CELL_WIDTH),
                })
                .collect();
            lines.push(row.join(" "));
        }

        lines.push(String::new());
        lines.push(format!(
            "{} {} {} {} {}",
            "P afternoon".red(),
            "M morning".yellow(),
            "N night".blue(),
            "R rest".dimmed(),
            "S unwind".dimmed()
        ));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use turni_core::shift::shift_for;

    fn cell(y: i32, m: u32, d: u32, roles: Vec<(String, bool)>) -> DayCell {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        DayCell {
            date,
            shift: shift_for(date),
            is_today: false,
            roles,
        }
    }

    #[test]
    fn active_cell_shows_coverage() {
        let c = cell(
            2025,
            4,
            1,
            vec![("Sala 1".into(), true), ("Sala 2".into(), false), ("Olieria".into(), true)],
        );
        assert_eq!(cell_text(&c), " 1 P 2/3");
    }

    #[test]
    fn inactive_cell_has_no_coverage() {
        let c = cell(2025, 4, 3, Vec::new());
        assert_eq!(cell_text(&c), " 3 R");
    }

    #[test]
    fn missing_medal_keeps_alignment() {
        assert_eq!(render_medal(None), "  ");
        assert_eq!(render_medal(Some(Medal::Last)), "🥄");
    }

    #[test]
    fn month_grid_has_header_weeks_and_legend() {
        use turni_core::Assignments;
        use turni_core::month::YearMonth;
        use turni_core::shift::BASE_DATE;

        let month = YearMonth::new(2025, 4).unwrap();
        let today = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let grid = MonthGrid::build(month, BASE_DATE, today, &["Sala 1".to_string()], &Assignments::new());

        let text = grid.render();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].contains("April 2025"));
        assert!(lines[1].contains("Mon"));
        // Title, header, five weeks, blank line, legend
        assert_eq!(lines.len(), 2 + grid.weeks().count() + 2);
        let legend = lines.last().unwrap();
        for key in ["P afternoon", "M morning", "N night", "R rest", "S unwind"] {
            assert!(legend.contains(key), "legend is missing {key}");
        }
    }
}
