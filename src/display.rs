use chrono::Weekday;
use crate::schedule::{Assignment, Day, GenerationReport, PeriodGrid};

/// English weekday name for an ISO day number (1 = Monday)
pub fn weekday_name(day: Day) -> String {
    let weekday = match day {
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        7 => Weekday::Sun,
        _ => return format!("Day {}", day),
    };
    format!("{:?}", weekday)
}

/// Prints the outcome of a generation run
pub fn print_generation_report(plan_id: &str, report: &GenerationReport) {
    println!("\n=== Timetable generated for plan {} ===", plan_id);
    println!("Cells filled: {}/{}", report.filled_cells, report.total_cells);
    println!("Ceremonial slots pinned: {}", report.pinned_cells);
    println!("Priority subjects backfilled: {}", report.repaired_cells);

    if !report.unfilled_by_class.is_empty() {
        println!("⚠️  Unassigned cells ({}):", report.unfilled_cells);
        for (class_id, count) in &report.unfilled_by_class {
            println!("  - {}: {} cell(s)", class_id, count);
        }
    }
}

/// Prints how many lessons a stored plan holds per weekday
pub fn print_plan_summary(plan_id: &str, assignment: &Assignment, grid: Option<&PeriodGrid>) {
    println!("\n=== Plan {} ===", plan_id);
    println!("Total assigned cells: {}", assignment.len());

    let mut days: Vec<Day> = assignment.iter().map(|(key, _)| key.day).collect();
    days.dedup();
    for day in days {
        let count = assignment.iter().filter(|(key, _)| key.day == day).count();
        println!("  {} -> {} lesson(s)", weekday_name(day), count);
    }

    if let Some(grid) = grid {
        let lessons = grid.lesson_indices().len();
        println!("Lesson periods per day in template: {}", lessons);
    }
}
