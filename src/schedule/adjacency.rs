use super::slot_utils::PeriodGrid;
use super::types::{Assignment, Day, Period, PeriodKind, SchoolClass, Subject};

/// Would placing `subject` at `period_index` repeat the nearest lesson already
/// placed before it in the same break-free run?
///
/// Unfilled lessons are skipped. A break or lunch ends the run. Only the
/// nearest placed lesson is decisive; anything earlier is not looked at.
pub fn violates_adjacency(
    grid: &PeriodGrid,
    day: Day,
    class: &SchoolClass,
    period_index: u32,
    subject: &Subject,
    assignment: &Assignment,
) -> bool {
    nearest_placed_repeats(grid.preceding(period_index), day, class, subject, assignment)
}

/// Same rule as [`violates_adjacency`], walking forward. Needed when cells are
/// filled out of period order.
pub fn violates_following_adjacency(
    grid: &PeriodGrid,
    day: Day,
    class: &SchoolClass,
    period_index: u32,
    subject: &Subject,
    assignment: &Assignment,
) -> bool {
    nearest_placed_repeats(grid.following(period_index), day, class, subject, assignment)
}

fn nearest_placed_repeats<'a>(
    walk: impl Iterator<Item = &'a Period>,
    day: Day,
    class: &SchoolClass,
    subject: &Subject,
    assignment: &Assignment,
) -> bool {
    for period in walk {
        if matches!(period.kind, PeriodKind::Break | PeriodKind::Lunch) {
            return false;
        }
        let Some(placed) = assignment.get(day, &class.id, period.index) else {
            continue;
        };
        if placed.subject_id == subject.id {
            return true;
        }
        let placed_category = class.subject(&placed.subject_id).and_then(Subject::category_key);
        return match (placed_category, subject.category_key()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
    }
    false
}
