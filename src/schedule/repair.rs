use tracing::debug;
use super::adjacency::violates_following_adjacency;
use super::generator::{RunState, Scheduler};
use super::policy::ceremonial_subject;
use super::types::{Day, SchoolClass};

impl Scheduler<'_> {
    /// Second chance for classes that ended a day without any priority
    /// subject. Only empty cells are touched; nothing placed earlier moves.
    /// Returns how many cells were added.
    pub(super) fn repair_pass(&self, state: &mut RunState) -> usize {
        let periods = self.inputs.grid.lessons_morning_first();
        let mut repaired = 0;

        for &day in self.inputs.grid.active_days() {
            for class in &self.inputs.classes {
                if self.has_priority_on(state, day, class) {
                    continue;
                }
                let excluded = ceremonial_subject(class).map(|s| s.id.as_str());
                let candidates = self.policy.backfill_candidates(class, excluded);

                'candidates: for subject in candidates {
                    for &period in &periods {
                        if state.assignment.is_filled(day, &class.id, period) {
                            continue;
                        }
                        if self.can_place(state, day, period, class, subject)
                            && !violates_following_adjacency(
                                &self.inputs.grid,
                                day,
                                class,
                                period,
                                subject,
                                &state.assignment,
                            )
                        {
                            self.commit(state, day, period, class, subject);
                            debug!(day, period, class_id = %class.id, subject_id = %subject.id, "priority subject backfilled");
                            repaired += 1;
                            break 'candidates;
                        }
                    }
                }
            }
        }
        repaired
    }

    /// Has the class already got a priority subject (other than its
    /// ceremonial one) on this day?
    fn has_priority_on(&self, state: &RunState, day: Day, class: &SchoolClass) -> bool {
        let excluded = ceremonial_subject(class).map(|s| s.id.as_str());
        state
            .assignment
            .day_of_class(day, &class.id)
            .filter(|(_, placed)| Some(placed.subject_id.as_str()) != excluded)
            .filter_map(|(_, placed)| class.subject(&placed.subject_id))
            .any(|subject| self.policy.is_priority(subject))
    }
}
