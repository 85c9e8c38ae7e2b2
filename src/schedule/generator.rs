use std::collections::{BTreeMap, BTreeSet};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};
use crate::config::GenerationConfig;
use crate::error::Result;
use super::adjacency::violates_adjacency;
use super::inputs::GenerationInputs;
use super::occupancy::OccupancyTracker;
use super::policy::{ceremonial_subject, ceremonial_teacher, PlacementPolicy, RotationCursor};
use super::types::{Assignment, ClassId, Day, SchoolClass, Subject, FRIDAY};

/// Aggregate outcome of one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub total_cells: usize,
    pub filled_cells: usize,
    pub unfilled_cells: usize,
    pub pinned_cells: usize,
    pub repaired_cells: usize,
    /// Only classes with at least one empty cell
    pub unfilled_by_class: BTreeMap<ClassId, usize>,
}

/// Mutable state of a run: the timetable being built and who is busy when
#[derive(Debug, Default)]
pub(super) struct RunState {
    pub(super) assignment: Assignment,
    pub(super) occupancy: OccupancyTracker,
}

/// Greedy weekly timetable constructor with a priority backfill pass
pub struct Scheduler<'a> {
    pub(super) inputs: &'a GenerationInputs,
    pub(super) config: &'a GenerationConfig,
    pub(super) policy: PlacementPolicy,
    pub(super) morning: BTreeSet<u32>,
    pub(super) lessons: Vec<u32>,
}

impl<'a> Scheduler<'a> {
    pub fn new(inputs: &'a GenerationInputs, config: &'a GenerationConfig) -> Self {
        Self {
            inputs,
            config,
            policy: PlacementPolicy::from_config(config),
            morning: inputs.grid.morning_window(),
            lessons: inputs.grid.lesson_indices(),
        }
    }

    /// Builds a fresh timetable. Inputs with nothing to schedule are rejected
    /// before any work is done.
    pub fn run<R: Rng>(&self, rng: &mut R) -> Result<(Assignment, GenerationReport)> {
        self.inputs.check_generatable()?;
        info!(
            classes = self.inputs.classes.len(),
            lessons = self.lessons.len(),
            days = self.inputs.grid.active_days().len(),
            cap = self.config.max_teacher_lessons_per_day,
            "generating timetable"
        );

        let mut state = RunState::default();
        let mut report = GenerationReport::default();

        report.pinned_cells = self.pin_ceremonial(&mut state);
        self.main_pass(&mut state, rng);
        report.repaired_cells = self.repair_pass(&mut state);

        self.fill_report(&state.assignment, &mut report);
        info!(
            filled = report.filled_cells,
            unfilled = report.unfilled_cells,
            repaired = report.repaired_cells,
            "timetable generated"
        );
        Ok((state.assignment, report))
    }

    /// Puts each class's ceremonial subject on Friday's first lesson
    fn pin_ceremonial(&self, state: &mut RunState) -> usize {
        let Some(first_lesson) = self.inputs.grid.first_lesson_index() else {
            return 0;
        };
        if !self.inputs.grid.is_active(FRIDAY) {
            debug!("friday is not active, ceremonial subjects are not scheduled");
            return 0;
        }

        let mut pinned = 0;
        for class in &self.inputs.classes {
            let Some(subject) = ceremonial_subject(class) else {
                continue;
            };
            let teacher = ceremonial_teacher(class, subject, &self.inputs.roster).map(|t| t.id.as_str());
            if !state.occupancy.is_teacher_free(FRIDAY, first_lesson, teacher) {
                warn!(
                    class_id = %class.id,
                    teacher = teacher.unwrap_or_default(),
                    "ceremonial slot pinned onto a teacher who is already busy"
                );
            }
            state.assignment.place(FRIDAY, &class.id, first_lesson, &subject.id);
            state.occupancy.commit(FRIDAY, first_lesson, teacher);
            debug!(class_id = %class.id, subject_id = %subject.id, "ceremonial subject pinned");
            pinned += 1;
        }
        pinned
    }

    fn main_pass<R: Rng>(&self, state: &mut RunState, rng: &mut R) {
        let classes = &self.inputs.classes;
        let mut order: Vec<usize> = (0..classes.len()).collect();

        for &day in self.inputs.grid.active_days() {
            for &period in &self.lessons {
                // no class gets first pick every time
                order.shuffle(rng);

                for &ci in &order {
                    let class = &classes[ci];
                    if state.assignment.is_filled(day, &class.id, period) {
                        continue;
                    }
                    let excluded = ceremonial_subject(class).map(|s| s.id.as_str());

                    if self.morning.contains(&period) {
                        if let Some(subject) = self.policy.first_priority(class, excluded) {
                            if self.can_place(state, day, period, class, subject) {
                                self.commit(state, day, period, class, subject);
                                continue;
                            }
                        }
                    }

                    let mut cursor = RotationCursor::random(class.subjects.len(), rng);
                    let mut placed = false;
                    for _ in 0..class.subjects.len() {
                        let Some(subject) = cursor.next(&class.subjects) else {
                            break;
                        };
                        if Some(subject.id.as_str()) == excluded {
                            continue;
                        }
                        if self.can_place(state, day, period, class, subject) {
                            self.commit(state, day, period, class, subject);
                            placed = true;
                            break;
                        }
                    }
                    if !placed {
                        debug!(day, period, class_id = %class.id, "no candidate fits, cell left empty");
                    }
                }
            }
        }
    }

    pub(super) fn teacher_id(&self, class: &SchoolClass, subject: &Subject) -> Option<&'a str> {
        self.inputs
            .roster
            .teacher_for(&class.id, &subject.id)
            .map(|t| t.id.as_str())
    }

    /// Hard constraints plus the morning confinement, checked against the
    /// lessons placed earlier in the day
    pub(super) fn can_place(
        &self,
        state: &RunState,
        day: Day,
        period: u32,
        class: &SchoolClass,
        subject: &Subject,
    ) -> bool {
        let teacher = self.teacher_id(class, subject);
        if self.policy.is_restricted(subject) && !self.morning.contains(&period) {
            return false;
        }
        state.occupancy.is_teacher_free(day, period, teacher)
            && state
                .occupancy
                .under_daily_cap(day, teacher, self.config.max_teacher_lessons_per_day)
            && !violates_adjacency(&self.inputs.grid, day, class, period, subject, &state.assignment)
    }

    pub(super) fn commit(
        &self,
        state: &mut RunState,
        day: Day,
        period: u32,
        class: &SchoolClass,
        subject: &Subject,
    ) {
        state.assignment.place(day, &class.id, period, &subject.id);
        state.occupancy.commit(day, period, self.teacher_id(class, subject));
    }

    fn fill_report(&self, assignment: &Assignment, report: &mut GenerationReport) {
        let days = self.inputs.grid.active_days();
        for class in &self.inputs.classes {
            let mut empty = 0;
            for &day in days {
                for &period in &self.lessons {
                    if !assignment.is_filled(day, &class.id, period) {
                        empty += 1;
                    }
                }
            }
            if empty > 0 {
                report.unfilled_by_class.insert(class.id.clone(), empty);
            }
            report.unfilled_cells += empty;
        }
        report.total_cells = days.len() * self.lessons.len() * self.inputs.classes.len();
        report.filled_cells = report.total_cells - report.unfilled_cells;
    }
}
