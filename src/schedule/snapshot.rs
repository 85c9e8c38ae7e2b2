use rand::Rng;
use tracing::info;
use crate::config::GenerationConfig;
use crate::error::Result;
use crate::store::PlanStore;
use super::generator::{GenerationReport, Scheduler};
use super::inputs::GenerationInputs;
use super::types::Assignment;

/// A plan's current timetable plus the one it replaced, for a single undo
#[derive(Debug, Clone, Default)]
pub struct PlanSession {
    plan_id: String,
    current: Assignment,
    backup: Option<Assignment>,
}

impl PlanSession {
    pub fn new(plan_id: &str) -> Self {
        Self {
            plan_id: plan_id.to_string(),
            ..Self::default()
        }
    }

    /// Resumes a stored plan without regenerating it
    pub fn load<S: PlanStore + ?Sized>(store: &S, plan_id: &str) -> Result<Self> {
        Ok(Self {
            plan_id: plan_id.to_string(),
            current: store.load_assignment(plan_id)?,
            backup: None,
        })
    }

    pub fn plan_id(&self) -> &str {
        &self.plan_id
    }

    pub fn current(&self) -> &Assignment {
        &self.current
    }

    pub fn has_backup(&self) -> bool {
        self.backup.is_some()
    }

    /// Replaces the current timetable with a freshly generated one. When the
    /// inputs hold nothing to schedule the session is left untouched.
    pub fn generate<R: Rng>(
        &mut self,
        inputs: &GenerationInputs,
        config: &GenerationConfig,
        rng: &mut R,
    ) -> Result<GenerationReport> {
        inputs.check_generatable()?;
        self.backup = Some(self.current.clone());
        let (assignment, report) = Scheduler::new(inputs, config).run(rng)?;
        self.current = assignment;
        Ok(report)
    }

    /// Puts back the timetable from before the last generation. Returns false
    /// (and changes nothing) when there is none.
    pub fn revert(&mut self) -> bool {
        match self.backup.take() {
            Some(previous) => {
                info!(plan_id = %self.plan_id, cells = previous.len(), "reverted to previous timetable");
                self.current = previous;
                true
            }
            None => false,
        }
    }

    pub fn save<S: PlanStore + ?Sized>(&self, store: &S) -> Result<()> {
        store.save_assignment(&self.plan_id, &self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use crate::error::TimetableError;
    use crate::schedule::slot_utils::PeriodGrid;
    use crate::schedule::types::{Period, PeriodKind, SchoolClass, Subject, TeacherRoster};
    use crate::store::InMemoryPlanStore;

    fn inputs(classes: Vec<SchoolClass>) -> GenerationInputs {
        let periods = (1..=3)
            .map(|index| Period {
                index,
                kind: PeriodKind::Lesson,
                start: "08:00".into(),
                end: "08:45".into(),
            })
            .collect();
        GenerationInputs::new(PeriodGrid::new(periods, vec![1, 2]).unwrap(), classes, TeacherRoster::new())
    }

    fn class() -> SchoolClass {
        SchoolClass {
            id: "6A".into(),
            name: "6A".into(),
            grade: "6".into(),
            subjects: ["eng", "art"]
                .iter()
                .map(|id| Subject {
                    id: id.to_string(),
                    name: id.to_string(),
                    code: id.to_string(),
                    category: None,
                })
                .collect(),
            class_teacher: None,
        }
    }

    #[test]
    fn revert_restores_the_pre_generation_timetable() {
        let store = InMemoryPlanStore::new();
        let mut previous = Assignment::new();
        previous.place(1, "6A", 1, "hand-placed");
        store.save_assignment("term-1", &previous).unwrap();

        let mut session = PlanSession::load(&store, "term-1").unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        session.generate(&inputs(vec![class()]), &GenerationConfig::default(), &mut rng).unwrap();
        assert_ne!(session.current(), &previous);
        assert!(session.has_backup());

        assert!(session.revert());
        assert_eq!(session.current(), &previous);
        assert!(!session.has_backup());
    }

    #[test]
    fn revert_without_backup_is_a_no_op() {
        let mut session = PlanSession::new("fresh");
        assert!(!session.revert());
        assert!(session.current().is_empty());
    }

    #[test]
    fn nothing_to_generate_keeps_the_current_plan() {
        let mut session = PlanSession::new("term-2");
        let mut rng = StdRng::seed_from_u64(8);
        session.generate(&inputs(vec![class()]), &GenerationConfig::default(), &mut rng).unwrap();
        let generated = session.current().clone();

        let err = session
            .generate(&inputs(Vec::new()), &GenerationConfig::default(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, TimetableError::NothingToGenerate(_)));
        assert_eq!(session.current(), &generated);
    }

    #[test]
    fn class_without_subjects_aborts_the_run() {
        let store = InMemoryPlanStore::new();
        let mut previous = Assignment::new();
        previous.place(1, "6A", 1, "eng");
        store.save_assignment("term-4", &previous).unwrap();
        let mut session = PlanSession::load(&store, "term-4").unwrap();

        let empty = SchoolClass {
            id: "6B".into(),
            subjects: Vec::new(),
            ..class()
        };
        let mut rng = StdRng::seed_from_u64(4);
        let err = session
            .generate(&inputs(vec![class(), empty]), &GenerationConfig::default(), &mut rng)
            .unwrap_err();

        match err {
            TimetableError::NothingToGenerate(msg) => assert!(msg.contains("6B")),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(session.current(), &previous);
        assert!(!session.has_backup());
    }

    #[test]
    fn save_writes_the_current_timetable() {
        let store = InMemoryPlanStore::new();
        let mut session = PlanSession::new("term-3");
        let mut rng = StdRng::seed_from_u64(2);
        session.generate(&inputs(vec![class()]), &GenerationConfig::default(), &mut rng).unwrap();
        session.save(&store).unwrap();
        assert_eq!(&store.load_assignment("term-3").unwrap(), session.current());
    }
}
