use tracing::warn;
use crate::error::{Result, TimetableError};
use super::slot_utils::PeriodGrid;
use super::types::{Day, Period, SchoolClass, TeacherRef, TeacherRoster};

/// Read-only source of classes, their subjects and subject teachers
pub trait Directory {
    fn list_classes(&self) -> Result<Vec<SchoolClass>>;
    fn teacher_for(&self, class_id: &str, subject_id: &str) -> Option<TeacherRef>;
}

/// Read-only source of day templates
pub trait TemplateSource {
    fn list_active_days(&self, template_id: &str) -> Result<Vec<Day>>;
    fn list_periods(&self, template_id: &str) -> Result<Vec<Period>>;
}

/// Everything a run reads, pulled from the collaborators before it starts
#[derive(Debug, Clone)]
pub struct GenerationInputs {
    pub grid: PeriodGrid,
    pub classes: Vec<SchoolClass>,
    pub roster: TeacherRoster,
}

impl GenerationInputs {
    pub fn new(grid: PeriodGrid, classes: Vec<SchoolClass>, roster: TeacherRoster) -> Self {
        Self { grid, classes, roster }
    }

    pub fn gather<D, T>(directory: &D, templates: &T, template_id: &str) -> Result<Self>
    where
        D: Directory + ?Sized,
        T: TemplateSource + ?Sized,
    {
        let grid = PeriodGrid::new(
            templates.list_periods(template_id)?,
            templates.list_active_days(template_id)?,
        )?;
        let classes = directory.list_classes()?;

        let mut roster = TeacherRoster::new();
        for class in &classes {
            for subject in &class.subjects {
                if let Some(teacher) = directory.teacher_for(&class.id, &subject.id) {
                    roster.assign(&class.id, &subject.id, teacher);
                }
            }
        }

        Ok(Self { grid, classes, roster })
    }

    /// Fails with `NothingToGenerate` when a run could only produce an empty
    /// timetable
    pub fn check_generatable(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(TimetableError::NothingToGenerate("no classes".to_string()));
        }
        if self.grid.active_days().is_empty() {
            return Err(TimetableError::NothingToGenerate("no active weekdays".to_string()));
        }
        if self.grid.lesson_indices().is_empty() {
            return Err(TimetableError::NothingToGenerate("no lesson periods".to_string()));
        }
        if let Some(class) = self.classes.iter().find(|c| c.subjects.is_empty()) {
            warn!(class_id = %class.id, "class has no subjects, run aborted");
            return Err(TimetableError::NothingToGenerate(format!(
                "class {} has no subjects",
                class.id
            )));
        }
        Ok(())
    }
}
