use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use crate::error::TimetableError;

pub type ClassId = String;
pub type SubjectId = String;
pub type TeacherId = String;

/// ISO weekday number, 1 = Monday ... 7 = Sunday
pub type Day = u8;

pub const FRIDAY: Day = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Lesson,
    Break,
    Lunch,
}

/// One row of a day template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub index: u32,
    pub kind: PeriodKind,
    pub start: String,
    pub end: String,
}

impl Period {
    pub fn is_lesson(&self) -> bool {
        self.kind == PeriodKind::Lesson
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub code: String,
    /// Subjects sharing a category count as repetitions of each other
    #[serde(default)]
    pub category: Option<String>,
}

impl Subject {
    /// Category with surrounding whitespace removed, `None` when blank
    pub fn category_key(&self) -> Option<String> {
        self.category
            .as_deref()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeacherRef {
    pub id: TeacherId,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolClass {
    pub id: ClassId,
    pub name: String,
    pub grade: String,
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub class_teacher: Option<TeacherRef>,
}

impl SchoolClass {
    pub fn subject(&self, subject_id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == subject_id)
    }
}

/// Teacher of each (class, subject) pair. A missing pair means the subject
/// carries no teacher constraint.
#[derive(Debug, Clone, Default)]
pub struct TeacherRoster {
    teachers: BTreeMap<(ClassId, SubjectId), TeacherRef>,
}

impl TeacherRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, class_id: &str, subject_id: &str, teacher: TeacherRef) {
        self.teachers.insert((class_id.to_string(), subject_id.to_string()), teacher);
    }

    pub fn teacher_for(&self, class_id: &str, subject_id: &str) -> Option<&TeacherRef> {
        self.teachers.get(&(class_id.to_string(), subject_id.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub day: Day,
    pub class_id: ClassId,
    pub period_index: u32,
}

impl CellKey {
    pub fn new(day: Day, class_id: &str, period_index: u32) -> Self {
        Self {
            day,
            class_id: class_id.to_string(),
            period_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedSubject {
    pub subject_id: SubjectId,
}

/// Flat persisted form of one assignment cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub day: Day,
    pub class_id: ClassId,
    pub period_index: u32,
    pub subject_id: SubjectId,
}

/// The weekly timetable: (day, class, lesson period) -> subject
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AssignmentRecord>", into = "Vec<AssignmentRecord>")]
pub struct Assignment {
    cells: BTreeMap<CellKey, PlacedSubject>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, day: Day, class_id: &str, period_index: u32) -> Option<&PlacedSubject> {
        self.cells.get(&CellKey::new(day, class_id, period_index))
    }

    pub fn is_filled(&self, day: Day, class_id: &str, period_index: u32) -> bool {
        self.get(day, class_id, period_index).is_some()
    }

    pub fn place(&mut self, day: Day, class_id: &str, period_index: u32, subject_id: &str) {
        self.cells.insert(
            CellKey::new(day, class_id, period_index),
            PlacedSubject { subject_id: subject_id.to_string() },
        );
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellKey, &PlacedSubject)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells of one class on one day, ascending by period index
    pub fn day_of_class<'a>(
        &'a self,
        day: Day,
        class_id: &'a str,
    ) -> impl Iterator<Item = (u32, &'a PlacedSubject)> + 'a {
        self.cells
            .iter()
            .filter(move |(key, _)| key.day == day && key.class_id == class_id)
            .map(|(key, placed)| (key.period_index, placed))
    }
}

/// Rejects record lists that name the same cell twice
impl TryFrom<Vec<AssignmentRecord>> for Assignment {
    type Error = TimetableError;

    fn try_from(records: Vec<AssignmentRecord>) -> Result<Self, Self::Error> {
        let mut assignment = Assignment::new();
        for record in records {
            if assignment.is_filled(record.day, &record.class_id, record.period_index) {
                return Err(TimetableError::InvalidData(format!(
                    "cell (day {}, class {}, period {}) is assigned twice",
                    record.day, record.class_id, record.period_index
                )));
            }
            assignment.place(record.day, &record.class_id, record.period_index, &record.subject_id);
        }
        Ok(assignment)
    }
}

impl From<Assignment> for Vec<AssignmentRecord> {
    fn from(assignment: Assignment) -> Self {
        assignment
            .cells
            .into_iter()
            .map(|(key, placed)| AssignmentRecord {
                day: key.day,
                class_id: key.class_id,
                period_index: key.period_index,
                subject_id: placed.subject_id,
            })
            .collect()
    }
}
