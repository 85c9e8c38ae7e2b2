use csv::{ReaderBuilder, Trim};
use std::collections::HashMap;
use std::path::Path;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;
use crate::error::{Result, TimetableError};
use crate::schedule::{
    ClassId, Day, Directory, Period, PeriodKind, SchoolClass, Subject, SubjectId, TeacherRef,
    TemplateSource,
};

pub const CLASSES_FILE: &str = "classes.csv";
pub const SUBJECTS_FILE: &str = "subjects.csv";
pub const CLASS_SUBJECTS_FILE: &str = "class_subjects.csv";
pub const TEMPLATES_FILE: &str = "templates.csv";
pub const PERIODS_FILE: &str = "periods.csv";

#[derive(Debug, Deserialize)]
struct ClassRow {
    id: String,
    name: String,
    grade: String,
    class_teacher_id: Option<String>,
    class_teacher_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubjectRow {
    id: String,
    name: String,
    code: String,
    category: Option<String>,
}

/// One row per (class, subject); row order is the class's subject order
#[derive(Debug, Deserialize)]
struct ClassSubjectRow {
    class_id: String,
    subject_id: String,
    teacher_id: Option<String>,
    teacher_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TemplateRow {
    id: String,
    /// Semicolon separated ISO weekday numbers, e.g. "1;2;3;4;5"
    active_days: String,
}

#[derive(Debug, Deserialize)]
struct PeriodRow {
    template_id: String,
    index: u32,
    kind: PeriodKind,
    start: String,
    end: String,
}

#[derive(Debug, Clone)]
struct Template {
    active_days: Vec<Day>,
    periods: Vec<Period>,
}

/// Directory and template data loaded from the CSV files in one folder
#[derive(Debug, Clone)]
pub struct SchoolData {
    classes: Vec<SchoolClass>,
    teachers: HashMap<(ClassId, SubjectId), TeacherRef>,
    templates: HashMap<String, Template>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Parses "1;2;3;4;5" into weekday numbers
fn parse_active_days(template_id: &str, raw: &str) -> Result<Vec<Day>> {
    raw.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<Day>().map_err(|_| {
                TimetableError::InvalidData(format!(
                    "template {} has a bad weekday {:?}",
                    template_id, part
                ))
            })
        })
        .collect()
}

impl SchoolData {
    /// Loads every CSV file from `dir`
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let class_rows: Vec<ClassRow> = read_rows(&dir.join(CLASSES_FILE))?;
        let subject_rows: Vec<SubjectRow> = read_rows(&dir.join(SUBJECTS_FILE))?;
        let link_rows: Vec<ClassSubjectRow> = read_rows(&dir.join(CLASS_SUBJECTS_FILE))?;
        let template_rows: Vec<TemplateRow> = read_rows(&dir.join(TEMPLATES_FILE))?;
        let period_rows: Vec<PeriodRow> = read_rows(&dir.join(PERIODS_FILE))?;

        let data = Self::from_rows(class_rows, subject_rows, link_rows, template_rows, period_rows)?;
        info!(
            classes = data.classes.len(),
            templates = data.templates.len(),
            dir = %dir.display(),
            "school data loaded"
        );
        Ok(data)
    }

    fn from_rows(
        class_rows: Vec<ClassRow>,
        subject_rows: Vec<SubjectRow>,
        link_rows: Vec<ClassSubjectRow>,
        template_rows: Vec<TemplateRow>,
        period_rows: Vec<PeriodRow>,
    ) -> Result<Self> {
        let subjects: HashMap<String, Subject> = subject_rows
            .into_iter()
            .map(|row| {
                (
                    row.id.clone(),
                    Subject {
                        id: row.id,
                        name: row.name,
                        code: row.code,
                        category: non_blank(row.category),
                    },
                )
            })
            .collect();

        let mut classes: Vec<SchoolClass> = class_rows
            .into_iter()
            .map(|row| {
                let class_teacher = non_blank(row.class_teacher_id).map(|id| TeacherRef {
                    display_name: non_blank(row.class_teacher_name).unwrap_or_else(|| id.clone()),
                    id,
                });
                SchoolClass {
                    id: row.id,
                    name: row.name,
                    grade: row.grade,
                    subjects: Vec::new(),
                    class_teacher,
                }
            })
            .collect();

        let mut teachers = HashMap::new();
        for link in link_rows {
            let subject = subjects.get(&link.subject_id).ok_or_else(|| {
                TimetableError::InvalidData(format!(
                    "class {} lists unknown subject {}",
                    link.class_id, link.subject_id
                ))
            })?;
            let class = classes
                .iter_mut()
                .find(|c| c.id == link.class_id)
                .ok_or_else(|| {
                    TimetableError::InvalidData(format!("unknown class {}", link.class_id))
                })?;
            class.subjects.push(subject.clone());

            if let Some(teacher_id) = non_blank(link.teacher_id) {
                let teacher = TeacherRef {
                    display_name: non_blank(link.teacher_name).unwrap_or_else(|| teacher_id.clone()),
                    id: teacher_id,
                };
                teachers.insert((link.class_id, link.subject_id), teacher);
            }
        }

        let mut templates: HashMap<String, Template> = HashMap::new();
        for row in template_rows {
            let active_days = parse_active_days(&row.id, &row.active_days)?;
            templates.insert(row.id, Template { active_days, periods: Vec::new() });
        }
        for row in period_rows {
            let template = templates.get_mut(&row.template_id).ok_or_else(|| {
                TimetableError::InvalidData(format!(
                    "period {} belongs to unknown template {}",
                    row.index, row.template_id
                ))
            })?;
            template.periods.push(Period {
                index: row.index,
                kind: row.kind,
                start: row.start,
                end: row.end,
            });
        }

        Ok(Self { classes, teachers, templates })
    }

    fn template(&self, template_id: &str) -> Result<&Template> {
        self.templates
            .get(template_id)
            .ok_or_else(|| TimetableError::UnknownTemplate(template_id.to_string()))
    }
}

impl Directory for SchoolData {
    fn list_classes(&self) -> Result<Vec<SchoolClass>> {
        Ok(self.classes.clone())
    }

    fn teacher_for(&self, class_id: &str, subject_id: &str) -> Option<TeacherRef> {
        self.teachers
            .get(&(class_id.to_string(), subject_id.to_string()))
            .cloned()
    }
}

impl TemplateSource for SchoolData {
    fn list_active_days(&self, template_id: &str) -> Result<Vec<Day>> {
        Ok(self.template(template_id)?.active_days.clone())
    }

    fn list_periods(&self, template_id: &str) -> Result<Vec<Period>> {
        let mut periods = self.template(template_id)?.periods.clone();
        periods.sort_by_key(|p| p.index);
        Ok(periods)
    }
}
