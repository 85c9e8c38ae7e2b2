use std::collections::BTreeSet;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::error::{Result, TimetableError};

pub const DEFAULT_MAX_TEACHER_LESSONS_PER_DAY: u32 = 5;

fn default_max_lessons() -> u32 {
    DEFAULT_MAX_TEACHER_LESSONS_PER_DAY
}

/// Everything a generation run is allowed to read besides its inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub priority_subject_ids: BTreeSet<String>,
    pub keyword: String,
    pub max_teacher_lessons_per_day: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            priority_subject_ids: BTreeSet::new(),
            keyword: String::new(),
            max_teacher_lessons_per_day: DEFAULT_MAX_TEACHER_LESSONS_PER_DAY,
        }
    }
}

/// Generate request from the HTTP surface or the command line
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub template_id: String,
    #[serde(default)]
    pub priority_subject_ids: Vec<String>,
    #[serde(default)]
    pub keyword: String,
    #[serde(default = "default_max_lessons")]
    pub max_teacher_lessons_per_day: u32,
    /// Fixes the random source for a reproducible run
    #[serde(default)]
    pub seed: Option<u64>,
}

impl GenerateRequest {
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            priority_subject_ids: self
                .priority_subject_ids
                .iter()
                .map(|id| id.trim().to_string())
                .collect(),
            keyword: self.keyword.trim().to_string(),
            max_teacher_lessons_per_day: self.max_teacher_lessons_per_day,
        }
    }
}

/// Validates a generate request
pub fn validate_request(req: &GenerateRequest) -> Result<()> {
    if req.template_id.trim().is_empty() {
        return Err(TimetableError::InvalidRequest("Template id is required".to_string()));
    }

    if req.max_teacher_lessons_per_day == 0 {
        return Err(TimetableError::InvalidRequest(
            "Daily teacher lesson cap must be at least 1".to_string(),
        ));
    }

    if req.priority_subject_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(TimetableError::InvalidRequest(
            "Priority subject ids must not be blank".to_string(),
        ));
    }

    Ok(())
}

/// Process-wide settings, read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub plan_dir: PathBuf,
    pub admin_password: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("TIMETABLE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            plan_dir: std::env::var("TIMETABLE_PLAN_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("plans")),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| "admin123".to_string()), // Default password, change this!
        }
    }
}

/// Builds a generate request for the command line from `TIMETABLE_*`
/// variables
pub fn request_from_env(template_id: &str) -> Result<GenerateRequest> {
    let priority_subject_ids = std::env::var("TIMETABLE_PRIORITY_IDS")
        .map(|ids| {
            ids.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let max_teacher_lessons_per_day = match std::env::var("TIMETABLE_MAX_LESSONS") {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            TimetableError::InvalidRequest(format!("TIMETABLE_MAX_LESSONS is not a number: {}", raw))
        })?,
        Err(_) => DEFAULT_MAX_TEACHER_LESSONS_PER_DAY,
    };

    let seed = match std::env::var("TIMETABLE_SEED") {
        Ok(raw) => Some(raw.trim().parse().map_err(|_| {
            TimetableError::InvalidRequest(format!("TIMETABLE_SEED is not a number: {}", raw))
        })?),
        Err(_) => None,
    };

    let req = GenerateRequest {
        template_id: template_id.to_string(),
        priority_subject_ids,
        keyword: std::env::var("TIMETABLE_KEYWORD").unwrap_or_default(),
        max_teacher_lessons_per_day,
        seed,
    };
    validate_request(&req)?;
    Ok(req)
}
