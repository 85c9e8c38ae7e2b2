use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::{Result, TimetableError};
use crate::schedule::Assignment;

/// Durable holder of one timetable per plan. Callers serialize writes per
/// plan; the last save wins.
pub trait PlanStore {
    fn save_assignment(&self, plan_id: &str, assignment: &Assignment) -> Result<()>;

    /// A plan that was never saved loads as an empty timetable
    fn load_assignment(&self, plan_id: &str) -> Result<Assignment>;
}

/// On-disk layout of a plan file
#[derive(Debug, Serialize, Deserialize)]
struct PlanFile {
    plan_id: String,
    block_assignments: Assignment,
}

/// One `<plan_id>.json` file per plan inside a directory
#[derive(Debug, Clone)]
pub struct JsonFilePlanStore {
    dir: PathBuf,
}

impl JsonFilePlanStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    fn plan_path(&self, plan_id: &str) -> Result<PathBuf> {
        let valid = !plan_id.is_empty()
            && plan_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(TimetableError::InvalidRequest(format!(
                "plan id may only contain letters, digits, '-' and '_': {:?}",
                plan_id
            )));
        }
        Ok(self.dir.join(format!("{}.json", plan_id)))
    }
}

impl PlanStore for JsonFilePlanStore {
    fn save_assignment(&self, plan_id: &str, assignment: &Assignment) -> Result<()> {
        let path = self.plan_path(plan_id)?;
        fs::create_dir_all(&self.dir)?;
        let file = PlanFile {
            plan_id: plan_id.to_string(),
            block_assignments: assignment.clone(),
        };
        // write next to the target, then swap it in
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&file)?)?;
        fs::rename(&tmp, &path)?;
        debug!(plan_id, cells = assignment.len(), path = %path.display(), "plan saved");
        Ok(())
    }

    fn load_assignment(&self, plan_id: &str) -> Result<Assignment> {
        let path = self.plan_path(plan_id)?;
        if !path.exists() {
            return Ok(Assignment::new());
        }
        let file: PlanFile = serde_json::from_slice(&fs::read(&path)?)?;
        Ok(file.block_assignments)
    }
}

/// Process-local store, used by tests and as a scratch store
#[derive(Debug, Default)]
pub struct InMemoryPlanStore {
    plans: Mutex<HashMap<String, Assignment>>,
}

impl InMemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlanStore for InMemoryPlanStore {
    fn save_assignment(&self, plan_id: &str, assignment: &Assignment) -> Result<()> {
        let mut plans = self.plans.lock().unwrap_or_else(|e| e.into_inner());
        plans.insert(plan_id.to_string(), assignment.clone());
        Ok(())
    }

    fn load_assignment(&self, plan_id: &str) -> Result<Assignment> {
        let plans = self.plans.lock().unwrap_or_else(|e| e.into_inner());
        Ok(plans.get(plan_id).cloned().unwrap_or_default())
    }
}
