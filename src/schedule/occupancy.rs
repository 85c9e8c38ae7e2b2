use std::collections::{HashMap, HashSet};
use super::types::{Day, TeacherId};

/// Which teachers are busy in each (day, period) and how many lessons each
/// teacher already has per day. Lives for a single generation run.
///
/// Every operation accepts an optional teacher: a subject with no teacher on
/// record is never blocked and never counted.
#[derive(Debug, Default)]
pub struct OccupancyTracker {
    busy: HashMap<(Day, u32), HashSet<TeacherId>>,
    daily_load: HashMap<(Day, TeacherId), u32>,
}

impl OccupancyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_teacher_free(&self, day: Day, period_index: u32, teacher_id: Option<&str>) -> bool {
        let Some(teacher_id) = teacher_id else {
            return true;
        };
        self.busy
            .get(&(day, period_index))
            .map(|teachers| !teachers.contains(teacher_id))
            .unwrap_or(true)
    }

    pub fn under_daily_cap(&self, day: Day, teacher_id: Option<&str>, cap: u32) -> bool {
        match teacher_id {
            Some(teacher_id) => self.daily_load(day, teacher_id) < cap,
            None => true,
        }
    }

    /// Callers must not commit the same cell twice.
    pub fn commit(&mut self, day: Day, period_index: u32, teacher_id: Option<&str>) {
        let Some(teacher_id) = teacher_id else {
            return;
        };
        self.busy
            .entry((day, period_index))
            .or_default()
            .insert(teacher_id.to_string());
        *self.daily_load.entry((day, teacher_id.to_string())).or_insert(0) += 1;
    }

    pub fn daily_load(&self, day: Day, teacher_id: &str) -> u32 {
        self.daily_load
            .get(&(day, teacher_id.to_string()))
            .copied()
            .unwrap_or(0)
    }
}
