use std::collections::BTreeSet;
use rand::Rng;
use crate::config::GenerationConfig;
use super::types::{SchoolClass, Subject, SubjectId, TeacherRef, TeacherRoster};

/// Code/name of the weekly ceremonial subject, after normalization
pub const CEREMONIAL_TOKEN: &str = "ppi";

/// Which subjects count as priority and which are confined to the morning.
#[derive(Debug, Clone)]
pub struct PlacementPolicy {
    priority_ids: BTreeSet<SubjectId>,
    keyword: Option<String>,
}

impl PlacementPolicy {
    pub fn from_config(config: &GenerationConfig) -> Self {
        let keyword = config.keyword.trim().to_lowercase();
        Self {
            priority_ids: config.priority_subject_ids.clone(),
            keyword: if keyword.is_empty() { None } else { Some(keyword) },
        }
    }

    /// Name or code contains the configured keyword (case-insensitive)
    pub fn matches_keyword(&self, subject: &Subject) -> bool {
        match &self.keyword {
            Some(keyword) => {
                subject.name.to_lowercase().contains(keyword.as_str())
                    || subject.code.to_lowercase().contains(keyword.as_str())
            }
            None => false,
        }
    }

    pub fn is_priority(&self, subject: &Subject) -> bool {
        self.priority_ids.contains(&subject.id) || self.matches_keyword(subject)
    }

    /// Keyword subjects may only sit inside the morning window
    pub fn is_restricted(&self, subject: &Subject) -> bool {
        self.matches_keyword(subject)
    }

    /// First priority subject in list order, skipping `excluded`
    pub fn first_priority<'a>(
        &self,
        class: &'a SchoolClass,
        excluded: Option<&str>,
    ) -> Option<&'a Subject> {
        class
            .subjects
            .iter()
            .filter(|s| Some(s.id.as_str()) != excluded)
            .find(|s| self.is_priority(s))
    }

    /// Priority subjects in backfill preference order: keyword subjects
    /// first, then the rest, each in list order.
    pub fn backfill_candidates<'a>(
        &self,
        class: &'a SchoolClass,
        excluded: Option<&str>,
    ) -> Vec<&'a Subject> {
        let (mut restricted, others): (Vec<&Subject>, Vec<&Subject>) = class
            .subjects
            .iter()
            .filter(|s| Some(s.id.as_str()) != excluded && self.is_priority(s))
            .partition(|s| self.is_restricted(s));
        restricted.extend(others);
        restricted
    }
}

fn normalize_token(raw: &str) -> String {
    raw.trim().replace('.', "").to_lowercase()
}

pub fn is_ceremonial(subject: &Subject) -> bool {
    normalize_token(&subject.code) == CEREMONIAL_TOKEN
        || normalize_token(&subject.name) == CEREMONIAL_TOKEN
}

/// The class's ceremonial subject, if any (first match in list order)
pub fn ceremonial_subject(class: &SchoolClass) -> Option<&Subject> {
    class.subjects.iter().find(|s| is_ceremonial(s))
}

/// Teacher held for the ceremonial slot: the class teacher, otherwise whoever
/// teaches the subject to this class.
pub fn ceremonial_teacher<'a>(
    class: &'a SchoolClass,
    subject: &Subject,
    roster: &'a TeacherRoster,
) -> Option<&'a TeacherRef> {
    class
        .class_teacher
        .as_ref()
        .or_else(|| roster.teacher_for(&class.id, &subject.id))
}

/// Circular cursor over a class's subject list. Each cell probes with its
/// own cursor, so every cell starts from a fresh random offset.
#[derive(Debug, Clone)]
pub struct RotationCursor {
    len: usize,
    position: usize,
}

impl RotationCursor {
    /// Starts at a uniformly random offset
    pub fn random<R: Rng>(len: usize, rng: &mut R) -> Self {
        let position = if len == 0 { 0 } else { rng.gen_range(0..len) };
        Self { len, position }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Subject at the cursor; advances it by one
    pub fn next<'a>(&mut self, subjects: &'a [Subject]) -> Option<&'a Subject> {
        if self.len == 0 || subjects.is_empty() {
            return None;
        }
        let subject = subjects.get(self.position % subjects.len());
        self.position = (self.position + 1) % self.len;
        subject
    }
}
