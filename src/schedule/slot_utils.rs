use std::collections::BTreeSet;
use chrono::NaiveTime;
use crate::error::{Result, TimetableError};
use super::types::{Day, Period, PeriodKind};

/// Parses a time string (HH:MM) from a period template
pub fn parse_period_time(time_str: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(time_str.trim(), "%H:%M").ok()
}

/// Formats a period's time range for display, e.g. "07:30-08:10"
pub fn period_time_range(period: &Period) -> String {
    format!("{}-{}", period.start.trim(), period.end.trim())
}

/// A validated day template plus the weekdays it is active on.
///
/// Periods are kept sorted by index; indices are unique and contiguous from 1,
/// and every start/end parses as HH:MM.
#[derive(Debug, Clone)]
pub struct PeriodGrid {
    periods: Vec<Period>,
    active_days: Vec<Day>,
}

impl PeriodGrid {
    pub fn new(mut periods: Vec<Period>, active_days: Vec<Day>) -> Result<Self> {
        periods.sort_by_key(|p| p.index);

        if let Some(first) = periods.first() {
            if first.index != 1 {
                return Err(TimetableError::InvalidTemplate(format!(
                    "period indices must start at 1, found {}",
                    first.index
                )));
            }
        }
        for pair in periods.windows(2) {
            if pair[1].index != pair[0].index + 1 {
                return Err(TimetableError::InvalidTemplate(format!(
                    "period indices must be unique and contiguous, found {} followed by {}",
                    pair[0].index, pair[1].index
                )));
            }
        }
        for period in &periods {
            if parse_period_time(&period.start).is_none() || parse_period_time(&period.end).is_none() {
                return Err(TimetableError::InvalidTemplate(format!(
                    "period {} has an unreadable time range {}",
                    period.index,
                    period_time_range(period)
                )));
            }
        }

        let days: BTreeSet<Day> = active_days.into_iter().collect();
        if let Some(bad) = days.iter().find(|d| !(1..=7).contains(*d)) {
            return Err(TimetableError::InvalidTemplate(format!(
                "weekday {} is outside 1..=7",
                bad
            )));
        }

        Ok(Self {
            periods,
            active_days: days.into_iter().collect(),
        })
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Active weekdays, ascending
    pub fn active_days(&self) -> &[Day] {
        &self.active_days
    }

    pub fn is_active(&self, day: Day) -> bool {
        self.active_days.contains(&day)
    }

    /// Lesson period indices, ascending
    pub fn lesson_indices(&self) -> Vec<u32> {
        self.periods.iter().filter(|p| p.is_lesson()).map(|p| p.index).collect()
    }

    pub fn first_lesson_index(&self) -> Option<u32> {
        self.periods.iter().find(|p| p.is_lesson()).map(|p| p.index)
    }

    /// Periods strictly before `index`, nearest first
    pub fn preceding(&self, index: u32) -> impl Iterator<Item = &Period> {
        self.periods.iter().rev().filter(move |p| p.index < index)
    }

    /// Periods strictly after `index`, nearest first
    pub fn following(&self, index: u32) -> impl Iterator<Item = &Period> {
        self.periods.iter().filter(move |p| p.index > index)
    }

    /// Lesson periods before the first lunch. Without a lunch period the
    /// window is the first half of the lessons, rounded down.
    pub fn morning_window(&self) -> BTreeSet<u32> {
        let lessons = self.lesson_indices();
        match self.periods.iter().find(|p| p.kind == PeriodKind::Lunch) {
            Some(lunch) => lessons.into_iter().filter(|&i| i < lunch.index).collect(),
            None => {
                let half = lessons.len() / 2;
                lessons.into_iter().take(half).collect()
            }
        }
    }

    /// Lesson indices with the morning window first, each part ascending
    pub fn lessons_morning_first(&self) -> Vec<u32> {
        let morning = self.morning_window();
        let (mut ordered, rest): (Vec<u32>, Vec<u32>) =
            self.lesson_indices().into_iter().partition(|i| morning.contains(i));
        ordered.extend(rest);
        ordered
    }
}
