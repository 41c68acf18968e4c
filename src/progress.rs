//! Pure computation layer: lecture aggregation, goal pacing and
//! snapshot/history rollups. Everything here is arithmetic over plain
//! values so it stays testable without a database.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

/// Parses a crawled duration into minutes. The crawler writes whatever it
/// scraped, so unparseable or empty values coerce to zero instead of failing.
pub fn parse_minutes(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(0.0)
}

/// Rounds to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds to one decimal place (dashboard display rounding).
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Derived study statistics for one course's lecture set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CourseStats {
    pub total_lecture_time: f64,
    pub study_time: f64,
    pub completed_count: i64,
    pub total_count: i64,
}

impl CourseStats {
    pub fn add(&mut self, raw_minutes: &str, is_completed: bool) {
        let minutes = parse_minutes(raw_minutes);
        self.total_lecture_time += minutes;
        self.total_count += 1;
        if is_completed {
            self.study_time += minutes;
            self.completed_count += 1;
        }
    }

    pub fn collect<'a, I>(lectures: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut stats = Self::default();
        for (raw_minutes, is_completed) in lectures {
            stats.add(raw_minutes, is_completed);
        }
        stats
    }

    pub fn remaining_time(&self) -> f64 {
        self.total_lecture_time - self.study_time
    }

    pub fn progress_rate(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        round2(self.completed_count as f64 / self.total_count as f64 * 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalError {
    /// Completion date is not strictly after the start date.
    InvalidRange,
    /// Nothing left to study, so no quota can be derived.
    AlreadyComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalPlan {
    pub study_days: i64,
    pub daily_minutes: i64,
}

/// Derives the daily study quota for a goal date range. Both endpoints count
/// as study days; the quota rounds up so the plan never under-allocates.
pub fn plan_goal(
    remaining_minutes: f64,
    start_date: NaiveDate,
    completion_date: NaiveDate,
) -> Result<GoalPlan, GoalError> {
    if completion_date <= start_date {
        return Err(GoalError::InvalidRange);
    }
    if remaining_minutes <= 0.0 {
        return Err(GoalError::AlreadyComplete);
    }
    let study_days = (completion_date - start_date).num_days() + 1;
    let daily_minutes = (remaining_minutes / study_days as f64).ceil() as i64;
    Ok(GoalPlan {
        study_days,
        daily_minutes,
    })
}

/// Change versus the most recent prior snapshot. A course with no snapshot
/// yet diffs against zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProgressDelta {
    pub previous_progress: f64,
    pub previous_study_time: f64,
    pub progress_change: f64,
    pub study_time_change: f64,
}

pub fn diff_against_snapshot(
    current_progress: f64,
    current_study_time: f64,
    previous: Option<(f64, f64)>,
) -> ProgressDelta {
    let (previous_progress, previous_study_time) = previous.unwrap_or((0.0, 0.0));
    ProgressDelta {
        previous_progress,
        previous_study_time,
        progress_change: round2(current_progress - previous_progress),
        study_time_change: round2(current_study_time - previous_study_time),
    }
}

/// One completed lecture, reduced to the date it was completed on and its
/// duration in minutes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionEvent {
    pub date: NaiveDate,
    pub minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyProgress {
    pub date: String,
    pub completed_lectures: i64,
    pub study_time_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyProgress {
    pub year_week: i64,
    pub week_start: String,
    pub completed_lectures: i64,
    pub study_time_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseProgressPoint {
    pub date: String,
    pub completed_lectures: i64,
    pub study_time_minutes: f64,
    pub cumulative_completed: i64,
}

/// Completions per calendar day since `since`, most recent day first.
pub fn daily_buckets(events: &[CompletionEvent], since: NaiveDate) -> Vec<DailyProgress> {
    let mut days: Vec<(NaiveDate, i64, f64)> = Vec::new();
    let mut sorted: Vec<&CompletionEvent> = events.iter().filter(|e| e.date >= since).collect();
    sorted.sort_by_key(|e| e.date);
    for event in sorted {
        match days.last_mut() {
            Some((date, count, minutes)) if *date == event.date => {
                *count += 1;
                *minutes += event.minutes;
            }
            _ => days.push((event.date, 1, event.minutes)),
        }
    }
    days.reverse();
    days.into_iter()
        .map(|(date, completed_lectures, study_time_minutes)| DailyProgress {
            date: date.format("%Y-%m-%d").to_string(),
            completed_lectures,
            study_time_minutes,
        })
        .collect()
}

/// Completions per ISO week since `since`, most recent week first. The week
/// key matches MySQL's YEARWEEK(d, 1): iso_year * 100 + iso_week.
pub fn weekly_buckets(events: &[CompletionEvent], since: NaiveDate) -> Vec<WeeklyProgress> {
    let mut weeks: Vec<(i64, NaiveDate, i64, f64)> = Vec::new();
    let mut sorted: Vec<&CompletionEvent> = events.iter().filter(|e| e.date >= since).collect();
    sorted.sort_by_key(|e| e.date);
    for event in sorted {
        let iso = event.date.iso_week();
        let year_week = iso.year() as i64 * 100 + iso.week() as i64;
        match weeks.last_mut() {
            Some((key, _, count, minutes)) if *key == year_week => {
                *count += 1;
                *minutes += event.minutes;
            }
            _ => {
                let week_start = event.date
                    - Duration::days(event.date.weekday().num_days_from_monday() as i64);
                weeks.push((year_week, week_start, 1, event.minutes));
            }
        }
    }
    weeks.reverse();
    weeks
        .into_iter()
        .map(
            |(year_week, week_start, completed_lectures, study_time_minutes)| WeeklyProgress {
                year_week,
                week_start: week_start.format("%Y-%m-%d").to_string(),
                completed_lectures,
                study_time_minutes,
            },
        )
        .collect()
}

/// Per-day completion history for a single course, oldest first, with a
/// running total of completed lectures.
pub fn course_history(events: &[CompletionEvent]) -> Vec<CourseProgressPoint> {
    let mut sorted: Vec<&CompletionEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.date);
    let mut points: Vec<CourseProgressPoint> = Vec::new();
    let mut cumulative = 0i64;
    for event in sorted {
        cumulative += 1;
        match points.last_mut() {
            Some(point) if point.date == event.date.format("%Y-%m-%d").to_string() => {
                point.completed_lectures += 1;
                point.study_time_minutes += event.minutes;
                point.cumulative_completed = cumulative;
            }
            _ => points.push(CourseProgressPoint {
                date: event.date.format("%Y-%m-%d").to_string(),
                completed_lectures: 1,
                study_time_minutes: event.minutes,
                cumulative_completed: cumulative,
            }),
        }
    }
    points
}
