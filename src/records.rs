//! Read-only record projections for the history and profile surfaces
//!
//! Records arrive oldest first; every list here is presented newest first.

use crate::display::format_record_date;
use crate::remote::{DailyStroke, HistoryRecords, MonthlyPortrait, ProfileRecord, WeeklySummary};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

pub const HISTORY_LOAD_ERROR: &str = "Failed to load history. Pull to refresh.";
pub const PROFILE_LOAD_ERROR: &str = "Failed to load profile. Pull to refresh.";

const RECENT_DAYS: usize = 7;
const PROFILE_RECENT_STROKES: usize = 3;
const PROFILE_RECENT_MEMORIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrokeCard {
    pub date_label: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyCard {
    pub title: String,
    pub summary: String,
    pub evidence: Vec<String>,
    pub generated_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCard {
    pub title: String,
    pub portrait: String,
    pub generated_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    /// Most recent daily stroke
    pub today: Option<StrokeCard>,
    pub last_seven_days: Vec<StrokeCard>,
    pub weekly: Vec<WeeklyCard>,
    pub monthly: Vec<MonthlyCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub self_portrait: String,
    pub recent_strokes: Vec<StrokeCard>,
    pub latest_weekly: Option<WeeklyCard>,
    pub latest_monthly: Option<MonthlyCard>,
    pub recent_memories: Vec<Value>,
}

impl HistoryView {
    pub fn project<Tz>(records: &HistoryRecords, now: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            today: records.daily_strokes.last().map(|s| stroke_card(s, now)),
            last_seven_days: newest_first(&records.daily_strokes, RECENT_DAYS)
                .map(|s| stroke_card(s, now))
                .collect(),
            weekly: newest_first(&records.weekly_summaries, usize::MAX)
                .map(|w| weekly_card(w, now))
                .collect(),
            monthly: newest_first(&records.monthly_portraits, usize::MAX)
                .map(|m| monthly_card(m, now))
                .collect(),
        }
    }
}

impl ProfileView {
    pub fn project<Tz>(
        profile: &ProfileRecord,
        history: &HistoryRecords,
        now: &DateTime<Tz>,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            self_portrait: profile.selfportrait.clone(),
            recent_strokes: newest_first(&history.daily_strokes, PROFILE_RECENT_STROKES)
                .map(|s| stroke_card(s, now))
                .collect(),
            latest_weekly: history.weekly_summaries.last().map(|w| weekly_card(w, now)),
            latest_monthly: history.monthly_portraits.last().map(|m| monthly_card(m, now)),
            recent_memories: newest_first(&history.past_memory, PROFILE_RECENT_MEMORIES)
                .cloned()
                .collect(),
        }
    }
}

fn newest_first<T>(items: &[T], limit: usize) -> impl Iterator<Item = &T> {
    items.iter().rev().take(limit)
}

fn stroke_card<Tz>(stroke: &DailyStroke, now: &DateTime<Tz>) -> StrokeCard
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    StrokeCard {
        date_label: format_record_date(stroke.date.as_deref(), now),
        text: stroke.text.clone(),
    }
}

fn weekly_card<Tz>(week: &WeeklySummary, now: &DateTime<Tz>) -> WeeklyCard
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    WeeklyCard {
        title: format!("Week {}", week.week_number),
        summary: week.summary.clone(),
        evidence: week.evidence.clone(),
        generated_label: format_record_date(week.generated_at.as_deref(), now),
    }
}

fn monthly_card<Tz>(month: &MonthlyPortrait, now: &DateTime<Tz>) -> MonthlyCard
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    MonthlyCard {
        title: format!("Month {}", month.month_number),
        portrait: month.portrait.clone(),
        generated_label: format_record_date(month.generated_at.as_deref(), now),
    }
}
