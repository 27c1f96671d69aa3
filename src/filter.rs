use crate::domain::{FilterSpec, Transaction};
use chrono::{Datelike, Duration, NaiveDate};
use std::str::FromStr;

/// Returns the transactions matching every constraint of `spec`, in input order.
pub fn filter(transactions: &[Transaction], spec: &FilterSpec) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| matches(t, spec))
        .cloned()
        .collect()
}

pub fn matches(t: &Transaction, spec: &FilterSpec) -> bool {
    if t.date < spec.start || t.date > spec.end {
        return false;
    }
    if !spec.categories.is_empty() && !spec.categories.contains(&t.category_id) {
        return false;
    }
    if let Some(min) = spec.min {
        if t.amount < min {
            return false;
        }
    }
    if let Some(max) = spec.max {
        if t.amount > max {
            return false;
        }
    }
    spec.kind.accepts(t.kind)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePreset {
    #[default]
    ThisMonth,
    LastMonth,
    Last7Days,
    Last30Days,
    ThisYear,
}

impl FromStr for DatePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "this-month" => Ok(DatePreset::ThisMonth),
            "last-month" => Ok(DatePreset::LastMonth),
            "last-7-days" => Ok(DatePreset::Last7Days),
            "last-30-days" => Ok(DatePreset::Last30Days),
            "this-year" => Ok(DatePreset::ThisYear),
            other => Err(format!(
                "unknown preset '{other}' (expected this-month|last-month|last-7-days|last-30-days|this-year)"
            )),
        }
    }
}

impl DatePreset {
    /// Inclusive range relative to `today`.
    pub fn range(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            DatePreset::ThisMonth => month_bounds(today),
            DatePreset::LastMonth => {
                let (first, _) = month_bounds(today);
                month_bounds(first - Duration::days(1))
            }
            DatePreset::Last7Days => (today - Duration::days(6), today),
            DatePreset::Last30Days => (today - Duration::days(29), today),
            DatePreset::ThisYear => (
                NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
                NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today),
            ),
        }
    }
}

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let (next_year, next_month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|d| d - Duration::days(1))
        .unwrap_or(date);
    (first, last)
}
