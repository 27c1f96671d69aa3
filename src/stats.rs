use crate::domain::{Budget, BudgetPeriod, Category, Transaction, TransactionKind};
use crate::filter::month_bounds;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub name: String,
    pub color: String,
    pub icon: String,
    pub total: Decimal,
    pub count: usize,
    /// Share of the sum of all returned totals, 0..=100.
    pub percentage: Decimal,
}

/// Per-category sums for one transaction kind, in category order.
/// Categories with a zero total are left out.
pub fn category_totals(
    transactions: &[Transaction],
    categories: &[Category],
    kind: TransactionKind,
) -> Vec<CategoryTotal> {
    let mut rows: Vec<CategoryTotal> = categories
        .iter()
        .filter_map(|c| {
            let (total, count) = transactions
                .iter()
                .filter(|t| t.kind == kind && t.category_id == c.id)
                .fold((Decimal::ZERO, 0usize), |(sum, n), t| (sum + t.amount, n + 1));
            if total.is_zero() {
                return None;
            }
            Some(CategoryTotal {
                name: c.name.clone(),
                color: c.color.clone(),
                icon: c.icon.clone(),
                total,
                count,
                percentage: Decimal::ZERO,
            })
        })
        .collect();

    let grand: Decimal = rows.iter().map(|r| r.total).sum();
    if grand > Decimal::ZERO {
        for row in &mut rows {
            row.percentage = (row.total / grand * Decimal::ONE_HUNDRED).round_dp(2);
        }
    }
    rows
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
    pub count: usize,
    pub average_expense: Decimal,
}

pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary::default();
    let mut expense_count = 0u32;
    for t in transactions {
        match t.kind {
            TransactionKind::Income => summary.income += t.amount,
            TransactionKind::Expense => {
                summary.expense += t.amount;
                expense_count += 1;
            }
        }
    }
    summary.count = transactions.len();
    summary.balance = summary.income - summary.expense;
    if expense_count > 0 {
        summary.average_expense = (summary.expense / Decimal::from(expense_count)).round_dp(2);
    }
    summary
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

/// One point per calendar day in `[start, end]`, zero-filled.
pub fn daily_series(transactions: &[Transaction], start: NaiveDate, end: NaiveDate) -> Vec<DailyPoint> {
    if start > end {
        return Vec::new();
    }

    let mut by_day: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
    for t in transactions {
        if t.date < start || t.date > end {
            continue;
        }
        let entry = by_day.entry(t.date).or_insert((Decimal::ZERO, Decimal::ZERO));
        match t.kind {
            TransactionKind::Income => entry.0 += t.amount,
            TransactionKind::Expense => entry.1 += t.amount,
        }
    }

    start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| {
            let (income, expense) = by_day
                .get(&date)
                .copied()
                .unwrap_or((Decimal::ZERO, Decimal::ZERO));
            DailyPoint {
                date,
                income,
                expense,
                net: income - expense,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

pub fn cumulative_series(daily: &[DailyPoint]) -> Vec<CumulativePoint> {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    daily
        .iter()
        .map(|p| {
            income += p.income;
            expense += p.expense;
            CumulativePoint {
                date: p.date,
                income,
                expense,
                balance: income - expense,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetHealth {
    Good,
    Moderate,
    Warning,
    Exceeded,
}

impl fmt::Display for BudgetHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BudgetHealth::Good => "good",
            BudgetHealth::Moderate => "moderate",
            BudgetHealth::Warning => "warning",
            BudgetHealth::Exceeded => "exceeded",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatus {
    pub window: (NaiveDate, NaiveDate),
    pub spent: Decimal,
    pub remaining: Decimal,
    /// spent / amount * 100, `None` when the budget amount is not positive.
    pub ratio: Option<Decimal>,
    /// Ratio capped at 100.
    pub progress: Decimal,
    pub health: BudgetHealth,
}

/// Week or month containing `today`.
pub fn period_window(period: BudgetPeriod, today: NaiveDate, week_start: Weekday) -> (NaiveDate, NaiveDate) {
    match period {
        BudgetPeriod::Monthly => month_bounds(today),
        BudgetPeriod::Weekly => {
            let offset = (7 + today.weekday().num_days_from_monday()
                - week_start.num_days_from_monday())
                % 7;
            let first = today - Duration::days(i64::from(offset));
            (first, first + Duration::days(6))
        }
    }
}

pub fn classify(ratio: Decimal) -> BudgetHealth {
    if ratio >= Decimal::ONE_HUNDRED {
        BudgetHealth::Exceeded
    } else if ratio >= Decimal::from(80) {
        BudgetHealth::Warning
    } else if ratio >= Decimal::from(50) {
        BudgetHealth::Moderate
    } else {
        BudgetHealth::Good
    }
}

/// Status of `budget` for the window containing `today`. Pass every
/// transaction, not a filtered view: the window ignores any active filter.
pub fn budget_status(
    budget: &Budget,
    transactions: &[Transaction],
    today: NaiveDate,
    week_start: Weekday,
) -> BudgetStatus {
    let window = period_window(budget.period, today, week_start);
    let spent: Decimal = transactions
        .iter()
        .filter(|t| {
            t.kind == TransactionKind::Expense
                && t.category_id == budget.category_id
                && t.date >= window.0
                && t.date <= window.1
        })
        .map(|t| t.amount)
        .sum();

    let (ratio, progress, health) = if budget.amount > Decimal::ZERO {
        let ratio = spent / budget.amount * Decimal::ONE_HUNDRED;
        (Some(ratio), ratio.min(Decimal::ONE_HUNDRED), classify(ratio))
    } else if spent > Decimal::ZERO {
        (None, Decimal::ONE_HUNDRED, BudgetHealth::Exceeded)
    } else {
        (None, Decimal::ZERO, BudgetHealth::Good)
    };

    BudgetStatus {
        window,
        spent,
        remaining: budget.amount - spent,
        ratio,
        progress,
        health,
    }
}
