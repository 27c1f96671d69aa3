use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Label shown wherever a category reference no longer resolves.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => f.write_str("income"),
            TransactionKind::Expense => f.write_str("expense"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!("unknown transaction kind '{other}' (expected income|expense)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    /// Non-negative; stored as a decimal string.
    pub amount: Decimal,
    pub category_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "loose_date")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetPeriod::Weekly => f.write_str("weekly"),
            BudgetPeriod::Monthly => f.write_str("monthly"),
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" | "week" => Ok(BudgetPeriod::Weekly),
            "monthly" | "month" => Ok(BudgetPeriod::Monthly),
            other => Err(format!("unknown budget period '{other}' (expected weekly|monthly)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub category_id: String,
    /// Spending threshold for one period window.
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(TransactionKind),
}

impl TypeFilter {
    pub fn accepts(self, kind: TransactionKind) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(k) => k == kind,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(TypeFilter::All);
        }
        s.parse::<TransactionKind>()
            .map(TypeFilter::Only)
            .map_err(|_| format!("unknown type filter '{s}' (expected all|income|expense)"))
    }
}

/// The active query constraining which transactions are visible and aggregated.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    /// Inclusive on both ends.
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Empty means every category matches.
    pub categories: BTreeSet<String>,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub kind: TypeFilter,
}

impl FilterSpec {
    pub fn for_range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            categories: BTreeSet::new(),
            min: None,
            max: None,
            kind: TypeFilter::All,
        }
    }
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn default_categories() -> Vec<Category> {
    const DEFAULTS: &[(&str, &str, &str, &str)] = &[
        ("1", "Food & Dining", "#FF6B6B", "🍔"),
        ("2", "Transportation", "#4ECDC4", "🚗"),
        ("3", "Shopping", "#45B7D1", "🛍️"),
        ("4", "Entertainment", "#96CEB4", "🎬"),
        ("5", "Bills & Utilities", "#FFEAA7", "💡"),
        ("6", "Healthcare", "#DDA0DD", "🏥"),
        ("7", "Education", "#98D8C8", "📚"),
        ("8", "Travel", "#F7DC6F", "✈️"),
        ("9", "Salary", "#82E0AA", "💰"),
        ("10", "Other", "#AEB6BF", "📦"),
    ];

    DEFAULTS
        .iter()
        .map(|(id, name, color, icon)| Category {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
        })
        .collect()
}

pub fn category_name<'a>(categories: &'a [Category], id: &str) -> &'a str {
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.as_str())
        .unwrap_or(UNKNOWN_CATEGORY)
}

/// Dates are written as `YYYY-MM-DD`. Older data may hold full timestamps,
/// so loading also accepts RFC 3339 and naive `YYYY-MM-DDTHH:MM:SS` forms and
/// keeps their calendar date.
pub mod loose_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw}")))
    }

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(d);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.date_naive());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|dt| dt.date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_categories_use_fixed_ids() {
        let cats = default_categories();
        assert_eq!(cats.len(), 10);
        let ids: Vec<&str> = cats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]);
    }

    #[test]
    fn transaction_json_uses_camel_case_and_type_field() {
        let json = r#"{
            "id": "a",
            "amount": 12.5,
            "categoryId": "1",
            "description": "lunch",
            "date": "2024-03-10T00:00:00.000Z",
            "type": "expense",
            "createdAt": "2024-03-10T12:00:00Z"
        }"#;
        let tx: Transaction = serde_json::from_str(json).expect("parse");
        assert_eq!(tx.kind, TransactionKind::Expense);
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(tx.amount, Decimal::new(125, 1));

        let out = serde_json::to_value(&tx).expect("serialize");
        assert_eq!(out["date"], "2024-03-10");
        assert_eq!(out["categoryId"], "1");
        assert_eq!(out["type"], "expense");
    }

    #[test]
    fn unknown_category_falls_back() {
        let cats = default_categories();
        assert_eq!(category_name(&cats, "1"), "Food & Dining");
        assert_eq!(category_name(&cats, "gone"), UNKNOWN_CATEGORY);
    }

    #[test]
    fn type_filter_parses_all_and_kinds() {
        assert_eq!("all".parse::<TypeFilter>().unwrap(), TypeFilter::All);
        assert_eq!(
            "Income".parse::<TypeFilter>().unwrap(),
            TypeFilter::Only(TransactionKind::Income)
        );
        assert!("both".parse::<TypeFilter>().is_err());
    }
}
