use crate::db::Db;
use crate::domain::{
    Budget, BudgetPeriod, Category, Transaction, TransactionKind, category_name, new_id,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("A category is required")]
    MissingCategory,
    #[error("No such category: '{0}'")]
    UnknownCategory(String),
    #[error("Amount must be greater than zero (got {0})")]
    InvalidAmount(Decimal),
    #[error("Category name must not be empty")]
    EmptyName,
    #[error("A {period} budget already exists for '{category}'")]
    DuplicateBudget { category: String, period: BudgetPeriod },
    #[error("No such category id: '{0}'")]
    CategoryNotFound(String),
    #[error("No such transaction: '{0}'")]
    TransactionNotFound(String),
    #[error("No such budget: '{0}'")]
    BudgetNotFound(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type StateResult<T> = Result<T, StateError>;

/// Fields a user supplies for a transaction; id and creation time are assigned.
#[derive(Debug, Clone)]
pub struct TransactionInput {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category_id: String,
    pub description: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub color: String,
    pub icon: String,
}

/// The in-memory collections for one session. Every mutation validates,
/// applies, then rewrites the affected collection in the store.
pub struct AppState {
    db: Db,
    transactions: Vec<Transaction>,
    categories: Vec<Category>,
    budgets: Vec<Budget>,
}

impl AppState {
    pub fn load(db: Db) -> anyhow::Result<Self> {
        let transactions = db.load_transactions()?;
        let categories = db.load_categories()?;
        let budgets = db.load_budgets()?;
        let dangling = transactions
            .iter()
            .filter(|t| !categories.iter().any(|c| c.id == t.category_id))
            .count();
        if dangling > 0 {
            tracing::warn!(dangling, "transactions reference deleted categories");
        }
        tracing::debug!(
            transactions = transactions.len(),
            categories = categories.len(),
            budgets = budgets.len(),
            "state loaded"
        );
        Ok(Self {
            db,
            transactions,
            categories,
            budgets,
        })
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    pub fn category_name(&self, id: &str) -> &str {
        category_name(&self.categories, id)
    }

    /// Looks up by exact id first, then by case-insensitive name.
    pub fn resolve_category(&self, id_or_name: &str) -> StateResult<&Category> {
        let needle = id_or_name.trim();
        if needle.is_empty() {
            return Err(StateError::MissingCategory);
        }
        self.categories
            .iter()
            .find(|c| c.id == needle)
            .or_else(|| {
                self.categories
                    .iter()
                    .find(|c| c.name.eq_ignore_ascii_case(needle))
            })
            .ok_or_else(|| StateError::UnknownCategory(needle.to_string()))
    }

    pub fn add_transaction(&mut self, input: TransactionInput) -> StateResult<&Transaction> {
        validate_transaction(&input)?;
        let tx = Transaction {
            id: new_id(),
            amount: input.amount,
            category_id: input.category_id,
            description: input.description.trim().to_string(),
            date: input.date,
            kind: input.kind,
            created_at: Utc::now(),
        };
        tracing::info!(id = %tx.id, kind = %tx.kind, amount = %tx.amount, "adding transaction");
        self.transactions.push(tx);
        self.db.save_transactions(&self.transactions)?;
        Ok(&self.transactions[self.transactions.len() - 1])
    }

    /// Replaces every user field; id and creation time are kept.
    pub fn update_transaction(&mut self, id: &str, input: TransactionInput) -> StateResult<&Transaction> {
        let index = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StateError::TransactionNotFound(id.to_string()))?;
        validate_transaction(&input)?;

        let existing = &self.transactions[index];
        let replacement = Transaction {
            id: existing.id.clone(),
            amount: input.amount,
            category_id: input.category_id,
            description: input.description.trim().to_string(),
            date: input.date,
            kind: input.kind,
            created_at: existing.created_at,
        };
        tracing::info!(id, "updating transaction");
        self.transactions[index] = replacement;
        self.db.save_transactions(&self.transactions)?;
        Ok(&self.transactions[index])
    }

    pub fn delete_transaction(&mut self, id: &str) -> StateResult<Transaction> {
        let index = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StateError::TransactionNotFound(id.to_string()))?;
        let removed = self.transactions.remove(index);
        tracing::info!(id, "deleted transaction");
        self.db.save_transactions(&self.transactions)?;
        Ok(removed)
    }

    pub fn add_category(&mut self, input: CategoryInput) -> StateResult<&Category> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(StateError::EmptyName);
        }
        let category = Category {
            id: new_id(),
            name: name.to_string(),
            color: input.color,
            icon: input.icon,
        };
        tracing::info!(id = %category.id, name = %category.name, "adding category");
        self.categories.push(category);
        self.db.save_categories(&self.categories)?;
        Ok(&self.categories[self.categories.len() - 1])
    }

    pub fn update_category(&mut self, id: &str, input: CategoryInput) -> StateResult<&Category> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(StateError::EmptyName);
        }
        let index = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StateError::CategoryNotFound(id.to_string()))?;
        self.categories[index] = Category {
            id: id.to_string(),
            name: name.to_string(),
            color: input.color,
            icon: input.icon,
        };
        tracing::info!(id, "updated category");
        self.db.save_categories(&self.categories)?;
        Ok(&self.categories[index])
    }

    /// Transactions keep their now-dangling reference and render as
    /// "Unknown"; budgets for the category are removed with it.
    pub fn delete_category(&mut self, id: &str) -> StateResult<(Category, usize)> {
        let index = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StateError::CategoryNotFound(id.to_string()))?;
        // Budgets are written first: the store never holds budgets for a
        // category it no longer has.
        let budgets: Vec<Budget> = self
            .budgets
            .iter()
            .filter(|b| b.category_id != id)
            .cloned()
            .collect();
        let dropped = self.budgets.len() - budgets.len();
        if dropped > 0 {
            self.db.save_budgets(&budgets)?;
            self.budgets = budgets;
        }

        let mut categories = self.categories.clone();
        let removed = categories.remove(index);
        self.db.save_categories(&categories)?;
        self.categories = categories;
        tracing::info!(id, budgets_removed = dropped, "deleted category");
        Ok((removed, dropped))
    }

    pub fn add_budget(
        &mut self,
        category_id: &str,
        amount: Decimal,
        period: BudgetPeriod,
    ) -> StateResult<&Budget> {
        if amount <= Decimal::ZERO {
            return Err(StateError::InvalidAmount(amount));
        }
        let category = self.resolve_category(category_id)?.clone();
        if self
            .budgets
            .iter()
            .any(|b| b.category_id == category.id && b.period == period)
        {
            return Err(StateError::DuplicateBudget {
                category: category.name,
                period,
            });
        }

        let budget = Budget {
            id: new_id(),
            category_id: category.id,
            amount,
            period,
            created_at: Utc::now(),
        };
        tracing::info!(id = %budget.id, category = %budget.category_id, %period, "adding budget");
        self.budgets.push(budget);
        self.db.save_budgets(&self.budgets)?;
        Ok(&self.budgets[self.budgets.len() - 1])
    }

    /// Editing skips the one-budget-per-(category, period) check.
    pub fn update_budget(
        &mut self,
        id: &str,
        amount: Decimal,
        period: BudgetPeriod,
    ) -> StateResult<&Budget> {
        if amount <= Decimal::ZERO {
            return Err(StateError::InvalidAmount(amount));
        }
        let index = self
            .budgets
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| StateError::BudgetNotFound(id.to_string()))?;
        let budget = &mut self.budgets[index];
        budget.amount = amount;
        budget.period = period;
        tracing::info!(id, "updated budget");
        self.db.save_budgets(&self.budgets)?;
        Ok(&self.budgets[index])
    }

    pub fn delete_budget(&mut self, id: &str) -> StateResult<Budget> {
        let index = self
            .budgets
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| StateError::BudgetNotFound(id.to_string()))?;
        let removed = self.budgets.remove(index);
        tracing::info!(id, "deleted budget");
        self.db.save_budgets(&self.budgets)?;
        Ok(removed)
    }

    pub fn find_transaction(&self, id: &str) -> StateResult<&Transaction> {
        self.transactions
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| StateError::TransactionNotFound(id.to_string()))
    }

    pub fn find_budget(&self, id: &str) -> StateResult<&Budget> {
        self.budgets
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| StateError::BudgetNotFound(id.to_string()))
    }
}

fn validate_transaction(input: &TransactionInput) -> StateResult<()> {
    if input.category_id.trim().is_empty() {
        return Err(StateError::MissingCategory);
    }
    if input.amount <= Decimal::ZERO {
        return Err(StateError::InvalidAmount(input.amount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UNKNOWN_CATEGORY;

    fn state() -> AppState {
        AppState::load(Db::open_in_memory().expect("db")).expect("state")
    }

    fn input(amount: i64, category: &str) -> TransactionInput {
        TransactionInput {
            kind: TransactionKind::Expense,
            amount: Decimal::from(amount),
            category_id: category.to_string(),
            description: "  groceries ".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        }
    }

    #[test]
    fn fresh_state_has_default_categories_only() {
        let s = state();
        assert!(s.transactions().is_empty());
        assert!(s.budgets().is_empty());
        assert_eq!(s.categories().len(), 10);
    }

    #[test]
    fn add_edit_delete_transaction_persist_each_step() {
        let mut s = state();
        let id = s.add_transaction(input(50, "1")).unwrap().id.clone();
        assert_eq!(s.db.load_transactions().unwrap().len(), 1);
        assert_eq!(s.transactions()[0].description, "groceries");

        let created_at = s.transactions()[0].created_at;
        let mut edit = input(75, "2");
        edit.kind = TransactionKind::Income;
        let updated = s.update_transaction(&id, edit).unwrap();
        assert_eq!(updated.amount, Decimal::from(75));
        assert_eq!(updated.kind, TransactionKind::Income);
        assert_eq!(updated.created_at, created_at);
        assert_eq!(s.db.load_transactions().unwrap()[0].category_id, "2");

        s.delete_transaction(&id).unwrap();
        assert!(s.db.load_transactions().unwrap().is_empty());
        assert!(matches!(
            s.delete_transaction(&id),
            Err(StateError::TransactionNotFound(_))
        ));
    }

    #[test]
    fn transaction_requires_category_and_positive_amount() {
        let mut s = state();
        assert!(matches!(
            s.add_transaction(input(10, " ")),
            Err(StateError::MissingCategory)
        ));
        assert!(matches!(
            s.add_transaction(input(0, "1")),
            Err(StateError::InvalidAmount(_))
        ));
        assert!(s.transactions().is_empty());
    }

    #[test]
    fn editing_missing_transaction_reports_not_found_before_validation() {
        let mut s = state();
        assert!(matches!(
            s.update_transaction("missing", input(0, "1")),
            Err(StateError::TransactionNotFound(_))
        ));
    }

    #[test]
    fn unreadable_stored_record_blocks_load_and_stays_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.sqlite3");
        let raw = r#"[
            {"id":"ok","amount":"12.00","categoryId":"1","description":"","date":"2024-03-01","type":"expense","createdAt":"2024-03-01T00:00:00Z"},
            {"id":"keepme","amount":"900.00","categoryId":"5","description":"Rent","date":"03/02/2024","type":"expense","createdAt":"2024-03-02T00:00:00Z"}
        ]"#;
        Db::open(&path).expect("open").set(crate::db::TRANSACTIONS_KEY, raw).unwrap();

        let err = AppState::load(Db::open(&path).expect("reopen"))
            .err()
            .expect("load must fail");
        assert!(format!("{err:#}").contains("record 1"));

        let stored = Db::open(&path)
            .expect("reopen")
            .get(crate::db::TRANSACTIONS_KEY)
            .unwrap()
            .unwrap();
        assert!(stored.contains("keepme"));
    }

    #[test]
    fn ids_are_unique_under_rapid_creation() {
        let mut s = state();
        let a = s.add_transaction(input(1, "1")).unwrap().id.clone();
        let b = s.add_transaction(input(1, "1")).unwrap().id.clone();
        assert_ne!(a, b);
    }

    #[test]
    fn duplicate_budget_is_rejected_but_edit_is_not_checked() {
        let mut s = state();
        let monthly = s
            .add_budget("1", Decimal::from(100), BudgetPeriod::Monthly)
            .unwrap()
            .id
            .clone();
        assert!(matches!(
            s.add_budget("Food & Dining", Decimal::from(50), BudgetPeriod::Monthly),
            Err(StateError::DuplicateBudget { .. })
        ));

        let weekly = s
            .add_budget("1", Decimal::from(25), BudgetPeriod::Weekly)
            .unwrap()
            .id
            .clone();
        s.update_budget(&weekly, Decimal::from(30), BudgetPeriod::Monthly)
            .unwrap();
        assert_eq!(s.budgets().len(), 2);
        assert_eq!(s.find_budget(&monthly).unwrap().amount, Decimal::from(100));
        assert_eq!(s.db.load_budgets().unwrap()[1].amount, Decimal::from(30));
    }

    #[test]
    fn budget_amount_must_be_positive() {
        let mut s = state();
        assert!(matches!(
            s.add_budget("1", Decimal::ZERO, BudgetPeriod::Monthly),
            Err(StateError::InvalidAmount(_))
        ));
        let id = s
            .add_budget("1", Decimal::from(10), BudgetPeriod::Monthly)
            .unwrap()
            .id
            .clone();
        assert!(matches!(
            s.update_budget(&id, Decimal::from(-5), BudgetPeriod::Monthly),
            Err(StateError::InvalidAmount(_))
        ));
    }

    #[test]
    fn deleting_category_drops_its_budgets_and_orphans_transactions() {
        let mut s = state();
        s.add_transaction(input(20, "3")).unwrap();
        s.add_budget("3", Decimal::from(100), BudgetPeriod::Weekly)
            .unwrap();
        s.add_budget("4", Decimal::from(100), BudgetPeriod::Weekly)
            .unwrap();

        let (removed, dropped) = s.delete_category("3").unwrap();
        assert_eq!(removed.name, "Shopping");
        assert_eq!(dropped, 1);
        assert_eq!(s.budgets().len(), 1);
        assert_eq!(s.transactions().len(), 1);
        assert_eq!(s.category_name("3"), UNKNOWN_CATEGORY);
        assert_eq!(s.db.load_categories().unwrap().len(), 9);
        assert_eq!(s.db.load_budgets().unwrap().len(), 1);
        assert!(matches!(
            s.delete_category("3"),
            Err(StateError::CategoryNotFound(_))
        ));
        assert!(matches!(
            s.update_category(
                "3",
                CategoryInput {
                    name: "Shopping".to_string(),
                    color: "#45B7D1".to_string(),
                    icon: "🛍️".to_string(),
                }
            ),
            Err(StateError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn categories_resolve_by_id_or_name() {
        let mut s = state();
        assert_eq!(s.resolve_category("2").unwrap().name, "Transportation");
        assert_eq!(s.resolve_category("travel").unwrap().id, "8");
        assert!(matches!(
            s.resolve_category("nope"),
            Err(StateError::UnknownCategory(_))
        ));

        let id = s
            .add_category(CategoryInput {
                name: " Pets ".to_string(),
                color: "#123456".to_string(),
                icon: "🐶".to_string(),
            })
            .unwrap()
            .id
            .clone();
        assert_eq!(s.resolve_category("pets").unwrap().id, id);
        assert!(matches!(
            s.add_category(CategoryInput {
                name: "   ".to_string(),
                color: String::new(),
                icon: String::new(),
            }),
            Err(StateError::EmptyName)
        ));
    }
}
