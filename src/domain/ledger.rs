use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Category, Cents, Transaction, TransactionType, total_units};

/// Running totals over the whole ledger. Always derived, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(with = "total_units")]
    pub total_income: Cents,
    #[serde(with = "total_units")]
    pub total_expenses: Cents,
    #[serde(with = "total_units")]
    pub balance: Cents,
}

/// Income and expense sums for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyFlow {
    pub date: NaiveDate,
    #[serde(with = "total_units")]
    pub income: Cents,
    #[serde(with = "total_units")]
    pub expense: Cents,
}

/// Expense sum for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: Category,
    #[serde(with = "total_units")]
    pub expense: Cents,
}

/// Compute totals for a list of transactions.
/// Balance = sum of incomes - sum of expenses
///
/// Sums saturate at the `Cents` bounds instead of overflowing.
pub fn compute_summary(transactions: &[Transaction]) -> Summary {
    let summary = transactions
        .iter()
        .fold(Summary::default(), |mut acc, tx| {
            match tx.transaction_type {
                TransactionType::Income => {
                    acc.total_income = acc.total_income.saturating_add(tx.amount)
                }
                TransactionType::Expense => {
                    acc.total_expenses = acc.total_expenses.saturating_add(tx.amount)
                }
            }
            acc
        });

    Summary {
        balance: summary.total_income.saturating_sub(summary.total_expenses),
        ..summary
    }
}

/// One entry per distinct date, ascending by calendar date.
pub fn compute_daily_flow(transactions: &[Transaction]) -> Vec<DailyFlow> {
    let mut days: BTreeMap<NaiveDate, (Cents, Cents)> = BTreeMap::new();

    for tx in transactions {
        let (income, expense) = days.entry(tx.date).or_insert((0, 0));
        match tx.transaction_type {
            TransactionType::Income => *income = income.saturating_add(tx.amount),
            TransactionType::Expense => *expense = expense.saturating_add(tx.amount),
        }
    }

    days.into_iter()
        .map(|(date, (income, expense))| DailyFlow {
            date,
            income,
            expense,
        })
        .collect()
}

/// Expense totals per category. Income is ignored.
///
/// Categories appear in the order they were first recorded. The ledger is
/// newest-first, so it is walked from the back.
pub fn compute_category_breakdown(transactions: &[Transaction]) -> Vec<CategoryBreakdown> {
    let mut positions: HashMap<Category, usize> = HashMap::new();
    let mut breakdown: Vec<CategoryBreakdown> = Vec::new();

    for tx in transactions.iter().rev().filter(|t| t.is_expense()) {
        let index = *positions.entry(tx.category).or_insert_with(|| {
            breakdown.push(CategoryBreakdown {
                category: tx.category,
                expense: 0,
            });
            breakdown.len() - 1
        });
        breakdown[index].expense = breakdown[index].expense.saturating_add(tx.amount);
    }

    breakdown
}
