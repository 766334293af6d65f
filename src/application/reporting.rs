use serde::{Deserialize, Serialize};

use crate::domain::{
    Category, Cents, DailyFlow, Summary, Transaction, compute_category_breakdown,
    compute_daily_flow, compute_summary, total_units,
};

/// Everything the dashboard renders, computed from one ledger snapshot.
/// Money fields serialize as currency units, like the stored ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub summary: Summary,
    pub daily_flow: Vec<DailyFlow>,
    pub categories: Vec<CategoryShare>,
}

/// One pie-chart slice: a category's expenses and its share of all expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: Category,
    #[serde(with = "total_units")]
    pub total: Cents,
    pub percentage: f64,
}

impl Dashboard {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let summary = compute_summary(transactions);
        let categories = compute_category_breakdown(transactions)
            .into_iter()
            .map(|entry| CategoryShare {
                category: entry.category,
                total: entry.expense,
                percentage: percentage_of(entry.expense, summary.total_expenses),
            })
            .collect();

        Self {
            summary,
            daily_flow: compute_daily_flow(transactions),
            categories,
        }
    }
}

fn percentage_of(part: Cents, whole: Cents) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
