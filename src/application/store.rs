use std::collections::HashSet;

use crate::domain::{
    CategoryBreakdown, DailyFlow, NewTransaction, Summary, Transaction, compute_category_breakdown,
    compute_daily_flow, compute_summary, today,
};
use crate::storage::{KeyValueStore, LEDGER_KEY};

use super::{AppError, Dashboard};

/// Owner of the ledger: the newest-first list of transactions plus the
/// storage it is written through to.
///
/// Every mutation persists the full ledger before returning. Reads never
/// touch storage; the aggregates are recomputed from the in-memory list.
pub struct LedgerStore<S> {
    store: S,
    transactions: Vec<Transaction>,
}

impl<S: KeyValueStore> LedgerStore<S> {
    /// Create an empty store without reading persisted state.
    pub fn new(store: S) -> Self {
        Self {
            store,
            transactions: Vec::new(),
        }
    }

    /// Create a store and restore the persisted ledger.
    pub async fn open(store: S) -> Self {
        let mut ledger = Self::new(store);
        ledger.load().await;
        ledger
    }

    /// Restore the ledger from storage.
    ///
    /// Missing, unreadable or malformed data yields an empty ledger. Never fails.
    pub async fn load(&mut self) {
        self.transactions = match self.store.get(LEDGER_KEY).await {
            Ok(Some(raw)) => decode_ledger(&raw),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "could not read stored ledger, starting empty");
                Vec::new()
            }
        };
        tracing::debug!(count = self.transactions.len(), "ledger loaded");
    }

    /// Write the full ledger to storage.
    pub async fn save(&self) -> Result<(), AppError> {
        let json = serde_json::to_string(&self.transactions)?;
        self.store.put(LEDGER_KEY, &json).await?;
        Ok(())
    }

    /// Record a new transaction at the front of the ledger, dated today unless
    /// the draft carries a date.
    ///
    /// If the write fails the ledger is left as it was.
    pub async fn add(&mut self, draft: NewTransaction) -> Result<Transaction, AppError> {
        let transaction = draft.into_transaction(today());
        self.transactions.insert(0, transaction.clone());

        if let Err(err) = self.save().await {
            self.transactions.remove(0);
            return Err(err);
        }

        tracing::debug!(
            id = %transaction.id,
            amount = transaction.amount,
            kind = %transaction.transaction_type,
            "transaction added"
        );
        Ok(transaction)
    }

    /// Remove the transaction with the given id.
    ///
    /// Returns `Ok(None)` without writing when the id is unknown, so repeated
    /// deletes are harmless.
    pub async fn delete(&mut self, id: &str) -> Result<Option<Transaction>, AppError> {
        let Some(position) = self.transactions.iter().position(|t| t.id == id) else {
            tracing::debug!(id, "delete of unknown transaction ignored");
            return Ok(None);
        };

        let removed = self.transactions.remove(position);
        if let Err(err) = self.save().await {
            self.transactions.insert(position, removed);
            return Err(err);
        }

        tracing::debug!(id, "transaction deleted");
        Ok(Some(removed))
    }

    /// Borrow the ledger, newest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Owned copy of the ledger, for work that outlives this borrow.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn summary(&self) -> Summary {
        compute_summary(&self.transactions)
    }

    pub fn daily_flow(&self) -> Vec<DailyFlow> {
        compute_daily_flow(&self.transactions)
    }

    pub fn category_breakdown(&self) -> Vec<CategoryBreakdown> {
        compute_category_breakdown(&self.transactions)
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::from_transactions(&self.transactions)
    }
}

/// Parse the stored JSON array. Anything malformed degrades to an empty
/// ledger; duplicate ids keep their first occurrence.
fn decode_ledger(raw: &str) -> Vec<Transaction> {
    let transactions: Vec<Transaction> = match serde_json::from_str(raw) {
        Ok(transactions) => transactions,
        Err(err) => {
            tracing::warn!(error = %err, "stored ledger is malformed, starting empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let total = transactions.len();
    let unique: Vec<Transaction> = transactions
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect();

    if unique.len() != total {
        tracing::warn!(
            dropped = total - unique.len(),
            "stored ledger contained duplicate ids"
        );
    }

    unique
}
