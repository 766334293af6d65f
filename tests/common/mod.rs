// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use domus::KeyValueStore;
use domus::advice::{AdviceError, AdviceProvider};
use domus::application::LedgerStore;
use domus::domain::{Category, NewTransaction, TransactionType};
use domus::storage::{MemoryStore, Repository};
use tempfile::TempDir;
use tokio::sync::Semaphore;

/// Helper to create a ledger store over a temporary SQLite database
pub async fn test_store() -> Result<(LedgerStore<Repository>, TempDir)> {
    let temp_dir = TempDir::new()?;
    let store = LedgerStore::open(open_repo(&temp_dir).await?).await;
    Ok((store, temp_dir))
}

/// Open (or reopen) the database inside `temp_dir`
pub async fn open_repo(temp_dir: &TempDir) -> Result<Repository> {
    let db_path = temp_dir.path().join("test.db");
    Repository::open(db_path.to_str().unwrap()).await
}

/// Helper to parse a date string into a NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

pub fn income(description: &str, cents: i64, category: Category, date: &str) -> NewTransaction {
    NewTransaction::new(description, cents, TransactionType::Income, category)
        .unwrap()
        .with_date(parse_date(date))
}

pub fn expense(description: &str, cents: i64, category: Category, date: &str) -> NewTransaction {
    NewTransaction::new(description, cents, TransactionType::Expense, category)
        .unwrap()
        .with_date(parse_date(date))
}

/// Key-value store whose writes can be switched off
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("disk full"));
        }
        self.inner.put(key, value).await
    }
}

/// Advice provider with a canned answer that counts its calls
#[derive(Clone)]
pub struct CannedProvider {
    pub answer: Result<String, AdviceError>,
    pub calls: Arc<AtomicUsize>,
}

impl CannedProvider {
    pub fn ok(text: &str) -> Self {
        Self {
            answer: Ok(text.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(err: AdviceError) -> Self {
        Self {
            answer: Err(err),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AdviceProvider for CannedProvider {
    async fn generate(&self, _prompt: &str) -> Result<String, AdviceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

/// Advice provider that blocks until the test releases a permit, then
/// answers with the number of the call ("answer 1", "answer 2", ...)
#[derive(Clone)]
pub struct GatedProvider {
    pub gate: Arc<Semaphore>,
    pub calls: Arc<AtomicUsize>,
}

impl GatedProvider {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }
}

impl AdviceProvider for GatedProvider {
    async fn generate(&self, _prompt: &str) -> Result<String, AdviceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| AdviceError::Network(e.to_string()))?;
        permit.forget();
        Ok(format!("answer {}", call))
    }
}
