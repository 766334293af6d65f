use std::future::Future;

use anyhow::Result;

mod memory;
mod repository;

pub use memory::*;
pub use repository::*;

/// SQL migration for the key-value table
pub const MIGRATION_001_KEY_VALUE: &str = include_str!("migrations/001_key_value.sql");

/// Fixed key under which the ledger is stored as a JSON array.
pub const LEDGER_KEY: &str = "domus_transactions";

/// String key-value persistence, the contract the ledger store writes through.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Insert or replace the value stored under `key`.
    fn put(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> + Send;
}
