//! Key-Value Balances and Wallet
//!
//! Doubloon balances and the treasury live outside the entity store, behind
//! a small get/set port. The wallet is the only writer.

use anyhow::{anyhow, Result};
use dashmap::DashMap;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::progression::ConversionReceipt;

/// Injected persistence for integer balances
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<i64>>> + Send;

    fn set(&self, key: &str, value: i64) -> impl Future<Output = Result<()>> + Send;

    /// Atomically add `delta` to the value at `key` (missing counts as 0)
    /// and return the new value
    fn add(&self, key: &str, delta: i64) -> impl Future<Output = Result<i64>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    values: Arc<DashMap<String, i64>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<i64>> {
        Ok(self.values.get(key).map(|entry| *entry.value()))
    }

    async fn set(&self, key: &str, value: i64) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    async fn add(&self, key: &str, delta: i64) -> Result<i64> {
        let mut entry = self.values.entry(key.to_string()).or_insert(0);
        let next = entry
            .checked_add(delta)
            .ok_or_else(|| anyhow!("balance overflow on '{}'", key))?;
        *entry = next;
        Ok(next)
    }
}

pub const TREASURY_KEY: &str = "treasury";

pub fn doubloons_key(user_email: &str) -> String {
    format!("doubloons:{}", user_email)
}

/// Balances after a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WalletBalance {
    pub doubloons: i64,
    pub treasury: i64,
}

#[derive(Debug, Clone)]
pub struct Wallet<K> {
    kv: K,
}

impl<K: KeyValueStore> Wallet<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub async fn doubloons(&self, user_email: &str) -> Result<i64> {
        Ok(self.kv.get(&doubloons_key(user_email)).await?.unwrap_or(0))
    }

    pub async fn treasury(&self) -> Result<i64> {
        Ok(self.kv.get(TREASURY_KEY).await?.unwrap_or(0))
    }

    /// Credit the user's doubloons and move the fee to the treasury
    pub async fn deposit(
        &self,
        user_email: &str,
        receipt: &ConversionReceipt,
    ) -> Result<WalletBalance> {
        let doubloons = self
            .kv
            .add(&doubloons_key(user_email), receipt.doubloons_received)
            .await?;
        let treasury = self.kv.add(TREASURY_KEY, receipt.fee).await?;

        debug!(
            user = %user_email,
            doubloons = doubloons,
            treasury = treasury,
            "Wallet deposit"
        );

        Ok(WalletBalance {
            doubloons,
            treasury,
        })
    }
}
