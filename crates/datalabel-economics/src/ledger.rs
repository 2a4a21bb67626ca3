use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use datalabel_types::{QuAmount, WorkerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Record of a transfer executed by the hosting network's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub to: WorkerId,
    pub amount: QuAmount,
    /// Transaction id assigned by the ledger.
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Narrow interface to the ledger that actually moves currency.
///
/// The contract treats everything behind this trait as external: its
/// own state never depends on ledger timestamps or transaction ids.
#[async_trait]
pub trait LedgerAdapter: Send + Sync {
    /// Transfers `amount` from the contract's account to `to`.
    async fn send(&self, to: WorkerId, amount: QuAmount) -> Result<TransferReceipt>;

    /// Current ledger balance held by `id`.
    async fn balance(&self, id: WorkerId) -> Result<QuAmount>;
}

/// In-memory ledger for tests and local runs.
pub struct MemoryLedger {
    balances: Arc<RwLock<HashMap<WorkerId, QuAmount>>>,
    transfers: Arc<RwLock<Vec<TransferReceipt>>>,
    nonce: AtomicU64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            balances: Arc::new(RwLock::new(HashMap::new())),
            transfers: Arc::new(RwLock::new(Vec::new())),
            nonce: AtomicU64::new(0),
        }
    }

    /// All transfers executed so far, in order.
    pub async fn transfers(&self) -> Vec<TransferReceipt> {
        self.transfers.read().await.clone()
    }

    fn next_tx_id(&self, to: &WorkerId, amount: QuAmount) -> String {
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let mut hasher = blake3::Hasher::new();
        hasher.update(to.as_bytes());
        hasher.update(&amount.to_qu().to_le_bytes());
        hasher.update(&nonce.to_le_bytes());
        hex::encode(hasher.finalize().as_bytes())
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerAdapter for MemoryLedger {
    async fn send(&self, to: WorkerId, amount: QuAmount) -> Result<TransferReceipt> {
        let receipt = TransferReceipt {
            to,
            amount,
            tx_id: self.next_tx_id(&to, amount),
            timestamp: Utc::now(),
        };

        let mut balances = self.balances.write().await;
        let balance = balances.entry(to).or_insert(QuAmount::ZERO);
        *balance = balance.saturating_add(amount);
        drop(balances);

        self.transfers.write().await.push(receipt.clone());
        debug!(to = %to, amount = %amount, tx_id = %receipt.tx_id, "Ledger transfer executed");
        Ok(receipt)
    }

    async fn balance(&self, id: WorkerId) -> Result<QuAmount> {
        Ok(self
            .balances
            .read()
            .await
            .get(&id)
            .copied()
            .unwrap_or(QuAmount::ZERO))
    }
}
