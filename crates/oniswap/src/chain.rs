//! Interfaces to the collaborators the swap core drives.
//!
//! The session only talks to the chain, the pricer, the wallet and the user
//! through these traits. Implementations live outside the core; see
//! [`crate::pricer::ConstantProductPricer`] for an in-process pricer.

use crate::error::{ChainError, PricingError, TransactionError};
use crate::types::{Address, Amount, Balance, TokenId, TokenMetadata, TxHash};
use async_trait::async_trait;
use std::sync::Arc;

/// Read access to chain state.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Balance of `owner`, in the native coin when `token` is `None`.
    async fn read_balance(
        &self,
        owner: Address,
        token: Option<TokenId>,
    ) -> Result<Balance, ChainError>;

    /// Reserve the pool at `pool` holds, in the native coin when `token` is `None`.
    async fn read_reserve(&self, pool: Address, token: Option<TokenId>)
        -> Result<Amount, ChainError>;

    /// Symbol and decimals of a token contract.
    async fn read_token_metadata(&self, token: TokenId) -> Result<TokenMetadata, ChainError>;
}

/// The authoritative constant-product pricing function.
#[async_trait]
pub trait QuotePricer: Send + Sync {
    /// Output amount for selling `amount_in` into a pool with the given reserves.
    async fn price_swap(
        &self,
        amount_in: Amount,
        reserve_in: Amount,
        reserve_out: Amount,
    ) -> Result<Amount, PricingError>;
}

/// A single contract call sent by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    /// `swapEthTotoken()` on the pool, paying `value` in the native coin.
    SwapNativeForToken { pool: Address, value: Amount },
    /// `approve(spender, amount)` on the token.
    ApproveToken {
        token: TokenId,
        spender: Address,
        amount: Amount,
    },
    /// `swapTokenToEth(amount)` on the pool.
    SwapTokenForNative { pool: Address, amount: Amount },
}

/// A confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub hash: TxHash,
    pub block_number: Option<u64>,
}

/// Submits transactions through the connected wallet.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Sign and broadcast a call, returning its hash once accepted.
    async fn submit(&self, call: ContractCall) -> Result<TxHash, TransactionError>;

    /// Wait until a broadcast transaction is mined successfully.
    async fn wait_for_confirmation(
        &self,
        hash: TxHash,
    ) -> Result<TransactionReceipt, TransactionError>;
}

/// Severity of a user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// Shows short-lived messages to the user.
pub trait NotificationSink: Send + Sync {
    /// Show a message. Returns immediately; dismissal is up to the sink.
    fn notify(&self, message: &str, severity: Severity);
}

/// The full set of collaborators a session runs against.
#[derive(Clone)]
pub struct Collaborators {
    pub reader: Arc<dyn ChainReader>,
    pub pricer: Arc<dyn QuotePricer>,
    pub submitter: Arc<dyn TransactionSubmitter>,
    pub notifier: Arc<dyn NotificationSink>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
