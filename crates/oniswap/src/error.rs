//! Error types of the swap core.
//!
//! Only [`TransactionError`] and [`PreconditionError`] are ever shown to the
//! user. Chain read and pricing failures are absorbed by the session and leave
//! the affected values as they were.

use crate::types::Amount;

/// Failure reading chain state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// Failure pricing a swap.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid reserves: input={input}, output={output}")]
    InvalidReserves { input: Amount, output: Amount },

    #[error("arithmetic overflow while pricing")]
    Overflow,
}

/// Failure submitting or confirming a transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionError {
    #[error("transaction rejected by user")]
    UserRejected,

    #[error("network error: {0}")]
    Network(String),

    #[error("transaction reverted: {0}")]
    ContractRevert(String),
}

/// A swap request that cannot be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    #[error("Please connect your wallet first")]
    WalletNotConnected,

    #[error("Enter an amount to swap")]
    NothingToSwap,

    #[error("A swap is already in progress")]
    SubmissionInFlight,
}

/// The session behind a handle has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("swap session has shut down")]
pub struct SessionClosed;
