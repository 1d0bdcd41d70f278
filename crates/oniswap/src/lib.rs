//! Swap core for a native coin / token constant-product pool.
//!
//! This library provides:
//! - Exact conversion between decimal strings and integer base units
//! - Sanitizing of typed amounts
//! - Quote planning against pool reserves, with stale results discarded
//! - A direction controller that hands values over on toggle
//! - A single-threaded session loop driving chain, pricer and wallet
//!   collaborators

pub mod chain;
pub mod config;
pub mod direction;
pub mod display;
pub mod error;
pub mod input;
pub mod pricer;
pub mod quote;
pub mod session;
pub mod state;
pub mod types;
pub mod units;

pub use chain::{
    ChainReader, Collaborators, ContractCall, NotificationSink, QuotePricer, Severity,
    TransactionReceipt, TransactionSubmitter,
};
pub use config::SwapConfig;
pub use direction::{Direction, SwapDirectionController};
pub use error::{ChainError, PreconditionError, PricingError, SessionClosed, TransactionError};
pub use input::{AmountInputSanitizer, Key, KeyPress, Modifiers};
pub use pricer::ConstantProductPricer;
pub use quote::{Quote, QuoteEngine, QuotePlan, QuoteRequest};
pub use session::{SessionHandle, SwapAction, SwapSession};
pub use state::{Effect, SwapEvent, SwapIntent, SwapState, SwapView};
pub use types::{
    Address, Amount, Balance, ReservePair, Side, TokenId, TokenMetadata, TxHash, U256,
    DEFAULT_TOKEN_DECIMALS, NATIVE_DECIMALS,
};
pub use units::{from_base_units, to_base_units};
