//! Core type definitions for the swap core.
//!
//! Re-exports from alloy-primitives for Ethereum-compatible types.

pub use alloy::primitives::{Address, TxHash, U256};

/// Identifier of the pool's token contract.
pub type TokenId = Address;

/// Amount in base units (wei for the native coin, smallest decimal for the token).
pub type Amount = U256;

/// Decimal count of the native coin.
pub const NATIVE_DECIMALS: u8 = 18;

/// Decimal count assumed for the token until its metadata has been read.
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Largest decimal count whose power of ten still fits in a `U256`.
pub const MAX_DECIMALS: u8 = 77;

/// One of the two fields of the swap form, independent of swap direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The chain's native coin.
    Native,
    /// The pool's token.
    Token,
}

impl Side {
    /// Get the other side of the pair.
    pub fn other(self) -> Self {
        match self {
            Side::Native => Side::Token,
            Side::Token => Side::Native,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Native => write!(f, "native"),
            Side::Token => write!(f, "token"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "eth" => Ok(Side::Native),
            "token" => Ok(Side::Token),
            other => Err(format!("unknown side: {other}")),
        }
    }
}

/// Token metadata read from the token contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    /// Ticker symbol.
    pub symbol: String,
    /// Number of fractional digits of one whole token.
    pub decimals: u8,
}

/// A balance as returned by the chain reader.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Balance {
    /// Exact amount in base units.
    pub raw: Amount,
    /// Decimal rendering of `raw`.
    pub display: String,
}

/// Pool reserves oriented for a swap direction.
/// `None` means the reserve has not been read yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReservePair {
    /// Reserve of the side being sold into the pool.
    pub input: Option<Amount>,
    /// Reserve of the side being bought from the pool.
    pub output: Option<Amount>,
}

impl ReservePair {
    /// Create a reserve pair.
    pub fn new(input: Option<Amount>, output: Option<Amount>) -> Self {
        Self { input, output }
    }

    /// Both reserves, if known.
    pub fn known(&self) -> Option<(Amount, Amount)> {
        Some((self.input?, self.output?))
    }
}
