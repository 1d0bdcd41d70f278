//! In-process constant-product pricer.
//!
//! Mirrors the pool contract's `getAmountOfTokens` so a session can run
//! without an RPC round trip per keystroke:
//!
//! ```text
//! amount_in_with_fee = amount_in * (10_000 - fee_bps)
//! amount_out = amount_in_with_fee * reserve_out
//!            / (reserve_in * 10_000 + amount_in_with_fee)
//! ```

use crate::chain::QuotePricer;
use crate::config::{fee_multiplier, SwapConfig, BPS_DENOMINATOR};
use crate::error::PricingError;
use crate::types::{Amount, U256};
use async_trait::async_trait;

/// Constant-product pricer with a flat fee on the input amount.
#[derive(Debug, Clone, Copy)]
pub struct ConstantProductPricer {
    /// Share of the input kept after the fee, out of [`BPS_DENOMINATOR`].
    fee_multiplier: u32,
}

impl ConstantProductPricer {
    /// Create a pricer charging `fee_bps` basis points.
    pub fn new(fee_bps: u32) -> Self {
        Self {
            fee_multiplier: fee_multiplier(fee_bps),
        }
    }

    /// Create a pricer with the fee from a session configuration.
    pub fn from_config(config: &SwapConfig) -> Self {
        Self {
            fee_multiplier: config.fee_multiplier(),
        }
    }

    /// Compute the output amount.
    pub fn amount_out(
        &self,
        amount_in: Amount,
        reserve_in: Amount,
        reserve_out: Amount,
    ) -> Result<Amount, PricingError> {
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(PricingError::InvalidReserves {
                input: reserve_in,
                output: reserve_out,
            });
        }

        let multiplier = U256::from(self.fee_multiplier);
        let amount_in_with_fee = amount_in
            .checked_mul(multiplier)
            .ok_or(PricingError::Overflow)?;
        let numerator = amount_in_with_fee
            .checked_mul(reserve_out)
            .ok_or(PricingError::Overflow)?;
        let denominator = reserve_in
            .checked_mul(U256::from(BPS_DENOMINATOR))
            .and_then(|d| d.checked_add(amount_in_with_fee))
            .ok_or(PricingError::Overflow)?;

        Ok(numerator / denominator)
    }
}

#[async_trait]
impl QuotePricer for ConstantProductPricer {
    async fn price_swap(
        &self,
        amount_in: Amount,
        reserve_in: Amount,
        reserve_out: Amount,
    ) -> Result<Amount, PricingError> {
        self.amount_out(amount_in, reserve_in, reserve_out)
    }
}
