//! Quote planning and rendering.
//!
//! The engine never prices anything itself. It decides whether a pricer call
//! is warranted for the current input and reserves, and turns the pricer's
//! answer into the string shown in the derived field.

use crate::chain::QuotePricer;
use crate::direction::Direction;
use crate::error::PricingError;
use crate::types::{Amount, ReservePair};
use crate::units::{from_base_units, is_positive_decimal, to_base_units, truncate_fraction};
use tracing::debug;

/// Arguments of a single pricer call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteRequest {
    pub amount_in: Amount,
    pub reserve_in: Amount,
    pub reserve_out: Amount,
}

/// A resolved quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Direction the quote was computed for.
    pub direction: Direction,
    /// The pricer call it answers.
    pub request: QuoteRequest,
    /// Output amount in base units of the derived side.
    pub amount_out: Amount,
}

/// What to do with the derived field for the current inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotePlan {
    /// Nothing to price: the derived field is zero.
    Zero,
    /// Reserves are not usable yet: leave the derived field as it is.
    Hold,
    /// Ask the pricer.
    Request(QuoteRequest),
}

/// Decides when to price and how to render the result.
#[derive(Debug, Clone, Copy)]
pub struct QuoteEngine {
    max_display_fraction_digits: usize,
}

impl QuoteEngine {
    /// Create an engine rendering at most `max_display_fraction_digits` digits.
    pub fn new(max_display_fraction_digits: usize) -> Self {
        Self {
            max_display_fraction_digits,
        }
    }

    /// Plan the recomputation of the derived field.
    ///
    /// `input` is the active field's value, converted with `input_decimals`.
    pub fn plan(&self, input: &str, input_decimals: u8, reserves: ReservePair) -> QuotePlan {
        if !is_positive_decimal(input) {
            return QuotePlan::Zero;
        }
        let amount_in = to_base_units(input, input_decimals);
        if amount_in.is_zero() {
            return QuotePlan::Zero;
        }

        match reserves.known() {
            Some((reserve_in, reserve_out)) if !reserve_in.is_zero() => {
                QuotePlan::Request(QuoteRequest {
                    amount_in,
                    reserve_in,
                    reserve_out,
                })
            }
            _ => QuotePlan::Hold,
        }
    }

    /// Run a planned request against the pricer.
    pub async fn quote(
        &self,
        pricer: &dyn QuotePricer,
        request: QuoteRequest,
    ) -> Result<Amount, PricingError> {
        debug!(
            amount_in = %request.amount_in,
            reserve_in = %request.reserve_in,
            reserve_out = %request.reserve_out,
            "pricing swap"
        );
        pricer
            .price_swap(request.amount_in, request.reserve_in, request.reserve_out)
            .await
    }

    /// Render a pricer result for the derived field.
    pub fn render(&self, amount_out: Amount, output_decimals: u8) -> String {
        if amount_out.is_zero() {
            return "0".to_string();
        }
        truncate_fraction(
            &from_base_units(amount_out, output_decimals),
            self.max_display_fraction_digits,
        )
    }
}
