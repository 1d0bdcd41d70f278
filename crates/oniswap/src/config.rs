//! Swap session configuration.

use crate::input::MAX_INPUT_FRACTION_DIGITS;
use crate::types::{Address, TokenId, DEFAULT_TOKEN_DECIMALS, NATIVE_DECIMALS};
use std::time::Duration;

/// Fee basis-points denominator (10_000 bps = 100%).
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Shortest refresh interval a session will poll at.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for a swap session.
#[derive(Debug, Clone)]
pub struct SwapConfig {
    /// Address of the constant-product pool contract.
    pub pool: Address,

    /// Address of the pool's token contract.
    pub token: TokenId,

    /// Decimal count of the native coin.
    pub native_decimals: u8,

    /// Decimal count used for the token until its metadata is known.
    pub default_token_decimals: u8,

    /// Maximum fractional digits accepted while typing an amount.
    pub max_input_fraction_digits: usize,

    /// Maximum fractional digits shown in the derived (quoted) field.
    pub max_display_fraction_digits: usize,

    /// Interval between reserve and balance refreshes while connected.
    pub refresh_interval: Duration,

    /// How long a notification stays visible.
    pub notification_duration: Duration,

    /// Fee charged by the pool in basis points, used by the in-process pricer.
    /// For example, 100 = 1.00% (the 99/100 factor of the pool contract).
    pub fee_bps: u32,
}

impl SwapConfig {
    /// Create a configuration for a pool and its token with default settings.
    pub fn new(pool: Address, token: TokenId) -> Self {
        Self {
            pool,
            token,
            native_decimals: NATIVE_DECIMALS,
            default_token_decimals: DEFAULT_TOKEN_DECIMALS,
            max_input_fraction_digits: MAX_INPUT_FRACTION_DIGITS,
            max_display_fraction_digits: MAX_INPUT_FRACTION_DIGITS,
            refresh_interval: Duration::from_secs(10),
            notification_duration: Duration::from_secs(4),
            fee_bps: 100,
        }
    }

    /// Set the decimal count assumed for the token before metadata loads.
    pub fn with_default_token_decimals(mut self, decimals: u8) -> Self {
        self.default_token_decimals = decimals;
        self
    }

    /// Set the refresh interval, at least [`MIN_REFRESH_INTERVAL`].
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval.max(MIN_REFRESH_INTERVAL);
        self
    }

    /// Set the notification duration.
    pub fn with_notification_duration(mut self, duration: Duration) -> Self {
        self.notification_duration = duration;
        self
    }

    /// Set the pool fee.
    pub fn with_fee_bps(mut self, fee_bps: u32) -> Self {
        self.fee_bps = fee_bps.min(BPS_DENOMINATOR);
        self
    }

    /// Set the fractional digit caps for typed and derived amounts.
    pub fn with_fraction_digits(mut self, input: usize, display: usize) -> Self {
        self.max_input_fraction_digits = input;
        self.max_display_fraction_digits = display;
        self
    }

    /// The multiplier applied to input amounts after the fee, out of
    /// [`BPS_DENOMINATOR`].
    pub fn fee_multiplier(&self) -> u32 {
        fee_multiplier(self.fee_bps)
    }
}

/// `BPS_DENOMINATOR - fee_bps`, with the fee capped at 100%.
pub fn fee_multiplier(fee_bps: u32) -> u32 {
    BPS_DENOMINATOR - fee_bps.min(BPS_DENOMINATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SwapConfig::new(Address::repeat_byte(0x01), Address::repeat_byte(0x02));

        assert_eq!(config.native_decimals, 18);
        assert_eq!(config.default_token_decimals, DEFAULT_TOKEN_DECIMALS);
        assert_eq!(config.max_input_fraction_digits, 8);
        assert_eq!(config.refresh_interval, Duration::from_secs(10));
        assert_eq!(config.notification_duration, Duration::from_secs(4));
        assert_eq!(config.fee_multiplier(), 9_900);
    }

    #[test]
    fn test_custom_fee() {
        let config = SwapConfig::new(Address::ZERO, Address::ZERO).with_fee_bps(30);
        assert_eq!(config.fee_multiplier(), 9_970);

        let config = SwapConfig::new(Address::ZERO, Address::ZERO).with_fee_bps(20_000);
        assert_eq!(config.fee_bps, BPS_DENOMINATOR);
        assert_eq!(config.fee_multiplier(), 0);
    }

    #[test]
    fn test_refresh_interval_has_a_floor() {
        let config =
            SwapConfig::new(Address::ZERO, Address::ZERO).with_refresh_interval(Duration::ZERO);
        assert_eq!(config.refresh_interval, MIN_REFRESH_INTERVAL);

        let config = SwapConfig::new(Address::ZERO, Address::ZERO)
            .with_refresh_interval(Duration::from_secs(3));
        assert_eq!(config.refresh_interval, Duration::from_secs(3));
    }
}
