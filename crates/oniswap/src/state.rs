//! Reactive swap state.
//!
//! [`SwapState`] is a synchronous state machine. Every input the swap form
//! reacts to arrives as a [`SwapEvent`]; applying it updates the fields and
//! returns the [`Effect`]s the caller must run (pricer calls, submissions,
//! notifications, polling). Results of those effects come back as events.
//!
//! The derived field is recomputed whenever the input amount, the direction,
//! the reserves or the token decimals change. Each recomputation bumps a
//! sequence number, and a quote result is only accepted if it answers the
//! latest sequence, so a slow pricer call can never overwrite a fresher value.

use crate::chain::{ContractCall, Severity, TransactionReceipt};
use crate::config::SwapConfig;
use crate::direction::{Direction, SwapDirectionController};
use crate::display::format_balance;
use crate::error::{PreconditionError, PricingError, TransactionError};
use crate::input::AmountInputSanitizer;
use crate::quote::{Quote, QuoteEngine, QuotePlan, QuoteRequest};
use crate::types::{
    Address, Amount, Balance, ReservePair, Side, TokenId, TokenMetadata, MAX_DECIMALS,
};
use crate::units::{from_base_units, to_base_units};
use tracing::{debug, info, warn};

/// Symbol shown for the token until its metadata is known.
pub const FALLBACK_TOKEN_SYMBOL: &str = "TOKEN";

/// Everything the swap state reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum SwapEvent {
    /// A wallet connected.
    Connected(Address),
    /// The wallet disconnected.
    Disconnected,
    /// The user edited an amount field; `value` is the whole field.
    InputEdited { side: Side, value: String },
    /// The user asked to sell their whole balance.
    MaxRequested,
    /// The user flipped the direction.
    Toggled,
    /// Fresh pool reserves. `None` leaves the previous value in place.
    ReservesLoaded {
        native: Option<Amount>,
        token: Option<Amount>,
    },
    /// Fresh balances of `account`. `None` leaves the previous value in place.
    BalancesLoaded {
        account: Address,
        native: Option<Balance>,
        token: Option<Balance>,
    },
    /// Token symbol and decimals were read.
    TokenMetadataLoaded(TokenMetadata),
    /// A pricer call finished.
    QuoteResolved {
        seq: u64,
        result: Result<Amount, PricingError>,
    },
    /// The user pressed swap.
    SubmitRequested,
    /// A submission finished.
    SubmissionFinished(Result<TransactionReceipt, TransactionError>),
}

/// What the user wants to swap, before it becomes contract calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapIntent {
    /// Pay `value` of the native coin for tokens.
    NativeForToken { value: Amount },
    /// Sell `amount` of tokens for the native coin.
    TokenForNative { amount: Amount },
}

impl SwapIntent {
    /// Contract calls implementing this intent, in order. Each call must be
    /// confirmed before the next is sent.
    pub fn calls(&self, pool: Address, token: TokenId) -> Vec<ContractCall> {
        match *self {
            SwapIntent::NativeForToken { value } => {
                vec![ContractCall::SwapNativeForToken { pool, value }]
            }
            SwapIntent::TokenForNative { amount } => vec![
                ContractCall::ApproveToken {
                    token,
                    spender: pool,
                    amount,
                },
                ContractCall::SwapTokenForNative { pool, amount },
            ],
        }
    }
}

/// Side effects requested by the state, run by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Call the pricer; answer with [`SwapEvent::QuoteResolved`] carrying `seq`.
    RequestQuote { seq: u64, request: QuoteRequest },
    /// Show a message to the user.
    Notify { message: String, severity: Severity },
    /// Submit a swap; answer with [`SwapEvent::SubmissionFinished`].
    Submit(SwapIntent),
    /// Refresh reserves and balances once, now.
    Refresh,
    /// Start periodic refreshes, beginning immediately.
    StartPolling,
    /// Stop periodic refreshes and cancel any in flight.
    StopPolling,
}

/// Read-only snapshot of the swap form.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapView {
    pub direction: Direction,
    pub native_value: String,
    pub token_value: String,
    pub token_symbol: String,
    pub token_decimals: u8,
    /// Display-formatted balances, if loaded.
    pub native_balance: Option<String>,
    pub token_balance: Option<String>,
    pub native_reserve: Option<Amount>,
    pub token_reserve: Option<Amount>,
    pub account: Option<Address>,
    pub is_submitting: bool,
    pub last_quote: Option<Quote>,
    pub can_submit: bool,
}

impl SwapView {
    /// Value of the editable field.
    pub fn input_value(&self) -> &str {
        self.value(self.direction.input_side())
    }

    /// Value of the derived field.
    pub fn derived_value(&self) -> &str {
        self.value(self.direction.output_side())
    }

    /// Value of the field for `side`.
    pub fn value(&self, side: Side) -> &str {
        match side {
            Side::Native => &self.native_value,
            Side::Token => &self.token_value,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingQuote {
    seq: u64,
    direction: Direction,
    request: QuoteRequest,
}

/// The swap form's reactive state.
#[derive(Debug)]
pub struct SwapState {
    config: SwapConfig,
    sanitizer: AmountInputSanitizer,
    engine: QuoteEngine,
    controller: SwapDirectionController,
    account: Option<Address>,
    native_reserve: Option<Amount>,
    token_reserve: Option<Amount>,
    native_balance: Option<Balance>,
    token_balance: Option<Balance>,
    token: Option<TokenMetadata>,
    quote_seq: u64,
    pending: Option<PendingQuote>,
    last_quote: Option<Quote>,
    submitting: bool,
}

impl SwapState {
    /// Create the initial state: native to token, both fields `"0"`.
    pub fn new(config: SwapConfig) -> Self {
        Self {
            sanitizer: AmountInputSanitizer::new(config.max_input_fraction_digits),
            engine: QuoteEngine::new(config.max_display_fraction_digits),
            controller: SwapDirectionController::default(),
            account: None,
            native_reserve: None,
            token_reserve: None,
            native_balance: None,
            token_balance: None,
            token: None,
            quote_seq: 0,
            pending: None,
            last_quote: None,
            submitting: false,
            config,
        }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &SwapConfig {
        &self.config
    }

    /// The quote engine in use.
    pub fn engine(&self) -> QuoteEngine {
        self.engine
    }

    /// The connected account.
    pub fn account(&self) -> Option<Address> {
        self.account
    }

    /// Whether the token metadata has been read.
    pub fn has_token_metadata(&self) -> bool {
        self.token.is_some()
    }

    /// Current direction and field contents.
    pub fn controller(&self) -> &SwapDirectionController {
        &self.controller
    }

    /// Decimal count of a side, falling back to the configured default for
    /// the token until its metadata is known.
    pub fn decimals(&self, side: Side) -> u8 {
        match side {
            Side::Native => self.config.native_decimals,
            Side::Token => self
                .token
                .as_ref()
                .map(|t| t.decimals)
                .unwrap_or(self.config.default_token_decimals),
        }
    }

    /// Reserves oriented for the current direction.
    pub fn reserves(&self) -> ReservePair {
        match self.controller.direction() {
            Direction::NativeToToken => ReservePair::new(self.native_reserve, self.token_reserve),
            Direction::TokenToNative => ReservePair::new(self.token_reserve, self.native_reserve),
        }
    }

    /// Apply an event and return the effects to run.
    pub fn apply(&mut self, event: SwapEvent) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            SwapEvent::Connected(account) => {
                if self.account == Some(account) {
                    return effects;
                }
                info!(%account, "wallet connected");
                self.account = Some(account);
                self.native_balance = None;
                self.token_balance = None;
                effects.push(Effect::StartPolling);
            }
            SwapEvent::Disconnected => {
                info!("wallet disconnected");
                self.account = None;
                self.native_balance = None;
                self.token_balance = None;
                effects.push(Effect::StopPolling);
            }
            SwapEvent::InputEdited { side, value } => {
                let value = self.sanitizer.sanitize(&value);
                if !self.controller.set_input(side, value) {
                    debug!(%side, "ignoring edit of the derived field");
                    return effects;
                }
                self.recompute(&mut effects);
            }
            SwapEvent::MaxRequested => {
                let side = self.controller.direction().input_side();
                let max = self
                    .balance(side)
                    .map(|b| from_base_units(b.raw, self.decimals(side)));
                let value = self.sanitizer.finalize_max(max.as_deref());
                self.controller.set_input(side, value);
                self.recompute(&mut effects);
            }
            SwapEvent::Toggled => {
                self.controller.toggle();
                debug!(direction = %self.controller.direction(), "direction toggled");
                // An empty seed must not wipe the amount now in the derived slot
                if self.plan_quote(&mut effects) == QuotePlan::Zero {
                    self.last_quote = None;
                }
            }
            SwapEvent::ReservesLoaded { native, token } => {
                let before = (self.native_reserve, self.token_reserve);
                self.native_reserve = native.or(self.native_reserve);
                self.token_reserve = token.or(self.token_reserve);
                if before != (self.native_reserve, self.token_reserve) {
                    debug!(native = ?self.native_reserve, token = ?self.token_reserve, "reserves changed");
                    self.recompute(&mut effects);
                }
            }
            SwapEvent::BalancesLoaded {
                account,
                native,
                token,
            } => {
                if self.account != Some(account) {
                    debug!(%account, "dropping balances of a previous account");
                    return effects;
                }
                self.native_balance = native.or(self.native_balance.take());
                self.token_balance = token.or(self.token_balance.take());
            }
            SwapEvent::TokenMetadataLoaded(metadata) => {
                if metadata.decimals > MAX_DECIMALS {
                    warn!(
                        decimals = metadata.decimals,
                        "token decimals out of range, ignoring metadata"
                    );
                    return effects;
                }
                let before = self.decimals(Side::Token);
                info!(symbol = %metadata.symbol, decimals = metadata.decimals, "token metadata loaded");
                self.token = Some(metadata);
                if self.decimals(Side::Token) != before {
                    self.recompute(&mut effects);
                }
            }
            SwapEvent::QuoteResolved { seq, result } => self.resolve_quote(seq, result),
            SwapEvent::SubmitRequested => match self.build_intent() {
                Ok(intent) => {
                    info!(?intent, "submitting swap");
                    self.submitting = true;
                    effects.push(Effect::Submit(intent));
                }
                Err(err) => {
                    debug!(%err, "swap blocked");
                    effects.push(Effect::Notify {
                        message: err.to_string(),
                        severity: Severity::Info,
                    });
                }
            },
            SwapEvent::SubmissionFinished(result) => {
                self.submitting = false;
                match result {
                    Ok(receipt) => {
                        info!(hash = %receipt.hash, "swap confirmed");
                        self.controller.reset();
                        self.recompute(&mut effects);
                        effects.push(Effect::Notify {
                            message: "Swap executed successfully!".to_string(),
                            severity: Severity::Success,
                        });
                        effects.push(Effect::Refresh);
                    }
                    Err(err) => {
                        warn!(%err, "swap failed");
                        effects.push(Effect::Notify {
                            message: err.to_string(),
                            severity: Severity::Error,
                        });
                    }
                }
            }
        }

        effects
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> SwapView {
        let direction = self.controller.direction();
        let input_side = direction.input_side();
        let input_amount = to_base_units(self.controller.input(), self.decimals(input_side));

        SwapView {
            direction,
            native_value: self.controller.value(Side::Native).to_string(),
            token_value: self.controller.value(Side::Token).to_string(),
            token_symbol: self
                .token
                .as_ref()
                .map(|t| t.symbol.clone())
                .unwrap_or_else(|| FALLBACK_TOKEN_SYMBOL.to_string()),
            token_decimals: self.decimals(Side::Token),
            native_balance: self.native_balance.as_ref().map(|b| format_balance(&b.display)),
            token_balance: self.token_balance.as_ref().map(|b| format_balance(&b.display)),
            native_reserve: self.native_reserve,
            token_reserve: self.token_reserve,
            account: self.account,
            is_submitting: self.submitting,
            last_quote: self.last_quote,
            can_submit: self.account.is_some() && !self.submitting && !input_amount.is_zero(),
        }
    }

    fn balance(&self, side: Side) -> Option<&Balance> {
        match side {
            Side::Native => self.native_balance.as_ref(),
            Side::Token => self.token_balance.as_ref(),
        }
    }

    /// Re-derive the output field from the current inputs.
    fn recompute(&mut self, effects: &mut Vec<Effect>) {
        if self.plan_quote(effects) == QuotePlan::Zero {
            self.controller.set_derived("0".to_string());
            self.last_quote = None;
        }
    }

    /// Invalidate pending quotes and request a new one if warranted. A
    /// [`QuotePlan::Zero`] is returned for the caller to apply.
    fn plan_quote(&mut self, effects: &mut Vec<Effect>) -> QuotePlan {
        // Anything still in flight answers an older question now
        self.quote_seq += 1;
        self.pending = None;

        let direction = self.controller.direction();
        let input_decimals = self.decimals(direction.input_side());

        let plan = self
            .engine
            .plan(self.controller.input(), input_decimals, self.reserves());
        match plan {
            QuotePlan::Zero => {}
            QuotePlan::Hold => {
                debug!("reserves not loaded yet, keeping derived amount");
            }
            QuotePlan::Request(request) => {
                let seq = self.quote_seq;
                self.pending = Some(PendingQuote {
                    seq,
                    direction,
                    request,
                });
                effects.push(Effect::RequestQuote { seq, request });
            }
        }
        plan
    }

    fn resolve_quote(&mut self, seq: u64, result: Result<Amount, PricingError>) {
        let pending = match self.pending {
            Some(pending) if pending.seq == seq => pending,
            _ => {
                debug!(seq, latest = self.quote_seq, "discarding stale quote");
                return;
            }
        };
        self.pending = None;

        match result {
            Ok(amount_out) => {
                let output_decimals = self.decimals(pending.direction.output_side());
                let rendered = self.engine.render(amount_out, output_decimals);
                debug!(%amount_out, %rendered, "quote resolved");
                self.controller.set_derived(rendered);
                self.last_quote = Some(Quote {
                    direction: pending.direction,
                    request: pending.request,
                    amount_out,
                });
            }
            Err(err) => {
                warn!(%err, "pricing failed, keeping previous quote");
            }
        }
    }

    fn build_intent(&self) -> Result<SwapIntent, PreconditionError> {
        if self.submitting {
            return Err(PreconditionError::SubmissionInFlight);
        }

        let side = self.controller.direction().input_side();
        let amount = to_base_units(self.controller.input(), self.decimals(side));
        if amount.is_zero() {
            return Err(PreconditionError::NothingToSwap);
        }

        if self.account.is_none() {
            return Err(PreconditionError::WalletNotConnected);
        }

        Ok(match side {
            Side::Native => SwapIntent::NativeForToken { value: amount },
            Side::Token => SwapIntent::TokenForNative { amount },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::U256;

    fn config() -> SwapConfig {
        SwapConfig::new(Address::repeat_byte(0x42), Address::repeat_byte(0x67))
    }

    fn alice() -> Address {
        Address::repeat_byte(0xAA)
    }

    fn edit(side: Side, value: &str) -> SwapEvent {
        SwapEvent::InputEdited {
            side,
            value: value.to_string(),
        }
    }

    fn reserves(native: u64, token: u64) -> SwapEvent {
        SwapEvent::ReservesLoaded {
            native: Some(U256::from(native)),
            token: Some(U256::from(token)),
        }
    }

    fn requested(effects: &[Effect]) -> Option<(u64, QuoteRequest)> {
        effects.iter().find_map(|e| match e {
            Effect::RequestQuote { seq, request } => Some((*seq, *request)),
            _ => None,
        })
    }

    /// A state with integer-only amounts and loaded reserves.
    fn loaded_state(native: u64, token: u64) -> SwapState {
        let mut cfg = config();
        cfg.native_decimals = 0;
        let mut state = SwapState::new(cfg);
        state.apply(SwapEvent::TokenMetadataLoaded(TokenMetadata {
            symbol: "67".into(),
            decimals: 0,
        }));
        state.apply(reserves(native, token));
        state
    }

    #[test]
    fn test_zero_input_sets_zero_without_pricing() {
        let mut state = loaded_state(1000, 2000);
        state.controller.set_derived("3.2".into());

        let effects = state.apply(edit(Side::Native, "0"));

        assert!(requested(&effects).is_none());
        assert_eq!(state.controller.derived(), "0");
    }

    #[test]
    fn test_unknown_reserves_keep_previous_derived() {
        let mut state = SwapState::new(config());
        state.controller.set_derived("3.2".into());

        let effects = state.apply(edit(Side::Native, "50"));

        assert!(requested(&effects).is_none());
        assert_eq!(state.controller.derived(), "3.2");
    }

    #[test]
    fn test_edit_requests_exact_triple() {
        let mut state = loaded_state(1_000_000, 500_000);

        let effects = state.apply(edit(Side::Native, "1000"));

        let (_, request) = requested(&effects).expect("quote requested");
        assert_eq!(request.amount_in, U256::from(1_000));
        assert_eq!(request.reserve_in, U256::from(1_000_000));
        assert_eq!(request.reserve_out, U256::from(500_000));
    }

    #[test]
    fn test_quote_result_rendered() {
        let mut state = SwapState::new(config());
        state.apply(reserves(1, 1));
        let effects = state.apply(edit(Side::Native, "1"));
        let (seq, _) = requested(&effects).unwrap();

        state.apply(SwapEvent::QuoteResolved {
            seq,
            result: Ok(U256::from(1_234_567_891_234_567_891u128)),
        });

        assert_eq!(state.controller.derived(), "1.23456789");
        assert!(state.view().last_quote.is_some());
    }

    #[test]
    fn test_zero_quote_sets_zero() {
        let mut state = loaded_state(10, 10);
        state.controller.set_derived("5".into());
        let (seq, _) = requested(&state.apply(edit(Side::Native, "1"))).unwrap();

        state.apply(SwapEvent::QuoteResolved {
            seq,
            result: Ok(U256::ZERO),
        });

        assert_eq!(state.controller.derived(), "0");
    }

    #[test]
    fn test_stale_quote_discarded() {
        let mut state = loaded_state(1000, 1000);
        let (old, _) = requested(&state.apply(edit(Side::Native, "1"))).unwrap();
        let (new, _) = requested(&state.apply(edit(Side::Native, "12"))).unwrap();
        assert!(new > old);

        state.apply(SwapEvent::QuoteResolved {
            seq: new,
            result: Ok(U256::from(11)),
        });
        state.apply(SwapEvent::QuoteResolved {
            seq: old,
            result: Ok(U256::from(1)),
        });

        assert_eq!(state.controller.derived(), "11");
    }

    #[test]
    fn test_late_quote_after_clear_discarded() {
        let mut state = loaded_state(1000, 1000);
        let (seq, _) = requested(&state.apply(edit(Side::Native, "5"))).unwrap();
        state.apply(edit(Side::Native, ""));

        state.apply(SwapEvent::QuoteResolved {
            seq,
            result: Ok(U256::from(4)),
        });

        assert_eq!(state.controller.derived(), "0");
    }

    #[test]
    fn test_pricing_error_keeps_previous_value() {
        let mut state = loaded_state(1000, 1000);
        let (seq, _) = requested(&state.apply(edit(Side::Native, "5"))).unwrap();
        state.apply(SwapEvent::QuoteResolved {
            seq,
            result: Ok(U256::from(4)),
        });

        let (seq, _) = requested(&state.apply(edit(Side::Native, "6"))).unwrap();
        state.apply(SwapEvent::QuoteResolved {
            seq,
            result: Err(PricingError::Network("timeout".into())),
        });

        assert_eq!(state.controller.derived(), "4");
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut state = loaded_state(1000, 1000);
        let mut seen = Vec::new();
        for _ in 0..3 {
            let (seq, request) = requested(&state.apply(edit(Side::Native, "7"))).unwrap();
            assert_eq!(request.amount_in, U256::from(7));
            state.apply(SwapEvent::QuoteResolved {
                seq,
                result: Ok(U256::from(6)),
            });
            seen.push(state.controller.derived().to_string());
        }
        assert!(seen.iter().all(|v| v == "6"));
    }

    #[test]
    fn test_edit_of_derived_side_ignored() {
        let mut state = loaded_state(1000, 1000);
        let effects = state.apply(edit(Side::Token, "99"));

        assert!(effects.is_empty());
        assert_eq!(state.controller.value(Side::Token), "0");
    }

    #[test]
    fn test_edit_is_sanitized() {
        let mut state = SwapState::new(config());
        state.apply(edit(Side::Native, "1.123456789x"));
        assert_eq!(state.controller.input(), "1.12345678");
    }

    #[test]
    fn test_toggle_requotes_reverse_direction() {
        let mut state = loaded_state(1000, 4000);
        let (seq, _) = requested(&state.apply(edit(Side::Native, "10"))).unwrap();
        state.apply(SwapEvent::QuoteResolved {
            seq,
            result: Ok(U256::from(39)),
        });

        let effects = state.apply(SwapEvent::Toggled);

        let (_, request) = requested(&effects).unwrap();
        assert_eq!(state.controller.direction(), Direction::TokenToNative);
        assert_eq!(request.amount_in, U256::from(39));
        assert_eq!(request.reserve_in, U256::from(4000));
        assert_eq!(request.reserve_out, U256::from(1000));
    }

    #[test]
    fn test_double_toggle_without_reserves_keeps_typed_amount() {
        let mut state = SwapState::new(config());
        state.apply(edit(Side::Native, "5"));

        state.apply(SwapEvent::Toggled);
        assert_eq!(state.controller.value(Side::Native), "5");
        assert_eq!(state.controller.input(), "0");

        state.apply(SwapEvent::Toggled);
        assert_eq!(state.controller.direction(), Direction::NativeToToken);
        assert_eq!(state.controller.value(Side::Native), "5");
        assert_eq!(state.controller.value(Side::Token), "0");
    }

    #[test]
    fn test_toggle_after_zero_quote_keeps_typed_amount() {
        let mut state = loaded_state(10, 10);
        let (seq, _) = requested(&state.apply(edit(Side::Native, "1"))).unwrap();
        state.apply(SwapEvent::QuoteResolved {
            seq,
            result: Ok(U256::ZERO),
        });

        let effects = state.apply(SwapEvent::Toggled);
        assert!(requested(&effects).is_none());
        assert_eq!(state.controller.derived(), "1");

        let (_, request) = requested(&state.apply(SwapEvent::Toggled)).unwrap();
        assert_eq!(request.amount_in, U256::from(1));
        assert_eq!(state.controller.input(), "1");
    }

    #[test]
    fn test_reserve_refresh_without_change_does_not_requote() {
        let mut state = loaded_state(1000, 1000);
        state.apply(edit(Side::Native, "3"));

        assert!(state.apply(reserves(1000, 1000)).is_empty());
        assert!(requested(&state.apply(reserves(1000, 1001))).is_some());
    }

    #[test]
    fn test_failed_reserve_read_keeps_known_value() {
        let mut state = loaded_state(1000, 2000);
        state.apply(SwapEvent::ReservesLoaded {
            native: None,
            token: Some(U256::from(2500)),
        });

        assert_eq!(state.reserves().known(), Some((U256::from(1000), U256::from(2500))));
    }

    #[test]
    fn test_token_decimals_default_until_loaded() {
        let mut state = SwapState::new(config().with_default_token_decimals(18));
        assert_eq!(state.decimals(Side::Token), 18);

        state.apply(SwapEvent::TokenMetadataLoaded(TokenMetadata {
            symbol: "USDC".into(),
            decimals: 6,
        }));

        assert_eq!(state.decimals(Side::Token), 6);
        assert_eq!(state.view().token_symbol, "USDC");
    }

    #[test]
    fn test_out_of_range_decimals_ignored() {
        let mut state = SwapState::new(config());
        state.apply(SwapEvent::TokenMetadataLoaded(TokenMetadata {
            symbol: "BIG".into(),
            decimals: 80,
        }));

        assert!(!state.has_token_metadata());
        assert_eq!(state.decimals(Side::Token), 18);
    }

    #[test]
    fn test_max_uses_exact_balance_truncated() {
        let mut state = SwapState::new(config());
        state.apply(SwapEvent::Connected(alice()));
        state.apply(SwapEvent::BalancesLoaded {
            account: alice(),
            native: Some(Balance {
                raw: U256::from(1_234_567_891_234_567_891u128),
                display: "1.234567891234567891".into(),
            }),
            token: None,
        });

        state.apply(SwapEvent::MaxRequested);

        assert_eq!(state.controller.input(), "1.23456789");
        assert_eq!(state.view().native_balance.as_deref(), Some("1.2345"));
    }

    #[test]
    fn test_max_without_balance_is_zero() {
        let mut state = SwapState::new(config());
        state.apply(SwapEvent::MaxRequested);
        assert_eq!(state.controller.input(), "0");
    }

    #[test]
    fn test_balances_of_other_account_dropped() {
        let mut state = SwapState::new(config());
        state.apply(SwapEvent::Connected(alice()));
        state.apply(SwapEvent::BalancesLoaded {
            account: Address::repeat_byte(0xBB),
            native: Some(Balance::default()),
            token: None,
        });
        assert!(state.view().native_balance.is_none());
    }

    #[test]
    fn test_submit_preconditions() {
        let mut state = SwapState::new(config());

        let effects = state.apply(SwapEvent::SubmitRequested);
        assert_eq!(
            effects,
            vec![Effect::Notify {
                message: PreconditionError::NothingToSwap.to_string(),
                severity: Severity::Info,
            }]
        );

        state.apply(edit(Side::Native, "1"));
        let effects = state.apply(SwapEvent::SubmitRequested);
        assert_eq!(
            effects,
            vec![Effect::Notify {
                message: PreconditionError::WalletNotConnected.to_string(),
                severity: Severity::Info,
            }]
        );
    }

    #[test]
    fn test_submit_builds_intent_and_blocks_resubmission() {
        let mut state = SwapState::new(config());
        state.apply(SwapEvent::Connected(alice()));
        state.apply(edit(Side::Native, "0.5"));

        let effects = state.apply(SwapEvent::SubmitRequested);
        assert_eq!(
            effects,
            vec![Effect::Submit(SwapIntent::NativeForToken {
                value: U256::from(500_000_000_000_000_000u128)
            })]
        );
        assert!(state.view().is_submitting);
        assert!(!state.view().can_submit);

        let effects = state.apply(SwapEvent::SubmitRequested);
        assert!(matches!(
            effects.as_slice(),
            [Effect::Notify { severity: Severity::Info, .. }]
        ));
    }

    #[test]
    fn test_failed_submission_keeps_values() {
        let mut state = SwapState::new(config());
        state.apply(SwapEvent::Connected(alice()));
        state.apply(edit(Side::Native, "2"));
        state.apply(SwapEvent::SubmitRequested);

        let effects = state.apply(SwapEvent::SubmissionFinished(Err(
            TransactionError::UserRejected,
        )));

        assert_eq!(state.controller.input(), "2");
        assert!(!state.view().is_submitting);
        assert!(effects.contains(&Effect::Notify {
            message: "transaction rejected by user".into(),
            severity: Severity::Error,
        }));
    }

    #[test]
    fn test_successful_submission_resets_fields() {
        let mut state = SwapState::new(config());
        state.apply(SwapEvent::Connected(alice()));
        state.apply(edit(Side::Native, "2"));
        state.controller.set_derived("3".into());
        state.apply(SwapEvent::SubmitRequested);

        let effects = state.apply(SwapEvent::SubmissionFinished(Ok(TransactionReceipt {
            hash: Default::default(),
            block_number: Some(1),
        })));

        assert_eq!(state.controller.input(), "0");
        assert_eq!(state.controller.derived(), "0");
        assert!(effects.contains(&Effect::Refresh));
    }

    #[test]
    fn test_token_intent_is_approve_then_swap() {
        let pool = Address::repeat_byte(0x42);
        let token = Address::repeat_byte(0x67);
        let amount = U256::from(5);

        let calls = SwapIntent::TokenForNative { amount }.calls(pool, token);

        assert_eq!(
            calls,
            vec![
                ContractCall::ApproveToken {
                    token,
                    spender: pool,
                    amount
                },
                ContractCall::SwapTokenForNative { pool, amount },
            ]
        );
    }

    #[test]
    fn test_connect_and_disconnect_drive_polling() {
        let mut state = SwapState::new(config());
        assert_eq!(state.apply(SwapEvent::Connected(alice())), vec![Effect::StartPolling]);
        assert!(state.apply(SwapEvent::Connected(alice())).is_empty());
        assert_eq!(state.apply(SwapEvent::Disconnected), vec![Effect::StopPolling]);
        assert_eq!(state.account(), None);
    }
}
