//! The swap session event loop.
//!
//! A [`SwapSession`] owns the [`SwapState`] and is its only writer. User
//! actions arrive through a [`SessionHandle`]; collaborator calls run in
//! spawned tasks and report back as events on an internal channel, so the
//! state is only ever touched from the loop. After every event the loop
//! publishes a fresh [`SwapView`] for readers.

use crate::chain::{Collaborators, ContractCall, TransactionReceipt, TransactionSubmitter};
use crate::config::{SwapConfig, MIN_REFRESH_INTERVAL};
use crate::error::{ChainError, SessionClosed, TransactionError};
use crate::quote::QuoteRequest;
use crate::state::{Effect, SwapEvent, SwapIntent, SwapState, SwapView};
use crate::types::{Address, Side};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// An action taken by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapAction {
    Connect(Address),
    Disconnect,
    Edit { side: Side, value: String },
    Max,
    Toggle,
    Submit,
}

impl From<SwapAction> for SwapEvent {
    fn from(action: SwapAction) -> Self {
        match action {
            SwapAction::Connect(account) => SwapEvent::Connected(account),
            SwapAction::Disconnect => SwapEvent::Disconnected,
            SwapAction::Edit { side, value } => SwapEvent::InputEdited { side, value },
            SwapAction::Max => SwapEvent::MaxRequested,
            SwapAction::Toggle => SwapEvent::Toggled,
            SwapAction::Submit => SwapEvent::SubmitRequested,
        }
    }
}

/// Cloneable handle for driving a running session and reading its view.
///
/// The session shuts down once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    actions: mpsc::UnboundedSender<SwapAction>,
    view: Arc<RwLock<SwapView>>,
}

impl SessionHandle {
    /// Send an action to the session.
    pub fn send(&self, action: SwapAction) -> Result<(), SessionClosed> {
        self.actions.send(action).map_err(|_| SessionClosed)
    }

    /// A wallet connected.
    pub fn connect(&self, account: Address) -> Result<(), SessionClosed> {
        self.send(SwapAction::Connect(account))
    }

    /// The wallet disconnected.
    pub fn disconnect(&self) -> Result<(), SessionClosed> {
        self.send(SwapAction::Disconnect)
    }

    /// The user edited the field for `side`.
    pub fn edit(&self, side: Side, value: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(SwapAction::Edit {
            side,
            value: value.into(),
        })
    }

    /// The user pressed MAX.
    pub fn max(&self) -> Result<(), SessionClosed> {
        self.send(SwapAction::Max)
    }

    /// The user flipped the direction.
    pub fn toggle(&self) -> Result<(), SessionClosed> {
        self.send(SwapAction::Toggle)
    }

    /// The user pressed swap.
    pub fn submit(&self) -> Result<(), SessionClosed> {
        self.send(SwapAction::Submit)
    }

    /// The latest published view.
    pub fn view(&self) -> SwapView {
        self.view.read().clone()
    }
}

/// The single-threaded swap event loop.
pub struct SwapSession {
    state: SwapState,
    collaborators: Collaborators,
    actions: mpsc::UnboundedReceiver<SwapAction>,
    completions_tx: mpsc::UnboundedSender<SwapEvent>,
    completions: mpsc::UnboundedReceiver<SwapEvent>,
    view: Arc<RwLock<SwapView>>,
    polling: bool,
    refresh_task: Option<JoinHandle<()>>,
    quote_task: Option<JoinHandle<()>>,
    submit_task: Option<JoinHandle<()>>,
}

enum Wake {
    Action(Option<SwapAction>),
    Completion(SwapEvent),
    Tick,
}

impl SwapSession {
    /// Create a session and a handle to drive it. Nothing happens until
    /// [`SwapSession::run`] is awaited.
    pub fn new(config: SwapConfig, collaborators: Collaborators) -> (Self, SessionHandle) {
        let state = SwapState::new(config);
        let view = Arc::new(RwLock::new(state.view()));
        let (actions_tx, actions) = mpsc::unbounded_channel();
        let (completions_tx, completions) = mpsc::unbounded_channel();

        let session = Self {
            state,
            collaborators,
            actions,
            completions_tx,
            completions,
            view: Arc::clone(&view),
            polling: false,
            refresh_task: None,
            quote_task: None,
            submit_task: None,
        };
        let handle = SessionHandle {
            actions: actions_tx,
            view,
        };

        (session, handle)
    }

    /// Run until every [`SessionHandle`] is dropped. A swap still in flight
    /// at that point is waited for.
    pub async fn run(mut self) {
        let config = self.state.config();
        info!(pool = %config.pool, token = %config.token, "starting swap session");

        let mut ticker =
            tokio::time::interval(config.refresh_interval.max(MIN_REFRESH_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Reserves and metadata are wanted before any wallet connects
        self.refresh();

        loop {
            let wake = tokio::select! {
                action = self.actions.recv() => Wake::Action(action),
                Some(event) = self.completions.recv() => Wake::Completion(event),
                _ = ticker.tick(), if self.polling => Wake::Tick,
            };

            let event = match wake {
                Wake::Action(Some(action)) => SwapEvent::from(action),
                Wake::Action(None) => break,
                Wake::Completion(event) => event,
                Wake::Tick => {
                    self.refresh();
                    continue;
                }
            };

            for effect in self.state.apply(event) {
                self.execute(effect, &mut ticker);
            }
            *self.view.write() = self.state.view();
        }

        info!("swap session shutting down");
        for task in [self.refresh_task.take(), self.quote_task.take()]
            .into_iter()
            .flatten()
        {
            task.abort();
        }
        self.finish_submission().await;
    }

    /// Let a submission in flight run to the end and report its outcome, so an
    /// approval is never left without its swap.
    async fn finish_submission(&mut self) {
        let Some(task) = self.submit_task.take() else {
            return;
        };
        if !task.is_finished() {
            info!("waiting for the swap in flight");
        }
        if let Err(err) = task.await {
            warn!(%err, "swap task ended abnormally");
        }

        while let Ok(event) = self.completions.try_recv() {
            if !matches!(event, SwapEvent::SubmissionFinished(_)) {
                continue;
            }
            for effect in self.state.apply(event) {
                if let Effect::Notify { message, severity } = effect {
                    self.collaborators.notifier.notify(&message, severity);
                }
            }
            *self.view.write() = self.state.view();
        }
    }

    fn execute(&mut self, effect: Effect, ticker: &mut Interval) {
        match effect {
            Effect::RequestQuote { seq, request } => self.request_quote(seq, request),
            Effect::Notify { message, severity } => {
                self.collaborators.notifier.notify(&message, severity);
            }
            Effect::Submit(intent) => self.submit(intent),
            Effect::Refresh => self.refresh(),
            Effect::StartPolling => {
                self.polling = true;
                // A fetch already running was started without the account
                if let Some(task) = self.refresh_task.take() {
                    task.abort();
                }
                self.refresh();
                ticker.reset();
            }
            Effect::StopPolling => {
                self.polling = false;
                if let Some(task) = self.refresh_task.take() {
                    task.abort();
                }
            }
        }
    }

    fn request_quote(&mut self, seq: u64, request: QuoteRequest) {
        // A newer request supersedes the one in flight
        if let Some(task) = self.quote_task.take() {
            task.abort();
        }

        let engine = self.state.engine();
        let pricer = Arc::clone(&self.collaborators.pricer);
        let tx = self.completions_tx.clone();

        self.quote_task = Some(tokio::spawn(async move {
            let result = engine.quote(pricer.as_ref(), request).await;
            let _ = tx.send(SwapEvent::QuoteResolved { seq, result });
        }));
    }

    fn submit(&mut self, intent: SwapIntent) {
        let config = self.state.config();
        let calls = intent.calls(config.pool, config.token);
        let submitter = Arc::clone(&self.collaborators.submitter);
        let tx = self.completions_tx.clone();

        self.submit_task = Some(tokio::spawn(async move {
            let result = send_in_order(submitter.as_ref(), calls).await;
            let _ = tx.send(SwapEvent::SubmissionFinished(result));
        }));
    }

    /// Fetch reserves, balances and (if still missing) token metadata.
    /// Skipped while the previous fetch is still running.
    fn refresh(&mut self) {
        if self
            .refresh_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
        {
            debug!("refresh still in flight, skipping");
            return;
        }

        let reader = Arc::clone(&self.collaborators.reader);
        let tx = self.completions_tx.clone();
        let pool = self.state.config().pool;
        let token = self.state.config().token;
        let account = self.state.account();
        let load_metadata = !self.state.has_token_metadata();

        self.refresh_task = Some(tokio::spawn(async move {
            if load_metadata {
                if let Some(metadata) =
                    log_failure(reader.read_token_metadata(token).await, "token metadata")
                {
                    let _ = tx.send(SwapEvent::TokenMetadataLoaded(metadata));
                }
            }

            let (native, token_reserve) = tokio::join!(
                reader.read_reserve(pool, None),
                reader.read_reserve(pool, Some(token)),
            );
            let _ = tx.send(SwapEvent::ReservesLoaded {
                native: log_failure(native, "native reserve"),
                token: log_failure(token_reserve, "token reserve"),
            });

            if let Some(account) = account {
                let (native, token_balance) = tokio::join!(
                    reader.read_balance(account, None),
                    reader.read_balance(account, Some(token)),
                );
                let _ = tx.send(SwapEvent::BalancesLoaded {
                    account,
                    native: log_failure(native, "native balance"),
                    token: log_failure(token_balance, "token balance"),
                });
            }
        }));
    }
}

impl std::fmt::Debug for SwapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapSession")
            .field("state", &self.state)
            .field("polling", &self.polling)
            .finish_non_exhaustive()
    }
}

/// Send calls one after another, waiting for each to confirm before the next.
async fn send_in_order(
    submitter: &dyn TransactionSubmitter,
    calls: Vec<ContractCall>,
) -> Result<TransactionReceipt, TransactionError> {
    let mut receipt = None;
    for call in calls {
        let hash = submitter.submit(call.clone()).await?;
        info!(%hash, ?call, "transaction sent, waiting for confirmation");
        receipt = Some(submitter.wait_for_confirmation(hash).await?);
    }
    receipt.ok_or_else(|| TransactionError::Network("no transaction was sent".to_string()))
}

/// A failed read means "unknown", never zero.
fn log_failure<T>(result: Result<T, ChainError>, what: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(%err, what, "chain read failed");
            None
        }
    }
}
