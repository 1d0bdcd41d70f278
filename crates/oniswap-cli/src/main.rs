//! Terminal front end for an ETH/token constant-product pool.
//!
//! Drives a swap session against a JSON-RPC node: one-shot quotes and swaps,
//! or an interactive prompt mirroring the swap form.
//!
//! Run with: `cargo run -p oniswap-cli -- --pool <addr> --token <addr> quote 1.5`

mod config;
mod contracts;
mod notify;
mod rpc;

use crate::config::{NetworkArgs, Settings};
use crate::notify::{Notification, TerminalNotifier};
use crate::rpc::RpcChain;
use clap::{Parser, Subcommand};
use eyre::{bail, eyre, Result, WrapErr};
use oniswap::units::is_positive_decimal;
use oniswap::{
    Collaborators, ConstantProductPricer, Direction, QuotePricer, SessionHandle, Severity, Side,
    SwapSession, SwapView,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// How often one-shot commands look at the session view.
const VIEW_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long one-shot commands wait for reserves and quotes.
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Symbol shown for the native coin.
const NATIVE_SYMBOL: &str = "ETH";

#[derive(Parser)]
#[command(name = "oniswap")]
#[command(about = "Quote and swap against an ETH/token pool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    network: NetworkArgs,

    /// Price quotes locally instead of calling the pool contract
    #[arg(long, global = true)]
    local_pricer: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what an amount would swap for
    Quote {
        /// Side being sold (native or token)
        #[arg(long, default_value = "native")]
        from: Side,

        /// Amount to sell
        amount: String,
    },

    /// Swap an amount and wait for it to be mined
    Swap {
        /// Side being sold (native or token)
        #[arg(long, default_value = "native")]
        from: Side,

        /// Amount to sell
        amount: String,
    },

    /// Line-driven swap prompt
    Interactive,
}

/// A session running in the background.
struct Running {
    handle: SessionHandle,
    notes: mpsc::UnboundedReceiver<Notification>,
    task: JoinHandle<()>,
}

impl Running {
    /// Close the session, wait for it to wind down and print what it raised
    /// on the way out.
    async fn stop(mut self) -> Result<()> {
        drop(self.handle);
        self.task.await.wrap_err("swap session panicked")?;
        while let Ok(note) = self.notes.try_recv() {
            print_note(&note);
        }
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_args(&cli.network)?;
    let chain = Arc::new(RpcChain::connect(&settings).await?);

    let pricer: Arc<dyn QuotePricer> = if cli.local_pricer {
        Arc::new(ConstantProductPricer::from_config(&settings.swap))
    } else {
        chain.clone()
    };
    let (notifier, notes) = TerminalNotifier::new(settings.swap.notification_duration);
    let collaborators = Collaborators {
        reader: chain.clone(),
        pricer,
        submitter: chain.clone(),
        notifier: Arc::new(notifier),
    };

    let (session, handle) = SwapSession::new(settings.swap.clone(), collaborators);
    let mut running = Running {
        handle,
        notes,
        task: tokio::spawn(session.run()),
    };

    match cli.command {
        Commands::Quote { from, amount } => {
            let view = prepare(&running.handle, from, &amount).await?;
            print_quote(&view);
        }
        Commands::Swap { from, amount } => {
            let account = chain
                .account()
                .ok_or_else(|| eyre!("swapping needs --private-key or ONISWAP_PRIVATE_KEY"))?;
            running.handle.connect(account)?;

            let view = prepare(&running.handle, from, &amount).await?;
            print_quote(&view);
            running.handle.submit()?;
            await_outcome(&mut running.notes).await?;
        }
        Commands::Interactive => {
            if let Some(account) = chain.account() {
                running.handle.connect(account)?;
            }
            interactive(&mut running).await?;
        }
    }

    running.stop().await
}

/// Point the session at `from`, enter `amount` and wait for its quote.
async fn prepare(handle: &SessionHandle, from: Side, amount: &str) -> Result<SwapView> {
    wait_for(handle, "pool reserves", |view| {
        view.native_reserve.is_some() && view.token_reserve.is_some()
    })
    .await?;

    let direction = Direction::from_input_side(from);
    if handle.view().direction != direction {
        handle.toggle()?;
    }
    handle.edit(from, amount)?;

    if !is_positive_decimal(amount) {
        return wait_for(handle, "the amount", |view| view.direction == direction).await;
    }
    wait_for(handle, "a quote", |view| {
        view.direction == direction && view.last_quote.is_some()
    })
    .await
}

async fn wait_for(
    handle: &SessionHandle,
    what: &str,
    done: impl Fn(&SwapView) -> bool,
) -> Result<SwapView> {
    tokio::time::timeout(LOAD_TIMEOUT, async {
        loop {
            let view = handle.view();
            if done(&view) {
                return view;
            }
            tokio::time::sleep(VIEW_POLL_INTERVAL).await;
        }
    })
    .await
    .map_err(|_| eyre!("timed out waiting for {what}"))
}

/// Wait for the session to report how a submitted swap ended.
async fn await_outcome(notes: &mut mpsc::UnboundedReceiver<Notification>) -> Result<()> {
    let note = notes
        .recv()
        .await
        .ok_or_else(|| eyre!("swap session stopped before the swap finished"))?;
    match note.severity {
        Severity::Success => {
            println!("{}", note.message);
            Ok(())
        }
        Severity::Error | Severity::Info => bail!("{}", note.message),
    }
}

/// A command typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Amount(String),
    Toggle,
    Max,
    Swap,
    Show,
    Help,
    Quit,
}

fn parse_line(line: &str) -> Option<Line> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "toggle" | "t" => Some(Line::Toggle),
        "max" => Some(Line::Max),
        "swap" => Some(Line::Swap),
        "" | "show" => Some(Line::Show),
        "help" | "?" => Some(Line::Help),
        "quit" | "exit" | "q" => Some(Line::Quit),
        _ if line.starts_with(|c: char| c.is_ascii_digit() || c == '.') => {
            Some(Line::Amount(line.to_string()))
        }
        _ => None,
    }
}

const HELP: &str = "\
  <amount>  set the amount to sell
  toggle    flip the swap direction
  max       sell the whole balance
  swap      submit the swap
  show      print the form
  quit      leave";

async fn interactive(running: &mut Running) -> Result<()> {
    println!("{HELP}");
    let handle = &running.handle;
    let notes = &mut running.notes;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut current: Option<Notification> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.wrap_err("failed to read stdin")? else {
                    break;
                };
                match parse_line(&line) {
                    Some(Line::Amount(amount)) => {
                        let side = handle.view().direction.input_side();
                        handle.edit(side, amount)?;
                        show_after_update(handle).await;
                    }
                    Some(Line::Toggle) => {
                        handle.toggle()?;
                        show_after_update(handle).await;
                    }
                    Some(Line::Max) => {
                        handle.max()?;
                        show_after_update(handle).await;
                    }
                    Some(Line::Swap) => handle.submit()?,
                    Some(Line::Show) => {
                        print_view(&handle.view());
                        if let Some(note) = current.as_ref().filter(|note| !note.is_expired()) {
                            print_note(note);
                        }
                    }
                    Some(Line::Help) => println!("{HELP}"),
                    Some(Line::Quit) => break,
                    None => println!("unknown command, type `help`"),
                }
            }
            Some(note) = notes.recv() => {
                // Queued behind a slow prompt for longer than it is worth showing
                if note.is_expired() {
                    continue;
                }
                print_note(&note);
                current = Some(note);
            }
        }
    }

    if handle.view().is_submitting {
        println!("waiting for the swap in progress to finish...");
    }
    Ok(())
}

fn print_note(note: &Notification) {
    println!("[{:?}] {}", note.severity, note.message);
}

/// Give the session a moment to quote before printing.
async fn show_after_update(handle: &SessionHandle) {
    tokio::time::sleep(VIEW_POLL_INTERVAL * 3).await;
    print_view(&handle.view());
}

fn symbol(view: &SwapView, side: Side) -> &str {
    match side {
        Side::Native => NATIVE_SYMBOL,
        Side::Token => &view.token_symbol,
    }
}

fn print_quote(view: &SwapView) {
    let input = view.direction.input_side();
    let output = view.direction.output_side();
    println!(
        "{} {} -> {} {}",
        view.input_value(),
        symbol(view, input),
        view.derived_value(),
        symbol(view, output)
    );
}

fn print_view(view: &SwapView) {
    let input = view.direction.input_side();
    let output = view.direction.output_side();
    let balance = |side: Side| {
        let balance = match side {
            Side::Native => view.native_balance.as_deref(),
            Side::Token => view.token_balance.as_deref(),
        };
        balance.map(|b| format!(" (balance {b})")).unwrap_or_default()
    };

    println!(
        "  sell:    {} {}{}",
        view.input_value(),
        symbol(view, input),
        balance(input)
    );
    println!(
        "  receive: {} {}{}",
        view.derived_value(),
        symbol(view, output),
        balance(output)
    );
    match (view.account, view.is_submitting) {
        (None, _) => println!("  wallet not connected"),
        (Some(_), true) => println!("  swap in progress..."),
        (Some(account), false) if view.can_submit => println!("  ready to swap as {account}"),
        (Some(account), false) => println!("  connected as {account}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("1.5"), Some(Line::Amount("1.5".into())));
        assert_eq!(parse_line(" .25 "), Some(Line::Amount(".25".into())));
        assert_eq!(parse_line("TOGGLE"), Some(Line::Toggle));
        assert_eq!(parse_line(""), Some(Line::Show));
        assert_eq!(parse_line("exit"), Some(Line::Quit));
        assert_eq!(parse_line("sell everything"), None);
    }

    #[test]
    fn test_cli_parses_commands() {
        let cli = Cli::try_parse_from([
            "oniswap",
            "--pool",
            "0x4242424242424242424242424242424242424242",
            "quote",
            "--from",
            "token",
            "12.5",
        ])
        .unwrap();

        assert!(cli.network.pool.is_some());
        assert!(!cli.local_pricer);
        match cli.command {
            Commands::Quote { from, amount } => {
                assert_eq!(from, Side::Token);
                assert_eq!(amount, "12.5");
            }
            _ => panic!("expected quote"),
        }
    }
}
