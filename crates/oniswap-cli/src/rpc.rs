//! JSON-RPC implementations of the swap collaborators.

use crate::config::Settings;
use crate::contracts::{IOniswap, IERC20};
use alloy::network::{EthereumWallet, ReceiptResponse};
use alloy::primitives::{Address, TxHash};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::RpcError;
use async_trait::async_trait;
use eyre::WrapErr;
use oniswap::{
    from_base_units, Amount, Balance, ChainError, ChainReader, ContractCall, PricingError,
    QuotePricer, TokenId, TokenMetadata, TransactionError, TransactionReceipt,
    TransactionSubmitter, NATIVE_DECIMALS,
};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// EIP-1193 code for a request the user declined.
const USER_REJECTED_CODE: i64 = 4001;

/// Chain access over an alloy provider, optionally signing as one account.
pub struct RpcChain {
    provider: DynProvider,
    pool: Address,
    account: Option<Address>,
    confirmation_timeout: Duration,
    token_decimals: OnceCell<u8>,
}

impl RpcChain {
    /// Connect to the endpoint in `settings`, with a wallet if a private key
    /// was given.
    pub async fn connect(settings: &Settings) -> eyre::Result<Self> {
        let signer = settings
            .private_key
            .as_deref()
            .map(str::parse::<PrivateKeySigner>)
            .transpose()
            .wrap_err("invalid private key")?;
        let account = signer.as_ref().map(|signer| signer.address());

        let provider = match signer {
            Some(signer) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect(&settings.rpc_url)
                .await
                .wrap_err_with(|| format!("failed to connect to {}", settings.rpc_url))?
                .erased(),
            None => ProviderBuilder::new()
                .connect(&settings.rpc_url)
                .await
                .wrap_err_with(|| format!("failed to connect to {}", settings.rpc_url))?
                .erased(),
        };

        let chain_id = provider
            .get_chain_id()
            .await
            .wrap_err("failed to read chain id")?;
        info!(rpc_url = %settings.rpc_url, chain_id, ?account, "connected");

        Ok(Self {
            provider,
            pool: settings.swap.pool,
            account,
            confirmation_timeout: settings.confirmation_timeout,
            token_decimals: OnceCell::new(),
        })
    }

    /// The signing account, if a private key was configured.
    pub fn account(&self) -> Option<Address> {
        self.account
    }

    async fn token_decimals(&self, token: TokenId) -> Result<u8, ChainError> {
        self.token_decimals
            .get_or_try_init(|| async {
                IERC20::new(token, self.provider.clone())
                    .decimals()
                    .call()
                    .await
                    .map_err(read_error)
            })
            .await
            .copied()
    }

    async fn erc20_balance(&self, token: TokenId, owner: Address) -> Result<Amount, ChainError> {
        IERC20::new(token, self.provider.clone())
            .balanceOf(owner)
            .call()
            .await
            .map_err(read_error)
    }
}

impl std::fmt::Debug for RpcChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChain")
            .field("pool", &self.pool)
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ChainReader for RpcChain {
    async fn read_balance(
        &self,
        owner: Address,
        token: Option<TokenId>,
    ) -> Result<Balance, ChainError> {
        let (raw, decimals) = match token {
            None => {
                let raw = self
                    .provider
                    .get_balance(owner)
                    .await
                    .map_err(|e| ChainError::Network(e.to_string()))?;
                (raw, NATIVE_DECIMALS)
            }
            Some(token) => {
                let raw = self.erc20_balance(token, owner).await?;
                (raw, self.token_decimals(token).await?)
            }
        };

        Ok(Balance {
            raw,
            display: from_base_units(raw, decimals),
        })
    }

    async fn read_reserve(
        &self,
        pool: Address,
        token: Option<TokenId>,
    ) -> Result<Amount, ChainError> {
        match token {
            None => self
                .provider
                .get_balance(pool)
                .await
                .map_err(|e| ChainError::Network(e.to_string())),
            Some(token) => self.erc20_balance(token, pool).await,
        }
    }

    async fn read_token_metadata(&self, token: TokenId) -> Result<TokenMetadata, ChainError> {
        let erc20 = IERC20::new(token, self.provider.clone());
        let symbol = erc20.symbol().call().await.map_err(read_error)?;
        let decimals = self.token_decimals(token).await?;
        Ok(TokenMetadata { symbol, decimals })
    }
}

#[async_trait]
impl QuotePricer for RpcChain {
    async fn price_swap(
        &self,
        amount_in: Amount,
        reserve_in: Amount,
        reserve_out: Amount,
    ) -> Result<Amount, PricingError> {
        // The pool contract reverts on empty reserves
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(PricingError::InvalidReserves {
                input: reserve_in,
                output: reserve_out,
            });
        }

        IOniswap::new(self.pool, self.provider.clone())
            .getAmountOfTokens(amount_in, reserve_in, reserve_out)
            .call()
            .await
            .map_err(|e| PricingError::Network(e.to_string()))
    }
}

#[async_trait]
impl TransactionSubmitter for RpcChain {
    async fn submit(&self, call: ContractCall) -> Result<TxHash, TransactionError> {
        debug!(?call, "sending transaction");
        let pending = match call {
            ContractCall::SwapNativeForToken { pool, value } => {
                IOniswap::new(pool, self.provider.clone())
                    .swapEthTotoken()
                    .value(value)
                    .send()
                    .await
            }
            ContractCall::ApproveToken {
                token,
                spender,
                amount,
            } => {
                IERC20::new(token, self.provider.clone())
                    .approve(spender, amount)
                    .send()
                    .await
            }
            ContractCall::SwapTokenForNative { pool, amount } => {
                IOniswap::new(pool, self.provider.clone())
                    .swapTokenToEth(amount)
                    .send()
                    .await
            }
        }
        .map_err(send_error)?;

        Ok(*pending.tx_hash())
    }

    async fn wait_for_confirmation(
        &self,
        hash: TxHash,
    ) -> Result<TransactionReceipt, TransactionError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), hash)
            .with_timeout(Some(self.confirmation_timeout))
            .get_receipt()
            .await
            .map_err(|e| TransactionError::Network(e.to_string()))?;

        if !receipt.status() {
            return Err(TransactionError::ContractRevert(format!(
                "transaction {hash} failed"
            )));
        }

        info!(%hash, block = ?receipt.block_number, "transaction confirmed");
        Ok(TransactionReceipt {
            hash,
            block_number: receipt.block_number,
        })
    }
}

fn read_error(err: alloy::contract::Error) -> ChainError {
    match err {
        alloy::contract::Error::TransportError(err) => ChainError::Network(err.to_string()),
        other => ChainError::InvalidResponse(other.to_string()),
    }
}

fn send_error(err: alloy::contract::Error) -> TransactionError {
    match &err {
        alloy::contract::Error::TransportError(RpcError::ErrorResp(payload)) => {
            classify_rpc_error(payload.code, &payload.message)
        }
        _ => TransactionError::Network(err.to_string()),
    }
}

/// Map a JSON-RPC error response from a send to a transaction error.
fn classify_rpc_error(code: i64, message: &str) -> TransactionError {
    if code == USER_REJECTED_CODE {
        TransactionError::UserRejected
    } else if message.to_ascii_lowercase().contains("revert") {
        TransactionError::ContractRevert(message.to_string())
    } else {
        TransactionError::Network(message.to_string())
    }
}
