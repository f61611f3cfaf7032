//! Contract binding on top of Alloy providers
//!
//! One provider type serves HTTP, WebSocket and IPC endpoints; the
//! transport only matters for live log delivery (subscriptions vs polling).

use std::path::PathBuf;

use alloy::network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use alloy::rpc::types::{Filter, Log, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use anyhow::{anyhow, bail, Context, Result};
use futures::{Stream, StreamExt};

use super::logs::{entry_from_rpc, BufferedLogs, ForwardedLogs, Registration};
use crate::domain::abi::{EventSpec, MethodSpec};
use crate::domain::contract::{
    BlockRange, ContractBinding, FilterSpec, GasOracle, LogEntry, LogStream,
    TransactionOptions,
};
use crate::infrastructure::abi::codec::topic_for;

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path. Unix only.
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Pick the transport from an endpoint string
    ///
    /// `ws://`/`wss://` select WebSocket, `http://`/`https://` select HTTP,
    /// absolute paths and `*.ipc` select IPC, and a bare `host:port` is
    /// treated as HTTP.
    pub fn from_endpoint(endpoint: &str) -> Result<Self> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            bail!("empty endpoint");
        }
        let lower = endpoint.to_lowercase();
        if lower.starts_with("ws://") || lower.starts_with("wss://") {
            return Ok(ProviderConfig::WebSocket(endpoint.to_string()));
        }
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(ProviderConfig::Http(endpoint.to_string()));
        }
        if lower.contains("://") {
            bail!("unsupported endpoint scheme: {endpoint}");
        }
        if endpoint.starts_with('/') || lower.ends_with(".ipc") {
            #[cfg(unix)]
            {
                return Ok(ProviderConfig::Ipc(PathBuf::from(endpoint)));
            }
            #[cfg(not(unix))]
            {
                bail!("IPC is not supported on this platform");
            }
        }
        Ok(ProviderConfig::Http(format!("http://{endpoint}")))
    }

    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }

    /// Whether the transport supports `eth_subscribe`
    pub fn supports_subscriptions(&self) -> bool {
        !matches!(self, ProviderConfig::Http(_))
    }
}

type FilledProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// Contract binding for one deployed address
pub struct AlloyContract {
    provider: FilledProvider,
    config: ProviderConfig,
    address: Address,
}

/// Connect to the endpoint and bind `address`
///
/// Fails when the endpoint cannot be reached or does not answer
/// `eth_chainId`.
pub async fn connect(config: ProviderConfig, address: Address) -> Result<AlloyContract> {
    let provider = match &config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            ProviderBuilder::new().connect_http(rpc_url)
        }
        ProviderConfig::WebSocket(url) => ProviderBuilder::new()
            .connect(url)
            .await
            .context("Failed to create WebSocket provider")?,
        #[cfg(unix)]
        ProviderConfig::Ipc(path) => {
            use alloy::providers::IpcConnect;
            let ipc = IpcConnect::new(path.to_string_lossy().to_string());
            ProviderBuilder::new()
                .connect_ipc(ipc)
                .await
                .context("Failed to create IPC provider")?
        }
    };

    let chain_id = provider
        .get_chain_id()
        .await
        .with_context(|| format!("{} did not answer eth_chainId", config.display()))?;
    tracing::info!(endpoint = %config.display(), chain_id, "connected");

    match provider.get_code_at(address).await {
        Ok(code) if code.is_empty() => {
            tracing::warn!(%address, "no contract code at address");
        }
        Ok(_) => {}
        Err(err) => tracing::debug!(%address, "code lookup failed: {err}"),
    }

    Ok(AlloyContract {
        provider,
        config,
        address,
    })
}

impl AlloyContract {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn endpoint_name(&self) -> String {
        self.config.display()
    }

    /// Log filter for `event` at the bound address
    fn log_filter(&self, event: &EventSpec, filter: &FilterSpec) -> Result<Filter> {
        let mut log_filter = Filter::new().address(self.address);
        // anonymous events have no signature topic, so indexed values start at topic0
        let offset = if event.anonymous {
            0
        } else {
            log_filter = log_filter.event_signature(event.event.selector());
            1
        };

        for (idx, value) in filter.indexed.iter().enumerate() {
            let Some(value) = value else {
                continue;
            };
            let topic = topic_for(value);
            log_filter = match idx + offset {
                0 => log_filter.event_signature(topic),
                1 => log_filter.topic1(topic),
                2 => log_filter.topic2(topic),
                3 => log_filter.topic3(topic),
                position => bail!("event {} has too many indexed fields ({position})", event.key),
            };
        }
        Ok(log_filter)
    }
}

#[async_trait::async_trait]
impl ContractBinding for AlloyContract {
    async fn call(&self, method: &MethodSpec, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
        let input = method
            .function
            .abi_encode_input(args)
            .with_context(|| format!("encode {}", method.key))?;
        let request = TransactionRequest::default()
            .with_to(self.address)
            .with_input(input);
        let output = self.provider.call(request).await?;
        method
            .function
            .abi_decode_output(&output)
            .with_context(|| format!("decode {} output", method.key))
    }

    async fn transact(
        &self,
        method: &MethodSpec,
        args: &[DynSolValue],
        options: &TransactionOptions,
        signer: &PrivateKeySigner,
    ) -> Result<B256> {
        let input = method
            .function
            .abi_encode_input(args)
            .with_context(|| format!("encode {}", method.key))?;
        let from = signer.address();

        let mut request = TransactionRequest::default()
            .with_from(from)
            .with_to(self.address)
            .with_input(input);
        if let Some(value) = options.value {
            request = request.with_value(value);
        }

        let nonce = self.provider.get_transaction_count(from).await?;
        let chain_id = self.provider.get_chain_id().await?;
        let gas_price = match options.gas_price.explicit() {
            Some(price) => u128::try_from(price).map_err(|_| anyhow!("gas price too large"))?,
            None => self.provider.get_gas_price().await?,
        };
        request = request
            .with_nonce(nonce)
            .with_chain_id(chain_id)
            .with_gas_price(gas_price);

        // an explicit limit of zero leaves the choice to the node
        let gas_limit = match options.gas_limit.explicit().filter(|limit| *limit > 0) {
            Some(limit) => limit,
            None => self
                .provider
                .estimate_gas(request.clone())
                .await
                .context("estimate gas limit")?,
        };
        request = request.with_gas_limit(gas_limit);

        let wallet = EthereumWallet::from(signer.clone());
        let envelope = request.build(&wallet).await.context("sign transaction")?;
        let pending = self.provider.send_tx_envelope(envelope).await?;
        let hash = *pending.tx_hash();
        tracing::info!(method = %method.key, %hash, nonce, gas_limit, "transaction submitted");
        Ok(hash)
    }

    async fn query_logs(
        &self,
        event: &EventSpec,
        filter: &FilterSpec,
        range: BlockRange,
    ) -> Result<Box<dyn LogStream>> {
        let mut log_filter = self.log_filter(event, filter)?.from_block(range.from);
        if let Some(to) = range.to {
            log_filter = log_filter.to_block(to);
        }
        let logs = self.provider.get_logs(&log_filter).await?;
        tracing::debug!(event = %event.key, count = logs.len(), "historical logs fetched");
        Ok(Box::new(BufferedLogs::new(
            logs.into_iter().map(entry_from_rpc).collect(),
        )))
    }

    async fn watch_logs(
        &self,
        event: &EventSpec,
        filter: &FilterSpec,
    ) -> Result<Box<dyn LogStream>> {
        let log_filter = self.log_filter(event, filter)?;

        if self.config.supports_subscriptions() {
            let sub = self.provider.subscribe_logs(&log_filter).await?;
            let registration = NodeRegistration {
                provider: self.provider.clone(),
                id: LiveId::Subscription(*sub.local_id()),
            };
            let stream = sub.into_result_stream().map(|item| {
                item.map(entry_from_rpc)
                    .context("malformed log notification")
            });
            tracing::debug!(event = %event.key, "log subscription opened");
            Ok(Box::new(ForwardedLogs::spawn(
                stream,
                Some(Box::new(registration)),
            )))
        } else {
            let id = self.provider.new_filter(&log_filter).await?;
            let registration = NodeRegistration {
                provider: self.provider.clone(),
                id: LiveId::Filter(id),
            };
            let stream = poll_filter(self.provider.clone(), id);
            tracing::debug!(event = %event.key, %id, "log filter polling started");
            Ok(Box::new(ForwardedLogs::spawn(
                stream,
                Some(Box::new(registration)),
            )))
        }
    }
}

/// Poll `eth_getFilterChanges` at the client's interval, surfacing failures
fn poll_filter(
    provider: FilledProvider,
    id: U256,
) -> impl Stream<Item = Result<LogEntry>> + Send + 'static {
    let interval = provider.client().poll_interval();
    futures::stream::unfold(provider, move |provider| async move {
        tokio::time::sleep(interval).await;
        let batch = provider
            .get_filter_changes::<Log>(id)
            .await
            .with_context(|| format!("poll log filter {id}"));
        Some((batch, provider))
    })
    .flat_map(|batch| {
        let items: Vec<Result<LogEntry>> = match batch {
            Ok(logs) => logs.into_iter().map(|log| Ok(entry_from_rpc(log))).collect(),
            Err(err) => vec![Err(err)],
        };
        futures::stream::iter(items)
    })
}

/// What the node registered for a live stream
#[derive(Debug, Clone, Copy)]
enum LiveId {
    Subscription(B256),
    Filter(U256),
}

struct NodeRegistration {
    provider: FilledProvider,
    id: LiveId,
}

#[async_trait::async_trait]
impl Registration for NodeRegistration {
    async fn cancel(self: Box<Self>) -> Result<()> {
        match self.id {
            LiveId::Subscription(id) => self.provider.unsubscribe(id).await?,
            LiveId::Filter(id) => {
                if !self.provider.uninstall_filter(id).await? {
                    tracing::debug!(%id, "log filter was already gone");
                }
            }
        }
        tracing::debug!(id = ?self.id, "live log registration cancelled");
        Ok(())
    }
}

#[async_trait::async_trait]
impl GasOracle for AlloyContract {
    async fn suggest_gas_price(&self) -> Result<U256> {
        let price = self.provider.get_gas_price().await?;
        Ok(U256::from(price))
    }
}
