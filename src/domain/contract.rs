//! Capabilities the console consumes from the chain side
//!
//! These traits abstract over the Alloy-backed implementations in
//! `infrastructure::ethereum`, so the orchestration logic can be driven
//! against recorded fakes in tests.

use alloy_primitives::{LogData, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy_dyn_abi::DynSolValue;
use anyhow::Result;

use super::abi::{EventSpec, MethodSpec};

/// Gas price or limit, either chosen by the operator or left to the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GasSetting<T> {
    #[default]
    Estimate,
    Explicit(T),
}

impl<T: Copy> GasSetting<T> {
    pub fn explicit(&self) -> Option<T> {
        match self {
            GasSetting::Estimate => None,
            GasSetting::Explicit(value) => Some(*value),
        }
    }
}

/// Options for a single transaction attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Wei attached to the call (payable methods only)
    pub value: Option<U256>,
    pub gas_price: GasSetting<U256>,
    pub gas_limit: GasSetting<u64>,
}

/// One match value per indexed event argument, in declared order;
/// `None` leaves that argument unconstrained
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub indexed: Vec<Option<DynSolValue>>,
}

impl FilterSpec {
    pub fn is_unconstrained(&self) -> bool {
        self.indexed.iter().all(Option::is_none)
    }
}

/// Inclusive block range for historical queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockRange {
    pub from: u64,
    /// `None` means no upper bound
    pub to: Option<u64>,
}

/// A raw log delivered by a query or subscription
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub block_number: u64,
    pub data: LogData,
}

/// A source of log entries that must be released when done
#[async_trait::async_trait]
pub trait LogStream: Send {
    /// Next entry that is already available, without waiting
    fn try_next(&mut self) -> Option<Result<LogEntry>>;

    /// Wait for the next entry; `None` once the stream has closed
    async fn next(&mut self) -> Option<Result<LogEntry>>;

    /// Release the query or unsubscribe
    async fn release(self: Box<Self>);
}

/// Bound contract: calls, transactions and log queries against one address
#[async_trait::async_trait]
pub trait ContractBinding: Send + Sync {
    /// Read-only call; returns the decoded outputs in declared order
    async fn call(&self, method: &MethodSpec, args: &[DynSolValue]) -> Result<Vec<DynSolValue>>;

    /// Sign and submit one transaction; returns its hash
    async fn transact(
        &self,
        method: &MethodSpec,
        args: &[DynSolValue],
        options: &TransactionOptions,
        signer: &PrivateKeySigner,
    ) -> Result<B256>;

    /// Bounded query over past entries
    async fn query_logs(
        &self,
        event: &EventSpec,
        filter: &FilterSpec,
        range: BlockRange,
    ) -> Result<Box<dyn LogStream>>;

    /// Unbounded live subscription
    async fn watch_logs(&self, event: &EventSpec, filter: &FilterSpec)
        -> Result<Box<dyn LogStream>>;
}

/// Source of gas price suggestions
#[async_trait::async_trait]
pub trait GasOracle: Send + Sync {
    async fn suggest_gas_price(&self) -> Result<U256>;
}

/// One-shot cancellation notices (Ctrl-C)
#[async_trait::async_trait]
pub trait Interrupt: Send + Sync {
    /// Resolves when the next interrupt arrives
    async fn notified(&self);
}
