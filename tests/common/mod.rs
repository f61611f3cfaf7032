//! Scripted terminal and recording fakes shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use abicon::core::SessionContext;
use abicon::domain::abi::{ContractInterface, EventSpec, MethodSpec};
use abicon::domain::contract::{
    BlockRange, ContractBinding, FilterSpec, GasOracle, Interrupt, LogEntry, LogStream,
    TransactionOptions,
};
use abicon::infrastructure::abi::loader::parse_interface;
use abicon::ui::{Completion, DirectoryListing, Line, LineInput, Prompter};
use abicon::{App, Backends};
use alloy::signers::local::PrivateKeySigner;
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, LogData, B256, U256};
use anyhow::Result;
use tokio::sync::mpsc;

pub const TOKEN_ABI: &str = r#"[
    {"type":"function","name":"balanceOf","stateMutability":"view",
     "inputs":[{"name":"owner","type":"address"}],
     "outputs":[{"name":"","type":"uint256"}]},
    {"type":"function","name":"quote","stateMutability":"pure",
     "inputs":[{"name":"amount","type":"uint256"},{"name":"to","type":"address"},{"name":"exact","type":"bool"}],
     "outputs":[{"name":"fee","type":"uint256"},{"name":"ok","type":"bool"}]},
    {"type":"function","name":"transfer","stateMutability":"nonpayable",
     "inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
     "outputs":[{"name":"","type":"bool"}]},
    {"type":"function","name":"deposit","stateMutability":"payable",
     "inputs":[],"outputs":[]},
    {"type":"event","name":"Transfer","anonymous":false,
     "inputs":[{"name":"from","type":"address","indexed":true},
               {"name":"to","type":"address","indexed":true},
               {"name":"value","type":"uint256","indexed":false}]}
]"#;

pub fn token() -> ContractInterface {
    parse_interface(TOKEN_ABI).unwrap()
}

/// Replays prepared answers and remembers every prompt shown
#[derive(Debug, Default)]
pub struct ScriptedInput {
    pub lines: VecDeque<Line>,
    pub prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| Line::Text(l.to_string())).collect(),
            prompts: Vec::new(),
        }
    }
}

impl LineInput for ScriptedInput {
    fn read_line(&mut self, prompt: &str, _completion: Box<dyn Completion>) -> io::Result<Line> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front().unwrap_or(Line::Eof))
    }

    fn read_password(&mut self, prompt: &str) -> io::Result<Line> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front().unwrap_or(Line::Eof))
    }
}

pub struct FsListing;

impl DirectoryListing for FsListing {
    fn list(&self, dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .map(|rd| rd.filter_map(|e| e.ok()).map(|e| e.path()).collect())
            .unwrap_or_default()
    }
}

pub fn prompter(lines: &[&str]) -> Prompter<ScriptedInput, Vec<u8>> {
    Prompter::new(ScriptedInput::new(lines), Vec::new(), Arc::new(FsListing))
}

pub fn output(prompter: &Prompter<ScriptedInput, Vec<u8>>) -> String {
    String::from_utf8(prompter.output().clone()).unwrap()
}

/// What the fake binding was asked to do
#[derive(Debug, Clone)]
pub enum Request {
    Call {
        method: String,
        args: Vec<DynSolValue>,
    },
    Transact {
        method: String,
        args: Vec<DynSolValue>,
        options: TransactionOptions,
        from: Address,
    },
    Query {
        event: String,
        filter: FilterSpec,
        range: BlockRange,
    },
    Watch {
        event: String,
        filter: FilterSpec,
    },
}

/// Log stream that records whether it was released
pub struct FakeStream {
    ready: VecDeque<Result<LogEntry>>,
    live: Option<mpsc::UnboundedReceiver<Result<LogEntry>>>,
    released: Arc<AtomicBool>,
}

#[async_trait::async_trait]
impl LogStream for FakeStream {
    fn try_next(&mut self) -> Option<Result<LogEntry>> {
        self.ready.pop_front()
    }

    async fn next(&mut self) -> Option<Result<LogEntry>> {
        if let Some(item) = self.ready.pop_front() {
            return Some(item);
        }
        match &mut self.live {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    async fn release(self: Box<Self>) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Contract binding that records requests and replays canned answers
#[derive(Default)]
pub struct FakeBinding {
    pub requests: Mutex<Vec<Request>>,
    pub call_outputs: Mutex<Vec<DynSolValue>>,
    pub logs: Mutex<Vec<Result<LogEntry>>>,
    /// Keeps live subscriptions open until dropped
    pub live: Mutex<Option<mpsc::UnboundedSender<Result<LogEntry>>>>,
    /// Close live subscriptions right away instead
    pub close_live: AtomicBool,
    pub released: Arc<AtomicBool>,
    pub gas_price: U256,
}

impl FakeBinding {
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn was_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    fn record(&self, request: Request) {
        self.requests.lock().unwrap().push(request);
    }

    fn stream(&self, live: Option<mpsc::UnboundedReceiver<Result<LogEntry>>>) -> FakeStream {
        FakeStream {
            ready: self.logs.lock().unwrap().drain(..).collect(),
            live,
            released: Arc::clone(&self.released),
        }
    }
}

#[async_trait::async_trait]
impl ContractBinding for FakeBinding {
    async fn call(&self, method: &MethodSpec, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
        self.record(Request::Call {
            method: method.key.clone(),
            args: args.to_vec(),
        });
        Ok(self.call_outputs.lock().unwrap().clone())
    }

    async fn transact(
        &self,
        method: &MethodSpec,
        args: &[DynSolValue],
        options: &TransactionOptions,
        signer: &PrivateKeySigner,
    ) -> Result<B256> {
        self.record(Request::Transact {
            method: method.key.clone(),
            args: args.to_vec(),
            options: options.clone(),
            from: signer.address(),
        });
        Ok(B256::repeat_byte(0xab))
    }

    async fn query_logs(
        &self,
        event: &EventSpec,
        filter: &FilterSpec,
        range: BlockRange,
    ) -> Result<Box<dyn LogStream>> {
        self.record(Request::Query {
            event: event.key.clone(),
            filter: filter.clone(),
            range,
        });
        Ok(Box::new(self.stream(None)))
    }

    async fn watch_logs(
        &self,
        event: &EventSpec,
        filter: &FilterSpec,
    ) -> Result<Box<dyn LogStream>> {
        self.record(Request::Watch {
            event: event.key.clone(),
            filter: filter.clone(),
        });
        let (tx, rx) = mpsc::unbounded_channel();
        if !self.close_live.load(Ordering::SeqCst) {
            *self.live.lock().unwrap() = Some(tx);
        }
        Ok(Box::new(self.stream(Some(rx))))
    }
}

#[async_trait::async_trait]
impl GasOracle for FakeBinding {
    async fn suggest_gas_price(&self) -> Result<U256> {
        Ok(self.gas_price)
    }
}

/// Interrupt that is either already pending or never arrives
pub struct FakeInterrupt {
    pub fire: bool,
}

#[async_trait::async_trait]
impl Interrupt for FakeInterrupt {
    async fn notified(&self) {
        if !self.fire {
            std::future::pending::<()>().await;
        }
    }
}

pub fn app_with(
    binding: Arc<FakeBinding>,
    ctx: SessionContext,
    lines: &[&str],
    interrupt: bool,
) -> App<ScriptedInput, Vec<u8>> {
    let backends = Backends {
        binding: binding.clone(),
        gas: binding,
        interrupt: Arc::new(FakeInterrupt { fire: interrupt }),
    };
    App::new(token(), ctx, prompter(lines), backends)
}

pub fn app_output(app: &App<ScriptedInput, Vec<u8>>) -> String {
    output(app.prompter())
}

pub fn prompts(app: &mut App<ScriptedInput, Vec<u8>>) -> Vec<String> {
    app.prompter_mut().input_mut().prompts.clone()
}

/// A `Transfer(from, to, value)` log as a node would deliver it
pub fn transfer_log(interface: &ContractInterface, block: u64, from: Address, to: Address, value: u64) -> LogEntry {
    let selector = interface.event("Transfer").unwrap().event.selector();
    let topics = vec![selector, from.into_word(), to.into_word()];
    let data = Bytes::from(U256::from(value).to_be_bytes::<32>().to_vec());
    LogEntry {
        block_number: block,
        data: LogData::new_unchecked(topics, data),
    }
}

pub fn signer_ctx() -> (SessionContext, Address) {
    let key = PrivateKeySigner::random();
    let address = key.address();
    let mut ctx = SessionContext::new(PathBuf::from("."));
    ctx.set_signer(abicon::core::Signer::Key(key));
    (ctx, address)
}
